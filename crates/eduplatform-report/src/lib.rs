//! eduplatform-report — Client-side documents: the PDF completion certificate
//! and chat transcript downloads.

pub mod certificate;
pub mod export;

pub use certificate::{write_certificate, Certificate};
pub use export::write_transcript;

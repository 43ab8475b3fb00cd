//! eduplatform-core — Data model, backend traits and screen controllers.
//!
//! Everything here is transport-agnostic. Controllers talk to a
//! [`traits::Backend`]; the HTTP implementation lives in
//! `eduplatform-client` and [`mock::MockBackend`] serves tests.

pub mod assessment;
pub mod chat;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod forum;
pub mod mock;
pub mod model;
pub mod paths;
pub mod quiz;
pub mod session;
pub mod timer;
pub mod traits;
pub mod view;

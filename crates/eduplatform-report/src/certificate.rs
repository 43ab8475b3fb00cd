//! Completion certificate.
//!
//! Rendered client-side as a single A4 landscape PDF page using the standard
//! Helvetica faces, so nothing is embedded and no server round trip is
//! involved.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};

use eduplatform_core::model::User;

pub const PLATFORM_NAME: &str = "EduPlatform";

/// A4 landscape in points.
pub const PAGE_WIDTH: i64 = 842;
pub const PAGE_HEIGHT: i64 = 595;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";
const ITALIC: &str = "F3";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub recipient: String,
    pub issued_on: NaiveDate,
    pub platform: String,
}

/// One centred line of text on the page.
struct Line {
    font: &'static str,
    size: i64,
    baseline: i64,
    text: String,
}

impl Certificate {
    pub fn for_user(user: &User, issued_on: NaiveDate) -> Self {
        Self {
            recipient: user.full_name.clone(),
            issued_on,
            platform: PLATFORM_NAME.to_string(),
        }
    }

    /// Suggested download name: `certificate-<Full-Name>.pdf`. Anything but
    /// alphanumerics, `-` and `_` becomes a dash, and dash runs collapse.
    pub fn file_name(&self) -> String {
        let replaced: String = self
            .recipient
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        let name = replaced
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        if name.is_empty() {
            "certificate.pdf".to_string()
        } else {
            format!("certificate-{name}.pdf")
        }
    }

    fn lines(&self) -> Vec<Line> {
        vec![
            Line {
                font: BOLD,
                size: 36,
                baseline: 430,
                text: "Certificate of Achievement".into(),
            },
            Line {
                font: REGULAR,
                size: 16,
                baseline: 370,
                text: "This certifies that".into(),
            },
            Line {
                font: BOLD,
                size: 30,
                baseline: 315,
                text: self.recipient.trim().to_string(),
            },
            Line {
                font: REGULAR,
                size: 14,
                baseline: 262,
                text: format!(
                    "has successfully completed courses on the {} platform",
                    self.platform
                ),
            },
            Line {
                font: REGULAR,
                size: 14,
                baseline: 242,
                text: "and has demonstrated mastery of the skills acquired".into(),
            },
            Line {
                font: REGULAR,
                size: 12,
                baseline: 150,
                text: format!("Issued on {}", self.issued_on.format("%B %-d, %Y")),
            },
            Line {
                font: ITALIC,
                size: 12,
                baseline: 128,
                text: format!("{} - Learning Platform", self.platform),
            },
        ]
    }

    /// Render the certificate as PDF bytes.
    pub fn render_pdf(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let fonts = dictionary! {
            REGULAR => font(&mut doc, "Helvetica"),
            BOLD => font(&mut doc, "Helvetica-Bold"),
            ITALIC => font(&mut doc, "Helvetica-Oblique"),
        };
        let resources_id = doc.add_object(dictionary! { "Font" => fonts });

        let mut operations = vec![
            // double border
            Operation::new("w", vec![Object::Integer(3)]),
            rectangle(30),
            Operation::new("S", vec![]),
            Operation::new("w", vec![Object::Integer(1)]),
            rectangle(42),
            Operation::new("S", vec![]),
        ];
        for line in self.lines() {
            let x = (PAGE_WIDTH - text_width(&line.text, line.size)) / 2;
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![line.font.into(), line.size.into()]),
                Operation::new("Td", vec![x.max(50).into(), line.baseline.into()]),
                Operation::new("Tj", vec![Object::string_literal(win_ansi(&line.text))]),
                Operation::new("ET", vec![]),
            ]);
        }
        let content = Content { operations }
            .encode()
            .context("failed to encode certificate page")?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0_i64.into(), 0_i64.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1_i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(win_ansi(&format!(
                "Certificate of Achievement - {}",
                self.recipient.trim()
            ))),
            "Producer" => Object::string_literal(self.platform.as_bytes().to_vec()),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .context("failed to serialise certificate")?;
        Ok(bytes)
    }
}

fn font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Rectangle inset `margin` points from every page edge.
fn rectangle(margin: i64) -> Operation {
    Operation::new(
        "re",
        vec![
            margin.into(),
            margin.into(),
            (PAGE_WIDTH - 2 * margin).into(),
            (PAGE_HEIGHT - 2 * margin).into(),
        ],
    )
}

/// Rough Helvetica advance width: half an em per character.
fn text_width(text: &str, size: i64) -> i64 {
    text.chars().count() as i64 * size / 2
}

/// Encode for the standard fonts. Latin-1 maps straight through; anything
/// else prints as `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Render `certificate` into `dir` under its suggested file name.
pub fn write_certificate(certificate: &Certificate, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(certificate.file_name());
    std::fs::write(&path, certificate.render_pdf()?)
        .with_context(|| format!("failed to write certificate: {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certificate(name: &str) -> Certificate {
        Certificate {
            recipient: name.into(),
            issued_on: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            platform: PLATFORM_NAME.into(),
        }
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    #[test]
    fn pdf_contains_required_text() {
        let bytes = certificate("Ada Lovelace").render_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        for text in [
            "Certificate of Achievement",
            "This certifies that",
            "Ada Lovelace",
            "has successfully completed courses on the EduPlatform platform",
            "Issued on March 9, 2024",
            "EduPlatform - Learning Platform",
        ] {
            assert!(contains(&bytes, text), "missing {text:?}");
        }
    }

    #[test]
    fn single_a4_landscape_page() {
        let bytes = certificate("Ada Lovelace").render_pdf().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let page_id = pages[&1];
        let media_box: Vec<i64> = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_i64().unwrap())
            .collect();
        assert_eq!(media_box, vec![0, 0, 842, 595]);
    }

    #[test]
    fn non_latin_characters_are_replaced() {
        assert_eq!(win_ansi("José"), b"Jos\xe9".to_vec());
        assert_eq!(win_ansi("李"), b"?".to_vec());
    }

    #[test]
    fn file_name_dashes_whitespace() {
        assert_eq!(
            certificate("Ada  King Lovelace").file_name(),
            "certificate-Ada-King-Lovelace.pdf"
        );
        assert_eq!(certificate("   ").file_name(), "certificate.pdf");
    }

    #[test]
    fn file_name_replaces_path_separators() {
        assert_eq!(certificate("AC/DC Fan").file_name(), "certificate-AC-DC-Fan.pdf");
        assert_eq!(certificate("..\\x").file_name(), "certificate-x.pdf");
        assert_eq!(certificate("/").file_name(), "certificate.pdf");
    }

    #[test]
    fn for_user_uses_full_name() {
        let user = eduplatform_core::mock::user("Grace Hopper");
        let cert = Certificate::for_user(&user, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(cert.recipient, "Grace Hopper");
        assert_eq!(cert.platform, "EduPlatform");
    }

    #[test]
    fn write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_certificate(&certificate("Ada Lovelace"), &dir.path().join("out")).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "certificate-Ada-Lovelace.pdf"
        );
        let content = std::fs::read(&path).unwrap();
        assert!(content.starts_with(b"%PDF-"));
    }

    #[test]
    fn write_name_with_slash_stays_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_certificate(&certificate("AC/DC Fan"), dir.path()).unwrap();
        assert_eq!(path.parent().unwrap(), dir.path());
        assert!(path.exists());
    }
}

//! # sie
//!
//! sie is a library for parsing SIE 4 accounting exports into a [`Document`]:
//! company metadata, the chart of accounts, dimensions and objects,
//! verifications with their transactions, and balance and result lines.
//!
//! ```
//! let text = "#FLAGGA 0\n#KONTO 1910 Kassa\n#VER A 1 20210105 \"Kaffe\"\n{\n#TRANS 1910 {} -195.00\n}\n";
//! let (doc, diagnostics) = sie::Document::parse_str(text, "kaffe.se").unwrap();
//! assert_eq!(doc.verifications()[0].transactions().len(), 1);
//! assert!(diagnostics.is_empty());
//! ```
#![doc(html_root_url = "https://docs.rs/sie/0.1.0")]

pub mod codepage;
mod document;
pub mod options;
pub mod parse;
pub mod utils;

pub use document::*;

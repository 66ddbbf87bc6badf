//! Managed-section handling for EnvDeck.
//!
//! EnvDeck owns exactly one marker-delimited region inside each target file
//! (a shell startup script or the hosts file). This crate is the pure, I/O
//! free part of that machinery:
//!
//! - [`markers`]: the marker literals for each file family and the
//!   substring-based marker detection
//! - [`section`]: rendering an ordered set of groups into a section and
//!   splicing a section into existing file content
//! - [`parser`]: recovering unmanaged declarations that live *outside* the
//!   section, and deleting a single line by number
//! - [`validators`]: syntax predicates for keys, addresses and hostnames
//!
//! A rendered shell section looks like this:
//!
//! ```text
//! # ========== EnvDeck Managed Variables ==========
//! # WARNING: This section is managed by EnvDeck. Do not edit manually.
//!
//! # [EnvDeck:6F1C...] START - work
//! export API_URL="https://example.com"
//! # [EnvDeck:6F1C...] END - work
//!
//! # ========== End of EnvDeck Managed Variables ==========
//! ```

pub mod error;
pub mod markers;
pub mod parser;
pub mod section;
pub mod validators;

pub use error::{Error, Result};
pub use markers::{DEFAULT_PRODUCT, Family, Markers, SectionSpan, is_marker_line, locate};
pub use parser::{ExternalDeclaration, line_at, remove_line, scan};
pub use section::{SectionGroup, escape_value, export_line, hosts_line, render, splice};

//! Unit-file document model and transform merge for Quadlet Fleet
//!
//! Parses the line-oriented `[Section]` / `Key=Value` format used by quadlet
//! `.container` files, preserving comments, blank lines, and entry order
//! exactly, and merges operator transforms into tenant specs.

pub mod document;
pub mod merge;

pub use document::{Entry, Section, UnitDocument};
pub use merge::merge;

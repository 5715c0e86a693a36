//! The receipt markup engine.
//!
//! Receipts carry their structured record as front matter written in a small
//! indentation-based dialect:
//!
//! ```text
//! ---
//! entity:
//!   type: school
//!   name: Example High
//! inspection:
//!   score: 92
//!   violations:
//!     - code: C1
//!       critical: true
//! ---
//! ```
//!
//! [`extract_envelope`] finds the block, [`decode`] turns it into a [`Value`]
//! tree, and [`encode`] renders a tree back to the same dialect. All three
//! are pure functions with no shared state.
//!
//! # Usage
//!
//! ```ignore
//! use receipts::markup::{decode, encode, extract_envelope};
//!
//! let source = std::fs::read_to_string("fixtures/receipts/clayton/2025-03-14.md")?;
//! if let Some(block) = extract_envelope(&source) {
//!     let value = decode(block);
//!     println!("{}", encode(&value)?);
//! }
//! ```

mod decode;
mod encode;
mod envelope;
mod scalar;
mod value;

pub use decode::{decode, SENTINEL_KEY, TAB_WIDTH};
pub use encode::{encode, encode_at, EncodeError};
pub use envelope::{extract_envelope, locate, wrap_envelope, Envelope, DELIMITER};
pub use scalar::{coerce, is_plain_text};
pub use value::{Mapping, Value};

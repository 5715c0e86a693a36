//! receipts - Public inspection receipts toolchain
//!
//! Receipts are markdown documents whose front matter records one food-safety
//! inspection. This library holds the markup engine that reads and writes
//! that front matter, plus the tools built on it: minting receipts from
//! upstream records, exporting JSON sidecars, deriving the feed and
//! leaderboard views, and patching source links.

pub mod aggregate;
pub mod cli;
pub mod date;
pub mod discovery;
pub mod error;
pub mod export;
pub mod ingest;
pub mod markup;
pub mod output;
pub mod patch;
pub mod types;
pub mod validation;

pub use aggregate::{build_feed, build_leaderboard, write_json_guarded, FeedItem, LeaderboardRow};
pub use discovery::{discover, LoadResult, Manifest, Project, ScanResult};
pub use error::{ReceiptError, Result};
pub use markup::{decode, encode, encode_at, extract_envelope, EncodeError, Mapping, Value};
pub use types::{Receipt, Ucr};
pub use validation::{validate_receipt, Diagnostic, Severity, ValidationResult};

//! Derived JSON views over the receipt tree: the recent-inspections feed and
//! the per-venue leaderboard.

mod feed;
mod leaderboard;

use std::fs;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::error::{ReceiptError, Result};

pub use feed::{build_feed, FeedItem};
pub use leaderboard::{build_leaderboard, LeaderboardRow};

/// What a guarded write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(usize),
    /// Nothing to write; any existing file was left alone.
    SkippedEmpty,
}

/// Write `items` as pretty JSON, unless there are none.
///
/// Derived files may have been hand-authored while the receipt tree was
/// empty, so an empty view never replaces them.
pub fn write_json_guarded<T: Serialize>(path: &Path, items: &[T]) -> Result<WriteOutcome> {
    if items.is_empty() {
        return Ok(WriteOutcome::SkippedEmpty);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ReceiptError::io(parent, "Failed to create directory", e))?;
    }

    let json = serde_json::to_string_pretty(items).map_err(|e| ReceiptError::Parse {
        message: format!("Failed to serialize {}: {}", path.display(), e),
        help: None,
    })?;
    fs::write(path, json).map_err(|e| ReceiptError::io(path, "Failed to write", e))?;

    Ok(WriteOutcome::Written(items.len()))
}

/// Scores are `f64`, but whole scores are written without a fraction.
pub(crate) fn serialize_score<S: Serializer>(score: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if score.fract() == 0.0 && score.abs() < 9_007_199_254_740_992.0 {
        serializer.serialize_i64(*score as i64)
    } else {
        serializer.serialize_f64(*score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Serialize)]
    struct Row {
        #[serde(serialize_with = "serialize_score")]
        score: f64,
    }

    #[test]
    fn test_guarded_write_skips_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.json");
        fs::write(&path, "[\"hand-authored\"]").unwrap();

        let outcome = write_json_guarded::<Row>(&path, &[]).unwrap();

        assert_eq!(outcome, WriteOutcome::SkippedEmpty);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[\"hand-authored\"]");
    }

    #[test]
    fn test_guarded_write_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("public/data/feed.json");

        let outcome =
            write_json_guarded(&path, &[Row { score: 92.0 }, Row { score: 87.5 }]).unwrap();

        assert_eq!(outcome, WriteOutcome::Written(2));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "[\n  {\n    \"score\": 92\n  },\n  {\n    \"score\": 87.5\n  }\n]"
        );
    }
}

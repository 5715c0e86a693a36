use serde::Serialize;

use crate::types::Receipt;

use super::serialize_score;

/// One line of the recent-inspections feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub id: String,
    pub school: String,
    pub address: String,
    pub date: String,
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
    pub critical_count: u32,
    pub noncritical_count: u32,
    pub source_url: String,
    pub receipt_cid: String,
}

impl From<&Receipt> for FeedItem {
    fn from(receipt: &Receipt) -> Self {
        Self {
            id: receipt.inspection.id.clone(),
            school: receipt.entity.name.clone(),
            address: receipt.entity.address.clone().unwrap_or_default(),
            date: receipt.inspection.date.clone(),
            score: receipt.inspection.score,
            critical_count: receipt.inspection.critical_violations,
            noncritical_count: receipt.inspection.noncritical_violations,
            source_url: receipt.source.url.clone(),
            receipt_cid: receipt.cid().to_string(),
        }
    }
}

/// Newest inspections first, at most `limit` of them.
///
/// Items with the same date keep their load order.
pub fn build_feed<'a>(receipts: impl IntoIterator<Item = &'a Receipt>, limit: usize) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = receipts.into_iter().map(FeedItem::from).collect();
    items.sort_by(|a, b| b.date.cmp(&a.date));
    items.truncate(limit);
    items
}

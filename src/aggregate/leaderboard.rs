use std::collections::HashMap;

use serde::Serialize;

use crate::date::{one_year_before, year_start};
use crate::types::Receipt;

use super::serialize_score;

/// One venue's standing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub school: String,
    pub parent: String,
    pub address: String,
    #[serde(rename = "latestDate")]
    pub latest_date: String,
    #[serde(rename = "latestScore", serialize_with = "serialize_score")]
    pub latest_score: f64,
    /// Mean score over the trailing year, to one decimal.
    #[serde(rename = "avg12mo", serialize_with = "serialize_score")]
    pub avg_12mo: f64,
    #[serde(rename = "criticalsYTD")]
    pub criticals_ytd: u32,
}

struct Inspection<'a> {
    date: &'a str,
    score: f64,
    criticals: u32,
}

struct Venue<'a> {
    name: &'a str,
    parent: &'a str,
    address: &'a str,
    inspections: Vec<Inspection<'a>>,
}

/// Rank venues by their latest score, best first.
///
/// Parent and address come from the first receipt seen for a venue. The
/// trailing year starts on the same day one year before `today`; the year to
/// date starts on January 1st of `today`'s year. Ties keep first-seen order.
pub fn build_leaderboard<'a>(
    receipts: impl IntoIterator<Item = &'a Receipt>,
    today: &str,
) -> Vec<LeaderboardRow> {
    let mut venues: Vec<Venue<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for receipt in receipts {
        let name = receipt.entity.name.as_str();
        let slot = *index.entry(name).or_insert_with(|| {
            venues.push(Venue {
                name,
                parent: receipt.entity.parent.as_deref().unwrap_or(""),
                address: receipt.entity.address.as_deref().unwrap_or(""),
                inspections: Vec::new(),
            });
            venues.len() - 1
        });
        venues[slot].inspections.push(Inspection {
            date: &receipt.inspection.date,
            score: receipt.inspection.score,
            criticals: receipt.inspection.critical_violations,
        });
    }

    let trailing_year = one_year_before(today).unwrap_or_default();
    let ytd = year_start(today).unwrap_or_default();

    let mut rows: Vec<LeaderboardRow> = venues
        .into_iter()
        .map(|mut venue| {
            venue.inspections.sort_by(|a, b| b.date.cmp(&a.date));
            let (latest_date, latest_score) = venue
                .inspections
                .first()
                .map(|i| (i.date, i.score))
                .unwrap_or(("", 0.0));

            let recent: Vec<f64> = venue
                .inspections
                .iter()
                .filter(|i| i.date >= trailing_year.as_str())
                .map(|i| i.score)
                .collect();
            let avg = if recent.is_empty() {
                latest_score
            } else {
                recent.iter().sum::<f64>() / recent.len() as f64
            };

            let criticals_ytd = venue
                .inspections
                .iter()
                .filter(|i| i.date >= ytd.as_str())
                .map(|i| i.criticals)
                .sum();

            LeaderboardRow {
                school: venue.name.to_string(),
                parent: venue.parent.to_string(),
                address: venue.address.to_string(),
                latest_date: latest_date.to_string(),
                latest_score,
                avg_12mo: (avg * 10.0).round() / 10.0,
                criticals_ytd,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.latest_score.total_cmp(&a.latest_score));
    rows
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::AggregatorError;

/// Message payload that marks a transfer as one tracked by this service.
pub const TRACKED_MESSAGE: &str = "cigarette:smoked";

/// How many transactions the recent-transactions list holds at most.
pub const RECENT_LIMIT: usize = 5;

/// A confirmed transaction as reported by the node, before validation.
///
/// Hash and timestamp are optional because the gateway omits them for
/// records that are not fully confirmed; the aggregation pass treats their
/// absence as a data-integrity failure rather than silently skipping.
#[derive(Clone, Debug)]
pub struct ChainRecord {
    /// Transaction hash, if the node reported one
    pub hash: Option<String>,
    /// Confirmation timestamp in network-relative milliseconds
    pub timestamp_millis: Option<u64>,
    /// Kind-specific payload
    pub body: RecordBody,
}

#[derive(Clone, Debug)]
pub enum RecordBody {
    /// A transfer, with its decoded plain-text message if it had one
    Transfer { message: Option<String> },
    /// Any other transaction kind; never aggregated
    Other,
}

/// A validated, filter-passing transaction with an absolute timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedTransaction {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
}

/// The slice of the node's network configuration this service consumes.
#[derive(Clone, Debug, Default)]
pub struct NetworkProperties {
    /// Raw epoch adjustment, e.g. `"1615853185s"`
    pub epoch_adjustment: Option<String>,
}

impl NetworkProperties {
    /// Parses the epoch adjustment into seconds by stripping the trailing
    /// unit character. Missing or malformed values abort the current pass.
    pub fn epoch_adjustment_secs(&self) -> Result<u64, AggregatorError> {
        let raw = self
            .epoch_adjustment
            .as_deref()
            .ok_or(AggregatorError::MissingEpochAdjustment)?;
        raw.strip_suffix('s')
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| AggregatorError::MalformedEpochAdjustment(raw.to_string()))
    }
}

/// Search parameters for one page of confirmed transfers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferQuery {
    /// Account address whose transfers are scanned
    pub address: String,
    /// Mosaic id the transfers must carry
    pub mosaic_id: String,
    /// Page size; only the first page is ever consumed
    pub page_size: u16,
}

/// One entry of the recent-transactions table.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RecentTransaction {
    pub hash: String,
    /// Display timestamp, `YYYY-MM-DD HH:MM` in the aggregation timezone
    pub timestamp: String,
}

/// The aggregated dashboard value, replaced wholesale on every
/// successful pass.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Matching transactions dated "today"
    pub today_count: u64,
    /// Arithmetic mean of the daily counts; 0 when no day was seen
    pub daily_average: f64,
    /// Distinct calendar days, chronological, `YYYY-MM-DD`
    pub daily_labels: Vec<String>,
    /// Count per entry of `daily_labels`
    pub daily_counts: Vec<u64>,
    /// Count per hour-of-day for "today"
    pub hourly_counts: [u64; 24],
    /// Newest-first, at most [`RECENT_LIMIT`] entries
    pub recent_transactions: Vec<RecentTransaction>,
}

/// What the HTTP API hands to the rendering layer.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// True while any refresh pass is in flight
    pub loading: bool,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

use chrono::{DateTime, TimeZone, Timelike};

use crate::domain::errors::AggregatorError;
use crate::domain::models::{
    ChainRecord, DashboardStats, NormalizedTransaction, RecentTransaction, RecordBody,
    RECENT_LIMIT, TRACKED_MESSAGE,
};

/// Validates and converts one page of node records into tagged transactions
/// with absolute timestamps, preserving the page's newest-first order.
///
/// Missing hash or timestamp anywhere in the page aborts the whole pass:
/// confirmed transactions always carry both, so their absence means the
/// page cannot be trusted and nothing from it is applied. Non-transfer
/// records and transfers whose message is not [`TRACKED_MESSAGE`] are
/// expected and skipped silently.
pub fn normalize(
    records: &[ChainRecord],
    epoch_adjustment_secs: u64,
) -> Result<Vec<NormalizedTransaction>, AggregatorError> {
    let mut transactions = Vec::new();

    for record in records {
        let hash = record
            .hash
            .as_ref()
            .ok_or(AggregatorError::MissingTransactionHash)?;
        let millis = record
            .timestamp_millis
            .ok_or(AggregatorError::MissingTransactionTimestamp)?;

        let message = match &record.body {
            RecordBody::Transfer { message } => message.as_deref(),
            RecordBody::Other => continue,
        };
        if message != Some(TRACKED_MESSAGE) {
            continue;
        }

        let absolute_millis = epoch_adjustment_secs as i64 * 1000 + millis as i64;
        let timestamp = DateTime::from_timestamp_millis(absolute_millis)
            .ok_or(AggregatorError::TimestampOutOfRange(absolute_millis))?;
        transactions.push(NormalizedTransaction {
            hash: hash.clone(),
            timestamp,
        });
    }

    Ok(transactions)
}

/// Folds a newest-first normalized list into one [`DashboardStats`] value.
///
/// `now` fixes both "today" and the timezone used for day and hour
/// bucketing for the whole pass, so a pass that straddles midnight cannot
/// drift. Production passes `Local::now()`; tests pin the clock.
pub fn aggregate<Tz>(transactions: &[NormalizedTransaction], now: &DateTime<Tz>) -> DashboardStats
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let tz = now.timezone();
    let today = now.format("%Y-%m-%d").to_string();

    let mut today_count = 0u64;
    let mut hourly_counts = [0u64; 24];
    let mut daily_labels: Vec<String> = Vec::new();
    let mut daily_counts: Vec<u64> = Vec::new();

    // The input is newest-first and time-ordered, so walking it in reverse
    // keeps same-day entries contiguous and a trailing bucket suffices.
    for tx in transactions.iter().rev() {
        let local = tx.timestamp.with_timezone(&tz);
        let day = local.format("%Y-%m-%d").to_string();

        if day == today {
            today_count += 1;
            hourly_counts[local.hour() as usize] += 1;
        }

        if daily_labels.last() != Some(&day) {
            daily_labels.push(day);
            daily_counts.push(0);
        }
        if let Some(count) = daily_counts.last_mut() {
            *count += 1;
        }
    }

    let daily_average = if daily_counts.is_empty() {
        0.0
    } else {
        daily_counts.iter().sum::<u64>() as f64 / daily_counts.len() as f64
    };

    let recent_transactions = transactions
        .iter()
        .take(RECENT_LIMIT)
        .map(|tx| RecentTransaction {
            hash: tx.hash.clone(),
            timestamp: tx
                .timestamp
                .with_timezone(&tz)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        })
        .collect();

    DashboardStats {
        today_count,
        daily_average,
        daily_labels,
        daily_counts,
        hourly_counts,
        recent_transactions,
    }
}

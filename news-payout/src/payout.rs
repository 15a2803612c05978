use crate::types::{KeyValueStore, NewsError, PayoutRate, Result};
use tracing::{debug, warn};

pub const PAYOUT_RATE_KEY: &str = "payoutRate";

/// `filtered_count * rate`, unrounded.
pub fn total(filtered_count: usize, rate: &PayoutRate) -> f64 {
    filtered_count as f64 * rate.value()
}

/// Two-decimal rendering of a payout total.
pub fn format_total(total: f64) -> String {
    format!("{:.2}", total)
}

/// Read the persisted rate, falling back to the default when nothing is
/// stored or the stored text no longer parses.
pub fn load_rate(store: &dyn KeyValueStore) -> PayoutRate {
    match store.get(PAYOUT_RATE_KEY) {
        Some(raw) => match PayoutRate::parse(&raw) {
            Ok(rate) => {
                debug!("Restored payout rate {}", rate);
                rate
            }
            Err(e) => {
                warn!("Ignoring stored payout rate: {}", e);
                PayoutRate::default()
            }
        },
        None => PayoutRate::default(),
    }
}

/// Parse a user edit and persist it before returning.
pub fn update_rate(store: &mut dyn KeyValueStore, input: &str) -> Result<PayoutRate> {
    let rate = PayoutRate::parse(input)?;
    store
        .set(PAYOUT_RATE_KEY, rate.as_str())
        .map_err(|e| NewsError::Storage(e.to_string()))?;
    debug!("Persisted payout rate {}", rate);
    Ok(rate)
}

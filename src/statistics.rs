use std::time::{Duration};

use super::responses::{TrialOutcome};

/// Counters and delay figures reduced from a session's trial outcomes.
#[derive(Clone, Debug, PartialEq)]
pub struct Statistics {
    pub sent: u32,
    pub received: u32,
    pub lost: u32,
    pub loss_percentage: f64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub average_ms: u64,
}

/// Reduce `outcomes` of a session configured for `trial_count` trials.
///
/// The average divides the summed delays by the trial count, not by the number
/// of replies, so lost trials pull it down. When the loss rounds to one hundred
/// percent the minimum, maximum and average all report the timeout.
///
/// A session always runs at least one trial. Asked for zero, every figure is zero.
pub fn aggregate(outcomes: &[TrialOutcome], trial_count: u32, timeout: Duration) -> Statistics {
    let timeout_ms = timeout.as_millis() as u64;
    let sent = trial_count;

    if sent == 0 {
        return Statistics {
            sent: 0,
            received: 0,
            lost: 0,
            loss_percentage: 0.0,
            min_ms: 0,
            max_ms: 0,
            average_ms: 0,
        }
    }

    let delays: Vec<u64> = outcomes.iter()
        .filter_map(TrialOutcome::milliseconds)
        .collect();

    let received = delays.len() as u32;
    let lost = sent.saturating_sub(received);
    let loss_percentage = (lost as f64 * 100.0) / sent as f64;

    let sum: u64 = delays.iter().sum();
    let average_ms = (sum + (sent as u64 / 2)) / sent as u64;

    let min_ms = delays.iter().copied().fold(timeout_ms, u64::min);
    let max_ms = delays.iter().copied().fold(0, u64::max);

    if loss_percentage.round() == 100.0 {
        return Statistics {
            sent,
            received,
            lost,
            loss_percentage,
            min_ms: timeout_ms,
            max_ms: timeout_ms,
            average_ms: timeout_ms,
        }
    }

    Statistics {
        sent,
        received,
        lost,
        loss_percentage,
        min_ms,
        max_ms,
        average_ms,
    }
}

//! Utility functions for the contest engine and pipeline

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique run ID
pub fn generate_run_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique task ID
pub fn generate_task_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Number of distinct unordered k-combinations of n items
///
/// Zero when `k > n`; one when `k == 0`. Saturates at `u64::MAX`.
pub fn n_choose_k(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // Exact at every step: the running product is C(n, i + 1).
        result = result * (n - i) as u128 / (i + 1) as u128;
        if result > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    result as u64
}

/// Strip non-ASCII characters from worker-supplied text
pub fn filter_non_ascii(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

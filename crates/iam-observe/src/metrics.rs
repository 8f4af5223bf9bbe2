//! Metrics for account operations
//!
//! Uses the `metrics` facade; values are exported once a recorder is installed
//! through [`crate::init_metrics`].

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Initialize all metric descriptions
pub fn init_metrics_descriptions() {
    describe_counter!(
        "iam_account_operations_total",
        "Total number of account operations by operation and outcome"
    );
    describe_histogram!(
        "iam_account_operation_duration_seconds",
        "Duration of account operations in seconds"
    );
    describe_counter!(
        "iam_canonical_id_collisions_total",
        "Total number of generated canonical ids that were already taken"
    );
    describe_counter!(
        "iam_capacity_races_detected_total",
        "Total number of account creations that raced past the account limit"
    );
    describe_counter!(
        "iam_notifications_failed_total",
        "Total number of change notifications that could not be delivered"
    );
    describe_gauge!("iam_accounts_live", "Number of live accounts observed at the last count");
}

/// Record a finished account operation
pub fn record_operation(operation: &'static str, outcome: &'static str, duration_seconds: f64) {
    counter!("iam_account_operations_total", "operation" => operation, "outcome" => outcome).increment(1);
    histogram!("iam_account_operation_duration_seconds", "operation" => operation).record(duration_seconds);
}

pub fn record_canonical_id_collision() {
    counter!("iam_canonical_id_collisions_total").increment(1);
}

pub fn record_capacity_race() {
    counter!("iam_capacity_races_detected_total").increment(1);
}

/// Record a failed change notification
pub fn record_notification_failure(event: &'static str) {
    counter!("iam_notifications_failed_total", "event" => event).increment(1);
}

pub fn set_live_accounts(count: usize) {
    gauge!("iam_accounts_live").set(count as f64);
}

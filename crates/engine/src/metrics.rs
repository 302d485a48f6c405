//! Prometheus metrics owned by the command-processing core.
//!
//! These counters are incremented where the signal originates: the block
//! write inside the engine and the fail-open branch of the status
//! evaluator. The server crate registers them into its scrape registry
//! alongside its own HTTP-level metrics.

use prometheus::{IntCounter, IntCounterVec, Opts};
use std::sync::LazyLock;

pub static BLOCKS_APPLIED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "veto_blocks_applied_total",
            "Merchant blocks written by block type",
        ),
        &["block_type"],
    )
    .expect("metric creation failed")
});

pub static FAILOPEN_READS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "veto_status_failopen_reads_total",
        "Status reads that failed open on a storage error",
    )
    .expect("metric creation failed")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let before = BLOCKS_APPLIED.with_label_values(&["PERMANENT"]).get();
        BLOCKS_APPLIED.with_label_values(&["PERMANENT"]).inc();
        assert!(BLOCKS_APPLIED.with_label_values(&["PERMANENT"]).get() > before);

        let before = FAILOPEN_READS.get();
        FAILOPEN_READS.inc();
        assert!(FAILOPEN_READS.get() > before);
    }
}

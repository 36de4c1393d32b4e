//! Domain-specific assertion macros for cwtail harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that say which
//! delivery guarantee was violated.

/// Assert that no record ID was rendered twice for the same region.
///
/// ```rust
/// assert_no_duplicates!(sink.captured());
/// ```
#[macro_export]
macro_rules! assert_no_duplicates {
    ($captured:expr) => {{
        let captured: &[$crate::common::Captured] = &$captured;
        let mut seen = std::collections::HashSet::new();
        for c in captured {
            if !seen.insert((c.record.region.clone(), c.record.record_id.clone())) {
                panic!(
                    "assert_no_duplicates! failed: {} / {} rendered more than once.\n  {} records checked.",
                    c.record.region,
                    c.record.record_id,
                    captured.len()
                );
            }
        }
    }};
}

/// Assert the exact render order of IDs for one region.
///
/// ```rust
/// assert_region_ids!(sink, "eu-west-1", ["e1", "e2", "e3"]);
/// ```
#[macro_export]
macro_rules! assert_region_ids {
    ($sink:expr, $region:expr, [$($id:expr),* $(,)?]) => {{
        let actual = $sink.ids_for($region);
        let expected: Vec<String> = vec![$($id.to_string()),*];
        pretty_assertions::assert_eq!(
            actual, expected,
            "assert_region_ids! failed for region {:?}", $region
        );
    }};
}

/// Assert that consecutive renders are at least `$period` apart.
///
/// ```rust
/// assert_min_spacing!(sink.times(), Duration::from_millis(500));
/// ```
#[macro_export]
macro_rules! assert_min_spacing {
    ($times:expr, $period:expr) => {{
        let times: Vec<tokio::time::Instant> = $times;
        let period: std::time::Duration = $period;
        for (i, pair) in times.windows(2).enumerate() {
            let gap = pair[1] - pair[0];
            if gap < period {
                panic!(
                    "assert_min_spacing! failed: renders {} and {} only {:?} apart (min {:?})",
                    i,
                    i + 1,
                    gap,
                    period
                );
            }
        }
    }};
}

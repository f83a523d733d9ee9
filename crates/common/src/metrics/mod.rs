//! Metrics and observability utilities
//!
//! Records pipeline metrics through the `metrics` facade. No exporter is
//! installed here; binaries decide where metrics go.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Metrics prefix for all Citechain metrics
pub const METRICS_PREFIX: &str = "citechain";

/// Buckets for registry lookup latency (in seconds)
pub const LOOKUP_BUCKETS: &[f64] = &[
    0.010,  // 10ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s - default lookup timeout
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Parsing metrics
    describe_counter!(
        format!("{}_citations_extracted_total", METRICS_PREFIX),
        Unit::Count,
        "Total citation matches found in paragraph text"
    );

    describe_counter!(
        format!("{}_citation_edges_total", METRICS_PREFIX),
        Unit::Count,
        "Total citation edges inserted or merged"
    );

    // Lookup metrics
    describe_counter!(
        format!("{}_case_lookups_total", METRICS_PREFIX),
        Unit::Count,
        "Total case-identifier lookups by outcome"
    );

    describe_histogram!(
        format!("{}_case_lookup_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Case-identifier lookup latency in seconds"
    );

    // Traversal metrics
    describe_counter!(
        format!("{}_paths_enumerated_total", METRICS_PREFIX),
        Unit::Count,
        "Total maximal citation paths enumerated"
    );

    describe_counter!(
        format!("{}_traversals_truncated_total", METRICS_PREFIX),
        Unit::Count,
        "Traversals stopped by a depth or path-count guard"
    );

    describe_histogram!(
        format!("{}_traversal_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Path enumeration latency per root in seconds"
    );

    // Cache metrics
    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache hits"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache misses"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record citation extraction
pub fn record_citations(count: usize) {
    counter!(format!("{}_citations_extracted_total", METRICS_PREFIX)).increment(count as u64);
}

/// Helper to record edge insertion
pub fn record_edge(resolved: bool) {
    let status = if resolved { "resolved" } else { "unresolved" };
    counter!(
        format!("{}_citation_edges_total", METRICS_PREFIX),
        "target" => status
    )
    .increment(1);
}

/// Helper to record lookup metrics
pub fn record_lookup(duration_secs: f64, provider: &str, outcome: &'static str) {
    counter!(
        format!("{}_case_lookups_total", METRICS_PREFIX),
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        format!("{}_case_lookup_duration_seconds", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .record(duration_secs);
}

/// Helper to record traversal metrics
pub fn record_traversal(duration_secs: f64, path_count: usize, truncated: bool) {
    counter!(format!("{}_paths_enumerated_total", METRICS_PREFIX)).increment(path_count as u64);

    histogram!(format!("{}_traversal_duration_seconds", METRICS_PREFIX)).record(duration_secs);

    if truncated {
        counter!(format!("{}_traversals_truncated_total", METRICS_PREFIX)).increment(1);
    }
}

/// Helper to record cache metrics
pub fn record_cache(hit: bool, cache_name: &str) {
    if hit {
        counter!(
            format!("{}_cache_hits_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    } else {
        counter!(
            format!("{}_cache_misses_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    }
}

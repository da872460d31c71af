use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, register_int_gauge,
    Histogram, HistogramVec, IntCounterVec, IntGauge,
};

pub static OPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "quotebook_ops_total",
        "Requests by op and outcome",
        &["op", "outcome"]
    )
    .unwrap()
});

pub static OP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!("op_duration_seconds", "op durations", &["op"]).unwrap()
});

pub static SEARCH_MATCHES: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "search_matches",
        "Documents matched per search",
        vec![0.0, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]
    )
    .unwrap()
});

pub static STORE_DOCUMENTS: Lazy<IntGauge> =
    Lazy::new(|| register_int_gauge!("store_documents", "Documents in the quote store").unwrap());

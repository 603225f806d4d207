use lazy_static::lazy_static;
use log::warn;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

use crate::plate_detection::ClassificationResult;

lazy_static! {
    static ref CYCLES: IntCounterVec = register_int_counter_vec!(
        "plate_watch_cycles_total",
        "Recognition cycles by outcome",
        &["outcome"]
    )
    .expect("cycle counter registers once");
    static ref CLASSIFICATIONS: IntCounterVec = register_int_counter_vec!(
        "plate_watch_classifications_total",
        "Plate lookups by result",
        &["result"]
    )
    .expect("classification counter registers once");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    NoFrame,
    OcrFailed,
    NoPlate,
    Classified,
}

impl CycleOutcome {
    pub fn label(self) -> &'static str {
        match self {
            CycleOutcome::NoFrame => "no_frame",
            CycleOutcome::OcrFailed => "ocr_failed",
            CycleOutcome::NoPlate => "no_plate",
            CycleOutcome::Classified => "classified",
        }
    }
}

pub fn record_cycle(outcome: CycleOutcome) {
    CYCLES.with_label_values(&[outcome.label()]).inc();
}

pub fn record_classification(result: ClassificationResult) {
    CLASSIFICATIONS.with_label_values(&[result.label()]).inc();
}

pub fn cycle_count(outcome: CycleOutcome) -> u64 {
    CYCLES.with_label_values(&[outcome.label()]).get()
}

pub fn classification_count(result: ClassificationResult) -> u64 {
    CLASSIFICATIONS.with_label_values(&[result.label()]).get()
}

/// Prometheus text exposition of every registered metric.
pub fn gather_text() -> String {
    let mut buffer = Vec::new();
    if let Err(err) = TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
        warn!("Cannot encode metrics: {err}");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

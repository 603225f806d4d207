use std::io::BufRead;
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};

use super::classifier::PlateClassifier;
use super::display_sink::DisplaySink;
use super::frame::Frame;
use super::text_extractor::TextExtractor;
use super::DisplayState;
use crate::error::FrameUnavailable;
use crate::metrics::{self, CycleOutcome};

/// Where frames come from. `release` must be safe to call more than once.
pub trait FrameSource {
    fn acquire(&mut self) -> Result<Frame, FrameUnavailable>;
    fn release(&mut self);
}

/// Single-threaded capture → OCR → lookup → display loop.
///
/// Only a successful classification changes the display state. Cycles that
/// end without a plate, or fail on the way, leave it as it was.
pub struct RecognitionLoop {
    source: Box<dyn FrameSource>,
    extractor: TextExtractor,
    classifier: PlateClassifier,
    sink: Box<dyn DisplaySink>,
    state: DisplayState,
    cycle_interval: Duration,
    released: bool,
}

impl RecognitionLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        extractor: TextExtractor,
        classifier: PlateClassifier,
        sink: Box<dyn DisplaySink>,
        cycle_interval: Duration,
    ) -> Self {
        Self {
            source,
            extractor,
            classifier,
            sink,
            state: DisplayState::Idle,
            cycle_interval,
            released: false,
        }
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn run_cycle(&mut self) -> DisplayState {
        let frame = match self.source.acquire() {
            Ok(frame) => frame,
            Err(err) => {
                debug!("Skipping cycle: {err}");
                metrics::record_cycle(CycleOutcome::NoFrame);
                return self.state;
            }
        };

        self.sink.present_frame(&frame);

        let plate = match self.extractor.extract(&frame) {
            Ok(Some(plate)) => Some(plate),
            Ok(None) => {
                metrics::record_cycle(CycleOutcome::NoPlate);
                None
            }
            Err(err) => {
                warn!("OCR failed, no plate this cycle: {err}");
                metrics::record_cycle(CycleOutcome::OcrFailed);
                None
            }
        };

        if let Some(plate) = plate {
            let result = self.classifier.classify(&plate);
            metrics::record_classification(result);
            metrics::record_cycle(CycleOutcome::Classified);

            let next = DisplayState::from(result);
            if next != self.state {
                info!("Plate {plate}: {:?} -> {:?}", self.state, next);
            }
            self.state = next;
        }

        self.sink.publish(&frame, self.state);
        self.state
    }

    /// Runs cycles until `shutdown` receives a message or is disconnected,
    /// waiting `cycle_interval` after each cycle. Releases the frame source
    /// before returning the final state.
    pub fn run(mut self, shutdown: Receiver<()>) -> DisplayState {
        info!(
            "Recognition loop started, {} ms between cycles",
            self.cycle_interval.as_millis()
        );
        loop {
            self.run_cycle();
            match shutdown.recv_timeout(self.cycle_interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("Shutdown requested, releasing frame source");
        self.release();
        self.state
    }

    fn release(&mut self) {
        if !self.released {
            self.source.release();
            self.released = true;
        }
    }
}

impl Drop for RecognitionLoop {
    fn drop(&mut self) {
        self.release();
    }
}

/// Blocks until a line arrives on `input`, then requests shutdown. End of
/// input or a read error is not a stop request and returns `false` without
/// sending, so a detached stdin does not end the loop.
pub fn stop_on_enter<R: BufRead>(mut input: R, shutdown: &Sender<()>) -> bool {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => {
            debug!("Input closed, Enter will not stop the loop");
            false
        }
        Ok(_) => shutdown.send(()).is_ok(),
        Err(err) => {
            warn!("Cannot read stop input: {err}");
            false
        }
    }
}

use log::{debug, info};

use super::frame::Frame;
use super::DisplayState;

/// Presentation side of the loop. Gets every captured frame as soon as it is
/// available and the resulting state once the cycle is done.
pub trait DisplaySink {
    fn present_frame(&mut self, frame: &Frame);
    fn publish(&mut self, frame: &Frame, state: DisplayState);
}

/// Headless sink that only logs state changes.
#[derive(Default)]
pub struct LogSink {
    last: Option<DisplayState>,
}

impl LogSink {
    pub fn last_state(&self) -> Option<DisplayState> {
        self.last
    }
}

impl DisplaySink for LogSink {
    fn present_frame(&mut self, frame: &Frame) {
        debug!("Frame {}x{} {:?}", frame.width(), frame.height(), frame.layout());
    }

    fn publish(&mut self, _frame: &Frame, state: DisplayState) {
        if self.last != Some(state) {
            info!("Display state {:?}", state);
        }
        self.last = Some(state);
    }
}

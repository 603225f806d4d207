use log::warn;
use opencv::core::Point;
use opencv::core::Rect;
use opencv::core::Scalar;
use opencv::core::CV_8UC1;
use opencv::core::CV_8UC3;
use opencv::highgui::destroy_window;
use opencv::highgui::imshow;
use opencv::highgui::named_window;
use opencv::highgui::wait_key;
use opencv::highgui::WINDOW_AUTOSIZE;
use opencv::imgproc::put_text;
use opencv::imgproc::FONT_HERSHEY_PLAIN;
use opencv::imgproc::LINE_8;
use opencv::imgproc::{rectangle, LineTypes};
use opencv::prelude::Mat;
use opencv::prelude::MatTraitManual;

use super::display_sink::DisplaySink;
use super::frame::{Frame, PixelLayout};
use super::DisplayState;

const BANNER_HEIGHT: i32 = 40;

/// BGR colour of the banner for each state.
pub fn state_colour(state: DisplayState) -> Scalar {
    match state {
        DisplayState::Flagged => Scalar::from((0.0, 0.0, 255.0)),
        DisplayState::Clear => Scalar::from((0.0, 255.0, 0.0)),
        DisplayState::Unknown | DisplayState::Idle => Scalar::from((128.0, 128.0, 128.0)),
    }
}

/// OpenCV window showing the latest frame under a banner coloured by state.
pub struct IndicatorWindow {
    id: String,
    state: DisplayState,
}

impl IndicatorWindow {
    pub fn new(id: &str) -> opencv::Result<Self> {
        named_window(id, WINDOW_AUTOSIZE)?;
        Ok(Self {
            id: id.to_string(),
            state: DisplayState::Idle,
        })
    }

    fn render(&self, frame: &Frame) -> opencv::Result<()> {
        let mut image = frame_to_mat(frame)?;
        let colour = state_colour(self.state);
        let banner = Rect::new(0, 0, frame.width() as i32, BANNER_HEIGHT);
        rectangle(&mut image, banner, colour, -1, LineTypes::LINE_4 as i32, 0)?;
        put_text(
            &mut image,
            &format!("{:?}", self.state),
            Point::new(10, BANNER_HEIGHT - 10),
            FONT_HERSHEY_PLAIN,
            2.0,
            Scalar::from((255.0, 255.0, 255.0)),
            2,
            LINE_8,
            false,
        )?;
        imshow(&self.id, &image)?;
        wait_key(1)?;
        Ok(())
    }
}

fn frame_to_mat(frame: &Frame) -> opencv::Result<Mat> {
    let typ = match frame.layout() {
        PixelLayout::Gray8 => CV_8UC1,
        PixelLayout::Bgr8 | PixelLayout::Rgb8 => CV_8UC3,
    };
    let mut image = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        typ,
        Scalar::all(0.0),
    )?;
    image.data_bytes_mut()?.copy_from_slice(frame.data());
    if frame.layout() == PixelLayout::Rgb8 {
        let mut bgr = Mat::default();
        opencv::imgproc::cvt_color(&image, &mut bgr, opencv::imgproc::COLOR_RGB2BGR, 0)?;
        return Ok(bgr);
    }
    Ok(image)
}

impl DisplaySink for IndicatorWindow {
    fn present_frame(&mut self, frame: &Frame) {
        if let Err(err) = self.render(frame) {
            warn!("Cannot show frame: {err}");
        }
    }

    fn publish(&mut self, frame: &Frame, state: DisplayState) {
        self.state = state;
        if let Err(err) = self.render(frame) {
            warn!("Cannot show state {state:?}: {err}");
        }
    }
}

impl Drop for IndicatorWindow {
    fn drop(&mut self) {
        if let Err(err) = destroy_window(&self.id) {
            warn!("Cannot close window {}: {err}", self.id);
        }
    }
}

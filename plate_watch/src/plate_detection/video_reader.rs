use log::{info, warn};
use opencv::core::StsError;
use opencv::prelude::Mat;
use opencv::prelude::MatTraitConst;
use opencv::prelude::MatTraitConstManual;
use opencv::prelude::VideoCaptureTrait;
use opencv::prelude::VideoCaptureTraitConst;
use opencv::videoio::VideoCapture;
use opencv::videoio::CAP_ANY;
use opencv::videoio::CAP_PROP_POS_FRAMES;

use super::frame::{Frame, PixelLayout};
use super::recognition_loop::FrameSource;
use crate::config::Config;
use crate::error::FrameUnavailable;

/// Frames from a camera device, or from a video file that loops at the end.
pub struct VideoReader {
    capture: VideoCapture,
    from_file: bool,
}

impl VideoReader {
    pub fn camera(index: i32) -> opencv::Result<Self> {
        let capture = VideoCapture::new(index, CAP_ANY)?;
        Self::opened(capture, format!("camera {index}"), false)
    }

    pub fn file(path: &str) -> opencv::Result<Self> {
        let capture = VideoCapture::from_file(path, CAP_ANY)?;
        Self::opened(capture, path.to_string(), true)
    }

    pub fn from_config(config: &Config) -> opencv::Result<Self> {
        match config.video_file.as_deref() {
            Some(path) => Self::file(path),
            None => Self::camera(config.camera_index),
        }
    }

    fn opened(capture: VideoCapture, name: String, from_file: bool) -> opencv::Result<Self> {
        if !capture.is_opened()? {
            return Err(opencv::Error::new(StsError, format!("cannot open {name}")));
        }
        info!("Reading frames from {name}");
        Ok(Self { capture, from_file })
    }

    fn grab(&mut self) -> opencv::Result<Option<Mat>> {
        let mut image = Mat::default();
        let grabbed = self.capture.read(&mut image)?;
        if grabbed && !image.empty() {
            return Ok(Some(image));
        }
        if self.from_file {
            self.capture.set(CAP_PROP_POS_FRAMES, 0.0)?;
        }
        Ok(None)
    }
}

/// Copies a BGR or single channel `Mat` into an owned frame.
pub fn mat_to_frame(image: &Mat) -> opencv::Result<Frame> {
    let layout = match image.channels() {
        1 => PixelLayout::Gray8,
        3 => PixelLayout::Bgr8,
        other => {
            return Err(opencv::Error::new(
                StsError,
                format!("unsupported channel count {other}"),
            ))
        }
    };
    let contiguous = if image.is_continuous() {
        image.data_bytes()?.to_vec()
    } else {
        image.try_clone()?.data_bytes()?.to_vec()
    };
    Frame::new(image.cols() as u32, image.rows() as u32, layout, contiguous)
        .map_err(|err| opencv::Error::new(StsError, err.to_string()))
}

impl FrameSource for VideoReader {
    fn acquire(&mut self) -> Result<Frame, FrameUnavailable> {
        match self.grab() {
            Ok(Some(image)) => mat_to_frame(&image).map_err(|err| {
                warn!("Cannot convert frame: {err}");
                FrameUnavailable
            }),
            Ok(None) => Err(FrameUnavailable),
            Err(err) => {
                warn!("Cannot read frame: {err}");
                Err(FrameUnavailable)
            }
        }
    }

    fn release(&mut self) {
        if let Err(err) = self.capture.release() {
            warn!("Cannot release capture: {err}");
        }
    }
}

use image::{GrayImage, Luma};

use crate::error::FrameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 3 bytes per pixel, blue first. What OpenCV cameras hand out.
    Bgr8,
    Rgb8,
    Gray8,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Bgr8 | PixelLayout::Rgb8 => 3,
            PixelLayout::Gray8 => 1,
        }
    }
}

/// One captured image. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty);
        }
        let expected = width as usize * height as usize * layout.channels();
        if data.len() != expected {
            return Err(FrameError::SizeMismatch {
                width,
                height,
                layout,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Luminance-only copy of the frame, BT.601 weights in 14 bit fixed point
    /// (same rounding as OpenCV's `COLOR_BGR2GRAY`).
    pub fn to_grayscale(&self) -> GrayImage {
        let channels = self.layout.channels();
        let width = self.width as usize;
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let offset = (y as usize * width + x as usize) * channels;
            let pixel = &self.data[offset..offset + channels];
            let value = match self.layout {
                PixelLayout::Gray8 => pixel[0],
                PixelLayout::Bgr8 => luma(pixel[2], pixel[1], pixel[0]),
                PixelLayout::Rgb8 => luma(pixel[0], pixel[1], pixel[2]),
            };
            Luma([value])
        })
    }
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 4899 * r as u32 + 9617 * g as u32 + 1868 * b as u32;
    ((weighted + (1 << 13)) >> 14) as u8
}

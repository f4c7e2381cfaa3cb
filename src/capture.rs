use crate::frame::{Frame, FrameError};
use opencv::{core::Mat, prelude::*, videoio};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to open camera {0}")]
    DeviceUnavailable(i32),
    #[error("Failed to open camera: {0}")]
    OpenCameraFailed(opencv::Error),
    #[error("Failed to read frame: {0}")]
    ReadFrameFailed(opencv::Error),
    #[error("Camera returned no frame")]
    StreamEnded,
}

/// Where frames come from: a live capture device or a single decoded image.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Continuous sources are polled in a loop; single-shot sources are read once.
    fn continuous(&self) -> bool;
}

#[derive(Debug)]
pub struct Camera {
    capture: videoio::VideoCapture,
}

impl Camera {
    pub fn open(index: i32) -> Result<Self, CaptureError> {
        let capture = videoio::VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(CaptureError::OpenCameraFailed)?;
        if !capture
            .is_opened()
            .map_err(CaptureError::OpenCameraFailed)?
        {
            return Err(CaptureError::DeviceUnavailable(index));
        }
        tracing::info!("use camera {}", index);
        Ok(Self { capture })
    }
}

impl FrameSource for Camera {
    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        let mut mat = Mat::default();
        let read = self
            .capture
            .read(&mut mat)
            .map_err(CaptureError::ReadFrameFailed)?;
        if !read || mat.empty() {
            return Err(CaptureError::StreamEnded);
        }
        Ok(Frame::from_mat(mat))
    }

    fn continuous(&self) -> bool {
        true
    }
}

pub struct StillImage {
    frame: Frame,
}

impl StillImage {
    pub fn open(path: &Path) -> Result<Self, FrameError> {
        let frame = Frame::open(path)?;
        Ok(Self { frame })
    }

    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }
}

impl FrameSource for StillImage {
    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        Ok(self.frame.clone())
    }

    fn continuous(&self) -> bool {
        false
    }
}

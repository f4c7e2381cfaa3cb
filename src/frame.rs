use base64::{engine::general_purpose, Engine as _};
use opencv::{
    core::{Mat, Size, Vector},
    imgcodecs, imgproc,
    prelude::*,
};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Failed to decode image {0}")]
    DecodeFailed(String),
    #[error("Cannot resize an empty frame")]
    EmptyFrame,
    #[error("Failed to resize frame: {0}")]
    ResizeFailed(opencv::Error),
    #[error("Failed to encode frame: {0}")]
    EncodeFrameFailed(opencv::Error),
    #[error("OpenCV error: {0}")]
    OpenCvError(opencv::Error),
}

impl From<opencv::Error> for FrameError {
    fn from(err: opencv::Error) -> Self {
        FrameError::OpenCvError(err)
    }
}

/// Target boxes the upload is scaled into, picked by frame orientation.
pub const PORTRAIT_TARGET: (i32, i32) = (480, 640);
pub const LANDSCAPE_TARGET: (i32, i32) = (640, 480);

/// One raster image, either read from a capture device or decoded from a file.
#[derive(Debug, Clone)]
pub struct Frame {
    mat: Mat,
}

impl Frame {
    pub fn from_mat(mat: Mat) -> Self {
        Self { mat }
    }

    pub fn open(path: &Path) -> Result<Self, FrameError> {
        let mat = imgcodecs::imread(path.to_string_lossy().as_ref(), imgcodecs::IMREAD_COLOR)?;
        if mat.empty() {
            return Err(FrameError::DecodeFailed(path.display().to_string()));
        }
        tracing::info!("use image {}", path.display());
        Ok(Self { mat })
    }

    pub fn width(&self) -> i32 {
        self.mat.cols()
    }

    pub fn height(&self) -> i32 {
        self.mat.rows()
    }

    pub fn mat(&self) -> &Mat {
        &self.mat
    }

    /// Scales the frame into the orientation-matched target box with a single
    /// uniform factor, so neither dimension overflows the box.
    pub fn resize_to_target(&self) -> Result<Frame, FrameError> {
        if self.mat.empty() {
            return Err(FrameError::EmptyFrame);
        }
        let (width, height) = scaled_dimensions(self.width(), self.height());
        let mut resized = Mat::default();
        imgproc::resize(
            &self.mat,
            &mut resized,
            Size::new(width, height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .map_err(FrameError::ResizeFailed)?;
        tracing::debug!("resized to {}x{}", width, height);
        Ok(Frame { mat: resized })
    }

    pub fn to_jpeg(&self) -> Result<Vec<u8>, FrameError> {
        let mut buf = Vector::<u8>::new();
        imgcodecs::imencode(".jpg", &self.mat, &mut buf, &Vector::new())
            .map_err(FrameError::EncodeFrameFailed)?;
        Ok(buf.into())
    }

    /// JPEG-compress, then base64-encode. Side-effect-free.
    pub fn encode(&self) -> Result<EncodedPayload, FrameError> {
        let jpeg = self.to_jpeg()?;
        Ok(EncodedPayload::new(general_purpose::STANDARD.encode(jpeg)))
    }
}

/// Base64 text of a JPEG-compressed frame, ready to be placed in a request body.
#[derive(Debug, Clone)]
pub struct EncodedPayload {
    content: String,
}

impl EncodedPayload {
    pub fn new(content: String) -> Self {
        Self { content }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

fn target_box(width: i32, height: i32) -> (i32, i32) {
    if height > width {
        PORTRAIT_TARGET
    } else {
        LANDSCAPE_TARGET
    }
}

pub(crate) fn scale_factor(width: i32, height: i32) -> f64 {
    let (target_width, target_height) = target_box(width, height);
    f64::min(
        target_width as f64 / width as f64,
        target_height as f64 / height as f64,
    )
}

pub(crate) fn scaled_dimensions(width: i32, height: i32) -> (i32, i32) {
    let factor = scale_factor(width, height);
    (
        (width as f64 * factor) as i32,
        (height as f64 * factor) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    fn solid_frame(width: i32, height: i32) -> Frame {
        let mat =
            Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(128.0)).unwrap();
        Frame::from_mat(mat)
    }

    #[test]
    fn landscape_frame_scales_into_landscape_box() {
        let (width, height) = scaled_dimensions(1280, 720);
        assert_eq!((width, height), (640, 360));
    }

    #[test]
    fn portrait_frame_scales_into_portrait_box() {
        let (width, height) = scaled_dimensions(720, 1280);
        assert_eq!((width, height), (360, 640));
    }

    #[test]
    fn square_frame_uses_the_landscape_box() {
        let (width, height) = scaled_dimensions(1000, 1000);
        assert_eq!((width, height), (480, 480));
    }

    #[test]
    fn both_dimensions_share_one_factor() {
        for (w, h) in [(1920, 1080), (800, 600), (600, 800), (333, 999)] {
            let factor = scale_factor(w, h);
            let (sw, sh) = scaled_dimensions(w, h);
            assert_eq!(sw, (w as f64 * factor) as i32);
            assert_eq!(sh, (h as f64 * factor) as i32);
        }
    }

    #[test]
    fn scaled_dimensions_fit_the_selected_box() {
        for (w, h) in [(4000, 100), (100, 4000), (640, 480), (481, 480)] {
            let (sw, sh) = scaled_dimensions(w, h);
            let (tw, th) = if h > w {
                PORTRAIT_TARGET
            } else {
                LANDSCAPE_TARGET
            };
            assert!(sw <= tw, "{}x{} scaled to {}x{}", w, h, sw, sh);
            assert!(sh <= th, "{}x{} scaled to {}x{}", w, h, sw, sh);
        }
    }

    #[test]
    fn resize_preserves_orientation() {
        let frame = solid_frame(720, 1280);
        let resized = frame.resize_to_target().unwrap();
        assert_eq!((resized.width(), resized.height()), (360, 640));
    }

    #[test]
    fn encode_round_trips_to_the_same_dimensions() {
        let frame = solid_frame(640, 480);
        let payload = frame.encode().unwrap();

        let jpeg = general_purpose::STANDARD.decode(payload.as_str()).unwrap();
        let decoded = imgcodecs::imdecode(&Vector::from_slice(&jpeg), imgcodecs::IMREAD_COLOR)
            .unwrap();
        assert_eq!(decoded.cols(), 640);
        assert_eq!(decoded.rows(), 480);
    }

    #[test]
    fn opening_a_missing_image_fails() {
        let err = Frame::open(Path::new("no-such-image.jpg")).unwrap_err();
        assert!(matches!(err, FrameError::DecodeFailed(_)));
    }
}

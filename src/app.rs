use crate::annotation::{Annotate, AnnotationClient, AnnotationError, AnnotationResult};
use crate::capture::{Camera, CaptureError, FrameSource, StillImage};
use crate::cli::Cli;
use crate::config::{ConfigurationError, Settings, SourceConfig};
use crate::discovery::{DiscoveryDocument, DiscoveryError};
use crate::frame::{Frame, FrameError};
use crate::monitor::{Monitor, MonitorError, MonitorEvent};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("Annotation error: {0}")]
    Annotation(#[from] AnnotationError),
    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),
}

/// One acquisition source, one annotation backend, one display. Frames are
/// processed strictly one at a time; the session owns all of its resources.
pub struct AnnotationSession<S: FrameSource, A: Annotate> {
    source: S,
    annotator: A,
    monitor: Monitor,
}

impl<S: FrameSource, A: Annotate> AnnotationSession<S, A> {
    pub fn new(source: S, annotator: A, monitor: Monitor) -> Self {
        Self {
            source,
            annotator,
            monitor,
        }
    }

    /// resize -> encode -> annotate, for one frame.
    #[tracing::instrument(skip(self, frame))]
    async fn on_image(&self, frame: &Frame) -> Result<AnnotationResult, SessionError> {
        let resized = frame.resize_to_target()?;
        let payload = resized.encode()?;
        Ok(self.annotator.annotate(&payload).await?)
    }

    /// Prints the full result structure, then the top-ranked detected text if
    /// any text was found. Absence of text is not an error.
    fn on_detection(&self, result: &AnnotationResult) {
        println!("{:#}", result.as_value());
        if let Some(text) = result.top_text_description() {
            println!("{}", text);
        }
    }

    /// Runs the session to completion. `Ok(true)` is a successful single shot
    /// or a clean stop; `Ok(false)` is a detected failure (failed read or a
    /// service-reported error). Transport and resource failures propagate.
    pub async fn run(&mut self) -> Result<bool, SessionError> {
        if self.source.continuous() {
            self.run_continuous().await
        } else {
            self.run_single_shot().await
        }
    }

    async fn run_single_shot(&mut self) -> Result<bool, SessionError> {
        let frame = self.source.next_frame()?;
        let result = self.on_image(&frame).await?;
        self.on_detection(&result);
        if let Some(error) = result.error() {
            tracing::error!("annotation failed: {}", error);
            return Ok(false);
        }
        Ok(true)
    }

    async fn run_continuous(&mut self) -> Result<bool, SessionError> {
        loop {
            let frame = match self.source.next_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::error!("stopping: {}", err);
                    return Ok(false);
                }
            };
            let result = self.on_image(&frame).await?;
            self.on_detection(&result);
            if let Some(error) = result.error() {
                tracing::error!("annotation failed: {}", error);
                return Ok(false);
            }
            self.monitor.show(&frame)?;
            if self.monitor.pause()? == MonitorEvent::Stop {
                tracing::info!("stop requested");
                return Ok(true);
            }
        }
    }
}

/// Wires the CLI selection and settings into a running session.
pub async fn start_session(cli: Cli, settings: Settings) -> Result<bool, SessionError> {
    let source = SourceConfig::from_options(cli.camera, cli.image)?;

    let document = DiscoveryDocument::load(&settings.discovery.document_path)?;
    let max_results = cli.max_results.unwrap_or(settings.annotation.max_results);
    let client = AnnotationClient::new(&document, &cli.api_key, max_results);
    let monitor = Monitor::new(
        settings.capture.window_name.clone(),
        settings.capture.frame_delay_ms,
    );

    match source {
        SourceConfig::Camera(index) => {
            let camera = Camera::open(index)?;
            AnnotationSession::new(camera, client, monitor).run().await
        }
        SourceConfig::Image(path) => {
            let image = StillImage::open(&path)?;
            AnnotationSession::new(image, client, monitor).run().await
        }
    }
}

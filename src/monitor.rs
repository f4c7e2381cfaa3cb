use crate::frame::Frame;
use opencv::highgui;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to display frame: {0}")]
    ShowFailed(opencv::Error),
    #[error("Failed to poll display events: {0}")]
    WaitFailed(opencv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    Continue,
    Stop,
}

const ESCAPE: i32 = 27;

/// On-screen window showing the most recent raw camera frame. The window is
/// created lazily on the first `show`.
pub struct Monitor {
    window: String,
    frame_delay_ms: i32,
}

impl Monitor {
    pub fn new(window: String, frame_delay_ms: i32) -> Self {
        Self {
            window,
            frame_delay_ms,
        }
    }

    pub fn show(&self, frame: &Frame) -> Result<(), MonitorError> {
        highgui::imshow(&self.window, frame.mat()).map_err(MonitorError::ShowFailed)
    }

    /// Pumps window events for roughly one frame delay. `q` or ESC requests a
    /// clean stop.
    pub fn pause(&self) -> Result<MonitorEvent, MonitorError> {
        let key = highgui::wait_key(self.frame_delay_ms).map_err(MonitorError::WaitFailed)?;
        if key == 'q' as i32 || key == ESCAPE {
            Ok(MonitorEvent::Stop)
        } else {
            Ok(MonitorEvent::Continue)
        }
    }
}

use std::time::Duration;

use anyhow::{ensure, Result};
use log::info;
use plateau_defence_rendering::{FrameInput, Presentation, RenderingBackend, Scene};

/// Backend that pumps a fixed number of frames without drawing anything.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HeadlessBackend {
    frame: Duration,
    frames: u64,
}

impl HeadlessBackend {
    /// Creates a backend that simulates `seconds` at `fps` frames per second.
    pub(crate) fn new(fps: u32, seconds: f32) -> Result<Self> {
        ensure!(fps > 0, "frame rate must be positive");
        ensure!(
            seconds.is_finite() && seconds >= 0.0,
            "simulated duration must be a non-negative number of seconds, got {seconds}"
        );
        Ok(Self {
            frame: Duration::from_secs(1) / fps,
            frames: (seconds * fps as f32).round() as u64,
        })
    }

    /// Simulated time between two frames.
    #[must_use]
    pub(crate) fn frame(&self) -> Duration {
        self.frame
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool,
    {
        let mut scene = presentation.scene;
        info!(
            "{}: running {} headless frames of {:?}",
            presentation.window_title, self.frames, self.frame
        );
        for frame in 0..self.frames {
            if !update_scene(self.frame, FrameInput::default(), &mut scene) {
                info!("stopped after {} frames", frame + 1);
                break;
            }
        }
        Ok(())
    }
}

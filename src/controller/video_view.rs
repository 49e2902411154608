//! State behind the video view.

use crate::video::{FrameGeometry, StartOutcome};

#[derive(Debug, Clone)]
pub struct VideoView {
    pub station: usize,
    pub frame: String,
    pub has_video: bool,
    pub loading: bool,
    pub color: bool,
    pub geometry: FrameGeometry,
}

impl VideoView {
    pub fn new(color: bool) -> Self {
        Self {
            station: 0,
            frame: String::new(),
            has_video: false,
            loading: false,
            color,
            geometry: FrameGeometry::for_terminal(0, 0),
        }
    }

    /// Reset for a session that was just started on `station`.
    pub fn begin(&mut self, station: usize, geometry: FrameGeometry, outcome: StartOutcome) {
        self.station = station;
        self.geometry = geometry;
        self.frame.clear();
        match outcome {
            StartOutcome::NoVideo { .. } => {
                self.has_video = false;
                self.loading = false;
            }
            StartOutcome::Loading { .. } => {
                self.has_video = true;
                self.loading = true;
            }
        }
    }

    pub fn show_frame(&mut self, text: String) {
        self.frame = text;
        self.has_video = true;
        self.loading = false;
    }

    /// The session ended or failed.
    pub fn lose_video(&mut self) {
        self.has_video = false;
        self.loading = false;
    }

    /// Label for the color toggle: what pressing `C` switches to.
    pub fn toggle_label(&self) -> &'static str {
        if self.color {
            "no color"
        } else {
            "color"
        }
    }
}

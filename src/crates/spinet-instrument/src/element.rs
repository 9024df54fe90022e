//! The playback element attached to every instrument

/// Lightweight stand-in for a media element: it records the assigned source
/// URL and the duration learned once media data is known. It performs no
/// I/O of its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioElement {
    src: Option<String>,
    duration: Option<f64>,
}

impl AudioElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the element source.
    pub fn set_src(&mut self, src: impl Into<String>) {
        self.src = Some(src.into());
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// Record the media duration in seconds.
    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = Some(seconds);
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }
}

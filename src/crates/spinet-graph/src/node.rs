//! Gain and buffer-source nodes

use crate::buffer::AudioBuffer;
use crate::context::Destination;
use crate::render::Renderer;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Scalar parameter on a gain node.
#[derive(Debug, Clone)]
pub struct GainParam {
    value: Arc<RwLock<f32>>,
}

impl GainParam {
    fn new(value: f32) -> Self {
        GainParam {
            value: Arc::new(RwLock::new(value)),
        }
    }

    pub fn set_value(&self, value: f32) {
        *self.value.write() = value;
    }

    pub fn value(&self) -> f32 {
        *self.value.read()
    }
}

/// Volume control node. Sound played through a gain node is scaled by the
/// current value of its [`GainParam`]; nothing reaches the output until the
/// node is connected to the context destination.
///
/// Clones share the same parameter and routing state.
#[derive(Debug, Clone)]
pub struct GainNode {
    param: GainParam,
    routed: Arc<AtomicBool>,
}

impl GainNode {
    pub(crate) fn new() -> Self {
        GainNode {
            param: GainParam::new(1.0),
            routed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The gain parameter.
    pub fn gain(&self) -> &GainParam {
        &self.param
    }

    /// Route this node to the context output.
    pub fn connect(&self, _destination: &Destination) {
        self.routed.store(true, Ordering::Release);
    }

    pub fn is_routed(&self) -> bool {
        self.routed.load(Ordering::Acquire)
    }
}

/// One-shot playback node bound to decoded audio data.
///
/// Created by [`crate::AudioContext::create_buffer_source`]. Configure the
/// buffer, rate, and looping, connect to a gain node, then `start`. Once
/// started the node's voice lives in the renderer; the only remaining
/// control is the scheduled stop.
pub struct AudioBufferSourceNode {
    renderer: Arc<Mutex<Renderer>>,
    sample_rate: u32,
    buffer: Option<AudioBuffer>,
    playback_rate: f64,
    looping: bool,
    loop_start: f64,
    loop_end: f64,
    gain: Option<GainNode>,
    voice: Option<u64>,
    started: bool,
    pending_stop: Option<u64>,
}

impl AudioBufferSourceNode {
    pub(crate) fn new(renderer: Arc<Mutex<Renderer>>, sample_rate: u32) -> Self {
        AudioBufferSourceNode {
            renderer,
            sample_rate,
            buffer: None,
            playback_rate: 1.0,
            looping: false,
            loop_start: 0.0,
            loop_end: 0.0,
            gain: None,
            voice: None,
            started: false,
            pending_stop: None,
        }
    }

    /// Assign the decoded data this node plays.
    pub fn set_buffer(&mut self, buffer: AudioBuffer) {
        self.buffer = Some(buffer);
    }

    /// Playback speed multiplier (1.0 = normal, 2.0 = double speed).
    pub fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    /// Loop over the whole buffer when started.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Loop over `[start, end)` seconds of the buffer. Implies looping.
    pub fn set_loop_range(&mut self, start: f64, end: f64) {
        self.looping = true;
        self.loop_start = start;
        self.loop_end = end;
    }

    /// Route playback through `gain`. Connect before starting.
    pub fn connect(&mut self, gain: &GainNode) {
        self.gain = Some(gain.clone());
    }

    /// Begin playback at `offset` seconds into the buffer.
    ///
    /// Only immediate start is supported; `when` is accepted for parity
    /// with the conventional graph surface and is ignored. A source with no
    /// buffer starts silent; a second start is ignored with a warning.
    pub fn start(&mut self, _when: f64, offset: f64) {
        if self.started {
            log::warn!("buffer source started twice; ignoring restart");
            return;
        }
        self.started = true;

        let Some(buffer) = self.buffer.clone() else {
            log::warn!("buffer source started without a buffer; producing silence");
            return;
        };

        let buffer_rate = buffer.sample_rate() as f64;
        let position = offset.max(0.0) * buffer_rate;
        let loop_region = if self.looping {
            let start = self.loop_start.max(0.0) * buffer_rate;
            let end = if self.loop_end > 0.0 {
                (self.loop_end * buffer_rate).min(buffer.frames() as f64)
            } else {
                buffer.frames() as f64
            };
            (end > start).then_some((start, end))
        } else {
            None
        };

        let id = self.renderer.lock().spawn(
            buffer,
            position,
            self.playback_rate,
            self.gain.clone(),
            loop_region,
            self.pending_stop.take(),
        );
        self.voice = Some(id);
    }

    /// Schedule a stop at absolute context time `when`, in seconds on the
    /// audio clock. May be called before or after `start`; the voice is
    /// cancelled exactly when the clock reaches the scheduled frame.
    pub fn stop(&mut self, when: f64) {
        let frame = (when.max(0.0) * self.sample_rate as f64).round() as u64;
        match self.voice {
            Some(id) => self.renderer.lock().set_stop(id, frame),
            None => self.pending_stop = Some(frame),
        }
    }
}

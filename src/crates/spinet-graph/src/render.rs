//! Voice mixing and the rendered-frames clock

use crate::buffer::AudioBuffer;
use crate::node::GainNode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A single playing buffer instance.
pub(crate) struct Voice {
    buffer: AudioBuffer,
    /// Fractional frame position, in the buffer's own timebase.
    position: f64,
    rate: f64,
    gain: Option<GainNode>,
    /// Absolute renderer frame at which playback is cancelled.
    stop_frame: Option<u64>,
    /// Loop region in buffer frames; playback wraps from end back to start.
    loop_region: Option<(f64, f64)>,
    active: bool,
    id: u64,
}

impl Voice {
    /// Sample the buffer at a fractional frame position with linear
    /// interpolation. Mono buffers are duplicated to both output channels;
    /// channels beyond the first two are ignored.
    fn sample_at(&self, position: f64) -> Option<(f32, f32)> {
        if position >= self.buffer.frames() as f64 {
            return None;
        }
        if self.buffer.channels() == 1 {
            let sample = self.interpolate(position, 0);
            Some((sample, sample))
        } else {
            Some((self.interpolate(position, 0), self.interpolate(position, 1)))
        }
    }

    fn interpolate(&self, frame_position: f64, channel: usize) -> f32 {
        let data = self.buffer.data();
        let channels = self.buffer.channels() as usize;

        let base = frame_position.floor() as usize * channels + channel;
        if base >= data.len() {
            return 0.0;
        }

        let fraction = (frame_position - frame_position.floor()) as f32;
        let current = data[base];

        let next = base + channels;
        if next >= data.len() {
            return current;
        }

        current + (data[next] - current) * fraction
    }

    /// Mix this voice into `out` (interleaved stereo). `base_frame` is the
    /// absolute frame number of the first frame of the block; the scheduled
    /// stop is honored exactly when the clock reaches it, never before.
    fn mix(&mut self, out: &mut [f32], base_frame: u64, out_rate: u32) {
        if !self.active {
            return;
        }
        let amplitude = match &self.gain {
            Some(node) if node.is_routed() => node.gain().value(),
            // Not routed to the destination: the timeline still advances.
            _ => 0.0,
        };
        let step = self.rate * self.buffer.sample_rate() as f64 / out_rate as f64;

        for (i, frame) in out.chunks_mut(2).enumerate() {
            let now = base_frame + i as u64;
            if self.stop_frame.is_some_and(|stop| now >= stop) {
                self.active = false;
                return;
            }
            let Some((left, right)) = self.sample_at(self.position) else {
                self.active = false;
                return;
            };
            if frame.len() == 2 {
                frame[0] += left * amplitude;
                frame[1] += right * amplitude;
            }
            self.position += step;
            if let Some((start, end)) = self.loop_region {
                if self.position >= end {
                    self.position = start + (self.position - start) % (end - start);
                }
            }
            if self.stop_frame.is_some_and(|stop| now + 1 >= stop) {
                self.active = false;
                return;
            }
        }
    }
}

/// Owns the active voices, mixes them into interleaved stereo blocks, and
/// advances the frame clock the context derives its time from.
pub struct Renderer {
    voices: Vec<Voice>,
    sample_rate: u32,
    frames_rendered: Arc<AtomicU64>,
    next_id: u64,
}

impl Renderer {
    pub(crate) fn new(sample_rate: u32, frames_rendered: Arc<AtomicU64>) -> Self {
        Renderer {
            voices: Vec::new(),
            sample_rate,
            frames_rendered,
            next_id: 1,
        }
    }

    /// Add a voice, returning its id for later stop scheduling.
    pub(crate) fn spawn(
        &mut self,
        buffer: AudioBuffer,
        position: f64,
        rate: f64,
        gain: Option<GainNode>,
        loop_region: Option<(f64, f64)>,
        stop_frame: Option<u64>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.voices.push(Voice {
            buffer,
            position,
            rate,
            gain,
            stop_frame,
            loop_region,
            active: true,
            id,
        });
        id
    }

    pub(crate) fn set_stop(&mut self, id: u64, frame: u64) {
        if let Some(voice) = self.voices.iter_mut().find(|v| v.id == id) {
            voice.stop_frame = Some(frame);
        }
    }

    /// Mix every active voice into `out` (interleaved stereo), drop the
    /// finished ones, and advance the frame clock by the block length.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let base = self.frames_rendered.load(Ordering::Acquire);
        for voice in &mut self.voices {
            voice.mix(out, base, self.sample_rate);
        }
        self.voices.retain(|v| v.active);
        self.frames_rendered
            .store(base + (out.len() / 2) as u64, Ordering::Release);
    }

    /// Number of voices currently sounding.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

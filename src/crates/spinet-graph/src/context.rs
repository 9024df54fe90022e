//! The audio context: node factory, clock, and output

use crate::decode;
use crate::engine::AudioEngine;
use crate::node::{AudioBufferSourceNode, GainNode};
use crate::render::Renderer;
use crate::{AudioBuffer, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The context's output endpoint. Obtained from
/// [`AudioContext::destination`]; connecting a gain node to it makes the
/// node audible.
pub struct Destination {
    _private: (),
}

impl Destination {
    pub(crate) fn new() -> Self {
        Destination { _private: () }
    }
}

/// The collaborator every playback operation goes through: it creates
/// nodes, owns the mixing renderer, and keeps the audio clock.
///
/// The clock counts seconds of audio actually rendered; wall-clock time
/// never enters scheduling. A context is either live ([`AudioContext::new`]
/// opens the default output device and the stream drives rendering) or
/// offline ([`AudioContext::offline`], where the caller drives rendering
/// through [`AudioContext::process`] and time advances deterministically).
///
/// Cloning is cheap and clones share all state. Pass the context to
/// collaborators explicitly rather than holding it as a global.
#[derive(Clone)]
pub struct AudioContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    renderer: Arc<Mutex<Renderer>>,
    clock: Arc<AtomicU64>,
    sample_rate: u32,
    engine: Option<AudioEngine>,
}

impl AudioContext {
    /// Open the default output device and start rendering through it.
    pub fn new() -> Result<Self> {
        let engine = AudioEngine::new()?;
        let sample_rate = engine.sample_rate();
        let clock = Arc::new(AtomicU64::new(0));
        let renderer = Arc::new(Mutex::new(Renderer::new(sample_rate, Arc::clone(&clock))));

        let stream_renderer = Arc::clone(&renderer);
        engine.start(move |data| stream_renderer.lock().render(data))?;

        Ok(AudioContext {
            inner: Arc::new(ContextInner {
                renderer,
                clock,
                sample_rate,
                engine: Some(engine),
            }),
        })
    }

    /// A context with no output device; the caller drives rendering through
    /// [`AudioContext::process`].
    pub fn offline(sample_rate: u32) -> Self {
        let clock = Arc::new(AtomicU64::new(0));
        let renderer = Arc::new(Mutex::new(Renderer::new(sample_rate, Arc::clone(&clock))));
        AudioContext {
            inner: Arc::new(ContextInner {
                renderer,
                clock,
                sample_rate,
                engine: None,
            }),
        }
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    /// Seconds of audio rendered so far: the audio clock.
    pub fn current_time(&self) -> f64 {
        self.inner.clock.load(Ordering::Acquire) as f64 / self.inner.sample_rate as f64
    }

    /// Create a gain node. The node starts unrouted; connect it to
    /// [`AudioContext::destination`] to make it audible.
    pub fn create_gain(&self) -> GainNode {
        GainNode::new()
    }

    /// Create a one-shot buffer source playing into this context.
    pub fn create_buffer_source(&self) -> AudioBufferSourceNode {
        AudioBufferSourceNode::new(Arc::clone(&self.inner.renderer), self.inner.sample_rate)
    }

    /// The context output endpoint.
    pub fn destination(&self) -> Destination {
        Destination::new()
    }

    /// Render the next block (interleaved stereo) and advance the clock.
    /// Live contexts are driven by their output stream instead; call this
    /// only on offline contexts.
    pub fn process(&self, out: &mut [f32]) {
        self.inner.renderer.lock().render(out);
    }

    /// Number of voices currently sounding.
    pub fn active_voices(&self) -> usize {
        self.inner.renderer.lock().active_voices()
    }

    /// Whether a live output stream is running.
    pub fn is_running(&self) -> bool {
        self.inner.engine.as_ref().is_some_and(|e| e.is_running())
    }

    /// Decode encoded audio bytes into a buffer. `hint_ext` is the source's
    /// file extension, when known; it narrows the format probe.
    pub fn decode_audio_data(&self, bytes: &[u8], hint_ext: Option<&str>) -> Result<AudioBuffer> {
        decode::decode_audio_data(bytes, hint_ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_buffer(frames: usize, sample_rate: u32) -> AudioBuffer {
        let data = (0..frames).map(|i| i as f32).collect();
        AudioBuffer::from_interleaved(data, sample_rate, 1)
    }

    #[test]
    fn clock_advances_only_when_rendering() {
        let ctx = AudioContext::offline(44_100);
        assert_eq!(ctx.current_time(), 0.0);

        let mut block = vec![0.0f32; 44_100 * 2];
        ctx.process(&mut block);
        assert!((ctx.current_time() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn source_plays_through_routed_gain() {
        let ctx = AudioContext::offline(44_100);
        let gain = ctx.create_gain();
        gain.gain().set_value(0.5);
        gain.connect(&ctx.destination());

        let mut source = ctx.create_buffer_source();
        source.set_buffer(ramp_buffer(44_100, 44_100));
        source.connect(&gain);
        source.start(0.0, 0.0);
        assert_eq!(ctx.active_voices(), 1);

        let mut block = vec![0.0f32; 8];
        ctx.process(&mut block);
        assert_eq!(block[0], 0.0);
        assert_eq!(block[2], 0.5);
        assert_eq!(block[4], 1.0);
    }

    #[test]
    fn stop_scheduled_on_the_audio_clock_is_exact() {
        let ctx = AudioContext::offline(1_000);
        let gain = ctx.create_gain();
        gain.connect(&ctx.destination());

        let mut source = ctx.create_buffer_source();
        source.set_buffer(ramp_buffer(10_000, 1_000));
        source.connect(&gain);
        source.start(0.0, 0.0);
        source.stop(ctx.current_time() + 0.5);

        let mut block = vec![0.0f32; 499 * 2];
        ctx.process(&mut block);
        assert_eq!(ctx.active_voices(), 1, "one frame before the stop");

        let mut block = vec![0.0f32; 2];
        ctx.process(&mut block);
        assert_eq!(ctx.active_voices(), 0, "stopped at exactly half a second");
    }

    #[test]
    fn stop_before_start_is_honored() {
        let ctx = AudioContext::offline(1_000);
        let gain = ctx.create_gain();
        gain.connect(&ctx.destination());

        let mut source = ctx.create_buffer_source();
        source.set_buffer(ramp_buffer(10_000, 1_000));
        source.connect(&gain);
        source.stop(0.25);
        source.start(0.0, 0.0);

        let mut block = vec![0.0f32; 1_000];
        ctx.process(&mut block);
        assert_eq!(ctx.active_voices(), 0);
    }

    #[test]
    fn bufferless_source_starts_silent() {
        let ctx = AudioContext::offline(44_100);
        let mut source = ctx.create_buffer_source();
        source.start(0.0, 0.0);
        assert_eq!(ctx.active_voices(), 0);
    }

    #[test]
    fn second_start_is_ignored() {
        let ctx = AudioContext::offline(44_100);
        let gain = ctx.create_gain();
        gain.connect(&ctx.destination());

        let mut source = ctx.create_buffer_source();
        source.set_buffer(ramp_buffer(64, 44_100));
        source.connect(&gain);
        source.start(0.0, 0.0);
        source.start(0.0, 0.0);
        assert_eq!(ctx.active_voices(), 1);
    }

    #[test]
    fn contexts_share_state_across_clones() {
        let ctx = AudioContext::offline(44_100);
        let clone = ctx.clone();

        let gain = ctx.create_gain();
        gain.connect(&ctx.destination());
        let mut source = clone.create_buffer_source();
        source.set_buffer(ramp_buffer(64, 44_100));
        source.connect(&gain);
        source.start(0.0, 0.0);

        assert_eq!(ctx.active_voices(), 1);
    }
}

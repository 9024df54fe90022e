//! Audio graph primitives for sprite playback
//!
//! This crate provides the small audio graph an instrument plays through:
//! - Decoded PCM buffers shared between voices
//! - Gain and buffer-source nodes wired source → gain → destination
//! - A context whose clock is the number of frames actually rendered
//! - Output through cpal, or offline rendering driven by the caller
//! - Decoding of encoded audio bytes via symphonia
//!
//! # Examples
//!
//! ```
//! use spinet_graph::{AudioBuffer, AudioContext};
//!
//! let ctx = AudioContext::offline(44_100);
//! let buffer = AudioBuffer::from_interleaved(vec![0.5; 88_200], 44_100, 2);
//!
//! let gain = ctx.create_gain();
//! gain.gain().set_value(0.25);
//! gain.connect(&ctx.destination());
//!
//! let mut source = ctx.create_buffer_source();
//! source.set_buffer(buffer);
//! source.connect(&gain);
//! source.start(0.0, 0.0);
//! source.stop(ctx.current_time() + 0.5);
//!
//! let mut block = vec![0.0f32; 256];
//! ctx.process(&mut block);
//! assert!(block.iter().all(|&s| (s - 0.125).abs() < 1e-6));
//! ```

pub mod buffer;
pub mod context;
pub mod decode;
pub mod engine;
pub mod node;
pub mod render;

pub use buffer::AudioBuffer;
pub use context::{AudioContext, Destination};
pub use decode::decode_audio_data;
pub use engine::AudioEngine;
pub use node::{AudioBufferSourceNode, GainNode, GainParam};
pub use render::Renderer;

/// Audio graph errors
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("audio device error: {0}")]
    Device(String),

    #[error("failed to decode audio: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;

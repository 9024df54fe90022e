//! Instrument playback: named audio sprites over one decoded buffer
//!
//! An [`Instrument`] wraps one decoded sound and plays named sub-ranges of
//! it ("sprites") through an explicitly injected
//! [`spinet_graph::AudioContext`], with adjustable gain and playback rate.
//! Several sounds share one resource: the sprite map names where in the
//! buffer each of them lives.
//!
//! # Examples
//!
//! ```
//! use spinet_graph::{AudioBuffer, AudioContext};
//! use spinet_instrument::{Instrument, InstrumentConfig, PlayOptions};
//!
//! let ctx = AudioContext::offline(44_100);
//! let mut piano = Instrument::new(InstrumentConfig {
//!     id: Some("piano".into()),
//!     ctx: Some(ctx.clone()),
//!     ..InstrumentConfig::default()
//! });
//!
//! // Normally supplied by the loader; one second of silence here.
//! piano.set_audio_data(AudioBuffer::from_interleaved(vec![0.0; 44_100], 44_100, 1));
//! piano.play(None, &PlayOptions::default()).unwrap();
//! assert_eq!(ctx.active_voices(), 1);
//! ```

pub mod codec;
pub mod element;
pub mod instrument;
pub mod loader;
pub mod sprite;

pub use codec::Codec;
pub use element::AudioElement;
pub use instrument::{Instrument, InstrumentConfig, PlayOptions};
pub use sprite::{Sprite, SpriteMap, DEFAULT_SPRITE_KEY};

/// Why a play request could not be honored.
///
/// Unplayable requests are reported, never panicked over: the caller
/// decides whether to log, ignore, or propagate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayError {
    /// No decoded audio data has been assigned yet.
    #[error("no decoded audio data to play")]
    NoAudioData,

    /// The resolved sprite key has no entry in the sprite mapping.
    #[error("no sprite named `{0}`")]
    UnknownSprite(String),

    /// The instrument was built without an audio context.
    #[error("no audio context attached")]
    NoContext,
}

/// Failures in graph-node setup methods. Unlike playback these are loud:
/// the precondition is documented and violating it is an error, not a
/// silently skipped request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// The operation needs the injected audio context.
    #[error("an audio context is required for this operation")]
    MissingContext,
}

/// Failures while fetching and decoding an instrument's source.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("instrument has no source URL")]
    NoSource,

    #[error("an audio context is required to decode audio")]
    NoContext,

    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to decode `{url}`")]
    Decode {
        url: String,
        #[source]
        source: spinet_graph::GraphError,
    },
}

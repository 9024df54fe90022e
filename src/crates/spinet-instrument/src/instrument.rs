//! The instrument: one decoded sound, many named sprites

use crate::codec::{self, Codec};
use crate::element::AudioElement;
use crate::sprite::{Sprite, SpriteMap, DEFAULT_SPRITE_KEY};
use crate::{PlayError, SetupError};
use spinet_graph::{AudioBuffer, AudioContext, GainNode};

/// Configuration for [`Instrument::new`]. Exactly these fields are
/// recognized; every one of them has a default.
#[derive(Clone)]
pub struct InstrumentConfig {
    /// Identifier, if any.
    pub id: Option<String>,
    /// Display name, if any.
    pub name: Option<String>,
    /// Candidate source URLs, one per codec, in preference order.
    pub urls: Vec<String>,
    /// Sprite mapping. When absent, a whole-buffer default sprite is
    /// synthesized once audio data arrives.
    pub sprite: Option<SpriteMap>,
    /// Preferred source format.
    pub format: Option<Codec>,
    /// Initial gain.
    pub gain: f32,
    /// The audio graph to play through. Without one the instrument holds
    /// metadata only: no gain node is created and play requests fail.
    pub ctx: Option<AudioContext>,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        InstrumentConfig {
            id: None,
            name: None,
            urls: Vec::new(),
            sprite: None,
            format: None,
            gain: 1.0,
            ctx: None,
        }
    }
}

/// Per-play overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayOptions {
    /// Playback speed multiplier applied to the source node.
    pub playback_rate: Option<f64>,
}

/// One sound resource and the named sprites that play out of it.
///
/// An instrument is mostly metadata (identifier, candidate URLs, sprite
/// mapping, preferred format) around one piece of decoded audio data and
/// two graph handles: the playback element it always owns, and the gain
/// node it owns when an [`AudioContext`] was injected. Gain and sprite data
/// may be mutated at any time; audio data is assigned once the decode
/// pipeline has produced it.
pub struct Instrument {
    /// Identifier, if any.
    pub id: Option<String>,
    /// Display name, if any.
    pub name: Option<String>,
    /// Candidate source URLs, one per codec.
    pub urls: Vec<String>,
    /// Sprite mapping; mutable at any time.
    pub sprite: Option<SpriteMap>,
    /// Preferred source format.
    pub format: Option<Codec>,
    gain: f32,
    duration: Option<f64>,
    url: Option<String>,
    ctx: Option<AudioContext>,
    audio_data: Option<AudioBuffer>,
    audio_node: AudioElement,
    gain_node: Option<GainNode>,
}

impl Instrument {
    /// Build an instrument from `config`: the first URL (if any) becomes
    /// the active source, the playback element is always created, and a
    /// gain node is created only when a context was supplied.
    pub fn new(config: InstrumentConfig) -> Self {
        let InstrumentConfig {
            id,
            name,
            urls,
            sprite,
            format,
            gain,
            ctx,
        } = config;

        let url = urls.first().cloned();
        let mut instrument = Instrument {
            id,
            name,
            urls,
            sprite,
            format,
            gain,
            duration: None,
            url,
            ctx,
            audio_data: None,
            audio_node: AudioElement::new(),
            gain_node: None,
        };

        instrument.create_audio_node();
        if instrument.ctx.is_some() {
            // Cannot fail: a context is present.
            let _ = instrument.create_gain_node();
        }
        instrument
    }

    /// Current gain value.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Duration of the loaded media in seconds, rounded to one decimal
    /// place; unset until [`Instrument::update_duration`] has run with a
    /// known element duration.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// The active source URL.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The injected audio context, if any.
    pub fn ctx(&self) -> Option<&AudioContext> {
        self.ctx.as_ref()
    }

    /// The decoded audio data, once assigned.
    pub fn audio_data(&self) -> Option<&AudioBuffer> {
        self.audio_data.as_ref()
    }

    /// The playback element.
    pub fn element(&self) -> &AudioElement {
        &self.audio_node
    }

    pub fn element_mut(&mut self) -> &mut AudioElement {
        &mut self.audio_node
    }

    /// The instrument's gain node, present when a context was supplied.
    pub fn gain_node(&self) -> Option<&GainNode> {
        self.gain_node.as_ref()
    }

    /// The URL in `urls` whose file extension matches `codec`, if any.
    pub fn url_for_codec(&self, codec: Codec) -> Option<&str> {
        self.urls
            .iter()
            .map(String::as_str)
            .find(|url| codec::url_extension(url).and_then(Codec::from_extension) == Some(codec))
    }

    /// Point the active source at the URL for `codec`. Returns whether a
    /// matching URL existed. The playback element keeps its old source
    /// until [`Instrument::create_audio_node`] replaces it.
    pub fn select_format(&mut self, codec: Codec) -> bool {
        match self.url_for_codec(codec).map(str::to_string) {
            Some(url) => {
                self.url = Some(url);
                true
            }
            None => false,
        }
    }

    /// Set the gain and, when a gain node exists, write it through to the
    /// node's gain parameter. No bounds are enforced.
    pub fn set_gain(&mut self, value: f32) {
        self.gain = value;
        if let Some(node) = &self.gain_node {
            node.gain().set_value(value);
        }
    }

    /// Refresh the stored duration from the playback element, rounded to
    /// one decimal place.
    pub fn update_duration(&mut self) {
        self.duration = self.audio_node.duration().map(round_tenth);
    }

    /// Replace the playback element with a fresh one; an active URL is
    /// assigned as its source immediately.
    pub fn create_audio_node(&mut self) {
        let mut node = AudioElement::new();
        if let Some(url) = &self.url {
            node.set_src(url.clone());
        }
        self.audio_node = node;
    }

    /// Create the gain node via the injected context and initialize it with
    /// the current gain value. Requires a context.
    pub fn create_gain_node(&mut self) -> Result<(), SetupError> {
        let ctx = self.ctx.clone().ok_or(SetupError::MissingContext)?;
        self.gain_node = Some(ctx.create_gain());
        self.set_gain(self.gain);
        Ok(())
    }

    /// Assign decoded audio data: the element learns the media duration,
    /// the stored duration is refreshed, and, only if no sprite mapping
    /// exists yet, a single default sprite spanning the full duration is
    /// synthesized. An existing mapping is left untouched.
    pub fn set_audio_data(&mut self, data: AudioBuffer) {
        self.audio_node.set_duration(data.duration());
        self.audio_data = Some(data);
        self.update_duration();

        if self.sprite.is_none() {
            let mut map = SpriteMap::new();
            map.insert(
                DEFAULT_SPRITE_KEY.to_string(),
                Sprite::span(0.0, self.duration.unwrap_or_default()),
            );
            self.sprite = Some(map);
        }
    }

    /// Play a sprite. `sprite_key` defaults to the synthesized
    /// `_default` sprite when omitted.
    ///
    /// On success a buffer source is created from the context, wired
    /// source → gain node → destination, started at the sprite's start
    /// offset, and (unless the sprite loops) scheduled to stop after
    /// `end - start` seconds on the audio clock. Overlapping plays layer;
    /// nothing is queued or cancelled.
    ///
    /// Unplayable requests come back as [`PlayError`]; nothing is logged
    /// here and nothing panics.
    pub fn play(&self, sprite_key: Option<&str>, options: &PlayOptions) -> Result<(), PlayError> {
        let data = self.audio_data.as_ref().ok_or(PlayError::NoAudioData)?;
        let key = sprite_key.unwrap_or(DEFAULT_SPRITE_KEY);
        let sprite = self
            .sprite
            .as_ref()
            .and_then(|map| map.get(key))
            .ok_or_else(|| PlayError::UnknownSprite(key.to_string()))?;

        let ctx = self.ctx.as_ref().ok_or(PlayError::NoContext)?;
        let gain_node = self.gain_node.as_ref().ok_or(PlayError::NoContext)?;

        let mut source = ctx.create_buffer_source();
        source.set_buffer(data.clone());
        if let Some(rate) = options.playback_rate {
            source.set_playback_rate(rate);
        }
        source.connect(gain_node);
        gain_node.connect(&ctx.destination());

        if sprite.looped {
            source.set_loop_range(sprite.start, sprite.end);
            source.start(0.0, sprite.start);
        } else {
            source.start(0.0, sprite.start);
            source.stop(ctx.current_time() + sprite.duration());
        }

        log::debug!(
            "playing sprite `{key}` [{:.3}s..{:.3}s]{}",
            sprite.start,
            sprite.end,
            if sprite.looped { " looped" } else { "" },
        );
        Ok(())
    }
}

fn round_tenth(seconds: f64) -> f64 {
    (seconds * 10.0).round() / 10.0
}

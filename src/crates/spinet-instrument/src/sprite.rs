//! Named sub-ranges of a decoded buffer

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of the sprite synthesized to span the whole buffer when no mapping
/// was provided.
pub const DEFAULT_SPRITE_KEY: &str = "_default";

/// A named sub-range within one decoded audio buffer: start/end offsets in
/// seconds plus a loop flag. Several "sounds" share one resource by each
/// claiming a range of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds; not before `start`.
    pub end: f64,
    /// Repeat the range instead of stopping after one pass.
    #[serde(rename = "loop", default)]
    pub looped: bool,
}

impl Sprite {
    /// A non-looping sprite over `[start, end]`.
    pub fn span(start: f64, end: f64) -> Self {
        Sprite {
            start,
            end,
            looped: false,
        }
    }

    /// Length of one pass in seconds; malformed ranges count as zero.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Sprite mapping: sprite key to time range. Matches the JSON emitted by
/// common sprite-sheet tools:
/// `{"c0": {"start": 105, "end": 112.45, "loop": false}}`.
pub type SpriteMap = HashMap<String, Sprite>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sprite_map_json() {
        let json = r#"{
            "c0": { "start": 105, "end": 112.45077097505668, "loop": false },
            "d1": { "start": 114, "end": 121.46875283446713 }
        }"#;
        let map: SpriteMap = serde_json::from_str(json).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["c0"].start, 105.0);
        assert!(!map["d1"].looped, "loop defaults to false");
    }

    #[test]
    fn loop_field_round_trips() {
        let sprite = Sprite {
            start: 1.0,
            end: 2.0,
            looped: true,
        };
        let json = serde_json::to_string(&sprite).unwrap();
        assert!(json.contains("\"loop\":true"));
        assert_eq!(serde_json::from_str::<Sprite>(&json).unwrap(), sprite);
    }

    #[test]
    fn malformed_range_has_zero_duration() {
        assert_eq!(Sprite::span(5.0, 3.0).duration(), 0.0);
        assert_eq!(Sprite::span(3.0, 5.0).duration(), 2.0);
    }
}

//! Codec identification and URL extension matching

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Audio codecs an instrument source URL may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Mp3,
    M4a,
    Ogg,
    Wav,
    Flac,
}

impl Codec {
    /// Every known codec, in source-list convention order.
    pub const ALL: [Codec; 5] = [Codec::Mp3, Codec::M4a, Codec::Ogg, Codec::Wav, Codec::Flac];

    /// The file extension for this codec.
    pub fn extension(self) -> &'static str {
        match self {
            Codec::Mp3 => "mp3",
            Codec::M4a => "m4a",
            Codec::Ogg => "ogg",
            Codec::Wav => "wav",
            Codec::Flac => "flac",
        }
    }

    /// Identify a codec from a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Codec> {
        let ext = ext.to_ascii_lowercase();
        Codec::ALL.iter().copied().find(|c| c.extension() == ext)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown codec: `{0}`")]
pub struct UnknownCodec(String);

impl FromStr for Codec {
    type Err = UnknownCodec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Codec::from_extension(s).ok_or_else(|| UnknownCodec(s.to_string()))
    }
}

/// The file extension of a URL or path, ignoring query strings and
/// fragments.
pub fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(&['?', '#'][..]).next().unwrap_or(url);
    let name = path.rsplit(&['/', '\\'][..]).next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

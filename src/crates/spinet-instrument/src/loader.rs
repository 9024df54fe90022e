//! Fetching and decoding instrument sources
//!
//! The decode pipeline an instrument's audio data comes from: pick a
//! source URL, fetch the encoded bytes (HTTP or filesystem), decode them
//! through the instrument's audio context, and hand the buffer over via
//! [`Instrument::set_audio_data`].

use crate::codec;
use crate::instrument::Instrument;
use crate::LoadError;

/// Fetch encoded bytes from `source`: `http(s)://` URLs over HTTP,
/// anything else read as a filesystem path.
pub fn fetch(source: &str) -> Result<Vec<u8>, LoadError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::blocking::get(source).map_err(|e| LoadError::Fetch {
            url: source.to_string(),
            reason: e.to_string(),
        })?;
        if !response.status().is_success() {
            return Err(LoadError::Fetch {
                url: source.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        let bytes = response.bytes().map_err(|e| LoadError::Fetch {
            url: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    } else {
        std::fs::read(source).map_err(|e| LoadError::Fetch {
            url: source.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Load the instrument's source: prefer the URL matching its configured
/// format when one resolves, fetch, decode through the injected context,
/// and assign the result.
pub fn load(instrument: &mut Instrument) -> Result<(), LoadError> {
    if let Some(format) = instrument.format {
        if instrument.select_format(format) {
            instrument.create_audio_node();
        } else {
            log::warn!("no source URL for preferred format `{format}`; using the active URL");
        }
    }

    let url = instrument
        .url()
        .map(str::to_string)
        .ok_or(LoadError::NoSource)?;
    let ctx = instrument.ctx().cloned().ok_or(LoadError::NoContext)?;

    let bytes = fetch(&url)?;
    let buffer = ctx
        .decode_audio_data(&bytes, codec::url_extension(&url))
        .map_err(|source| LoadError::Decode {
            url: url.clone(),
            source,
        })?;

    log::info!("loaded `{}`: {:.1}s of audio", url, buffer.duration());
    instrument.set_audio_data(buffer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::InstrumentConfig;
    use crate::sprite::DEFAULT_SPRITE_KEY;
    use crate::Codec;
    use spinet_graph::AudioContext;
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn write_wav(path: &PathBuf, frames: usize, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut bytes = Vec::new();
        {
            let cursor = Cursor::new(&mut bytes);
            let mut writer = hound::WavWriter::new(cursor, spec).unwrap();
            for i in 0..frames {
                writer.write_sample((i % 128) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        fs::write(path, bytes).unwrap();
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spinet_loader_{name}"));
        let _ = fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn load_without_urls_is_no_source() {
        let mut instrument = Instrument::new(InstrumentConfig {
            ctx: Some(AudioContext::offline(44_100)),
            ..InstrumentConfig::default()
        });
        assert!(matches!(load(&mut instrument), Err(LoadError::NoSource)));
    }

    #[test]
    fn load_without_context_is_no_context() {
        let mut instrument = Instrument::new(InstrumentConfig {
            urls: vec!["sound.wav".to_string()],
            ..InstrumentConfig::default()
        });
        assert!(matches!(load(&mut instrument), Err(LoadError::NoContext)));
    }

    #[test]
    fn fetch_missing_file_reports_the_source() {
        let err = fetch("/definitely/not/here.wav").unwrap_err();
        match err {
            LoadError::Fetch { url, .. } => assert_eq!(url, "/definitely/not/here.wav"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_decodes_and_assigns_audio_data() {
        let dir = temp_dir("assigns");
        let path = dir.join("tone.wav");
        write_wav(&path, 44_100, 44_100);

        let mut instrument = Instrument::new(InstrumentConfig {
            urls: vec![path.to_string_lossy().to_string()],
            ctx: Some(AudioContext::offline(44_100)),
            ..InstrumentConfig::default()
        });

        load(&mut instrument).unwrap();
        assert!(instrument.audio_data().is_some());
        assert_eq!(instrument.duration(), Some(1.0));
        let sprite = instrument.sprite.as_ref().unwrap()[DEFAULT_SPRITE_KEY];
        assert_eq!(sprite.start, 0.0);
        assert_eq!(sprite.end, 1.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_prefers_the_configured_format() {
        let dir = temp_dir("prefers");
        let wav = dir.join("tone.wav");
        write_wav(&wav, 22_050, 44_100);

        // The mp3 candidate comes first but does not exist on disk; the
        // format preference must reroute to the wav before fetching.
        let mut instrument = Instrument::new(InstrumentConfig {
            urls: vec![
                dir.join("tone.mp3").to_string_lossy().to_string(),
                wav.to_string_lossy().to_string(),
            ],
            format: Some(Codec::Wav),
            ctx: Some(AudioContext::offline(44_100)),
            ..InstrumentConfig::default()
        });

        load(&mut instrument).unwrap();
        assert!(instrument.url().unwrap().ends_with("tone.wav"));
        assert_eq!(instrument.element().src(), instrument.url());
        assert_eq!(instrument.duration(), Some(0.5));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn undecodable_bytes_surface_as_decode_error() {
        let dir = temp_dir("garbage");
        let path = dir.join("noise.wav");
        fs::write(&path, b"not really a wav file").unwrap();

        let mut instrument = Instrument::new(InstrumentConfig {
            urls: vec![path.to_string_lossy().to_string()],
            ctx: Some(AudioContext::offline(44_100)),
            ..InstrumentConfig::default()
        });

        assert!(matches!(
            load(&mut instrument),
            Err(LoadError::Decode { .. })
        ));
        assert!(instrument.audio_data().is_none());

        let _ = fs::remove_dir_all(&dir);
    }
}

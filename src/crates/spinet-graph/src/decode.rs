//! Decoding encoded audio bytes via symphonia

use crate::{AudioBuffer, GraphError, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode encoded audio bytes into an [`AudioBuffer`].
///
/// The container and codec are probed from the bytes themselves; `hint_ext`
/// (a file extension such as "mp3") narrows the probe when known. Samples
/// come back interleaved as `f32` regardless of the source format.
pub fn decode_audio_data(bytes: &[u8], hint_ext: Option<&str>) -> Result<AudioBuffer> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = hint_ext {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| GraphError::Decode(format!("failed to probe format: {e}")))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| GraphError::Decode("no playable audio track".to_string()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| GraphError::Decode("unknown sample rate".to_string()))?;
    let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| GraphError::Decode(format!("failed to create decoder: {e}")))?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(GraphError::Decode(format!("format error: {e}"))),
        };
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => {
                if channels.is_none() {
                    channels = Some(decoded.spec().channels.count() as u16);
                }
                let mut interleaved =
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                interleaved.copy_interleaved_ref(decoded);
                samples.extend_from_slice(interleaved.samples());
            }
            // Recoverable: skip the packet and keep going.
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("skipping undecodable packet: {e}");
            }
            Err(e) => return Err(GraphError::Decode(format!("failed to decode packet: {e}"))),
        }
    }

    if samples.is_empty() {
        return Err(GraphError::Decode("stream contained no audio".to_string()));
    }

    Ok(AudioBuffer::from_interleaved(
        samples,
        sample_rate,
        channels.unwrap_or(2),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut bytes = Vec::new();
        {
            let cursor = Cursor::new(&mut bytes);
            let mut writer = hound::WavWriter::new(cursor, spec).unwrap();
            for &sample in samples {
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        bytes
    }

    #[test]
    fn decodes_mono_wav() {
        let samples: Vec<i16> = (0..441).map(|i| (i * 64) as i16).collect();
        let bytes = wav_bytes(&samples, 22_050, 1);

        let buffer = decode_audio_data(&bytes, Some("wav")).unwrap();
        assert_eq!(buffer.sample_rate(), 22_050);
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.frames(), 441);
        // 16-bit PCM normalizes against 32768.
        assert!((buffer.data()[1] - 64.0 / 32_768.0).abs() < 1e-6);
    }

    #[test]
    fn decodes_stereo_wav_interleaved() {
        // L channel constant, R channel ramping.
        let mut samples = Vec::new();
        for i in 0..100i16 {
            samples.push(1_000);
            samples.push(i * 100);
        }
        let bytes = wav_bytes(&samples, 44_100, 2);

        let buffer = decode_audio_data(&bytes, Some("wav")).unwrap();
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.frames(), 100);
        assert!((buffer.data()[0] - 1_000.0 / 32_768.0).abs() < 1e-6);
        assert!((buffer.data()[2] - 1_000.0 / 32_768.0).abs() < 1e-6);
        assert!((buffer.data()[3] - 100.0 / 32_768.0).abs() < 1e-6);
    }

    #[test]
    fn garbage_bytes_fail_to_probe() {
        let result = decode_audio_data(&[0x00, 0x01, 0x02, 0x03], None);
        assert!(matches!(result, Err(GraphError::Decode(_))));
    }

    #[test]
    fn empty_wav_is_an_error() {
        let bytes = wav_bytes(&[], 44_100, 1);
        assert!(decode_audio_data(&bytes, Some("wav")).is_err());
    }
}

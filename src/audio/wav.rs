//! WAV container helpers
//!
//! STT providers take an uploaded file, so captured PCM is wrapped in a
//! 16-bit WAV container in memory before the request is built.

use super::AudioData;
use crate::{ParlaError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Encode audio as a 16-bit PCM WAV file held in memory
pub fn encode_wav(audio: &AudioData) -> Result<Vec<u8>> {
    if audio.sample_rate == 0 || audio.channels == 0 {
        return Err(ParlaError::AudioError(format!(
            "invalid audio format: {} Hz, {} channels",
            audio.sample_rate, audio.channels
        )));
    }

    let spec = WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + audio.samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in &audio.samples {
            let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(sample_i16)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Read a WAV file into normalized f32 samples
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<AudioData> {
    let mut reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    debug!(
        "Reading WAV file: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        (SampleFormat::Int, bits @ (8 | 24 | 32)) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        (SampleFormat::Int, bits) => {
            return Err(ParlaError::AudioError(format!(
                "unsupported bit depth: {}",
                bits
            )));
        }
    };

    Ok(AudioData::new(samples, spec.sample_rate, spec.channels))
}

/// Write encoded reply bytes to disk
pub fn write_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    std::fs::write(path.as_ref(), bytes)?;
    debug!("Wrote {} bytes to {:?}", bytes.len(), path.as_ref());
    Ok(())
}

//! Mono 16-bit PCM WAV encoding.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::{EngineError, Result};

/// Size of the RIFF/WAVE header written by [`encode_wav`].
pub const WAV_HEADER_LEN: usize = 44;

/// `round(clamp(x, -1, 1) * 32767)`.
#[inline]
pub fn to_i16(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

/// Encode float samples as a mono, 16-bit PCM WAV file.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2));
    let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
    for &sample in samples {
        writer.write_sample(to_i16(sample)).map_err(wav_error)?;
    }
    writer.finalize().map_err(wav_error)?;

    Ok(cursor.into_inner())
}

fn wav_error(err: hound::Error) -> EngineError {
    EngineError::WavEncodeFailed(err.to_string())
}

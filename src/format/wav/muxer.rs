//! Canonical WAV header synthesis

use super::header::WavFormat;
use super::{ChunkHeader, WaveDescriptor, DATA_CHUNK};
use crate::error::{Error, Result};
use bytes::{BufMut, BytesMut};

/// Size of the canonical RIFF + fmt + data header
pub const WAV_HEADER_SIZE: usize = 44;

/// Build a 44-byte header for mono, 16-bit PCM
///
/// `data_size` is the PCM payload length in bytes. The RIFF size field is
/// `data_size + 36`.
pub fn build_header(sample_rate: u32, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let mut header = [0u8; WAV_HEADER_SIZE];
    let mut cursor = &mut header[..];

    WaveDescriptor::new(data_size.saturating_add(36)).write_to(&mut cursor);
    WavFormat::pcm_mono_s16(sample_rate).write_to(&mut cursor);
    ChunkHeader::new(DATA_CHUNK, data_size).write_to(&mut cursor);

    header
}

/// Wrap mono 16-bit samples in a complete WAV file
pub fn write_wav(sample_rate: u32, samples: &[i16]) -> Result<Vec<u8>> {
    let data_size = samples
        .len()
        .checked_mul(2)
        .and_then(|size| u32::try_from(size).ok())
        .ok_or_else(|| {
            Error::invalid_input(format!(
                "{} samples do not fit in a WAV data chunk",
                samples.len()
            ))
        })?;

    let mut out = BytesMut::with_capacity(WAV_HEADER_SIZE + data_size as usize);
    out.put_slice(&build_header(sample_rate, data_size));
    for &sample in samples {
        out.put_i16_le(sample);
    }

    Ok(out.to_vec())
}

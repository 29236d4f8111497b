//! PCM (Pulse Code Modulation) frame extraction
//!
//! Slices 20 ms windows out of raw WAV PCM and normalizes them to the mono
//! signed 16-bit samples the speech codec consumes. Stereo input keeps only
//! the left channel.

use crate::error::{Error, Result};
use crate::format::amr::FRAME_DURATION_MS;
use crate::format::WavFormat;
use byteorder::{ByteOrder, LittleEndian};

/// Source PCM layouts the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmLayout {
    /// 1 channel, 8-bit
    MonoU8,
    /// 1 channel, 16-bit little-endian
    MonoS16,
    /// 2 channels interleaved, 8-bit
    StereoU8,
    /// 2 channels interleaved, 16-bit little-endian
    StereoS16,
}

impl PcmLayout {
    /// Classify a `fmt ` chunk
    ///
    /// Anything other than 1 or 2 channels at 8 or 16 bits is
    /// [`Error::Unsupported`].
    pub fn from_format(format: &WavFormat) -> Result<Self> {
        match (format.channels, format.bits_per_sample) {
            (1, 8) => Ok(PcmLayout::MonoU8),
            (1, 16) => Ok(PcmLayout::MonoS16),
            (2, 8) => Ok(PcmLayout::StereoU8),
            (2, 16) => Ok(PcmLayout::StereoS16),
            (channels, bits) => Err(Error::unsupported(format!(
                "unsupported PCM layout: {} channels, {} bits per sample",
                channels, bits
            ))),
        }
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> usize {
        match self {
            PcmLayout::MonoU8 | PcmLayout::MonoS16 => 1,
            PcmLayout::StereoU8 | PcmLayout::StereoS16 => 2,
        }
    }

    /// Bytes per sample of one channel
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            PcmLayout::MonoU8 | PcmLayout::StereoU8 => 1,
            PcmLayout::MonoS16 | PcmLayout::StereoS16 => 2,
        }
    }

    /// Bytes per interleaved sample frame
    pub fn block_size(&self) -> usize {
        self.channels() * self.bytes_per_sample()
    }
}

/// Bytes of source PCM covering one 20 ms speech frame
pub fn speech_frame_bytes(format: &WavFormat) -> Result<usize> {
    let layout = PcmLayout::from_format(format)?;
    let bytes_per_second = layout.block_size() as u64 * format.sample_rate as u64;
    let frame_bytes = bytes_per_second * FRAME_DURATION_MS as u64 / 1000;

    if frame_bytes == 0 {
        return Err(Error::unsupported(format!(
            "sample rate {} Hz too low for 20 ms frames",
            format.sample_rate
        )));
    }

    usize::try_from(frame_bytes)
        .map_err(|_| Error::unsupported(format!("frame of {} bytes too large", frame_bytes)))
}

/// Extract one frame of mono 16-bit samples starting at `offset`
///
/// Returns `Ok(None)` when `offset + frame_byte_size` runs past `buf`. The
/// result holds `frame_byte_size / channels / bytes_per_sample` samples.
pub fn extract_frame(
    buf: &[u8],
    format: &WavFormat,
    frame_byte_size: usize,
    offset: usize,
) -> Result<Option<Vec<i16>>> {
    let layout = PcmLayout::from_format(format)?;

    let window = match offset.checked_add(frame_byte_size) {
        Some(end) if end <= buf.len() => &buf[offset..end],
        _ => return Ok(None),
    };

    let count = frame_byte_size / layout.channels() / layout.bytes_per_sample();
    let block = layout.block_size();

    let speech: Vec<i16> = match layout {
        PcmLayout::MonoU8 | PcmLayout::StereoU8 => window
            .chunks_exact(block)
            .take(count)
            .map(|frame| widen_u8(frame[0]))
            .collect(),
        PcmLayout::MonoS16 | PcmLayout::StereoS16 => window
            .chunks_exact(block)
            .take(count)
            .map(|frame| LittleEndian::read_i16(&frame[0..2]))
            .collect(),
    };

    Ok(Some(speech))
}

/// 8-bit sample scaled to 16 bits; the unsigned 128 bias is left in place
#[inline]
fn widen_u8(byte: u8) -> i16 {
    (byte as i16) << 7
}

//! AMR storage format (RFC 4867 section 5) support
//!
//! An AMR file is an ASCII magic number followed by a concatenation of
//! frames. Each frame starts with a header byte whose FT field selects the
//! frame length from a fixed per-variant table.

pub mod demuxer;
pub mod tables;

pub use demuxer::{AmrFrame, AmrFrameReader};
pub use tables::{AMR_NB_BITRATES, AMR_NB_FRAME_SIZES, AMR_WB_BITRATES, AMR_WB_FRAME_SIZES};

use crate::error::{Error, Result};
use std::fmt;

/// AMR-NB magic number
pub const AMR_NB_MAGIC: &[u8] = b"#!AMR\n";
/// AMR-WB magic number
pub const AMR_WB_MAGIC: &[u8] = b"#!AMR-WB\n";

/// Duration of one speech frame in milliseconds
pub const FRAME_DURATION_MS: u32 = 20;

/// AMR codec variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmrVariant {
    /// AMR narrowband, 8000 Hz
    Narrowband,
    /// AMR wideband, 16000 Hz
    Wideband,
}

impl AmrVariant {
    /// Magic number that opens a file of this variant
    pub fn magic(&self) -> &'static [u8] {
        match self {
            AmrVariant::Narrowband => AMR_NB_MAGIC,
            AmrVariant::Wideband => AMR_WB_MAGIC,
        }
    }

    /// PCM sample rate the codec operates at
    pub fn sample_rate(&self) -> u32 {
        match self {
            AmrVariant::Narrowband => 8000,
            AmrVariant::Wideband => 16000,
        }
    }

    /// Decoded samples per 20 ms frame
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate() * FRAME_DURATION_MS / 1000) as usize
    }

    /// Frame-type to frame-size table
    pub fn frame_sizes(&self) -> &'static [usize] {
        match self {
            AmrVariant::Narrowband => &AMR_NB_FRAME_SIZES,
            AmrVariant::Wideband => &AMR_WB_FRAME_SIZES,
        }
    }

    /// Bitrate for a frame type, in bits/second
    pub fn bitrate(&self, frame_type: u8) -> Option<u32> {
        let rates: &[u32] = match self {
            AmrVariant::Narrowband => &AMR_NB_BITRATES,
            AmrVariant::Wideband => &AMR_WB_BITRATES,
        };
        rates.get(frame_type as usize).copied()
    }

    /// Frame size for a frame type
    ///
    /// Fails with [`Error::Unsupported`] when `frame_type` is outside the table.
    pub fn frame_size(&self, frame_type: u8) -> Result<usize> {
        self.frame_sizes()
            .get(frame_type as usize)
            .copied()
            .ok_or_else(|| {
                Error::unsupported(format!(
                    "frame type {} out of range for {} (max {})",
                    frame_type,
                    self,
                    self.frame_sizes().len() - 1
                ))
            })
    }

    /// Mode used when encoding: 12.2 kbps for NB, 23.85 kbps for WB
    pub fn encode_mode(&self) -> u8 {
        match self {
            AmrVariant::Narrowband => 7,
            AmrVariant::Wideband => 8,
        }
    }

    /// Size of each frame the encoder emits at [`encode_mode`](Self::encode_mode)
    pub fn encoded_frame_size(&self) -> usize {
        self.frame_sizes()[self.encode_mode() as usize]
    }

    /// Detect the variant from a buffer's magic number
    pub fn from_magic(buf: &[u8]) -> Option<Self> {
        if buf.starts_with(AMR_WB_MAGIC) {
            Some(AmrVariant::Wideband)
        } else if buf.starts_with(AMR_NB_MAGIC) {
            Some(AmrVariant::Narrowband)
        } else {
            None
        }
    }

    /// Pick the variant whose native rate suits a PCM sample rate
    pub fn for_sample_rate(sample_rate: u32) -> Self {
        if sample_rate >= 16000 {
            AmrVariant::Wideband
        } else {
            AmrVariant::Narrowband
        }
    }

    /// Short identifier
    pub fn id(&self) -> &'static str {
        match self {
            AmrVariant::Narrowband => "amr-nb",
            AmrVariant::Wideband => "amr-wb",
        }
    }
}

impl fmt::Display for AmrVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// AMR frame header byte: `P FT(4) Q P P`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Frame type (codec mode or SID)
    pub frame_type: u8,
    /// Payload quality bit; clear when the payload is damaged
    pub quality: bool,
}

impl FrameHeader {
    /// Build a header for a frame type
    pub fn new(frame_type: u8, quality: bool) -> Self {
        FrameHeader {
            frame_type: frame_type & 0x0F,
            quality,
        }
    }

    /// Unpack FT and Q from a header byte
    pub fn from_byte(byte: u8) -> Self {
        FrameHeader {
            frame_type: (byte >> 3) & 0x0F,
            quality: (byte >> 2) & 0x01 == 1,
        }
    }

    /// Pack into a header byte, padding bits zero
    pub fn to_byte(&self) -> u8 {
        ((self.frame_type & 0x0F) << 3) | ((self.quality as u8) << 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_constants() {
        assert_eq!(AmrVariant::Narrowband.samples_per_frame(), 160);
        assert_eq!(AmrVariant::Wideband.samples_per_frame(), 320);
        assert_eq!(AmrVariant::Narrowband.encoded_frame_size(), 32);
        assert_eq!(AmrVariant::Wideband.encoded_frame_size(), 61);
        assert_eq!(AmrVariant::Narrowband.frame_sizes().len(), 8);
        assert_eq!(AmrVariant::Wideband.frame_sizes().len(), 9);
        assert_eq!(AmrVariant::Wideband.bitrate(8), Some(23850));
        assert_eq!(AmrVariant::Narrowband.bitrate(8), None);
    }

    #[test]
    fn test_frame_size_bounds() {
        assert_eq!(AmrVariant::Narrowband.frame_size(0).unwrap(), 13);
        assert!(AmrVariant::Narrowband.frame_size(8).unwrap_err().is_unsupported());
        assert_eq!(AmrVariant::Wideband.frame_size(8).unwrap(), 61);
        assert!(AmrVariant::Wideband.frame_size(9).is_err());
        assert!(AmrVariant::Wideband.frame_size(15).is_err());
    }

    #[test]
    fn test_magic_detection() {
        assert_eq!(AmrVariant::from_magic(b"#!AMR\n\x3c"), Some(AmrVariant::Narrowband));
        assert_eq!(AmrVariant::from_magic(b"#!AMR-WB\n\x44"), Some(AmrVariant::Wideband));
        assert_eq!(AmrVariant::from_magic(b"#!AMR"), None);
        assert_eq!(AmrVariant::from_magic(b"RIFF"), None);
    }

    #[test]
    fn test_variant_for_sample_rate() {
        assert_eq!(AmrVariant::for_sample_rate(44100), AmrVariant::Wideband);
        assert_eq!(AmrVariant::for_sample_rate(8000), AmrVariant::Narrowband);
    }

    #[test]
    fn test_frame_header_bits() {
        // 0x3C = 0 0111 1 00: FT 7, Q 1 (AMR-NB 12.2 kbps)
        let header = FrameHeader::from_byte(0x3C);
        assert_eq!(header.frame_type, 7);
        assert!(header.quality);
        assert_eq!(header.to_byte(), 0x3C);

        // 0x44 = 0 1000 1 00: FT 8, Q 1 (AMR-WB 23.85 kbps)
        assert_eq!(FrameHeader::new(8, true).to_byte(), 0x44);

        let bad = FrameHeader::from_byte(0x38);
        assert_eq!(bad.frame_type, 7);
        assert!(!bad.quality);

        // Padding bits are ignored
        assert_eq!(FrameHeader::from_byte(0xBF), FrameHeader::new(7, true));
    }
}

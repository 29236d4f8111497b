//! Media Metadata Structures

use crate::error::{Error, Result};
use crate::format::ContainerKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Summary of a WAV or AMR buffer
#[derive(Debug, Clone, Serialize)]
pub struct MediaInfo {
    /// Detected container
    pub container: ContainerKind,
    /// Buffer size in bytes
    pub size: usize,
    /// Audio duration in seconds
    pub duration: f64,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u16,
    /// WAV-specific details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wav: Option<WavDetails>,
    /// AMR-specific details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amr: Option<AmrDetails>,
}

/// Fields of a WAV `fmt ` and `data` chunk
#[derive(Debug, Clone, Serialize)]
pub struct WavDetails {
    /// Numeric format tag
    pub format_tag: u16,
    /// Sample format name (u8, s16, ...)
    pub sample_format: String,
    /// Bits per sample
    pub bits_per_sample: u16,
    /// Declared byte rate
    pub byte_rate: u32,
    /// Declared block alignment
    pub block_align: u16,
    /// Offset of the first PCM byte
    pub data_offset: usize,
    /// PCM payload size in bytes
    pub data_size: u32,
    /// Whether the PCM layout can be encoded to AMR
    pub convertible: bool,
}

/// Frame statistics of an AMR file
#[derive(Debug, Clone, Serialize)]
pub struct AmrDetails {
    /// Complete frames
    pub frames: usize,
    /// Frames with the quality bit set
    pub good_frames: usize,
    /// Frames with the quality bit clear
    pub bad_frames: usize,
    /// Frame count per frame type
    pub frame_types: BTreeMap<u8, usize>,
    /// Bytes after the last complete frame
    pub trailing_bytes: usize,
    /// Average bitrate over all frames, in bits/second
    pub average_bitrate: Option<u64>,
}

impl MediaInfo {
    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::format(format!("JSON serialization failed: {}", e)))
    }

    /// Convert to compact JSON string
    pub fn to_json_compact(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::format(format!("JSON serialization failed: {}", e)))
    }
}

impl fmt::Display for MediaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Container: {}", self.container)?;
        writeln!(f, "  Size: {} bytes", self.size)?;

        let minutes = (self.duration / 60.0) as u32;
        let seconds = self.duration % 60.0;
        writeln!(f, "  Duration: {:02}:{:05.2}", minutes, seconds)?;
        writeln!(f, "  Sample Rate: {} Hz", self.sample_rate)?;
        writeln!(f, "  Channels: {}", self.channels)?;

        if let Some(ref wav) = self.wav {
            writeln!(f, "  Sample Format: {} ({} bit)", wav.sample_format, wav.bits_per_sample)?;
            writeln!(f, "  Byte Rate: {}", wav.byte_rate)?;
            writeln!(f, "  Data: {} bytes at offset {}", wav.data_size, wav.data_offset)?;
            if !wav.convertible {
                writeln!(f, "  Note: PCM layout not supported for AMR encoding")?;
            }
        }

        if let Some(ref amr) = self.amr {
            writeln!(
                f,
                "  Frames: {} ({} good, {} bad)",
                amr.frames, amr.good_frames, amr.bad_frames
            )?;
            for (frame_type, count) in &amr.frame_types {
                writeln!(f, "    FT {:>2}: {}", frame_type, count)?;
            }
            if let Some(bitrate) = amr.average_bitrate {
                writeln!(f, "  Bitrate: {:.2} kbps", bitrate as f64 / 1000.0)?;
            }
            if amr.trailing_bytes > 0 {
                writeln!(f, "  Trailing: {} bytes", amr.trailing_bytes)?;
            }
        }

        Ok(())
    }
}

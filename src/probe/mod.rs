//! Media Probing and Metadata Extraction
//!
//! Inspects a WAV or AMR buffer and reports its layout without decoding it.
//!
//! # Usage
//!
//! ```rust,no_run
//! use amrwav_lib::probe::MediaProbe;
//!
//! let bytes = std::fs::read("speech.amr")?;
//! let info = MediaProbe::new(&bytes).analyze()?;
//!
//! // Human-readable summary
//! println!("{}", info);
//!
//! // Or JSON output
//! let json = info.to_json()?;
//! # Ok::<(), amrwav_lib::error::Error>(())
//! ```

pub mod format_detector;
pub mod metadata;

use crate::codec::pcm::PcmLayout;
use crate::error::{Error, Result};
use crate::format::amr::{AmrFrameReader, AmrVariant, FRAME_DURATION_MS};
use crate::format::{wav, ContainerKind};
use std::collections::BTreeMap;
use tracing::debug;

pub use format_detector::FormatDetector;
pub use metadata::*;

/// Probe over an in-memory WAV or AMR buffer
pub struct MediaProbe<'a> {
    buf: &'a [u8],
}

impl<'a> MediaProbe<'a> {
    /// Create a probe for `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        MediaProbe { buf }
    }

    /// Detect the container and extract its metadata
    pub fn analyze(&self) -> Result<MediaInfo> {
        let container = FormatDetector::detect(self.buf)
            .ok_or_else(|| Error::unsupported("Unrecognized container"))?;

        debug!("Probing {} bytes as {}", self.buf.len(), container);

        match container.amr_variant() {
            Some(variant) => self.analyze_amr(variant),
            None => self.analyze_wav(),
        }
    }

    fn analyze_wav(&self) -> Result<MediaInfo> {
        let parsed = wav::parse(self.buf)?;
        let format = parsed.format;

        let details = WavDetails {
            format_tag: format.format_tag,
            sample_format: format.sample_format().to_string(),
            bits_per_sample: format.bits_per_sample,
            byte_rate: format.byte_rate,
            block_align: format.block_align,
            data_offset: parsed.data_offset,
            data_size: parsed.data_header.size,
            convertible: format.is_integer_pcm()
                && PcmLayout::from_format(&format).is_ok(),
        };

        Ok(MediaInfo {
            container: ContainerKind::Wav,
            size: self.buf.len(),
            duration: parsed.duration_seconds(),
            sample_rate: format.sample_rate,
            channels: format.channels,
            wav: Some(details),
            amr: None,
        })
    }

    fn analyze_amr(&self, variant: AmrVariant) -> Result<MediaInfo> {
        let mut reader = AmrFrameReader::new(self.buf, variant)?;

        let mut good_frames = 0;
        let mut bad_frames = 0;
        let mut frame_types = BTreeMap::new();
        let mut payload_bytes = 0usize;

        for frame in reader.by_ref() {
            let frame = frame?;
            if frame.header.quality {
                good_frames += 1;
            } else {
                bad_frames += 1;
            }
            *frame_types.entry(frame.header.frame_type).or_insert(0) += 1;
            payload_bytes += frame.data.len();
        }

        let frames = good_frames + bad_frames;
        let duration = frames as f64 * FRAME_DURATION_MS as f64 / 1000.0;
        let average_bitrate = if frames > 0 {
            Some((payload_bytes as u64 * 8 * 1000) / (frames as u64 * FRAME_DURATION_MS as u64))
        } else {
            None
        };

        Ok(MediaInfo {
            container: variant.into(),
            size: self.buf.len(),
            duration,
            sample_rate: variant.sample_rate(),
            channels: 1,
            wav: None,
            amr: Some(AmrDetails {
                frames,
                good_frames,
                bad_frames,
                frame_types,
                trailing_bytes: reader.remaining().len(),
                average_bitrate,
            }),
        })
    }
}

/// Probe a WAV or AMR buffer
pub fn probe(buf: &[u8]) -> Result<MediaInfo> {
    MediaProbe::new(buf).analyze()
}

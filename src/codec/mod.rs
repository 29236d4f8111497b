//! Codec plumbing
//!
//! The speech coder is an external engine reached through [`CodecEngine`].
//! This module owns the pieces around it: PCM frame extraction on the way
//! in, and scoped engine handles.

pub mod engine;
pub mod loopback;
pub mod pcm;

pub use engine::{CodecDirection, CodecEngine, CodecSession};
pub use loopback::{LoopbackEngine, LoopbackState};
pub use pcm::{extract_frame, speech_frame_bytes, PcmLayout};

use crate::format::AmrVariant;

/// Codec information
#[derive(Debug, Clone)]
pub struct CodecInfo {
    /// Codec identifier
    pub id: &'static str,
    /// Long descriptive name
    pub long_name: &'static str,
    /// Native sample rate in Hz
    pub sample_rate: u32,
    /// Mode used when encoding
    pub encode_mode: u8,
    /// Bitrate of that mode in bits/second
    pub bitrate: u32,
}

/// Get codec information by ID
pub fn get_codec_info(id: &str) -> Option<CodecInfo> {
    let (variant, long_name) = match id {
        "amr-nb" | "amrnb" | "amr" => (AmrVariant::Narrowband, "Adaptive Multi-Rate narrowband"),
        "amr-wb" | "amrwb" | "awb" => (AmrVariant::Wideband, "Adaptive Multi-Rate wideband"),
        _ => return None,
    };

    Some(CodecInfo {
        id: variant.id(),
        long_name,
        sample_rate: variant.sample_rate(),
        encode_mode: variant.encode_mode(),
        bitrate: variant.bitrate(variant.encode_mode()).unwrap_or_default(),
    })
}

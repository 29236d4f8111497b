//! Container format handling
//!
//! This module provides the two containers the converter moves between:
//! RIFF/WAVE holding raw PCM, and the AMR storage format holding
//! narrowband or wideband speech frames.

pub mod amr;
pub mod wav;

pub use amr::{AmrFrame, AmrFrameReader, AmrVariant, FrameHeader};
pub use wav::{ChunkHeader, ParsedWave, WavFormat, WaveDescriptor};

use serde::Serialize;
use std::fmt;

/// Container kinds recognised from leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerKind {
    /// RIFF/WAVE
    Wav,
    /// AMR narrowband (`#!AMR\n`)
    AmrNb,
    /// AMR wideband (`#!AMR-WB\n`)
    AmrWb,
}

impl ContainerKind {
    /// The AMR variant for AMR containers
    pub fn amr_variant(&self) -> Option<AmrVariant> {
        match self {
            ContainerKind::Wav => None,
            ContainerKind::AmrNb => Some(AmrVariant::Narrowband),
            ContainerKind::AmrWb => Some(AmrVariant::Wideband),
        }
    }

    /// Format name as used by [`get_format_info`]
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Wav => "wav",
            ContainerKind::AmrNb => "amr",
            ContainerKind::AmrWb => "awb",
        }
    }
}

impl From<AmrVariant> for ContainerKind {
    fn from(variant: AmrVariant) -> Self {
        match variant {
            AmrVariant::Narrowband => ContainerKind::AmrNb,
            AmrVariant::Wideband => ContainerKind::AmrWb,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Wav => write!(f, "wav"),
            ContainerKind::AmrNb => write!(f, "amr-nb"),
            ContainerKind::AmrWb => write!(f, "amr-wb"),
        }
    }
}

/// Container format information
#[derive(Debug, Clone)]
pub struct FormatInfo {
    /// Format name (e.g., "wav", "amr")
    pub name: String,
    /// Long/descriptive name
    pub long_name: String,
    /// File extensions
    pub extensions: Vec<String>,
    /// MIME types
    pub mime_types: Vec<String>,
}

/// Detect format from file extension
pub fn detect_format_from_extension(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?.to_lowercase();
    match ext.as_str() {
        "wav" | "wave" => Some("wav"),
        "amr" => Some("amr"),
        "awb" => Some("awb"),
        _ => None,
    }
}

/// Detect the container of a buffer from its magic number
pub fn detect_container(buf: &[u8]) -> Option<ContainerKind> {
    crate::probe::FormatDetector::detect(buf)
}

/// Get format information by name
pub fn get_format_info(name: &str) -> Option<FormatInfo> {
    match name {
        "wav" => Some(FormatInfo {
            name: "wav".to_string(),
            long_name: "WAV / WAVE (Waveform Audio)".to_string(),
            extensions: vec!["wav".to_string()],
            mime_types: vec!["audio/wav".to_string(), "audio/wave".to_string()],
        }),
        "amr" => Some(FormatInfo {
            name: "amr".to_string(),
            long_name: "AMR-NB (Adaptive Multi-Rate narrowband)".to_string(),
            extensions: vec!["amr".to_string()],
            mime_types: vec!["audio/amr".to_string()],
        }),
        "awb" => Some(FormatInfo {
            name: "awb".to_string(),
            long_name: "AMR-WB (Adaptive Multi-Rate wideband)".to_string(),
            extensions: vec!["awb".to_string(), "amr".to_string()],
            mime_types: vec!["audio/amr-wb".to_string()],
        }),
        _ => None,
    }
}

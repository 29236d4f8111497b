//! Container Format Detection
//!
//! This module detects containers by examining their magic numbers.

use crate::format::wav::{RIFF_MAGIC, WAVE_MAGIC};
use crate::format::{AmrVariant, ContainerKind};

/// Format detector for the supported containers
pub struct FormatDetector;

impl FormatDetector {
    /// Detect the container of a buffer
    pub fn detect(header: &[u8]) -> Option<ContainerKind> {
        if Self::is_wav(header) {
            return Some(ContainerKind::Wav);
        }
        AmrVariant::from_magic(header).map(ContainerKind::from)
    }

    /// Check if data is WAV
    fn is_wav(header: &[u8]) -> bool {
        if header.len() < 12 {
            return false;
        }
        // WAV: RIFF....WAVE
        &header[0..4] == RIFF_MAGIC && &header[8..12] == WAVE_MAGIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_detection() {
        assert_eq!(FormatDetector::detect(b"RIFF\x24\0\0\0WAVEfmt "), Some(ContainerKind::Wav));
        // AVI shares the RIFF envelope
        assert_eq!(FormatDetector::detect(b"RIFF\x24\0\0\0AVI LIST"), None);
        assert_eq!(FormatDetector::detect(b"RIFF"), None);
    }

    #[test]
    fn test_amr_detection() {
        assert_eq!(FormatDetector::detect(b"#!AMR\n\x3c"), Some(ContainerKind::AmrNb));
        assert_eq!(FormatDetector::detect(b"#!AMR-WB\n"), Some(ContainerKind::AmrWb));
        assert_eq!(FormatDetector::detect(b"#!AMR_MC1.0\n"), None);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(FormatDetector::detect(b"ID3\x04"), None);
        assert_eq!(FormatDetector::detect(&[]), None);
    }
}

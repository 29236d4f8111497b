//! amrwav - WAV/AMR speech container conversion
//!
//! amrwav moves speech audio between RIFF/WAVE files holding raw PCM and
//! AMR storage-format files holding narrowband or wideband frames. The
//! speech codec itself sits behind the [`codec::CodecEngine`] trait; the
//! crate ships a deterministic [`codec::LoopbackEngine`] and handles the
//! container work around any engine.
//!
//! # Architecture
//!
//! - `format`: RIFF/WAVE parsing and header synthesis, AMR frame tables and framing
//! - `codec`: Engine trait, scoped engine sessions, PCM frame extraction
//! - `convert`: End-to-end encode and decode loops
//! - `probe`: Container detection and metadata reporting
//!
//! # Usage
//!
//! ```rust,no_run
//! use amrwav_lib::{AmrConverter, LoopbackEngine};
//!
//! let wav = std::fs::read("speech.wav")?;
//! let converter = AmrConverter::new(LoopbackEngine::new());
//! let amr = converter.wave_to_amr_nb(&wav)?;
//! let back = converter.amr_nb_to_wave(&amr)?;
//! # Ok::<(), amrwav_lib::Error>(())
//! ```

pub mod codec;
pub mod convert;
pub mod error;
pub mod format;
pub mod probe;

pub use codec::{CodecEngine, LoopbackEngine};
pub use convert::{AmrConverter, ConversionStats};
pub use error::{Error, Result};
pub use format::AmrVariant;

/// amrwav version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Configuration for the amrwav library
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Maximum number of threads to use for batch conversion
    pub max_threads: Option<usize>,
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
}

impl Config {
    /// Log filter directive for this configuration, if logging is enabled
    pub fn log_level(&self) -> Option<&'static str> {
        if self.debug {
            Some("debug")
        } else if self.verbose {
            Some("info")
        } else {
            None
        }
    }
}

/// Initialize the amrwav library with the given configuration
///
/// The thread pool and the log subscriber are process-wide, so a second call
/// that tries to set either again fails with [`Error::Init`].
pub fn init(config: Config) -> Result<()> {
    if let Some(threads) = config.max_threads {
        if threads == 0 {
            return Err(Error::config("max_threads must be at least 1"));
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| Error::Init(format!("Failed to initialize thread pool: {}", e)))?;
    }

    if let Some(level) = config.log_level() {
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| Error::Init(format!("Failed to initialize logging: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION_MAJOR, 0);
        assert_eq!(VERSION_MINOR, 1);
        assert_eq!(VERSION_PATCH, 0);
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_threads, None);
        assert!(!config.verbose);
        assert!(!config.debug);
        assert_eq!(config.log_level(), None);
    }

    #[test]
    fn test_log_level() {
        let verbose = Config {
            verbose: true,
            ..Config::default()
        };
        assert_eq!(verbose.log_level(), Some("info"));

        let debug = Config {
            verbose: true,
            debug: true,
            ..Config::default()
        };
        assert_eq!(debug.log_level(), Some("debug"));
    }

    #[test]
    fn test_init() {
        let config = Config::default();
        assert!(init(config).is_ok());
    }

    #[test]
    fn test_init_rejects_zero_threads() {
        let config = Config {
            max_threads: Some(0),
            ..Config::default()
        };
        assert!(matches!(init(config), Err(Error::Config(_))));
    }
}

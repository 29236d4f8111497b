//! Speech codec engine capability interface
//!
//! The AMR speech coder itself lives outside this crate. An engine adapter
//! exposes four operations (init, encode, decode, exit) and the converter
//! drives it one 20 ms frame at a time through a [`CodecSession`].

use crate::error::{Error, Result};
use crate::format::AmrVariant;
use std::fmt;
use tracing::debug;

/// Which half of the codec a session drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecDirection {
    /// PCM in, AMR frames out
    Encode,
    /// AMR frames in, PCM out
    Decode,
}

impl fmt::Display for CodecDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecDirection::Encode => write!(f, "encoder"),
            CodecDirection::Decode => write!(f, "decoder"),
        }
    }
}

/// An external AMR speech codec
///
/// Implementations may wrap native code. `State` is the opaque handle
/// returned by `init`; the caller owns it exclusively and hands it back to
/// `exit` exactly once.
pub trait CodecEngine {
    /// Opaque per-session handle
    type State;

    /// Engine name for diagnostics
    fn name(&self) -> &str;

    /// Allocate a handle for one variant and direction
    fn init(&self, variant: AmrVariant, direction: CodecDirection) -> Result<Self::State>;

    /// Encode one frame of 16-bit PCM at `mode`, returning the AMR frame
    /// including its header byte
    fn encode(&self, state: &mut Self::State, pcm: &[i16], mode: u8) -> Result<Vec<u8>>;

    /// Decode one AMR frame (header byte included) into 16-bit PCM
    fn decode(&self, state: &mut Self::State, frame: &[u8]) -> Result<Vec<i16>>;

    /// Release a handle
    fn exit(&self, state: Self::State);
}

/// Scoped codec handle
///
/// `init` runs in [`open`](Self::open) and `exit` runs when the session is
/// closed or dropped, whichever comes first.
pub struct CodecSession<'e, E: CodecEngine> {
    engine: &'e E,
    state: Option<E::State>,
    variant: AmrVariant,
    direction: CodecDirection,
}

impl<'e, E: CodecEngine> CodecSession<'e, E> {
    /// Acquire a handle from `engine`
    pub fn open(engine: &'e E, variant: AmrVariant, direction: CodecDirection) -> Result<Self> {
        let state = engine.init(variant, direction)?;
        debug!("{} {} {} initialized", engine.name(), variant, direction);

        Ok(CodecSession {
            engine,
            state: Some(state),
            variant,
            direction,
        })
    }

    /// Encode one PCM frame
    pub fn encode(&mut self, pcm: &[i16], mode: u8) -> Result<Vec<u8>> {
        let engine = self.engine;
        let state = self.state_for(CodecDirection::Encode)?;
        engine.encode(state, pcm, mode)
    }

    /// Decode one AMR frame
    pub fn decode(&mut self, frame: &[u8]) -> Result<Vec<i16>> {
        let engine = self.engine;
        let state = self.state_for(CodecDirection::Decode)?;
        engine.decode(state, frame)
    }

    /// Release the handle now
    pub fn close(mut self) {
        self.release();
    }

    fn state_for(&mut self, direction: CodecDirection) -> Result<&mut E::State> {
        if self.direction != direction {
            return Err(Error::invalid_state(format!(
                "{} session cannot act as {}",
                self.direction, direction
            )));
        }
        self.state
            .as_mut()
            .ok_or_else(|| Error::invalid_state("codec session already released"))
    }

    fn release(&mut self) {
        if let Some(state) = self.state.take() {
            self.engine.exit(state);
            debug!("{} {} {} released", self.engine.name(), self.variant, self.direction);
        }
    }
}

impl<E: CodecEngine> Drop for CodecSession<'_, E> {
    fn drop(&mut self) {
        self.release();
    }
}

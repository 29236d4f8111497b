//! Deterministic reference engine
//!
//! `LoopbackEngine` is not a speech coder. It emits frames with the correct
//! AMR header byte and table length, filled with a coarse 8-bit sketch of
//! the input, and decodes any well-sized frame back into a full 20 ms of
//! samples. It lets the container pipeline run end to end without a native
//! AMR library.

use super::engine::{CodecDirection, CodecEngine};
use crate::error::{Error, Result};
use crate::format::{AmrVariant, FrameHeader};
use tracing::trace;

/// Reference engine with no external dependencies
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackEngine;

impl LoopbackEngine {
    /// Create a new loopback engine
    pub fn new() -> Self {
        LoopbackEngine
    }
}

/// Handle state for [`LoopbackEngine`]
#[derive(Debug)]
pub struct LoopbackState {
    variant: AmrVariant,
    direction: CodecDirection,
    frames: u64,
}

impl LoopbackState {
    fn check_direction(&self, direction: CodecDirection) -> Result<()> {
        if self.direction != direction {
            return Err(Error::invalid_state(format!(
                "handle was initialized as {}",
                self.direction
            )));
        }
        Ok(())
    }
}

impl CodecEngine for LoopbackEngine {
    type State = LoopbackState;

    fn name(&self) -> &str {
        "loopback"
    }

    fn init(&self, variant: AmrVariant, direction: CodecDirection) -> Result<LoopbackState> {
        Ok(LoopbackState {
            variant,
            direction,
            frames: 0,
        })
    }

    fn encode(&self, state: &mut LoopbackState, pcm: &[i16], mode: u8) -> Result<Vec<u8>> {
        state.check_direction(CodecDirection::Encode)?;

        let size = state
            .variant
            .frame_size(mode)
            .map_err(|_| Error::codec(format!("invalid {} mode {}", state.variant, mode)))?;
        let payload_len = size - 1;
        let span = state.variant.samples_per_frame();

        let mut frame = Vec::with_capacity(size);
        frame.push(FrameHeader::new(mode, true).to_byte());
        frame.extend((0..payload_len).map(|i| {
            let sample = pcm.get(i * span / payload_len).copied().unwrap_or(0);
            (sample >> 8) as u8
        }));

        state.frames += 1;
        trace!("loopback encoded frame {} ({} bytes)", state.frames, size);
        Ok(frame)
    }

    fn decode(&self, state: &mut LoopbackState, frame: &[u8]) -> Result<Vec<i16>> {
        state.check_direction(CodecDirection::Decode)?;

        let (&first, payload) = frame
            .split_first()
            .ok_or_else(|| Error::codec("empty AMR frame"))?;
        let header = FrameHeader::from_byte(first);

        let expected = state
            .variant
            .frame_size(header.frame_type)
            .map_err(|e| Error::codec(e.to_string()))?;
        if frame.len() != expected {
            return Err(Error::codec(format!(
                "FT {} frame must be {} bytes, got {}",
                header.frame_type,
                expected,
                frame.len()
            )));
        }

        let span = state.variant.samples_per_frame();
        let samples: Vec<i16> = (0..span)
            .map(|j| {
                let byte = payload[j * payload.len() / span];
                ((byte as i8) as i16) << 8
            })
            .collect();

        state.frames += 1;
        Ok(samples)
    }

    fn exit(&self, state: LoopbackState) {
        trace!(
            "loopback {} {} exit after {} frames",
            state.variant,
            state.direction,
            state.frames
        );
    }
}

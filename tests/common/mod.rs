//! Common test utilities for amrwav integration tests
//!
//! This module provides builders for synthetic WAV and AMR buffers and a
//! codec engine wrapper that records how sessions are opened and released.

#![allow(dead_code)]

use amrwav_lib::codec::{CodecDirection, CodecEngine, LoopbackEngine};
use amrwav_lib::format::{AmrVariant, FrameHeader};
use amrwav_lib::Result;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// WAV Generation
// ============================================================================

/// Build a canonical RIFF/WAVE buffer around raw PCM bytes
pub fn wav_bytes(format_tag: u16, channels: u16, sample_rate: u32, bits: u16, pcm: &[u8]) -> Vec<u8> {
    let block_align = channels * (bits / 8);
    let byte_rate = sample_rate * block_align as u32;

    let mut out = Vec::with_capacity(44 + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + pcm.len() as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&format_tag.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&(pcm.len() as u32).to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

/// Mono 16-bit PCM WAV
pub fn mono_s16_wav(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    wav_bytes(1, 1, sample_rate, 16, &pcm)
}

/// Stereo 16-bit PCM WAV from separate channels
pub fn stereo_s16_wav(sample_rate: u32, left: &[i16], right: &[i16]) -> Vec<u8> {
    let pcm: Vec<u8> = left
        .iter()
        .zip(right)
        .flat_map(|(l, r)| {
            let mut pair = [0u8; 4];
            pair[..2].copy_from_slice(&l.to_le_bytes());
            pair[2..].copy_from_slice(&r.to_le_bytes());
            pair
        })
        .collect();
    wav_bytes(1, 2, sample_rate, 16, &pcm)
}

/// Mono 8-bit PCM WAV
pub fn mono_u8_wav(sample_rate: u32, samples: &[u8]) -> Vec<u8> {
    wav_bytes(1, 1, sample_rate, 8, samples)
}

/// Insert an extra chunk between `fmt ` and `data`
pub fn with_chunk_before_data(wav: &[u8], id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(wav.len() + 8 + payload.len());
    out.extend_from_slice(&wav[..36]);
    out.extend_from_slice(id);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&wav[36..]);
    out
}

/// Generate a sine wave at the given amplitude
pub fn sine_samples(count: usize, frequency: f64, sample_rate: u32, amplitude: f64) -> Vec<i16> {
    (0..count)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            ((2.0 * std::f64::consts::PI * frequency * t).sin() * amplitude) as i16
        })
        .collect()
}

/// Read the mono 16-bit payload that follows a 44-byte header
pub fn pcm_after_header(wav: &[u8]) -> Vec<i16> {
    wav[44..]
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

// ============================================================================
// AMR Generation
// ============================================================================

/// Build an AMR file from `(frame_type, quality)` pairs
///
/// Each payload byte is the frame index, so frames are distinguishable.
pub fn amr_file(variant: AmrVariant, frames: &[(u8, bool)]) -> Vec<u8> {
    let mut out = variant.magic().to_vec();
    for (index, &(frame_type, quality)) in frames.iter().enumerate() {
        let size = variant.frame_size(frame_type).unwrap();
        out.push(FrameHeader::new(frame_type, quality).to_byte());
        out.extend(std::iter::repeat(index as u8).take(size - 1));
    }
    out
}

// ============================================================================
// Engine Instrumentation
// ============================================================================

/// Wraps [`LoopbackEngine`] and counts every call
#[derive(Debug, Default)]
pub struct CountingEngine {
    inner: LoopbackEngine,
    pub inits: AtomicUsize,
    pub exits: AtomicUsize,
    pub encodes: AtomicUsize,
    pub decodes: AtomicUsize,
    /// Fail the Nth encode/decode call (1-based), 0 for never
    pub fail_at: usize,
}

impl CountingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(call: usize) -> Self {
        CountingEngine {
            fail_at: call,
            ..Self::default()
        }
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn exits(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }

    pub fn encodes(&self) -> usize {
        self.encodes.load(Ordering::SeqCst)
    }

    pub fn decodes(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }

    fn check_failure(&self, call: usize) -> Result<()> {
        if self.fail_at != 0 && call == self.fail_at {
            return Err(amrwav_lib::Error::codec(format!("injected failure at call {}", call)));
        }
        Ok(())
    }
}

impl CodecEngine for CountingEngine {
    type State = <LoopbackEngine as CodecEngine>::State;

    fn name(&self) -> &str {
        "counting"
    }

    fn init(&self, variant: AmrVariant, direction: CodecDirection) -> Result<Self::State> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        self.inner.init(variant, direction)
    }

    fn encode(&self, state: &mut Self::State, pcm: &[i16], mode: u8) -> Result<Vec<u8>> {
        let call = self.encodes.fetch_add(1, Ordering::SeqCst) + 1;
        self.check_failure(call)?;
        self.inner.encode(state, pcm, mode)
    }

    fn decode(&self, state: &mut Self::State, frame: &[u8]) -> Result<Vec<i16>> {
        let call = self.decodes.fetch_add(1, Ordering::SeqCst) + 1;
        self.check_failure(call)?;
        self.inner.decode(state, frame)
    }

    fn exit(&self, state: Self::State) {
        self.exits.fetch_add(1, Ordering::SeqCst);
        self.inner.exit(state)
    }
}

/// Engine whose encoder emits frames of the wrong size
#[derive(Debug, Default)]
pub struct ShortFrameEngine {
    pub exits: AtomicUsize,
}

impl CodecEngine for ShortFrameEngine {
    type State = ();

    fn name(&self) -> &str {
        "short-frame"
    }

    fn init(&self, _variant: AmrVariant, _direction: CodecDirection) -> Result<()> {
        Ok(())
    }

    fn encode(&self, _state: &mut (), _pcm: &[i16], mode: u8) -> Result<Vec<u8>> {
        Ok(vec![FrameHeader::new(mode, true).to_byte(); 4])
    }

    fn decode(&self, _state: &mut (), _frame: &[u8]) -> Result<Vec<i16>> {
        Ok(vec![0; 10])
    }

    fn exit(&self, _state: ()) {
        self.exits.fetch_add(1, Ordering::SeqCst);
    }
}

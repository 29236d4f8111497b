//! WAV <-> AMR conversion
//!
//! [`AmrConverter`] runs the frame loops in both directions over fully
//! buffered input. Each call opens its own codec session and releases it
//! before returning, on success and on every error path.

use crate::codec::pcm::{self, PcmLayout};
use crate::codec::{CodecDirection, CodecEngine, CodecSession};
use crate::error::{Error, Result};
use crate::format::amr::{AmrFrameReader, AmrVariant};
use crate::format::wav::{self, WAV_HEADER_SIZE};
use bytes::{BufMut, BytesMut};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counters from one conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Input buffer size in bytes
    pub input_bytes: usize,
    /// Output buffer size in bytes
    pub output_bytes: usize,
    /// Frames passed through the codec
    pub frames: usize,
    /// AMR frames dropped because their quality bit was clear
    pub bad_frames: usize,
    /// Trailing input bytes too short to form a frame
    pub discarded_bytes: usize,
}

/// Converter between WAV and AMR containers
#[derive(Debug, Clone, Default)]
pub struct AmrConverter<E> {
    engine: E,
}

impl<E: CodecEngine> AmrConverter<E> {
    /// Create a converter driving `engine`
    pub fn new(engine: E) -> Self {
        AmrConverter { engine }
    }

    /// The codec engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Convert a WAV buffer to an AMR file of the given variant
    pub fn encode(&self, wave: &[u8], variant: AmrVariant) -> Result<Vec<u8>> {
        self.encode_with_stats(wave, variant).map(|(amr, _)| amr)
    }

    /// Convert an AMR file of the given variant to a mono 16-bit WAV buffer
    pub fn decode(&self, amr: &[u8], variant: AmrVariant) -> Result<Vec<u8>> {
        self.decode_with_stats(amr, variant).map(|(wave, _)| wave)
    }

    /// WAV to AMR-NB (12.2 kbps). Intended for 8000 Hz input.
    pub fn wave_to_amr_nb(&self, wave: &[u8]) -> Result<Vec<u8>> {
        self.encode(wave, AmrVariant::Narrowband)
    }

    /// WAV to AMR-WB (23.85 kbps). Intended for 16000 Hz input.
    pub fn wave_to_amr_wb(&self, wave: &[u8]) -> Result<Vec<u8>> {
        self.encode(wave, AmrVariant::Wideband)
    }

    /// AMR-NB to 8000 Hz WAV
    pub fn amr_nb_to_wave(&self, amr: &[u8]) -> Result<Vec<u8>> {
        self.decode(amr, AmrVariant::Narrowband)
    }

    /// AMR-WB to 16000 Hz WAV
    pub fn amr_wb_to_wave(&self, amr: &[u8]) -> Result<Vec<u8>> {
        self.decode(amr, AmrVariant::Wideband)
    }

    /// Encode, also returning conversion counters
    ///
    /// The PCM is cut into 20 ms frames of the source layout, starting at
    /// the `data` chunk and running to the end of the buffer, so chunks that
    /// follow `data` are consumed as audio. A trailing partial frame is
    /// dropped, not padded. Structural problems with the
    /// WAV are reported before any codec handle is allocated.
    pub fn encode_with_stats(
        &self,
        wave: &[u8],
        variant: AmrVariant,
    ) -> Result<(Vec<u8>, ConversionStats)> {
        let parsed = wav::parse(wave)?;
        let format = parsed.format;

        if !format.is_integer_pcm() {
            return Err(Error::unsupported(format!(
                "WAV format tag {:#06x} is not integer PCM",
                format.format_tag
            )));
        }
        let layout = PcmLayout::from_format(&format)?;
        let frame_bytes = pcm::speech_frame_bytes(&format)?;

        if format.sample_rate != variant.sample_rate() {
            warn!(
                "{} Hz input encoded as {} ({} Hz); audio will play back at the wrong speed",
                format.sample_rate,
                variant,
                variant.sample_rate()
            );
        }

        let buf = parsed.buffer();
        let mode = variant.encode_mode();
        let expected = variant.encoded_frame_size();
        let magic = variant.magic();

        let frame_count = (buf.len() - parsed.data_offset) / frame_bytes;
        let mut out = BytesMut::with_capacity(magic.len() + frame_count * expected);
        out.put_slice(magic);

        let mut stats = ConversionStats {
            input_bytes: wave.len(),
            ..Default::default()
        };

        debug!(
            "Encoding {:?} PCM, {} bytes per frame, mode {}",
            layout, frame_bytes, mode
        );

        let mut session = CodecSession::open(&self.engine, variant, CodecDirection::Encode)?;
        let mut offset = parsed.data_offset;

        while let Some(speech) = pcm::extract_frame(buf, &format, frame_bytes, offset)? {
            offset += frame_bytes;

            let encoded = session.encode(&speech, mode)?;
            if encoded.len() != expected {
                return Err(Error::codec(format!(
                    "{} engine returned {} bytes for mode {}, expected {}",
                    self.engine.name(),
                    encoded.len(),
                    mode,
                    expected
                )));
            }

            out.put_slice(&encoded);
            stats.frames += 1;
        }

        session.close();

        stats.discarded_bytes = buf.len().saturating_sub(offset);
        if stats.discarded_bytes > 0 {
            debug!(
                "Dropped {} trailing PCM bytes (partial frame)",
                stats.discarded_bytes
            );
        }

        stats.output_bytes = out.len();
        info!(
            "Encoded {}: wav size {} bytes, amr size {} bytes, {} frames",
            variant, stats.input_bytes, stats.output_bytes, stats.frames
        );

        Ok((out.to_vec(), stats))
    }

    /// Decode, also returning conversion counters
    ///
    /// Frames whose quality bit is clear are consumed without producing
    /// audio. Decoding stops when fewer bytes remain than the next frame
    /// declares.
    pub fn decode_with_stats(
        &self,
        amr: &[u8],
        variant: AmrVariant,
    ) -> Result<(Vec<u8>, ConversionStats)> {
        let mut reader = AmrFrameReader::new(amr, variant)?;

        let samples_per_frame = variant.samples_per_frame();
        let frame_bytes = samples_per_frame * 2;

        let mut pcm = BytesMut::new();
        let mut data_size: u32 = 0;
        let mut stats = ConversionStats {
            input_bytes: amr.len(),
            ..Default::default()
        };

        let mut session = CodecSession::open(&self.engine, variant, CodecDirection::Decode)?;

        for frame in reader.by_ref() {
            let frame = frame?;

            if !frame.header.quality {
                debug!(
                    "Skipping damaged FT {} frame at offset {}",
                    frame.header.frame_type, frame.offset
                );
                stats.bad_frames += 1;
                continue;
            }

            let decoded = session.decode(frame.data)?;
            if decoded.len() != samples_per_frame {
                return Err(Error::codec(format!(
                    "{} engine returned {} samples, expected {}",
                    self.engine.name(),
                    decoded.len(),
                    samples_per_frame
                )));
            }

            pcm.reserve(frame_bytes);
            for sample in decoded {
                pcm.put_i16_le(sample);
            }

            data_size = data_size
                .checked_add(frame_bytes as u32)
                .ok_or_else(|| Error::unsupported("decoded audio exceeds WAV size limit"))?;
            stats.frames += 1;
        }

        session.close();

        stats.discarded_bytes = reader.remaining().len();

        let mut out = Vec::with_capacity(WAV_HEADER_SIZE + pcm.len());
        out.extend_from_slice(&wav::build_header(variant.sample_rate(), data_size));
        out.extend_from_slice(&pcm);

        stats.output_bytes = out.len();
        info!(
            "Decoded {}: amr size {} bytes, wav size {} bytes, {} frames ({} bad)",
            variant, stats.input_bytes, stats.output_bytes, stats.frames, stats.bad_frames
        );

        Ok((out, stats))
    }
}

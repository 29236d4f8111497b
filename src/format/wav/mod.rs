//! WAV audio format support
//!
//! This module implements RIFF/WAVE parsing and header synthesis over
//! in-memory byte buffers. Every multi-byte field is decoded and encoded
//! explicitly in little-endian order, so nothing depends on native struct
//! layout or alignment.

pub mod header;
pub mod muxer;

pub use header::{parse, ParsedWave, WavFormat};
pub use muxer::{build_header, write_wav, WAV_HEADER_SIZE};

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use bytes::BufMut;

/// WAV format magic numbers
pub const RIFF_MAGIC: &[u8; 4] = b"RIFF";
pub const WAVE_MAGIC: &[u8; 4] = b"WAVE";
pub const FMT_CHUNK: &[u8; 4] = b"fmt ";
pub const DATA_CHUNK: &[u8; 4] = b"data";

/// `fmt ` tag for integer PCM
pub const WAVE_FORMAT_PCM: u16 = 0x0001;
/// `fmt ` tag for WAVE_FORMAT_EXTENSIBLE
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Size of a chunk header (4 byte ID + 4 byte size)
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Chunk header (4 byte ID + 4 byte size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

impl ChunkHeader {
    /// Create a chunk header
    pub fn new(id: &[u8; 4], size: u32) -> Self {
        ChunkHeader { id: *id, size }
    }

    /// Read a chunk header at `offset`
    ///
    /// Fails with [`Error::Unsupported`] if the 8 header bytes would run past
    /// the end of `buf`.
    pub fn read(buf: &[u8], offset: usize) -> Result<Self> {
        let end = offset
            .checked_add(CHUNK_HEADER_SIZE)
            .filter(|&end| end <= buf.len())
            .ok_or_else(|| {
                Error::unsupported(format!(
                    "chunk header at offset {} runs past end of buffer ({} bytes)",
                    offset,
                    buf.len()
                ))
            })?;

        let bytes = &buf[offset..end];
        let mut id = [0u8; 4];
        id.copy_from_slice(&bytes[0..4]);

        Ok(ChunkHeader {
            id,
            size: LittleEndian::read_u32(&bytes[4..8]),
        })
    }

    /// Check the chunk tag
    pub fn is(&self, id: &[u8; 4]) -> bool {
        &self.id == id
    }

    /// Chunk tag as printable text
    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }

    /// Bytes occupied by the chunk, header included
    pub fn span(&self) -> Option<usize> {
        (self.size as usize).checked_add(CHUNK_HEADER_SIZE)
    }

    /// Append the encoded header to `buf`
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.id);
        buf.put_u32_le(self.size);
    }
}

/// The "RIFF" chunk descriptor: a `RIFF` header followed by the `WAVE` form type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveDescriptor {
    pub header: ChunkHeader,
    pub form: [u8; 4],
}

impl WaveDescriptor {
    /// Encoded size of the descriptor
    pub const SIZE: usize = 12;

    /// Descriptor for a RIFF payload of `riff_size` bytes
    pub fn new(riff_size: u32) -> Self {
        WaveDescriptor {
            header: ChunkHeader::new(RIFF_MAGIC, riff_size),
            form: *WAVE_MAGIC,
        }
    }

    /// Read and validate the descriptor at the start of `buf`
    pub fn read(buf: &[u8]) -> Result<Self> {
        if buf.len() <= Self::SIZE {
            return Err(Error::unsupported(format!(
                "buffer too small for a WAV file: {} bytes",
                buf.len()
            )));
        }

        let header = ChunkHeader::read(buf, 0)?;
        if !header.is(RIFF_MAGIC) {
            return Err(Error::unsupported("Not a valid RIFF file"));
        }

        let mut form = [0u8; 4];
        form.copy_from_slice(&buf[8..12]);
        if &form != WAVE_MAGIC {
            return Err(Error::unsupported("Not a valid WAVE file"));
        }

        Ok(WaveDescriptor { header, form })
    }

    /// Append the encoded descriptor to `buf`
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        self.header.write_to(buf);
        buf.put_slice(&self.form);
    }
}

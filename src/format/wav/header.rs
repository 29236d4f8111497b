//! WAV `fmt ` chunk and whole-file structure parsing

use super::{
    ChunkHeader, WaveDescriptor, CHUNK_HEADER_SIZE, DATA_CHUNK, FMT_CHUNK, WAVE_FORMAT_EXTENSIBLE,
    WAVE_FORMAT_PCM,
};
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use bytes::BufMut;
use tracing::debug;

/// The `fmt ` sub-chunk, header included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Chunk header (`fmt `)
    pub header: ChunkHeader,
    /// Raw format tag (1 = PCM, 0xFFFE = extensible)
    pub format_tag: u16,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Average bytes per second
    pub byte_rate: u32,
    /// Block alignment
    pub block_align: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Encoded size of the chunk header plus the 16 fixed fields
    pub const SIZE: usize = 24;

    /// Payload size of a plain PCM `fmt ` chunk
    pub const PCM_CHUNK_SIZE: u32 = 16;

    /// Mono, 16-bit PCM at `sample_rate`
    pub fn pcm_mono_s16(sample_rate: u32) -> Self {
        WavFormat {
            header: ChunkHeader::new(FMT_CHUNK, Self::PCM_CHUNK_SIZE),
            format_tag: WAVE_FORMAT_PCM,
            channels: 1,
            sample_rate,
            byte_rate: sample_rate.wrapping_mul(2),
            block_align: 2,
            bits_per_sample: 16,
        }
    }

    /// Read the full `fmt ` chunk starting at its header
    pub fn read(buf: &[u8], offset: usize) -> Result<Self> {
        let header = ChunkHeader::read(buf, offset)?;
        if !header.is(FMT_CHUNK) {
            return Err(Error::format(format!(
                "expected fmt chunk at offset {}, found {:?}",
                offset,
                header.id_str()
            )));
        }

        if header.size < Self::PCM_CHUNK_SIZE {
            return Err(Error::unsupported(format!(
                "WAV format chunk too small: {} bytes",
                header.size
            )));
        }

        let end = offset
            .checked_add(Self::SIZE)
            .filter(|&end| end <= buf.len())
            .ok_or_else(|| Error::unsupported("fmt chunk runs past end of buffer"))?;
        let data = &buf[offset + CHUNK_HEADER_SIZE..end];

        Ok(WavFormat {
            header,
            format_tag: LittleEndian::read_u16(&data[0..2]),
            channels: LittleEndian::read_u16(&data[2..4]),
            sample_rate: LittleEndian::read_u32(&data[4..8]),
            byte_rate: LittleEndian::read_u32(&data[8..12]),
            block_align: LittleEndian::read_u16(&data[12..14]),
            bits_per_sample: LittleEndian::read_u16(&data[14..16]),
        })
    }

    /// Append the header and the 16 fixed fields to `buf`
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        self.header.write_to(buf);
        buf.put_u16_le(self.format_tag);
        buf.put_u16_le(self.channels);
        buf.put_u32_le(self.sample_rate);
        buf.put_u32_le(self.byte_rate);
        buf.put_u16_le(self.block_align);
        buf.put_u16_le(self.bits_per_sample);
    }

    /// Bytes per sample for a single channel
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample / 8) as usize
    }

    /// Bytes per sample frame (all channels)
    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * self.bytes_per_sample()
    }

    /// Bytes of PCM per second of audio
    pub fn bytes_per_second(&self) -> u64 {
        self.bytes_per_frame() as u64 * self.sample_rate as u64
    }

    /// Duration in seconds of `data_size` bytes of PCM
    pub fn duration_seconds(&self, data_size: u64) -> f64 {
        match self.bytes_per_second() {
            0 => 0.0,
            rate => data_size as f64 / rate as f64,
        }
    }

    /// Whether samples are stored as integer PCM
    ///
    /// Extensible files are taken at their declared bit depth; the
    /// sub-format GUID is not inspected.
    pub fn is_integer_pcm(&self) -> bool {
        matches!(self.format_tag, WAVE_FORMAT_PCM | WAVE_FORMAT_EXTENSIBLE)
    }

    /// Sample format name for the layouts the converter reads
    pub fn sample_format(&self) -> &'static str {
        match (self.is_integer_pcm(), self.bits_per_sample) {
            (true, 8) => "u8",
            (true, 16) => "s16",
            (true, _) => "pcm",
            (false, _) => "non-pcm",
        }
    }
}

/// Read-only view of a parsed WAV buffer
#[derive(Debug, Clone, Copy)]
pub struct ParsedWave<'a> {
    /// The `fmt ` chunk
    pub format: WavFormat,
    /// Header of the `data` chunk
    pub data_header: ChunkHeader,
    /// Offset of the first PCM byte
    pub data_offset: usize,
    buf: &'a [u8],
}

impl<'a> ParsedWave<'a> {
    /// The PCM payload of the `data` chunk
    pub fn pcm_data(&self) -> &'a [u8] {
        let end = self.data_offset.saturating_add(self.data_header.size as usize);
        self.buf.get(self.data_offset..end).unwrap_or_default()
    }

    /// The whole buffer this view was parsed from
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Duration of the `data` chunk in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.format.duration_seconds(self.data_header.size as u64)
    }
}

/// Locate the `fmt ` and `data` chunks of a RIFF/WAVE buffer
///
/// Unknown chunks are skipped by their declared size. The first `fmt ` chunk
/// wins, and the first `data` chunk after it is returned. Fails with
/// [`Error::Unsupported`] on bad magic, a missing chunk, a header that runs
/// past the buffer, or a `data` chunk whose declared size overruns the buffer.
pub fn parse(buf: &[u8]) -> Result<ParsedWave<'_>> {
    WaveDescriptor::read(buf)?;

    let mut offset = WaveDescriptor::SIZE;

    let format = loop {
        let header = ChunkHeader::read(buf, offset)
            .map_err(|_| Error::unsupported("fmt chunk not found"))?;

        if header.is(FMT_CHUNK) {
            let format = WavFormat::read(buf, offset)?;
            offset = skip_chunk(offset, &header)?;
            break format;
        }

        debug!(
            "Skipping {:?} chunk ({} bytes) at offset {}",
            header.id_str(),
            header.size,
            offset
        );
        offset = skip_chunk(offset, &header)?;
    };

    let data_header = loop {
        let header = ChunkHeader::read(buf, offset)
            .map_err(|_| Error::unsupported("data chunk not found"))?;

        if header.is(DATA_CHUNK) {
            break header;
        }

        debug!(
            "Skipping {:?} chunk ({} bytes) at offset {}",
            header.id_str(),
            header.size,
            offset
        );
        offset = skip_chunk(offset, &header)?;
    };

    let data_end = offset
        .checked_add(CHUNK_HEADER_SIZE)
        .and_then(|start| start.checked_add(data_header.size as usize))
        .filter(|&end| end <= buf.len())
        .ok_or_else(|| {
            Error::unsupported(format!(
                "data chunk of {} bytes at offset {} overruns buffer of {} bytes",
                data_header.size,
                offset,
                buf.len()
            ))
        })?;

    debug!(
        "WAV: {} ch, {} Hz, {} bit, data {}..{}",
        format.channels,
        format.sample_rate,
        format.bits_per_sample,
        offset + CHUNK_HEADER_SIZE,
        data_end
    );

    Ok(ParsedWave {
        format,
        data_header,
        data_offset: offset + CHUNK_HEADER_SIZE,
        buf,
    })
}

fn skip_chunk(offset: usize, header: &ChunkHeader) -> Result<usize> {
    header
        .span()
        .and_then(|span| offset.checked_add(span))
        .ok_or_else(|| Error::unsupported("chunk size overflows buffer offset"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::wav::WaveDescriptor;

    type Chunks<'a> = &'a [(&'a [u8; 4], Vec<u8>)];

    fn wav_with_chunks(format: &WavFormat, before_fmt: Chunks, between: Chunks, pcm: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        for (id, payload) in before_fmt {
            ChunkHeader::new(id, payload.len() as u32).write_to(&mut body);
            body.extend_from_slice(payload);
        }
        format.write_to(&mut body);
        for (id, payload) in between {
            ChunkHeader::new(id, payload.len() as u32).write_to(&mut body);
            body.extend_from_slice(payload);
        }
        ChunkHeader::new(DATA_CHUNK, pcm.len() as u32).write_to(&mut body);
        body.extend_from_slice(pcm);

        let mut buf = Vec::new();
        WaveDescriptor::new(body.len() as u32 + 4).write_to(&mut buf);
        buf.extend_from_slice(&body);
        buf
    }

    #[test]
    fn test_integer_pcm_tags() {
        let mut format = WavFormat::pcm_mono_s16(8000);
        assert!(format.is_integer_pcm());

        format.format_tag = WAVE_FORMAT_EXTENSIBLE;
        assert!(format.is_integer_pcm());
        assert_eq!(format.sample_format(), "s16");

        // IEEE float
        format.format_tag = 3;
        assert!(!format.is_integer_pcm());
        assert_eq!(format.sample_format(), "non-pcm");

        format.format_tag = WAVE_FORMAT_PCM;
        format.bits_per_sample = 24;
        assert_eq!(format.sample_format(), "pcm");
    }

    #[test]
    fn test_wav_format_calculations() {
        let mut format = WavFormat::pcm_mono_s16(8000);
        assert_eq!(format.bytes_per_frame(), 2);
        assert_eq!(format.bytes_per_second(), 16000);
        assert_eq!(format.sample_format(), "s16");
        assert!((format.duration_seconds(32000) - 2.0).abs() < 1e-9);

        format.channels = 2;
        format.bits_per_sample = 8;
        assert_eq!(format.bytes_per_frame(), 2);
        assert_eq!(format.sample_format(), "u8");
    }

    #[test]
    fn test_parse_canonical() {
        let pcm = vec![1u8, 0, 2, 0, 3, 0, 4, 0];
        let buf = wav_with_chunks(&WavFormat::pcm_mono_s16(8000), &[], &[], &pcm);

        let parsed = parse(&buf).unwrap();
        assert_eq!(parsed.format.channels, 1);
        assert_eq!(parsed.format.sample_rate, 8000);
        assert_eq!(parsed.format.bits_per_sample, 16);
        assert_eq!(parsed.data_offset, 44);
        assert_eq!(parsed.data_header.size, 8);
        assert_eq!(parsed.pcm_data(), &pcm[..]);
    }

    #[test]
    fn test_parse_skips_unknown_chunks() {
        let pcm = vec![9u8; 6];
        let buf = wav_with_chunks(
            &WavFormat::pcm_mono_s16(16000),
            &[(b"JUNK", vec![0u8; 10])],
            &[(b"LIST", vec![b'x'; 7]), (b"fact", vec![0u8; 4])],
            &pcm,
        );

        let parsed = parse(&buf).unwrap();
        assert_eq!(parsed.format.sample_rate, 16000);
        assert_eq!(parsed.data_offset, buf.len() - pcm.len());
        assert_eq!(parsed.pcm_data(), &pcm[..]);
    }

    #[test]
    fn test_parse_extended_fmt_chunk() {
        // fmt chunk with a cbSize extension must be skipped by its declared size
        let mut body = Vec::new();
        let mut format = WavFormat::pcm_mono_s16(8000);
        format.header.size = 18;
        format.write_to(&mut body);
        body.extend_from_slice(&[0, 0]);
        ChunkHeader::new(DATA_CHUNK, 2).write_to(&mut body);
        body.extend_from_slice(&[0x34, 0x12]);

        let mut buf = Vec::new();
        WaveDescriptor::new(body.len() as u32 + 4).write_to(&mut buf);
        buf.extend_from_slice(&body);

        let parsed = parse(&buf).unwrap();
        assert_eq!(parsed.data_offset, 46);
        assert_eq!(parsed.pcm_data(), &[0x34, 0x12]);
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let mut buf = wav_with_chunks(&WavFormat::pcm_mono_s16(8000), &[], &[], &[0, 0]);
        buf[0..4].copy_from_slice(b"RIFX");
        assert!(parse(&buf).unwrap_err().is_unsupported());

        let mut buf = wav_with_chunks(&WavFormat::pcm_mono_s16(8000), &[], &[], &[0, 0]);
        buf[8..12].copy_from_slice(b"WAVX");
        assert!(parse(&buf).unwrap_err().is_unsupported());

        assert!(parse(b"RIFF\0\0\0\0WAVE").is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_parse_missing_chunks() {
        // No fmt chunk at all
        let mut buf = Vec::new();
        WaveDescriptor::new(12).write_to(&mut buf);
        ChunkHeader::new(DATA_CHUNK, 4).write_to(&mut buf);
        buf.extend_from_slice(&[0; 4]);
        assert!(parse(&buf).unwrap_err().is_unsupported());

        // fmt but no data chunk
        let mut buf = Vec::new();
        WaveDescriptor::new(28).write_to(&mut buf);
        WavFormat::pcm_mono_s16(8000).write_to(&mut buf);
        assert!(parse(&buf).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_parse_data_overrun() {
        let mut buf = wav_with_chunks(&WavFormat::pcm_mono_s16(8000), &[], &[], &[0u8; 8]);
        // Declare more PCM than the buffer holds
        buf[40..44].copy_from_slice(&100u32.to_le_bytes());
        assert!(parse(&buf).unwrap_err().is_unsupported());

        // A skipped chunk whose size points far beyond the buffer
        let mut buf = wav_with_chunks(
            &WavFormat::pcm_mono_s16(8000),
            &[(b"JUNK", vec![0u8; 4])],
            &[],
            &[0u8; 2],
        );
        buf[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(parse(&buf).is_err());
    }

    #[test]
    fn test_parse_keeps_unusual_channel_counts() {
        let mut format = WavFormat::pcm_mono_s16(8000);
        format.channels = 3;
        let buf = wav_with_chunks(&format, &[], &[], &[0u8; 12]);

        // Structure is fine; layout support is decided by the PCM extractor
        let parsed = parse(&buf).unwrap();
        assert_eq!(parsed.format.channels, 3);
    }
}

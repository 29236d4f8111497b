//! Frame-by-frame reader over an AMR file

use super::{AmrVariant, FrameHeader};
use crate::error::{Error, Result};
use std::iter::FusedIterator;
use tracing::debug;

/// One AMR frame, header byte included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmrFrame<'a> {
    /// Decoded header byte
    pub header: FrameHeader,
    /// Offset of the frame within the file body (after the magic number)
    pub offset: usize,
    /// Frame bytes, starting with the header byte
    pub data: &'a [u8],
}

impl<'a> AmrFrame<'a> {
    /// Speech bits after the header byte
    pub fn payload(&self) -> &'a [u8] {
        &self.data[1..]
    }
}

/// Iterator over the frames of an AMR buffer
///
/// The size of each frame comes from its own header byte. Iteration ends
/// when the input is exhausted or when fewer bytes remain than the next
/// frame declares; those bytes are left in [`remaining`](Self::remaining).
/// A frame type outside the variant's table yields one `Err` and ends
/// iteration.
#[derive(Debug, Clone)]
pub struct AmrFrameReader<'a> {
    variant: AmrVariant,
    body: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> AmrFrameReader<'a> {
    /// Check the magic number and position the reader on the first frame
    ///
    /// A buffer holding only the magic number is rejected.
    pub fn new(buf: &'a [u8], variant: AmrVariant) -> Result<Self> {
        let magic = variant.magic();
        if buf.len() <= magic.len() || !buf.starts_with(magic) {
            return Err(Error::unsupported(format!(
                "missing {} magic number",
                variant
            )));
        }

        Ok(AmrFrameReader {
            variant,
            body: &buf[magic.len()..],
            pos: 0,
            done: false,
        })
    }

    /// Bytes not consumed by a complete frame
    pub fn remaining(&self) -> &'a [u8] {
        &self.body[self.pos..]
    }
}

impl<'a> Iterator for AmrFrameReader<'a> {
    type Item = Result<AmrFrame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let remaining = self.remaining();
        let header = match remaining.first() {
            Some(&byte) => FrameHeader::from_byte(byte),
            None => {
                self.done = true;
                return None;
            }
        };

        let size = match self.variant.frame_size(header.frame_type) {
            Ok(size) => size,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if remaining.len() < size {
            debug!(
                "Trailing {} bytes at offset {} shorter than FT {} frame ({} bytes)",
                remaining.len(),
                self.pos,
                header.frame_type,
                size
            );
            self.done = true;
            return None;
        }

        let frame = AmrFrame {
            header,
            offset: self.pos,
            data: &remaining[..size],
        };
        self.pos += size;

        Some(Ok(frame))
    }
}

impl FusedIterator for AmrFrameReader<'_> {}

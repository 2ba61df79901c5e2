//! A positioned, rewindable byte cursor.

use super::combinators::Rewind;
use crate::error::Result;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

/// Buffered reader over a seekable stream that tracks its own position.
///
/// Positions are absolute stream offsets. Seeking goes through
/// [`BufReader::seek_relative`], so backtracking by one token does not discard
/// the buffer.
#[derive(Debug)]
pub struct Source<R> {
    reader: BufReader<R>,
    origin: u64,
    position: u64,
    len: u64,
}

impl<R: Read + Seek> Source<R> {
    /// Wraps `reader`, starting at its current position.
    pub fn new(mut reader: R) -> Result<Self> {
        let origin = reader.stream_position()?;
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(origin))?;
        Ok(Source {
            reader: BufReader::new(reader),
            origin,
            position: origin,
            len,
        })
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The offset the source started at.
    #[inline]
    pub fn origin(&self) -> u64 {
        self.origin
    }

    pub fn seek_to(&mut self, position: u64) -> Result<()> {
        if position != self.position {
            let offset = position as i64 - self.position as i64;
            self.reader.seek_relative(offset)?;
            self.position = position;
        }
        Ok(())
    }

    /// Reads one byte, or `None` at end of stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let byte = match self.reader.fill_buf()?.first() {
            Some(byte) => *byte,
            None => return Ok(None),
        };
        self.reader.consume(1);
        self.position += 1;
        Ok(Some(byte))
    }

    /// Reads up to `n` bytes, fewer only at end of stream.
    pub fn read_upto(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(n);
        (&mut self.reader).take(n as u64).read_to_end(&mut bytes)?;
        self.position += bytes.len() as u64;
        Ok(bytes)
    }

    /// Advances `n` bytes. Returns `false`, without moving, if fewer remain.
    pub fn skip(&mut self, n: u64) -> Result<bool> {
        match self.position.checked_add(n) {
            Some(end) if end <= self.len => {
                self.seek_to(end)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Reads the bytes in `[start, end)` and returns to the current position.
    pub fn read_span(&mut self, start: u64, end: u64) -> Result<Vec<u8>> {
        let back = self.position;
        self.seek_to(start)?;
        let mut bytes = vec![0; end.saturating_sub(start) as usize];
        if let Err(err) = self.reader.read_exact(&mut bytes) {
            // position is unknown after a failed read_exact
            self.reader.seek(SeekFrom::Start(back))?;
            self.position = back;
            return Err(err.into());
        }
        self.position = end;
        self.seek_to(back)?;
        Ok(bytes)
    }

    pub fn is_at_end(&mut self) -> Result<bool> {
        Ok(self.reader.fill_buf()?.is_empty())
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R: Read + Seek> Rewind for Source<R> {
    fn position(&self) -> u64 {
        self.position
    }

    fn rewind(&mut self, position: u64) -> Result<()> {
        self.seek_to(position)
    }
}

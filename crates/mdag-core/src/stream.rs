//! Bounded sequential reading of caller-supplied data.

use std::io::{self, Read};

/// Splits a reader into chunks of exactly `chunk_size` bytes (the last one
/// may be shorter). The total length is never assumed up front.
///
/// The iterator is finite and not restartable: after end-of-stream or the
/// first read error it yields `None`. A zero `chunk_size` yields a single
/// `InvalidInput` error.
pub struct Chunks<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> Chunks<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size,
            done: false,
        }
    }
}

impl<R: Read> Iterator for Chunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.chunk_size == 0 {
            self.done = true;
            return Some(Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "chunk size must be positive",
            )));
        }
        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < self.chunk_size {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        if filled == 0 {
            self.done = true;
            return None;
        }
        buf.truncate(filled);
        Some(Ok(buf))
    }
}

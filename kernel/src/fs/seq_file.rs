//! Sequential record files.
//!
//! A [`SeqShow`] source emits one record per position; [`SeqFile`] buffers
//! the current record and hands it out through `read` calls of any size,
//! asking the source for the next position only once the buffer drains.
//! Dropping a `SeqFile` mid-way leaves nothing behind.

use alloc::string::String;
use core::fmt;

use crate::fs::procfs::Cursor;

/// Record source for a [`SeqFile`].
pub trait SeqShow {
    fn show(&self, out: &mut String, pos: usize) -> Result<Cursor, fmt::Error>;
}

pub struct SeqFile<S: SeqShow> {
    source: S,
    buf: String,
    consumed: usize,
    next: Cursor,
}

impl<S: SeqShow> SeqFile<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buf: String::new(),
            consumed: 0,
            next: Cursor::More(0),
        }
    }

    /// Copy up to `dst.len()` bytes. Returns 0 once the source is exhausted.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let mut copied = 0;
        while copied < dst.len() {
            let pending = &self.buf.as_bytes()[self.consumed..];
            if !pending.is_empty() {
                let n = pending.len().min(dst.len() - copied);
                dst[copied..copied + n].copy_from_slice(&pending[..n]);
                self.consumed += n;
                copied += n;
                continue;
            }

            let Cursor::More(pos) = self.next else {
                break;
            };
            self.buf.clear();
            self.consumed = 0;
            self.next = produce(&self.source, &mut self.buf, pos);
        }
        copied
    }

    /// Drain the rest of the file.
    pub fn read_to_string(&mut self) -> String {
        let mut text = String::from(&self.buf[self.consumed..]);
        self.consumed = self.buf.len();
        while let Cursor::More(pos) = self.next {
            self.next = produce(&self.source, &mut text, pos);
        }
        text
    }

    /// Position the next record will be produced for, or `End`.
    pub fn position(&self) -> Cursor {
        self.next
    }
}

/// Emit record `pos`; a record that fails to format ends the file.
fn produce<S: SeqShow>(source: &S, out: &mut String, pos: usize) -> Cursor {
    match source.show(out, pos) {
        Ok(cursor) => cursor,
        Err(_) => {
            log::warn!("seq_file: record {} failed to format", pos);
            Cursor::End
        }
    }
}

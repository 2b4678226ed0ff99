use crate::error::{Error, Result};

/// Which side of the node a stream's bytes belong to: wire traffic or the
/// on-disk database. Most types encode identically in both, but a few
/// (addresses, in particular) drop fields that only make sense on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Network,
    Storage,
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Network
    }
}

/// An in-memory byte buffer with a read cursor, carrying the scope and
/// protocol-version context that `Encode`/`Decode` impls may need.
///
/// Appending always writes to the end of the buffer; reading always starts
/// at the cursor and advances it. `consume` drops already-read bytes off the
/// front, which is how the connection hub reclaims space in a socket's
/// receive buffer after pulling a complete message out of it.
#[derive(Debug, Clone, Default)]
pub struct ByteStream {
    buf: Vec<u8>,
    pos: usize,
    scope: Scope,
    version: i32,
}

impl ByteStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: Scope, version: i32) -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            scope,
            version,
        }
    }

    /// Wraps an already-received buffer for decoding, cursor at the start.
    pub fn from_vec(buf: Vec<u8>) -> Self {
        Self {
            buf,
            pos: 0,
            scope: Scope::Network,
            version: 0,
        }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Reads exactly `count` bytes from the cursor and advances it.
    pub fn read(&mut self, count: usize) -> Result<&[u8]> {
        let available = self.avail();
        if count > available {
            return Err(Error::ReadBeyondData {
                requested: count,
                available,
            });
        }
        let start = self.pos;
        self.pos += count;
        Ok(&self.buf[start..self.pos])
    }

    /// Reads everything left in the buffer without a length prefix, for the
    /// trailing fields that borrow their length from the enclosing frame.
    pub fn read_to_end(&mut self) -> &[u8] {
        let start = self.pos;
        self.pos = self.buf.len();
        &self.buf[start..]
    }

    /// Moves the cursor to an absolute position, returning the previous one.
    pub fn seek(&mut self, pos: usize) -> usize {
        let previous = self.pos;
        self.pos = pos.min(self.buf.len());
        previous
    }

    /// Moves the cursor back by `count` bytes.
    pub fn rewind(&mut self, count: usize) -> Result<()> {
        if count > self.pos {
            return Err(Error::ReadBeyondData {
                requested: count,
                available: self.pos,
            });
        }
        self.pos -= count;
        Ok(())
    }

    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Drops `count` bytes from the front of the buffer, shifting the
    /// cursor back by the same amount. Used once a complete message has
    /// been parsed out of a socket's accumulation buffer.
    pub fn consume(&mut self, count: usize) {
        let count = count.min(self.buf.len());
        self.buf.drain(0..count);
        self.pos = self.pos.saturating_sub(count);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
    }

    pub fn size(&self) -> usize {
        self.buf.len()
    }

    /// Bytes remaining between the cursor and the end of the buffer.
    pub fn avail(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}

impl std::ops::Index<usize> for ByteStream {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.buf[index]
    }
}

//! Binary reading and writing utilities for intent payloads.
//!
//! All values are little-endian.

use crate::ProtocolError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// A reader for parsing intent payloads.
#[derive(Debug)]
pub struct IntentReader {
    buf: Bytes,
}

impl IntentReader {
    /// Create a new reader from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { buf: data.into() }
    }

    /// Returns remaining bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn get_u8(&mut self) -> Result<u8, ProtocolError> {
        if self.buf.remaining() < 1 {
            return Err(ProtocolError::UnexpectedEof);
        }
        Ok(self.buf.get_u8())
    }

    pub fn get_i32(&mut self) -> Result<i32, ProtocolError> {
        if self.buf.remaining() < 4 {
            return Err(ProtocolError::UnexpectedEof);
        }
        Ok(self.buf.get_i32_le())
    }

    pub fn get_f32(&mut self) -> Result<f32, ProtocolError> {
        if self.buf.remaining() < 4 {
            return Err(ProtocolError::UnexpectedEof);
        }
        Ok(self.buf.get_f32_le())
    }

    /// Read a null-terminated UTF-8 string (or the rest of the buffer).
    pub fn get_string_utf8(&mut self) -> String {
        let mut bytes = Vec::new();
        while self.buf.has_remaining() {
            let b = self.buf.get_u8();
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// A writer for building intent payloads.
#[derive(Debug, Default)]
pub struct IntentWriter {
    buf: BytesMut,
}

impl IntentWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(16),
        }
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    #[inline]
    pub fn put_i32(&mut self, v: i32) {
        self.buf.put_i32_le(v);
    }

    #[inline]
    pub fn put_f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    /// Write a null-terminated UTF-8 string.
    pub fn put_string_utf8(&mut self, s: &str) {
        self.buf.put_slice(s.as_bytes());
        self.buf.put_u8(0);
    }

    /// Consume the writer and return the built buffer.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

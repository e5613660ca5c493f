//! Fixed-size text buffer holding the most recent failure description.

use std::fmt::{self, Write};

use crate::error::ListError;

/// Capacity of an [`ErrorBuffer`] in bytes.
pub const ERROR_BUFFER_LEN: usize = 256;

/// Last-error buffer updated by every failing store operation.
///
/// Text longer than [`ERROR_BUFFER_LEN`] bytes is cut at the last character
/// boundary that fits. Successful operations leave the contents alone.
#[derive(Clone)]
pub struct ErrorBuffer {
    bytes: [u8; ERROR_BUFFER_LEN],
    len: usize,
}

impl ErrorBuffer {
    pub fn new() -> Self {
        Self {
            bytes: [0; ERROR_BUFFER_LEN],
            len: 0,
        }
    }

    /// Replace the contents with `"<operation>: <error>"`.
    pub fn record(&mut self, operation: &str, error: &ListError) {
        self.clear();
        // Writing into the buffer truncates instead of failing.
        let _ = write!(self, "{operation}: {error}");
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for ErrorBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for ErrorBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = ERROR_BUFFER_LEN - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.bytes[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

impl fmt::Debug for ErrorBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorBuffer").field(&self.as_str()).finish()
    }
}

impl fmt::Display for ErrorBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

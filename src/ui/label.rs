//! Fixed size text labels

use core::fmt;

use crate::error::Error;

/// Text label with its own buffer, so no allocator is needed
pub struct Label<const N: usize> {
    str_buf: [u8; N],
    len: usize,
}

impl<const N: usize> Default for Label<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Label<N> {
    /// Create empty label
    pub const fn new() -> Self {
        Self {
            str_buf: [0; N],
            len: 0,
        }
    }

    /// Replace the label text. The label is left empty if the text does not fit.
    pub fn set(&mut self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        match format_no_std::show(&mut self.str_buf, args) {
            Ok(text) => {
                self.len = text.len();
                Ok(())
            }
            Err(err) => {
                self.len = 0;
                Err(err.into())
            }
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.str_buf[..self.len]).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

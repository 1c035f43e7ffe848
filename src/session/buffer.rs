/// Text buffer that never grows past a fixed byte capacity
///
/// Writes that do not fit are cut at the last character boundary that
/// does; the overflow is dropped without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollbackBuffer {
    text: String,
    capacity: usize,
}

impl ScrollbackBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            text: String::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.text.len()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Append as much of `text` as fits. Returns the number of bytes written
    pub fn push_truncated(&mut self, text: &str) -> usize {
        let cut = floor_char_boundary(text, self.remaining());
        self.text.push_str(&text[..cut]);
        cut
    }

    /// Append `text` only if it fits entirely
    pub fn push_whole(&mut self, text: &str) -> bool {
        if text.len() > self.remaining() {
            return false;
        }
        self.text.push_str(text);
        true
    }

    /// Discard the current content and store as much of `text` as fits
    pub fn replace(&mut self, text: &str) {
        self.clear();
        self.push_truncated(text);
    }
}

/// Largest char boundary in `text` that is `<= max`
pub(crate) fn floor_char_boundary(text: &str, max: usize) -> usize {
    if max >= text.len() {
        return text.len();
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}

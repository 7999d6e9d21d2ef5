use std::fmt;

use zeroize::Zeroize;

/// Single-line text buffer with a character cursor.
///
/// Masked buffers hold secrets (custom config passwords); their content is
/// wiped on every overwrite and on drop.
#[derive(Default, Clone)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
    masked: bool,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masked() -> Self {
        // Struct update syntax cannot move out of a Drop type
        let mut buffer = Self::default();
        buffer.masked = true;
        buffer
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    /// Text to draw; masked buffers show one `mask_char` per character
    pub fn display(&self, mask_char: char) -> String {
        if self.masked {
            std::iter::repeat_n(mask_char, self.len()).collect()
        } else {
            self.content.clone()
        }
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.remove_char_at(self.cursor);
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        self.remove_char_at(self.cursor);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.content.zeroize();
        self.cursor = 0;
    }

    /// Replace the content and put the cursor at the end
    pub fn set(&mut self, value: &str) {
        self.content.zeroize();
        self.content.push_str(value);
        self.cursor = self.len();
    }

    fn remove_char_at(&mut self, char_idx: usize) {
        let start = self.byte_offset(char_idx);
        let end = self.byte_offset(char_idx + 1);
        self.content.drain(start..end);
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }
}

impl fmt::Debug for InputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = if self.masked { "<redacted>" } else { self.content.as_str() };
        f.debug_struct("InputBuffer")
            .field("content", &content)
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl Drop for InputBuffer {
    fn drop(&mut self) {
        if self.masked {
            self.content.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_at_cursor_with_multibyte_chars() {
        let mut buf = InputBuffer::new();
        buf.set("/dév");
        buf.move_left();
        buf.delete_back();
        assert_eq!(buf.content(), "/dv");
        assert_eq!(buf.cursor(), 2);

        buf.insert('e');
        assert_eq!(buf.content(), "/dev");
        buf.move_start();
        assert!(!buf.delete_back());
        assert!(buf.delete_forward());
        assert_eq!(buf.content(), "dev");
    }

    #[test]
    fn masked_constructor_starts_empty_and_masked() {
        let buf = InputBuffer::masked();
        assert!(buf.is_masked());
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), 0);
        assert!(!InputBuffer::new().is_masked());
    }

    #[test]
    fn masked_buffer_hides_content() {
        let mut buf = InputBuffer::masked();
        buf.set("secret");
        assert_eq!(buf.display('*'), "******");
        assert!(!format!("{buf:?}").contains("secret"));

        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), 0);
    }
}

//! Line and UTF-16 column lookups.
//!
//! Sourcemap consumers count columns in UTF-16 code units, while tree-sitter and the edit model
//! work in bytes. [`LineIndex`] converts between the two. Lines that are pure ASCII take a fast
//! path where byte columns and UTF-16 columns coincide; other lines are scanned char by char,
//! which is fine because source lines are short.
//!
//! Columns never include the line terminator: a trailing `\r` before `\n` is excluded, and any
//! byte past the end of a line's content clamps to the end of that content.

/// Byte offset ⇄ (line, UTF-16 column) index over one string.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
    ascii: Vec<bool>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0usize];
        let mut ascii = vec![true];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
                ascii.push(true);
            } else if !b.is_ascii() {
                let last = ascii.len() - 1;
                ascii[last] = false;
            }
        }
        Self {
            text,
            line_starts,
            ascii,
        }
    }

    /// Byte offsets at which each line starts. Always begins with `0`.
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Returns the 0-based line containing `byte`. Offsets past the end land on the last line.
    pub fn line_for_byte(&self, byte: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= byte) - 1
    }

    /// End of the line's content (exclusive), not counting `\n` or `\r\n`.
    fn content_end(&self, line: usize) -> usize {
        let bytes = self.text.as_bytes();
        let mut end = match self.line_starts.get(line + 1) {
            Some(&next) => next - 1,
            None => bytes.len(),
        };
        if end > self.line_starts[line] && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        end
    }

    /// Convert a byte offset into `(line, utf16_column)`.
    ///
    /// Offsets inside a multi-byte character resolve to the start of that character.
    pub fn byte_to_line_utf16_col(&self, byte: usize) -> (usize, usize) {
        let line = self.line_for_byte(byte);
        let start = self.line_starts[line];
        let end = byte.min(self.content_end(line)).max(start);

        if self.ascii[line] {
            return (line, end - start);
        }

        let mut end = end;
        while !self.text.is_char_boundary(end) {
            end -= 1;
        }
        let col = self.text[start..end].chars().map(char::len_utf16).sum();
        (line, col)
    }

    /// Convert `(line, utf16_column)` into a byte offset.
    ///
    /// Returns `None` when the line does not exist. Columns past the end of the line clamp to
    /// its content end; a column pointing into the middle of a surrogate pair resolves to the
    /// start of that character.
    pub fn line_utf16_col_to_byte(&self, line: usize, utf16_col: usize) -> Option<usize> {
        let start = *self.line_starts.get(line)?;
        let end = self.content_end(line);

        if self.ascii[line] {
            return Some(start + utf16_col.min(end - start));
        }

        let mut units = 0usize;
        for (offset, ch) in self.text[start..end].char_indices() {
            let next = units + ch.len_utf16();
            if next > utf16_col {
                return Some(start + offset);
            }
            units = next;
        }
        Some(end)
    }
}

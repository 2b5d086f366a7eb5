//! ASCII frame type.

/// One fully quantized frame: `height` rows of exactly `width` glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiFrame {
    /// Character data for the frame (row-major order)
    pub chars: Vec<char>,
    /// Width in characters
    pub width: u16,
    /// Height in characters
    pub height: u16,
}

impl AsciiFrame {
    /// Create a frame from a character vector of length `width * height`.
    pub fn from_chars(chars: Vec<char>, width: u16, height: u16) -> Self {
        debug_assert_eq!(chars.len(), usize::from(width) * usize::from(height));
        Self {
            chars,
            width,
            height,
        }
    }

    /// Iterate over the rows of the frame.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        // chunks() panics on 0; an empty frame simply has no rows.
        self.chars.chunks(usize::from(self.width.max(1)))
    }

    /// Render the frame as text, every row terminated by `\n`.
    pub fn to_text(&self) -> String {
        if self.width == 0 || self.height == 0 {
            return String::new();
        }
        let mut out = String::with_capacity(self.chars.len() + usize::from(self.height));
        for row in self.rows() {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_frame_to_text() {
        let chars = vec!['#', '.', ':', '@', '*', '+'];
        let frame = AsciiFrame::from_chars(chars, 3, 2);
        assert_eq!(frame.to_text(), "#.:\n@*+\n");
    }

    #[test]
    fn test_ascii_frame_to_text_empty() {
        assert_eq!(AsciiFrame::from_chars(Vec::new(), 0, 0).to_text(), "");
    }

    #[test]
    fn test_ascii_frame_rows() {
        let frame = AsciiFrame::from_chars(vec!['a', 'b', 'c', 'd'], 2, 2);
        let rows: Vec<String> = frame.rows().map(|r| r.iter().collect()).collect();
        assert_eq!(rows, vec!["ab", "cd"]);
    }
}

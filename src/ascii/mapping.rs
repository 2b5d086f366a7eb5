//! Brightness to glyph mapping.

/// Glyph index for an averaged luminance on a ramp of `levels` glyphs:
/// `floor(avg * levels / 256)`, clamped to the last glyph.
///
/// Non-decreasing in `avg`, so brighter cells never get a darker glyph.
#[inline]
pub fn glyph_index(avg: u8, levels: usize) -> usize {
    if levels == 0 {
        return 0;
    }
    ((usize::from(avg) * levels) / 256).min(levels - 1)
}

/// Map brightness values to glyphs from `charset` (ordered darkest to brightest).
pub fn map_to_chars(brightness: &[u8], charset: &[char]) -> Vec<char> {
    if charset.is_empty() {
        return vec![' '; brightness.len()];
    }
    brightness
        .iter()
        .map(|&b| charset[glyph_index(b, charset.len())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::STANDARD_CHARSET;

    #[test]
    fn test_glyph_index_bounds() {
        assert_eq!(glyph_index(0, 10), 0);
        assert_eq!(glyph_index(255, 10), 9);
        assert_eq!(glyph_index(25, 10), 0);
        assert_eq!(glyph_index(26, 10), 1);
    }

    #[test]
    fn test_glyph_index_mid() {
        assert_eq!(glyph_index(127, 10), 4);
        assert_eq!(glyph_index(128, 10), 5);
    }

    #[test]
    fn test_glyph_index_empty_ramp() {
        assert_eq!(glyph_index(200, 0), 0);
    }

    #[test]
    fn test_map_to_chars() {
        let chars = map_to_chars(&[0, 127, 255], STANDARD_CHARSET);
        assert_eq!(chars, vec![' ', '=', '@']);
    }

    #[test]
    fn test_map_to_chars_empty_charset() {
        assert_eq!(map_to_chars(&[0, 255], &[]), vec![' ', ' ']);
    }
}

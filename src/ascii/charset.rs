//! Glyph ramp for ASCII rendering.

/// Standard ASCII density ramp (10 levels).
/// Characters ordered from darkest (space) to brightest (@).
/// Works well on dark terminals.
pub const STANDARD_CHARSET: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Darkest glyph of the standard ramp.
pub const DARKEST: char = ' ';

/// Brightest glyph of the standard ramp.
pub const BRIGHTEST: char = '@';

// src/fonts.rs
//
// Width metrics for the panel's built-in fonts. The panel renders text
// itself; we only need advance widths to decide whether a string fits
// its column or has to scroll.

/// Font size classes understood by the panel firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum FontClass {
    /// 7 px label font.
    Small,
    /// 10 px row font.
    Medium,
    /// 16 px row font.
    Large,
}

impl FontClass {
    /// Font id as used on the wire.
    pub fn wire_id(self) -> u8 {
        match self {
            FontClass::Small => 5,
            FontClass::Medium => 10,
            FontClass::Large => 12,
        }
    }

    fn base_advance(self) -> u32 {
        match self {
            FontClass::Small => 4,
            FontClass::Medium => 6,
            FontClass::Large => 7,
        }
    }
}

/// Pixel width of one character including inter-glyph spacing.
pub fn char_width(c: char, font: FontClass) -> u32 {
    let base = font.base_advance();
    match c {
        'i' | 'l' | 'j' | '!' | '\'' | '.' | ',' | ':' | ';' | '|' => base - 2,
        ' ' | '1' | 't' | 'f' | 'r' | '(' | ')' | '[' | ']' => base - 1,
        'm' | 'w' | 'M' | 'W' | '@' => base + 2,
        _ => base,
    }
}

/// Pixel width of a whole string in the given font.
pub fn text_width(text: &str, font: FontClass) -> u32 {
    text.chars().map(|c| char_width(c, font)).sum()
}

//! Standard-14 Helvetica metrics and WinAnsi text encoding for stamps.

use lopdf::{Dictionary, dictionary};

/// Advance widths (1/1000 em) of Helvetica for WinAnsi codes 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Advance widths of Helvetica-Bold for WinAnsi codes 32..=126.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, //
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, //
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, //
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const FALLBACK_WIDTH: u16 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampFont {
    Regular,
    Bold,
}

impl StampFont {
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            StampFont::Regular => "FDossier",
            StampFont::Bold => "FDossierBold",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            StampFont::Regular => "Helvetica",
            StampFont::Bold => "Helvetica-Bold",
        }
    }

    pub(crate) fn dictionary(self) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.base_font(),
            "Encoding" => "WinAnsiEncoding",
        }
    }

    /// Width in points of already-encoded text at `size`.
    pub fn text_width(self, encoded: &[u8], size: f32) -> f32 {
        let table = match self {
            StampFont::Regular => &HELVETICA_WIDTHS,
            StampFont::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        let units: u32 = encoded
            .iter()
            .map(|&b| match b {
                32..=126 => u32::from(table[usize::from(b - 32)]),
                _ => u32::from(FALLBACK_WIDTH),
            })
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Encodes text for a WinAnsi simple font. Latin-1 characters map to
/// themselves; anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '\u{20ac}' => 0x80,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            _ => b'?',
        })
        .collect()
}

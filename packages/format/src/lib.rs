//! On-disk records of the MS Write (.wri) format.
//!
//! ```text
//! page 0            header (98 bytes used)
//! pages 1..         text, fcMac - 128 bytes
//! pnChar..          character FKPs
//! pnPara..          paragraph FKPs
//! pnSep, pnSetb     optional section record and section table
//! pnFfntb..         font table
//! ```
//!
//! Everything here is pure byte layout; no I/O happens in this crate.

pub mod chp;
pub mod diff;
pub mod error;
pub mod fkp;
pub mod fonts;
pub mod header;
pub mod le;
pub mod pap;
pub mod sep;

pub use chp::{CharacterProps, ScriptPosition, CHP_SIZE};
pub use diff::compute_cch;
pub use error::{FormatError, FormatResult};
pub use fkp::{FkpPacker, FkpPage, Fod, FC_TEXT_START, FOD_SIZE, FPROP_AREA, MAX_BLOBS_PER_PAGE, MAX_FODS};
pub use fonts::{decode_font_page, encode_font_table, FontEntry, FontPageEnd, MAX_FONTS, MAX_FONT_NAME};
pub use header::{FileHeader, HEADER_SIZE};
pub use pap::{Justification, ParagraphProps, TabAlignment, TabStop, MAX_TABS, PAP_SIZE, STORED_PAP_SIZE};
pub use sep::{encode_section_table, SectionProps, SEP_SIZE};
pub use writekit_common::{Page, PageNumber, PAGE_SIZE};

/// Encode text as Latin-1, replacing anything outside it with `?`
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Decode Latin-1 bytes
pub fn from_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1() {
        assert_eq!(to_latin1("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(to_latin1("\u{20ac}1"), b"?1".to_vec());
        assert_eq!(from_latin1(&[b'a', 0xE9]), "a\u{e9}");
    }
}

//! Font face name table (FFNTB).

use crate::error::{FormatError, FormatResult};
use crate::le::{get_u16, put_u16};
use crate::{from_latin1, to_latin1};
use serde::Serialize;
use writekit_common::{Page, PAGE_SIZE};

/// Font codes live in six bits of the character record
pub const MAX_FONTS: usize = 64;
/// Longest face name kept, in bytes
pub const MAX_FONT_NAME: usize = 31;

const MORE_ON_NEXT_PAGE: u16 = 0xFFFF;
const END_OF_TABLE: u16 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontEntry {
    /// Font family id, 0 when unknown
    pub family: u8,
    pub name: String,
}

impl FontEntry {
    pub fn new(name: impl Into<String>, family: u8) -> Self {
        Self {
            family,
            name: name.into(),
        }
    }
}

/// How a font table page ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontPageEnd {
    End,
    Continued,
}

/// Lay out the table over as many pages as it needs.
///
/// The first page starts with the entry count; continuation pages do not.
/// Two bytes are always kept free at the end of a page for the
/// continuation or end marker.
pub fn encode_font_table(fonts: &[FontEntry]) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut page = [0u8; PAGE_SIZE];
    put_u16(&mut page, 0, fonts.len() as u16);
    let mut pos = 2;

    for font in fonts {
        let mut name = to_latin1(&font.name);
        name.truncate(MAX_FONT_NAME);
        name.push(0);

        if (PAGE_SIZE - pos).saturating_sub(2) < 3 + name.len() {
            put_u16(&mut page, pos, MORE_ON_NEXT_PAGE);
            pages.push(page);
            page = [0u8; PAGE_SIZE];
            pos = 0;
        }

        put_u16(&mut page, pos, (1 + name.len()) as u16);
        page[pos + 2] = font.family;
        page[pos + 3..pos + 3 + name.len()].copy_from_slice(&name);
        pos += 3 + name.len();
    }

    put_u16(&mut page, pos, END_OF_TABLE);
    pages.push(page);
    pages
}

/// Decode the entries of one font table page into `out`
pub fn decode_font_page(page: &Page, first: bool, out: &mut Vec<FontEntry>) -> FormatResult<FontPageEnd> {
    let mut pos = if first { 2 } else { 0 };

    loop {
        if pos + 2 > PAGE_SIZE {
            return Err(FormatError::font_table(pos, "missing end marker"));
        }
        match get_u16(page, pos) {
            END_OF_TABLE => return Ok(FontPageEnd::End),
            MORE_ON_NEXT_PAGE => return Ok(FontPageEnd::Continued),
            _ => {}
        }

        let name_start = pos + 3;
        if name_start >= PAGE_SIZE {
            return Err(FormatError::font_table(pos, "entry overruns page"));
        }
        let name_len = page[name_start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| FormatError::font_table(pos, "unterminated font name"))?;

        out.push(FontEntry {
            family: page[pos + 2],
            name: from_latin1(&page[name_start..name_start + name_len]),
        });
        pos = name_start + name_len + 1;
    }
}

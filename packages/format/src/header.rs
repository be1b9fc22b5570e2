//! File header stored at page 0.

use crate::error::{FormatError, FormatResult};
use crate::le::{get_u16, get_u32, put_u16, put_u32};
use serde::Serialize;
use writekit_common::{pages_for, Page, PageNumber, PAGE_SIZE};

pub const HEADER_SIZE: usize = 98;

/// `wIdent` of a plain Write file
pub const IDENT: u16 = 0o137061;
/// `wIdent` of a Write file carrying OLE objects
pub const IDENT_OLE: u16 = 0o137062;
/// `wTool`
pub const TOOL: u16 = 0o125400;

const OFF_IDENT: usize = 0;
const OFF_DTY: usize = 2;
const OFF_TOOL: usize = 4;
const OFF_FC_MAC: usize = 14;
const OFF_PN_PARA: usize = 18;
const OFF_PN_FNTB: usize = 20;
const OFF_PN_SEP: usize = 22;
const OFF_PN_SETB: usize = 24;
const OFF_PN_PGTB: usize = 26;
const OFF_PN_FFNTB: usize = 28;
const OFF_PN_MAC: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHeader {
    pub ident: u16,
    pub dty: u16,
    pub tool: u16,
    /// File offset one past the last text byte
    pub fc_mac: u32,
    pub pn_para: PageNumber,
    pub pn_fntb: PageNumber,
    pub pn_sep: PageNumber,
    pub pn_setb: PageNumber,
    pub pn_pgtb: PageNumber,
    pub pn_ffntb: PageNumber,
    /// Zero for files written by Word
    pub pn_mac: PageNumber,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            ident: IDENT,
            dty: 0,
            tool: TOOL,
            fc_mac: PAGE_SIZE as u32,
            pn_para: 0,
            pn_fntb: 0,
            pn_sep: 0,
            pn_setb: 0,
            pn_pgtb: 0,
            pn_ffntb: 0,
            pn_mac: 0,
        }
    }
}

impl FileHeader {
    /// First page of character property data
    pub fn pn_char(&self) -> FormatResult<PageNumber> {
        pages_for(u64::from(self.fc_mac)).map_err(|_| FormatError::TextTooLong {
            fc_mac: self.fc_mac,
        })
    }

    /// Length of the text area in bytes
    pub fn text_len(&self) -> u32 {
        self.fc_mac.saturating_sub(PAGE_SIZE as u32)
    }

    /// True when the section pages sit where a Write-produced file puts them
    pub fn has_section_table(&self) -> bool {
        self.pn_sep.checked_add(1) == Some(self.pn_setb)
            && self.pn_setb.checked_add(1) == Some(self.pn_pgtb)
    }

    pub fn encode(&self) -> Page {
        let mut page = [0u8; PAGE_SIZE];
        put_u16(&mut page, OFF_IDENT, self.ident);
        put_u16(&mut page, OFF_DTY, self.dty);
        put_u16(&mut page, OFF_TOOL, self.tool);
        put_u32(&mut page, OFF_FC_MAC, self.fc_mac);
        put_u16(&mut page, OFF_PN_PARA, self.pn_para);
        put_u16(&mut page, OFF_PN_FNTB, self.pn_fntb);
        put_u16(&mut page, OFF_PN_SEP, self.pn_sep);
        put_u16(&mut page, OFF_PN_SETB, self.pn_setb);
        put_u16(&mut page, OFF_PN_PGTB, self.pn_pgtb);
        put_u16(&mut page, OFF_PN_FFNTB, self.pn_ffntb);
        put_u16(&mut page, OFF_PN_MAC, self.pn_mac);
        page
    }

    /// Decode and validate a header.
    ///
    /// Rejects anything that is not a plain Write file: a wrong magic, a
    /// file with OLE objects, or a Word file (`pnMac == 0`).
    pub fn decode(bytes: &[u8]) -> FormatResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::truncated(HEADER_SIZE, bytes.len()));
        }

        let header = Self {
            ident: get_u16(bytes, OFF_IDENT),
            dty: get_u16(bytes, OFF_DTY),
            tool: get_u16(bytes, OFF_TOOL),
            fc_mac: get_u32(bytes, OFF_FC_MAC),
            pn_para: get_u16(bytes, OFF_PN_PARA),
            pn_fntb: get_u16(bytes, OFF_PN_FNTB),
            pn_sep: get_u16(bytes, OFF_PN_SEP),
            pn_setb: get_u16(bytes, OFF_PN_SETB),
            pn_pgtb: get_u16(bytes, OFF_PN_PGTB),
            pn_ffntb: get_u16(bytes, OFF_PN_FFNTB),
            pn_mac: get_u16(bytes, OFF_PN_MAC),
        };

        if header.ident == IDENT_OLE && header.tool == TOOL {
            return Err(FormatError::OleObjects);
        }
        if header.ident != IDENT || header.tool != TOOL || header.dty != 0 {
            return Err(FormatError::NotAWriteFile {
                ident: header.ident,
                tool: header.tool,
            });
        }
        if header.pn_mac == 0 {
            return Err(FormatError::WordFile);
        }

        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileHeader {
        FileHeader {
            fc_mac: 128 + 300,
            pn_para: 5,
            pn_fntb: 6,
            pn_sep: 6,
            pn_setb: 7,
            pn_pgtb: 8,
            pn_ffntb: 8,
            pn_mac: 9,
            ..FileHeader::default()
        }
    }

    #[test]
    fn test_layout() {
        let page = sample().encode();
        assert_eq!(&page[0..2], &[0x31, 0xBE]);
        assert_eq!(&page[4..6], &[0x00, 0xAB]);
        assert_eq!(get_u32(&page, 14), 428);
        assert_eq!(get_u16(&page, 96), 9);
        assert!(page[HEADER_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_encoded() {
        let header = sample();
        assert_eq!(FileHeader::decode(&header.encode()).unwrap(), header);
        assert_eq!(header.pn_char().unwrap(), 4);
        assert_eq!(header.text_len(), 300);
        assert!(header.has_section_table());
    }

    #[test]
    fn test_rejects_foreign_files() {
        let mut page = sample().encode();
        page[0] = 0x32;
        assert_eq!(FileHeader::decode(&page), Err(FormatError::OleObjects));

        page[0] = 0x00;
        assert!(matches!(
            FileHeader::decode(&page),
            Err(FormatError::NotAWriteFile { .. })
        ));

        let word = FileHeader {
            pn_mac: 0,
            ..sample()
        };
        assert_eq!(FileHeader::decode(&word.encode()), Err(FormatError::WordFile));

        let huge = FileHeader {
            fc_mac: u32::MAX,
            ..sample()
        };
        assert_eq!(
            huge.pn_char(),
            Err(FormatError::TextTooLong { fc_mac: u32::MAX })
        );

        assert!(matches!(
            FileHeader::decode(&[0u8; 10]),
            Err(FormatError::Truncated { needed: 98, actual: 10 })
        ));
    }
}

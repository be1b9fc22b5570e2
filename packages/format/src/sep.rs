//! Section properties (SEP) and the section table (SETB).

use crate::le::{get_u16, put_i16, put_u16, put_u32};
use serde::Serialize;
use writekit_common::{Page, PageNumber, PAGE_SIZE};

/// Stored bytes following the leading count byte
pub const SEP_BODY_SIZE: usize = 102;
/// Full on-disk record including the count byte
pub const SEP_SIZE: usize = SEP_BODY_SIZE + 1;

const PAD_SIZE: usize = SEP_BODY_SIZE - 22;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProps {
    #[serde(skip)]
    pub reserved1: u16,
    pub page_height: u16,
    pub page_width: u16,
    /// 0xFFFF when pages are numbered from 1
    pub first_page_number: u16,
    pub top_margin: u16,
    pub text_height: u16,
    pub left_margin: u16,
    pub text_width: u16,
    #[serde(skip)]
    pub reserved2: u16,
    /// Distance of the header from the top of the page
    pub header_top: u16,
    /// Distance of the footer from the top of the page
    pub footer_top: u16,
    #[serde(skip)]
    pub padding: [u8; PAD_SIZE],
}

impl Default for SectionProps {
    fn default() -> Self {
        Self {
            reserved1: 0,
            page_height: 15840,
            page_width: 12240,
            first_page_number: 0xFFFF,
            top_margin: 1440,
            text_height: 12960,
            left_margin: 1800,
            text_width: 8640,
            reserved2: 256,
            header_top: 1080,
            footer_top: 14760,
            padding: [0; PAD_SIZE],
        }
    }
}

impl SectionProps {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_bytes(&self) -> [u8; SEP_SIZE] {
        let mut out = [0u8; SEP_SIZE];
        out[0] = SEP_BODY_SIZE as u8;
        let words = [
            self.reserved1,
            self.page_height,
            self.page_width,
            self.first_page_number,
            self.top_margin,
            self.text_height,
            self.left_margin,
            self.text_width,
            self.reserved2,
            self.header_top,
            self.footer_top,
        ];
        for (i, word) in words.into_iter().enumerate() {
            put_u16(&mut out, 1 + i * 2, word);
        }
        out[23..].copy_from_slice(&self.padding);
        out
    }

    /// Decode a stored record.
    ///
    /// The leading count byte says how many bytes follow; at most
    /// [`SEP_BODY_SIZE`] are taken and the rest keep default values.
    pub fn from_stored(page: &Page) -> Self {
        let mut bytes = Self::default().to_bytes();
        let cch = usize::from(page[0]).min(SEP_BODY_SIZE);
        bytes[1..1 + cch].copy_from_slice(&page[1..1 + cch]);

        let mut padding = [0u8; PAD_SIZE];
        padding.copy_from_slice(&bytes[23..]);

        Self {
            reserved1: get_u16(&bytes, 1),
            page_height: get_u16(&bytes, 3),
            page_width: get_u16(&bytes, 5),
            first_page_number: get_u16(&bytes, 7),
            top_margin: get_u16(&bytes, 9),
            text_height: get_u16(&bytes, 11),
            left_margin: get_u16(&bytes, 13),
            text_width: get_u16(&bytes, 15),
            reserved2: get_u16(&bytes, 17),
            header_top: get_u16(&bytes, 19),
            footer_top: get_u16(&bytes, 21),
            padding,
        }
    }

    /// Page holding this record, zero filled past its end
    pub fn encode_page(&self) -> Page {
        let mut page = [0u8; PAGE_SIZE];
        page[..SEP_SIZE].copy_from_slice(&self.to_bytes());
        page
    }
}

/// Section table with its single real section.
///
/// The first descriptor covers the whole text and points at the SEP page;
/// the second is the terminator with an `fcSep` of all ones.
pub fn encode_section_table(text_len: u32, pn_sep: PageNumber) -> Page {
    let mut page = [0u8; PAGE_SIZE];
    put_u16(&mut page, 0, 2);
    put_u16(&mut page, 2, 0);

    put_u32(&mut page, 4, text_len);
    put_i16(&mut page, 8, 0);
    put_u32(&mut page, 10, u32::from(pn_sep) * PAGE_SIZE as u32);

    put_u32(&mut page, 14, 0);
    put_i16(&mut page, 18, 0);
    put_u32(&mut page, 20, u32::MAX);
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::le::get_u32;

    #[test]
    fn test_default_layout() {
        let bytes = SectionProps::default().to_bytes();
        assert_eq!(bytes[0], 102);
        assert_eq!(get_u16(&bytes, 3), 15840);
        assert_eq!(get_u16(&bytes, 7), 0xFFFF);
        assert_eq!(get_u16(&bytes, 17), 256);
        assert_eq!(get_u16(&bytes, 21), 14760);
        assert!(bytes[23..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_stored_short_record() {
        let mut page = [0u8; PAGE_SIZE];
        page[0] = 4;
        put_u16(&mut page, 3, 20000);
        put_u16(&mut page, 9, 999);

        let sep = SectionProps::from_stored(&page);
        assert_eq!(sep.page_height, 20000);
        assert_eq!(sep.top_margin, 1440);
        assert_eq!(sep.left_margin, 1800);
    }

    #[test]
    fn test_from_stored_full_record() {
        let sep = SectionProps {
            left_margin: 1000,
            first_page_number: 3,
            ..SectionProps::default()
        };
        assert_eq!(SectionProps::from_stored(&sep.encode_page()), sep);
        assert!(!sep.is_default());
        assert!(SectionProps::default().is_default());
    }

    #[test]
    fn test_section_table() {
        let page = encode_section_table(300, 6);
        assert_eq!(get_u16(&page, 0), 2);
        assert_eq!(get_u32(&page, 4), 300);
        assert_eq!(get_u32(&page, 10), 768);
        assert_eq!(get_u32(&page, 20), u32::MAX);
    }
}

//! Paragraph properties (PAP), 79 bytes on disk.
//!
//! Only the first [`STORED_PAP_SIZE`] bytes vary per paragraph. Tab stops
//! are document-wide and are laid into the record when it is encoded.

use crate::error::{FormatError, FormatResult};
use crate::le::{get_i16, get_u16, put_i16, put_u16};
use serde::Serialize;

pub const PAP_SIZE: usize = 79;
/// Bytes up to and including the running-head flags
pub const STORED_PAP_SIZE: usize = 17;
pub const MAX_TABS: usize = 14;

const OFF_JC: usize = 1;
const OFF_DXA_RIGHT: usize = 4;
const OFF_DXA_LEFT: usize = 6;
const OFF_DXA_LEFT1: usize = 8;
const OFF_DYA_LINE: usize = 10;
const OFF_DYA_BEFORE: usize = 12;
const OFF_DYA_AFTER: usize = 14;
const OFF_RHC: usize = 16;
const OFF_TABS: usize = 22;
const TBD_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Justification {
    #[default]
    Left,
    Center,
    Right,
    Both,
}

impl Justification {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Justification::Left,
            1 => Justification::Center,
            2 => Justification::Right,
            _ => Justification::Both,
        }
    }

    fn bits(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TabAlignment {
    #[default]
    Normal,
    Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TabStop {
    /// Distance from the left margin in twips, never zero
    pub position: u16,
    pub alignment: TabAlignment,
}

impl TabStop {
    fn encode(&self, out: &mut [u8]) {
        put_u16(out, 0, self.position);
        out[2] = match self.alignment {
            TabAlignment::Normal => 0,
            TabAlignment::Decimal => 3,
        };
        out[3] = 0;
    }

    fn decode(raw: &[u8]) -> Self {
        Self {
            position: get_u16(raw, 0),
            alignment: if raw[2] & 0x07 == 3 {
                TabAlignment::Decimal
            } else {
                TabAlignment::Normal
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphProps {
    pub justification: Justification,
    /// Twips
    pub right_indent: u16,
    pub left_indent: u16,
    /// Relative to the left indent
    pub first_indent: i16,
    pub line_spacing: u16,
    pub space_before: u16,
    pub space_after: u16,
    /// `rhcPage`: set for a footer, clear for a header
    pub footer: bool,
    pub odd_pages: bool,
    pub even_pages: bool,
    pub first_page: bool,
    pub graphics: bool,
}

impl Default for ParagraphProps {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ParagraphProps {
    pub const DEFAULT: ParagraphProps = ParagraphProps {
        justification: Justification::Left,
        right_indent: 0,
        left_indent: 0,
        first_indent: 0,
        line_spacing: 240,
        space_before: 0,
        space_after: 0,
        footer: false,
        odd_pages: false,
        even_pages: false,
        first_page: false,
        graphics: false,
    };

    /// Header and footer paragraphs are marked by the odd-page flag
    pub fn is_running_head(&self) -> bool {
        self.odd_pages
    }

    /// Encode the full record with `tabs` laid in.
    ///
    /// Byte 0 is always written as zero. Tabs past [`MAX_TABS`] are ignored.
    pub fn to_bytes(&self, tabs: &[TabStop]) -> [u8; PAP_SIZE] {
        let mut out = [0u8; PAP_SIZE];
        out[OFF_JC] = self.justification.bits();
        put_u16(&mut out, OFF_DXA_RIGHT, self.right_indent);
        put_u16(&mut out, OFF_DXA_LEFT, self.left_indent);
        put_i16(&mut out, OFF_DXA_LEFT1, self.first_indent);
        put_u16(&mut out, OFF_DYA_LINE, self.line_spacing);
        put_u16(&mut out, OFF_DYA_BEFORE, self.space_before);
        put_u16(&mut out, OFF_DYA_AFTER, self.space_after);
        out[OFF_RHC] = u8::from(self.footer)
            | u8::from(self.odd_pages) << 1
            | u8::from(self.even_pages) << 2
            | u8::from(self.first_page) << 3
            | u8::from(self.graphics) << 4;

        for (i, tab) in tabs.iter().take(MAX_TABS).enumerate() {
            let at = OFF_TABS + i * TBD_SIZE;
            tab.encode(&mut out[at..at + TBD_SIZE]);
        }
        out
    }

    /// Decode a full record into its properties and tab stops.
    ///
    /// The tab list ends at the first descriptor with a zero position.
    pub fn from_bytes(bytes: &[u8; PAP_SIZE]) -> (Self, Vec<TabStop>) {
        let rhc = bytes[OFF_RHC];
        let props = Self {
            justification: Justification::from_bits(bytes[OFF_JC]),
            right_indent: get_u16(bytes, OFF_DXA_RIGHT),
            left_indent: get_u16(bytes, OFF_DXA_LEFT),
            first_indent: get_i16(bytes, OFF_DXA_LEFT1),
            line_spacing: get_u16(bytes, OFF_DYA_LINE),
            space_before: get_u16(bytes, OFF_DYA_BEFORE),
            space_after: get_u16(bytes, OFF_DYA_AFTER),
            footer: rhc & 0x01 != 0,
            odd_pages: rhc & 0x02 != 0,
            even_pages: rhc & 0x04 != 0,
            first_page: rhc & 0x08 != 0,
            graphics: rhc & 0x10 != 0,
        };

        let tabs = bytes[OFF_TABS..OFF_TABS + MAX_TABS * TBD_SIZE]
            .chunks_exact(TBD_SIZE)
            .map(TabStop::decode)
            .take_while(|tab| tab.position != 0)
            .collect();

        (props, tabs)
    }

    /// Decode a stored blob laid over the default record
    pub fn from_prefix(prefix: &[u8]) -> FormatResult<(Self, Vec<TabStop>)> {
        if prefix.len() > PAP_SIZE {
            return Err(FormatError::BlobTooLong {
                cch: prefix.len(),
                size: PAP_SIZE,
            });
        }
        let mut bytes = Self::DEFAULT.to_bytes(&[]);
        bytes[..prefix.len()].copy_from_slice(prefix);
        Ok(Self::from_bytes(&bytes))
    }
}

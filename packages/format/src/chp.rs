//! Character properties (CHP), 6 bytes on disk.

use crate::error::{FormatError, FormatResult};
use serde::Serialize;

pub const CHP_SIZE: usize = 6;

/// Vertical position values stored in `hpsPos`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptPosition {
    Normal,
    Superscript,
    Subscript,
}

impl ScriptPosition {
    pub fn hps_pos(self) -> u8 {
        match self {
            ScriptPosition::Normal => 0,
            ScriptPosition::Superscript => 12,
            ScriptPosition::Subscript => 244,
        }
    }

    /// Classify a raw `hpsPos`: 1..=127 is raised, 128..=255 lowered
    pub fn from_hps_pos(raw: u8) -> Self {
        match raw {
            0 => ScriptPosition::Normal,
            1..=127 => ScriptPosition::Superscript,
            _ => ScriptPosition::Subscript,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProps {
    pub bold: bool,
    pub italic: bool,
    /// Low six bits of the font code
    pub font: u8,
    /// Size in half points
    pub half_points: u8,
    pub underline: bool,
    pub strike: bool,
    pub double_underline: bool,
    pub revised: bool,
    pub case_modifier: u8,
    /// Set only for the page-number field in headers and footers
    pub special: bool,
    pub hidden: bool,
    /// High three bits of the font code
    pub font_high: u8,
    pub outline: bool,
    pub shadow: bool,
    pub hps_pos: u8,
}

impl Default for CharacterProps {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CharacterProps {
    pub const DEFAULT: CharacterProps = CharacterProps {
        bold: false,
        italic: false,
        font: 0,
        half_points: 24,
        underline: false,
        strike: false,
        double_underline: false,
        revised: false,
        case_modifier: 0,
        special: false,
        hidden: false,
        font_high: 0,
        outline: false,
        shadow: false,
        hps_pos: 0,
    };

    /// Full nine-bit font code
    pub fn font_code(&self) -> u16 {
        u16::from(self.font_high) << 6 | u16::from(self.font)
    }

    pub fn set_font_code(&mut self, code: u16) {
        self.font = (code & 0x3F) as u8;
        self.font_high = ((code >> 6) & 0x07) as u8;
    }

    pub fn script(&self) -> ScriptPosition {
        ScriptPosition::from_hps_pos(self.hps_pos)
    }

    pub fn to_bytes(&self) -> [u8; CHP_SIZE] {
        let mut out = [0u8; CHP_SIZE];
        out[1] = u8::from(self.bold) | u8::from(self.italic) << 1 | (self.font & 0x3F) << 2;
        out[2] = self.half_points;
        out[3] = u8::from(self.underline)
            | u8::from(self.strike) << 1
            | u8::from(self.double_underline) << 2
            | u8::from(self.revised) << 3
            | (self.case_modifier & 0x03) << 4
            | u8::from(self.special) << 6
            | u8::from(self.hidden) << 7;
        out[4] = (self.font_high & 0x07) | u8::from(self.outline) << 3 | u8::from(self.shadow) << 4;
        out[5] = self.hps_pos;
        out
    }

    /// Decode a full record. Reserved bits are dropped.
    pub fn from_bytes(bytes: &[u8; CHP_SIZE]) -> Self {
        Self {
            bold: bytes[1] & 0x01 != 0,
            italic: bytes[1] & 0x02 != 0,
            font: bytes[1] >> 2,
            half_points: bytes[2],
            underline: bytes[3] & 0x01 != 0,
            strike: bytes[3] & 0x02 != 0,
            double_underline: bytes[3] & 0x04 != 0,
            revised: bytes[3] & 0x08 != 0,
            case_modifier: (bytes[3] >> 4) & 0x03,
            special: bytes[3] & 0x40 != 0,
            hidden: bytes[3] & 0x80 != 0,
            font_high: bytes[4] & 0x07,
            outline: bytes[4] & 0x08 != 0,
            shadow: bytes[4] & 0x10 != 0,
            hps_pos: bytes[5],
        }
    }

    /// Decode a stored blob: the bytes given replace the start of the
    /// default record, the rest keeps default values.
    pub fn from_prefix(prefix: &[u8]) -> FormatResult<Self> {
        if prefix.len() > CHP_SIZE {
            return Err(FormatError::BlobTooLong {
                cch: prefix.len(),
                size: CHP_SIZE,
            });
        }
        let mut bytes = Self::DEFAULT.to_bytes();
        bytes[..prefix.len()].copy_from_slice(prefix);
        Ok(Self::from_bytes(&bytes))
    }
}

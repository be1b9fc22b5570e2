use crate::errors::{WriteError, WriteResult};
use writekit_format::{FontEntry, MAX_FONTS, MAX_FONT_NAME};

/// Family ids of fonts Write is known to ship with
const KNOWN_FAMILIES: &[(&str, u8)] = &[
    ("Arial", 32),
    ("Courier", 48),
    ("Dutch SWA", 16),
    ("Helv", 32),
    ("Modern", 48),
    ("Roman", 16),
    ("Roman 5cpi", 48),
    ("Roman 6cpi", 48),
    ("Roman 10cpi", 48),
    ("Roman 12cpi", 48),
    ("Roman 15cpi", 48),
    ("Roman 17cpi", 48),
    ("Roman 20cpi", 48),
    ("Roman PS", 16),
    ("Script", 64),
    ("Symbol", 80),
    ("Terminal", 48),
    ("Tms Rmn", 16),
];

pub fn known_family(name: &str) -> Option<u8> {
    KNOWN_FAMILIES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|&(_, family)| family)
}

/// Font face names used by the document; the index is the font code.
///
/// Code 0 is always Arial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontTable {
    fonts: Vec<FontEntry>,
}

impl Default for FontTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FontTable {
    pub fn new() -> Self {
        Self {
            fonts: vec![FontEntry::new("Arial", 32)],
        }
    }

    pub fn reset(&mut self) {
        self.fonts.truncate(1);
    }

    pub fn entries(&self) -> &[FontEntry] {
        &self.fonts
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Code for `name`, adding it if new.
    ///
    /// Names compare case-insensitively. A family of 0 means unknown; for a
    /// new font it is then looked up among the fonts Write ships with, and
    /// for a known font a later non-zero family fills it in.
    pub fn code_for_name(&mut self, name: &str, family: u8) -> WriteResult<u16> {
        if name.is_empty() || name.len() > MAX_FONT_NAME {
            return Err(WriteError::out_of_range("font name length", name.len() as i64));
        }

        if let Some(code) = self
            .fonts
            .iter()
            .position(|font| font.name.eq_ignore_ascii_case(name))
        {
            let font = &mut self.fonts[code];
            if font.family == 0 && family != 0 {
                font.family = family;
            }
            return Ok(code as u16);
        }

        if self.fonts.len() >= MAX_FONTS {
            return Err(WriteError::FontTableFull { max: MAX_FONTS });
        }

        let family = match family {
            0 => known_family(name).unwrap_or(0),
            family => family,
        };
        self.fonts.try_reserve(1)?;
        self.fonts.push(FontEntry::new(name, family));
        tracing::debug!(font = name, family, code = self.fonts.len() - 1, "font added");
        Ok((self.fonts.len() - 1) as u16)
    }
}

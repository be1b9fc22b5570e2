//! Page geometry.
//!
//! Write stores the left and top margins plus the size of the text area,
//! and the footer position measured from the top. Users think in four
//! margins and a footer distance from the bottom, so the right and bottom
//! margins and the footer distance are kept as given and converted when
//! the record is written.

use crate::errors::{WriteError, WriteResult};
use serde::Serialize;
use writekit_format::SectionProps;

const MAX_TWIPS: i32 = 32767;
/// 22 inches
const MAX_HEAD_DISTANCE: i32 = 31680;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(flatten)]
    sep: SectionProps,
    right_margin: u16,
    bottom_margin: u16,
    footer_distance: u16,
}

impl Default for Section {
    fn default() -> Self {
        Self::from_sep(SectionProps::default())
    }
}

fn checked(what: &'static str, value: i32, min: i32, max: i32) -> WriteResult<u16> {
    if (min..=max).contains(&value) {
        Ok(value as u16)
    } else {
        Err(WriteError::out_of_range(what, value))
    }
}

impl Section {
    /// Take a stored record and derive the user-facing values from it
    pub fn from_sep(sep: SectionProps) -> Self {
        let right_margin = sep
            .page_width
            .wrapping_sub(sep.left_margin)
            .wrapping_sub(sep.text_width);
        let bottom_margin = sep
            .page_height
            .wrapping_sub(sep.top_margin)
            .wrapping_sub(sep.text_height);
        let footer_distance = sep.page_height.wrapping_sub(sep.footer_top);
        Self {
            sep,
            right_margin,
            bottom_margin,
            footer_distance,
        }
    }

    /// Stored record, with the text area and footer position following
    /// the user-facing margins
    pub fn to_sep(&self) -> SectionProps {
        self.sep.clone()
    }

    fn sync(&mut self) {
        let sep = &mut self.sep;
        sep.text_width = sep
            .page_width
            .wrapping_sub(sep.left_margin)
            .wrapping_sub(self.right_margin);
        sep.text_height = sep
            .page_height
            .wrapping_sub(sep.top_margin)
            .wrapping_sub(self.bottom_margin);
        sep.footer_top = sep.page_height.wrapping_sub(self.footer_distance);
    }

    pub fn right_margin(&self) -> u16 {
        self.right_margin
    }

    pub fn bottom_margin(&self) -> u16 {
        self.bottom_margin
    }

    pub fn footer_distance(&self) -> u16 {
        self.footer_distance
    }

    pub fn set_first_page_number(&mut self, number: i32) -> WriteResult<()> {
        self.sep.first_page_number = checked("first page number", number, 1, 127)?;
        self.sync();
        Ok(())
    }

    pub fn set_margin_left(&mut self, margin: i32) -> WriteResult<()> {
        self.sep.left_margin = checked("left margin", margin, 0, MAX_TWIPS)?;
        self.sync();
        Ok(())
    }

    pub fn set_margin_top(&mut self, margin: i32) -> WriteResult<()> {
        self.sep.top_margin = checked("top margin", margin, 0, MAX_TWIPS)?;
        self.sync();
        Ok(())
    }

    pub fn set_margin_right(&mut self, margin: i32) -> WriteResult<()> {
        self.right_margin = checked("right margin", margin, 0, MAX_TWIPS)?;
        self.sync();
        Ok(())
    }

    pub fn set_margin_bottom(&mut self, margin: i32) -> WriteResult<()> {
        self.bottom_margin = checked("bottom margin", margin, 0, MAX_TWIPS)?;
        self.sync();
        Ok(())
    }

    pub fn set_page_width(&mut self, width: i32) -> WriteResult<()> {
        self.sep.page_width = checked("page width", width, 1, MAX_TWIPS)?;
        self.sync();
        Ok(())
    }

    pub fn set_page_height(&mut self, height: i32) -> WriteResult<()> {
        self.sep.page_height = checked("page height", height, 1, MAX_TWIPS)?;
        self.sync();
        Ok(())
    }

    pub fn set_distance_from_top(&mut self, distance: i32) -> WriteResult<()> {
        self.sep.header_top = checked("header distance", distance, 0, MAX_HEAD_DISTANCE)?;
        self.sync();
        Ok(())
    }

    pub fn set_distance_from_bottom(&mut self, distance: i32) -> WriteResult<()> {
        self.footer_distance = checked("footer distance", distance, 0, MAX_HEAD_DISTANCE)?;
        self.sync();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_values() {
        let section = Section::default();
        assert_eq!(section.right_margin(), 1800);
        assert_eq!(section.bottom_margin(), 1440);
        assert_eq!(section.footer_distance(), 1080);
        assert!(section.to_sep().is_default());
    }

    #[test]
    fn test_margins_follow_page_size() {
        let mut section = Section::default();
        section.set_page_width(11906).unwrap();
        section.set_margin_right(1000).unwrap();
        section.set_distance_from_bottom(500).unwrap();

        let sep = section.to_sep();
        assert_eq!(sep.text_width, 11906 - 1800 - 1000);
        assert_eq!(sep.footer_top, 15840 - 500);
        assert_eq!(Section::from_sep(sep.clone()).to_sep(), sep);
    }

    #[test]
    fn test_ranges() {
        let mut section = Section::default();
        assert!(section.set_first_page_number(0).is_err());
        assert!(section.set_first_page_number(128).is_err());
        assert!(section.set_page_width(0).is_err());
        assert!(section.set_margin_left(-1).is_err());
        assert!(section.set_distance_from_top(31681).is_err());
        section.set_first_page_number(5).unwrap();
        assert_eq!(section.to_sep().first_page_number, 5);
    }
}

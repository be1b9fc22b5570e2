//! Character runs.
//!
//! Every run owns its own record. Setters follow one pattern: validate,
//! do nothing if the tail already has the value, otherwise start a new run
//! (reusing an empty tail) and change it.

use crate::errors::{WriteError, WriteResult};
use crate::run_list::{Cp, Rolledback, RunList};
use writekit_format::{CharacterProps, ScriptPosition};

/// Sizes Write steps through on reduce/enlarge, in half points
pub const HPS_STEPS: [u8; 10] = [12, 16, 20, 24, 28, 36, 48, 60, 72, 96];

pub const MIN_FONT_SIZE: i32 = 4;
pub const MAX_FONT_SIZE: i32 = 127;

#[derive(Debug, Clone)]
pub struct CharacterRuns {
    runs: RunList<CharacterProps>,
    saved: CharacterProps,
}

impl Default for CharacterRuns {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterRuns {
    pub fn new() -> Self {
        Self {
            runs: RunList::new(CharacterProps::DEFAULT),
            saved: CharacterProps::DEFAULT,
        }
    }

    pub fn reset(&mut self) {
        self.runs.reset(CharacterProps::DEFAULT);
        self.saved = CharacterProps::DEFAULT;
    }

    pub fn runs(&self) -> &RunList<CharacterProps> {
        &self.runs
    }

    pub fn current(&self) -> &CharacterProps {
        &self.runs.tail().prop
    }

    fn update(&mut self, change: impl FnOnce(&mut CharacterProps)) -> WriteResult<()> {
        self.runs.start_new_run()?;
        change(self.runs.tail_prop_mut());
        Ok(())
    }

    pub fn extend(&mut self, lim: Cp) {
        self.runs.extend(lim);
    }

    pub fn set_bold(&mut self, on: bool) -> WriteResult<()> {
        if self.current().bold == on {
            return Ok(());
        }
        self.update(|chp| chp.bold = on)
    }

    pub fn set_italic(&mut self, on: bool) -> WriteResult<()> {
        if self.current().italic == on {
            return Ok(());
        }
        self.update(|chp| chp.italic = on)
    }

    pub fn set_underline(&mut self, on: bool) -> WriteResult<()> {
        if self.current().underline == on {
            return Ok(());
        }
        self.update(|chp| chp.underline = on)
    }

    /// Change the vertical position.
    ///
    /// Entering a raised or lowered position reduces the point size one
    /// step and leaving it enlarges one step, the way Write does. At 6pt
    /// the reduce does nothing, so a round trip ends one step larger.
    pub fn set_script(&mut self, script: ScriptPosition) -> WriteResult<()> {
        let hps_pos = script.hps_pos();
        let current = self.current().hps_pos;
        if current == hps_pos {
            return Ok(());
        }

        if current == 0 {
            self.reduce()?;
        } else if hps_pos == 0 {
            self.enlarge()?;
        }
        self.update(|chp| chp.hps_pos = hps_pos)
    }

    pub fn set_font_code(&mut self, code: u16) -> WriteResult<()> {
        if self.current().font_code() == code {
            return Ok(());
        }
        self.update(|chp| chp.set_font_code(code))
    }

    /// Set the size in whole points
    pub fn set_font_size(&mut self, points: i32) -> WriteResult<()> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&points) {
            return Err(WriteError::out_of_range("font size", points));
        }
        let half_points = (points * 2) as u8;
        if self.current().half_points == half_points {
            return Ok(());
        }
        self.update(|chp| chp.half_points = half_points)
    }

    /// Step down to the largest tabulated size below the current one
    pub fn reduce(&mut self) -> WriteResult<()> {
        let hps = self.current().half_points;
        if hps <= HPS_STEPS[0] {
            return Ok(());
        }
        let next = HPS_STEPS
            .iter()
            .rev()
            .copied()
            .find(|&step| step < hps)
            .unwrap_or(HPS_STEPS[0]);
        self.update(|chp| chp.half_points = next)
    }

    /// Step up to the smallest tabulated size above the current one
    pub fn enlarge(&mut self) -> WriteResult<()> {
        let last = HPS_STEPS[HPS_STEPS.len() - 1];
        let hps = self.current().half_points;
        if hps >= last {
            return Ok(());
        }
        let next = HPS_STEPS.iter().copied().find(|&step| step > hps).unwrap_or(last);
        self.update(|chp| chp.half_points = next)
    }

    pub fn normal(&mut self) -> WriteResult<()> {
        self.set_bold(false)?;
        self.set_italic(false)?;
        self.set_underline(false)?;
        self.set_script(ScriptPosition::Normal)
    }

    /// Mark the following text as the page-number field.
    ///
    /// Always starts a run so the field gets one of its own.
    pub fn set_special(&mut self, on: bool) -> WriteResult<()> {
        self.update(|chp| chp.special = on)
    }

    pub fn set_default(&mut self) -> WriteResult<()> {
        if *self.current() == CharacterProps::DEFAULT {
            return Ok(());
        }
        self.update(|chp| *chp = CharacterProps::DEFAULT)
    }

    pub fn preserve(&mut self) {
        self.saved = *self.current();
    }

    pub fn restore(&mut self) -> WriteResult<()> {
        let saved = self.saved;
        if *self.current() == saved {
            return Ok(());
        }
        self.update(|chp| *chp = saved)
    }

    /// Append a decoded record covering text up to `lim`
    pub fn append(&mut self, props: CharacterProps, lim: Cp) -> WriteResult<()> {
        if *self.current() != props {
            self.update(|chp| *chp = props)?;
        }
        self.extend(lim);
        Ok(())
    }

    pub fn breakpoint(&mut self) -> WriteResult<()> {
        self.runs.breakpoint()
    }

    pub fn commit(&mut self) {
        self.runs.commit();
    }

    pub fn rollback(&mut self) -> WriteResult<()> {
        let Rolledback { discarded, .. } = self.runs.rollback()?;
        tracing::debug!(discarded = discarded.len(), "character runs rolled back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_size(hps: u8) -> CharacterRuns {
        let mut chars = CharacterRuns::new();
        chars.runs.tail_prop_mut().half_points = hps;
        chars
    }

    #[test]
    fn test_setting_same_value_keeps_runs() {
        let mut chars = CharacterRuns::new();
        chars.extend(5);
        chars.set_bold(false).unwrap();
        chars.set_font_size(12).unwrap();
        chars.normal().unwrap();
        assert_eq!(chars.runs().len(), 1);
    }

    #[test]
    fn test_back_to_back_changes_share_one_run() {
        let mut chars = CharacterRuns::new();
        chars.extend(5);
        chars.set_bold(true).unwrap();
        chars.set_italic(true).unwrap();
        chars.set_underline(true).unwrap();
        assert_eq!(chars.runs().len(), 2);
        let tail = chars.current();
        assert!(tail.bold && tail.italic && tail.underline);
    }

    #[test]
    fn test_reduce_table() {
        let mut chars = with_size(12);
        chars.reduce().unwrap();
        assert_eq!(chars.current().half_points, 12);

        let mut chars = with_size(16);
        chars.reduce().unwrap();
        assert_eq!(chars.current().half_points, 12);

        let mut chars = with_size(30);
        chars.reduce().unwrap();
        assert_eq!(chars.current().half_points, 28);
    }

    #[test]
    fn test_enlarge_table() {
        let mut chars = with_size(12);
        chars.enlarge().unwrap();
        assert_eq!(chars.current().half_points, 16);

        let mut chars = with_size(96);
        chars.enlarge().unwrap();
        assert_eq!(chars.current().half_points, 96);

        let mut chars = with_size(97);
        chars.enlarge().unwrap();
        assert_eq!(chars.current().half_points, 97);

        let mut chars = with_size(50);
        chars.enlarge().unwrap();
        assert_eq!(chars.current().half_points, 60);
    }

    #[test]
    fn test_script_couples_with_size() {
        let mut chars = CharacterRuns::new();
        chars.set_script(ScriptPosition::Superscript).unwrap();
        assert_eq!(chars.current().half_points, 20);
        assert_eq!(chars.current().hps_pos, 12);

        chars.set_script(ScriptPosition::Subscript).unwrap();
        assert_eq!(chars.current().half_points, 20);

        chars.set_script(ScriptPosition::Normal).unwrap();
        assert_eq!(chars.current().half_points, 24);
        assert_eq!(chars.runs().len(), 1);
    }

    #[test]
    fn test_script_round_trip_at_minimum_grows() {
        let mut chars = with_size(12);
        chars.set_script(ScriptPosition::Subscript).unwrap();
        chars.set_script(ScriptPosition::Normal).unwrap();
        assert_eq!(chars.current().half_points, 16);
    }

    #[test]
    fn test_font_size_range() {
        let mut chars = CharacterRuns::new();
        assert!(matches!(
            chars.set_font_size(3),
            Err(WriteError::OutOfRange { .. })
        ));
        assert!(chars.set_font_size(128).is_err());
        chars.set_font_size(127).unwrap();
        assert_eq!(chars.current().half_points, 254);
    }

    #[test]
    fn test_append_merges_equal_records() {
        let mut chars = CharacterRuns::new();
        chars.append(CharacterProps::DEFAULT, 4).unwrap();
        let bold = CharacterProps {
            bold: true,
            ..CharacterProps::DEFAULT
        };
        chars.append(bold, 8).unwrap();
        chars.append(bold, 10).unwrap();

        let lims: Vec<_> = chars.runs().iter().map(|r| (r.first, r.lim)).collect();
        assert_eq!(lims, vec![(0, 4), (4, 10)]);
    }

    #[test]
    fn test_rollback_restores_tail_record() {
        let mut chars = CharacterRuns::new();
        chars.extend(3);
        chars.breakpoint().unwrap();

        let bold = CharacterProps {
            bold: true,
            ..CharacterProps::DEFAULT
        };
        chars.append(bold, 7).unwrap();
        chars.rollback().unwrap();

        assert_eq!(chars.runs().len(), 1);
        assert_eq!(chars.runs().end(), 3);
        assert_eq!(*chars.current(), CharacterProps::DEFAULT);
    }
}

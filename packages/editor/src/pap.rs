//! Paragraph runs with shared, reference-counted records.
//!
//! Records live in an arena; runs hold indices into it. Consecutive
//! paragraphs share a record until one of them changes, at which point the
//! tail gets its own copy. Counts are eight bits wide: a record that
//! already has 255 holders is not shared further, the new paragraph gets a
//! fresh copy instead.
//!
//! Slot 0 holds the record of the first paragraph and is never released.

use crate::errors::{WriteError, WriteResult};
use crate::run_list::{Cp, Rolledback, Run, RunList};
use writekit_format::{Justification, ParagraphProps};

pub const MAX_INDENT: i32 = 32767;
pub const SINGLE_SPACING: u16 = 240;

/// Index of a paragraph record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(usize);

impl RecordId {
    const FIRST: RecordId = RecordId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Which running head a paragraph belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningHead {
    Header,
    Footer,
}

impl RunningHead {
    fn is_footer(self) -> bool {
        self == RunningHead::Footer
    }
}

#[derive(Debug, Clone)]
struct Slot {
    props: ParagraphProps,
    refs: u8,
}

#[derive(Debug, Clone)]
pub struct ParagraphRuns {
    records: Vec<Slot>,
    free: Vec<usize>,
    runs: RunList<RecordId>,
    saved: ParagraphProps,
    snapshot: Option<ParagraphProps>,
    first_page: [bool; 2],
}

impl Default for ParagraphRuns {
    fn default() -> Self {
        Self::new()
    }
}

impl ParagraphRuns {
    pub fn new() -> Self {
        Self {
            records: vec![Slot {
                props: ParagraphProps::DEFAULT,
                refs: 1,
            }],
            free: Vec::new(),
            runs: RunList::new(RecordId::FIRST),
            saved: ParagraphProps::DEFAULT,
            snapshot: None,
            first_page: [false; 2],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn runs(&self) -> &RunList<RecordId> {
        &self.runs
    }

    pub fn record(&self, id: RecordId) -> &ParagraphProps {
        &self.records[id.0].props
    }

    pub fn ref_count(&self, id: RecordId) -> u8 {
        self.records[id.0].refs
    }

    /// Number of records currently allocated
    pub fn live_records(&self) -> usize {
        self.records.len() - self.free.len()
    }

    /// Runs paired with the record each points to
    pub fn resolved(&self) -> impl Iterator<Item = (&Run<RecordId>, &ParagraphProps)> {
        self.runs.iter().map(|run| (run, self.record(run.prop)))
    }

    pub fn current(&self) -> &ParagraphProps {
        self.record(self.runs.tail().prop)
    }

    pub fn extend(&mut self, lim: Cp) {
        self.runs.extend(lim);
    }

    fn alloc(&mut self, props: ParagraphProps) -> WriteResult<RecordId> {
        let slot = Slot { props, refs: 1 };
        if let Some(index) = self.free.pop() {
            self.records[index] = slot;
            return Ok(RecordId(index));
        }
        self.records.try_reserve(1)?;
        self.records.push(slot);
        Ok(RecordId(self.records.len() - 1))
    }

    fn release(&mut self, id: RecordId) {
        let slot = &mut self.records[id.0];
        slot.refs = slot.refs.saturating_sub(1);
        if slot.refs == 0 && id != RecordId::FIRST {
            self.free.push(id.0);
        }
    }

    /// Record of the current paragraph, made private to it first
    fn this_para(&mut self) -> WriteResult<&mut ParagraphProps> {
        let id = self.runs.tail().prop;
        if self.records[id.0].refs != 1 {
            let fresh = self.alloc(self.records[id.0].props)?;
            self.records[id.0].refs -= 1;
            *self.runs.tail_prop_mut() = fresh;
            return Ok(&mut self.records[fresh.0].props);
        }
        Ok(&mut self.records[id.0].props)
    }

    fn update(&mut self, change: impl FnOnce(&mut ParagraphProps)) -> WriteResult<()> {
        change(self.this_para()?);
        Ok(())
    }

    /// Start a paragraph that shares the current record
    pub fn new_paragraph(&mut self) -> WriteResult<()> {
        let id = self.runs.tail().prop;
        let fresh = if self.records[id.0].refs == u8::MAX {
            Some(self.alloc(self.records[id.0].props)?)
        } else {
            None
        };

        if let Err(err) = self.runs.push_run() {
            if let Some(fresh) = fresh {
                self.release(fresh);
            }
            return Err(err);
        }

        match fresh {
            Some(fresh) => *self.runs.tail_prop_mut() = fresh,
            None => self.records[id.0].refs += 1,
        }
        Ok(())
    }

    pub fn set_justification(&mut self, justification: Justification) -> WriteResult<()> {
        if self.current().justification == justification {
            return Ok(());
        }
        self.update(|pap| pap.justification = justification)
    }

    pub fn set_line_spacing(&mut self, spacing: i32) -> WriteResult<()> {
        let spacing = Self::twips("line spacing", spacing)?;
        if self.current().line_spacing == spacing {
            return Ok(());
        }
        self.update(|pap| pap.line_spacing = spacing)
    }

    pub fn set_left_indent(&mut self, indent: i32) -> WriteResult<()> {
        let indent = Self::twips("left indent", indent)?;
        if self.current().left_indent == indent {
            return Ok(());
        }
        self.update(|pap| pap.left_indent = indent)
    }

    pub fn set_right_indent(&mut self, indent: i32) -> WriteResult<()> {
        let indent = Self::twips("right indent", indent)?;
        if self.current().right_indent == indent {
            return Ok(());
        }
        self.update(|pap| pap.right_indent = indent)
    }

    /// First line indent, relative to the left indent
    pub fn set_first_indent(&mut self, indent: i32) -> WriteResult<()> {
        let indent =
            i16::try_from(indent).map_err(|_| WriteError::out_of_range("first line indent", indent))?;
        if self.current().first_indent == indent {
            return Ok(());
        }
        self.update(|pap| pap.first_indent = indent)
    }

    fn twips(what: &'static str, value: i32) -> WriteResult<u16> {
        if (0..=MAX_INDENT).contains(&value) {
            Ok(value as u16)
        } else {
            Err(WriteError::out_of_range(what, value))
        }
    }

    pub fn normal(&mut self) -> WriteResult<()> {
        self.set_justification(Justification::Left)?;
        self.set_line_spacing(i32::from(SINGLE_SPACING))?;
        self.set_left_indent(0)?;
        self.set_right_indent(0)?;
        self.set_first_indent(0)
    }

    pub fn set_default(&mut self) -> WriteResult<()> {
        if *self.current() == ParagraphProps::DEFAULT {
            return Ok(());
        }
        self.update(|pap| *pap = ParagraphProps::DEFAULT)
    }

    pub fn preserve(&mut self) {
        self.saved = *self.current();
    }

    pub fn restore(&mut self) -> WriteResult<()> {
        let saved = self.saved;
        if *self.current() == saved {
            return Ok(());
        }
        self.update(|pap| *pap = saved)
    }

    pub fn running_head(&self) -> Option<RunningHead> {
        let pap = self.current();
        match (pap.is_running_head(), pap.footer) {
            (false, _) => None,
            (true, false) => Some(RunningHead::Header),
            (true, true) => Some(RunningHead::Footer),
        }
    }

    /// Mark the current paragraph as a header or footer
    pub fn mark_running_head(&mut self, kind: RunningHead) -> WriteResult<()> {
        self.update(|pap| {
            pap.odd_pages = true;
            pap.even_pages = true;
            pap.footer = kind.is_footer();
        })
    }

    /// Choose whether the current header or footer prints on page one
    pub fn set_print_on_first_page(&mut self, print: bool) -> WriteResult<()> {
        let kind = self.running_head().ok_or(WriteError::NotInHeaderFooter)?;
        self.first_page[usize::from(kind.is_footer())] = print;
        Ok(())
    }

    pub fn print_on_first_page(&self, kind: RunningHead) -> bool {
        self.first_page[usize::from(kind.is_footer())]
    }

    /// Append a decoded paragraph ending at `lim`.
    ///
    /// The first paragraph of an import continues the current one and
    /// replaces its properties.
    pub fn append(&mut self, props: ParagraphProps, lim: Cp, is_first: bool) -> WriteResult<()> {
        if !is_first {
            self.new_paragraph()?;
        }
        if *self.current() != props {
            self.update(|pap| *pap = props)?;
        }
        self.extend(lim);
        Ok(())
    }

    pub fn breakpoint(&mut self) -> WriteResult<()> {
        self.runs.breakpoint()?;
        self.snapshot = Some(*self.current());
        Ok(())
    }

    pub fn commit(&mut self) {
        self.runs.commit();
        self.snapshot = None;
    }

    /// Return to the breakpoint, releasing every record taken since
    pub fn rollback(&mut self) -> WriteResult<()> {
        let Rolledback {
            discarded,
            displaced,
        } = self.runs.rollback()?;

        let kept = self.runs.tail().prop;
        if displaced != kept {
            // The tail was given a private copy after the breakpoint
            self.records[kept.0].refs = self.records[kept.0].refs.saturating_add(1);
            self.release(displaced);
        }
        for run in &discarded {
            self.release(run.prop);
        }
        if let Some(props) = self.snapshot.take() {
            self.records[kept.0].props = props;
        }

        tracing::debug!(
            discarded = discarded.len(),
            live_records = self.live_records(),
            "paragraph runs rolled back"
        );
        Ok(())
    }

    /// Every live record's count equals the number of runs pointing at it
    pub fn check_ref_counts(&self) -> bool {
        let mut holders = vec![0usize; self.records.len()];
        for run in self.runs.iter() {
            holders[run.prop.0] += 1;
        }

        let mut ok = true;
        for (index, slot) in self.records.iter().enumerate() {
            let expected = if self.free.contains(&index) { 0 } else { holders[index] };
            if holders[index] != expected || usize::from(slot.refs) != expected {
                tracing::warn!(
                    record = index,
                    refs = slot.refs,
                    holders = holders[index],
                    "reference count mismatch"
                );
                ok = false;
            }
        }
        ok
    }
}

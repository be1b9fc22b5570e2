//! # Document Builder
//!
//! A `Document` is one Write file under construction. Content is appended
//! in order: text goes to the end, and formatting calls affect the text
//! that follows them.
//!
//! ## Lifecycle
//!
//! ```text
//! new/reset → header/footer → body text + formatting → save
//!                                  ↑
//!                        read (merge another file)
//! ```
//!
//! Running heads (headers and footers) must be defined before any body
//! text; Write only recognises them at the start of the file.

use crate::chp::CharacterRuns;
use crate::errors::{WriteError, WriteResult};
use crate::fonts::FontTable;
use crate::pap::{ParagraphRuns, RunningHead};
use crate::run_list::Run;
use crate::section::Section;
use crate::tabs::TabStops;
use crate::text::TextBuffer;
use writekit_format::{to_latin1, CharacterProps, FontEntry, Justification, ScriptPosition, TabStop};

const PAGE_NUMBER: u8 = 0x01;
const FORM_FEED: u8 = 0x0C;
/// Size used inside headers and footers, in points
const RUNNING_HEAD_SIZE: i32 = 10;

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) text: TextBuffer,
    pub(crate) chars: CharacterRuns,
    pub(crate) paras: ParagraphRuns,
    pub(crate) tabs: TabStops,
    pub(crate) fonts: FontTable,
    pub(crate) section: Section,
    in_running_head: bool,
    pub(crate) had_normal_text: bool,
    fatal: bool,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all content and settings, including an earlier fatal error
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Run an operation unless the document is already unusable, and
    /// make it unusable if the operation exhausted a resource.
    pub(crate) fn guard<T>(&mut self, op: impl FnOnce(&mut Self) -> WriteResult<T>) -> WriteResult<T> {
        if self.fatal {
            return Err(WriteError::Fatal);
        }
        let result = op(self);
        if let Err(err) = &result {
            if err.is_fatal() {
                tracing::error!(error = %err, "document marked unusable");
                self.fatal = true;
            }
        }
        result
    }

    // ---- text ----

    /// Append text.
    ///
    /// Characters outside Latin-1 become `?`. `\n` ends a paragraph and is
    /// stored as `\r\n`; `\f` is a page break and also ends the paragraph;
    /// `\t` is kept, `\r` and other control characters are dropped.
    pub fn text(&mut self, text: &str) -> WriteResult<()> {
        self.text_latin1(&to_latin1(text))
    }

    /// Append text that is already Latin-1
    pub fn text_latin1(&mut self, bytes: &[u8]) -> WriteResult<()> {
        self.guard(|doc| doc.put_text(bytes))
    }

    /// Insert the page number field; only meaningful in a header or footer
    pub fn doc_insert_page_number(&mut self) -> WriteResult<()> {
        self.text_latin1(&[PAGE_NUMBER])
    }

    fn put_text(&mut self, bytes: &[u8]) -> WriteResult<()> {
        if !self.in_running_head {
            return self.put_plain(bytes);
        }
        if self.had_normal_text {
            return Err(WriteError::HeaderAfterText);
        }

        // The page number needs a run of its own with the special flag set
        let mut pieces = bytes.split(|&b| b == PAGE_NUMBER);
        if let Some(first) = pieces.next() {
            self.put_plain(first)?;
        }
        for piece in pieces {
            self.chars.set_special(true)?;
            self.put_plain(&[PAGE_NUMBER])?;
            self.chars.set_special(false)?;
            self.put_plain(piece)?;
        }
        Ok(())
    }

    fn put_plain(&mut self, bytes: &[u8]) -> WriteResult<()> {
        for &byte in bytes {
            match byte {
                b'\r' => continue,
                b'\n' => self.text.push(b'\r')?,
                b'\t' | FORM_FEED => {}
                PAGE_NUMBER if self.in_running_head => {}
                0..=31 => continue,
                _ => {}
            }
            self.text.push(byte)?;

            if byte == b'\n' || byte == FORM_FEED {
                self.paras.extend(self.text.len());
                self.paras.new_paragraph()?;
            }
        }

        self.chars.extend(self.text.len());
        self.paras.extend(self.text.len());
        if !self.in_running_head {
            self.had_normal_text = true;
        }
        Ok(())
    }

    // ---- character formatting ----

    /// Plain text: no bold, italic, underline or raised/lowered position
    pub fn char_normal(&mut self) -> WriteResult<()> {
        self.guard(|doc| doc.chars.normal())
    }

    pub fn char_bold(&mut self, on: bool) -> WriteResult<()> {
        self.guard(|doc| doc.chars.set_bold(on))
    }

    pub fn char_italic(&mut self, on: bool) -> WriteResult<()> {
        self.guard(|doc| doc.chars.set_italic(on))
    }

    pub fn char_underline(&mut self, on: bool) -> WriteResult<()> {
        self.guard(|doc| doc.chars.set_underline(on))
    }

    pub fn char_script(&mut self, script: ScriptPosition) -> WriteResult<()> {
        self.guard(|doc| doc.chars.set_script(script))
    }

    pub fn char_font_name(&mut self, name: &str) -> WriteResult<()> {
        self.guard(|doc| {
            let code = doc.fonts.code_for_name(name, 0)?;
            doc.chars.set_font_code(code)
        })
    }

    /// Size in points, 4 to 127
    pub fn char_font_size(&mut self, points: i32) -> WriteResult<()> {
        self.guard(|doc| doc.chars.set_font_size(points))
    }

    pub fn char_reduce(&mut self) -> WriteResult<()> {
        self.guard(|doc| doc.chars.reduce())
    }

    pub fn char_enlarge(&mut self) -> WriteResult<()> {
        self.guard(|doc| doc.chars.enlarge())
    }

    // ---- paragraph formatting ----

    pub fn para_normal(&mut self) -> WriteResult<()> {
        self.guard(|doc| doc.paras.normal())
    }

    pub fn para_justify(&mut self, justification: Justification) -> WriteResult<()> {
        self.guard(|doc| doc.paras.set_justification(justification))
    }

    /// Line spacing in twips; 240 is single spacing
    pub fn para_interline(&mut self, spacing: i32) -> WriteResult<()> {
        self.guard(|doc| doc.paras.set_line_spacing(spacing))
    }

    pub fn para_indent_left(&mut self, indent: i32) -> WriteResult<()> {
        self.guard(|doc| doc.paras.set_left_indent(indent))
    }

    pub fn para_indent_right(&mut self, indent: i32) -> WriteResult<()> {
        self.guard(|doc| doc.paras.set_right_indent(indent))
    }

    pub fn para_indent_first(&mut self, indent: i32) -> WriteResult<()> {
        self.guard(|doc| doc.paras.set_first_indent(indent))
    }

    // ---- headers and footers ----

    pub fn doc_header(&mut self) -> WriteResult<()> {
        self.guard(|doc| doc.start_running_head(RunningHead::Header))
    }

    pub fn doc_footer(&mut self) -> WriteResult<()> {
        self.guard(|doc| doc.start_running_head(RunningHead::Footer))
    }

    fn start_running_head(&mut self, kind: RunningHead) -> WriteResult<()> {
        if self.had_normal_text {
            return Err(WriteError::HeaderAfterText);
        }

        match self.paras.running_head() {
            Some(current) if current == kind => return Ok(()),
            Some(_) => self.end_running_head()?,
            None => {}
        }

        if !self.paras.runs().tail().is_empty() {
            self.paras.new_paragraph()?;
        }

        self.chars.preserve();
        self.paras.preserve();

        self.chars.set_default()?;
        self.chars.set_font_size(RUNNING_HEAD_SIZE)?;
        self.paras.set_default()?;
        self.paras.mark_running_head(kind)?;

        self.in_running_head = true;
        tracing::debug!(?kind, "running head started");
        Ok(())
    }

    /// Close the current header or footer and go back to body formatting.
    ///
    /// Does nothing outside a header or footer.
    pub fn doc_return(&mut self) -> WriteResult<()> {
        self.guard(|doc| doc.end_running_head())
    }

    pub(crate) fn end_running_head(&mut self) -> WriteResult<()> {
        if self.paras.running_head().is_none() {
            return Ok(());
        }

        // A running head always ends with an unprinted paragraph mark
        self.put_text(b"\n")?;

        self.chars.restore()?;
        self.paras.restore()?;
        self.in_running_head = false;
        Ok(())
    }

    /// Whether the current header or footer also prints on page one
    pub fn doc_print_on_first_page(&mut self, print: bool) -> WriteResult<()> {
        self.paras.set_print_on_first_page(print)
    }

    // ---- tabs ----

    pub fn doc_tab_set(&mut self, position: i32, decimal: bool) -> WriteResult<()> {
        self.tabs.set(position, decimal)
    }

    pub fn doc_tab_clear(&mut self, position: i32) -> WriteResult<()> {
        self.tabs.clear(position)
    }

    pub fn doc_tab_cancel(&mut self) {
        self.tabs.cancel();
    }

    // ---- page setup ----

    pub fn doc_number_from(&mut self, first: i32) -> WriteResult<()> {
        self.section.set_first_page_number(first)
    }

    pub fn doc_margin_left(&mut self, margin: i32) -> WriteResult<()> {
        self.section.set_margin_left(margin)
    }

    pub fn doc_margin_top(&mut self, margin: i32) -> WriteResult<()> {
        self.section.set_margin_top(margin)
    }

    pub fn doc_margin_right(&mut self, margin: i32) -> WriteResult<()> {
        self.section.set_margin_right(margin)
    }

    pub fn doc_margin_bottom(&mut self, margin: i32) -> WriteResult<()> {
        self.section.set_margin_bottom(margin)
    }

    pub fn doc_page_width(&mut self, width: i32) -> WriteResult<()> {
        self.section.set_page_width(width)
    }

    pub fn doc_page_height(&mut self, height: i32) -> WriteResult<()> {
        self.section.set_page_height(height)
    }

    /// Header position, measured from the top of the page
    pub fn doc_distance_from_top(&mut self, distance: i32) -> WriteResult<()> {
        self.section.set_distance_from_top(distance)
    }

    /// Footer position, measured from the bottom of the page
    pub fn doc_distance_from_bottom(&mut self, distance: i32) -> WriteResult<()> {
        self.section.set_distance_from_bottom(distance)
    }

    // ---- introspection ----

    /// Stored text, with `\n` already expanded to `\r\n`
    pub fn contents(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn character_runs(&self) -> impl Iterator<Item = &Run<CharacterProps>> {
        self.chars.runs().iter()
    }

    pub fn paragraphs(&self) -> &ParagraphRuns {
        &self.paras
    }

    pub fn tab_stops(&self) -> &[TabStop] {
        self.tabs.as_slice()
    }

    pub fn fonts(&self) -> &[FontEntry] {
        self.fonts.entries()
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn in_header_footer(&self) -> bool {
        self.in_running_head
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    /// Both run lists cover exactly the text, and paragraph reference
    /// counts match their holders
    pub fn check_consistency(&self) -> bool {
        let len = self.text.len();
        self.chars.runs().is_gapless()
            && self.paras.runs().is_gapless()
            && self.chars.runs().end() == len
            && self.paras.runs().end() == len
            && self.paras.check_ref_counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs_of(doc: &Document) -> Vec<(u32, u32)> {
        doc.character_runs().map(|r| (r.first, r.lim)).collect()
    }

    #[test]
    fn test_text_filtering() {
        let mut doc = Document::new();
        doc.text("a\r\nb\tc\x07d\x01\x0c").unwrap();
        assert_eq!(doc.contents(), b"a\r\nb\tcd\x0c");
        assert_eq!(doc.paragraphs().runs().len(), 3);
        assert!(doc.check_consistency());
    }

    #[test]
    fn test_text_is_latin1() {
        let mut doc = Document::new();
        doc.text("caf\u{e9} \u{263a}").unwrap();
        assert_eq!(doc.contents(), &[b'c', b'a', b'f', 0xE9, b' ', b'?']);
    }

    #[test]
    fn test_formatting_splits_runs() {
        let mut doc = Document::new();
        doc.text("plain ").unwrap();
        doc.char_bold(true).unwrap();
        doc.text("bold").unwrap();
        doc.char_bold(false).unwrap();
        doc.text(".").unwrap();
        assert_eq!(runs_of(&doc), vec![(0, 6), (6, 10), (10, 11)]);
    }

    #[test]
    fn test_header_page_number_gets_own_run() {
        let mut doc = Document::new();
        doc.doc_header().unwrap();
        doc.text("Page ").unwrap();
        doc.doc_insert_page_number().unwrap();
        doc.doc_return().unwrap();

        assert_eq!(doc.contents(), b"Page \x01\r\n");
        let runs: Vec<_> = doc.character_runs().cloned().collect();
        assert_eq!(runs[0].prop.half_points, 20);
        assert!(runs[1].prop.special);
        assert_eq!((runs[1].first, runs[1].lim), (5, 6));
        assert!(!runs[2].prop.special);
        assert!(!doc.in_header_footer());
        assert!(doc.check_consistency());
    }

    #[test]
    fn test_page_number_dropped_in_body() {
        let mut doc = Document::new();
        doc.text("x").unwrap();
        doc.doc_insert_page_number().unwrap();
        assert_eq!(doc.contents(), b"x");
    }

    #[test]
    fn test_header_after_text_fails() {
        let mut doc = Document::new();
        doc.text("body").unwrap();
        assert!(matches!(doc.doc_header(), Err(WriteError::HeaderAfterText)));
    }

    #[test]
    fn test_header_restores_body_formatting() {
        let mut doc = Document::new();
        doc.char_bold(true).unwrap();
        doc.para_justify(Justification::Center).unwrap();

        doc.doc_header().unwrap();
        assert!(!doc.chars.current().bold);
        assert_eq!(doc.paras.current().justification, Justification::Left);
        doc.text("head").unwrap();

        doc.doc_footer().unwrap();
        assert_eq!(doc.paras.running_head(), Some(RunningHead::Footer));
        doc.text("foot").unwrap();
        doc.doc_return().unwrap();

        assert!(doc.chars.current().bold);
        assert_eq!(doc.paras.current().justification, Justification::Center);
        assert!(doc.paras.running_head().is_none());
        assert!(doc.check_consistency());
    }

    #[test]
    fn test_same_header_twice_is_a_no_op() {
        let mut doc = Document::new();
        doc.doc_header().unwrap();
        doc.text("h").unwrap();
        doc.doc_header().unwrap();
        doc.text("i").unwrap();
        assert_eq!(doc.contents(), b"hi");
    }

    #[test]
    fn test_doc_return_outside_header_does_nothing() {
        let mut doc = Document::new();
        doc.doc_return().unwrap();
        assert!(doc.contents().is_empty());
    }

    #[test]
    fn test_font_table_full_is_sticky() {
        let mut doc = Document::new();
        for i in 1..64 {
            doc.char_font_name(&format!("Font {i}")).unwrap();
        }
        assert!(matches!(
            doc.char_font_name("Overflow"),
            Err(WriteError::FontTableFull { .. })
        ));
        assert!(doc.is_fatal());
        assert!(matches!(doc.text("more"), Err(WriteError::Fatal)));

        doc.reset();
        assert!(!doc.is_fatal());
        doc.text("fresh").unwrap();
    }

    #[test]
    fn test_validation_leaves_state_alone() {
        let mut doc = Document::new();
        doc.text("x").unwrap();
        assert!(doc.char_font_size(200).is_err());
        assert!(doc.para_indent_left(-1).is_err());
        assert!(!doc.is_fatal());
        assert_eq!(doc.character_runs().count(), 1);
    }
}

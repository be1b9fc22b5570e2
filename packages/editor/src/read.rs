//! # Reading Write Files
//!
//! Another Write file can be merged onto the end of the document, wholly
//! or in part:
//!
//! ```text
//! fonts ──→ font code map
//!              ↓
//! PAPs ──→ where the body text starts, paragraph runs, tabs
//!              ↓
//! text ──→ appended as-is
//!              ↓
//! CHPs ──→ character runs, font codes remapped
//!              ↓
//! SEP  ──→ page setup
//! ```
//!
//! Headers and footers at the start of the other file are skipped, and so
//! is the extra paragraph Write keeps past the end of the text. The whole
//! merge happens in a [`Transaction`]: any failure leaves the document as
//! it was.

use crate::document::Document;
use crate::errors::{WriteError, WriteResult};
use crate::run_list::Cp;
use crate::section::Section;
use crate::transaction::Transaction;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::instrument;
use writekit_common::{read_page, FileSystem, RealFileSystem};
use writekit_format::{
    decode_font_page, CharacterProps, FileHeader, FkpPage, FontEntry, FontPageEnd, FormatError,
    Page, ParagraphProps, SectionProps, FC_TEXT_START, HEADER_SIZE, PAGE_SIZE, SEP_SIZE,
};

/// Which parts of another file to merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Text and its paragraph layout
    pub text: bool,
    /// Fonts, sizes, bold and so on. Without `text`, only the font table
    /// is read, which makes the file's font families known.
    pub char_info: bool,
    /// Page setup
    pub document: bool,
    /// Tab stops, taken from the first paragraph
    pub tabs: bool,
}

impl ReadOptions {
    pub fn all() -> Self {
        Self {
            text: true,
            char_info: true,
            document: true,
            tabs: true,
        }
    }

    pub fn text_only() -> Self {
        Self {
            text: true,
            ..Self::default()
        }
    }
}

/// Where the merged text sits, in the other file and in this document
#[derive(Debug, Clone, Copy)]
struct Span {
    fc_start: u32,
    fc_end: u32,
    initial: Cp,
}

impl Span {
    /// Character position in this document of file offset `fc`
    fn cp(&self, kind: &'static str, fc: u32) -> WriteResult<Cp> {
        fc.checked_sub(self.fc_start)
            .and_then(|offset| self.initial.checked_add(offset))
            .ok_or(WriteError::Coverage {
                kind,
                expected: self.fc_start,
                found: fc,
            })
    }

    fn len(&self) -> u32 {
        self.fc_end.saturating_sub(self.fc_start)
    }
}

impl Document {
    /// Replace the document with the contents of `path`
    pub fn open(&mut self, path: impl AsRef<Path>) -> WriteResult<()> {
        self.reset();
        self.read(path, ReadOptions::all())
    }

    /// Merge parts of the Write file at `path` onto the end of the document
    pub fn read(&mut self, path: impl AsRef<Path>, options: ReadOptions) -> WriteResult<()> {
        self.read_with(&RealFileSystem, path.as_ref(), options)
    }

    pub fn read_with<F: FileSystem>(&mut self, fs: &F, path: &Path, options: ReadOptions) -> WriteResult<()> {
        let mut input = fs.open(path)?;
        self.read_from(&mut input, options)
    }

    #[instrument(skip(self, input))]
    pub fn read_from<R: Read + Seek>(&mut self, input: &mut R, options: ReadOptions) -> WriteResult<()> {
        self.guard(|doc| {
            let mut page = [0u8; PAGE_SIZE];
            read_page(input, 0, &mut page[..HEADER_SIZE])?;
            let header = FileHeader::decode(&page).map_err(WriteError::NotAWriteFile)?;

            let tx = Transaction::begin(doc)?;
            match doc.merge(input, &header, options) {
                Ok(()) => {
                    tx.commit(doc);
                    tracing::info!(text = header.text_len(), "file merged");
                    Ok(())
                }
                Err(err) => {
                    tracing::warn!(error = %err, "merge failed, rolling back");
                    tx.rollback(doc)?;
                    Err(err)
                }
            }
        })
    }

    fn merge<R: Read + Seek>(&mut self, input: &mut R, header: &FileHeader, options: ReadOptions) -> WriteResult<()> {
        let font_map = if options.char_info {
            self.read_fonts(input, header)?
        } else {
            Vec::new()
        };

        let mut span = Span {
            fc_start: FC_TEXT_START,
            fc_end: header.fc_mac,
            initial: self.text.len(),
        };

        if options.text {
            self.read_paragraphs(input, header, &mut span, options.tabs)?;
            let last = self.read_text(input, &span)?;

            if options.char_info {
                self.read_characters(input, header, &span, &font_map)?;
            } else {
                self.chars.extend(self.text.len());
            }

            // Text after the merge starts a paragraph of its own
            if matches!(last, Some(b'\n' | 0x0C)) {
                self.paras.new_paragraph()?;
            }
        } else if options.tabs {
            self.read_tabs(input, header)?;
        }

        if options.document {
            self.section = read_section(input, header)?;
        }
        Ok(())
    }

    /// Add the file's fonts to ours; the result maps the file's font codes
    /// to our codes
    fn read_fonts<R: Read + Seek>(&mut self, input: &mut R, header: &FileHeader) -> WriteResult<Vec<u16>> {
        if header.pn_ffntb == header.pn_mac {
            return Ok(Vec::new());
        }

        let mut entries: Vec<FontEntry> = Vec::new();
        let mut page: Page = [0; PAGE_SIZE];
        let mut pn = header.pn_ffntb;
        let mut first = true;
        loop {
            if pn >= header.pn_mac {
                return Err(FormatError::font_table(0, "table runs past the last page").into());
            }
            read_page(input, pn, &mut page)?;
            match decode_font_page(&page, first, &mut entries)? {
                FontPageEnd::End => break,
                FontPageEnd::Continued => {
                    pn += 1;
                    first = false;
                }
            }
        }

        tracing::debug!(fonts = entries.len(), "font table read");
        entries
            .iter()
            .map(|font| self.fonts.code_for_name(&font.name, font.family))
            .collect()
    }

    /// Append the file's body paragraphs, and find where its body text
    /// starts
    fn read_paragraphs<R: Read + Seek>(
        &mut self,
        input: &mut R,
        header: &FileHeader,
        span: &mut Span,
        mut want_tabs: bool,
    ) -> WriteResult<()> {
        let mut page: Page = [0; PAGE_SIZE];
        let mut in_leading_heads = true;
        let mut is_first = true;
        let mut fc_lim_last = FC_TEXT_START;

        for pn in header.pn_para..header.pn_fntb {
            read_page(input, pn, &mut page)?;
            let fkp = FkpPage::parse(&page)?;

            let mut fc_first = fkp.fc_first();
            for fod in fkp.fods() {
                let (pap, tabs) = match fkp.blob(&fod)? {
                    Some(blob) => ParagraphProps::from_prefix(blob)?,
                    None => (ParagraphProps::DEFAULT, Vec::new()),
                };

                if in_leading_heads && !pap.is_running_head() {
                    in_leading_heads = false;
                    span.fc_start = fc_first;
                }

                // Every paragraph carries the same tabs, heads included
                if want_tabs {
                    self.tabs.replace(tabs);
                    want_tabs = false;
                }

                // fc_first >= fc_end is the extra paragraph past the text
                if !in_leading_heads && fc_first < span.fc_end {
                    let real_lim = fod.fc_lim.min(span.fc_end);
                    self.paras
                        .append(pap, span.cp("paragraph", real_lim)?, is_first)?;
                    is_first = false;
                    fc_lim_last = real_lim;
                }

                fc_first = fod.fc_lim;
            }
        }

        if fc_lim_last != span.fc_end {
            return Err(WriteError::Coverage {
                kind: "paragraph",
                expected: span.fc_end,
                found: fc_lim_last,
            });
        }
        Ok(())
    }

    /// Returns the last byte merged
    fn read_text<R: Read + Seek>(&mut self, input: &mut R, span: &Span) -> WriteResult<Option<u8>> {
        let len = span.len() as usize;
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len)?;
        bytes.resize(len, 0);

        input.seek(SeekFrom::Start(u64::from(span.fc_start)))?;
        input.read_exact(&mut bytes)?;
        self.text.append(&bytes)?;

        if !bytes.is_empty() {
            self.had_normal_text = true;
        }
        Ok(bytes.last().copied())
    }

    fn read_characters<R: Read + Seek>(
        &mut self,
        input: &mut R,
        header: &FileHeader,
        span: &Span,
        font_map: &[u16],
    ) -> WriteResult<()> {
        let mut page: Page = [0; PAGE_SIZE];
        let mut fc_lim = FC_TEXT_START;

        for pn in header.pn_char()?..header.pn_para {
            read_page(input, pn, &mut page)?;
            let fkp = FkpPage::parse(&page)?;

            for fod in fkp.fods() {
                fc_lim = fod.fc_lim;
                // Runs that only cover skipped running heads
                if fc_lim <= span.fc_start {
                    continue;
                }

                let mut chp = match fkp.blob(&fod)? {
                    Some(blob) => CharacterProps::from_prefix(blob)?,
                    None => CharacterProps::DEFAULT,
                };
                let code = chp.font_code();
                let mapped = font_map
                    .get(usize::from(code))
                    .copied()
                    .ok_or(WriteError::UnknownFont { code })?;
                chp.set_font_code(mapped);

                self.chars.append(chp, span.cp("character", fc_lim)?)?;
            }
        }

        if fc_lim != span.fc_end {
            return Err(WriteError::Coverage {
                kind: "character",
                expected: span.fc_end,
                found: fc_lim,
            });
        }
        Ok(())
    }

    /// Take the tabs of the first paragraph without merging anything else
    fn read_tabs<R: Read + Seek>(&mut self, input: &mut R, header: &FileHeader) -> WriteResult<()> {
        if header.pn_para >= header.pn_fntb {
            return Ok(());
        }

        let mut page: Page = [0; PAGE_SIZE];
        read_page(input, header.pn_para, &mut page)?;
        let fkp = FkpPage::parse(&page)?;
        if let Some(fod) = fkp.fods().next() {
            if let Some(blob) = fkp.blob(&fod)? {
                let (_, tabs) = ParagraphProps::from_prefix(blob)?;
                self.tabs.replace(tabs);
            } else {
                self.tabs.cancel();
            }
        }
        Ok(())
    }
}

/// Page setup of the file, or the defaults if it has none
fn read_section<R: Read + Seek>(input: &mut R, header: &FileHeader) -> WriteResult<Section> {
    if !header.has_section_table() {
        return Ok(Section::default());
    }

    let mut page: Page = [0; PAGE_SIZE];
    read_page(input, header.pn_sep, &mut page[..SEP_SIZE])?;
    Ok(Section::from_sep(SectionProps::from_stored(&page)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn saved(doc: &mut Document) -> Cursor<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        doc.write_to(&mut out).unwrap();
        out.set_position(0);
        out
    }

    #[test]
    fn test_rejects_garbage() {
        let mut doc = Document::new();
        let mut input = Cursor::new(vec![0u8; 256]);
        let err = doc.read_from(&mut input, ReadOptions::all()).unwrap_err();
        assert!(matches!(err, WriteError::NotAWriteFile(_)));
        assert!(!doc.is_fatal());
    }

    #[test]
    fn test_merge_skips_leading_heads() {
        let mut source = Document::new();
        source.doc_footer().unwrap();
        source.text("footer").unwrap();
        source.doc_return().unwrap();
        source.text("body\n").unwrap();
        let mut file = saved(&mut source);

        let mut doc = Document::new();
        doc.text("before ").unwrap();
        doc.read_from(&mut file, ReadOptions::all()).unwrap();

        assert_eq!(doc.contents(), b"before body\r\n");
        assert!(doc.check_consistency());
        // the trailing paragraph mark leaves an empty paragraph open
        assert!(doc.paragraphs().runs().tail().is_empty());
    }

    #[test]
    fn test_text_only_keeps_current_formatting() {
        let mut source = Document::new();
        source.char_bold(true).unwrap();
        source.text("bold").unwrap();
        let mut file = saved(&mut source);

        let mut doc = Document::new();
        doc.char_italic(true).unwrap();
        doc.read_from(&mut file, ReadOptions::text_only()).unwrap();

        let runs: Vec<_> = doc.character_runs().collect();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].prop.italic);
        assert!(!runs[0].prop.bold);
    }

    #[test]
    fn test_tabs_only() {
        let mut source = Document::new();
        source.doc_tab_set(1440, true).unwrap();
        source.text("x").unwrap();
        let mut file = saved(&mut source);

        let mut doc = Document::new();
        let options = ReadOptions {
            tabs: true,
            ..ReadOptions::default()
        };
        doc.read_from(&mut file, options).unwrap();

        assert!(doc.contents().is_empty());
        assert_eq!(doc.tab_stops(), source.tab_stops());
    }

    #[test]
    fn test_fonts_only() {
        let mut source = Document::new();
        source.char_font_name("Courier").unwrap();
        source.text("x").unwrap();
        let mut file = saved(&mut source);

        let mut doc = Document::new();
        let options = ReadOptions {
            char_info: true,
            ..ReadOptions::default()
        };
        doc.read_from(&mut file, options).unwrap();

        assert!(doc.contents().is_empty());
        assert_eq!(doc.fonts().len(), 2);
        assert_eq!(doc.fonts()[1].name, "Courier");
    }
}

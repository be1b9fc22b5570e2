//! Writing a document out.
//!
//! ```text
//! page 0          header
//! page 1..        text (fcMac = 128 + text length)
//! pnChar..        character FKPs
//! pnPara..        paragraph FKPs
//! pnSep           section record   ┐ only when the page setup
//! pnSetb          section table    ┘ differs from the defaults
//! pnFfntb..       font table
//! ```

use crate::document::Document;
use crate::errors::{WriteError, WriteResult};
use crate::pap::RunningHead;
use std::io::{Seek, Write};
use std::path::Path;
use tracing::instrument;
use writekit_common::{seek_to_page, write_page, FileSystem, RealFileSystem};
use writekit_format::{
    encode_font_table, encode_section_table, CharacterProps, FileHeader, FkpPacker, Page,
    PageNumber, ParagraphProps, SectionProps, FC_TEXT_START,
};

/// Page number `count` pages after `start`
fn advance(start: PageNumber, count: usize) -> WriteResult<PageNumber> {
    PageNumber::try_from(count)
        .ok()
        .and_then(|count| start.checked_add(count))
        .ok_or_else(|| WriteError::out_of_range("file size in pages", i64::from(start) + count as i64))
}

fn write_pages<W: Write + Seek>(out: &mut W, start: PageNumber, pages: &[Page]) -> WriteResult<PageNumber> {
    seek_to_page(out, start)?;
    for page in pages {
        write_page(out, page)?;
    }
    advance(start, pages.len())
}

impl Document {
    /// Save to `path`, removing the partial file if anything fails
    pub fn save(&mut self, path: impl AsRef<Path>) -> WriteResult<FileHeader> {
        self.save_with(&RealFileSystem, path.as_ref())
    }

    #[instrument(skip(self, fs))]
    pub fn save_with<F: FileSystem>(&mut self, fs: &F, path: &Path) -> WriteResult<FileHeader> {
        let mut out = fs.create(path)?;
        let result = self.write_to(&mut out);
        drop(out);

        if let Err(err) = &result {
            tracing::warn!(error = %err, "save failed, removing partial file");
            if let Err(remove_err) = fs.remove(path) {
                tracing::warn!(error = %remove_err, "could not remove partial file");
            }
        }
        result
    }

    /// Write the complete file to `out`.
    ///
    /// An open header or footer is closed first.
    #[instrument(skip_all)]
    pub fn write_to<W: Write + Seek>(&mut self, out: &mut W) -> WriteResult<FileHeader> {
        self.doc_return()?;
        self.guard(|doc| doc.write_file(out))
    }

    fn write_file<W: Write + Seek>(&self, out: &mut W) -> WriteResult<FileHeader> {
        let text = self.text.as_bytes();
        let fc_mac = u32::try_from(text.len())
            .ok()
            .and_then(|len| len.checked_add(FC_TEXT_START))
            .ok_or_else(|| WriteError::out_of_range("text length", text.len() as i64))?;

        let mut header = FileHeader {
            fc_mac,
            ..FileHeader::default()
        };
        // Property pages must be addressable after the text
        let pn_char = header
            .pn_char()
            .map_err(|_| WriteError::out_of_range("text length", text.len() as i64))?;

        seek_to_page(out, 1)?;
        out.write_all(text)?;

        let character_pages = self.pack_characters();
        header.pn_para = write_pages(out, pn_char, &character_pages)?;

        let sep = self.section.to_sep();
        let paragraph_pages = self.pack_paragraphs(&sep);
        header.pn_fntb = write_pages(out, header.pn_para, &paragraph_pages)?;

        header.pn_sep = header.pn_fntb;
        if sep.is_default() {
            header.pn_setb = header.pn_sep;
            header.pn_pgtb = header.pn_sep;
        } else {
            let table = encode_section_table(header.text_len(), header.pn_sep);
            header.pn_setb = write_pages(out, header.pn_sep, &[sep.encode_page()])?;
            header.pn_pgtb = write_pages(out, header.pn_setb, &[table])?;
        }

        header.pn_ffntb = header.pn_pgtb;
        let font_pages = encode_font_table(self.fonts.entries());
        header.pn_mac = write_pages(out, header.pn_ffntb, &font_pages)?;

        write_pages(out, 0, &[header.encode()])?;
        out.flush()?;

        tracing::info!(
            text = text.len(),
            character_pages = character_pages.len(),
            paragraph_pages = paragraph_pages.len(),
            font_pages = font_pages.len(),
            pages = header.pn_mac,
            "document written"
        );
        Ok(header)
    }

    fn pack_characters(&self) -> Vec<Page> {
        let default = CharacterProps::DEFAULT.to_bytes();
        let mut packer = FkpPacker::new(false);
        for run in self.chars.runs().iter() {
            packer.push(run.first, run.lim, &run.prop.to_bytes(), &default);
        }
        packer.finish()
    }

    /// Running heads are stored relative to the page edges rather than the
    /// text area, and carry the print-on-first-page setting.
    fn pack_paragraphs(&self, sep: &SectionProps) -> Vec<Page> {
        let tabs = self.tabs.as_slice();
        let default = ParagraphProps::DEFAULT.to_bytes(&[]);
        let right_margin = sep
            .page_width
            .wrapping_sub(sep.left_margin)
            .wrapping_sub(sep.text_width);

        let mut packer = FkpPacker::new(true);
        for (run, props) in self.paras.resolved() {
            let mut pap = *props;
            if pap.is_running_head() {
                let kind = if pap.footer {
                    RunningHead::Footer
                } else {
                    RunningHead::Header
                };
                pap.left_indent = pap.left_indent.wrapping_add(sep.left_margin);
                pap.right_indent = pap.right_indent.wrapping_add(right_margin);
                pap.first_page = self.paras.print_on_first_page(kind);
            }
            packer.push(run.first, run.lim, &pap.to_bytes(tabs), &default);
        }
        packer.finish()
    }
}

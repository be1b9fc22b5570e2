//! Formatted disk pages (FKP) holding character or paragraph runs.
//!
//! ```text
//! 0..4      fcFirst
//! 4..       FODs {fcLim u32, bfprop u16}, growing forward
//!   ..127   FPROPs {cch u8, bytes[cch]}, growing backward
//! 127       cfod
//! ```
//!
//! `bfprop` is measured from byte 4; 0xFFFF means the default record.

use crate::diff::compute_cch;
use crate::error::{FormatError, FormatResult};
use crate::le::{get_u16, get_u32, put_u16, put_u32};
use writekit_common::{Page, PAGE_SIZE};

/// File offset of the first text byte; text positions map to file
/// offsets by adding this
pub const FC_TEXT_START: u32 = PAGE_SIZE as u32;

pub const FOD_SIZE: usize = 6;
const FOD_START: usize = 4;
const CFOD_POS: usize = PAGE_SIZE - 1;
/// Bytes shared by FODs and FPROPs in one page
pub const FPROP_AREA: usize = CFOD_POS - FOD_START;
pub const MAX_FODS: usize = FPROP_AREA / FOD_SIZE;
/// Every stored blob costs at least a FOD, its count byte and two bytes
pub const MAX_BLOBS_PER_PAGE: usize = FPROP_AREA / (3 + FOD_SIZE);
pub const DEFAULT_BFPROP: u16 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fod {
    pub fc_lim: u32,
    pub bfprop: u16,
}

impl Fod {
    pub fn is_default(&self) -> bool {
        self.bfprop == DEFAULT_BFPROP
    }
}

/// Packs runs into FKPs.
///
/// With `dedup` set, a blob identical to one already stored in the current
/// page is referenced again instead of being written twice. Paragraph
/// pages use this; character pages do not.
pub struct FkpPacker {
    dedup: bool,
    pages: Vec<Page>,
    page: Page,
    fod_end: usize,
    blob_start: usize,
    cfod: u8,
    blobs: Vec<usize>,
}

impl FkpPacker {
    pub fn new(dedup: bool) -> Self {
        let mut packer = Self {
            dedup,
            pages: Vec::new(),
            page: [0; PAGE_SIZE],
            fod_end: FOD_START,
            blob_start: CFOD_POS,
            cfod: 0,
            blobs: Vec::new(),
        };
        packer.start_page(FC_TEXT_START);
        packer
    }

    fn space_left(&self) -> usize {
        self.blob_start - self.fod_end
    }

    fn start_page(&mut self, fc_first: u32) {
        self.page = [0; PAGE_SIZE];
        put_u32(&mut self.page, 0, fc_first);
        self.fod_end = FOD_START;
        self.blob_start = CFOD_POS;
        self.cfod = 0;
        self.blobs.clear();
    }

    fn flush(&mut self) {
        self.page[CFOD_POS] = self.cfod;
        tracing::trace!(page = self.pages.len(), cfod = self.cfod, "fkp page full");
        self.pages.push(self.page);
    }

    fn recall(&self, blob: &[u8]) -> Option<usize> {
        self.blobs.iter().copied().find(|&at| {
            usize::from(self.page[at]) == blob.len() && &self.page[at + 1..at + 1 + blob.len()] == blob
        })
    }

    fn store_blob(&mut self, blob: &[u8]) -> usize {
        self.blob_start -= blob.len();
        self.page[self.blob_start..self.blob_start + blob.len()].copy_from_slice(blob);
        self.blob_start -= 1;
        self.page[self.blob_start] = blob.len() as u8;

        if self.dedup && self.blobs.len() < MAX_BLOBS_PER_PAGE {
            self.blobs.push(self.blob_start);
        }
        self.blob_start
    }

    /// Add the run `[cp_first, cp_lim)` carrying `record`.
    ///
    /// `default` is the record that an absent blob stands for. Empty runs
    /// are skipped.
    pub fn push(&mut self, cp_first: u32, cp_lim: u32, record: &[u8], default: &[u8]) {
        if cp_first == cp_lim {
            return;
        }

        let cch = compute_cch(record, default);
        let blob = &record[..cch];

        let reused = if cch > 1 && self.dedup && self.space_left() >= FOD_SIZE {
            self.recall(blob)
        } else {
            None
        };
        let cost = if cch <= 1 || reused.is_some() {
            FOD_SIZE
        } else {
            FOD_SIZE + cch + 1
        };

        // A reused blob only costs a FOD, which always fits here
        if cost > self.space_left() {
            self.flush();
            self.start_page(cp_first + FC_TEXT_START);
        }

        let bfprop = if cch <= 1 {
            DEFAULT_BFPROP
        } else {
            let at = match reused {
                Some(at) => at,
                None => self.store_blob(blob),
            };
            (at - FOD_START) as u16
        };

        put_u32(&mut self.page, self.fod_end, cp_lim + FC_TEXT_START);
        put_u16(&mut self.page, self.fod_end + 4, bfprop);
        self.fod_end += FOD_SIZE;
        self.cfod += 1;

        debug_assert!(self.fod_end <= self.blob_start);
    }

    /// Finish packing, writing out the last page if it holds any runs
    pub fn finish(mut self) -> Vec<Page> {
        if self.cfod != 0 {
            self.flush();
        }
        self.pages
    }
}

/// Read-only view of a stored FKP
#[derive(Debug, Clone, Copy)]
pub struct FkpPage<'a> {
    page: &'a Page,
    cfod: usize,
}

impl<'a> FkpPage<'a> {
    pub fn parse(page: &'a Page) -> FormatResult<Self> {
        let cfod = usize::from(page[CFOD_POS]);
        if cfod > MAX_FODS {
            return Err(FormatError::TooManyDescriptors {
                count: cfod,
                max: MAX_FODS,
            });
        }

        let fkp = Self { page, cfod };
        let mut fc_first = fkp.fc_first();
        for fod in fkp.fods() {
            if fod.fc_lim < fc_first {
                return Err(FormatError::RunsOutOfOrder {
                    fc_first,
                    fc_lim: fod.fc_lim,
                });
            }
            fc_first = fod.fc_lim;
        }
        Ok(fkp)
    }

    pub fn fc_first(&self) -> u32 {
        get_u32(self.page, 0)
    }

    pub fn len(&self) -> usize {
        self.cfod
    }

    pub fn is_empty(&self) -> bool {
        self.cfod == 0
    }

    pub fn fods(&self) -> impl Iterator<Item = Fod> + 'a {
        let page = self.page;
        (0..self.cfod).map(move |i| {
            let at = FOD_START + i * FOD_SIZE;
            Fod {
                fc_lim: get_u32(page, at),
                bfprop: get_u16(page, at + 4),
            }
        })
    }

    /// Stored bytes of the blob a FOD points to, `None` for the default
    pub fn blob(&self, fod: &Fod) -> FormatResult<Option<&'a [u8]>> {
        if fod.is_default() {
            return Ok(None);
        }
        let at = FOD_START + usize::from(fod.bfprop);
        if at >= CFOD_POS {
            return Err(FormatError::BlobOutOfBounds { offset: at });
        }
        let end = at + 1 + usize::from(self.page[at]);
        if end > CFOD_POS {
            return Err(FormatError::BlobOutOfBounds { offset: at });
        }
        Ok(Some(&self.page[at + 1..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: [u8; 6] = [0, 0, 24, 0, 0, 0];
    const BOLD: [u8; 6] = [0, 1, 24, 0, 0, 0];

    #[test]
    fn test_layout_constants() {
        assert_eq!(FPROP_AREA, 123);
        assert_eq!(MAX_FODS, 20);
        assert_eq!(MAX_BLOBS_PER_PAGE, 13);
    }

    #[test]
    fn test_default_run_is_fod_only() {
        let mut packer = FkpPacker::new(false);
        packer.push(0, 10, &DEFAULT, &DEFAULT);
        let pages = packer.finish();

        assert_eq!(pages.len(), 1);
        let fkp = FkpPage::parse(&pages[0]).unwrap();
        assert_eq!(fkp.fc_first(), 128);
        let fods: Vec<_> = fkp.fods().collect();
        assert_eq!(fods, vec![Fod { fc_lim: 138, bfprop: 0xFFFF }]);
        assert_eq!(fkp.blob(&fods[0]).unwrap(), None);
    }

    #[test]
    fn test_blob_stored_from_the_end() {
        let mut packer = FkpPacker::new(false);
        packer.push(0, 5, &BOLD, &DEFAULT);
        let pages = packer.finish();
        let page = &pages[0];

        assert_eq!(&page[124..127], &[2, 0, 1]);
        let fkp = FkpPage::parse(page).unwrap();
        let fod = fkp.fods().next().unwrap();
        assert_eq!(fod.bfprop, 120);
        assert_eq!(fkp.blob(&fod).unwrap(), Some(&[0u8, 1][..]));
    }

    #[test]
    fn test_empty_runs_skipped() {
        let mut packer = FkpPacker::new(false);
        packer.push(0, 0, &BOLD, &DEFAULT);
        assert!(packer.finish().is_empty());
    }

    #[test]
    fn test_dedup_reuses_blob() {
        let mut with = FkpPacker::new(true);
        let mut without = FkpPacker::new(false);
        for i in 0..4 {
            with.push(i * 10, i * 10 + 10, &BOLD, &DEFAULT);
            without.push(i * 10, i * 10 + 10, &BOLD, &DEFAULT);
        }
        let with = with.finish();
        let without = without.finish();

        let fkp = FkpPage::parse(&with[0]).unwrap();
        let offsets: Vec<u16> = fkp.fods().map(|f| f.bfprop).collect();
        assert_eq!(offsets, vec![120; 4]);

        let fkp = FkpPage::parse(&without[0]).unwrap();
        let offsets: Vec<u16> = fkp.fods().map(|f| f.bfprop).collect();
        assert_eq!(offsets, vec![120, 117, 114, 111]);
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let mut packer = FkpPacker::new(false);
        for i in 0..25 {
            packer.push(i, i + 1, &DEFAULT, &DEFAULT);
        }
        let pages = packer.finish();
        assert_eq!(pages.len(), 2);

        let first = FkpPage::parse(&pages[0]).unwrap();
        let second = FkpPage::parse(&pages[1]).unwrap();
        assert_eq!(first.len(), 20);
        assert_eq!(second.len(), 5);
        assert_eq!(second.fc_first(), 128 + 20);
        assert_eq!(second.fods().last().unwrap().fc_lim, 128 + 25);
    }

    #[test]
    fn test_parse_rejects_bad_pages() {
        let mut page = [0u8; PAGE_SIZE];
        page[127] = 21;
        assert!(FkpPage::parse(&page).is_err());

        page[127] = 1;
        put_u16(&mut page, 8, 123);
        let fkp = FkpPage::parse(&page).unwrap();
        let fod = fkp.fods().next().unwrap();
        assert!(matches!(
            fkp.blob(&fod),
            Err(FormatError::BlobOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_runs_going_backwards() {
        let mut packer = FkpPacker::new(false);
        packer.push(0, 10, &DEFAULT, &DEFAULT);
        packer.push(10, 20, &BOLD, &DEFAULT);
        let mut page = packer.finish()[0];

        // second run now ends before the first
        put_u32(&mut page, FOD_START + FOD_SIZE, 130);
        assert_eq!(
            FkpPage::parse(&page).unwrap_err(),
            FormatError::RunsOutOfOrder {
                fc_first: 138,
                fc_lim: 130
            }
        );

        // first run ends before the page starts
        put_u32(&mut page, FOD_START, 100);
        assert!(matches!(
            FkpPage::parse(&page),
            Err(FormatError::RunsOutOfOrder { fc_first: 128, .. })
        ));
    }
}

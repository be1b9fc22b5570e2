//! # Import Transactions
//!
//! Merging another file must either succeed completely or leave the
//! document exactly as it was. A transaction sets a breakpoint on the
//! text and both run lists, and snapshots the small pieces of state the
//! import may replace wholesale.
//!
//! ## Example
//!
//! ```rust,ignore
//! let tx = Transaction::begin(&mut doc)?;
//! match merge(&mut doc) {
//!     Ok(()) => tx.commit(&mut doc),
//!     Err(err) => tx.rollback(&mut doc)?,
//! }
//! ```

use crate::document::Document;
use crate::errors::{WriteError, WriteResult};
use crate::fonts::FontTable;
use crate::section::Section;
use crate::tabs::TabStops;

#[derive(Debug)]
pub(crate) struct Transaction {
    fonts: FontTable,
    tabs: TabStops,
    section: Section,
    had_normal_text: bool,
}

impl Transaction {
    pub fn begin(doc: &mut Document) -> WriteResult<Self> {
        if doc.text.has_breakpoint()
            || doc.chars.runs().has_breakpoint()
            || doc.paras.runs().has_breakpoint()
        {
            return Err(WriteError::BreakpointPending);
        }

        doc.text.breakpoint()?;
        doc.paras.breakpoint()?;
        doc.chars.breakpoint()?;

        Ok(Self {
            fonts: doc.fonts.clone(),
            tabs: doc.tabs.clone(),
            section: doc.section.clone(),
            had_normal_text: doc.had_normal_text,
        })
    }

    pub fn commit(self, doc: &mut Document) {
        doc.text.commit();
        doc.paras.commit();
        doc.chars.commit();
    }

    pub fn rollback(self, doc: &mut Document) -> WriteResult<()> {
        doc.text.rollback()?;
        doc.paras.rollback()?;
        doc.chars.rollback()?;

        doc.fonts = self.fonts;
        doc.tabs = self.tabs;
        doc.section = self.section;
        doc.had_normal_text = self.had_normal_text;
        Ok(())
    }
}

//! # WriteKit Editor
//!
//! Builds MS Write (.wri) documents in memory and saves them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Document: text + formatting calls           │
//! │  - Character runs (one record per run)      │
//! │  - Paragraph runs (shared, copy-on-write)   │
//! │  - Tabs, fonts, page setup                  │
//! │  - Headers/footers before the body          │
//! └─────────────────────────────────────────────┘
//!          ↓ save                    ↑ read
//! ┌─────────────────────────────────────────────┐
//! │ format: FKP pages, font table, SEP, header  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ common: 128-byte pages, FileSystem          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Append only**: text goes to the end; formatting applies to what follows
//! 2. **Runs cover the text exactly**: no gaps, no overlaps
//! 3. **All or nothing merges**: a failed read leaves the document untouched
//! 4. **Exhaustion is sticky**: after running out of memory or fonts the
//!    document refuses further work until reset
//!
//! ## Usage
//!
//! ```rust,ignore
//! use writekit_editor::{Document, Justification};
//!
//! let mut doc = Document::new();
//! doc.doc_header()?;
//! doc.text("Page ")?;
//! doc.doc_insert_page_number()?;
//! doc.doc_return()?;
//!
//! doc.para_justify(Justification::Center)?;
//! doc.char_bold(true)?;
//! doc.text("Title\n")?;
//!
//! doc.save("out.wri")?;
//! ```

mod chp;
mod document;
mod errors;
mod fonts;
mod pap;
mod read;
mod run_list;
mod save;
mod section;
mod tabs;
mod text;
mod transaction;

pub use chp::{CharacterRuns, HPS_STEPS, MAX_FONT_SIZE, MIN_FONT_SIZE};
pub use document::Document;
pub use errors::{WriteError, WriteResult};
pub use fonts::{known_family, FontTable};
pub use pap::{ParagraphRuns, RecordId, RunningHead};
pub use read::ReadOptions;
pub use run_list::{Cp, Run, RunList};
pub use section::Section;
pub use tabs::TabStops;

// Re-export format types callers need for formatting calls
pub use writekit_format::{
    CharacterProps, FileHeader, FontEntry, Justification, ParagraphProps, ScriptPosition,
    TabAlignment, TabStop,
};

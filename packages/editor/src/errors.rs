//! Error types for the editor

use thiserror::Error;
use writekit_common::CommonError;
use writekit_format::FormatError;

pub type WriteResult<T> = Result<T, WriteError>;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("{what} out of range: {value}")]
    OutOfRange { what: &'static str, value: i64 },

    #[error("Out of memory")]
    OutOfMemory,

    #[error("Font table full ({max} fonts)")]
    FontTableFull { max: usize },

    #[error("Document is unusable after an earlier fatal error; reset it")]
    Fatal,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page error: {0}")]
    Page(#[from] CommonError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Not a Write file: {0}")]
    NotAWriteFile(#[source] FormatError),

    #[error("{kind} runs end at {found}, text ends at {expected}")]
    Coverage {
        kind: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("Character run uses font {code}, which the font table does not define")]
    UnknownFont { code: u16 },

    #[error("A breakpoint is already pending")]
    BreakpointPending,

    #[error("No breakpoint to roll back to")]
    NoBreakpoint,

    #[error("Headers and footers must come before any body text")]
    HeaderAfterText,

    #[error("Not inside a header or footer")]
    NotInHeaderFooter,

    #[error("Too many tab stops (at most {max})")]
    TooManyTabs { max: usize },

    #[error("No tab stop at {position}")]
    TabNotFound { position: i64 },
}

impl WriteError {
    pub fn out_of_range(what: &'static str, value: impl Into<i64>) -> Self {
        Self::OutOfRange {
            what,
            value: value.into(),
        }
    }

    /// Resource exhaustion leaves the document unusable until reset
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WriteError::OutOfMemory | WriteError::FontTableFull { .. } | WriteError::Fatal
        )
    }
}

impl From<std::collections::TryReserveError> for WriteError {
    fn from(_: std::collections::TryReserveError) -> Self {
        WriteError::OutOfMemory
    }
}

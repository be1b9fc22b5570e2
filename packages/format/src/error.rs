use thiserror::Error;

pub type FormatResult<T> = Result<T, FormatError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Not a Write file (ident {ident:#06x}, tool {tool:#06x})")]
    NotAWriteFile { ident: u16, tool: u16 },

    #[error("Write files containing OLE objects are not supported")]
    OleObjects,

    #[error("File was produced by Word, not Write")]
    WordFile,

    #[error("Record too short: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("Property page holds {count} descriptors, at most {max} fit")]
    TooManyDescriptors { count: usize, max: usize },

    #[error("Property blob at offset {offset} overruns the page")]
    BlobOutOfBounds { offset: usize },

    #[error("Property blob of {cch} bytes is longer than a {size}-byte record")]
    BlobTooLong { cch: usize, size: usize },

    #[error("Text of {fc_mac} bytes does not fit in the addressable pages")]
    TextTooLong { fc_mac: u32 },

    #[error("Run ending at {fc_lim} starts after it, at {fc_first}")]
    RunsOutOfOrder { fc_first: u32, fc_lim: u32 },

    #[error("Malformed font table at page offset {offset}: {message}")]
    FontTable { offset: usize, message: String },
}

impl FormatError {
    pub fn truncated(needed: usize, actual: usize) -> Self {
        Self::Truncated { needed, actual }
    }

    pub fn font_table(offset: usize, message: impl Into<String>) -> Self {
        Self::FontTable {
            offset,
            message: message.into(),
        }
    }
}

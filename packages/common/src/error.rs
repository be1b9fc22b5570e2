use thiserror::Error;

/// Errors raised by the page-level I/O helpers
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Short read on page {page}: wanted {wanted} bytes")]
    ShortPage { page: u16, wanted: usize },

    #[error("{len} bytes need more pages than a file can address")]
    TooManyPages { len: u64 },
}

pub mod error;
pub mod filesystem;
pub mod pageio;
pub mod result;

pub use error::*;
pub use filesystem::*;
pub use pageio::*;
pub use result::*;

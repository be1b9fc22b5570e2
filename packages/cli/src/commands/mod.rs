pub mod demo;
pub mod dump;
pub mod merge;

pub use demo::{demo, DemoArgs};
pub use dump::{dump, DumpArgs};
pub use merge::{merge, MergeArgs};

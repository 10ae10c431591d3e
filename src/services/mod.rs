pub mod batch;
pub mod extractor;
pub mod spreadsheet;

pub use batch::*;
pub use extractor::*;
pub use spreadsheet::*;

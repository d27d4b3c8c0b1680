pub mod aggregate;
pub mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod fingerprint;
pub mod load;
pub mod packages;
pub mod schema;
pub mod timestamp;
pub mod version;

pub use aggregate::{Bucket, WideTable};
pub use error::{FrameError, Result};
pub use load::{FilteredTable, LoadOptions};

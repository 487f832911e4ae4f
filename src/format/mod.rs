//! Wire shapes shared with the host application and the detection backend.

mod batch;
mod error;
mod record;

#[cfg(test)]
mod tests;

pub use batch::{BATCH_SIZE, BatchResponse, batches};
pub use error::FormatError;
pub use record::{Analysis, ImageRecord};

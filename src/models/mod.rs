pub mod batch;
pub mod resume;

pub use batch::{BatchEvent, BatchItem, BatchStatus, BatchSummary};
pub use resume::{Gender, ResumeRecord};

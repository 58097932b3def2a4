pub mod detect;
pub mod pass;

pub use crate::domain::model::{FileOutcome, FileReport, PassReport};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;

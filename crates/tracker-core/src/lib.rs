pub mod config;
pub mod error;
pub mod pagination;
pub mod result;

pub use config::AppConfig;
pub use error::{ErrorKind, TrackerError};
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE};
pub use result::TrackerResult;

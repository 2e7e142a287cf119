pub mod config;
pub mod error;
pub mod models;
pub mod time;

// 重新导出常用类型，方便直接使用
pub use config::DashboardConfig;
pub use error::{CommonError, Result, GENERIC_FETCH_ERROR};
pub use models::{FetchResponse, RatingTier, SubmissionRecord};

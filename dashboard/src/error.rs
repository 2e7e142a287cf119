use cp_common::CommonError;
use submission_filter::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// 用户名为空，不发起请求
    #[error("Codeforces handle cannot be empty.")]
    EmptyHandle,

    /// 选中的年份不在可选列表中
    #[error("年份不可选: {0}")]
    UnknownYear(i32),

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

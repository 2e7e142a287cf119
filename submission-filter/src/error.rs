use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    /// 目标页码不在 [1, total_pages] 范围内
    #[error("页码超出范围: {requested} (共 {total_pages} 页)")]
    PageOutOfRange { requested: usize, total_pages: usize },
}

pub type Result<T> = std::result::Result<T, FilterError>;

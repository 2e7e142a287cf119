use thiserror::Error;
use tracing::warn;

/// 响应无法解析时展示给用户的通用提示，细节只写入日志
pub const GENERIC_FETCH_ERROR: &str = "An error occurred while fetching data. Check console for details.";

/// 公共错误类型
#[derive(Debug, Error)]
pub enum CommonError {
    /// 数据源返回失败，消息直接展示给用户
    #[error("{0}")]
    DataSource(String),

    /// 配置项不合法
    #[error("配置无效: {0}")]
    InvalidConfig(String),

    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommonError {
    /// 转换为可展示的数据源错误：解析失败替换为通用提示
    pub fn into_user_facing(self) -> Self {
        match self {
            CommonError::Json(e) => {
                warn!(error = %e, "数据源响应解析失败");
                CommonError::DataSource(GENERIC_FETCH_ERROR.to_string())
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommonError>;

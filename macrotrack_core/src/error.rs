//! 错误类型定义
//!
//! 目标计算与请求签名本身不会失败，错误只来自网络、存储和表单校验。

use thiserror::Error;

/// 错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 网络错误
    #[error("Network error: {0}")]
    Network(String),

    /// 营养 API 返回的业务错误
    #[error("API error (code {code}): {message}")]
    Api { code: i64, message: String },

    /// 参数错误
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// 编解码错误
    #[error("Encoding/Decoding error: {0}")]
    Encoding(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    Storage(String),

    /// 文档不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Encoding(e.to_string())
    }
}

/// 结果类型
pub type Result<T> = std::result::Result<T, Error>;

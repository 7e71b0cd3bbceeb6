// ==========================================
// 苗圃排苗系统 - API层错误类型
// ==========================================
// 职责: 统一本地校验、远程调用、数据异常三类错误
// 分类:
// - 本地校验失败: 同步、立即提示用户,不发起远程调用
// - 远程调用失败: 记录日志,非致命,用户可重试
// - 数据形态异常: 批量场景跳过,单条请求场景才报错
// ==========================================

use crate::engine::booking::BookingViolation;
use crate::engine::transfer::TransferViolation;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 本地校验错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("调拨校验失败: {0}")]
    TransferRejected(#[from] TransferViolation),

    #[error("下单校验失败: {0}")]
    BookingRejected(#[from] BookingViolation),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 远程调用错误
    // ==========================================
    #[error("远程服务调用失败: {0}")]
    Remote(String),

    #[error("远程服务返回错误: status={status}, body={body}")]
    RemoteStatus { status: u16, body: String },

    // ==========================================
    // 数据形态错误
    // ==========================================
    #[error("数据格式异常: {0}")]
    DataShape(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为本地校验失败（未发起远程调用）
    pub fn is_local_validation(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidInput(_) | ApiError::TransferRejected(_) | ApiError::BookingRejected(_)
        )
    }

    /// 是否可以重试（网络错误或服务端 5xx）
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Remote(_) => true,
            ApiError::RemoteStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

// ==========================================
// 从 reqwest::Error 转换
// ==========================================
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ApiError::DataShape(err.to_string());
        }
        match err.status() {
            Some(status) => ApiError::RemoteStatus {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => ApiError::Remote(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

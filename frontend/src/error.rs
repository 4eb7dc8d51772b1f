//! 错误类型模块
//!
//! 前端的错误分为三层：
//! - `TransportError`: HTTP 客户端层，请求没有拿到响应
//! - `GatewayError`: 网关层，统一后的 API 调用错误
//! - `RenderError`: 视图层，渲染函数初次加载失败

use thiserror::Error;

/// HTTP 客户端错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// 请求构建失败
    #[error("request build failed: {0}")]
    RequestBuild(String),
    /// 网络请求失败（没有收到任何响应）
    #[error("network error: {0}")]
    Network(String),
    /// 响应体读取失败
    #[error("failed to read response: {0}")]
    ResponseRead(String),
}

/// 网关错误
///
/// 视图只需要区分是否可以就地展示：`SessionExpired` 已由网关处理完毕（会话清除并跳转登录），
/// 其余错误都应在视图内显示消息。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// 401：会话已失效
    #[error("Session expired. Please login again.")]
    SessionExpired,
    /// 其他非 2xx 响应
    #[error("{message}")]
    Api { status: u16, message: String },
    /// 请求未到达服务器
    #[error("Network error: {0}")]
    Network(String),
    /// 请求无法构建，或响应无法读取
    #[error("Request failed: {0}")]
    Transport(String),
    /// 成功响应的 JSON 无法解析
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, GatewayError::SessionExpired)
    }
}

impl From<TransportError> for GatewayError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(message) => GatewayError::Network(message),
            other => GatewayError::Transport(other.to_string()),
        }
    }
}

/// 视图渲染错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// 渲染函数正常结束却没有写入挂载点
    #[error("View rendered no content.")]
    NothingRendered,
}

impl RenderError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, RenderError::Gateway(e) if e.is_session_expired())
    }
}

use async_trait::async_trait;
use loyalty_console_shared::HttpMethod;

use crate::error::TransportError;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 上传的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFile {
    /// 表单字段名
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// 请求体
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HttpBody {
    #[default]
    Empty,
    Text(String),
    /// 单文件的 multipart 表单，边界由客户端实现生成
    Multipart(MultipartFile),
}

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: HttpBody,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: Vec::new(),
            body: HttpBody::Empty,
        }
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: HttpBody) -> Self {
        self.body = body;
        self
    }

    /// 按名称（大小写不敏感）查找请求头
    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: String::new(),
            body: body.into(),
        }
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    /// 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 状态说明，HTTP/2 下浏览器给出的 statusText 为空，退回状态码
    pub fn status_label(&self) -> String {
        if self.status_text.is_empty() {
            self.status.to_string()
        } else {
            self.status_text.clone()
        }
    }
}

/// HTTP 客户端特性 (Trait)
/// (?Send) 是因为浏览器环境下 JS 句柄不是 Send 的
#[async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// 合并请求头：后写入的同名头（大小写不敏感）覆盖先前的值
pub fn merge_headers<I>(base: Vec<(String, String)>, overrides: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut merged = base;
    for (key, value) in overrides {
        match merged.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(slot) => *slot = (key, value),
            None => merged.push((key, value)),
        }
    }
    merged
}

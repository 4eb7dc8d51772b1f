//! 认证 API 网关
//!
//! 所有对后端的调用都经过这里：
//! - 合并默认 JSON 请求头与调用方请求头，存在凭据时附加 `Authorization: Bearer`
//! - 401 统一处理：清除会话、跳转登录、返回 `SessionExpired`
//! - 其他非 2xx 转为 `Api` 错误，消息优先取后端的 `detail`
//!
//! 视图永远不需要自己处理会话过期。

use std::rc::Rc;

use loyalty_console_shared::{
    ApiRequest, CONTENT_TYPE_JSON, ErrorBody, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE,
    HEALTH_PATH, HttpMethod, LoginMode, LoginRequest, LoginResponse, Role,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::GatewayError;
use crate::request::{HttpBody, HttpClient, HttpRequest, HttpResponse, MultipartFile, merge_headers};
use crate::session::{Session, SessionStore};
use crate::web::location::{LOGIN_HASH, Navigator};

const API_ERROR_PREFIX: &str = "API Error";
const UPLOAD_ERROR_PREFIX: &str = "Upload failed";
const LOGIN_FAILED: &str = "Login failed";

/// 调用方的请求选项
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// 网关
pub struct Gateway {
    base_url: String,
    client: Rc<dyn HttpClient>,
    session: Rc<SessionStore>,
    navigator: Rc<dyn Navigator>,
}

impl Gateway {
    pub fn new(
        base_url: impl Into<String>,
        client: Rc<dyn HttpClient>,
        session: Rc<SessionStore>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client,
            session,
            navigator,
        }
    }

    pub fn session(&self) -> &Rc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn auth_header(&self) -> Option<(String, String)> {
        self.session
            .credential()
            .map(|token| (HEADER_AUTHORIZATION.to_string(), format!("Bearer {}", token)))
    }

    /// 通用请求
    ///
    /// 默认 `Content-Type: application/json`，调用方请求头覆盖默认值，
    /// 凭据存在时 `Authorization` 最后写入。
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        let defaults = vec![(
            HEADER_CONTENT_TYPE.to_string(),
            CONTENT_TYPE_JSON.to_string(),
        )];
        let headers = merge_headers(
            merge_headers(defaults, options.headers),
            self.auth_header(),
        );
        let body = options.body.map(HttpBody::Text).unwrap_or_default();

        let req = HttpRequest::new(&self.url(endpoint), options.method)
            .with_headers(headers)
            .with_body(body);

        self.dispatch(endpoint, req, API_ERROR_PREFIX).await
    }

    /// 通用请求并反序列化为具体类型
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        let value = self.request(endpoint, options).await?;
        serde_json::from_value(value).map_err(|e| {
            log_error!("[Gateway] Unexpected response shape from {}: {}", endpoint, e);
            GatewayError::Decode(e.to_string())
        })
    }

    /// 发送一个类型化的端点请求
    pub async fn send<R: ApiRequest>(&self, req: &R) -> Result<R::Response, GatewayError> {
        let mut options = RequestOptions::new(R::METHOD);
        if let Some(body) = req.body() {
            options = options.body(body.to_string());
        }
        self.request_json(&req.path(), options).await
    }

    /// 文件上传（multipart）
    ///
    /// 不设置 `Content-Type`，由客户端实现生成带边界的类型；401 与错误处理与 `request` 相同。
    pub async fn upload(
        &self,
        endpoint: &str,
        file: MultipartFile,
    ) -> Result<Value, GatewayError> {
        let req = HttpRequest::new(&self.url(endpoint), HttpMethod::Post)
            .with_headers(self.auth_header().into_iter().collect())
            .with_body(HttpBody::Multipart(file));

        self.dispatch(endpoint, req, UPLOAD_ERROR_PREFIX).await
    }

    async fn dispatch(
        &self,
        endpoint: &str,
        req: HttpRequest,
        error_prefix: &str,
    ) -> Result<Value, GatewayError> {
        let result = match self.client.send(req).await {
            Ok(resp) => self.interpret(resp, error_prefix),
            Err(e) => Err(GatewayError::from(e)),
        };

        if let Err(err) = &result {
            log_error!("[Gateway] API Request Failed: {}: {}", endpoint, err);
        }
        result
    }

    fn interpret(&self, resp: HttpResponse, error_prefix: &str) -> Result<Value, GatewayError> {
        if resp.status == 401 {
            self.expire_session();
            return Err(GatewayError::SessionExpired);
        }

        if !resp.ok() {
            let message = error_detail(&resp.body)
                .unwrap_or_else(|| format!("{}: {}", error_prefix, resp.status_label()));
            return Err(GatewayError::Api {
                status: resp.status,
                message,
            });
        }

        parse_body(&resp.body)
    }

    /// 会话过期：同一个同步步骤内清除会话并跳转登录
    fn expire_session(&self) {
        log_warn!("[Gateway] Received 401. Clearing session and redirecting to login.");
        self.session.clear();
        self.navigator.assign(LOGIN_HASH);
    }

    /// 登录
    ///
    /// 登录端点的失败（包括 401）只是凭据错误，不走会话过期流程。
    /// 成功后凭据、角色与展示标识一次性写入会话。
    pub async fn login(
        &self,
        mode: LoginMode,
        identifier: &str,
        password: &str,
    ) -> Result<Session, GatewayError> {
        let payload = LoginRequest::new(mode, identifier.to_string(), password.to_string());
        let body = serde_json::to_string(&payload).map_err(|e| GatewayError::Decode(e.to_string()))?;

        let req = HttpRequest::new(&self.url(mode.path()), HttpMethod::Post)
            .with_headers(vec![(
                HEADER_CONTENT_TYPE.to_string(),
                CONTENT_TYPE_JSON.to_string(),
            )])
            .with_body(HttpBody::Text(body));

        let resp = self.client.send(req).await.map_err(|e| {
            log_error!("[Gateway] Login request failed: {}", e);
            GatewayError::from(e)
        })?;

        if !resp.ok() {
            let message = error_detail(&resp.body).unwrap_or_else(|| LOGIN_FAILED.to_string());
            log_warn!("[Gateway] Login rejected ({}): {}", resp.status, message);
            return Err(GatewayError::Api {
                status: resp.status,
                message,
            });
        }

        let data: LoginResponse =
            serde_json::from_str(&resp.body).map_err(|e| GatewayError::Decode(e.to_string()))?;
        if data.access_token.is_empty() {
            return Err(GatewayError::Decode("missing access token".to_string()));
        }
        let role = Role::from_wire(&data.role)
            .ok_or_else(|| GatewayError::Decode(format!("unknown role `{}`", data.role)))?;

        let session = Session::new(data.access_token, role).with_identifier(identifier);
        self.session.set(session.clone());
        Ok(session)
    }

    /// 后端可达性检查
    ///
    /// 不携带凭据，也不触发会话过期处理；结果只用于状态指示。
    pub async fn check_health(&self) -> bool {
        let req = HttpRequest::new(&self.url(HEALTH_PATH), HttpMethod::Get);
        match self.client.send(req).await {
            Ok(resp) => resp.ok(),
            Err(e) => {
                log_warn!("[Gateway] Health check failed: {}", e);
                false
            }
        }
    }
}

fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message())
}

fn parse_body(body: &str) -> Result<Value, GatewayError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))
}

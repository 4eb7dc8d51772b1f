use serde::{Deserialize, Serialize};

pub mod format;
pub mod models;
pub mod protocol;

pub use protocol::{ApiRequest, HttpMethod};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 持久化的访问令牌
pub const STORAGE_TOKEN_KEY: &str = "auth_token";
/// 持久化的角色
pub const STORAGE_ROLE_KEY: &str = "user_role";
/// 持久化的展示标识（用户名或玩家 ID）
pub const STORAGE_IDENTIFIER_KEY: &str = "user_identifier";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

pub const HEALTH_PATH: &str = "/health";

// =========================================================
// 认证模型 (Auth Models)
// =========================================================

/// 会话角色
///
/// 线上格式沿用后端的字符串：运营方为 `"admin"`，玩家为 `"player"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Operator,
    #[serde(rename = "player")]
    Player,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Operator => "admin",
            Role::Player => "player",
        }
    }

    /// 解析后端返回的角色字符串，未知值返回 `None`
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Operator),
            "player" => Some(Role::Player),
            _ => None,
        }
    }
}

/// 登录模式（决定端点与请求体形状）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    #[default]
    Operator,
    Player,
}

impl LoginMode {
    pub fn path(&self) -> &'static str {
        match self {
            LoginMode::Operator => "/api/auth/login/admin",
            LoginMode::Player => "/api/auth/login/user",
        }
    }

    /// 表单中标识字段的标签
    pub fn identifier_label(&self) -> &'static str {
        match self {
            LoginMode::Operator => "Username",
            LoginMode::Player => "Player ID",
        }
    }

    pub fn identifier_placeholder(&self) -> &'static str {
        match self {
            LoginMode::Operator => "Enter your username",
            LoginMode::Player => "Enter your player ID",
        }
    }
}

/// 登录请求体，形状随模式变化
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LoginRequest {
    Operator { username: String, password: String },
    Player { player_id: String, password: String },
}

impl LoginRequest {
    pub fn new(mode: LoginMode, identifier: String, password: String) -> Self {
        match mode {
            LoginMode::Operator => LoginRequest::Operator {
                username: identifier,
                password,
            },
            LoginMode::Player => LoginRequest::Player {
                player_id: identifier,
                password,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub role: String,
}

/// 后端的错误响应体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// 人类可读的错误消息
    ///
    /// `detail` 通常是字符串，校验失败时也可能是结构化数据，此时原样序列化。
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Null | serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        }
    }
}

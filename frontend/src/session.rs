//! 会话模块
//!
//! 管理"是否已登录、以什么角色登录"这一唯一事实来源。
//! `SessionStore` 作为显式的上下文对象注入网关与路由服务，而不是模块级全局状态：
//! - `load`: 初始化，从持久化存储恢复会话
//! - `set` / `clear`: 原子地写入或清除凭据与角色

use std::cell::RefCell;

use loyalty_console_shared::{
    Role, STORAGE_IDENTIFIER_KEY, STORAGE_ROLE_KEY, STORAGE_TOKEN_KEY,
};

/// 持久化键值存储
///
/// 浏览器中由 `localStorage` 实现（按源隔离，刷新后仍在）。
pub trait SessionStorage {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;
}

/// 已认证的会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// 不透明的访问令牌
    pub credential: String,
    pub role: Role,
    /// 登录时输入的用户名或玩家 ID，仅用于展示
    pub identifier: Option<String>,
}

impl Session {
    pub fn new(credential: impl Into<String>, role: Role) -> Self {
        Self {
            credential: credential.into(),
            role,
            identifier: None,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        self.identifier = (!identifier.trim().is_empty()).then_some(identifier);
        self
    }
}

/// 会话存储
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    /// 内存中的会话，是所有读取的来源；凭据与角色在同一个值里，要么都有要么都没有
    current: RefCell<Option<Session>>,
}

impl SessionStore {
    /// 从持久化存储恢复会话
    ///
    /// 只有令牌和合法角色同时存在时才视为已登录；半残缺的记录会被整体清除。
    pub fn load(storage: Box<dyn SessionStorage>) -> Self {
        let token = storage
            .load(STORAGE_TOKEN_KEY)
            .filter(|t| !t.is_empty());
        let role = storage
            .load(STORAGE_ROLE_KEY)
            .and_then(|r| Role::from_wire(&r));

        let current = match (token, role) {
            (Some(credential), Some(role)) => Some(Session {
                credential,
                role,
                identifier: storage.load(STORAGE_IDENTIFIER_KEY),
            }),
            (None, None) => {
                storage.remove(STORAGE_IDENTIFIER_KEY);
                None
            }
            _ => {
                log_warn!("[Session] Discarding incomplete persisted session.");
                Self::wipe(&*storage);
                None
            }
        };

        Self {
            storage,
            current: RefCell::new(current),
        }
    }

    fn wipe(storage: &dyn SessionStorage) {
        storage.remove(STORAGE_TOKEN_KEY);
        storage.remove(STORAGE_ROLE_KEY);
        storage.remove(STORAGE_IDENTIFIER_KEY);
    }

    /// 写入会话
    ///
    /// 空令牌等同于清除。
    pub fn set(&self, session: Session) {
        if session.credential.is_empty() {
            log_warn!("[Session] Refusing to store an empty credential.");
            self.clear();
            return;
        }

        let persisted = self.storage.store(STORAGE_TOKEN_KEY, &session.credential)
            & self.storage.store(STORAGE_ROLE_KEY, session.role.as_str())
            & match session.identifier.as_deref() {
                Some(id) => self.storage.store(STORAGE_IDENTIFIER_KEY, id),
                None => self.storage.remove(STORAGE_IDENTIFIER_KEY),
            };
        if !persisted {
            log_warn!("[Session] Session could not be persisted; it will not survive a reload.");
        }

        *self.current.borrow_mut() = Some(session);
    }

    /// 清除会话，重复调用无副作用
    pub fn clear(&self) {
        Self::wipe(&*self.storage);
        self.current.borrow_mut().take();
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn credential(&self) -> Option<String> {
        self.current
            .borrow()
            .as_ref()
            .map(|s| s.credential.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.current.borrow().as_ref().map(|s| s.role)
    }
}

/// 侧边栏用户信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBadge {
    pub name: String,
    pub role_label: &'static str,
    pub avatar: &'static str,
}

impl UserBadge {
    pub fn from_session(session: &Session) -> Self {
        let (fallback_name, role_label, avatar) = match session.role {
            Role::Operator => ("Admin User", "Super Admin", "A"),
            Role::Player => ("Player User", "Player", "P"),
        };
        Self {
            name: session
                .identifier
                .clone()
                .unwrap_or_else(|| fallback_name.to_string()),
            role_label,
            avatar,
        }
    }
}

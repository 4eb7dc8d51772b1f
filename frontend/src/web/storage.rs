//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 替代 `gloo-storage`，作为会话的持久化后端。

use crate::session::SessionStorage;

/// 浏览器 LocalStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 读取单个键（配置覆盖等会话之外的用途）
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }
}

impl SessionStorage for LocalStorage {
    fn load(&self, key: &str) -> Option<String> {
        Self::get(key)
    }

    /// 存储不可用（隐私模式、配额满）时返回 `false`
    fn store(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn remove(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

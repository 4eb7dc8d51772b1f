//! 地址栏封装模块
//!
//! 路由以 URL 片段（`#/players`）为唯一事实来源。所有对 `window.location` 与
//! `window.history` 的操作都集中在此。

use wasm_bindgen::prelude::*;

/// 登录页的片段
pub const LOGIN_HASH: &str = "/login";
/// 根片段（解析为默认路由）
pub const ROOT_HASH: &str = "/";

/// 导航能力
///
/// 片段均不带前导 `#`。
pub trait Navigator {
    /// 当前片段
    fn current_hash(&self) -> String;
    /// 跳转到新片段，会触发 `hashchange`
    fn assign(&self, hash: &str);
    /// 替换当前历史记录，不触发 `hashchange`
    fn replace(&self, hash: &str);
    /// 整页刷新
    fn reload(&self);
}

/// 浏览器实现
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserLocation;

impl BrowserLocation {
    fn location() -> Option<web_sys::Location> {
        web_sys::window().map(|w| w.location())
    }
}

impl Navigator for BrowserLocation {
    fn current_hash(&self) -> String {
        Self::location()
            .and_then(|l| l.hash().ok())
            .map(|h| h.trim_start_matches('#').to_string())
            .unwrap_or_default()
    }

    fn assign(&self, hash: &str) {
        if let Some(location) = Self::location() {
            let _ = location.set_hash(hash);
        }
    }

    fn replace(&self, hash: &str) {
        if let Some(window) = web_sys::window() {
            if let Ok(history) = window.history() {
                let url = format!("#{}", hash);
                let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&url));
            }
        }
    }

    fn reload(&self) {
        if let Some(location) = Self::location() {
            let _ = location.reload();
        }
    }
}

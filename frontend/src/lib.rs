//! LoyaltyPro 管理控制台前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `session`: 会话存储（凭据 + 角色的唯一事实来源）
//! - `gateway`: 认证 API 网关（统一处理 401）
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `components`: UI 组件层

// =========================================================
// 跨平台日志宏
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info {
    ($($t:tt)*) => (web_sys::console::log_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info {
    ($($t:tt)*) => (println!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_warn {
    ($($t:tt)*) => (web_sys::console::warn_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_warn {
    ($($t:tt)*) => (eprintln!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_error {
    ($($t:tt)*) => (web_sys::console::error_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error {
    ($($t:tt)*) => (eprintln!($($t)*))
}

mod config;
mod error;
mod gateway;
mod request;
mod session;
#[cfg(test)]
mod testing;

mod components {
    pub mod login;
    pub mod shell;
    pub mod views;
}

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    pub mod file;
    mod http;
    pub mod location;
    pub mod route;
    pub mod router;
    mod storage;
    mod timer;

    pub use http::FetchClient;
    pub use storage::LocalStorage;
    pub use timer::Interval;
}

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::login::LoginPage;
use crate::components::shell::{ConsoleContext, ConsoleShell, Screen, ShellState};
use crate::config::AppConfig;
use crate::gateway::Gateway;
use crate::session::SessionStore;
use crate::web::location::{BrowserLocation, Navigator};
use crate::web::router::{RouterService, listen_hash_changes};

#[component]
pub fn App() -> impl IntoView {
    // 1. 配置与会话（刷新后从 LocalStorage 恢复）
    let config = AppConfig::from_browser();
    let session = Rc::new(SessionStore::load(Box::new(web::LocalStorage)));
    let navigator: Rc<dyn Navigator> = Rc::new(BrowserLocation);

    // 2. 网关：会话与导航能力显式注入
    let gateway = Rc::new(Gateway::new(
        config.api_base_url.clone(),
        Rc::new(web::FetchClient),
        session.clone(),
        navigator.clone(),
    ));

    let shell = ShellState::new(if session.is_authenticated() {
        Screen::Console
    } else {
        Screen::Login
    });

    let routes = match components::views::route_table(gateway.clone()) {
        Ok(routes) => routes,
        Err(e) => {
            log_error!("[App] Invalid route table: {}", e);
            return view! {
                <div class="alert alert-error m-8">{format!("Console failed to start: {}", e)}</div>
            }
            .into_any();
        }
    };

    // 3. 路由服务
    let router = Rc::new(RouterService::new(
        routes,
        gateway.clone(),
        navigator,
        Rc::new(shell),
    ));

    provide_context(ConsoleContext {
        router: StoredValue::new_local(router.clone()),
        gateway: StoredValue::new_local(gateway),
        shell,
    });

    // 4. 监听 hashchange，并处理初次加载
    listen_hash_changes(router.clone());
    {
        let router = router.clone();
        spawn_local(async move {
            router.handle_navigation().await;
        });
    }

    // 5. 后端状态：启动时检查一次，之后定时轮询
    {
        let router = router.clone();
        spawn_local(async move {
            router.check_health().await;
        });
    }
    let poll = web::Interval::new(config.health_poll_interval_ms, move || {
        let router = router.clone();
        spawn_local(async move {
            router.check_health().await;
        });
    });
    if poll.is_none() {
        log_warn!("[App] Backend status polling is unavailable.");
    }
    // 与根组件同生命周期
    let _poll = StoredValue::new_local(poll);

    view! {
        <Show
            when=move || shell.screen.get() == Screen::Login
            fallback=|| view! { <ConsoleShell /> }
        >
            <LoginPage />
        </Show>
    }
    .into_any()
}

//! 路由服务模块 - 核心引擎
//!
//! 实现"监听 -> 验证 -> 处理 -> 加载"的导航流程：
//! 1. 每次导航事件都从地址栏重新读取片段
//! 2. 未认证且目标不是登录页时，替换地址为登录页并由登录视图接管整个应用
//! 3. 解析路由表条目，更新侧边栏高亮与页头
//! 4. 挂载点先显示加载态，再调用视图的渲染函数；失败由路由器兜底显示错误面板
//!
//! 挂载点的所有写入都携带导航代次（generation），过期代次的写入会被丢弃，
//! 从而保证慢速的旧视图不会覆盖新视图。

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use super::location::{LOGIN_HASH, Navigator, ROOT_HASH};
use super::route::{RouteKey, RouteTable, Target};
use crate::error::RenderError;
use crate::gateway::Gateway;
use crate::session::{SessionStore, UserBadge};

/// 路由器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Unauthenticated,
    AuthenticatedNoView,
    ViewLoading,
    ViewMounted,
    ViewError,
}

/// 挂载点内容
#[derive(Debug, Clone, PartialEq)]
pub enum MountState<V> {
    Empty,
    /// 加载中的过渡提示
    Loading,
    Ready(V),
    /// 错误面板，携带错误消息
    Failed(String),
}

/// 后端可达性（仅用于状态指示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

/// 应用外壳
///
/// 路由器通过它更新侧边栏、页头与挂载点，对具体的 UI 框架一无所知。
pub trait Shell<V> {
    /// 应用外壳是否存在（登录页接管后为 false，直到整页刷新）
    fn is_present(&self) -> bool;
    /// 登录视图接管整个应用
    fn show_login(&self);
    fn update_chrome(&self, active: RouteKey, title: &str, subtitle: &str);
    fn show_user(&self, badge: Option<UserBadge>);
    fn set_backend_status(&self, status: BackendStatus);
    fn set_mount(&self, state: MountState<V>);
}

/// 借给视图渲染函数的挂载点句柄
pub struct MountPoint<V> {
    shell: Rc<dyn Shell<V>>,
    generation: u64,
    current: Rc<Cell<u64>>,
    /// 本次导航是否已写入视图内容
    rendered: Rc<Cell<bool>>,
}

impl<V> Clone for MountPoint<V> {
    fn clone(&self) -> Self {
        Self {
            shell: self.shell.clone(),
            generation: self.generation,
            current: self.current.clone(),
            rendered: self.rendered.clone(),
        }
    }
}

impl<V> MountPoint<V> {
    /// 句柄是否仍属于当前导航
    pub fn is_current(&self) -> bool {
        self.current.get() == self.generation
    }

    /// 写入视图内容；句柄过期时丢弃并返回 false
    pub fn render(&self, content: V) -> bool {
        let written = self.write(MountState::Ready(content));
        if written {
            self.rendered.set(true);
        }
        written
    }

    fn write(&self, state: MountState<V>) -> bool {
        if !self.is_current() {
            log_info!(
                "[Router] Dropping stale write from navigation #{} (current #{}).",
                self.generation,
                self.current.get()
            );
            return false;
        }
        self.shell.set_mount(state);
        true
    }
}

/// 单次导航的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// 未认证访问受保护页面，已替换为登录页
    RedirectedToLogin,
    /// 未认证访问登录页
    LoginShown,
    /// 应用外壳缺失，已请求整页刷新
    Reloading,
    Mounted(RouteKey),
    Failed { route: RouteKey, message: String },
    /// 渲染期间会话过期
    SessionExpired(RouteKey),
    /// 渲染完成时已有更新的导航
    Superseded(RouteKey),
}

/// 路由器服务
pub struct RouterService<V> {
    routes: RouteTable<V>,
    session: Rc<SessionStore>,
    gateway: Rc<Gateway>,
    navigator: Rc<dyn Navigator>,
    shell: Rc<dyn Shell<V>>,
    state: Cell<RouterState>,
    /// 导航代次，单调递增
    generation: Rc<Cell<u64>>,
}

impl<V: 'static> RouterService<V> {
    pub fn new(
        routes: RouteTable<V>,
        gateway: Rc<Gateway>,
        navigator: Rc<dyn Navigator>,
        shell: Rc<dyn Shell<V>>,
    ) -> Self {
        let session = gateway.session().clone();
        let state = if session.is_authenticated() {
            RouterState::AuthenticatedNoView
        } else {
            RouterState::Unauthenticated
        };

        shell.show_user(session.session().as_ref().map(UserBadge::from_session));

        Self {
            routes,
            session,
            gateway,
            navigator,
            shell,
            state: Cell::new(state),
            generation: Rc::new(Cell::new(0)),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> RouterState {
        self.state.get()
    }

    pub fn routes(&self) -> &RouteTable<V> {
        &self.routes
    }

    /// 使所有已发出的挂载点句柄失效
    fn invalidate(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }

    fn enter_login(&self) {
        self.invalidate();
        self.state.set(RouterState::Unauthenticated);
        self.shell.show_login();
    }

    /// **核心方法：处理一次导航事件（初次加载或 hashchange）**
    pub async fn handle_navigation(&self) -> NavigationOutcome {
        let hash = self.navigator.current_hash();
        let target = Target::from_hash(&hash);

        // --- Step 1: 认证守卫 ---
        if !self.session.is_authenticated() {
            let outcome = if target.is_login() {
                NavigationOutcome::LoginShown
            } else {
                log_warn!("[Router] Access denied for `{}`. Redirecting to login.", hash);
                self.navigator.replace(LOGIN_HASH);
                NavigationOutcome::RedirectedToLogin
            };
            self.enter_login();
            return outcome;
        }

        let route_name = match target {
            Target::Login => {
                log_info!("[Router] Already authenticated. Redirecting to dashboard.");
                self.navigator.replace(ROOT_HASH);
                String::new()
            }
            Target::Console(name) => name,
        };

        // --- Step 2: 外壳缺失时整页刷新，不做局部修复 ---
        if !self.shell.is_present() {
            log_warn!("[Router] Application shell is missing. Reloading.");
            self.invalidate();
            self.navigator.reload();
            return NavigationOutcome::Reloading;
        }

        // --- Step 3: 解析路由并更新页头 ---
        let entry = self.routes.resolve(&route_name);
        let key = entry.key;
        let renderer = entry.renderer.clone();
        self.shell.update_chrome(key, entry.title, entry.subtitle);

        // --- Step 4: 挂载 ---
        let generation = self.invalidate();
        self.state.set(RouterState::ViewLoading);
        self.shell.set_mount(MountState::Loading);

        let mount = MountPoint {
            shell: self.shell.clone(),
            generation,
            current: self.generation.clone(),
            rendered: Rc::new(Cell::new(false)),
        };
        let result = renderer(mount.clone()).await;
        self.finish_mount(key, &mount, result)
    }

    fn finish_mount(
        &self,
        key: RouteKey,
        mount: &MountPoint<V>,
        result: Result<(), RenderError>,
    ) -> NavigationOutcome {
        if !mount.is_current() {
            if let Err(err) = &result {
                log_warn!("[Router] Ignoring failure of superseded `{}` view: {}", key, err);
            }
            return NavigationOutcome::Superseded(key);
        }

        let result = result.and_then(|()| {
            if mount.rendered.get() {
                Ok(())
            } else {
                Err(RenderError::NothingRendered)
            }
        });

        match result {
            Ok(()) => {
                self.state.set(RouterState::ViewMounted);
                NavigationOutcome::Mounted(key)
            }
            Err(err) if err.is_session_expired() && !self.session.is_authenticated() => {
                log_warn!("[Router] Session expired while rendering `{}`.", key);
                self.enter_login();
                NavigationOutcome::SessionExpired(key)
            }
            Err(err) => {
                log_error!("[Router] Render Error in `{}`: {}", key, err);
                let message = err.to_string();
                mount.write(MountState::Failed(message.clone()));
                self.state.set(RouterState::ViewError);
                NavigationOutcome::Failed {
                    route: key,
                    message,
                }
            }
        }
    }

    /// 登录成功后：回到根路径并整页刷新
    pub fn complete_login(&self) {
        if !self.session.is_authenticated() {
            log_warn!("[Router] complete_login called without a session.");
            return;
        }
        self.navigator.replace(ROOT_HASH);
        self.navigator.reload();
    }

    /// 注销：清除会话、跳转登录并整页刷新
    pub fn logout(&self) {
        log_info!("[Router] Logging out.");
        self.session.clear();
        self.invalidate();
        self.state.set(RouterState::Unauthenticated);
        self.navigator.replace(LOGIN_HASH);
        self.navigator.reload();
    }

    /// 刷新后端状态指示
    pub async fn check_health(&self) -> BackendStatus {
        let status = if self.gateway.check_health().await {
            BackendStatus::Online
        } else {
            BackendStatus::Offline
        };
        self.shell.set_backend_status(status);
        status
    }
}

/// 监听 `hashchange`，每次事件都交给路由器处理
pub fn listen_hash_changes<V: 'static>(router: Rc<RouterService<V>>) {
    let closure = Closure::<dyn Fn()>::new(move || {
        let router = router.clone();
        wasm_bindgen_futures::spawn_local(async move {
            router.handle_navigation().await;
        });
    });

    let Some(window) = web_sys::window() else {
        log_error!("[Router] No window; navigation events will not be handled.");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref())
    {
        log_error!("[Router] Failed to listen for hashchange: {:?}", e);
        return;
    }

    // 泄漏闭包以保持监听器存活
    closure.forget();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::RequestOptions;
    use crate::session::Session;
    use crate::testing::{
        MockHttpClient, RecordingNavigator, RecordingShell, authenticated_store, empty_store,
    };
    use crate::web::route::RouteEntry;
    use futures::FutureExt;
    use futures::channel::oneshot;
    use loyalty_console_shared::Role;
    use std::cell::RefCell;

    struct Harness {
        router: Rc<RouterService<String>>,
        shell: Rc<RecordingShell>,
        nav: Rc<RecordingNavigator>,
        client: Rc<MockHttpClient>,
        session: Rc<SessionStore>,
        calls: Rc<RefCell<Vec<RouteKey>>>,
    }

    fn recording_entry(key: RouteKey, calls: &Rc<RefCell<Vec<RouteKey>>>) -> RouteEntry<String> {
        let calls = calls.clone();
        RouteEntry::for_key(key, move |mount: MountPoint<String>| {
            calls.borrow_mut().push(key);
            async move {
                mount.render(format!("{} content", key));
                Ok(())
            }
            .boxed_local()
        })
    }

    fn harness<F>(session: Rc<SessionStore>, hash: &str, overrides: F) -> Harness
    where
        F: FnOnce(&Rc<Gateway>) -> Vec<RouteEntry<String>>,
    {
        let client = Rc::new(MockHttpClient::new());
        let nav = Rc::new(RecordingNavigator::at(hash));
        let shell = Rc::new(RecordingShell::new());
        let gateway = Rc::new(Gateway::new(
            "http://api.test",
            client.clone(),
            session.clone(),
            nav.clone(),
        ));
        let calls = Rc::new(RefCell::new(Vec::new()));

        let mut custom = overrides(&gateway);
        let mut builder = RouteTable::builder(RouteKey::Dashboard);
        for key in RouteKey::ALL {
            builder = match custom.iter().position(|e| e.key == key) {
                Some(i) => builder.route(custom.remove(i)),
                None => builder.route(recording_entry(key, &calls)),
            };
        }

        let router = Rc::new(RouterService::new(
            builder.build().unwrap(),
            gateway,
            nav.clone(),
            shell.clone(),
        ));

        Harness {
            router,
            shell,
            nav,
            client,
            session,
            calls,
        }
    }

    fn no_overrides(_: &Rc<Gateway>) -> Vec<RouteEntry<String>> {
        Vec::new()
    }

    #[tokio::test]
    async fn unauthenticated_access_redirects_to_login_without_rendering() {
        let h = harness(empty_store(), "/players", no_overrides);

        let outcome = h.router.handle_navigation().await;

        assert_eq!(outcome, NavigationOutcome::RedirectedToLogin);
        assert_eq!(h.nav.current_hash(), "/login");
        assert_eq!(h.nav.log(), vec!["replace:/login".to_string()]);
        assert_eq!(h.shell.login_shown(), 1);
        assert_eq!(h.router.state(), RouterState::Unauthenticated);
        assert!(h.calls.borrow().is_empty());
        assert!(h.client.requests().is_empty());
        assert_eq!(h.shell.mount(), MountState::Empty);
    }

    #[tokio::test]
    async fn every_protected_target_is_gated() {
        for key in RouteKey::ALL {
            let h = harness(empty_store(), &key.to_hash(), no_overrides);
            assert_eq!(
                h.router.handle_navigation().await,
                NavigationOutcome::RedirectedToLogin
            );
            assert!(h.calls.borrow().is_empty());
        }
        let h = harness(empty_store(), "", no_overrides);
        assert_eq!(
            h.router.handle_navigation().await,
            NavigationOutcome::RedirectedToLogin
        );
    }

    #[tokio::test]
    async fn login_route_renders_login_takeover() {
        let h = harness(empty_store(), "/login", no_overrides);

        assert_eq!(
            h.router.handle_navigation().await,
            NavigationOutcome::LoginShown
        );
        assert!(h.nav.log().is_empty());
        assert_eq!(h.shell.login_shown(), 1);
        assert!(!h.shell.is_present());
    }

    #[tokio::test]
    async fn authenticated_navigation_mounts_the_matched_view() {
        let h = harness(authenticated_store("tok"), "/players", no_overrides);
        assert_eq!(h.router.state(), RouterState::AuthenticatedNoView);

        let outcome = h.router.handle_navigation().await;

        assert_eq!(outcome, NavigationOutcome::Mounted(RouteKey::Players));
        assert_eq!(
            h.shell.chrome(),
            Some((
                RouteKey::Players,
                "Player Management".to_string(),
                "View and manage player profiles".to_string()
            ))
        );
        assert_eq!(*h.calls.borrow(), vec![RouteKey::Players]);
        assert_eq!(
            h.shell.mount_history(),
            vec![
                MountState::Loading,
                MountState::Ready("players content".to_string())
            ]
        );
        assert_eq!(h.router.state(), RouterState::ViewMounted);
    }

    #[tokio::test]
    async fn sub_path_resolves_by_prefix() {
        let h = harness(authenticated_store("tok"), "/players/123", no_overrides);
        assert_eq!(
            h.router.handle_navigation().await,
            NavigationOutcome::Mounted(RouteKey::Players)
        );
    }

    #[tokio::test]
    async fn unknown_and_root_paths_fall_back_to_dashboard() {
        for hash in ["/settings", "/", ""] {
            let h = harness(authenticated_store("tok"), hash, no_overrides);
            assert_eq!(
                h.router.handle_navigation().await,
                NavigationOutcome::Mounted(RouteKey::Dashboard)
            );
            assert_eq!(h.shell.chrome().unwrap().1, "Dashboard");
        }
    }

    #[tokio::test]
    async fn failing_renderer_is_replaced_by_error_panel() {
        let h = harness(authenticated_store("tok"), "/tiers", |_| {
            vec![RouteEntry::for_key(RouteKey::Tiers, |_mount| {
                async {
                    Err(RenderError::from(GatewayError::Api {
                        status: 500,
                        message: "tiers unavailable".into(),
                    }))
                }
                .boxed_local()
            })]
        });

        let outcome = h.router.handle_navigation().await;

        assert_eq!(
            outcome,
            NavigationOutcome::Failed {
                route: RouteKey::Tiers,
                message: "tiers unavailable".into()
            }
        );
        assert_eq!(
            h.shell.mount(),
            MountState::Failed("tiers unavailable".into())
        );
        assert_eq!(h.router.state(), RouterState::ViewError);

        // 出错后仍可继续导航
        h.nav.set("/rules");
        assert_eq!(
            h.router.handle_navigation().await,
            NavigationOutcome::Mounted(RouteKey::Rules)
        );
        assert_eq!(h.router.state(), RouterState::ViewMounted);
    }

    #[tokio::test]
    async fn renderer_that_writes_nothing_gets_the_error_panel() {
        let h = harness(authenticated_store("tok"), "/promotions", |_| {
            vec![RouteEntry::for_key(RouteKey::Promotions, |_mount| {
                async { Ok(()) }.boxed_local()
            })]
        });

        let outcome = h.router.handle_navigation().await;

        assert_eq!(
            outcome,
            NavigationOutcome::Failed {
                route: RouteKey::Promotions,
                message: "View rendered no content.".into()
            }
        );
        assert_eq!(
            h.shell.mount_history(),
            vec![
                MountState::Loading,
                MountState::Failed("View rendered no content.".into())
            ]
        );
        assert_eq!(h.router.state(), RouterState::ViewError);
    }

    #[tokio::test]
    async fn api_failures_inside_views_are_contained() {
        let h = harness(authenticated_store("tok"), "/rules", |gateway| {
            let gateway = gateway.clone();
            vec![RouteEntry::for_key(RouteKey::Rules, move |_mount| {
                let gateway = gateway.clone();
                async move {
                    gateway
                        .request("/api/admin/rules", RequestOptions::default())
                        .await?;
                    Ok::<(), RenderError>(())
                }
                .boxed_local()
            })]
        });
        h.client.respond(503, r#"{"detail":"Rules engine offline"}"#);

        let outcome = h.router.handle_navigation().await;

        assert_eq!(
            h.shell.mount(),
            MountState::Failed("Rules engine offline".into())
        );
        assert!(matches!(outcome, NavigationOutcome::Failed { .. }));
        assert!(h.session.is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_response_during_render_logs_out() {
        let h = harness(authenticated_store("tok"), "/players", |gateway| {
            let gateway = gateway.clone();
            vec![RouteEntry::for_key(RouteKey::Players, move |mount| {
                let gateway = gateway.clone();
                async move {
                    let players = gateway
                        .request("/api/admin/players", RequestOptions::default())
                        .await?;
                    mount.render(players.to_string());
                    Ok::<(), RenderError>(())
                }
                .boxed_local()
            })]
        });
        h.client.respond(401, "");

        let outcome = h.router.handle_navigation().await;

        assert_eq!(outcome, NavigationOutcome::SessionExpired(RouteKey::Players));
        assert!(!h.session.is_authenticated());
        assert_eq!(h.session.role(), None);
        assert_eq!(h.nav.current_hash(), "/login");
        assert_eq!(h.nav.log(), vec!["assign:/login".to_string()]);
        assert_eq!(h.shell.login_shown(), 1);
        assert_eq!(h.router.state(), RouterState::Unauthenticated);

        // hashchange 随后到达：仍停留在登录页，不再重复跳转
        assert_eq!(
            h.router.handle_navigation().await,
            NavigationOutcome::LoginShown
        );
        assert_eq!(h.nav.log(), vec!["assign:/login".to_string()]);
    }

    #[tokio::test]
    async fn late_results_from_superseded_navigation_are_discarded() {
        let (release, wait) = oneshot::channel::<()>();
        let wait = Rc::new(RefCell::new(Some(wait)));
        let h = harness(authenticated_store("tok"), "/analytics", move |_| {
            vec![RouteEntry::for_key(RouteKey::Analytics, move |mount| {
                let wait = wait.borrow_mut().take();
                async move {
                    if let Some(wait) = wait {
                        let _ = wait.await;
                    }
                    mount.render("stale analytics".to_string());
                    Err(RenderError::NothingRendered)
                }
                .boxed_local()
            })]
        });

        let mut slow = Box::pin(h.router.handle_navigation());
        assert!(futures::poll!(slow.as_mut()).is_pending());
        assert_eq!(h.shell.mount(), MountState::Loading);

        h.nav.set("/wallet");
        assert_eq!(
            h.router.handle_navigation().await,
            NavigationOutcome::Mounted(RouteKey::Wallet)
        );

        release.send(()).unwrap();
        assert_eq!(slow.await, NavigationOutcome::Superseded(RouteKey::Analytics));

        assert_eq!(
            h.shell.mount(),
            MountState::Ready("wallet content".to_string())
        );
        assert_eq!(h.router.state(), RouterState::ViewMounted);
        assert_eq!(h.shell.chrome().unwrap().0, RouteKey::Wallet);
    }

    #[tokio::test]
    async fn missing_shell_forces_reload() {
        let h = harness(authenticated_store("tok"), "/players", no_overrides);
        h.shell.set_present(false);

        assert_eq!(
            h.router.handle_navigation().await,
            NavigationOutcome::Reloading
        );
        assert_eq!(h.nav.log(), vec!["reload".to_string()]);
        assert!(h.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn authenticated_visit_to_login_goes_to_dashboard() {
        let h = harness(authenticated_store("tok"), "/login", no_overrides);

        assert_eq!(
            h.router.handle_navigation().await,
            NavigationOutcome::Mounted(RouteKey::Dashboard)
        );
        assert_eq!(h.nav.log(), vec!["replace:/".to_string()]);
        assert_eq!(h.shell.login_shown(), 0);
    }

    #[tokio::test]
    async fn logout_clears_session_and_reloads_on_login() {
        let h = harness(authenticated_store("tok"), "/players", no_overrides);
        h.router.handle_navigation().await;

        h.router.logout();

        assert!(!h.session.is_authenticated());
        assert_eq!(h.router.state(), RouterState::Unauthenticated);
        assert_eq!(
            h.nav.log(),
            vec!["replace:/login".to_string(), "reload".to_string()]
        );
    }

    #[tokio::test]
    async fn complete_login_reloads_only_with_a_session() {
        let h = harness(empty_store(), "/login", no_overrides);
        h.router.complete_login();
        assert!(h.nav.log().is_empty());

        h.session.set(Session::new("tok", Role::Player));
        h.router.complete_login();
        assert_eq!(
            h.nav.log(),
            vec!["replace:/".to_string(), "reload".to_string()]
        );
    }

    #[tokio::test]
    async fn user_badge_is_shown_from_session() {
        let h = harness(authenticated_store("tok"), "/", no_overrides);
        assert_eq!(h.shell.user().unwrap().name, "admin");

        let h = harness(empty_store(), "/", no_overrides);
        assert_eq!(h.shell.user(), None);
    }

    #[tokio::test]
    async fn health_check_only_touches_the_indicator() {
        let h = harness(authenticated_store("tok"), "/", no_overrides);
        h.client.respond(200, "{}");
        assert_eq!(h.router.check_health().await, BackendStatus::Online);
        assert_eq!(h.shell.backend(), BackendStatus::Online);

        h.client.fail(crate::error::TransportError::Network("down".into()));
        assert_eq!(h.router.check_health().await, BackendStatus::Offline);
        assert_eq!(h.shell.backend(), BackendStatus::Offline);
        assert!(h.session.is_authenticated());
        assert!(h.nav.log().is_empty());
    }
}

//! 应用外壳：侧边栏、页头、状态指示与视图挂载点
//!
//! `ShellState` 是一组信号，路由器通过 `Shell` 特性写入，组件只负责读取。

use std::rc::Rc;

use leptos::prelude::*;

use crate::gateway::Gateway;
use crate::session::UserBadge;
use crate::web::route::RouteKey;
use crate::web::router::{BackendStatus, MountState, RouterService, Shell};

/// 当前占据整个页面的界面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Console,
    /// 登录视图接管，外壳已卸载
    Login,
}

#[derive(Clone, Copy)]
pub struct ShellState {
    pub screen: RwSignal<Screen>,
    pub active: RwSignal<Option<RouteKey>>,
    pub title: RwSignal<String>,
    pub subtitle: RwSignal<String>,
    pub user: RwSignal<Option<UserBadge>>,
    pub backend: RwSignal<BackendStatus>,
    pub mount: RwSignal<MountState<ViewFn>>,
}

impl ShellState {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen: RwSignal::new(screen),
            active: RwSignal::new(None),
            title: RwSignal::new(String::new()),
            subtitle: RwSignal::new(String::new()),
            user: RwSignal::new(None),
            backend: RwSignal::new(BackendStatus::Unknown),
            mount: RwSignal::new(MountState::Empty),
        }
    }
}

impl Shell<ViewFn> for ShellState {
    fn is_present(&self) -> bool {
        self.screen.get_untracked() == Screen::Console
    }

    fn show_login(&self) {
        self.mount.set(MountState::Empty);
        self.screen.set(Screen::Login);
    }

    fn update_chrome(&self, active: RouteKey, title: &str, subtitle: &str) {
        self.active.set(Some(active));
        self.title.set(title.to_string());
        self.subtitle.set(subtitle.to_string());
    }

    fn show_user(&self, badge: Option<UserBadge>) {
        self.user.set(badge);
    }

    fn set_backend_status(&self, status: BackendStatus) {
        self.backend.set(status);
    }

    fn set_mount(&self, state: MountState<ViewFn>) {
        self.mount.set(state);
    }
}

/// 控制台上下文
///
/// 非 `Send` 的服务以 `StoredValue::new_local` 持有，组件按需取出。
#[derive(Clone, Copy)]
pub struct ConsoleContext {
    pub router: StoredValue<Rc<RouterService<ViewFn>>, LocalStorage>,
    pub gateway: StoredValue<Rc<Gateway>, LocalStorage>,
    pub shell: ShellState,
}

pub fn use_console() -> ConsoleContext {
    use_context::<ConsoleContext>().expect("ConsoleContext should be provided by App")
}

fn nav_label(key: RouteKey) -> (&'static str, &'static str) {
    match key {
        RouteKey::Dashboard => ("📊", "Dashboard"),
        RouteKey::Players => ("👥", "Players"),
        RouteKey::Rules => ("⚙️", "Reward Rules"),
        RouteKey::Tiers => ("🏆", "Tiers"),
        RouteKey::Wallet => ("💰", "Wallet"),
        RouteKey::Analytics => ("📈", "Analytics"),
        RouteKey::Redemption => ("🎁", "Redemption"),
        RouteKey::Promotions => ("📣", "Promotions"),
        RouteKey::AiCampaigns => ("🧠", "AI Campaigns"),
    }
}

#[component]
pub fn ConsoleShell() -> impl IntoView {
    let ctx = use_console();
    let shell = ctx.shell;

    // 侧边栏顺序与路由表声明顺序一致
    let keys: Vec<RouteKey> = ctx
        .router
        .with_value(|router| router.routes().entries().map(|e| e.key).collect());

    let on_logout = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        ctx.router.with_value(|router| router.logout());
    };

    view! {
        <div class="app-container flex min-h-screen bg-base-200 font-sans">
            <aside class="sidebar w-64 shrink-0 bg-base-100 shadow-xl flex flex-col">
                <div class="p-6 text-2xl font-bold">
                    "✨ Loyalty" <span class="text-primary">"Pro"</span>
                </div>
                <nav class="sidebar-nav flex-1">
                    <ul class="menu w-full">
                        {keys
                            .into_iter()
                            .map(|key| {
                                let (icon, label) = nav_label(key);
                                view! {
                                    <li>
                                        <a
                                            href=format!("#{}", key.to_hash())
                                            data-view=key.as_str()
                                            class=move || {
                                                if shell.active.get() == Some(key) {
                                                    "nav-item active"
                                                } else {
                                                    "nav-item"
                                                }
                                            }
                                        >
                                            <span class="icon">{icon}</span>
                                            {label}
                                        </a>
                                    </li>
                                }
                            })
                            .collect_view()}
                        <li>
                            <a href="#" class="nav-item logout-item text-error" on:click=on_logout>
                                <span class="icon">"🚪"</span>
                                "Logout"
                            </a>
                        </li>
                    </ul>
                </nav>
                <UserInfo />
            </aside>

            <main class="main-content flex-1 p-4 md:p-8 space-y-6 overflow-x-hidden">
                <header class="flex items-center justify-between">
                    <div>
                        <h1 class="text-3xl font-bold">{move || shell.title.get()}</h1>
                        <p class="text-base-content/70">{move || shell.subtitle.get()}</p>
                    </div>
                    <StatusIndicator />
                </header>
                <section id="app">
                    <MountOutlet />
                </section>
            </main>
        </div>
    }
}

#[component]
fn UserInfo() -> impl IntoView {
    let user = use_console().shell.user;

    view! {
        <Show when=move || user.with(Option::is_some)>
            {move || {
                user.get()
                    .map(|badge| {
                        view! {
                            <div class="user-info flex items-center gap-3 p-4 border-t border-base-200">
                                <div class="avatar placeholder">
                                    <div class="bg-primary text-primary-content rounded-full w-10">
                                        <span>{badge.avatar}</span>
                                    </div>
                                </div>
                                <div>
                                    <div class="name font-semibold">{badge.name}</div>
                                    <div class="role text-xs text-base-content/60">{badge.role_label}</div>
                                </div>
                            </div>
                        }
                    })
            }}
        </Show>
    }
}

#[component]
fn StatusIndicator() -> impl IntoView {
    let backend = use_console().shell.backend;

    view! {
        <div class=move || match backend.get() {
            BackendStatus::Online => "status-indicator online badge badge-success gap-2 p-3",
            BackendStatus::Offline => "status-indicator offline badge badge-error gap-2 p-3",
            BackendStatus::Unknown => "status-indicator badge badge-ghost gap-2 p-3",
        }>
            <span class="dot"></span>
            {move || match backend.get() {
                BackendStatus::Online => "Backend Online",
                BackendStatus::Offline => "Backend Offline",
                BackendStatus::Unknown => "Checking Backend...",
            }}
        </div>
    }
}

/// 视图挂载点：加载态、已挂载视图或错误面板，同一时刻只有一个
#[component]
fn MountOutlet() -> impl IntoView {
    let mount = use_console().shell.mount;

    move || match mount.get() {
        MountState::Empty => ().into_any(),
        MountState::Loading => view! {
            <div class="loading-state flex flex-col items-center justify-center py-16 gap-4">
                <span class="loading loading-spinner loading-lg text-primary"></span>
                <p>"Loading view..."</p>
            </div>
        }
        .into_any(),
        MountState::Ready(content) => content.run(),
        MountState::Failed(message) => view! {
            <div class="card bg-base-100 border border-error text-error shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Error Loading View"</h3>
                    <p>{message}</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

//! 测试替身：HTTP 客户端、地址栏与应用外壳

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use loyalty_console_shared::Role;

use crate::error::TransportError;
use crate::request::{HttpClient, HttpRequest, HttpResponse};
use crate::session::{Session, SessionStorage, SessionStore, UserBadge};
use crate::web::location::Navigator;
use crate::web::route::RouteKey;
use crate::web::router::{BackendStatus, MountState, Shell};

/// 按顺序返回预置响应，并记录收到的请求
#[derive(Default)]
pub struct MockHttpClient {
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.respond_with(HttpResponse::new(status, body));
    }

    pub fn respond_with(&self, response: HttpResponse) {
        self.responses.borrow_mut().push_back(Ok(response));
    }

    pub fn fail(&self, err: TransportError) {
        self.responses.borrow_mut().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(req);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no mock response".into())))
    }
}

/// 记录导航动作的地址栏
pub struct RecordingNavigator {
    hash: RefCell<String>,
    log: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn at(hash: &str) -> Self {
        Self {
            hash: RefCell::new(hash.to_string()),
            log: RefCell::new(Vec::new()),
        }
    }

    /// 模拟用户修改地址栏（不记入日志）
    pub fn set(&self, hash: &str) {
        *self.hash.borrow_mut() = hash.to_string();
    }

    /// 形如 `assign:/login`、`replace:/`、`reload`
    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_hash(&self) -> String {
        self.hash.borrow().clone()
    }

    fn assign(&self, hash: &str) {
        self.set(hash);
        self.log.borrow_mut().push(format!("assign:{}", hash));
    }

    fn replace(&self, hash: &str) {
        self.set(hash);
        self.log.borrow_mut().push(format!("replace:{}", hash));
    }

    fn reload(&self) {
        self.log.borrow_mut().push("reload".to_string());
    }
}

/// 内存中的键值存储
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let storage = Self::new();
        storage.items.borrow_mut().extend(
            items
                .into_iter()
                .map(|(k, v)| (k.into(), v.into())),
        );
        storage
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> bool {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&self, key: &str) -> bool {
        self.items.borrow_mut().remove(key);
        true
    }
}

impl<S: SessionStorage + ?Sized> SessionStorage for Rc<S> {
    fn load(&self, key: &str) -> Option<String> {
        (**self).load(key)
    }

    fn store(&self, key: &str, value: &str) -> bool {
        (**self).store(key, value)
    }

    fn remove(&self, key: &str) -> bool {
        (**self).remove(key)
    }
}

pub fn empty_store() -> Rc<SessionStore> {
    Rc::new(SessionStore::load(Box::new(MemoryStorage::new())))
}

pub fn authenticated_store(token: &str) -> Rc<SessionStore> {
    let store = empty_store();
    store.set(Session::new(token, Role::Operator).with_identifier("admin"));
    store
}

/// 记录路由器写入的应用外壳
pub struct RecordingShell {
    present: Cell<bool>,
    login_shown: Cell<usize>,
    chrome: RefCell<Option<(RouteKey, String, String)>>,
    user: RefCell<Option<UserBadge>>,
    backend: Cell<BackendStatus>,
    mounts: RefCell<Vec<MountState<String>>>,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self {
            present: Cell::new(true),
            login_shown: Cell::new(0),
            chrome: RefCell::new(None),
            user: RefCell::new(None),
            backend: Cell::new(BackendStatus::Unknown),
            mounts: RefCell::new(Vec::new()),
        }
    }

    pub fn set_present(&self, present: bool) {
        self.present.set(present);
    }

    pub fn login_shown(&self) -> usize {
        self.login_shown.get()
    }

    pub fn chrome(&self) -> Option<(RouteKey, String, String)> {
        self.chrome.borrow().clone()
    }

    pub fn user(&self) -> Option<UserBadge> {
        self.user.borrow().clone()
    }

    pub fn backend(&self) -> BackendStatus {
        self.backend.get()
    }

    /// 当前挂载点内容
    pub fn mount(&self) -> MountState<String> {
        self.mounts
            .borrow()
            .last()
            .cloned()
            .unwrap_or(MountState::Empty)
    }

    pub fn mount_history(&self) -> Vec<MountState<String>> {
        self.mounts.borrow().clone()
    }
}

impl Shell<String> for RecordingShell {
    fn is_present(&self) -> bool {
        self.present.get()
    }

    fn show_login(&self) {
        self.present.set(false);
        self.login_shown.set(self.login_shown.get() + 1);
    }

    fn update_chrome(&self, active: RouteKey, title: &str, subtitle: &str) {
        *self.chrome.borrow_mut() = Some((active, title.to_string(), subtitle.to_string()));
    }

    fn show_user(&self, badge: Option<UserBadge>) {
        *self.user.borrow_mut() = badge;
    }

    fn set_backend_status(&self, status: BackendStatus) {
        self.backend.set(status);
    }

    fn set_mount(&self, state: MountState<String>) {
        self.mounts.borrow_mut().push(state);
    }
}

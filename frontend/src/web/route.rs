//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了控制台的路由键、片段解析以及路由表的最长前缀匹配。

use std::collections::HashSet;
use std::fmt::Display;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use thiserror::Error;

use super::router::MountPoint;
use crate::error::RenderError;

/// 路由键（与侧边栏 `data-view`、片段路径一致的稳定字符串）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKey {
    Dashboard,
    Players,
    Rules,
    Tiers,
    Wallet,
    Analytics,
    Redemption,
    Promotions,
    AiCampaigns,
}

impl RouteKey {
    #[cfg(test)]
    pub const ALL: [RouteKey; 9] = [
        RouteKey::Dashboard,
        RouteKey::Players,
        RouteKey::Rules,
        RouteKey::Tiers,
        RouteKey::Wallet,
        RouteKey::Analytics,
        RouteKey::Redemption,
        RouteKey::Promotions,
        RouteKey::AiCampaigns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKey::Dashboard => "dashboard",
            RouteKey::Players => "players",
            RouteKey::Rules => "rules",
            RouteKey::Tiers => "tiers",
            RouteKey::Wallet => "wallet",
            RouteKey::Analytics => "analytics",
            RouteKey::Redemption => "redemption",
            RouteKey::Promotions => "promotions",
            RouteKey::AiCampaigns => "ai-campaigns",
        }
    }

    /// 页头标题
    pub fn title(&self) -> &'static str {
        match self {
            RouteKey::Dashboard => "Dashboard",
            RouteKey::Players => "Player Management",
            RouteKey::Rules => "Reward Rules",
            RouteKey::Tiers => "Tiers & Benefits",
            RouteKey::Wallet => "Wallet Simulator",
            RouteKey::Analytics => "Analytics",
            RouteKey::Redemption => "Redemption Rules",
            RouteKey::Promotions => "Promotional Engine",
            RouteKey::AiCampaigns => "🧠 AI Campaign Generator",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            RouteKey::Dashboard => "Overview of program performance",
            RouteKey::Players => "View and manage player profiles",
            RouteKey::Rules => "Configure loyalty logic and conditions",
            RouteKey::Tiers => "Manage loyalty levels and perks",
            RouteKey::Wallet => "Test transactions and balance updates",
            RouteKey::Analytics => "Deep dive into program data",
            RouteKey::Redemption => "Manage point-to-value conversion",
            RouteKey::Promotions => "Manage time-bound, targeted campaigns",
            RouteKey::AiCampaigns => "One-click campaign creation powered by Google Gemini",
        }
    }

    /// 对应的片段，如 `/players`
    pub fn to_hash(&self) -> String {
        format!("/{}", self.as_str())
    }
}

impl Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 导航目标（由片段解析得到，每次导航都重新解析，不缓存）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 登录页
    Login,
    /// 控制台内的路由名，如 `players/123`；空字符串表示根路径
    Console(String),
}

impl Target {
    /// 解析 URL 片段
    ///
    /// - 空片段等同 `/`
    /// - 只有 `/login` 精确匹配登录页
    /// - 其余去掉前导 `/` 作为路由名
    pub fn from_hash(hash: &str) -> Self {
        let hash = hash.trim_start_matches('#');
        let hash = if hash.is_empty() { "/" } else { hash };

        if hash == super::location::LOGIN_HASH {
            return Target::Login;
        }

        let name = hash.strip_prefix('/').unwrap_or(hash);
        Target::Console(name.to_string())
    }

    pub fn is_login(&self) -> bool {
        matches!(self, Target::Login)
    }
}

/// 渲染函数：接收挂载点，返回初次绘制完成的 future
pub type Renderer<V> = Rc<dyn Fn(MountPoint<V>) -> LocalBoxFuture<'static, Result<(), RenderError>>>;

/// 路由条目
pub struct RouteEntry<V> {
    pub key: RouteKey,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub renderer: Renderer<V>,
}

impl<V> RouteEntry<V> {
    pub fn new<F>(key: RouteKey, title: &'static str, subtitle: &'static str, renderer: F) -> Self
    where
        F: Fn(MountPoint<V>) -> LocalBoxFuture<'static, Result<(), RenderError>> + 'static,
    {
        Self {
            key,
            title,
            subtitle,
            renderer: Rc::new(renderer),
        }
    }

    /// 使用路由键自带的标题与副标题
    pub fn for_key<F>(key: RouteKey, renderer: F) -> Self
    where
        F: Fn(MountPoint<V>) -> LocalBoxFuture<'static, Result<(), RenderError>> + 'static,
    {
        Self::new(key, key.title(), key.subtitle(), renderer)
    }
}

impl<V> Clone for RouteEntry<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            title: self.title,
            subtitle: self.subtitle,
            renderer: self.renderer.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("duplicate route key `{0}`")]
    DuplicateKey(RouteKey),
    #[error("default route `{0}` is not registered")]
    MissingDefault(RouteKey),
}

/// 路由表构建器
pub struct RouteTableBuilder<V> {
    default: RouteKey,
    entries: Vec<RouteEntry<V>>,
}

impl<V> RouteTableBuilder<V> {
    pub fn route(mut self, entry: RouteEntry<V>) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn build(self) -> Result<RouteTable<V>, RouteTableError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.key) {
                return Err(RouteTableError::DuplicateKey(entry.key));
            }
        }
        if !seen.contains(&self.default) {
            return Err(RouteTableError::MissingDefault(self.default));
        }

        Ok(RouteTable {
            default: self.default,
            entries: self.entries,
        })
    }
}

/// 最长前缀匹配，返回命中键的下标
///
/// 所有是 `route_name` 前缀的键中取最长者；等长时取先声明的。
pub fn longest_prefix<'k, I>(route_name: &str, keys: I) -> Option<usize>
where
    I: IntoIterator<Item = &'k str>,
{
    let mut best: Option<(usize, usize)> = None;
    for (index, key) in keys.into_iter().enumerate() {
        if !route_name.starts_with(key) {
            continue;
        }
        if best.is_none_or(|(_, len)| key.len() > len) {
            best = Some((index, key.len()));
        }
    }
    best.map(|(index, _)| index)
}

/// 静态路由表，启动后不可变
pub struct RouteTable<V> {
    default: RouteKey,
    entries: Vec<RouteEntry<V>>,
}

impl<V> RouteTable<V> {
    pub fn builder(default: RouteKey) -> RouteTableBuilder<V> {
        RouteTableBuilder {
            default,
            entries: Vec::new(),
        }
    }

    /// 最长前缀匹配
    ///
    /// 路由名以某个键开头即视为匹配，多个键匹配时取最长的；都不匹配返回 `None`。
    pub fn match_prefix(&self, route_name: &str) -> Option<&RouteEntry<V>> {
        longest_prefix(route_name, self.entries.iter().map(|e| e.key.as_str()))
            .map(|i| &self.entries[i])
    }

    /// 解析路由名，未匹配时回退到默认路由
    pub fn resolve(&self, route_name: &str) -> &RouteEntry<V> {
        self.match_prefix(route_name)
            .unwrap_or_else(|| self.default_entry())
    }

    pub fn default_entry(&self) -> &RouteEntry<V> {
        // build() 已保证默认路由存在
        self.get(self.default).unwrap_or(&self.entries[0])
    }

    pub fn get(&self, key: RouteKey) -> Option<&RouteEntry<V>> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// 按声明顺序遍历（侧边栏使用）
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry<V>> {
        self.entries.iter()
    }
}

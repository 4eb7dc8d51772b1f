//! 控制台视图
//!
//! 每个路由键对应一个渲染函数：通过网关拉取初始数据，成功后把视图写入挂载点。
//! 初始数据失败直接返回错误，由路由器显示错误面板；会话过期已由网关处理。

mod analytics;
mod campaigns;
mod dashboard;
mod players;
mod promotions;
mod redemption;
mod rules;
mod tiers;
mod wallet;

use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use leptos::prelude::*;
use serde_json::Value;

use crate::error::RenderError;
use crate::gateway::Gateway;
use crate::web::route::{RouteEntry, RouteKey, RouteTable, RouteTableError};
use crate::web::router::MountPoint;

fn entry<F, Fut>(gateway: &Rc<Gateway>, key: RouteKey, render: F) -> RouteEntry<ViewFn>
where
    F: Fn(Rc<Gateway>, MountPoint<ViewFn>) -> Fut + 'static,
    Fut: Future<Output = Result<(), RenderError>> + 'static,
{
    let gateway = gateway.clone();
    RouteEntry::for_key(key, move |mount| render(gateway.clone(), mount).boxed_local())
}

/// 控制台路由表，声明顺序即侧边栏顺序
pub fn route_table(gateway: Rc<Gateway>) -> Result<RouteTable<ViewFn>, RouteTableError> {
    RouteTable::builder(RouteKey::Dashboard)
        .route(entry(&gateway, RouteKey::Dashboard, dashboard::render))
        .route(entry(&gateway, RouteKey::Players, players::render))
        .route(entry(&gateway, RouteKey::Rules, rules::render))
        .route(entry(&gateway, RouteKey::Tiers, tiers::render))
        .route(entry(&gateway, RouteKey::Wallet, wallet::render))
        .route(entry(&gateway, RouteKey::Analytics, analytics::render))
        .route(entry(&gateway, RouteKey::Redemption, redemption::render))
        .route(entry(&gateway, RouteKey::Promotions, promotions::render))
        .route(entry(&gateway, RouteKey::AiCampaigns, campaigns::render))
        .build()
}

/// JSON 配置块的展示文本
fn pretty_json(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// 表格内的单行提示
fn message_row(colspan: u32, text: String) -> AnyView {
    view! {
        <tr>
            <td colspan=colspan class="text-center py-8 text-base-content/50">{text}</td>
        </tr>
    }
    .into_any()
}

/// 操作结果提示，`(消息, 是否出错)`
fn notice_view(notice: RwSignal<Option<(String, bool)>>) -> impl IntoView {
    move || {
        notice.get().map(|(text, is_err)| {
            let class = if is_err {
                "alert alert-error shadow"
            } else {
                "alert alert-success shadow"
            };
            view! {
                <div role="alert" class=class>
                    <span>{text}</span>
                </div>
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_json_marks_missing_config() {
        assert_eq!(pretty_json(&Value::Null), "-");
        assert_eq!(pretty_json(&json!({"a": 1})), "{\n  \"a\": 1\n}");
    }
}

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use loyalty_console_shared::format::active_badge_class;
use loyalty_console_shared::models::RewardRule;
use loyalty_console_shared::protocol::{ListRulesRequest, ToggleRuleRequest};

use super::{message_row, notice_view, pretty_json};
use crate::components::shell::use_console;
use crate::error::{GatewayError, RenderError};
use crate::gateway::Gateway;
use crate::web::router::MountPoint;

pub async fn render(gateway: Rc<Gateway>, mount: MountPoint<ViewFn>) -> Result<(), RenderError> {
    let rules = load_rules(&gateway).await?;
    mount.render(ViewFn::from(move || {
        view! { <RulesPanel initial=rules.clone() /> }.into_any()
    }));
    Ok(())
}

/// 按优先级从高到低
fn sort_by_priority(rules: &mut [RewardRule]) {
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
}

async fn load_rules(gateway: &Gateway) -> Result<Vec<RewardRule>, GatewayError> {
    let mut rules = gateway.send(&ListRulesRequest).await?;
    sort_by_priority(&mut rules);
    Ok(rules)
}

#[component]
fn RulesPanel(initial: Vec<RewardRule>) -> impl IntoView {
    let ctx = use_console();
    let rules = RwSignal::new(initial);
    let notice = RwSignal::new(Option::<(String, bool)>::None);

    let toggle = move |rule_id: String, is_active: bool| {
        let gateway = ctx.gateway.get_value();
        notice.set(None);
        spawn_local(async move {
            let request = ToggleRuleRequest {
                rule_id,
                is_active: !is_active,
            };
            let result = match gateway.send(&request).await {
                Ok(_) => load_rules(&gateway).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(list) => rules.set(list),
                Err(e) if e.is_session_expired() => {}
                Err(e) => notice.set(Some((format!("Error updating rule: {}", e), true))),
            }
        });
    };

    view! {
        <div class="space-y-4">
            {notice_view(notice)}
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <h3 class="card-title p-6 pb-2">"Reward Rules"</h3>
                    <div class="overflow-x-auto w-full">
                        <table class="table w-full">
                            <thead>
                                <tr>
                                    <th>"Priority"</th>
                                    <th>"Rule Name"</th>
                                    <th>"Description"</th>
                                    <th>"Conditions"</th>
                                    <th>"Reward"</th>
                                    <th>"Status"</th>
                                    <th>"Actions"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {move || {
                                    rules.with(|list| {
                                        if list.is_empty() {
                                            return message_row(7, "No rules defined.".to_string());
                                        }
                                        list.iter()
                                            .map(|rule| {
                                                let rule_id = rule.rule_id.clone();
                                                let is_active = rule.is_active;
                                                view! {
                                                    <tr>
                                                        <td class="font-semibold">{rule.priority}</td>
                                                        <td>
                                                            <div>{rule.name.clone()}</div>
                                                            <div class="text-xs text-base-content/60">{rule.rule_id.clone()}</div>
                                                        </td>
                                                        <td class="max-w-xs text-sm">
                                                            {rule.description.clone().unwrap_or_else(|| "-".to_string())}
                                                        </td>
                                                        <td><pre class="text-xs bg-base-200 p-1 rounded">{pretty_json(&rule.conditions)}</pre></td>
                                                        <td><pre class="text-xs bg-base-200 p-1 rounded">{pretty_json(&rule.reward_config)}</pre></td>
                                                        <td>
                                                            <span class=active_badge_class(is_active)>
                                                                {if is_active { "Active" } else { "Inactive" }}
                                                            </span>
                                                        </td>
                                                        <td>
                                                            <button
                                                                class="btn btn-sm btn-outline"
                                                                on:click=move |_| toggle(rule_id.clone(), is_active)
                                                            >
                                                                {if is_active { "Disable" } else { "Enable" }}
                                                            </button>
                                                        </td>
                                                    </tr>
                                                }
                                            })
                                            .collect_view()
                                            .into_any()
                                    })
                                }}
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_listed_highest_priority_first() {
        let mut rules: Vec<RewardRule> = [5, 50, 10]
            .into_iter()
            .map(|priority| RewardRule {
                priority,
                ..Default::default()
            })
            .collect();
        sort_by_priority(&mut rules);
        let order: Vec<i64> = rules.iter().map(|r| r.priority).collect();
        assert_eq!(order, vec![50, 10, 5]);
    }
}

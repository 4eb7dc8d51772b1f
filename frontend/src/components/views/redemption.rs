use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use loyalty_console_shared::format::group_thousands;
use loyalty_console_shared::models::RedemptionRule;
use loyalty_console_shared::protocol::{
    ExpirePointsRequest, ListRedemptionRulesRequest, RedeemPointsRequest,
};
use serde_json::Value;

use super::notice_view;
use crate::components::shell::use_console;
use crate::error::RenderError;
use crate::gateway::Gateway;
use crate::web::router::MountPoint;

pub async fn render(gateway: Rc<Gateway>, mount: MountPoint<ViewFn>) -> Result<(), RenderError> {
    let rules = gateway.send(&ListRedemptionRulesRequest).await?;
    mount.render(ViewFn::from(move || {
        view! { <RedemptionPanel rules=rules.clone() /> }.into_any()
    }));
    Ok(())
}

/// 规则 `id` 在下拉框中的取值（数字或字符串 id 都转成文本）
fn rule_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 按下拉框取值找回规则，构造兑换请求；只有启用的规则可用
fn redeem_request(
    rules: &[RedemptionRule],
    player_id: &str,
    key: &str,
) -> Result<RedeemPointsRequest, &'static str> {
    let player_id = player_id.trim();
    if player_id.is_empty() {
        return Err("Please enter a player ID.");
    }
    let rule = rules
        .iter()
        .find(|r| r.is_active && rule_key(&r.id) == key)
        .ok_or("Please select a redemption rule.")?;
    Ok(RedeemPointsRequest {
        player_id: player_id.to_string(),
        rule_id: rule.id.clone(),
    })
}

#[component]
fn RedemptionPanel(rules: Vec<RedemptionRule>) -> impl IntoView {
    let ctx = use_console();
    let notice = RwSignal::new(Option::<(String, bool)>::None);
    let player_id = RwSignal::new(String::new());
    let rule_choice = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let options = rules
        .iter()
        .filter(|r| r.is_active)
        .map(|r| {
            let label = format!(
                "{} ({} LP -> ${})",
                r.name,
                group_thousands(r.lp_cost),
                group_thousands(r.currency_value)
            );
            view! { <option value=rule_key(&r.id)>{label}</option> }
        })
        .collect_view();

    let cards = if rules.is_empty() {
        view! {
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body text-center text-base-content/60">
                    "No redemption rules configured yet."
                </div>
            </div>
        }
        .into_any()
    } else {
        view! {
            <div class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-3 gap-6">
                {rules.iter().map(rule_card).collect_view()}
            </div>
        }
        .into_any()
    };

    let rules = StoredValue::new(rules);

    let on_redeem = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let request = match rules.with_value(|list| {
            redeem_request(list, &player_id.get_untracked(), &rule_choice.get_untracked())
        }) {
            Ok(request) => request,
            Err(msg) => {
                notice.set(Some((msg.to_string(), true)));
                return;
            }
        };

        busy.set(true);
        notice.set(Some(("Processing redemption...".to_string(), false)));
        let gateway = ctx.gateway.get_value();
        spawn_local(async move {
            match gateway.send(&request).await {
                Ok(receipt) => notice.set(Some((format!("Success! {}", receipt.describe()), false))),
                Err(e) if e.is_session_expired() => {}
                Err(e) => notice.set(Some((e.to_string(), true))),
            }
            busy.set(false);
        });
    };

    let on_expire = move |_| {
        busy.set(true);
        notice.set(Some(("Running expiry job...".to_string(), false)));
        let gateway = ctx.gateway.get_value();
        spawn_local(async move {
            match gateway.send(&ExpirePointsRequest).await {
                Ok(job) => notice.set(Some((
                    job.message.unwrap_or_else(|| "Expiry job completed.".to_string()),
                    false,
                ))),
                Err(e) if e.is_session_expired() => {}
                Err(e) => notice.set(Some((e.to_string(), true))),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="space-y-6">
            {notice_view(notice)}
            {cards}
            <div class="grid grid-cols-1 xl:grid-cols-2 gap-6">
                <div class="card bg-base-100 shadow-xl">
                    <form class="card-body" on:submit=on_redeem>
                        <h3 class="card-title">"Redeem Points"</h3>
                        <input
                            type="text"
                            placeholder="Player ID"
                            class="input input-bordered w-full"
                            prop:value=move || player_id.get()
                            on:input=move |ev| player_id.set(event_target_value(&ev))
                        />
                        <select
                            class="select select-bordered w-full"
                            on:change=move |ev| rule_choice.set(event_target_value(&ev))
                        >
                            <option value="">"Select a rule..."</option>
                            {options}
                        </select>
                        <button class="btn btn-primary" disabled=move || busy.get()>"Redeem"</button>
                    </form>
                </div>
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Point Expiry"</h3>
                        <p class="text-base-content/70">
                            "Expire loyalty points that have passed their validity window."
                        </p>
                        <button
                            class="btn btn-warning"
                            disabled=move || busy.get()
                            on:click=on_expire
                        >
                            "Run Expiry Job"
                        </button>
                    </div>
                </div>
            </div>
        </div>
    }
}

fn rule_card(rule: &RedemptionRule) -> AnyView {
    let (badge, label) = if rule.is_active {
        ("badge badge-success", "Active")
    } else {
        ("badge badge-neutral", "Inactive")
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex items-center justify-between">
                    <h3 class="card-title">{rule.name.clone()}</h3>
                    <span class=badge>{label}</span>
                </div>
                <p class="text-base-content/70">
                    {rule.description.clone().unwrap_or_else(|| "No description".to_string())}
                </p>
                <div class="grid grid-cols-3 gap-2 text-sm">
                    <div>
                        <div class="text-base-content/60">"Cost:"</div>
                        <div class="font-semibold">{format!("{} LP", group_thousands(rule.lp_cost))}</div>
                    </div>
                    <div>
                        <div class="text-base-content/60">"Value:"</div>
                        <div class="font-semibold">{format!("${}", group_thousands(rule.currency_value))}</div>
                    </div>
                    <div>
                        <div class="text-base-content/60">"Destination:"</div>
                        <div class="font-semibold">{rule.target_balance.clone()}</div>
                    </div>
                </div>
            </div>
        </div>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(id: Value, is_active: bool) -> RedemptionRule {
        RedemptionRule {
            id,
            name: "Cashback".into(),
            is_active,
            ..Default::default()
        }
    }

    #[test]
    fn rule_keys_match_select_values() {
        assert_eq!(rule_key(&json!(7)), "7");
        assert_eq!(rule_key(&json!("R-7")), "R-7");
    }

    #[test]
    fn redeem_sends_the_listed_rule_id() {
        let rules = vec![rule(json!(3), true), rule(json!(4), false)];

        let request = redeem_request(&rules, " P-1 ", "3").unwrap();
        assert_eq!(request.player_id, "P-1");
        assert_eq!(request.rule_id, json!(3));

        assert_eq!(
            redeem_request(&rules, "P-1", "4").unwrap_err(),
            "Please select a redemption rule."
        );
        assert_eq!(
            redeem_request(&rules, "", "3").unwrap_err(),
            "Please enter a player ID."
        );
    }
}

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use loyalty_console_shared::format::{format_date, group_thousands};
use loyalty_console_shared::models::AiCampaign;
use loyalty_console_shared::protocol::{
    ApproveCampaignRequest, DeleteCampaignRequest, GenerateCampaignRequest, KillCampaignRequest,
    ListAiCampaignsRequest,
};
use serde_json::Value;

use super::{message_row, notice_view};
use crate::components::shell::use_console;
use crate::error::{GatewayError, RenderError};
use crate::gateway::Gateway;
use crate::web::router::MountPoint;

const DEFAULT_MAX_BUDGET: &str = "1000000";

pub async fn render(gateway: Rc<Gateway>, mount: MountPoint<ViewFn>) -> Result<(), RenderError> {
    let campaigns = gateway.send(&ListAiCampaignsRequest).await?;
    mount.render(ViewFn::from(move || {
        view! { <CampaignsPanel initial=campaigns.clone() /> }.into_any()
    }));
    Ok(())
}

/// 成功概率分档
fn probability_class(probability: f64) -> &'static str {
    if probability >= 80.0 {
        "text-success"
    } else if probability >= 60.0 {
        "text-warning"
    } else {
        "text-error"
    }
}

/// 单个活动上的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CampaignAction {
    Approve,
    Delete,
    Kill,
}

impl CampaignAction {
    fn label(self) -> &'static str {
        match self {
            CampaignAction::Approve => "Approve",
            CampaignAction::Delete => "Delete",
            CampaignAction::Kill => "Kill",
        }
    }

    fn button_class(self) -> &'static str {
        match self {
            CampaignAction::Approve => "btn btn-xs btn-success",
            CampaignAction::Delete => "btn btn-xs btn-outline btn-error",
            CampaignAction::Kill => "btn btn-xs btn-error",
        }
    }

    fn done_message(self) -> &'static str {
        match self {
            CampaignAction::Approve => "Campaign approved and launched successfully!",
            CampaignAction::Delete => "Campaign deleted.",
            CampaignAction::Kill => "Campaign killed successfully!",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            CampaignAction::Approve => "approve",
            CampaignAction::Delete => "delete",
            CampaignAction::Kill => "kill",
        }
    }
}

/// 草稿可批准或删除，运行中的活动只能终止
fn actions_for(status: &str) -> &'static [CampaignAction] {
    match status.to_ascii_uppercase().as_str() {
        "DRAFT" => &[CampaignAction::Approve, CampaignAction::Delete],
        "ACTIVE" => &[CampaignAction::Kill],
        _ => &[],
    }
}

/// 预算输入：正数，允许千分位逗号
fn parse_budget(input: &str) -> Result<f64, &'static str> {
    match input.trim().replace(',', "").parse::<f64>() {
        Ok(budget) if budget > 0.0 && budget.is_finite() => Ok(budget),
        _ => Err("Max budget must be a positive number."),
    }
}

async fn perform(
    gateway: &Gateway,
    action: CampaignAction,
    campaign_id: String,
    reason: String,
) -> Result<Value, GatewayError> {
    match action {
        CampaignAction::Approve => gateway.send(&ApproveCampaignRequest { campaign_id }).await,
        CampaignAction::Delete => gateway.send(&DeleteCampaignRequest { campaign_id }).await,
        CampaignAction::Kill => {
            gateway
                .send(&KillCampaignRequest {
                    campaign_id,
                    reason,
                })
                .await
        }
    }
}

#[component]
fn CampaignsPanel(initial: Vec<AiCampaign>) -> impl IntoView {
    let ctx = use_console();
    let campaigns = RwSignal::new(initial);
    let notice = RwSignal::new(Option::<(String, bool)>::None);
    let intent = RwSignal::new(String::new());
    let max_budget = RwSignal::new(DEFAULT_MAX_BUDGET.to_string());
    let kill_reason = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let reload = move |gateway: Rc<Gateway>| async move {
        match gateway.send(&ListAiCampaignsRequest).await {
            Ok(list) => campaigns.set(list),
            Err(e) if e.is_session_expired() => {}
            Err(e) => notice.set(Some((format!("Error loading campaigns: {}", e), true))),
        }
    };

    let on_generate = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = intent.get().trim().to_string();
        if text.is_empty() {
            notice.set(Some(("Describe what the campaign should achieve.".to_string(), true)));
            return;
        }
        let budget = match parse_budget(&max_budget.get()) {
            Ok(budget) => budget,
            Err(msg) => {
                notice.set(Some((msg.to_string(), true)));
                return;
            }
        };

        busy.set(true);
        notice.set(None);
        let gateway = ctx.gateway.get_value();
        spawn_local(async move {
            let request = GenerateCampaignRequest {
                intent: text,
                max_budget: budget,
            };
            match gateway.send(&request).await {
                Ok(campaign) => {
                    log_info!("[Campaigns] Generated draft {}", campaign.campaign_id);
                    notice.set(Some((
                        format!(
                            "Campaign \"{}\" generated as a draft. Review and approve it below.",
                            campaign.campaign_name
                        ),
                        false,
                    )));
                    intent.set(String::new());
                    reload(gateway).await;
                }
                Err(e) if e.is_session_expired() => {}
                Err(e) => notice.set(Some((format!("Generation Failed: {}", e), true))),
            }
            busy.set(false);
        });
    };

    let act = move |action: CampaignAction, campaign_id: String| {
        let reason = kill_reason.get().trim().to_string();
        if action == CampaignAction::Kill && reason.is_empty() {
            notice.set(Some((
                "Enter a reason before killing a campaign.".to_string(),
                true,
            )));
            return;
        }

        busy.set(true);
        notice.set(None);
        let gateway = ctx.gateway.get_value();
        spawn_local(async move {
            match perform(&gateway, action, campaign_id, reason).await {
                Ok(_) => {
                    notice.set(Some((action.done_message().to_string(), false)));
                    if action == CampaignAction::Kill {
                        kill_reason.set(String::new());
                    }
                    reload(gateway).await;
                }
                Err(e) if e.is_session_expired() => {}
                Err(e) => notice.set(Some((
                    format!("Failed to {} campaign: {}", action.verb(), e),
                    true,
                ))),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="space-y-4">
            {notice_view(notice)}

            <div class="card bg-base-100 shadow-xl">
                <form class="card-body" on:submit=on_generate>
                    <h3 class="card-title">"✨ Generate a Campaign"</h3>
                    <textarea
                        class="textarea textarea-bordered w-full"
                        rows="3"
                        placeholder="e.g. Re-engage VIP players who have not deposited in 30 days"
                        prop:value=move || intent.get()
                        on:input=move |ev| intent.set(event_target_value(&ev))
                    ></textarea>
                    <div class="flex flex-wrap items-end gap-4">
                        <label class="form-control w-56">
                            <span class="label-text">"Max Budget"</span>
                            <input
                                type="text"
                                inputmode="decimal"
                                class="input input-bordered input-sm"
                                prop:value=move || max_budget.get()
                                on:input=move |ev| max_budget.set(event_target_value(&ev))
                            />
                        </label>
                        <button class="btn btn-primary btn-sm" disabled=move || busy.get()>
                            {move || if busy.get() { "Working..." } else { "Generate" }}
                        </button>
                    </div>
                </form>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                        <h3 class="card-title">"Generated Campaigns"</h3>
                        <input
                            type="text"
                            class="input input-bordered input-sm w-72"
                            placeholder="Kill reason"
                            prop:value=move || kill_reason.get()
                            on:input=move |ev| kill_reason.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="overflow-x-auto w-full">
                        <table class="table w-full">
                            <thead>
                                <tr>
                                    <th>"Campaign"</th>
                                    <th>"Status"</th>
                                    <th>"Success Prediction"</th>
                                    <th>"Target Segment"</th>
                                    <th>"Generated"</th>
                                    <th>"Actions"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {move || {
                                    campaigns.with(|list| {
                                        if list.is_empty() {
                                            return message_row(
                                                6,
                                                "No AI campaigns generated yet.".to_string(),
                                            );
                                        }
                                        list.iter()
                                            .map(|campaign| campaign_row(campaign, busy, act))
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

fn campaign_row(
    campaign: &AiCampaign,
    busy: RwSignal<bool>,
    act: impl Fn(CampaignAction, String) + Copy + 'static,
) -> AnyView {
    let prediction = campaign.success_prediction.clone().unwrap_or_default();
    let buttons = actions_for(&campaign.status)
        .iter()
        .map(|&action| {
            let campaign_id = campaign.campaign_id.clone();
            view! {
                <button
                    class=action.button_class()
                    disabled=move || busy.get()
                    on:click=move |_| act(action, campaign_id.clone())
                >
                    {action.label()}
                </button>
            }
        })
        .collect_view();

    view! {
        <tr>
            <td>
                <div class="font-semibold">{campaign.campaign_name.clone()}</div>
                <div class="text-xs text-base-content/60">{campaign.campaign_id.clone()}</div>
            </td>
            <td>
                <span class=format!("badge badge-{}", campaign.status.to_lowercase())>
                    {campaign.status.clone()}
                </span>
            </td>
            <td>
                <div class=format!("font-bold {}", probability_class(prediction.probability_percent))>
                    {format!("{}%", prediction.probability_percent)}
                </div>
                <div class="text-xs text-base-content/60">
                    {format!(
                        "Cost ${} · NGR ${}",
                        group_thousands(prediction.projected_cost),
                        group_thousands(prediction.projected_ngr),
                    )}
                </div>
            </td>
            <td><code class="text-xs">{campaign.target_segment_logic.clone()}</code></td>
            <td>{format_date(campaign.generated_at.as_deref())}</td>
            <td><div class="flex gap-1">{buttons}</div></td>
        </tr>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockHttpClient, RecordingNavigator, authenticated_store};
    use loyalty_console_shared::HttpMethod;

    #[test]
    fn probability_bands() {
        assert_eq!(probability_class(85.0), "text-success");
        assert_eq!(probability_class(60.0), "text-warning");
        assert_eq!(probability_class(12.5), "text-error");
    }

    #[test]
    fn actions_follow_campaign_status() {
        assert_eq!(
            actions_for("DRAFT"),
            &[CampaignAction::Approve, CampaignAction::Delete]
        );
        assert_eq!(actions_for("active"), &[CampaignAction::Kill]);
        assert!(actions_for("KILLED").is_empty());
        assert!(actions_for("").is_empty());
    }

    #[test]
    fn budget_must_be_positive() {
        assert_eq!(parse_budget(" 1,000,000 "), Ok(1_000_000.0));
        assert_eq!(parse_budget("2500.5"), Ok(2500.5));
        assert!(parse_budget("0").is_err());
        assert!(parse_budget("-5").is_err());
        assert!(parse_budget("lots").is_err());
    }

    #[tokio::test]
    async fn actions_hit_their_endpoints() {
        let client = Rc::new(MockHttpClient::new());
        client.respond(200, "{}");
        client.respond(200, "{}");
        client.respond(204, "");
        let gateway = Gateway::new(
            "http://api.test",
            client.clone(),
            authenticated_store("tok"),
            Rc::new(RecordingNavigator::at("/ai-campaigns")),
        );

        perform(&gateway, CampaignAction::Approve, "C-1".into(), String::new())
            .await
            .unwrap();
        perform(&gateway, CampaignAction::Kill, "C-2".into(), "over budget".into())
            .await
            .unwrap();
        perform(&gateway, CampaignAction::Delete, "C-3".into(), String::new())
            .await
            .unwrap();

        let sent: Vec<(HttpMethod, String)> = client
            .requests()
            .into_iter()
            .map(|r| (r.method, r.url))
            .collect();
        assert_eq!(
            sent,
            vec![
                (
                    HttpMethod::Post,
                    "http://api.test/api/v1/ai-campaigns/C-1/approve".to_string()
                ),
                (
                    HttpMethod::Post,
                    "http://api.test/api/v1/ai-campaigns/C-2/kill?reason=over%20budget".to_string()
                ),
                (
                    HttpMethod::Delete,
                    "http://api.test/api/v1/ai-campaigns/C-3".to_string()
                ),
            ]
        );
    }
}

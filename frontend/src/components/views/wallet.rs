use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use loyalty_console_shared::format::{format_currency, format_date};
use loyalty_console_shared::models::{Player, Transaction};
use loyalty_console_shared::protocol::{
    AddBonusRequest, AddLoyaltyPointsRequest, ListPlayersRequest, PlayerTransactionsRequest,
};

use super::notice_view;
use crate::components::shell::use_console;
use crate::error::{GatewayError, RenderError};
use crate::gateway::Gateway;
use crate::web::router::MountPoint;

pub async fn render(gateway: Rc<Gateway>, mount: MountPoint<ViewFn>) -> Result<(), RenderError> {
    let players = gateway.send(&ListPlayersRequest).await?;
    mount.render(ViewFn::from(move || {
        view! { <WalletPanel players=players.clone() /> }.into_any()
    }));
    Ok(())
}

/// 交易列表的加载状态
#[derive(Debug, Clone, PartialEq)]
enum Lookup {
    Idle,
    Loading,
    Loaded(Vec<Transaction>),
    Failed(String),
}

/// 入账类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreditKind {
    LoyaltyPoints,
    Bonus,
}

impl CreditKind {
    fn from_value(value: &str) -> Self {
        match value {
            "BONUS" => CreditKind::Bonus,
            _ => CreditKind::LoyaltyPoints,
        }
    }
}

/// 表单原始输入
#[derive(Debug, Clone, Default)]
struct CreditForm {
    amount: String,
    wagering_requirement: String,
    expiry_hours: String,
    description: String,
}

#[derive(Debug)]
enum Credit {
    Points(AddLoyaltyPointsRequest),
    Bonus(AddBonusRequest),
}

impl CreditForm {
    fn new() -> Self {
        Self {
            wagering_requirement: "1".to_string(),
            expiry_hours: "24".to_string(),
            ..Default::default()
        }
    }

    /// 校验输入并构造请求；积分只能是整数
    fn to_credit(&self, kind: CreditKind, player_id: &str) -> Result<Credit, &'static str> {
        if player_id.is_empty() {
            return Err("Please select a player");
        }
        let description = Some(self.description.trim().to_string()).filter(|d| !d.is_empty());

        match kind {
            CreditKind::LoyaltyPoints => {
                let amount = self
                    .amount
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|a| *a >= 1)
                    .ok_or("Loyalty points must be a whole number of at least 1.")?;
                Ok(Credit::Points(AddLoyaltyPointsRequest {
                    player_id: player_id.to_string(),
                    amount,
                    description,
                }))
            }
            CreditKind::Bonus => {
                let amount = self
                    .amount
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|a| *a > 0.0 && a.is_finite())
                    .ok_or("Bonus amount must be a positive number.")?;
                let wagering_requirement = self
                    .wagering_requirement
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|w| *w >= 1.0 && w.is_finite())
                    .ok_or("Wagering requirement must be at least 1.")?;
                let expiry_hours = self
                    .expiry_hours
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|h| *h >= 1)
                    .ok_or("Expiry must be at least 1 hour.")?;
                Ok(Credit::Bonus(AddBonusRequest {
                    player_id: player_id.to_string(),
                    amount,
                    wagering_requirement,
                    expiry_hours,
                    description,
                }))
            }
        }
    }
}

async fn submit_credit(gateway: &Gateway, credit: Credit) -> Result<(), GatewayError> {
    match credit {
        Credit::Points(req) => gateway.send(&req).await.map(drop),
        Credit::Bonus(req) => gateway.send(&req).await.map(drop),
    }
}

#[component]
fn WalletPanel(players: Vec<Player>) -> impl IntoView {
    let ctx = use_console();
    let lookup = RwSignal::new(Lookup::Idle);
    // 快速切换玩家时只保留最后一次查询的结果
    let selected = RwSignal::new(String::new());
    let kind = RwSignal::new(CreditKind::LoyaltyPoints);
    let form = RwSignal::new(CreditForm::new());
    let notice = RwSignal::new(Option::<(String, bool)>::None);
    let submitting = RwSignal::new(false);

    let load_transactions = move |player_id: String| {
        if player_id.is_empty() {
            lookup.set(Lookup::Idle);
            return;
        }

        lookup.set(Lookup::Loading);
        let gateway = ctx.gateway.get_value();
        spawn_local(async move {
            let result = gateway
                .send(&PlayerTransactionsRequest {
                    player_id: player_id.clone(),
                })
                .await;
            if selected.get_untracked() != player_id {
                return;
            }
            match result {
                Ok(txs) => lookup.set(Lookup::Loaded(txs)),
                Err(e) if e.is_session_expired() => {}
                Err(e) => lookup.set(Lookup::Failed(e.to_string())),
            }
        });
    };

    let on_select = move |ev: leptos::ev::Event| {
        let player_id = event_target_value(&ev);
        selected.set(player_id.clone());
        load_transactions(player_id);
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let player_id = selected.get_untracked();
        let credit = match form.with_untracked(|f| f.to_credit(kind.get_untracked(), &player_id)) {
            Ok(credit) => credit,
            Err(msg) => {
                notice.set(Some((msg.to_string(), true)));
                return;
            }
        };

        submitting.set(true);
        notice.set(None);
        let gateway = ctx.gateway.get_value();
        spawn_local(async move {
            match submit_credit(&gateway, credit).await {
                Ok(()) => {
                    notice.set(Some(("Transaction Successful!".to_string(), false)));
                    form.set(CreditForm::new());
                    load_transactions(player_id);
                }
                Err(e) if e.is_session_expired() => {}
                Err(e) => notice.set(Some((format!("Transaction Failed: {}", e), true))),
            }
            submitting.set(false);
        });
    };

    view! {
        <div class="space-y-4">
            {notice_view(notice)}
            <div class="grid grid-cols-1 xl:grid-cols-2 gap-6">
                <div class="card bg-base-100 shadow-xl">
                    <form class="card-body" on:submit=on_submit>
                        <h3 class="card-title">"Credit Player Wallet"</h3>
                        <select class="select select-bordered w-full" on:change=on_select>
                            <option value="">"-- Select Player --"</option>
                            {players
                                .into_iter()
                                .map(|p| {
                                    let label = format!("{} ({})", p.player_id, p.tier);
                                    view! { <option value=p.player_id>{label}</option> }
                                })
                                .collect_view()}
                        </select>
                        <select
                            class="select select-bordered w-full"
                            on:change=move |ev| kind.set(CreditKind::from_value(&event_target_value(&ev)))
                        >
                            <option value="LP">"Loyalty Points (LP)"</option>
                            <option value="BONUS">"Bonus Cash"</option>
                        </select>
                        <input
                            type="number"
                            min="1"
                            step="0.01"
                            placeholder="Amount"
                            class="input input-bordered w-full"
                            prop:value=move || form.with(|f| f.amount.clone())
                            on:input=move |ev| form.update(|f| f.amount = event_target_value(&ev))
                        />
                        <Show when=move || kind.get() == CreditKind::Bonus>
                            <div class="grid grid-cols-2 gap-2 rounded bg-base-200 p-3">
                                <label class="form-control">
                                    <span class="label-text">"Wagering Requirement (Multiplier)"</span>
                                    <input
                                        type="number"
                                        min="1"
                                        class="input input-bordered input-sm"
                                        prop:value=move || form.with(|f| f.wagering_requirement.clone())
                                        on:input=move |ev| {
                                            form.update(|f| f.wagering_requirement = event_target_value(&ev))
                                        }
                                    />
                                </label>
                                <label class="form-control">
                                    <span class="label-text">"Expiry (Hours)"</span>
                                    <input
                                        type="number"
                                        min="1"
                                        class="input input-bordered input-sm"
                                        prop:value=move || form.with(|f| f.expiry_hours.clone())
                                        on:input=move |ev| {
                                            form.update(|f| f.expiry_hours = event_target_value(&ev))
                                        }
                                    />
                                </label>
                            </div>
                        </Show>
                        <input
                            type="text"
                            placeholder="e.g. Manual Adjustment"
                            class="input input-bordered w-full"
                            prop:value=move || form.with(|f| f.description.clone())
                            on:input=move |ev| form.update(|f| f.description = event_target_value(&ev))
                        />
                        <button class="btn btn-primary w-full" disabled=move || submitting.get()>
                            {move || if submitting.get() { "Processing..." } else { "Process Transaction" }}
                        </button>
                    </form>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Transaction History"</h3>
                        <div class="max-h-96 overflow-y-auto">
                            {move || match lookup.get() {
                                Lookup::Idle => view! {
                                    <p class="italic text-base-content/60">"Select a player to view transactions."</p>
                                }
                                .into_any(),
                                Lookup::Loading => view! { <span class="loading loading-spinner"></span> }.into_any(),
                                Lookup::Failed(msg) => view! { <p class="text-error">{format!("Error: {}", msg)}</p> }.into_any(),
                                Lookup::Loaded(txs) if txs.is_empty() => view! { <p>"No transactions found."</p> }.into_any(),
                                Lookup::Loaded(txs) => txs.iter().map(transaction_item).collect_view().into_any(),
                            }}
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}

fn transaction_item(tx: &Transaction) -> AnyView {
    let amount_class = if tx.amount < 0.0 {
        "font-semibold text-error"
    } else {
        "font-semibold text-success"
    };

    view! {
        <div class="flex items-center justify-between border-b border-base-200 py-2">
            <div>
                <div class="font-medium">{tx.transaction_type.clone()}</div>
                <div class="text-xs text-base-content/60">
                    {format_date(tx.created_at.as_deref())}
                    {tx.description.clone().map(|d| format!(" · {}", d))}
                </div>
            </div>
            <div class=amount_class>{format_currency(tx.amount, &tx.currency_type)}</div>
        </div>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockHttpClient, RecordingNavigator, authenticated_store};
    use crate::request::HttpBody;

    fn form(amount: &str) -> CreditForm {
        CreditForm {
            amount: amount.to_string(),
            ..CreditForm::new()
        }
    }

    #[test]
    fn player_must_be_selected() {
        let err = form("100").to_credit(CreditKind::LoyaltyPoints, "").unwrap_err();
        assert_eq!(err, "Please select a player");
    }

    #[test]
    fn loyalty_points_are_whole_numbers() {
        assert!(form("12.5").to_credit(CreditKind::LoyaltyPoints, "P-1").is_err());
        assert!(form("0").to_credit(CreditKind::LoyaltyPoints, "P-1").is_err());

        match form(" 250 ").to_credit(CreditKind::LoyaltyPoints, "P-1").unwrap() {
            Credit::Points(req) => {
                assert_eq!(req.amount, 250);
                assert_eq!(req.description, None);
            }
            other => panic!("unexpected credit {:?}", other),
        }
    }

    #[test]
    fn bonus_uses_wagering_and_expiry_defaults() {
        let mut input = form("12.5");
        input.description = "  Goodwill ".to_string();
        match input.to_credit(CreditKind::Bonus, "P-1").unwrap() {
            Credit::Bonus(req) => {
                assert_eq!(req.amount, 12.5);
                assert_eq!(req.wagering_requirement, 1.0);
                assert_eq!(req.expiry_hours, 24);
                assert_eq!(req.description.as_deref(), Some("Goodwill"));
            }
            other => panic!("unexpected credit {:?}", other),
        }

        input.expiry_hours = "0".to_string();
        assert_eq!(
            input.to_credit(CreditKind::Bonus, "P-1").unwrap_err(),
            "Expiry must be at least 1 hour."
        );
    }

    #[tokio::test]
    async fn credits_post_to_their_wallet_endpoint() {
        let client = Rc::new(MockHttpClient::new());
        client.respond(200, r#"{"status":"ok"}"#);
        client.respond(200, r#"{"status":"ok"}"#);
        let gateway = Gateway::new(
            "http://api.test",
            client.clone(),
            authenticated_store("tok"),
            Rc::new(RecordingNavigator::at("/wallet")),
        );

        let points = form("50").to_credit(CreditKind::LoyaltyPoints, "P-1").unwrap();
        submit_credit(&gateway, points).await.unwrap();
        let bonus = form("5").to_credit(CreditKind::Bonus, "P-1").unwrap();
        submit_credit(&gateway, bonus).await.unwrap();

        let sent = client.requests();
        assert_eq!(sent[0].url, "http://api.test/api/admin/wallet/add-lp");
        assert_eq!(sent[1].url, "http://api.test/api/admin/wallet/add-bonus");
        let HttpBody::Text(body) = &sent[0].body else {
            panic!("expected a JSON body");
        };
        assert!(body.contains(r#""source":"ADMIN_CONSOLE""#));
    }
}

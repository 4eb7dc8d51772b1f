use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use loyalty_console_shared::format::{
    active_badge_class, format_currency, format_date, status_badge_class, tier_badge_class,
};
use loyalty_console_shared::models::{ImportSummary, Player};
use loyalty_console_shared::protocol::{IMPORT_FILE_FIELD, IMPORT_PLAYERS_PATH, ListPlayersRequest};

use super::{message_row, notice_view};
use crate::components::shell::use_console;
use crate::error::{GatewayError, RenderError};
use crate::gateway::Gateway;
use crate::web::file::read_selected_file;
use crate::web::router::MountPoint;

pub async fn render(gateway: Rc<Gateway>, mount: MountPoint<ViewFn>) -> Result<(), RenderError> {
    let players = gateway.send(&ListPlayersRequest).await?;
    mount.render(ViewFn::from(move || {
        view! { <PlayersPanel initial=players.clone() /> }.into_any()
    }));
    Ok(())
}

#[component]
fn PlayersPanel(initial: Vec<Player>) -> impl IntoView {
    let ctx = use_console();
    let players = RwSignal::new(initial);
    let notice = RwSignal::new(Option::<(String, bool)>::None);
    let uploading = RwSignal::new(false);
    let file_input = NodeRef::<leptos::html::Input>::new();

    let on_import = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(input) = file_input.get() else {
            return;
        };
        let gateway = ctx.gateway.get_value();
        uploading.set(true);
        notice.set(None);

        spawn_local(async move {
            let result = import_players(&gateway, &input).await;
            match result {
                Ok(Some(summary)) => {
                    notice.set(Some((summary.describe(), false)));
                    input.set_value("");
                    match gateway.send(&ListPlayersRequest).await {
                        Ok(list) => players.set(list),
                        Err(e) if e.is_session_expired() => {}
                        Err(e) => notice.set(Some((format!("Error loading players: {}", e), true))),
                    }
                }
                Ok(None) => notice.set(Some(("Please select a file".to_string(), true))),
                // 网关已清除会话并跳转登录
                Err(e) if e.is_session_expired() => {}
                Err(e) => notice.set(Some((format!("Import Failed: {}", e), true))),
            }
            uploading.set(false);
        });
    };

    view! {
        <div class="space-y-4">
            {notice_view(notice)}

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                        <h3 class="card-title">"Players"</h3>
                        <form class="flex items-center gap-2" on:submit=on_import>
                            <input
                                node_ref=file_input
                                type="file"
                                accept=".csv, .xlsx"
                                class="file-input file-input-bordered file-input-sm"
                            />
                            <button class="btn btn-secondary btn-sm" disabled=move || uploading.get()>
                                {move || if uploading.get() { "Uploading..." } else { "📂 Bulk Import" }}
                            </button>
                        </form>
                    </div>
                    <p class="px-6 text-sm text-base-content/60">
                        "Upload an Excel (.xlsx) or CSV (.csv) file. Required columns: "
                        <code>"player_id"</code> ", " <code>"total_deposited"</code> ", "
                        <code>"total_wagered"</code> ", " <code>"total_won"</code> "."
                    </p>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Player ID"</th>
                                    <th>"Segment"</th>
                                    <th>"Tier"</th>
                                    <th>"Status"</th>
                                    <th>"Metrics"</th>
                                    <th>"Created"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {move || {
                                    players.with(|list| {
                                        if list.is_empty() {
                                            return message_row(6, "No players found.".to_string());
                                        }
                                        list.iter().map(player_row).collect_view().into_any()
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

async fn import_players(
    gateway: &Gateway,
    input: &leptos::web_sys::HtmlInputElement,
) -> Result<Option<ImportSummary>, GatewayError> {
    let file = read_selected_file(input, IMPORT_FILE_FIELD)
        .await
        .map_err(GatewayError::Transport)?;
    let Some(file) = file else {
        return Ok(None);
    };

    log_info!("[Players] Importing {} ({} bytes)", file.file_name, file.bytes.len());
    let value = gateway.upload(IMPORT_PLAYERS_PATH, file).await?;
    let summary: ImportSummary =
        serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))?;
    if !summary.errors.is_empty() {
        log_warn!("[Players] Import reported row errors: {:?}", summary.errors);
    }
    Ok(Some(summary))
}

fn player_row(player: &Player) -> AnyView {
    let pnl_class = if player.metrics.net_pnl < 0.0 {
        "text-success"
    } else {
        "text-error"
    };

    view! {
        <tr>
            <td>
                <div class="font-medium">{player.player_id.clone()}</div>
                <div class="text-xs text-base-content/60">
                    {player.email.clone().unwrap_or_else(|| "No email".to_string())}
                </div>
            </td>
            <td>
                <span class=status_badge_class(&player.segment)>{player.segment.clone()}</span>
            </td>
            <td>
                <span class=tier_badge_class(&player.tier)>{player.tier.clone()}</span>
            </td>
            <td>
                <span class=active_badge_class(player.is_active)>
                    {if player.is_active { "Active" } else { "Inactive" }}
                </span>
                {player.is_blocked.then(|| view! { <span class="badge badge-red ml-1">"BLOCKED"</span> })}
            </td>
            <td class="text-sm">
                <div>{format!("Dep: {}", format_currency(player.metrics.total_deposited, "CASH"))}</div>
                <div class=pnl_class>
                    {format!("PnL: {}", format_currency(player.metrics.net_pnl, "CASH"))}
                </div>
            </td>
            <td>{format_date(player.created_at.as_deref())}</td>
        </tr>
    }
    .into_any()
}

use std::rc::Rc;

use leptos::prelude::*;
use loyalty_console_shared::format::{format_currency, format_date, status_badge_class};
use loyalty_console_shared::models::{RewardRecord, SegmentShare};
use loyalty_console_shared::protocol::{DashboardMetricsRequest, RewardHistoryRequest};

use super::message_row;
use crate::error::{GatewayError, RenderError};
use crate::gateway::Gateway;
use crate::web::router::MountPoint;

type Section<T> = Result<T, String>;

pub async fn render(gateway: Rc<Gateway>, mount: MountPoint<ViewFn>) -> Result<(), RenderError> {
    let (segments, rewards) = load(&gateway).await?;
    mount.render(ViewFn::from(move || analytics_view(&segments, &rewards)));
    Ok(())
}

/// 两个区块并行加载，各自展示自己的错误；会话过期时整个视图失败
async fn load(
    gateway: &Gateway,
) -> Result<(Section<Vec<SegmentShare>>, Section<Vec<RewardRecord>>), RenderError> {
    let history = RewardHistoryRequest::default();
    let (metrics, rewards) = futures::join!(
        gateway.send(&DashboardMetricsRequest),
        gateway.send(&history),
    );

    Ok((
        section(metrics.map(|m| m.segment_distribution))?,
        section(rewards)?,
    ))
}

fn section<T>(result: Result<T, GatewayError>) -> Result<Section<T>, RenderError> {
    match result {
        Ok(data) => Ok(Ok(data)),
        Err(e) if e.is_session_expired() => Err(e.into()),
        Err(e) => Ok(Err(e.to_string())),
    }
}

fn analytics_view(
    segments: &Section<Vec<SegmentShare>>,
    rewards: &Section<Vec<RewardRecord>>,
) -> AnyView {
    let chart = match segments {
        Err(msg) => view! { <p class="text-error">{format!("Error: {}", msg)}</p> }.into_any(),
        Ok(dist) if dist.is_empty() => view! { <p>"No data available."</p> }.into_any(),
        Ok(dist) => dist
            .iter()
            .map(|item| {
                view! {
                    <div class="mb-4">
                        <div class="flex justify-between mb-1">
                            <span class="font-medium">{item.segment.clone()}</span>
                            <span class="text-base-content/60">
                                {format!("{} players ({:.1}%)", item.count, item.percentage)}
                            </span>
                        </div>
                        <progress
                            class="progress progress-primary w-full"
                            value=item.percentage
                            max="100"
                        ></progress>
                    </div>
                }
            })
            .collect_view()
            .into_any(),
    };

    let rows = match rewards {
        Err(msg) => message_row(5, format!("Error: {}", msg)),
        Ok(list) if list.is_empty() => message_row(5, "No rewards found.".to_string()),
        Ok(list) => list
            .iter()
            .map(|r| {
                view! {
                    <tr>
                        <td class="text-sm">{format_date(r.issued_at.as_deref())}</td>
                        <td class="font-medium">{r.player_id.clone()}</td>
                        <td>{r.reward_type.clone()}</td>
                        <td>{format_currency(r.amount, &r.currency_type)}</td>
                        <td><span class=status_badge_class(&r.status)>{r.status.clone()}</span></td>
                    </tr>
                }
            })
            .collect_view()
            .into_any(),
    };

    view! {
        <div class="grid grid-cols-1 xl:grid-cols-2 gap-6">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Player Segmentation"</h3>
                    {chart}
                </div>
            </div>
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Recent Rewards Issued"</h3>
                    <div class="overflow-auto max-h-96">
                        <table class="table table-sm w-full">
                            <thead>
                                <tr>
                                    <th>"Date"</th>
                                    <th>"Player"</th>
                                    <th>"Type"</th>
                                    <th>"Amount"</th>
                                    <th>"Status"</th>
                                </tr>
                            </thead>
                            <tbody>{rows}</tbody>
                        </table>
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
    use crate::testing::{MockHttpClient, RecordingNavigator, authenticated_store};

    #[test]
    fn section_errors_stay_local_except_session_expiry() {
        let failed = section::<Vec<SegmentShare>>(Err(GatewayError::Network("down".into())));
        assert_eq!(failed, Ok(Err("Network error: down".to_string())));

        let expired = section::<Vec<SegmentShare>>(Err(GatewayError::SessionExpired));
        assert!(expired.unwrap_err().is_session_expired());
    }

    #[tokio::test]
    async fn sections_load_together_and_fail_independently() {
        let client = Rc::new(MockHttpClient::new());
        client.respond(
            200,
            r#"{"segment_distribution":[{"segment":"VIP","count":4,"percentage":40.0}]}"#,
        );
        client.respond(500, r#"{"detail":"rewards store offline"}"#);
        let gateway = Gateway::new(
            "http://api.test",
            client.clone(),
            authenticated_store("tok"),
            Rc::new(RecordingNavigator::at("/analytics")),
        );

        let (segments, rewards) = load(&gateway).await.unwrap();

        assert_eq!(segments.unwrap()[0].segment, "VIP");
        assert_eq!(rewards, Err("rewards store offline".to_string()));
        let urls: Vec<String> = client.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://api.test/api/admin/analytics/dashboard".to_string(),
                "http://api.test/api/admin/analytics/rewards".to_string(),
            ]
        );
    }
}

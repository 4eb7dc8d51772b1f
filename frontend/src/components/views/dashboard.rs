use std::rc::Rc;

use leptos::prelude::*;
use loyalty_console_shared::models::DashboardMetrics;
use loyalty_console_shared::protocol::DashboardMetricsRequest;

use crate::error::RenderError;
use crate::gateway::Gateway;
use crate::web::router::MountPoint;

pub async fn render(gateway: Rc<Gateway>, mount: MountPoint<ViewFn>) -> Result<(), RenderError> {
    let metrics = gateway.send(&DashboardMetricsRequest).await?;
    mount.render(ViewFn::from(move || dashboard_view(&metrics)));
    Ok(())
}

fn dashboard_view(metrics: &DashboardMetrics) -> AnyView {
    view! {
        <div class="space-y-8">
            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-figure text-primary text-3xl">"👥"</div>
                    <div class="stat-title">"Total Players"</div>
                    <div class="stat-value text-primary">{metrics.total_players}</div>
                    <div class="stat-desc text-success">
                        {format!("Active: {}", metrics.active_players)}
                    </div>
                </div>
                <div class="stat">
                    <div class="stat-figure text-warning text-3xl">"🏆"</div>
                    <div class="stat-title">"Rewards Issued"</div>
                    <div class="stat-value">{metrics.total_rewards_issued}</div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Welcome to LoyaltyPro"</h3>
                    <p>"Select a module from the sidebar to get started."</p>
                </div>
            </div>
        </div>
    }
    .into_any()
}

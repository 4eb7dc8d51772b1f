use std::rc::Rc;

use leptos::prelude::*;
use loyalty_console_shared::format::{group_thousands, tier_badge_class};
use loyalty_console_shared::models::Tier;
use loyalty_console_shared::protocol::ListTiersRequest;

use super::{message_row, pretty_json};
use crate::error::RenderError;
use crate::gateway::Gateway;
use crate::web::router::MountPoint;

pub async fn render(gateway: Rc<Gateway>, mount: MountPoint<ViewFn>) -> Result<(), RenderError> {
    let mut tiers = gateway.send(&ListTiersRequest).await?;
    sort_by_threshold(&mut tiers);
    mount.render(ViewFn::from(move || tiers_view(&tiers)));
    Ok(())
}

/// 按 LP 下限升序
fn sort_by_threshold(tiers: &mut [Tier]) {
    tiers.sort_by(|a, b| a.lp_min.total_cmp(&b.lp_min));
}

fn max_label(tier: &Tier) -> String {
    tier.lp_max
        .map(group_thousands)
        .unwrap_or_else(|| "∞".to_string())
}

fn tiers_view(tiers: &[Tier]) -> AnyView {
    let rows = if tiers.is_empty() {
        message_row(5, "No tiers configured.".to_string())
    } else {
        tiers
            .iter()
            .map(|tier| {
                view! {
                    <tr>
                        <td>
                            <span class=tier_badge_class(&tier.tier_level)>{tier.tier_level.clone()}</span>
                        </td>
                        <td>{group_thousands(tier.lp_min)}</td>
                        <td>{max_label(tier)}</td>
                        <td><pre class="text-xs bg-base-200 p-1 rounded">{pretty_json(&tier.requirements)}</pre></td>
                        <td><pre class="text-xs bg-base-200 p-1 rounded">{pretty_json(&tier.benefits)}</pre></td>
                    </tr>
                }
            })
            .collect_view()
            .into_any()
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <h3 class="card-title p-6 pb-2">"Loyalty Tiers"</h3>
                <div class="overflow-x-auto w-full">
                    <table class="table w-full">
                        <thead>
                            <tr>
                                <th>"Level"</th>
                                <th>"Min LP"</th>
                                <th>"Max LP"</th>
                                <th>"Requirements"</th>
                                <th>"Benefits"</th>
                            </tr>
                        </thead>
                        <tbody>{rows}</tbody>
                    </table>
                </div>
            </div>
        </div>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(level: &str, lp_min: f64, lp_max: Option<f64>) -> Tier {
        Tier {
            tier_level: level.to_string(),
            lp_min,
            lp_max,
            ..Default::default()
        }
    }

    #[test]
    fn tiers_are_ordered_by_minimum_points() {
        let mut tiers = vec![
            tier("GOLD", 5000.0, Some(19_999.0)),
            tier("BRONZE", 0.0, Some(999.0)),
            tier("PLATINUM", 20_000.0, None),
        ];
        sort_by_threshold(&mut tiers);
        let levels: Vec<&str> = tiers.iter().map(|t| t.tier_level.as_str()).collect();
        assert_eq!(levels, vec!["BRONZE", "GOLD", "PLATINUM"]);
    }

    #[test]
    fn open_ended_tier_shows_infinity() {
        assert_eq!(max_label(&tier("PLATINUM", 20_000.0, None)), "∞");
        assert_eq!(max_label(&tier("GOLD", 5000.0, Some(19_999.0))), "19,999");
    }
}

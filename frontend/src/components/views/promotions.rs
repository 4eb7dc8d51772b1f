use std::rc::Rc;

use leptos::prelude::*;
use loyalty_console_shared::Role;
use loyalty_console_shared::format::group_thousands;
use loyalty_console_shared::models::Promotion;
use loyalty_console_shared::protocol::ListPromotionsRequest;

use crate::error::RenderError;
use crate::gateway::Gateway;
use crate::web::router::MountPoint;

/// 运营方看到全部活动，玩家只看到可参与的
pub async fn render(gateway: Rc<Gateway>, mount: MountPoint<ViewFn>) -> Result<(), RenderError> {
    let role = gateway.session().role().unwrap_or(Role::Operator);
    let promotions = gateway.send(&ListPromotionsRequest { role }).await?;
    mount.render(ViewFn::from(move || promotions_view(role, &promotions)));
    Ok(())
}

fn budget_label(promo: &Promotion) -> String {
    let total = promo
        .total_budget
        .map(group_thousands)
        .unwrap_or_else(|| "∞".to_string());
    format!("{:.2} / {}", promo.spent_budget, total)
}

fn promotions_view(role: Role, promotions: &[Promotion]) -> AnyView {
    let heading = match role {
        Role::Operator => "All Promotions",
        Role::Player => "Available Promotions",
    };

    let body = if promotions.is_empty() {
        view! { <p class="text-base-content/60">"No promotions found."</p> }.into_any()
    } else {
        promotions
            .iter()
            .map(|promo| {
                view! {
                    <div class="flex flex-wrap items-center justify-between gap-4 border-b border-base-200 py-3">
                        <div>
                            <div class="font-semibold">{promo.name.clone()}</div>
                            <div class="text-xs text-base-content/60">{promo.promo_id.clone()}</div>
                        </div>
                        <span class=format!("badge badge-{}", promo.status.to_lowercase())>
                            {promo.status.clone()}
                        </span>
                        <div class="w-48">
                            <progress
                                class="progress progress-primary w-full"
                                value=promo.budget_used_percent()
                                max="100"
                            ></progress>
                            <div class="text-xs">{budget_label(promo)}</div>
                        </div>
                    </div>
                }
            })
            .collect_view()
            .into_any()
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">{heading}</h3>
                {body}
            </div>
        </div>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_label_handles_unlimited_budget() {
        let mut promo = Promotion {
            spent_budget: 120.5,
            total_budget: Some(10_000.0),
            ..Default::default()
        };
        assert_eq!(budget_label(&promo), "120.50 / 10,000");
        promo.total_budget = None;
        assert_eq!(budget_label(&promo), "120.50 / ∞");
    }
}

//! 后端视图模型
//!
//! 仅包含前端展示需要的字段，所有字段带默认值，后端新增或缺省字段都不会导致解析失败。

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentShare {
    pub segment: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardMetrics {
    pub total_players: u64,
    pub active_players: u64,
    pub total_rewards_issued: u64,
    pub segment_distribution: Vec<SegmentShare>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerMetrics {
    pub total_deposited: f64,
    pub net_pnl: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub player_id: String,
    pub email: Option<String>,
    pub segment: String,
    pub tier: String,
    pub is_active: bool,
    pub is_blocked: bool,
    pub metrics: PlayerMetrics,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardRule {
    pub rule_id: String,
    pub name: String,
    pub description: Option<String>,
    pub priority: i64,
    pub conditions: Value,
    pub reward_config: Value,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tier {
    pub tier_level: String,
    pub lp_min: f64,
    pub lp_max: Option<f64>,
    pub requirements: Value,
    pub benefits: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub transaction_type: String,
    pub created_at: Option<String>,
    pub description: Option<String>,
    pub amount: f64,
    pub currency_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardRecord {
    pub issued_at: Option<String>,
    pub player_id: String,
    pub reward_type: String,
    pub amount: f64,
    pub currency_type: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedemptionRule {
    pub id: Value,
    pub name: String,
    pub description: Option<String>,
    pub lp_cost: f64,
    pub currency_value: f64,
    pub target_balance: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Promotion {
    pub promo_id: String,
    pub name: String,
    pub status: String,
    pub spent_budget: f64,
    pub total_budget: Option<f64>,
}

impl Promotion {
    /// 预算消耗百分比，无上限预算时为 0
    pub fn budget_used_percent(&self) -> f64 {
        match self.total_budget {
            Some(total) if total > 0.0 => (self.spent_budget / total * 100.0).min(100.0),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessPrediction {
    pub probability_percent: f64,
    pub projected_cost: f64,
    pub projected_ngr: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiCampaign {
    pub campaign_id: String,
    pub campaign_name: String,
    pub status: String,
    pub target_segment_logic: String,
    pub generated_at: Option<String>,
    pub success_prediction: Option<SuccessPrediction>,
}

/// 批量导入结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSummary {
    pub players_created: u64,
    pub players_updated: u64,
    pub rewards_issued: u64,
    pub errors: Vec<Value>,
}

impl ImportSummary {
    pub fn describe(&self) -> String {
        let mut text = format!(
            "Import Complete! Players Created: {}, Players Updated: {}, Rewards Issued: {}",
            self.players_created, self.players_updated, self.rewards_issued
        );
        if !self.errors.is_empty() {
            text.push_str(&format!(" ({} rows failed)", self.errors.len()));
        }
        text
    }
}

/// 积分兑换结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedemptionReceipt {
    pub lp_deducted: f64,
    pub value_received: f64,
    pub new_lp_balance: f64,
}

impl RedemptionReceipt {
    pub fn describe(&self) -> String {
        format!(
            "Redeemed {} LP for ${}. New LP Balance: {}",
            self.lp_deducted, self.value_received, self.new_lp_balance
        )
    }
}

/// 后台任务的返回消息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobMessage {
    pub message: Option<String>,
}

use crate::Role;
use crate::models::{
    AiCampaign, DashboardMetrics, JobMessage, Player, Promotion, RedemptionReceipt,
    RedemptionRule, RewardRecord, RewardRule, Tier, Transaction,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path (or its static prefix for parameterised endpoints).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// Full path including path parameters and query string.
    fn path(&self) -> String {
        Self::PATH.to_string()
    }

    /// JSON body, if the endpoint takes one.
    fn body(&self) -> Option<Value> {
        None
    }
}

/// Multipart upload endpoint for the player spreadsheet import.
pub const IMPORT_PLAYERS_PATH: &str = "/api/admin/import/excel";
/// Multipart field name expected by the import endpoint.
pub const IMPORT_FILE_FIELD: &str = "file";

/// Characters escaped in path segments and query values: everything except
/// the RFC 3986 unreserved set.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encodes a single path segment or query parameter value.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

// =========================================================
// Request Definitions
// =========================================================

#[derive(Debug, Default)]
pub struct DashboardMetricsRequest;

impl ApiRequest for DashboardMetricsRequest {
    type Response = DashboardMetrics;
    const PATH: &'static str = "/api/admin/analytics/dashboard";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Default)]
pub struct ListPlayersRequest;

impl ApiRequest for ListPlayersRequest {
    type Response = Vec<Player>;
    const PATH: &'static str = "/api/admin/players";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Default)]
pub struct ListRulesRequest;

impl ApiRequest for ListRulesRequest {
    type Response = Vec<RewardRule>;
    const PATH: &'static str = "/api/admin/rules";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// Enable or disable a reward rule
#[derive(Debug)]
pub struct ToggleRuleRequest {
    pub rule_id: String,
    pub is_active: bool,
}

impl ApiRequest for ToggleRuleRequest {
    type Response = Value;
    const PATH: &'static str = "/api/admin/rules";
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, encode_component(&self.rule_id))
    }

    fn body(&self) -> Option<Value> {
        Some(json!({ "is_active": self.is_active }))
    }
}

#[derive(Debug, Default)]
pub struct ListTiersRequest;

impl ApiRequest for ListTiersRequest {
    type Response = Vec<Tier>;
    const PATH: &'static str = "/api/admin/tiers";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// Transaction history of one player
#[derive(Debug)]
pub struct PlayerTransactionsRequest {
    pub player_id: String,
}

impl ApiRequest for PlayerTransactionsRequest {
    type Response = Vec<Transaction>;
    const PATH: &'static str = "/api/admin/analytics/transactions";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!(
            "{}?player_id={}",
            Self::PATH,
            encode_component(&self.player_id)
        )
    }
}

#[derive(Debug, Default)]
pub struct RewardHistoryRequest {
    pub status: Option<String>,
}

impl ApiRequest for RewardHistoryRequest {
    type Response = Vec<RewardRecord>;
    const PATH: &'static str = "/api/admin/analytics/rewards";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        match self.status.as_deref() {
            Some(status) if !status.is_empty() => {
                format!("{}?status={}", Self::PATH, encode_component(status))
            }
            _ => Self::PATH.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ListRedemptionRulesRequest;

impl ApiRequest for ListRedemptionRulesRequest {
    type Response = Vec<RedemptionRule>;
    const PATH: &'static str = "/api/redemption/rules";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// Promotions visible to the current role: operators see every campaign,
/// players only the ones available to them.
#[derive(Debug)]
pub struct ListPromotionsRequest {
    pub role: Role,
}

impl ApiRequest for ListPromotionsRequest {
    type Response = Vec<Promotion>;
    const PATH: &'static str = "/api/v1/promotions";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        match self.role {
            Role::Operator => format!("{}/admin/all", Self::PATH),
            Role::Player => format!("{}/available", Self::PATH),
        }
    }
}

#[derive(Debug, Default)]
pub struct ListAiCampaignsRequest;

impl ApiRequest for ListAiCampaignsRequest {
    type Response = Vec<AiCampaign>;
    const PATH: &'static str = "/api/v1/ai-campaigns/";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// Base path of the AI campaign endpoints (no trailing slash)
pub const AI_CAMPAIGNS_PATH: &str = "/api/v1/ai-campaigns";

/// Ask the model for a new campaign from a free-text intent.
/// The campaign is created as a draft and must be approved separately.
#[derive(Debug)]
pub struct GenerateCampaignRequest {
    pub intent: String,
    pub max_budget: f64,
}

impl ApiRequest for GenerateCampaignRequest {
    type Response = AiCampaign;
    const PATH: &'static str = AI_CAMPAIGNS_PATH;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/generate", Self::PATH)
    }

    fn body(&self) -> Option<Value> {
        Some(json!({
            "intent": self.intent,
            "max_budget": self.max_budget,
            "auto_approve": false,
        }))
    }
}

/// Approve a draft campaign; it goes live immediately.
#[derive(Debug)]
pub struct ApproveCampaignRequest {
    pub campaign_id: String,
}

impl ApiRequest for ApproveCampaignRequest {
    type Response = Value;
    const PATH: &'static str = AI_CAMPAIGNS_PATH;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/{}/approve", Self::PATH, encode_component(&self.campaign_id))
    }
}

/// Stop an active campaign.
#[derive(Debug)]
pub struct KillCampaignRequest {
    pub campaign_id: String,
    pub reason: String,
}

impl ApiRequest for KillCampaignRequest {
    type Response = Value;
    const PATH: &'static str = AI_CAMPAIGNS_PATH;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!(
            "{}/{}/kill?reason={}",
            Self::PATH,
            encode_component(&self.campaign_id),
            encode_component(&self.reason)
        )
    }
}

/// Delete a draft campaign.
#[derive(Debug)]
pub struct DeleteCampaignRequest {
    pub campaign_id: String,
}

impl ApiRequest for DeleteCampaignRequest {
    type Response = Value;
    const PATH: &'static str = AI_CAMPAIGNS_PATH;
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, encode_component(&self.campaign_id))
    }
}

/// Source tag recorded on manual loyalty point credits.
pub const ADMIN_CONSOLE_SOURCE: &str = "ADMIN_CONSOLE";

/// Credit loyalty points to a player's wallet
#[derive(Debug)]
pub struct AddLoyaltyPointsRequest {
    pub player_id: String,
    pub amount: i64,
    pub description: Option<String>,
}

impl ApiRequest for AddLoyaltyPointsRequest {
    type Response = Value;
    const PATH: &'static str = "/api/admin/wallet/add-lp";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn body(&self) -> Option<Value> {
        Some(json!({
            "player_id": self.player_id,
            "amount": self.amount,
            "description": self.description,
            "source": ADMIN_CONSOLE_SOURCE,
        }))
    }
}

/// Credit bonus cash with a wagering requirement and an expiry
#[derive(Debug)]
pub struct AddBonusRequest {
    pub player_id: String,
    pub amount: f64,
    /// Multiplier of the bonus amount that must be wagered
    pub wagering_requirement: f64,
    pub expiry_hours: u32,
    pub description: Option<String>,
}

impl ApiRequest for AddBonusRequest {
    type Response = Value;
    const PATH: &'static str = "/api/admin/wallet/add-bonus";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn body(&self) -> Option<Value> {
        Some(json!({
            "player_id": self.player_id,
            "amount": self.amount,
            "wagering_requirement": self.wagering_requirement,
            "expiry_hours": self.expiry_hours,
            "description": self.description,
        }))
    }
}

/// Convert a player's loyalty points using a redemption rule
#[derive(Debug)]
pub struct RedeemPointsRequest {
    pub player_id: String,
    /// The rule's `id` exactly as the backend listed it
    pub rule_id: Value,
}

impl ApiRequest for RedeemPointsRequest {
    type Response = RedemptionReceipt;
    const PATH: &'static str = "/api/redemption/redeem";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn body(&self) -> Option<Value> {
        Some(json!({
            "player_id": self.player_id,
            "rule_id": self.rule_id,
        }))
    }
}

/// Run the loyalty point expiry job now
#[derive(Debug, Default)]
pub struct ExpirePointsRequest;

impl ApiRequest for ExpirePointsRequest {
    type Response = JobMessage;
    const PATH: &'static str = "/api/cron/expire-points";
    const METHOD: HttpMethod = HttpMethod::Post;
}

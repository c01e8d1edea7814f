use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============ Domain Enums ============

/// Spending/offer category shared by cards and profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "card_category", rename_all = "lowercase")]
pub enum CardCategory {
    Travel,
    Dining,
    Cashback,
    General,
    Shopping,
}

/// Self-reported credit score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "credit_score_band", rename_all = "lowercase")]
pub enum CreditScoreBand {
    Poor,
    Fair,
    Good,
    #[serde(rename = "very good")]
    #[sqlx(rename = "very good")]
    VeryGood,
    Excellent,
}

/// Lifecycle state of a card application. Transitions out of `Pending`
/// are performed by an external review process, not by this API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

// ============ Database Models ============

/// A credit card offer from the static catalog.
///
/// Seeded once at startup; immutable afterward.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    /// Unique identifier assigned by the store.
    pub id: Uuid,
    /// Card name (e.g. "Chase Sapphire Preferred").
    pub name: String,
    /// Issuing bank.
    pub issuer: String,
    /// Annual fee in whole USD, never negative.
    pub annual_fee: i64,
    /// Human-readable reward rate (e.g. "2x points on travel and dining").
    pub reward_rate: String,
    /// Human-readable signup bonus description.
    pub signup_bonus: String,
    /// Ordered list of benefit descriptions.
    pub benefits: Vec<String>,
    /// Offer category.
    pub category: CardCategory,
    /// Seed timestamp; defines catalog order together with `id`.
    #[serde(skip_serializing, default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// One spending/credit profile per user, keyed by the identity
/// provider's subject id. Every field other than the key is optional.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// External identity (identity-provider subject). Immutable.
    pub user_id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    /// Annual income in whole USD.
    pub annual_income: Option<i64>,
    pub credit_score: Option<CreditScoreBand>,
    /// Monthly spending in whole USD.
    pub monthly_spending: Option<i64>,
    pub primary_spending_category: Option<CardCategory>,
    /// Opaque per-device token for the push gateway.
    pub push_token: Option<String>,
    #[serde(skip_serializing, default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing, default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Machine-readable trace of why a card scored the way it did.
/// Stored alongside the score for debugging; never consumed programmatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReason {
    pub credit_score: Option<CreditScoreBand>,
    pub category_match: bool,
    pub income: Option<i64>,
}

/// Normalized recommendation row as persisted: the card is stored as a
/// reference only and expanded at the read boundary.
#[derive(Debug, Clone, FromRow)]
pub struct RecommendationRow {
    pub id: Uuid,
    pub user_id: String,
    pub credit_card_id: Uuid,
    pub match_score: i32,
    pub reason: sqlx::types::Json<MatchReason>,
    /// Position within the generated batch; persists the tie-break order.
    pub rank: i32,
    pub generated_at: DateTime<Utc>,
}

/// Wire shape of a recommendation with the referenced card expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: Uuid,
    pub user_id: String,
    pub credit_card: CreditCard,
    pub match_score: i32,
    pub reason_code: MatchReason,
}

/// Normalized application row as persisted.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: String,
    pub credit_card_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// Wire shape of an application with the referenced card expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub user_id: String,
    pub credit_card: CreditCard,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// In-app notification. `read` only ever flips false -> true.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

// ============ API Request/Response Models ============

/// Uniform response envelope: `{success, data?, error?, code?}`.
///
/// The `code` field carries a stable machine-readable error identifier so
/// callers can distinguish failure kinds without parsing messages.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope wrapping `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }
}

impl ApiResponse<()> {
    /// Successful envelope with no payload (e.g. mark-as-read).
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            code: None,
        }
    }
}

/// Body for POST /api/users. The profile key comes from the
/// authenticated caller, never from the body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub annual_income: Option<i64>,
    pub credit_score: Option<CreditScoreBand>,
    pub monthly_spending: Option<i64>,
    pub primary_spending_category: Option<CardCategory>,
    pub push_token: Option<String>,
}

/// Body for PUT /api/users/:user_id. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub annual_income: Option<i64>,
    pub credit_score: Option<CreditScoreBand>,
    pub monthly_spending: Option<i64>,
    pub primary_spending_category: Option<CardCategory>,
    pub push_token: Option<String>,
}

/// Body for POST /api/applications.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplyRequest {
    pub user_id: String,
    pub credit_card_id: Uuid,
}

/// Body for PUT /api/notifications/:id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarkReadRequest {
    pub read: bool,
}

impl CreditCard {
    /// Composes the wire recommendation from a stored row and its card.
    pub fn expand_recommendation(self, row: RecommendationRow) -> Recommendation {
        Recommendation {
            id: row.id,
            user_id: row.user_id,
            credit_card: self,
            match_score: row.match_score,
            reason_code: row.reason.0,
        }
    }

    /// Composes the wire application from a stored row and its card.
    pub fn expand_application(self, row: ApplicationRow) -> Application {
        Application {
            id: row.id,
            user_id: row.user_id,
            credit_card: self,
            status: row.status,
            applied_at: row.applied_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_score_band_wire_names() {
        assert_eq!(
            serde_json::to_string(&CreditScoreBand::VeryGood).unwrap(),
            "\"very good\""
        );
        assert_eq!(
            serde_json::from_str::<CreditScoreBand>("\"excellent\"").unwrap(),
            CreditScoreBand::Excellent
        );
    }

    #[test]
    fn apply_request_rejects_unknown_fields() {
        let body = serde_json::json!({
            "userId": "uid-1",
            "creditCardId": "7f1c1f60-64a3-4f3e-9f9d-1f2a3b4c5d6e",
            "status": "approved"
        });
        assert!(serde_json::from_value::<ApplyRequest>(body).is_err());
    }

    #[test]
    fn envelope_skips_absent_fields() {
        let json = serde_json::to_value(ApiResponse::ok(5)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 5}));
    }
}

// models.rs - Core domain types: transactions, perks, partners, identities

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{DealId, PartnerId, PerkId, UserId};

/// Transaction category
///
/// Serialized lowercase on the wire (`"rent"`, `"payment"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Rent,
    Utilities,
    Bills,
    Payment,
}

impl Default for TxnKind {
    fn default() -> Self {
        TxnKind::Payment
    }
}

/// A recorded payment and the reward credits it earned.
///
/// Immutable once created. `credits` is frozen at creation time (5% of
/// `amount` at the then-current rate) and is never recomputed, so the
/// log stays historically accurate even if the rate constant changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: UserId,
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TxnKind,
    pub credits: Decimal,
    pub date: DateTime<Utc>,
    pub merchant: String,
}

/// A generic perk, redeemable against the reward balance.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Perk {
    pub id: PerkId,
    pub name: String,
    pub cost: Decimal,
    pub icon: String,
    pub category: String,
    pub description: String,
}

/// A partner deal. Redemption is a free engagement action tracked by a
/// counter; deals never cost balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    pub description: String,
    pub full_description: String,
    pub icon: String,
}

/// A partner merchant with its static deal list.
///
/// `pinned_total_views` marks the partner whose per-deal view counters
/// must always sum to that fixed total; it is rebalanced whenever a deal
/// is added. Internal only, never serialized.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    pub slug: String,
    pub logo: String,
    pub route: String,
    #[serde(skip)]
    pub pinned_total_views: Option<u64>,
    pub deals: Vec<Deal>,
}

// ============================================================
// IDENTITIES (fixed demo directory entries + session payloads)
// ============================================================

/// End-user directory record. The demo carries no real authentication;
/// passwords are plaintext compares against this table.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub name: String,
    pub password: String,
    pub starting_balance: Decimal,
}

/// Partner-dashboard directory record. `name` maps 1:1 to a partner slug.
#[derive(Debug, Clone)]
pub struct DashboardRecord {
    pub dash_id: String,
    pub name: String,
    pub password: String,
}

/// Identity stored in a user session and echoed back on login.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: UserId,
    pub name: String,
}

/// Identity stored in a dashboard session.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardIdentity {
    pub dash_id: String,
    pub name: String,
}

impl DashboardIdentity {
    /// The partner slug this dashboard account manages.
    pub fn partner_slug(&self) -> String {
        self.name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_transaction_wire_shape() {
        let txn = Transaction {
            id: "user-1736899200000-ab12cd".to_string(),
            user_id: "user".to_string(),
            amount: Decimal::new(100, 0),
            description: "Shopping".to_string(),
            kind: TxnKind::Payment,
            credits: Decimal::new(500, 2),
            date: Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(),
            merchant: "Shopping".to_string(),
        };

        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["userId"], "user");
        assert_eq!(json["type"], "payment");
        assert_eq!(json["credits"], 5.0);
        assert_eq!(json["amount"], 100.0);
        assert!(json["date"].as_str().unwrap().starts_with("2025-01-15T"));
    }

    #[test]
    fn test_txn_kind_roundtrip() {
        let kind: TxnKind = serde_json::from_str("\"rent\"").unwrap();
        assert_eq!(kind, TxnKind::Rent);
        assert_eq!(serde_json::to_string(&TxnKind::Utilities).unwrap(), "\"utilities\"");
    }

    #[test]
    fn test_partner_serialization_hides_pinned_total() {
        let partner = Partner {
            id: 1,
            name: "Aldi".to_string(),
            slug: "aldi".to_string(),
            logo: "/images/partners/aldi-logo.png".to_string(),
            route: "/perks/aldi".to_string(),
            pinned_total_views: Some(10_000),
            deals: vec![],
        };
        let json = serde_json::to_value(&partner).unwrap();
        assert!(json.get("pinnedTotalViews").is_none());
        assert_eq!(json["slug"], "aldi");
    }
}

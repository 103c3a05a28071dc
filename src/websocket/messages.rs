//! Broadcast frame types pushed to connected clients.
//!
//! Every frame is `{"event": "...", "data": {...}}` on the wire. Events
//! are refresh triggers, not data transport: clients react by refetching
//! over HTTP, so a missed frame only delays a refresh until the next
//! poll.

use serde::Serialize;

use crate::models::Deal;

/// Threshold tier that triggered an AI roast during a simulation month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdKind {
    Regular,
    Emergency,
}

/// Server -> client broadcast message.
///
/// Payloads carry the user id where the source event was user-scoped;
/// delivery is still broadcast-only and listeners filter client-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum WsMessage {
    /// Handshake acknowledgement right after the upgrade.
    Connected,
    /// Reply to a client ping.
    Pong,
    #[serde(rename_all = "camelCase")]
    RefreshWallet { user_id: String },
    #[serde(rename_all = "camelCase")]
    RefreshBalance { user_id: String },
    #[serde(rename_all = "camelCase")]
    PerkRedeemed {
        partner: String,
        perk_id: u32,
        redemption_count: u64,
    },
    #[serde(rename_all = "camelCase")]
    NewDealAdded { partner: String, deal: Deal },
    #[serde(rename_all = "camelCase")]
    TestMonthUpdate {
        user_id: String,
        month: String,
        month_index: usize,
        total_months: usize,
    },
    #[serde(rename_all = "camelCase")]
    TriggerAiRoast {
        user_id: String,
        month: String,
        monthly_spending: i64,
        threshold_type: ThresholdKind,
        threshold: i64,
    },
    #[serde(rename_all = "camelCase")]
    TestComplete { user_id: String },
    #[serde(rename_all = "camelCase")]
    TestStopped { user_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_match_wire_contract() {
        let json = serde_json::to_value(&WsMessage::RefreshWallet {
            user_id: "user".to_string(),
        })
        .unwrap();
        assert_eq!(json["event"], "refresh-wallet");
        assert_eq!(json["data"]["userId"], "user");

        let json = serde_json::to_value(&WsMessage::PerkRedeemed {
            partner: "aldi".to_string(),
            perk_id: 3,
            redemption_count: 42,
        })
        .unwrap();
        assert_eq!(json["event"], "perk-redeemed");
        assert_eq!(json["data"]["perkId"], 3);
        assert_eq!(json["data"]["redemptionCount"], 42);
    }

    #[test]
    fn test_roast_trigger_payload() {
        let json = serde_json::to_value(&WsMessage::TriggerAiRoast {
            user_id: "user".to_string(),
            month: "May 2025".to_string(),
            monthly_spending: 1500,
            threshold_type: ThresholdKind::Emergency,
            threshold: 1500,
        })
        .unwrap();
        assert_eq!(json["event"], "trigger-ai-roast");
        assert_eq!(json["data"]["thresholdType"], "emergency");
        assert_eq!(json["data"]["monthlySpending"], 1500);
    }
}

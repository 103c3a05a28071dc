//! AI commentary proxy
//!
//! Stateless pass-through to a hosted text-generation API for the two
//! commentary features: the spending roast and the wellbeing analysis.
//! The upstream sits behind the [`TextModel`] trait so tests stub the
//! transport. Nothing here reads or locks core state; handlers gather
//! inputs first, so no ledger or catalog guard is ever held across the
//! upstream await.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Timelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::AiConfig;
use crate::models::Transaction;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI API key is not configured")]
    MissingApiKey,
    #[error("Rate limit exceeded. Please try again in a moment!")]
    RateLimited,
    #[error("API key invalid or quota exceeded")]
    QuotaExceeded,
    #[error("AI upstream request failed: {0}")]
    Upstream(String),
    #[error("Unexpected response format from AI upstream")]
    MalformedResponse,
}

/// Boundary to the hosted text model.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// One prompt round-trip. `json_output` asks the upstream to answer
    /// with a JSON document instead of prose.
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        json_output: bool,
    ) -> Result<String, AiError>;
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    /// The API key is read from the environment variable named in config;
    /// a missing key surfaces per-request as `MissingApiKey` rather than
    /// failing startup, since the rest of the service works without it.
    pub fn from_config(config: &AiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: std::env::var(&config.api_key_env)
                .ok()
                .filter(|key| !key.is_empty()),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        json_output: bool,
    ) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, api_key
        );

        let mut body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "systemInstruction": { "parts": [{ "text": system }] },
        });
        if json_output {
            body["generationConfig"] =
                serde_json::json!({ "responseMimeType": "application/json" });
        }

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Upstream(e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            429 => return Err(AiError::RateLimited),
            403 => return Err(AiError::QuotaExceeded),
            code if !status.is_success() => {
                let detail = response.text().await.unwrap_or_default();
                tracing::error!(code, %detail, "AI upstream error");
                return Err(AiError::Upstream(format!("status {code}")));
            }
            _ => {}
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|_| AiError::MalformedResponse)?;
        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or(AiError::MalformedResponse)
    }
}

// ============================================================
// COMMENTARY SERVICE (prompt building + response shaping)
// ============================================================

/// One line of recent-payments context for the roast prompt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentLine {
    pub merchant: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WellbeingResource {
    pub title: String,
    pub description: String,
    pub url: String,
}

/// Wellbeing analysis result. `resources` is guaranteed non-empty: a
/// fallback list is substituted whenever the upstream omits it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WellbeingReport {
    pub summary: String,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub resources: Vec<WellbeingResource>,
    pub risk_level: RiskLevel,
}

const ROAST_SYSTEM: &str = "You are a hilariously sarcastic financial advisor AI with a roast \
comedy style. You analyze student spending habits and provide brutally honest, funny commentary \
while ALSO giving genuine insights.\n\
IMPORTANT CONTEXT:\n\
- The \"balance\" is their REWARDS balance (cashback earned), any amount is positive!\n\
- Focus your analysis on their PAYMENT PATTERNS, that is where the real story is\n\
- Roast their spending choices, payment amounts and habits, not their rewards\n\
Your personality: lots of emojis, witty observations about WHAT they spend on, occasional Gen Z \
slang, actual useful insights about their payment patterns, light and entertaining.\n\
Format your response with: a funny opening (2-3 sentences), a Rewards Flex section, a Spending \
Roast section (biggest), a Real Talk section with actual advice, and a motivational but \
sarcastic closing. Keep it under 250 words total.";

const WELLBEING_SYSTEM: &str = "You are a compassionate and supportive mental health and \
wellbeing AI assistant. You analyze transaction patterns to identify potential stress \
indicators, concerning spending habits related to substance use, or other mental health \
concerns.\n\
GUIDELINES: be supportive, non-judgmental and empathetic; focus on patterns, not individual \
transactions; look for frequent late-night transactions, bars/liquor stores/pharmacies, rapid \
spending increases, unusual patterns; students may have legitimate reasons for various \
transactions; only flag genuine concerns; provide helpful, actionable resources.\n\
Your response must be a JSON object with this exact structure:\n\
{\"summary\": \"2-3 supportive sentences\", \"concerns\": [\"specific concerns, empty if none\"], \
\"resources\": [{\"title\": \"...\", \"description\": \"...\", \"url\": \"https://...\"}], \
\"riskLevel\": \"low\" | \"moderate\" | \"high\"}\n\
Always include helpful mental-health resources, UK-specific when possible, even if risk is low.";

/// Builds the prompts and shapes the upstream answers for both features.
pub struct CommentaryService {
    model: Arc<dyn TextModel>,
}

impl CommentaryService {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    /// Roast commentary over the user's rewards and recent payments.
    pub async fn roast(
        &self,
        balance: Decimal,
        monthly_earned: Decimal,
        recent_payments: &[PaymentLine],
    ) -> Result<String, AiError> {
        let payments = recent_payments
            .iter()
            .map(|p| format!("{} (£{})", p.merchant, p.amount))
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = format!(
            "Analyze this student's spending habits:\n\
             - Rewards Balance: £{balance:.2} (this is good - they're earning cashback!)\n\
             - Monthly Rewards Earned: £{monthly_earned:.2}\n\
             - Recent Payments (THIS IS WHERE YOU FOCUS): {payments}\n\n\
             Roast their SPENDING choices and provide insights based on WHAT they're paying \
             for and HOW MUCH!"
        );
        self.model.generate(ROAST_SYSTEM, &prompt, false).await
    }

    /// Wellbeing analysis over the last transactions (at most 20 rows).
    ///
    /// Upstream or parse trouble degrades to the safe fallback report
    /// instead of an error; only auth/rate failures propagate so the
    /// gateway can pass their statuses through.
    pub async fn wellbeing(
        &self,
        transactions: &[Transaction],
    ) -> Result<WellbeingReport, AiError> {
        let rows: Vec<serde_json::Value> = transactions
            .iter()
            .take(20)
            .map(|t| {
                let hour = t.date.hour();
                serde_json::json!({
                    "merchant": t.merchant,
                    "amount": t.amount,
                    "date": t.date,
                    "hour": hour,
                    "isLateNight": hour >= 22 || hour <= 4,
                    "type": t.kind,
                })
            })
            .collect();
        let prompt = format!(
            "Analyze these transactions for wellbeing concerns:\n{}\n\n\
             Look for substance abuse indicators, stress indicators and mental health \
             concerns. Provide a JSON response with the analysis.",
            serde_json::to_string_pretty(&rows).unwrap_or_default()
        );

        match self.model.generate(WELLBEING_SYSTEM, &prompt, true).await {
            Ok(text) => {
                let mut report: WellbeingReport = match serde_json::from_str(&text) {
                    Ok(report) => report,
                    Err(err) => {
                        tracing::warn!(%err, "failed to parse wellbeing analysis, using fallback");
                        fallback_report()
                    }
                };
                if report.resources.is_empty() {
                    report.resources = fallback_resources();
                }
                Ok(report)
            }
            Err(AiError::MalformedResponse) => Ok(fallback_report()),
            Err(other) => Err(other),
        }
    }
}

/// UK support resources returned whenever the upstream gives none.
pub fn fallback_resources() -> Vec<WellbeingResource> {
    vec![
        WellbeingResource {
            title: "Mind - Mental Health Charity".to_string(),
            description: "UK mental health charity providing advice and support".to_string(),
            url: "https://www.mind.org.uk".to_string(),
        },
        WellbeingResource {
            title: "Samaritans".to_string(),
            description: "24/7 free confidential support for anyone in distress".to_string(),
            url: "https://www.samaritans.org".to_string(),
        },
        WellbeingResource {
            title: "Student Minds".to_string(),
            description: "UK's student mental health charity".to_string(),
            url: "https://www.studentminds.org.uk".to_string(),
        },
    ]
}

pub fn fallback_report() -> WellbeingReport {
    WellbeingReport {
        summary: "We've analyzed your transaction patterns. Your spending habits appear \
                  healthy overall. Remember to prioritize your mental wellbeing and reach \
                  out for support if needed."
            .to_string(),
        concerns: Vec::new(),
        resources: fallback_resources(),
        risk_level: RiskLevel::Low,
    }
}

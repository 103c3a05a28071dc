//! OpenAPI / Swagger UI Documentation
//!
//! Auto-generated OpenAPI 3.0 documentation for the perkpulse API.
//!
//! - Swagger UI: `http://localhost:3001/docs`
//! - OpenAPI JSON: `http://localhost:3001/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::ai::{PaymentLine, RiskLevel, WellbeingReport, WellbeingResource};
use crate::gateway::types::{
    AddPerkRequest, AddPerkResponse, BalanceResponse, CreateTransactionRequest, DashDealsResponse,
    DashLoginRequest, DashPartnerInfo, DashPartnerResponse, DashRedeemsResponse, DashStats,
    DashStatsResponse, DealListing, EndTestResponse, HealthResponse, PartnerPerksResponse,
    PartnerRedeemRequest, PartnerRedeemResponse, PartnerSummary, PartnerWithLogo,
    PartnersResponse, PerksResponse, RedeemPerkRequest, RedeemPerkResponse, RoastRequest,
    RoastResponse, StartTestResponse, TransactionResponse, UserLoginRequest, WalletResponse,
    WellbeingRequest,
};
use crate::models::{Deal, Partner, Perk, Transaction, TxnKind};

/// Opaque bearer session-token security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Opaque session token from /login: `Bearer {token}`. Also accepted via \
                     the `x-auth-cookie` header, a `cookie` body field or a `cookie` query \
                     parameter, in that precedence order.",
                ))),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "perkpulse API",
        version = "0.1.0",
        description = "Spend-to-earn student rewards demo: cashback ledger, partner perks, \
                       live spending simulator and AI commentary.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3001", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::auth::user_login,
        crate::gateway::handlers::auth::dash_login,
        crate::gateway::handlers::wallet::get_balance,
        crate::gateway::handlers::wallet::get_wallet,
        crate::gateway::handlers::wallet::create_transaction,
        crate::gateway::handlers::wallet::redeem_perk,
        crate::gateway::handlers::perks::get_perks,
        crate::gateway::handlers::perks::get_partners,
        crate::gateway::handlers::perks::get_partner_perks,
        crate::gateway::handlers::perks::redeem_partner_perk,
        crate::gateway::handlers::dash::dash_redeems,
        crate::gateway::handlers::dash::dash_partner,
        crate::gateway::handlers::dash::dash_deals,
        crate::gateway::handlers::dash::dash_stats,
        crate::gateway::handlers::dash::dash_add_perk,
        crate::gateway::handlers::simulation::start_test,
        crate::gateway::handlers::simulation::end_test,
        crate::gateway::handlers::ai::generate_roast,
        crate::gateway::handlers::ai::analyze_wellbeing,
    ),
    components(
        schemas(
            HealthResponse,
            UserLoginRequest,
            DashLoginRequest,
            BalanceResponse,
            WalletResponse,
            CreateTransactionRequest,
            TransactionResponse,
            RedeemPerkRequest,
            RedeemPerkResponse,
            PerksResponse,
            PartnersResponse,
            PartnerWithLogo,
            PartnerPerksResponse,
            PartnerSummary,
            PartnerRedeemRequest,
            PartnerRedeemResponse,
            DashRedeemsResponse,
            DashPartnerResponse,
            DashPartnerInfo,
            DashDealsResponse,
            DealListing,
            DashStatsResponse,
            DashStats,
            AddPerkRequest,
            AddPerkResponse,
            StartTestResponse,
            EndTestResponse,
            RoastRequest,
            RoastResponse,
            WellbeingRequest,
            PaymentLine,
            WellbeingReport,
            WellbeingResource,
            RiskLevel,
            Transaction,
            TxnKind,
            Perk,
            Partner,
            Deal,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Session issuance for users and dashboards"),
        (name = "Wallet", description = "Balance, transactions and generic perk redemption"),
        (name = "Perks", description = "Perk catalog and partner deal engagement"),
        (name = "Dashboard", description = "Partner analytics and deal management"),
        (name = "Simulation", description = "Scripted 12-month spending simulator"),
        (name = "AI", description = "Roast and wellbeing commentary proxies"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "perkpulse API");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json = ApiDoc::openapi().to_json();
        assert!(json.is_ok());
        assert!(json.unwrap().contains("/api/user/balance"));
    }
}

//! Request handlers, grouped by surface.

pub mod ai;
pub mod auth;
pub mod dash;
pub mod health;
pub mod perks;
pub mod simulation;
pub mod wallet;

pub use ai::{analyze_wellbeing, generate_roast};
pub use auth::{dash_login, user_login};
pub use dash::{dash_add_perk, dash_deals, dash_partner, dash_redeems, dash_stats};
pub use health::health_check;
pub use perks::{get_partner_perks, get_partners, get_perks, redeem_partner_perk};
pub use simulation::{end_test, start_test};
pub use wallet::{create_transaction, get_balance, get_wallet, redeem_perk};

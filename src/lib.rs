//! perkpulse - Spend-to-earn student rewards backend
//!
//! A single-process, memory-resident demo service: users record payments
//! and earn 5% cashback credits, redeem perks from partner merchants and
//! watch a scripted 12-month spending simulation unfold in real time;
//! partner dashboards track deal engagement and add promotions.
//!
//! # Modules
//!
//! - [`core_types`] - Core type aliases (UserId, DealId, ...)
//! - [`models`] - Transaction, perk, partner and identity types
//! - [`seed`] - Fixed demo dataset (directories, perks, partner deals)
//! - [`session`] - Opaque-token session stores
//! - [`ledger`] - Per-user balance + transaction log
//! - [`catalog`] - Partner deals and engagement counters
//! - [`simulation`] - Scripted 12-month transaction simulator
//! - [`websocket`] - Broadcast-only real-time channel
//! - [`ai`] - Roast/wellbeing commentary proxy
//! - [`gateway`] - HTTP API (axum routers, session middleware)
//! - [`config`] / [`logging`] - YAML config and tracing setup

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod logging;

pub mod models;
pub mod seed;

// Services
pub mod ai;
pub mod catalog;
pub mod ledger;
pub mod session;
pub mod simulation;
pub mod websocket;

// HTTP surface
pub mod gateway;

// Convenient re-exports at crate root
pub use catalog::PerkCatalog;
pub use config::AppConfig;
pub use core_types::{DealId, PartnerId, PerkId, UserId};
pub use gateway::state::AppState;
pub use ledger::Ledger;
pub use models::{Deal, Partner, Perk, Transaction, TxnKind};
pub use session::SessionStore;
pub use simulation::SimulationEngine;
pub use websocket::{ConnectionManager, WsMessage};

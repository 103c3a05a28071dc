//! WebSocket module for real-time push notifications
//!
//! This module provides broadcast-only WebSocket support: refresh
//! triggers, perk redemption counts, deal additions and simulation
//! progress are fanned out to every connected client.

pub mod connection;
pub mod handler;
pub mod messages;

pub use connection::ConnectionManager;
pub use handler::ws_handler;
pub use messages::{ThresholdKind, WsMessage};

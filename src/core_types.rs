//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

/// User ID - opaque string identity, immutable after assignment.
///
/// # Usage:
/// - Primary key for wallets, sessions and simulation runs
/// - Doubles as the login name in the fixed demo directory
pub type UserId = String;

/// Partner ID - small sequential integer from the seed dataset.
///
/// Used together with [`DealId`] to derive deterministic view-counter
/// seeds, so it must stay stable across restarts.
pub type PartnerId = u32;

/// Deal ID - unique within one partner's catalog
pub type DealId = u32;

/// Generic perk ID - unique within the general perk list
pub type PerkId = u32;

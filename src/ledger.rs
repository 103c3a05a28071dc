//! Ledger - per-user reward balance and transaction log
//!
//! Every balance change goes through a validated operation that holds the
//! user's map entry write guard for the whole mutation, so concurrent
//! requests for the same user serialize and the invariant holds at all
//! times:
//!
//! ```text
//! balance == starting_balance + Σ credits(transactions) − Σ cost(redemptions)
//! ```

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::core_types::UserId;
use crate::models::{Transaction, TxnKind};
use crate::seed;

/// Reward rate: 5% of every recorded payment comes back as credits.
pub fn cashback_rate() -> Decimal {
    Decimal::new(5, 2)
}

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Transaction must include amount and description")]
    MissingField,
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("cost must not be negative")]
    NegativeCost,
    #[error("Insufficient funds")]
    InsufficientFunds {
        current_balance: Decimal,
        required: Decimal,
    },
}

#[derive(Debug)]
struct Wallet {
    balance: Decimal,
    transactions: Vec<Transaction>,
}

impl Wallet {
    fn with_balance(balance: Decimal) -> Self {
        Self {
            balance,
            transactions: Vec::new(),
        }
    }
}

/// Owned service state for all user wallets.
pub struct Ledger {
    wallets: DashMap<UserId, Wallet>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            wallets: DashMap::new(),
        }
    }

    /// First touch for an identity: set the directory starting balance
    /// and a small demo history so a fresh login has something to show.
    /// Idempotent - an account that already exists is left alone, so a
    /// re-login never re-seeds a wallet the simulator has reset.
    pub fn ensure_account(&self, user_id: &str) {
        if self.wallets.contains_key(user_id) {
            return;
        }
        let mut wallet = Wallet::with_balance(seed::initial_balance(user_id));
        wallet.transactions = demo_history(user_id, &mut rand::thread_rng());
        // entry() re-checks under the shard lock; a racing ensure wins once
        self.wallets.entry(user_id.to_string()).or_insert(wallet);
    }

    /// Current reward balance. Side-effect-free: an untouched account
    /// reports its would-be starting balance without being created.
    pub fn balance(&self, user_id: &str) -> Decimal {
        self.wallets
            .get(user_id)
            .map(|w| w.balance)
            .unwrap_or_else(|| seed::initial_balance(user_id))
    }

    /// Record a payment: append to the log and credit 5% of the amount.
    pub fn record(
        &self,
        user_id: &str,
        amount: Decimal,
        description: &str,
        kind: Option<TxnKind>,
        date: Option<DateTime<Utc>>,
        merchant: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        if description.trim().is_empty() {
            return Err(LedgerError::MissingField);
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }

        let date = date.unwrap_or_else(Utc::now);
        let credits = amount * cashback_rate();
        let txn = Transaction {
            id: new_txn_id(user_id, date),
            user_id: user_id.to_string(),
            amount,
            description: description.to_string(),
            kind: kind.unwrap_or_default(),
            credits,
            date,
            merchant: merchant.unwrap_or_else(|| description.to_string()),
        };

        let mut wallet = self
            .wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Wallet::with_balance(seed::initial_balance(user_id)));
        wallet.transactions.push(txn.clone());
        wallet.balance += credits;

        Ok(txn)
    }

    /// All transactions for a user, newest first. Ties on the date keep
    /// insertion order (stable sort).
    pub fn transactions(&self, user_id: &str) -> Vec<Transaction> {
        let mut txns = self
            .wallets
            .get(user_id)
            .map(|w| w.transactions.clone())
            .unwrap_or_default();
        txns.sort_by(|a, b| b.date.cmp(&a.date));
        txns
    }

    /// Debit a generic-perk cost. The affordability check and the debit
    /// happen under one write guard: two concurrent redemptions against
    /// one balance can never both succeed past it.
    ///
    /// Returns `(previous_balance, new_balance)`.
    pub fn redeem(&self, user_id: &str, cost: Decimal) -> Result<(Decimal, Decimal), LedgerError> {
        if cost < Decimal::ZERO {
            return Err(LedgerError::NegativeCost);
        }

        let mut wallet = self
            .wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Wallet::with_balance(seed::initial_balance(user_id)));

        let previous = wallet.balance;
        if previous < cost {
            return Err(LedgerError::InsufficientFunds {
                current_balance: previous,
                required: cost,
            });
        }

        wallet.balance -= cost;
        Ok((previous, wallet.balance))
    }

    /// Wipe the log and return the balance to its starting value. Used by
    /// the simulator for a clean run.
    pub fn reset(&self, user_id: &str) {
        let mut wallet = self
            .wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Wallet::with_balance(seed::initial_balance(user_id)));
        wallet.balance = seed::initial_balance(user_id);
        wallet.transactions.clear();
    }

    /// Apply a batch of already-built transactions in one guard: append
    /// everything, credit each row's frozen credits, keep the log sorted
    /// newest-first. The batch is fully visible before this returns, so
    /// events published afterwards always point at consistent state.
    pub fn apply_batch(&self, user_id: &str, batch: Vec<Transaction>) {
        let mut wallet = self
            .wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Wallet::with_balance(seed::initial_balance(user_id)));
        for txn in &batch {
            wallet.balance += txn.credits;
        }
        wallet.transactions.extend(batch);
        wallet.transactions.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// `{user}-{epoch millis}-{random base36 suffix}`, matching the id shape
/// the web client already parses.
fn new_txn_id(user_id: &str, date: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(6)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("{}-{}-{}", user_id, date.timestamp_millis(), suffix)
}

const HISTORY_ROWS: usize = 5;

const RENT_DESCRIPTIONS: &[&str] = &["Rent Payment", "Monthly Rent", "Housing Payment"];
const UTILITIES_DESCRIPTIONS: &[&str] =
    &["Electricity Bill", "Gas & Water Bill", "Energy Bill", "Heating"];
const BILLS_DESCRIPTIONS: &[&str] = &[
    "Internet & Subscriptions",
    "Mobile Phone",
    "Gym Membership",
    "Streaming Services",
    "Shopping",
];
const PAYMENT_DESCRIPTIONS: &[&str] =
    &["Groceries", "Food Delivery", "Transport", "Entertainment"];

fn history_description(rng: &mut impl Rng, kind: TxnKind) -> &'static str {
    let pool = match kind {
        TxnKind::Rent => RENT_DESCRIPTIONS,
        TxnKind::Utilities => UTILITIES_DESCRIPTIONS,
        TxnKind::Bills => BILLS_DESCRIPTIONS,
        TxnKind::Payment => PAYMENT_DESCRIPTIONS,
    };
    pool.choose(rng).copied().unwrap_or("Payment")
}

/// Synthesize the demo wallet history: five random payments within the
/// last 30 days, £20-£219, with type-appropriate descriptions.
pub fn demo_history(user_id: &str, rng: &mut impl Rng) -> Vec<Transaction> {
    const KINDS: [TxnKind; 4] = [
        TxnKind::Rent,
        TxnKind::Utilities,
        TxnKind::Bills,
        TxnKind::Payment,
    ];

    let now = Utc::now();
    let mut rows = Vec::with_capacity(HISTORY_ROWS);
    for _ in 0..HISTORY_ROWS {
        let days_ago = rng.gen_range(0..30);
        let date = now - Duration::days(days_ago);
        let kind = *KINDS.choose(rng).unwrap_or(&TxnKind::Payment);
        let description = history_description(rng, kind);
        let amount = Decimal::from(rng.gen_range(20..220i64));

        rows.push(Transaction {
            id: new_txn_id(user_id, date),
            user_id: user_id.to_string(),
            amount,
            description: description.to_string(),
            kind,
            credits: amount * cashback_rate(),
            date,
            merchant: description.to_string(),
        });
    }

    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[test]
    fn test_record_credits_five_percent() {
        let ledger = Ledger::new();
        let txn = ledger
            .record("user", dec(100, 0), "Shopping", None, None, None)
            .unwrap();

        assert_eq!(txn.credits, dec(500, 2));
        assert_eq!(txn.merchant, "Shopping");
        assert_eq!(txn.kind, TxnKind::Payment);
        // 56.75 + 5.00
        assert_eq!(ledger.balance("user"), dec(6175, 2));
    }

    #[test]
    fn test_record_rejects_bad_input() {
        let ledger = Ledger::new();
        assert_eq!(
            ledger.record("user", dec(0, 0), "x", None, None, None),
            Err(LedgerError::NonPositiveAmount)
        );
        assert_eq!(
            ledger.record("user", dec(-5, 0), "x", None, None, None),
            Err(LedgerError::NonPositiveAmount)
        );
        assert_eq!(
            ledger.record("user", dec(5, 0), "  ", None, None, None),
            Err(LedgerError::MissingField)
        );
        // Nothing was applied
        assert_eq!(ledger.balance("user"), dec(5675, 2));
        assert!(ledger.transactions("user").is_empty());
    }

    #[test]
    fn test_redeem_balance_scenario() {
        // 56.75 start, +100 payment, then a 70 and a 50 redemption
        let ledger = Ledger::new();
        ledger
            .record("user", dec(100, 0), "Shopping", None, None, None)
            .unwrap();
        assert_eq!(ledger.balance("user"), dec(6175, 2));

        let err = ledger.redeem("user", dec(70, 0)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                current_balance: dec(6175, 2),
                required: dec(70, 0),
            }
        );
        // Balance untouched by the failed redemption
        assert_eq!(ledger.balance("user"), dec(6175, 2));

        let (previous, new_balance) = ledger.redeem("user", dec(50, 0)).unwrap();
        assert_eq!(previous, dec(6175, 2));
        assert_eq!(new_balance, dec(1175, 2));
    }

    #[test]
    fn test_balance_invariant_holds() {
        let ledger = Ledger::new();
        ledger.ensure_account("user");

        let mut redeemed = Decimal::ZERO;
        for i in 1..=10 {
            ledger
                .record("user", dec(i * 7, 0), "Groceries", None, None, None)
                .unwrap();
        }
        if ledger.redeem("user", dec(3, 0)).is_ok() {
            redeemed += dec(3, 0);
        }

        let credits: Decimal = ledger
            .transactions("user")
            .iter()
            .map(|t| t.credits)
            .sum();
        assert_eq!(
            ledger.balance("user"),
            seed::initial_balance("user") + credits - redeemed
        );
    }

    #[test]
    fn test_transactions_sorted_newest_first() {
        let ledger = Ledger::new();
        let base = Utc::now();
        for offset in [5i64, 1, 9, 3] {
            ledger
                .record(
                    "user",
                    dec(10, 0),
                    "Transport",
                    None,
                    Some(base - Duration::days(offset)),
                    None,
                )
                .unwrap();
        }

        let txns = ledger.transactions("user");
        assert_eq!(txns.len(), 4);
        for pair in txns.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
    }

    #[test]
    fn test_concurrent_redemptions_cannot_both_succeed() {
        // Two redemptions of 6 against a balance of 10: exactly one wins.
        let ledger = Arc::new(Ledger::new());
        ledger.reset("alice");
        ledger
            .record("alice", dec(200, 0), "Groceries", None, None, None)
            .unwrap(); // balance 10.00

        let mut handles = Vec::new();
        for _ in 0..2 {
            let ledger = ledger.clone();
            handles.push(std::thread::spawn(move || {
                ledger.redeem("alice", dec(6, 0)).is_ok()
            }));
        }
        let successes: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();

        assert_eq!(successes, 1);
        assert_eq!(ledger.balance("alice"), dec(4, 0));
    }

    #[test]
    fn test_ensure_account_is_idempotent() {
        let ledger = Ledger::new();
        ledger.ensure_account("user");
        assert_eq!(ledger.transactions("user").len(), 5);

        ledger.ensure_account("user");
        assert_eq!(ledger.transactions("user").len(), 5);

        // Reset then re-ensure must not bring the demo history back
        ledger.reset("user");
        ledger.ensure_account("user");
        assert!(ledger.transactions("user").is_empty());
        assert_eq!(ledger.balance("user"), seed::initial_balance("user"));
    }

    #[test]
    fn test_demo_history_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let rows = demo_history("user", &mut rng);

        assert_eq!(rows.len(), 5);
        let now = Utc::now();
        for row in &rows {
            assert!(row.amount >= dec(20, 0) && row.amount < dec(220, 0));
            assert_eq!(row.credits, row.amount * cashback_rate());
            assert!(now - row.date <= Duration::days(30));
        }
        for pair in rows.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
    }
}

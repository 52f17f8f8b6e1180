//! iii token ledger.
//!
//! Credits raise the balance; only an explicit spend lowers it.
//! A spend that exceeds the balance fails and leaves the ledger untouched.

use crate::{
    error::{CoreError, CoreResult},
    types::Tokens,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    /// Positive for credits, negative for spends.
    pub amount: Tokens,
    pub source: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenLedger {
    pub balance: Tokens,
    pub lifetime_earned: Tokens,
    pub lifetime_spent: Tokens,
    /// Most recent first, bounded by the configured history size.
    pub recent: Vec<Transaction>,
    /// Monotonic counter used to build transaction ids.
    #[serde(default)]
    pub sequence: u64,
}

impl TokenLedger {
    pub fn credit(
        &mut self,
        amount: Tokens,
        source: &str,
        description: &str,
        now: DateTime<Utc>,
        history: usize,
    ) -> CoreResult<()> {
        if amount <= 0 {
            return Ok(());
        }
        let balance = add_tokens(self.balance, amount, "balance")?;
        let lifetime = add_tokens(self.lifetime_earned, amount, "lifetime earnings")?;
        self.balance = balance;
        self.lifetime_earned = lifetime;
        self.record(amount, source, description, now, history);
        Ok(())
    }

    pub fn spend(
        &mut self,
        amount: Tokens,
        source: &str,
        description: &str,
        now: DateTime<Utc>,
        history: usize,
    ) -> CoreResult<()> {
        if amount > self.balance {
            return Err(CoreError::InsufficientBalance {
                needed:    amount,
                available: self.balance,
            });
        }
        let spent = add_tokens(self.lifetime_spent, amount, "lifetime spending")?;
        self.balance -= amount;
        self.lifetime_spent = spent;
        self.record(-amount, source, description, now, history);
        Ok(())
    }

    fn record(
        &mut self,
        amount: Tokens,
        source: &str,
        description: &str,
        now: DateTime<Utc>,
        history: usize,
    ) {
        self.sequence = self.sequence.wrapping_add(1);
        let tx = Transaction {
            id: format!("tx_{}_{}", now.timestamp_millis(), self.sequence),
            amount,
            source: source.to_string(),
            description: description.to_string(),
            timestamp: now,
        };
        self.recent.insert(0, tx);
        self.recent.truncate(history);
    }
}

/// Sum two amounts, failing instead of wrapping.
pub(crate) fn add_tokens(a: Tokens, b: Tokens, what: &'static str) -> CoreResult<Tokens> {
    a.checked_add(b).ok_or(CoreError::Overflow(what))
}

/// Display form used by summaries: `1.2k iii`, `3.4M iii`.
pub fn format_tokens(amount: Tokens) -> String {
    let value = amount as f64;
    if amount.abs() >= 1_000_000 {
        format!("{:.1}M iii", value / 1_000_000.0)
    } else if amount.abs() >= 1_000 {
        format!("{:.1}k iii", value / 1_000.0)
    } else {
        format!("{amount} iii")
    }
}

//! Real-time card authorization gate
//!
//! The decision path consumed by the card-issuing webhook. It applies a
//! fixed sequence of hard gates, short-circuiting on the first failure,
//! and reads balances exclusively from the snapshot cache. It never
//! triggers a recalculation and never writes: stale-but-recent snapshot
//! data is the accepted tradeoff that keeps latency bounded regardless of
//! ledger size.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

use crate::core::snapshot::SnapshotCache;
use crate::core::traits::AccountDirectory;
use crate::types::AccountId;

/// Lifecycle status of an issued card
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Inactive,
    Canceled,
}

/// Verification status of a cardholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardholderStatus {
    Active,
    Blocked,
    Inactive,
}

/// An issued card as seen by the authorization path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCard {
    /// Processor-issued card reference, the key authorization requests carry
    pub reference: String,
    pub cardholder_id: u64,
    pub account_id: AccountId,
    pub status: CardStatus,
}

/// The person or business a card is issued to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardholder {
    pub id: u64,
    pub status: CardholderStatus,
}

/// In-memory registry of cards and cardholders
///
/// Card issuance is owned by an external subsystem; this registry mirrors
/// the lookup surface the gate needs.
#[derive(Debug, Default)]
pub struct CardDirectory {
    cards: DashMap<String, IssuedCard>,
    cardholders: DashMap<u64, Cardholder>,
}

impl CardDirectory {
    pub fn new() -> Self {
        CardDirectory {
            cards: DashMap::new(),
            cardholders: DashMap::new(),
        }
    }

    pub fn upsert_card(&self, card: IssuedCard) {
        self.cards.insert(card.reference.clone(), card);
    }

    pub fn upsert_cardholder(&self, cardholder: Cardholder) {
        self.cardholders.insert(cardholder.id, cardholder);
    }

    pub fn get_card(&self, reference: &str) -> Option<IssuedCard> {
        self.cards.get(reference).map(|c| c.clone())
    }

    pub fn get_cardholder(&self, id: u64) -> Option<Cardholder> {
        self.cardholders.get(&id).map(|c| *c)
    }
}

/// Outcome of an authorization request
///
/// Authorization always produces a decision; lookup failures become
/// declines with a reason code, never errors.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AuthorizationDecision {
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_amount: Option<i64>,
}

impl AuthorizationDecision {
    fn approve(amount: i64) -> Self {
        AuthorizationDecision {
            approved: true,
            reason: None,
            approved_amount: Some(amount),
        }
    }

    fn decline(reason: impl Into<String>) -> Self {
        AuthorizationDecision {
            approved: false,
            reason: Some(reason.into()),
            approved_amount: None,
        }
    }
}

/// The authorization decision function
///
/// Holds read handles only; evaluation takes no locks and performs no
/// writes.
pub struct AuthorizationGate {
    cards: Arc<CardDirectory>,
    accounts: Arc<dyn AccountDirectory>,
    snapshots: Arc<SnapshotCache>,
}

impl AuthorizationGate {
    pub fn new(
        cards: Arc<CardDirectory>,
        accounts: Arc<dyn AccountDirectory>,
        snapshots: Arc<SnapshotCache>,
    ) -> Self {
        AuthorizationGate {
            cards,
            accounts,
            snapshots,
        }
    }

    /// Evaluate one authorization request
    ///
    /// Gates run in a fixed order and short-circuit on the first failure,
    /// each with a distinct reason code. A missing snapshot is a decline
    /// (`no_fund_snapshot`): funds are treated as uncleared until the
    /// engine has written an aggregate row.
    pub fn evaluate(
        &self,
        card_reference: &str,
        amount: i64,
        currency: &str,
    ) -> AuthorizationDecision {
        let decision = self.run_gates(card_reference, amount);
        info!(
            card_reference,
            amount,
            currency,
            approved = decision.approved,
            reason = decision.reason.as_deref().unwrap_or(""),
            "issuing.authorization_evaluated"
        );
        decision
    }

    fn run_gates(&self, card_reference: &str, amount: i64) -> AuthorizationDecision {
        let card = match self.cards.get_card(card_reference) {
            Some(card) => card,
            None => return AuthorizationDecision::decline("card_not_found"),
        };
        if card.status != CardStatus::Active {
            return AuthorizationDecision::decline("card_inactive");
        }

        let cardholder = match self.cards.get_cardholder(card.cardholder_id) {
            Some(cardholder) => cardholder,
            None => return AuthorizationDecision::decline("cardholder_not_found"),
        };
        if cardholder.status != CardholderStatus::Active {
            return AuthorizationDecision::decline("cardholder_not_active");
        }

        let account = match self.accounts.get(card.account_id) {
            Some(account) => account,
            None => return AuthorizationDecision::decline("account_not_found"),
        };
        if !account.is_issuing_active() {
            return AuthorizationDecision::decline(format!(
                "issuing_not_active:{}",
                account.issuing_status.as_str()
            ));
        }

        let snapshot = match self.snapshots.get(card.account_id) {
            Some(snapshot) => snapshot,
            None => return AuthorizationDecision::decline("no_fund_snapshot"),
        };
        if snapshot.spendable_amount < amount {
            return AuthorizationDecision::decline("insufficient_spendable_balance");
        }

        AuthorizationDecision::approve(amount)
    }
}

//! Pure ledger computation: pair keys, polarity, share splitting, and the
//! application/reversal of purchases. No I/O, no clock, no randomness;
//! everything nondeterministic is passed in by the service layer.

use crate::core::errors::BalancerError;
use crate::core::models::balance::{Balance, Purchase};
use std::cmp::Ordering;

/// Separator between the two sorted user ids of a pair key.
pub const PAIR_KEY_SEPARATOR: char = ':';

/// Stored pair balances carry two extra decimal digits relative to purchase
/// amounts: values in `userBalances` are hundredths of a minor unit.
pub const BALANCE_SCALE: i64 = 100;

/// Largest accepted purchase amount, in minor units. Keeps every scaled
/// share and every realistic accumulation inside i64.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Canonical identifier of a two-user relationship: both ids sorted
/// lexicographically, joined with [`PAIR_KEY_SEPARATOR`]. Every reader and
/// writer of `userBalances` goes through this function.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}{PAIR_KEY_SEPARATOR}{b}")
    } else {
        format!("{b}{PAIR_KEY_SEPARATOR}{a}")
    }
}

/// The polarity rule: recording that `debtor` owes `creditor` some amount
/// changes the pair entry by `debit_sign(debtor, creditor) * amount`. The
/// lexicographically lower id is the reference side of the key, so a
/// positive stored value always means the greater id owes the lower one.
pub fn debit_sign(debtor: &str, creditor: &str) -> i64 {
    if debtor > creditor { 1 } else { -1 }
}

/// Per-head share of a purchase, in hundredths of a minor unit: the scaled
/// amount divided by the consumer count, rounded half-to-even exactly once.
pub fn split_share(amount: i64, consumer_count: usize) -> Result<i64, BalancerError> {
    if amount <= 0 {
        return Err(BalancerError::invalid_input(
            "amount",
            "has to be a positive integer",
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(BalancerError::invalid_input("amount", "exceeds the maximum"));
    }
    if consumer_count == 0 {
        return Err(BalancerError::invalid_input(
            "consumers",
            "must not be empty",
        ));
    }

    let numer = amount as i128 * BALANCE_SCALE as i128;
    let denom = consumer_count as i128;
    let quot = numer / denom;
    let rem = numer % denom;
    let rounded = match (rem * 2).cmp(&denom) {
        Ordering::Less => quot,
        Ordering::Greater => quot + 1,
        // tie: round to the even quotient
        Ordering::Equal => {
            if quot % 2 == 0 {
                quot
            } else {
                quot + 1
            }
        }
    };
    Ok(rounded as i64)
}

/// Viewer-relative signed balance against one peer: positive means the
/// other side owes the viewer. The single source of truth for sign
/// interpretation; idempotent and deterministic.
pub fn peer_balance(balance: &Balance, viewer: &str, other: &str) -> i64 {
    let raw = balance
        .user_balances
        .get(&pair_key(viewer, other))
        .copied()
        .unwrap_or(0);
    if viewer > other { -raw } else { raw }
}

/// Validates and applies one split purchase to the in-memory balance:
/// updates the pair entries for every consumer other than the purchaser and
/// appends the purchase record. The caller persists the document.
pub fn apply_split_purchase(
    balance: &mut Balance,
    purchase_id: String,
    purchaser: &str,
    amount: i64,
    description: &str,
    consumers: &[String],
    timestamp: i64,
) -> Result<(), BalancerError> {
    if description.trim().is_empty() {
        return Err(BalancerError::invalid_input(
            "description",
            "must not be empty",
        ));
    }

    // duplicates carry no meaning for the split; first occurrence keeps
    // the display order
    let consumers = dedup_consumers(consumers);
    let share = split_share(amount, consumers.len())?;

    if !balance.is_member(purchaser) {
        return Err(BalancerError::InvalidMember(purchaser.to_string()));
    }
    for consumer in &consumers {
        if !balance.is_member(consumer) {
            return Err(BalancerError::InvalidMember(consumer.clone()));
        }
    }

    apply_entries(balance, purchaser, &consumers, share);
    balance.purchases.push(Purchase {
        id: purchase_id,
        timestamp,
        amount,
        purchaser: purchaser.to_string(),
        consumers,
        description: description.to_string(),
    });
    Ok(())
}

/// Removes a purchase record and applies the exact inverse of every ledger
/// entry it produced, restoring the pre-purchase pair balances.
pub fn revert_purchase(
    balance: &mut Balance,
    purchase_id: &str,
) -> Result<Purchase, BalancerError> {
    let position = balance
        .purchases
        .iter()
        .position(|purchase| purchase.id == purchase_id)
        .ok_or_else(|| BalancerError::PurchaseNotFound(purchase_id.to_string()))?;
    let purchase = balance.purchases.remove(position);

    // stored consumers are already deduplicated, so the share recomputes
    // to exactly the value applied at creation
    let share = split_share(purchase.amount, purchase.consumers.len())?;
    apply_entries(balance, &purchase.purchaser, &purchase.consumers, -share);
    Ok(purchase)
}

fn apply_entries(balance: &mut Balance, purchaser: &str, consumers: &[String], share: i64) {
    for consumer in consumers {
        // self-consumption cancels against the purchaser's own share and
        // never reaches the ledger
        if consumer == purchaser {
            continue;
        }
        let entry = balance
            .user_balances
            .entry(pair_key(consumer, purchaser))
            .or_insert(0);
        *entry += debit_sign(consumer, purchaser) * share;
    }
}

fn dedup_consumers(consumers: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(consumers.len());
    for consumer in consumers {
        if !unique.contains(consumer) {
            unique.push(consumer.clone());
        }
    }
    unique
}

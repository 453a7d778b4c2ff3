//! Property-based tests for the pure ledger engine.

use crate::core::ledger::{self, BALANCE_SCALE};
use crate::core::models::balance::Balance;
use crate::core::models::user::PublicUser;
use proptest::prelude::*;

fn member(id: &str) -> PublicUser {
    PublicUser {
        id: id.to_string(),
        username: id.to_string(),
        nickname: id.to_string(),
    }
}

fn balance_with_members(ids: &[String]) -> Balance {
    let mut balance = Balance::new("balance".to_string(), "Test".to_string(), &member(&ids[0]));
    for id in &ids[1..] {
        balance.users.insert(id.clone(), member(id));
    }
    balance
}

// Strategy: 2..6 distinct member ids
fn member_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{1,8}", 2..6).prop_map(|ids| ids.into_iter().collect())
}

// Strategy: purchases as (purchaser picker, amount, consumer pickers);
// pickers are reduced modulo the member count when applied
fn purchases() -> impl Strategy<Value = Vec<(usize, i64, Vec<usize>)>> {
    prop::collection::vec(
        (
            0usize..32,
            1i64..=1_000_000,
            prop::collection::vec(0usize..32, 1..4),
        ),
        1..8,
    )
}

fn apply_all(balance: &mut Balance, ids: &[String], purchases: &[(usize, i64, Vec<usize>)]) {
    for (n, (purchaser, amount, consumers)) in purchases.iter().enumerate() {
        let purchaser = ids[purchaser % ids.len()].clone();
        let consumers: Vec<String> = consumers
            .iter()
            .map(|picker| ids[picker % ids.len()].clone())
            .collect();
        ledger::apply_split_purchase(
            balance,
            format!("purchase-{n}"),
            &purchaser,
            *amount,
            "prop",
            &consumers,
            0,
        )
        .unwrap();
    }
}

proptest! {
    #[test]
    fn peer_balances_are_antisymmetric(ids in member_ids(), purchases in purchases()) {
        let mut balance = balance_with_members(&ids);
        apply_all(&mut balance, &ids, &purchases);

        for a in &ids {
            for b in &ids {
                prop_assert_eq!(
                    ledger::peer_balance(&balance, a, b) + ledger::peer_balance(&balance, b, a),
                    0
                );
            }
        }
    }

    #[test]
    fn view_derivation_is_idempotent_and_pure(ids in member_ids(), purchases in purchases()) {
        let mut balance = balance_with_members(&ids);
        apply_all(&mut balance, &ids, &purchases);

        let before = balance.user_balances.clone();
        for a in &ids {
            for b in &ids {
                prop_assert_eq!(
                    ledger::peer_balance(&balance, a, b),
                    ledger::peer_balance(&balance, a, b)
                );
            }
        }
        prop_assert_eq!(&balance.user_balances, &before);
    }

    #[test]
    fn equal_split_charges_every_consumer_one_share(
        ids in member_ids(),
        amount in 1i64..=1_000_000,
    ) {
        let mut balance = balance_with_members(&ids);
        let purchaser = ids[0].clone();
        let consumers: Vec<String> = ids[1..].to_vec();
        ledger::apply_split_purchase(
            &mut balance,
            "purchase-0".to_string(),
            &purchaser,
            amount,
            "prop",
            &consumers,
            0,
        )
        .unwrap();

        let share = ledger::split_share(amount, consumers.len()).unwrap();
        for consumer in &consumers {
            prop_assert_eq!(ledger::peer_balance(&balance, &purchaser, consumer), share);
        }
    }

    #[test]
    fn self_consumption_matches_the_reduced_purchase(
        ids in member_ids(),
        per_head in 1i64..=10_000,
    ) {
        let n = ids.len() as i64;
        let purchaser = ids[0].clone();

        let mut with_self = balance_with_members(&ids);
        ledger::apply_split_purchase(
            &mut with_self,
            "purchase-0".to_string(),
            &purchaser,
            per_head * n,
            "prop",
            &ids,
            0,
        )
        .unwrap();

        let mut without_self = balance_with_members(&ids);
        ledger::apply_split_purchase(
            &mut without_self,
            "purchase-0".to_string(),
            &purchaser,
            per_head * (n - 1),
            "prop",
            &ids[1..],
            0,
        )
        .unwrap();

        for a in &ids {
            for b in &ids {
                prop_assert_eq!(
                    ledger::peer_balance(&with_self, a, b),
                    ledger::peer_balance(&without_self, a, b)
                );
            }
        }
    }

    #[test]
    fn deleting_a_purchase_restores_the_prior_ledger(
        ids in member_ids(),
        purchases in purchases(),
        amount in 1i64..=1_000_000,
    ) {
        let mut balance = balance_with_members(&ids);
        apply_all(&mut balance, &ids, &purchases);
        let snapshot = balance.clone();

        let consumers: Vec<String> = ids[1..].to_vec();
        ledger::apply_split_purchase(
            &mut balance,
            "target".to_string(),
            &ids[0],
            amount,
            "prop",
            &consumers,
            0,
        )
        .unwrap();
        ledger::revert_purchase(&mut balance, "target").unwrap();

        prop_assert_eq!(balance.purchases.len(), snapshot.purchases.len());
        for a in &ids {
            for b in &ids {
                prop_assert_eq!(
                    ledger::peer_balance(&balance, a, b),
                    ledger::peer_balance(&snapshot, a, b)
                );
            }
        }
    }
}

#[test]
fn split_share_rounds_half_to_even() {
    // 100 / 8 = 12.5 hundredths: ties go to the even quotient
    assert_eq!(ledger::split_share(1, 8).unwrap(), 12);
    // 300 / 8 = 37.5 hundredths
    assert_eq!(ledger::split_share(3, 8).unwrap(), 38);
    // plain truncation when below the halfway point
    assert_eq!(ledger::split_share(100, 3).unwrap(), 3333);
    assert_eq!(ledger::split_share(900, 2).unwrap(), 450 * BALANCE_SCALE);
}

#[test]
fn pair_keys_are_order_independent() {
    assert_eq!(ledger::pair_key("alice", "bob"), "alice:bob");
    assert_eq!(ledger::pair_key("bob", "alice"), "alice:bob");
    assert_eq!(ledger::debit_sign("bob", "alice"), 1);
    assert_eq!(ledger::debit_sign("alice", "bob"), -1);
}

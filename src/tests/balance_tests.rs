use crate::constants::{BALANCE_CREATED, USER_REGISTERED};
use crate::core::errors::BalancerError;
use crate::tests::{create_test_service, test_user};

#[tokio::test]
async fn create_balance_makes_the_creator_sole_member() {
    let service = create_test_service();
    let alice = test_user("alice");

    let balance = service
        .create_balance(&alice, "Road trip".to_string())
        .await
        .unwrap();

    assert_eq!(balance.name, "Road trip");
    assert_eq!(balance.owner, alice.id);
    assert_eq!(balance.users.len(), 1);
    assert!(balance.is_member(&alice.id));
    assert!(balance.purchases.is_empty());
    assert!(balance.user_balances.is_empty());
    // opaque hash id
    assert_eq!(balance.id.len(), 64);

    // the creator's own index lists the new balance
    let alice_doc = service.get_user(&alice).await.unwrap();
    assert_eq!(alice_doc.balances[&balance.id].name, "Road trip");
}

#[tokio::test]
async fn create_balance_requires_a_name() {
    let service = create_test_service();
    let alice = test_user("alice");

    for name in ["", "   "] {
        let err = service
            .create_balance(&alice, name.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, BalancerError::InvalidInput(..)), "{err}");
    }
}

#[tokio::test]
async fn get_balance_rejects_unknown_ids() {
    let service = create_test_service();
    let alice = test_user("alice");

    let err = service.get_balance(&alice, "missing").await.unwrap_err();
    assert!(matches!(err, BalancerError::BalanceNotFound(_)), "{err}");
}

#[tokio::test]
async fn only_members_may_read_a_balance() {
    let service = create_test_service();
    let alice = test_user("alice");
    let bob = test_user("bob");

    let balance = service
        .create_balance(&alice, "Dinner".to_string())
        .await
        .unwrap();

    let err = service.get_balance(&bob, &balance.id).await.unwrap_err();
    assert!(matches!(err, BalancerError::Forbidden(_)), "{err}");

    service.join_balance(&bob, &balance.id).await.unwrap();
    let visible = service.get_balance(&bob, &balance.id).await.unwrap();
    assert!(visible.is_member(&bob.id));
}

#[tokio::test]
async fn mutations_are_audit_logged() {
    let service = create_test_service();
    let alice = test_user("alice");

    service
        .create_balance(&alice, "Groceries".to_string())
        .await
        .unwrap();

    let logs = service.get_app_logs().await.unwrap();
    let actions: Vec<&str> = logs.iter().map(|log| log.action.as_str()).collect();
    assert!(actions.contains(&USER_REGISTERED));
    assert!(actions.contains(&BALANCE_CREATED));
}

use crate::auth::identity::user_id_for_username;
use crate::core::errors::BalancerError;
use crate::tests::{create_test_service, test_user};

#[tokio::test]
async fn joining_updates_both_documents() {
    let service = create_test_service();
    let alice = test_user("alice");
    let bob = test_user("bob");

    let balance = service
        .create_balance(&alice, "Flat share".to_string())
        .await
        .unwrap();
    let joined = service.join_balance(&bob, &balance.id).await.unwrap();

    // balance side: member index
    assert_eq!(joined.users.len(), 2);
    assert_eq!(joined.users[&bob.id].username, "bob");

    // user side: balance index
    let bob_doc = service.get_user(&bob).await.unwrap();
    assert_eq!(bob_doc.balances[&balance.id].name, "Flat share");
}

#[tokio::test]
async fn joining_twice_is_idempotent() {
    let service = create_test_service();
    let alice = test_user("alice");
    let bob = test_user("bob");

    let balance = service
        .create_balance(&alice, "Lunch".to_string())
        .await
        .unwrap();
    service.join_balance(&bob, &balance.id).await.unwrap();
    let rejoined = service.join_balance(&bob, &balance.id).await.unwrap();

    assert_eq!(rejoined.users.len(), 2);
    let bob_doc = service.get_user(&bob).await.unwrap();
    assert_eq!(bob_doc.balances.len(), 1);
}

#[tokio::test]
async fn joining_an_unknown_balance_fails() {
    let service = create_test_service();
    let bob = test_user("bob");

    let err = service.join_balance(&bob, "missing").await.unwrap_err();
    assert!(matches!(err, BalancerError::BalanceNotFound(_)), "{err}");
}

#[tokio::test]
async fn membership_requires_an_existing_user_document() {
    let service = create_test_service();
    let alice = test_user("alice");

    let balance = service
        .create_balance(&alice, "Drinks".to_string())
        .await
        .unwrap();

    // a user id that was never registered
    let ghost = user_id_for_username("ghost");
    let err = service
        .add_user_to_balance(&ghost, &balance.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BalancerError::UserNotFound(_)), "{err}");

    // the balance document is untouched
    let unchanged = service.get_balance(&alice, &balance.id).await.unwrap();
    assert_eq!(unchanged.users.len(), 1);
}

//! Cheque issuance against a scripted chain.

use chequebook::core::{Amount, SignedCheque};
use chequebook::store::StoreError;
use chequebook::{deliver_fn, ChainError, ChequebookError, TOTAL_ISSUED_KEY};
use chequebook_testkit::{
    beneficiary, init_test_tracing, FailingDelivery, RecordingDelivery, TestChequebook,
    CHEQUEBOOK_ADDRESS,
};

#[tokio::test]
async fn issue_then_cash_then_withdraw() {
    init_test_tracing();
    let fixture = TestChequebook::funded(100);
    let service = &fixture.service;
    let delivery = RecordingDelivery::new();
    let peer = beneficiary(1);

    let cheque = service
        .issue(peer, Amount::new(30), &delivery)
        .await
        .unwrap();
    assert_eq!(cheque.chequebook(), &CHEQUEBOOK_ADDRESS);
    assert_eq!(cheque.beneficiary(), &peer);
    assert_eq!(cheque.cumulative_payout(), Amount::new(30));
    assert_eq!(service.last_cheque(&peer).await.unwrap(), cheque);
    assert_eq!(service.total_issued().await.unwrap(), Amount::new(30));
    assert_eq!(service.available_balance().await.unwrap(), Amount::new(70));

    // The beneficiary cashes 20 of the 30.
    fixture.chain.set_balance(Amount::new(80));
    fixture.chain.set_total_paid_out(Amount::new(20));
    assert_eq!(service.available_balance().await.unwrap(), Amount::new(70));

    service.withdraw(Amount::new(70)).await.unwrap();
    assert_eq!(fixture.chain.withdrawals().len(), 1);

    assert!(matches!(
        service.withdraw(Amount::new(71)).await,
        Err(ChequebookError::InsufficientFunds { requested, available })
            if requested == Amount::new(71) && available == Amount::new(70)
    ));
}

#[tokio::test]
async fn available_balance_walkthrough() {
    let fixture = TestChequebook::funded(100);
    let service = &fixture.service;
    let delivery = RecordingDelivery::new();
    let (b1, b2) = (beneficiary(1), beneficiary(2));

    let first = service.issue(b1, Amount::new(30), &delivery).await.unwrap();
    assert_eq!(first.cumulative_payout(), Amount::new(30));
    assert_eq!(service.total_issued().await.unwrap(), Amount::new(30));

    let err = service
        .issue(b2, Amount::new(80), &delivery)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChequebookError::OutOfFunds { available, .. } if available == Amount::new(70)
    ));
    assert!(matches!(
        service.last_cheque(&b2).await,
        Err(ChequebookError::NoCheque(_))
    ));
    assert_eq!(service.total_issued().await.unwrap(), Amount::new(30));

    let second = service.issue(b2, Amount::new(70), &delivery).await.unwrap();
    assert_eq!(second.cumulative_payout(), Amount::new(70));
    assert_eq!(service.total_issued().await.unwrap(), Amount::new(100));
    assert_eq!(service.available_balance().await.unwrap(), Amount::ZERO);
}

#[tokio::test]
async fn cumulative_payout_accumulates_per_beneficiary() {
    let fixture = TestChequebook::funded(100);
    let service = &fixture.service;
    let delivery = RecordingDelivery::new();

    service
        .issue(beneficiary(1), Amount::new(10), &delivery)
        .await
        .unwrap();
    service
        .issue(beneficiary(2), Amount::new(5), &delivery)
        .await
        .unwrap();
    let second = service
        .issue(beneficiary(1), Amount::new(15), &delivery)
        .await
        .unwrap();

    assert_eq!(second.cumulative_payout(), Amount::new(25));
    assert_eq!(
        service
            .last_cheque(&beneficiary(2))
            .await
            .unwrap()
            .cumulative_payout(),
        Amount::new(5)
    );
    assert_eq!(service.total_issued().await.unwrap(), Amount::new(30));
    assert_eq!(delivery.delivered().len(), 3);
    assert_eq!(delivery.last(), Some(second));
}

#[tokio::test]
async fn issued_cheques_verify_under_issuer_key() {
    let fixture = TestChequebook::funded(10);
    let delivery = RecordingDelivery::new();

    let cheque = fixture
        .service
        .issue(beneficiary(3), Amount::new(10), &delivery)
        .await
        .unwrap();
    cheque.verify(&fixture.issuer).unwrap();
}

#[tokio::test]
async fn exact_available_balance_can_be_issued() {
    let fixture = TestChequebook::funded(50);
    let delivery = RecordingDelivery::new();

    fixture
        .service
        .issue(beneficiary(1), Amount::new(50), &delivery)
        .await
        .unwrap();
    assert_eq!(
        fixture.service.available_balance().await.unwrap(),
        Amount::ZERO
    );
}

#[tokio::test]
async fn out_of_funds_leaves_ledger_untouched() {
    init_test_tracing();
    let fixture = TestChequebook::funded(100);
    let delivery = RecordingDelivery::new();

    fixture
        .service
        .issue(beneficiary(1), Amount::new(80), &delivery)
        .await
        .unwrap();
    let before = fixture.ledger().await;

    let err = fixture
        .service
        .issue(beneficiary(2), Amount::new(30), &delivery)
        .await
        .unwrap_err();
    match err {
        ChequebookError::OutOfFunds {
            requested,
            available,
        } => {
            assert_eq!(requested, Amount::new(30));
            assert_eq!(available, Amount::new(20));
        }
        other => panic!("expected OutOfFunds, got {other:?}"),
    }

    assert_eq!(fixture.ledger().await, before);
    assert_eq!(delivery.delivered().len(), 1);
    assert!(matches!(
        fixture.service.last_cheque(&beneficiary(2)).await,
        Err(ChequebookError::NoCheque(_))
    ));
}

#[tokio::test]
async fn failed_delivery_persists_nothing() {
    let fixture = TestChequebook::funded(100);
    let ok = RecordingDelivery::new();
    fixture
        .service
        .issue(beneficiary(1), Amount::new(10), &ok)
        .await
        .unwrap();
    let before = fixture.ledger().await;

    let failing = FailingDelivery::new("peer hung up");
    let err = fixture
        .service
        .issue(beneficiary(1), Amount::new(10), &failing)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "cheque delivery failed: peer hung up");
    match err {
        ChequebookError::Delivery(source) => assert_eq!(source.to_string(), "peer hung up"),
        other => panic!("expected Delivery, got {other:?}"),
    }
    assert_eq!(failing.attempts(), 1);
    assert_eq!(fixture.ledger().await, before);
    assert_eq!(
        fixture.service.total_issued().await.unwrap(),
        Amount::new(10)
    );
}

#[tokio::test]
async fn zero_amount_is_rejected_before_delivery() {
    let fixture = TestChequebook::funded(100);
    let delivery = RecordingDelivery::new();

    let err = fixture
        .service
        .issue(beneficiary(1), Amount::ZERO, &delivery)
        .await
        .unwrap_err();
    assert!(matches!(err, ChequebookError::InvalidAmount));
    assert!(delivery.delivered().is_empty());
    assert!(fixture.ledger().await.is_empty());
}

#[tokio::test]
async fn write_failure_surfaces_after_delivery() {
    let fixture = TestChequebook::funded(100);
    let delivery = RecordingDelivery::new();
    fixture.store.set_fail_writes(true);

    let err = fixture
        .service
        .issue(beneficiary(1), Amount::new(10), &delivery)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ChequebookError::Store(StoreError::Unavailable(_))
    ));
    // Delivered but unrecorded: the caller learns about it from the error.
    assert_eq!(delivery.delivered().len(), 1);
    assert!(fixture.ledger().await.is_empty());

    fixture.store.set_fail_writes(false);
    let retried = fixture
        .service
        .issue(beneficiary(1), Amount::new(10), &delivery)
        .await
        .unwrap();
    assert_eq!(retried.cumulative_payout(), Amount::new(10));
}

#[tokio::test]
async fn chain_failure_aborts_before_signing() {
    let fixture = TestChequebook::funded(100);
    let delivery = RecordingDelivery::new();
    fixture.chain.set_rpc_down(true);

    let err = fixture
        .service
        .issue(beneficiary(1), Amount::new(10), &delivery)
        .await
        .unwrap_err();
    assert!(matches!(err, ChequebookError::Chain(ChainError::Rpc(_))));
    assert!(delivery.delivered().is_empty());
}

#[tokio::test]
async fn counter_and_cheque_written_together() {
    let fixture = TestChequebook::funded(100);
    let delivery = RecordingDelivery::new();

    fixture
        .service
        .issue(beneficiary(1), Amount::new(10), &delivery)
        .await
        .unwrap();
    fixture
        .service
        .issue(beneficiary(2), Amount::new(20), &delivery)
        .await
        .unwrap();

    assert_eq!(fixture.store.writes(), 2);
    let keys: Vec<String> = fixture.ledger().await.into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys.len(), 3);
    assert!(keys.contains(&TOTAL_ISSUED_KEY.to_string()));
}

#[tokio::test]
async fn closure_delivery() {
    let fixture = TestChequebook::funded(100);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<SignedCheque>();
    let delivery = deliver_fn(move |cheque| {
        let tx = tx.clone();
        async move {
            tx.send(cheque)?;
            Ok::<_, anyhow::Error>(())
        }
    });

    let issued = fixture
        .service
        .issue(beneficiary(9), Amount::new(1), &delivery)
        .await
        .unwrap();
    assert_eq!(rx.recv().await, Some(issued));
}

#[tokio::test]
async fn restart_resumes_from_persisted_ledger() {
    let fixture = TestChequebook::funded(100);
    let delivery = RecordingDelivery::new();
    fixture
        .service
        .issue(beneficiary(1), Amount::new(40), &delivery)
        .await
        .unwrap();

    let restarted = fixture.restart();
    assert_eq!(
        restarted.service.available_balance().await.unwrap(),
        Amount::new(60)
    );
    let next = restarted
        .service
        .issue(beneficiary(1), Amount::new(5), &delivery)
        .await
        .unwrap();
    assert_eq!(next.cumulative_payout(), Amount::new(45));
}

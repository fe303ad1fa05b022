//! Commits that fail after validation must leave every ledger untouched.

mod common;

use common::{cart, date, Fixture};
use warung_core::{Money, NewCustomer, SaleInput};
use warung_engine::{SaleError, SaleMode};

fn assert_consistency(err: SaleError) {
    assert!(
        matches!(err, SaleError::Consistency(_)),
        "expected a consistency error, got {err:?}"
    );
    assert_eq!(err.to_string(), "transaction failed, try again");
}

#[tokio::test]
async fn stock_taken_after_validation_aborts_the_commit() {
    let fx = Fixture::new().await;
    let beras = fx.product("Beras 5kg", 72_000, 5).await;
    let gula = fx.product("Gula 1kg", 17_500, 10).await;
    let budi = fx.customer("Budi", 100).await;

    let input = fx.debt_sale(cart(&[(&gula, 2), (&beras, 5)]), &budi);
    let validated = fx.engine.validate(&input, SaleMode::Create).await.unwrap();

    // Another register sells three bags in the meantime.
    fx.db.products().adjust_stock(&beras.id, -3).await.unwrap();
    let before = fx.snapshot().await;

    assert_consistency(fx.engine.commit(validated).await.unwrap_err());

    assert_eq!(fx.snapshot().await, before);
    assert_eq!(fx.stock_of(&gula).await, 10);
    assert_eq!(fx.points_of(&budi).await, 100);
}

#[tokio::test]
async fn failure_while_applying_points_rolls_back_everything() {
    let fx = Fixture::new().await;
    let minyak = fx.product("Minyak Goreng 2L", 36_000, 10).await;
    let budi = fx.customer("Budi", 0).await;

    fx.inject_failure("fail_points", "UPDATE OF points", "customers")
        .await;
    let before = fx.snapshot().await;

    // Header, items, receivable and stock are all written before points.
    let err = fx
        .engine
        .create_sale(&fx.debt_sale(cart(&[(&minyak, 2)]), &budi))
        .await
        .unwrap_err();

    assert_consistency(err);
    assert_eq!(fx.snapshot().await, before);
    assert_eq!(fx.db.sales().count().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_edit_keeps_the_previous_version() {
    let fx = Fixture::new().await;
    let kopi = fx.product("Kopi", 1_500, 100).await;
    let ani = fx.customer("Ani", 0).await;

    let sale_id = fx
        .engine
        .create_sale(&fx.debt_sale(cart(&[(&kopi, 10)]), &ani))
        .await
        .unwrap();

    fx.inject_failure("fail_points", "UPDATE OF points", "customers")
        .await;
    let before = fx.snapshot().await;

    let err = fx
        .engine
        .update_sale(&sale_id, &fx.debt_sale(cart(&[(&kopi, 40)]), &ani))
        .await
        .unwrap_err();

    assert_consistency(err);
    assert_eq!(fx.snapshot().await, before);

    let sale = fx.db.sales().get_by_id(&sale_id).await.unwrap().unwrap();
    assert_eq!(sale.total, Money::from_units(15_000));
    assert_eq!(fx.stock_of(&kopi).await, 90);
}

#[tokio::test]
async fn customer_created_in_a_failed_commit_does_not_survive() {
    let fx = Fixture::new().await;
    let beras = fx.product("Beras", 50_000, 10).await;

    fx.inject_failure("fail_receivable", "INSERT", "receivables")
        .await;
    let before = fx.snapshot().await;

    let input = SaleInput {
        cart: cart(&[(&beras, 1)]),
        new_customer: Some(NewCustomer::named("Budi")),
        payment_method_id: Some(fx.debt.id.clone()),
        transaction_date: Some(date()),
        ..SaleInput::default()
    };
    assert_consistency(fx.engine.create_sale(&input).await.unwrap_err());

    assert_eq!(fx.snapshot().await, before);
    assert!(fx.db.customers().find_by_name("Budi").await.unwrap().is_none());
}

#[tokio::test]
async fn engine_recovers_after_a_failed_commit() {
    let fx = Fixture::new().await;
    let aqua = fx.product("Aqua", 4_000, 10).await;

    let input = fx.cash_sale(cart(&[(&aqua, 4)]), 16_000);
    let validated = fx.engine.validate(&input, SaleMode::Create).await.unwrap();
    fx.db.products().adjust_stock(&aqua.id, -8).await.unwrap();
    assert_consistency(fx.engine.commit(validated).await.unwrap_err());

    // Back in draft: a retry validates against the new shelf.
    fx.db.products().adjust_stock(&aqua.id, 8).await.unwrap();
    let sale_id = fx.engine.create_sale(&input).await.unwrap();

    let receipt = fx.engine.receipt(&sale_id).await.unwrap();
    assert_eq!(receipt.sale.receipt_number, "20240601-0001");
    assert_eq!(fx.stock_of(&aqua).await, 6);
}

mod common;

use std::collections::BTreeMap;

use common::{cart, Fixture};
use warung_core::{Money, ReceivableStatus, ValidationError};
use warung_engine::{SaleError, SaleMode};

#[tokio::test]
async fn edit_from_five_to_two_returns_three_units() {
    let fx = Fixture::new().await;
    let indomie = fx.product("Indomie Goreng", 3_500, 20).await;

    let sale_id = fx
        .engine
        .create_sale(&fx.cash_sale(cart(&[(&indomie, 5)]), 17_500))
        .await
        .unwrap();
    assert_eq!(fx.stock_of(&indomie).await, 15);
    let original = fx.db.sales().get_by_id(&sale_id).await.unwrap().unwrap();
    let old_items = fx.db.sales().get_items(&sale_id).await.unwrap();

    fx.engine
        .update_sale(&sale_id, &fx.cash_sale(cart(&[(&indomie, 2)]), 7_000))
        .await
        .unwrap();

    assert_eq!(fx.stock_of(&indomie).await, 18);

    let items = fx.db.sales().get_items(&sale_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert_ne!(items[0].id, old_items[0].id);

    let edited = fx.db.sales().get_by_id(&sale_id).await.unwrap().unwrap();
    assert_eq!(edited.receipt_number, original.receipt_number);
    assert_eq!(edited.created_at, original.created_at);
    assert_eq!(edited.total, Money::from_units(7_000));
    assert_eq!(fx.db.sales().count().await.unwrap(), 1);
}

#[tokio::test]
async fn edit_stock_change_equals_new_minus_old_per_product() {
    let fx = Fixture::new().await;
    let a = fx.product("Aqua 600ml", 4_000, 40).await;
    let b = fx.packaged("Teh Botol", 5_000, 12, 54_000, 40).await;
    let c = fx.product("Kopi Sachet", 1_500, 40).await;

    let old = [(&a, 3), (&b, 14)];
    let new = [(&b, 5), (&c, 7), (&a, 3)];

    let sale_id = fx
        .engine
        .create_sale(&fx.cash_sale(cart(&old), 1_000_000))
        .await
        .unwrap();

    let before: BTreeMap<String, i64> = [
        (a.id.clone(), fx.stock_of(&a).await),
        (b.id.clone(), fx.stock_of(&b).await),
        (c.id.clone(), fx.stock_of(&c).await),
    ]
    .into_iter()
    .collect();

    fx.engine
        .update_sale(&sale_id, &fx.cash_sale(cart(&new), 1_000_000))
        .await
        .unwrap();

    let qty = |lines: &[(&warung_core::Product, i64)], id: &str| -> i64 {
        lines.iter().filter(|(p, _)| p.id == id).map(|(_, q)| q).sum()
    };
    for product in [&a, &b, &c] {
        let applied = fx.stock_of(product).await - before[&product.id];
        let expected = qty(&old, &product.id) - qty(&new, &product.id);
        assert_eq!(applied, expected, "{}", product.name);
    }
}

#[tokio::test]
async fn edit_may_use_units_the_sale_already_holds() {
    let fx = Fixture::new().await;
    let beras = fx.product("Beras 5kg", 72_000, 5).await;

    let sale_id = fx
        .engine
        .create_sale(&fx.cash_sale(cart(&[(&beras, 5)]), 360_000))
        .await
        .unwrap();
    assert_eq!(fx.stock_of(&beras).await, 0);

    let same = fx.cash_sale(cart(&[(&beras, 5)]), 360_000);
    fx.engine
        .validate(&same, SaleMode::edit(&sale_id))
        .await
        .unwrap();

    let more = fx.cash_sale(cart(&[(&beras, 6)]), 432_000);
    let err = fx.engine.update_sale(&sale_id, &more).await.unwrap_err();
    assert!(matches!(
        err,
        SaleError::Validation(ValidationError::InsufficientStock {
            requested: 6,
            available: 5,
            ..
        })
    ));
    assert_eq!(fx.stock_of(&beras).await, 0);
}

#[tokio::test]
async fn editing_a_missing_sale_is_not_found() {
    let fx = Fixture::new().await;
    let aqua = fx.product("Aqua", 4_000, 10).await;

    let err = fx
        .engine
        .update_sale("no-such-sale", &fx.cash_sale(cart(&[(&aqua, 1)]), 4_000))
        .await
        .unwrap_err();

    assert!(matches!(err, SaleError::NotFound { ref entity, .. } if entity == "Sale"));
    assert_eq!(fx.stock_of(&aqua).await, 10);
}

#[tokio::test]
async fn sale_deleted_between_validate_and_commit_is_not_found() {
    let fx = Fixture::new().await;
    let aqua = fx.product("Aqua", 4_000, 10).await;

    let sale_id = fx
        .engine
        .create_sale(&fx.cash_sale(cart(&[(&aqua, 2)]), 8_000))
        .await
        .unwrap();

    let validated = fx
        .engine
        .validate(&fx.cash_sale(cart(&[(&aqua, 1)]), 4_000), SaleMode::edit(&sale_id))
        .await
        .unwrap();
    fx.engine.cancel_sale(&sale_id).await.unwrap();

    let err = fx.engine.commit(validated).await.unwrap_err();
    assert!(matches!(err, SaleError::NotFound { .. }));
    assert_eq!(fx.stock_of(&aqua).await, 10);
}

#[tokio::test]
async fn receivable_is_replaced_on_edit() {
    let fx = Fixture::new().await;
    let minyak = fx.product("Minyak Goreng 2L", 36_000, 10).await;
    let budi = fx.customer("Budi", 0).await;

    let sale_id = fx
        .engine
        .create_sale(&fx.debt_sale(cart(&[(&minyak, 2)]), &budi))
        .await
        .unwrap();
    let first = fx.db.receivables().get_by_sale(&sale_id).await.unwrap().unwrap();
    assert_eq!(first.amount, Money::from_units(72_000));

    fx.engine
        .update_sale(&sale_id, &fx.debt_sale(cart(&[(&minyak, 1)]), &budi))
        .await
        .unwrap();
    let second = fx.db.receivables().get_by_sale(&sale_id).await.unwrap().unwrap();
    assert_eq!(second.amount, Money::from_units(36_000));
    assert_eq!(second.status, ReceivableStatus::Pending);
    assert_ne!(second.id, first.id);

    // Paid in full at the register: the debt disappears.
    let mut cash = fx.cash_sale(cart(&[(&minyak, 1)]), 40_000);
    cash.customer_id = Some(budi.id.clone());
    fx.engine.update_sale(&sale_id, &cash).await.unwrap();

    assert!(fx.db.receivables().get_by_sale(&sale_id).await.unwrap().is_none());
    assert_eq!(
        fx.db.receivables().outstanding_for(&budi.id).await.unwrap(),
        Money::zero()
    );
}

#[tokio::test]
async fn points_follow_the_edit() {
    let fx = Fixture::new().await;
    let rokok = fx.product("Rokok", 10_000, 20).await;
    let ani = fx.customer("Ani", 0).await;
    let budi = fx.customer("Budi", 0).await;

    let mut input = fx.cash_sale(cart(&[(&rokok, 2)]), 20_000);
    input.customer_id = Some(ani.id.clone());
    let sale_id = fx.engine.create_sale(&input).await.unwrap();
    assert_eq!(fx.points_of(&ani).await, 20);

    // Same customer, smaller sale.
    let mut input = fx.cash_sale(cart(&[(&rokok, 1)]), 10_000);
    input.customer_id = Some(ani.id.clone());
    fx.engine.update_sale(&sale_id, &input).await.unwrap();
    assert_eq!(fx.points_of(&ani).await, 10);

    // Moved to another customer.
    input.customer_id = Some(budi.id.clone());
    fx.engine.update_sale(&sale_id, &input).await.unwrap();
    assert_eq!(fx.points_of(&ani).await, 0);
    assert_eq!(fx.points_of(&budi).await, 10);
}

#[tokio::test]
async fn unchanged_edit_succeeds_after_earned_points_were_spent() {
    let fx = Fixture::new().await;
    let rokok = fx.product("Rokok", 10_000, 20).await;
    let ani = fx.customer("Ani", 0).await;

    let mut input = fx.cash_sale(cart(&[(&rokok, 1)]), 10_000);
    input.customer_id = Some(ani.id.clone());
    let sale_id = fx.engine.create_sale(&input).await.unwrap();
    fx.db.customers().adjust_points(&ani.id, -10).await.unwrap();

    fx.engine.update_sale(&sale_id, &input).await.unwrap();
    assert_eq!(fx.points_of(&ani).await, 0);
}

#[tokio::test]
async fn redemption_capacity_on_edit_includes_points_this_sale_spent() {
    let fx = Fixture::new().await;
    let rokok = fx.product("Rokok", 10_000, 20).await;
    let ani = fx.customer("Ani", 3_000).await;

    let mut input = fx.cash_sale(cart(&[(&rokok, 1)]), 7_000);
    input.customer_id = Some(ani.id.clone());
    input.redeem_points = true;
    let sale_id = fx.engine.create_sale(&input).await.unwrap();
    assert_eq!(fx.points_of(&ani).await, 7);

    let validated = fx
        .engine
        .validate(&input, SaleMode::edit(&sale_id))
        .await
        .unwrap();
    // 7 + 3000 back - 7 earned = 3000 available again.
    assert_eq!(validated.points_redeemed(), 3_000);

    fx.engine.commit(validated).await.unwrap();
    assert_eq!(fx.points_of(&ani).await, 7);
}

#[tokio::test]
async fn moving_a_sale_off_a_customer_who_spent_its_points_is_rejected() {
    let fx = Fixture::new().await;
    let rokok = fx.product("Rokok", 10_000, 20).await;
    let ani = fx.customer("Ani", 0).await;
    let budi = fx.customer("Budi", 0).await;

    let sale_id = fx
        .engine
        .create_sale(&fx.debt_sale(cart(&[(&rokok, 5)]), &ani))
        .await
        .unwrap();
    assert_eq!(fx.points_of(&ani).await, 50);
    fx.db.customers().adjust_points(&ani.id, -50).await.unwrap();
    let before = fx.snapshot().await;

    let moved = fx.debt_sale(cart(&[(&rokok, 5)]), &budi);
    for _ in 0..2 {
        let err = fx.engine.update_sale(&sale_id, &moved).await.unwrap_err();
        assert!(
            matches!(
                err,
                SaleError::Validation(ValidationError::PointsAlreadySpent {
                    balance: 0,
                    required: 50,
                    ..
                })
            ),
            "got {err:?}"
        );
    }

    assert_eq!(fx.snapshot().await, before);
    assert_eq!(fx.points_of(&budi).await, 0);
}

#[tokio::test]
async fn shrinking_a_sale_below_spent_points_is_rejected() {
    let fx = Fixture::new().await;
    let rokok = fx.product("Rokok", 10_000, 20).await;
    let ani = fx.customer("Ani", 0).await;

    let mut input = fx.cash_sale(cart(&[(&rokok, 5)]), 50_000);
    input.customer_id = Some(ani.id.clone());
    let sale_id = fx.engine.create_sale(&input).await.unwrap();
    fx.db.customers().adjust_points(&ani.id, -45).await.unwrap();

    // 50 earned becomes 10: 40 must come back, Ani holds 5.
    let mut smaller = fx.cash_sale(cart(&[(&rokok, 1)]), 10_000);
    smaller.customer_id = Some(ani.id.clone());
    let err = fx.engine.update_sale(&sale_id, &smaller).await.unwrap_err();

    assert!(matches!(
        err,
        SaleError::Validation(ValidationError::PointsAlreadySpent {
            balance: 5,
            required: 40,
            ..
        })
    ));
    assert_eq!(fx.stock_of(&rokok).await, 15);
}

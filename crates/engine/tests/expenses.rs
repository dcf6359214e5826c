use chrono::{Duration, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{Amount, Category, Engine, EngineError, FieldPatch};
use migration::MigratorTrait;

const ALICE: i64 = 1001;
const BOB: i64 = 2002;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn amount(raw: &str) -> Amount {
    raw.parse().unwrap()
}

#[tokio::test]
async fn created_expense_is_first_in_recent_list() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_expense(ALICE, amount("10"), Category::Transport, "Metro")
        .await
        .unwrap();
    let created = engine
        .create_expense(ALICE, amount("1500"), Category::Food, "Lunch")
        .await
        .unwrap();

    assert_eq!(created.owner_id, ALICE);
    assert_eq!(created.amount.minor(), 150_000);
    assert_eq!(created.category, Category::Food);
    assert_eq!(created.description, "Lunch");

    let recent = engine.list_recent(ALICE, 10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0], created);
}

#[tokio::test]
async fn list_recent_is_newest_first_and_limited() {
    let (engine, _db) = engine_with_db().await;

    let mut ids = Vec::new();
    for idx in 1..=7 {
        let expense = engine
            .create_expense(ALICE, Amount::new(idx * 100), Category::Other, "x")
            .await
            .unwrap();
        ids.push(expense.id);
    }

    let recent = engine.list_recent(ALICE, 5).await.unwrap();
    let got: Vec<i64> = recent.iter().map(|e| e.id).collect();
    let expected: Vec<i64> = ids.iter().rev().take(5).copied().collect();
    assert_eq!(got, expected);

    let all = engine.list_all(ALICE).await.unwrap();
    assert_eq!(all.len(), 7);
    assert_eq!(all.first().map(|e| e.id), ids.last().copied());
}

#[tokio::test]
async fn listing_never_shows_other_owners_expenses() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_expense(BOB, amount("42"), Category::Gifts, "Flowers")
        .await
        .unwrap();

    assert!(engine.list_recent(ALICE, 10).await.unwrap().is_empty());
    assert!(engine.list_all(ALICE).await.unwrap().is_empty());
    assert_eq!(engine.list_recent(BOB, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_rejects_non_positive_amount() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_expense(ALICE, Amount::ZERO, Category::Food, "Nothing")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(engine.list_all(ALICE).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_amount_above_max() {
    let (engine, _db) = engine_with_db().await;

    let too_large = Amount::new(Amount::MAX.minor() + 1);
    let err = engine
        .create_expense(ALICE, too_large, Category::Food, "Yacht")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    engine
        .create_expense(ALICE, Amount::MAX, Category::Housing, "House")
        .await
        .unwrap();
    assert_eq!(engine.list_all(ALICE).await.unwrap().len(), 1);
}

#[tokio::test]
async fn description_is_trimmed_and_may_be_empty() {
    let (engine, _db) = engine_with_db().await;

    let expense = engine
        .create_expense(ALICE, amount("3"), Category::Other, "   ")
        .await
        .unwrap();
    assert_eq!(expense.description, "");
}

#[tokio::test]
async fn update_field_changes_only_that_field() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_expense(ALICE, amount("12.50"), Category::Food, "Pizza")
        .await
        .unwrap();

    let updated = engine
        .update_field(created.id, ALICE, FieldPatch::Category(Category::Entertainment))
        .await
        .unwrap();
    assert_eq!(updated.category, Category::Entertainment);
    assert_eq!(updated.amount, created.amount);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.created_at, created.created_at);

    let updated = engine
        .update_field(created.id, ALICE, FieldPatch::Amount(amount("13")))
        .await
        .unwrap();
    assert_eq!(updated.amount.minor(), 1_300);

    let updated = engine
        .update_field(
            created.id,
            ALICE,
            FieldPatch::Description("Pizza night".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "Pizza night");
    assert_eq!(engine.expense(created.id, ALICE).await.unwrap(), updated);
}

#[tokio::test]
async fn update_field_of_foreign_expense_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let bobs = engine
        .create_expense(BOB, amount("99"), Category::Health, "Pharmacy")
        .await
        .unwrap();

    let err = engine
        .update_field(bobs.id, ALICE, FieldPatch::Amount(amount("1")))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let unchanged = engine.expense(bobs.id, BOB).await.unwrap();
    assert_eq!(unchanged, bobs);
}

#[tokio::test]
async fn update_field_rejects_zero_amount() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_expense(ALICE, amount("5"), Category::Food, "Snack")
        .await
        .unwrap();
    let err = engine
        .update_field(created.id, ALICE, FieldPatch::Amount(Amount::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn delete_returns_the_removed_expense() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_expense(ALICE, amount("8"), Category::Transport, "Bus")
        .await
        .unwrap();

    let deleted = engine.delete_expense(created.id, ALICE).await.unwrap();
    assert_eq!(deleted, created);
    assert!(engine.expense(created.id, ALICE).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn deleting_missing_expense_is_not_found_every_time() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_expense(ALICE, amount("8"), Category::Transport, "Bus")
        .await
        .unwrap();

    for _ in 0..2 {
        let err = engine.delete_expense(9_999, ALICE).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(engine.list_all(ALICE).await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn deleting_foreign_expense_is_not_found_and_keeps_it() {
    let (engine, _db) = engine_with_db().await;

    let bobs = engine
        .create_expense(BOB, amount("20"), Category::Clothing, "Socks")
        .await
        .unwrap();

    let err = engine.delete_expense(bobs.id, ALICE).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(engine.list_all(BOB).await.unwrap(), vec![bobs]);
}

#[tokio::test]
async fn aggregate_sums_per_category_for_owner_since() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_expense(ALICE, amount("10"), Category::Food, "a")
        .await
        .unwrap();
    engine
        .create_expense(ALICE, amount("15.50"), Category::Food, "b")
        .await
        .unwrap();
    engine
        .create_expense(ALICE, amount("40"), Category::Housing, "c")
        .await
        .unwrap();
    engine
        .create_expense(BOB, amount("1000"), Category::Food, "not alice")
        .await
        .unwrap();

    let totals = engine
        .aggregate_by_category(ALICE, Utc::now() - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].category, Category::Housing);
    assert_eq!(totals[0].total.minor(), 4_000);
    assert_eq!(totals[1].category, Category::Food);
    assert_eq!(totals[1].total.minor(), 2_550);

    let future = engine
        .aggregate_by_category(ALICE, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    assert!(future.is_empty());
}

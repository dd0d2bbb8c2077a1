use anyhow::Result;
use housekeepin::budget::{self, remaining_balance};
use housekeepin::model::{BudgetInput, TransactionType};
use proptest::prelude::*;

#[path = "util.rs"]
mod util;

fn june_budget(total: f64) -> BudgetInput {
    BudgetInput {
        name: "June".into(),
        start_date: "2026-06-01".into(),
        end_date: "2026-06-30".into(),
        total_amount: total,
    }
}

#[tokio::test]
async fn summary_applies_the_balance_rule() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;

    budget::create_budget(&pool, &hh.id, &owner.id, june_budget(500.0)).await?;
    budget::add_transaction(&pool, &hh.id, TransactionType::Bill, 120.0, &owner.id).await?;
    budget::add_transaction(&pool, &hh.id, TransactionType::Bill, 30.0, &owner.id).await?;
    budget::add_transaction(&pool, &hh.id, TransactionType::Contribution, 50.0, &owner.id)
        .await?;

    let summary = budget::budget_summary(&pool, &hh.id, "2026-06-15")
        .await?
        .expect("active budget");
    assert_eq!(summary.total_bills, 150.0);
    assert_eq!(summary.total_contributions, 50.0);
    assert_eq!(summary.remaining, 500.0 - 150.0 + 50.0);
    Ok(())
}

#[tokio::test]
async fn active_budget_window_is_inclusive() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;
    budget::create_budget(&pool, &hh.id, &owner.id, june_budget(100.0)).await?;

    assert!(budget::active_budget(&pool, &hh.id, "2026-06-01").await?.is_some());
    assert!(budget::active_budget(&pool, &hh.id, "2026-06-30").await?.is_some());
    assert!(budget::active_budget(&pool, &hh.id, "2026-05-31").await?.is_none());
    assert!(budget::active_budget(&pool, &hh.id, "2026-07-01").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn overlapping_periods_pick_the_most_recent_start() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;

    budget::create_budget(
        &pool,
        &hh.id,
        &owner.id,
        BudgetInput {
            name: "Quarter".into(),
            start_date: "2026-04-01".into(),
            end_date: "2026-06-30".into(),
            total_amount: 900.0,
        },
    )
    .await?;
    budget::create_budget(&pool, &hh.id, &owner.id, june_budget(300.0)).await?;

    let active = budget::active_budget(&pool, &hh.id, "2026-06-15")
        .await?
        .expect("one of the overlapping budgets");
    assert_eq!(active.name, "June");
    Ok(())
}

#[tokio::test]
async fn no_active_budget_yields_no_summary() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;
    budget::add_transaction(&pool, &hh.id, TransactionType::Bill, 10.0, &owner.id).await?;

    assert!(budget::budget_summary(&pool, &hh.id, "2026-01-01").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn update_budget_changes_the_window_and_total() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;
    let created = budget::create_budget(&pool, &hh.id, &owner.id, june_budget(100.0)).await?;

    let updated = budget::update_budget(
        &pool,
        &hh.id,
        &owner.id,
        &created.id,
        BudgetInput {
            name: "June & July".into(),
            start_date: "2026-06-01".into(),
            end_date: "2026-07-31".into(),
            total_amount: 250.0,
        },
    )
    .await?;
    assert_eq!(updated.total_amount, 250.0);

    let active = budget::active_budget(&pool, &hh.id, "2026-07-15").await?;
    assert_eq!(active.map(|b| b.id), Some(created.id));
    Ok(())
}

#[tokio::test]
async fn invalid_budget_inputs_are_rejected() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;

    let mut inverted = june_budget(100.0);
    inverted.end_date = "2026-05-01".into();
    let err = budget::create_budget(&pool, &hh.id, &owner.id, inverted)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BUDGET/INVALID_RANGE");

    let mut impossible = june_budget(100.0);
    impossible.start_date = "2026-13-45".into();
    let err = budget::create_budget(&pool, &hh.id, &owner.id, impossible)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BUDGET/INVALID_RANGE");

    let err = budget::create_budget(&pool, &hh.id, &owner.id, june_budget(-5.0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BUDGET/INVALID_AMOUNT");

    let err = budget::add_transaction(&pool, &hh.id, TransactionType::Bill, 0.0, &owner.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BUDGET/INVALID_AMOUNT");
    Ok(())
}

#[tokio::test]
async fn ledger_lists_newest_first() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;

    let first =
        budget::add_transaction(&pool, &hh.id, TransactionType::Bill, 10.0, &owner.id).await?;
    let second =
        budget::add_transaction(&pool, &hh.id, TransactionType::Contribution, 20.0, &owner.id)
            .await?;

    let listed = budget::list_transactions(&pool, &hh.id).await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
    Ok(())
}

proptest! {
    // Whole-cent amounts are exact in f64, so equality is safe here.
    #[test]
    fn balance_rule_holds_for_any_ledger(
        total_cents in 0i64..10_000_000,
        bills in proptest::collection::vec(1i64..1_000_000, 0..20),
        contributions in proptest::collection::vec(1i64..1_000_000, 0..20),
    ) {
        let to_amount = |cents: i64| cents as f64 / 100.0;
        let total = to_amount(total_cents);
        let bill_sum: f64 = bills.iter().copied().map(to_amount).sum();
        let contribution_sum: f64 = contributions.iter().copied().map(to_amount).sum();

        let remaining = remaining_balance(total, bill_sum, contribution_sum);
        let expected_cents = total_cents - bills.iter().sum::<i64>()
            + contributions.iter().sum::<i64>();
        prop_assert!((remaining - expected_cents as f64 / 100.0).abs() < 1e-6);
    }
}

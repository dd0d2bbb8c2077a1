use anyhow::Result;
use housekeepin::model::{BudgetInput, Role};
use housekeepin::{budget, household, invites};

#[path = "util.rs"]
mod util;

fn any_budget() -> BudgetInput {
    BudgetInput {
        name: "Groceries".into(),
        start_date: "2026-06-01".into(),
        end_date: "2026-06-30".into(),
        total_amount: 400.0,
    }
}

#[tokio::test]
async fn members_cannot_manage_budgets() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;
    let member = util::seed_member(&pool, &hh.id, "alex@example.com").await?;

    let err = budget::create_budget(&pool, &hh.id, &member.id, any_budget())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "HOUSEHOLD/ROLE_REQUIRED");

    let created = budget::create_budget(&pool, &hh.id, &owner.id, any_budget()).await?;
    let err = budget::update_budget(&pool, &hh.id, &member.id, &created.id, any_budget())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "HOUSEHOLD/ROLE_REQUIRED");
    Ok(())
}

#[tokio::test]
async fn members_cannot_send_or_list_invitations() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (_owner, hh) = util::seed_household(&pool, "paula@example.com").await?;
    let member = util::seed_member(&pool, &hh.id, "alex@example.com").await?;

    let err = invites::send_invitation(&pool, &hh.id, &member.id, "new@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "HOUSEHOLD/ROLE_REQUIRED");

    let err = invites::list_sent(&pool, &hh.id, &member.id).await.unwrap_err();
    assert_eq!(err.code(), "HOUSEHOLD/ROLE_REQUIRED");
    Ok(())
}

#[tokio::test]
async fn non_members_are_told_apart_from_members() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (_owner, hh) = util::seed_household(&pool, "paula@example.com").await?;
    let outsider = util::sign_up_user(&pool, "drifter@example.com").await?;

    let err = budget::create_budget(&pool, &hh.id, &outsider.id, any_budget())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "HOUSEHOLD/MEMBER_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn owner_removes_a_member() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;
    let member = util::seed_member(&pool, &hh.id, "alex@example.com").await?;

    household::remove_member(&pool, &hh.id, &owner.id, &member.id).await?;

    let members = household::list_members(&pool, &hh.id).await?;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, owner.id);
    Ok(())
}

#[tokio::test]
async fn member_cannot_remove_anyone() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;
    let member = util::seed_member(&pool, &hh.id, "alex@example.com").await?;

    let err = household::remove_member(&pool, &hh.id, &member.id, &owner.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "HOUSEHOLD/ROLE_REQUIRED");
    Ok(())
}

#[tokio::test]
async fn the_last_owner_cannot_be_removed() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;

    let err = household::remove_member(&pool, &hh.id, &owner.id, &owner.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "HOUSEHOLD/LAST_OWNER");
    Ok(())
}

#[tokio::test]
async fn removing_an_unknown_member_reports_it() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;

    let err = household::remove_member(&pool, &hh.id, &owner.id, "no-such-user")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "HOUSEHOLD/MEMBER_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn member_list_carries_roles_and_profiles() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;
    util::seed_member(&pool, &hh.id, "alex@example.com").await?;

    let members = household::list_members(&pool, &hh.id).await?;
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].user_id, owner.id);
    assert_eq!(members[0].role, Role::Owner);
    assert_eq!(members[1].email, "alex@example.com");
    assert_eq!(members[1].role, Role::Member);
    Ok(())
}

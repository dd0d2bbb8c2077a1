use anyhow::Result;
use housekeepin::invites;
use housekeepin::model::InvitationStatus;

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn sent_invitations_start_pending() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;

    let invite = invites::send_invitation(&pool, &hh.id, &owner.id, "new@example.com").await?;
    assert_eq!(invite.status, InvitationStatus::Pending);
    assert_eq!(invite.invitee_email, "new@example.com");
    assert_eq!(invite.inviter_id, owner.id);
    Ok(())
}

#[tokio::test]
async fn invitee_email_is_normalized() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;

    let invite =
        invites::send_invitation(&pool, &hh.id, &owner.id, "  New@Example.COM ").await?;
    assert_eq!(invite.invitee_email, "new@example.com");
    Ok(())
}

#[tokio::test]
async fn pending_duplicates_are_rejected() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;

    invites::send_invitation(&pool, &hh.id, &owner.id, "new@example.com").await?;
    let err = invites::send_invitation(&pool, &hh.id, &owner.id, "NEW@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVITES/DUPLICATE");
    Ok(())
}

#[tokio::test]
async fn malformed_addresses_are_rejected() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner, hh) = util::seed_household(&pool, "paula@example.com").await?;

    let err = invites::send_invitation(&pool, &hh.id, &owner.id, "not-an-address")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "AUTH/INVALID_EMAIL");

    let listed = invites::list_sent(&pool, &hh.id, &owner.id).await?;
    assert!(listed.is_empty());
    Ok(())
}

#[tokio::test]
async fn listing_is_scoped_to_the_inviter_and_household() -> Result<()> {
    let pool = util::memory_pool().await?;
    let (owner_a, hh_a) = util::seed_household(&pool, "paula@example.com").await?;
    let (owner_b, hh_b) = util::seed_household(&pool, "quinn@example.com").await?;

    invites::send_invitation(&pool, &hh_a.id, &owner_a.id, "one@example.com").await?;
    invites::send_invitation(&pool, &hh_a.id, &owner_a.id, "two@example.com").await?;
    invites::send_invitation(&pool, &hh_b.id, &owner_b.id, "three@example.com").await?;

    let for_a = invites::list_sent(&pool, &hh_a.id, &owner_a.id).await?;
    assert_eq!(for_a.len(), 2);
    assert!(for_a.iter().all(|i| i.household_id == hh_a.id));

    let for_b = invites::list_sent(&pool, &hh_b.id, &owner_b.id).await?;
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0].invitee_email, "three@example.com");
    Ok(())
}

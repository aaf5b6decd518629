//! Store-level semantics of the gate and the guarded soft delete.

use api::store::{self, OwnershipStore, PrincipalStore, ResourceKind, SoftDelete};
use memorial_tests::{insert_comment, insert_fallen, insert_user, setup};
use platform_authz::{AccessDecision, OwnershipSource, PRIVILEGED_ROLES, authorize};

#[tokio::test]
async fn repeated_soft_delete_reports_not_found() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let comment = insert_comment(&app.db, record, owner).await;

    let first = store::soft_delete(&app.db, ResourceKind::Comment, comment, owner)
        .await
        .unwrap();
    assert_eq!(first, SoftDelete::Deleted);

    let second = store::soft_delete(&app.db, ResourceKind::Comment, comment, owner)
        .await
        .unwrap();
    assert_eq!(second, SoftDelete::NotFound);
}

#[tokio::test]
async fn ownership_lookup_sees_active_rows_only() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let comment = insert_comment(&app.db, record, owner).await;

    let owners = OwnershipStore {
        pool: &app.db,
        kind: ResourceKind::Comment,
    };
    assert_eq!(owners.owner(comment).await.unwrap(), Some(owner));

    store::soft_delete(&app.db, ResourceKind::Comment, comment, owner)
        .await
        .unwrap();
    assert_eq!(owners.owner(comment).await.unwrap(), None);
}

#[tokio::test]
async fn gate_joins_role_and_ownership_lookups() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let stranger = insert_user(&app.db, "stranger@example.test", "USER", false).await;
    let moderator = insert_user(&app.db, "mod@example.test", "MODERATOR", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let comment = insert_comment(&app.db, record, owner).await;

    let principals = PrincipalStore(&app.db);
    let owners = OwnershipStore {
        pool: &app.db,
        kind: ResourceKind::Comment,
    };

    let anonymous = authorize(&principals, &owners, None, comment, PRIVILEGED_ROLES)
        .await
        .unwrap();
    assert_eq!(anonymous, AccessDecision::NotAuthenticated);

    let ghost = authorize(
        &principals,
        &owners,
        Some(uuid::Uuid::new_v4()),
        comment,
        PRIVILEGED_ROLES,
    )
    .await
    .unwrap();
    assert_eq!(ghost, AccessDecision::UserNotFound);

    let denied = authorize(&principals, &owners, Some(stranger), comment, PRIVILEGED_ROLES)
        .await
        .unwrap();
    assert_eq!(denied, AccessDecision::InsufficientPermissions);

    let by_owner = authorize(&principals, &owners, Some(owner), comment, PRIVILEGED_ROLES)
        .await
        .unwrap();
    assert_eq!(by_owner, AccessDecision::Allowed);

    let by_moderator = authorize(&principals, &owners, Some(moderator), comment, PRIVILEGED_ROLES)
        .await
        .unwrap();
    assert_eq!(by_moderator, AccessDecision::Allowed);

    let missing_resource = authorize(
        &principals,
        &owners,
        Some(moderator),
        uuid::Uuid::new_v4(),
        PRIVILEGED_ROLES,
    )
    .await
    .unwrap();
    assert_eq!(missing_resource, AccessDecision::ResourceNotFound);
}

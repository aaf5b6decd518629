//! End-to-end coverage of the mutation gate and the public read surface,
//! driven through the real router over in-memory SQLite.

use axum::http::StatusCode;
use entity::{comments, fallen};
use memorial_tests::{
    insert_comment, insert_fallen, insert_memory, insert_user, open_session, request, setup,
};
use sea_orm::EntityTrait;
use serde_json::json;

#[tokio::test]
async fn anonymous_delete_is_unauthorized_and_mutates_nothing() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let comment = insert_comment(&app.db, record, owner).await;

    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/api/comments/{comment}/delete"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let row = comments::Entity::find_by_id(comment)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert!(row.deleted_at.is_none());
}

#[tokio::test]
async fn non_owner_without_privileged_role_is_forbidden() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let other = insert_user(&app.db, "other@example.test", "USER", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let comment = insert_comment(&app.db, record, owner).await;
    let session = open_session(&app.db, other).await;

    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/api/comments/{comment}/delete"),
        Some(session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let row = comments::Entity::find_by_id(comment)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert!(row.deleted_at.is_none());
}

#[tokio::test]
async fn owner_deletes_own_comment_and_repeat_is_not_found() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let comment = insert_comment(&app.db, record, owner).await;
    let session = open_session(&app.db, owner).await;

    let (status, body) = request(
        &app.router,
        "DELETE",
        &format!("/api/comments/{comment}/delete"),
        Some(session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    // Gone from the active listing.
    let (status, body) = request(
        &app.router,
        "GET",
        &format!("/api/fallen/{record}/comments"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"].as_array().map(Vec::len), Some(0));

    // A second delete reports not-found, never success.
    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/api/comments/{comment}/delete"),
        Some(session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn moderator_deletes_foreign_memory() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let moderator = insert_user(&app.db, "mod@example.test", "MODERATOR", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let memory = insert_memory(&app.db, record, owner).await;
    let session = open_session(&app.db, moderator).await;

    let (status, body) = request(
        &app.router,
        "DELETE",
        &format!("/api/memories/{memory}/delete"),
        Some(session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn deleted_account_session_is_unauthorized() {
    let app = setup().await;
    let owner = insert_user(&app.db, "gone@example.test", "ADMIN", true).await;
    let record = insert_fallen(&app.db, owner).await;
    let comment = insert_comment(&app.db, record, owner).await;
    let session = open_session(&app.db, owner).await;

    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/api/comments/{comment}/delete"),
        Some(session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn blank_nickname_in_patch_is_stored_as_null() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let session = open_session(&app.db, owner).await;

    let (status, body) = request(
        &app.router,
        "PATCH",
        &format!("/api/fallen/{record}"),
        Some(session),
        Some(json!({ "nickname": "", "rank": "Corporal", "grave_lat": 32.794 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["fallen"]["nickname"].is_null());
    assert_eq!(body["fallen"]["rank"], json!("Corporal"));

    let row = fallen::Entity::find_by_id(record)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.nickname, None);
    assert_eq!(row.rank.as_deref(), Some("Corporal"));
    // Non-string fields are not subject to blank coercion.
    assert_eq!(row.grave_lat, Some(32.794));
}

#[tokio::test]
async fn patch_by_non_owner_is_forbidden() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let other = insert_user(&app.db, "other@example.test", "EDITOR", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let session = open_session(&app.db, other).await;

    let (status, _) = request(
        &app.router,
        "PATCH",
        &format!("/api/fallen/{record}"),
        Some(session),
        Some(json!({ "nickname": "Dan" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_search_enforces_minimum_length_and_session() {
    let app = setup().await;
    let caller = insert_user(&app.db, "caller@example.test", "USER", false).await;
    insert_user(&app.db, "cohen@example.test", "USER", false).await;
    let session = open_session(&app.db, caller).await;

    let (status, _) = request(&app.router, "GET", "/api/users/search?q=co", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &app.router,
        "GET",
        "/api/users/search?q=c",
        Some(session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app.router,
        "GET",
        "/api/users/search?q=co",
        Some(session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let hits = body["users"].as_array().cloned().unwrap_or_default();
    assert!(
        hits.iter()
            .any(|user| user["email"] == json!("cohen@example.test")),
        "expected cohen in {hits:?}"
    );
}

#[tokio::test]
async fn memory_creation_validates_fields_and_parent() {
    let app = setup().await;
    let author = insert_user(&app.db, "author@example.test", "USER", false).await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let session = open_session(&app.db, author).await;

    let (status, _) = request(
        &app.router,
        "POST",
        "/api/memories",
        Some(session),
        Some(json!({ "fallen_id": record, "body": "no title here" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app.router,
        "POST",
        "/api/memories",
        Some(session),
        Some(json!({
            "fallen_id": uuid::Uuid::new_v4(),
            "title": "Orphan",
            "body": "parent does not exist",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = request(
        &app.router,
        "POST",
        "/api/memories",
        Some(session),
        Some(json!({
            "fallen_id": record,
            "title": "The orchard",
            "body": "He planted every tree on that hill.",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["memory"]["title"], json!("The orchard"));

    let (status, body) = request(
        &app.router,
        "GET",
        &format!("/api/fallen/{record}/memories"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["memories"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn additions_follow_their_memory_parent() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let memory = insert_memory(&app.db, record, owner).await;
    let session = open_session(&app.db, owner).await;

    let (status, body) = request(
        &app.router,
        "POST",
        &format!("/api/memories/{memory}/additions"),
        Some(session),
        Some(json!({ "body": "He also coached the youth team." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let addition = body["addition"]["id"].as_str().unwrap().to_owned();

    // Owner of the addition can remove it.
    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/api/memory-additions/{addition}/delete"),
        Some(session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Once the parent memory is gone, new additions report the parent missing.
    request(
        &app.router,
        "DELETE",
        &format!("/api/memories/{memory}/delete"),
        Some(session),
        None,
    )
    .await;
    let (status, _) = request(
        &app.router,
        "POST",
        &format!("/api/memories/{memory}/additions"),
        Some(session),
        Some(json!({ "body": "too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn soft_deleted_fallen_leaves_public_reads() {
    let app = setup().await;
    let owner = insert_user(&app.db, "owner@example.test", "USER", false).await;
    let record = insert_fallen(&app.db, owner).await;
    let session = open_session(&app.db, owner).await;

    let (status, body) = request(&app.router, "GET", "/api/fallen", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallen"].as_array().map(Vec::len), Some(1));

    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/api/fallen/{record}/delete"),
        Some(session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&app.router, "GET", "/api/fallen", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallen"].as_array().map(Vec::len), Some(0));

    let (status, _) = request(
        &app.router,
        "GET",
        &format!("/api/fallen/{record}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_database_status() {
    let app = setup().await;
    let (status, body) = request(&app.router, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["db_ok"], json!(true));
}

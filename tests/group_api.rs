//! HTTP tests for exercise groups

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use lecturehall_api::domain::repositories::GroupRepository;

#[tokio::test]
async fn test_query_requires_claims() {
    let (app, _) = setup_app().await;

    let (status, _) = get(&app, "/api/v1/courses/1/groups", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/api/v1/courses/1/groups", Some((ROOT, true))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_groups_of_course() {
    let (app, _) = setup_app().await;

    let (status, body) = get(&app, "/api/v1/courses/1/groups", Some((STUDENT, false))).await;

    assert_eq!(status, StatusCode::OK);
    let groups = body.as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g["course_id"] == 1));
}

#[tokio::test]
async fn test_get_specific_group() {
    let (app, _) = setup_app().await;

    let (status, body) = get(&app, "/api/v1/groups/1", Some((ROOT, true))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["tutor_id"], TUTOR);
    assert_eq!(body["course_id"], 1);
    assert_eq!(body["description"], "Group 1");

    let (status, _) = get(&app, "/api/v1/groups/99", Some((ROOT, true))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_group() {
    let (app, store) = setup_app().await;
    let body = json!({ "tutor_id": TUTOR, "description": "blah blahe" });

    let (status, _) = post(&app, "/api/v1/courses/1/groups", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post(
        &app,
        "/api/v1/courses/1/groups",
        Some((TUTOR, false)),
        body.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) =
        post(&app, "/api/v1/courses/1/groups", Some((ROOT, true)), body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["tutor_id"], TUTOR);
    assert_eq!(created["course_id"], 1);
    assert_eq!(created["description"], "blah blahe");

    let groups = GroupRepository::find_by_course(&*store, 1).await.unwrap();
    assert_eq!(groups.len(), 3);
}

#[tokio::test]
async fn test_create_invalid_group() {
    let (app, _) = setup_app().await;

    let (status, _) = post(
        &app,
        "/api/v1/courses/1/groups",
        Some((ROOT, true)),
        json!({ "tutor_id": 0, "description": "no tutor" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/v1/courses/1/groups",
        Some((ROOT, true)),
        json!({ "tutor_id": TUTOR, "description": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/v1/courses/99/groups",
        Some((ROOT, true)),
        json!({ "tutor_id": TUTOR, "description": "nowhere" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_group() {
    let (app, store) = setup_app().await;
    let body = json!({ "tutor_id": OTHER_TUTOR, "description": "new descr" });

    let (status, _) = put(&app, "/api/v1/groups/1", Some((STUDENT, false)), body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = put(&app, "/api/v1/groups/1", Some((TUTOR, false)), body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = put(&app, "/api/v1/groups/1", Some((ROOT, false)), body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "new descr");

    let stored = GroupRepository::find_by_id(&*store, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.tutor_id, OTHER_TUTOR);
    assert_eq!(stored.course_id, 1);
}

#[tokio::test]
async fn test_delete_group() {
    let (app, store) = setup_app().await;

    let (status, _) = delete(&app, "/api/v1/groups/1", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = delete(&app, "/api/v1/groups/1", Some((STUDENT, false))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = delete(&app, "/api/v1/groups/1", Some((TUTOR, false))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = delete(&app, "/api/v1/groups/1", Some((ROOT, false))).await;
    assert_eq!(status, StatusCode::OK);

    let groups = GroupRepository::find_by_course(&*store, 1).await.unwrap();
    assert_eq!(groups.len(), 1);
}

#[tokio::test]
async fn test_find_my_group_as_student() {
    let (app, _) = setup_app().await;

    let (status, _) = get(&app, "/api/v1/courses/1/group", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = get(&app, "/api/v1/courses/1/group", Some((STUDENT, false))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["course_id"], 1);
    assert_eq!(body["id"], 1);
}

#[tokio::test]
async fn test_find_my_group_as_tutor() {
    let (app, _) = setup_app().await;

    let (status, body) = get(&app, "/api/v1/courses/1/group", Some((TUTOR, false))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["course_id"], 1);
    assert_eq!(body["tutor_id"], TUTOR);

    // the root flag does not hide the group a user leads
    let (status, body) = get(&app, "/api/v1/courses/1/group", Some((TUTOR, true))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tutor_id"], TUTOR);
}

#[tokio::test]
async fn test_find_my_group_without_group() {
    let (app, _) = setup_app().await;

    let (status, _) = get(&app, "/api/v1/courses/1/group", Some((LONELY_STUDENT, false))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/v1/courses/1/group", Some((ROOT, true))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/v1/courses/1/group", Some((OUTSIDER, false))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_assign_student_to_group() {
    let (app, store) = setup_app().await;

    let (status, _) = post(
        &app,
        "/api/v1/groups/2/enrollments",
        Some((TUTOR, false)),
        json!({ "user_id": LONELY_STUDENT }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // tutors cannot be members
    let (status, _) = post(
        &app,
        "/api/v1/groups/2/enrollments",
        Some((ROOT, false)),
        json!({ "user_id": TUTOR }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/v1/groups/2/enrollments",
        Some((ROOT, false)),
        json!({ "user_id": OUTSIDER }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // moving 112 from group 1 into group 2
    let (status, _) = post(
        &app,
        "/api/v1/groups/2/enrollments",
        Some((ROOT, false)),
        json!({ "user_id": STUDENT }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let group = GroupRepository::find_for_member(&*store, 1, STUDENT)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(group.id, 2);
}

#[tokio::test]
async fn test_group_permissions() {
    let (app, _) = setup_app().await;
    let url = "/api/v1/groups/1";

    let (status, _) = get(&app, url, Some((ROOT, true))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, url, Some((TUTOR, false))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, url, Some((STUDENT, false))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = delete(&app, "/api/v1/courses/1/enrollments", Some((STUDENT, false))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, url, Some((STUDENT, false))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_disenroll_leaves_group() {
    let (app, store) = setup_app().await;

    let (status, _) = delete(&app, "/api/v1/courses/1/enrollments", Some((STUDENT, false))).await;
    assert_eq!(status, StatusCode::OK);

    let group = GroupRepository::find_for_member(&*store, 1, STUDENT)
        .await
        .unwrap();
    assert!(group.is_none());
}

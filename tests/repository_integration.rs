//! Integration tests for the repository layer
//!
//! The same contract runs against both backends. The in-memory runs are
//! always on; the PostgreSQL runs need `DATABASE_URL` and are ignored by
//! default:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/lecturehall_test cargo test -- --ignored
//! ```

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use lecturehall_api::auth::password::hash_password;
use lecturehall_api::domain::access::{authorize, AccessError};
use lecturehall_api::domain::course::{CourseDraft, CourseRole};
use lecturehall_api::domain::errors::RepositoryError;
use lecturehall_api::domain::group::GroupDraft;
use lecturehall_api::domain::material::{MaterialDraft, MaterialKind};
use lecturehall_api::domain::principal::Principal;
use lecturehall_api::domain::user::{Email, NewUser, ProfileDraft};
use lecturehall_api::infrastructure::repositories::InMemoryStore;
use lecturehall_api::state::Stores;

fn memory_stores() -> Stores {
    Stores::in_memory(Arc::new(InMemoryStore::new()))
}

/// Set up test database connection pool with the schema applied
async fn postgres_stores() -> Stores {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for integration tests");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Stores::postgres(pool)
}

/// Creates a user with a unique address so runs can share a database
async fn create_user(stores: &Stores, first_name: &str) -> i64 {
    let email = Email::new(format!("{}-{}@uni-tuebingen.de", first_name, Uuid::new_v4()))
        .expect("valid email");

    stores
        .users
        .create(NewUser {
            profile: ProfileDraft {
                first_name: first_name.to_string(),
                last_name: "Tester".to_string(),
                student_number: "0815".to_string(),
                semester: 1,
                subject: "informatics".to_string(),
                language: "en".to_string(),
            },
            email,
            encrypted_password: hash_password("testpass").expect("hash password"),
            confirm_email_token: None,
            root: false,
        })
        .await
        .expect("Failed to create test user")
        .id
}

async fn create_course(stores: &Stores, name: &str) -> i64 {
    let begins_at = Utc::now();
    stores
        .courses
        .create(CourseDraft {
            name: name.to_string(),
            description: String::new(),
            begins_at,
            ends_at: begins_at + Duration::days(90),
            required_percentage: 50,
        })
        .await
        .expect("Failed to create test course")
        .id
}

async fn user_contract(stores: Stores) {
    let id = create_user(&stores, "Ada").await;

    let mut user = stores.users.find_by_id(id).await.unwrap().expect("user exists");
    assert_eq!(user.first_name, "Ada");
    assert!(user.is_confirmed());

    let found = stores.users.find_by_email(&user.email).await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(id));

    // duplicate address
    let duplicate = stores
        .users
        .create(NewUser {
            profile: ProfileDraft {
                first_name: "Copy".to_string(),
                last_name: "Cat".to_string(),
                ..ProfileDraft::default()
            },
            email: user.email.clone(),
            encrypted_password: "hash".to_string(),
            confirm_email_token: None,
            root: false,
        })
        .await;
    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

    let new_email = Email::new(format!("moved-{}@uni-tuebingen.de", Uuid::new_v4())).unwrap();
    user.change_email(new_email.clone(), "token".to_string());
    stores.users.update(&user).await.unwrap();

    let stored = stores.users.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.email, new_email);
    assert_eq!(stored.confirm_email_token.as_deref(), Some("token"));
}

async fn enrollment_contract(stores: Stores) {
    let course = create_course(&stores, "Info2").await;
    let first = create_user(&stores, "Student").await;
    let second = create_user(&stores, "Student").await;
    let tutor = create_user(&stores, "Tutor").await;

    let enrollments = stores.enrollments.as_ref();
    enrollments
        .enroll(first, course, CourseRole::Student)
        .await
        .unwrap();
    enrollments
        .enroll(second, course, CourseRole::Student)
        .await
        .unwrap();
    enrollments
        .enroll(tutor, course, CourseRole::Tutor)
        .await
        .unwrap();

    let students = enrollments.list(course, &[CourseRole::Student]).await.unwrap();
    assert_eq!(students.len(), 2);
    assert!(students.iter().all(|e| e.role == CourseRole::Student));

    let members = enrollments
        .list(course, &[CourseRole::Student, CourseRole::Tutor])
        .await
        .unwrap();
    assert_eq!(members.len(), 3);
    assert_eq!(enrollments.list(course, &[]).await.unwrap().len(), 3);
    assert!(enrollments
        .list(course, &[CourseRole::Admin])
        .await
        .unwrap()
        .is_empty());

    let row = enrollments.find(tutor, course).await.unwrap().unwrap();
    assert_eq!(row.role, CourseRole::Tutor);
    assert_eq!(row.first_name, "Tutor");

    let again = enrollments.enroll(first, course, CourseRole::Student).await;
    assert!(matches!(again, Err(RepositoryError::Conflict(_))));

    enrollments
        .change_role(tutor, course, CourseRole::Admin)
        .await
        .unwrap();
    let mine = enrollments.list_for_user(tutor).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].role, CourseRole::Admin);
}

async fn disenrolled_user_loses_access(stores: Stores) {
    let course = create_course(&stores, "Info1").await;
    let student = create_user(&stores, "Student").await;
    let principal = Principal::new(student, false);

    stores
        .enrollments
        .enroll(student, course, CourseRole::Student)
        .await
        .unwrap();
    let role = authorize(stores.enrollments.as_ref(), &principal, course, &[CourseRole::Student])
        .await
        .unwrap();
    assert_eq!(role, CourseRole::Student);

    stores.enrollments.disenroll(student, course).await.unwrap();

    let denied =
        authorize(stores.enrollments.as_ref(), &principal, course, &[CourseRole::Student]).await;
    assert_eq!(denied, Err(AccessError::NotEnrolled { course_id: course }));

    let missing = stores.enrollments.disenroll(student, course).await;
    assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
}

async fn group_contract(stores: Stores) {
    let course = create_course(&stores, "Info2").await;
    let tutor = create_user(&stores, "Tutor").await;
    let student = create_user(&stores, "Student").await;
    stores
        .enrollments
        .enroll(student, course, CourseRole::Student)
        .await
        .unwrap();

    let draft = |description: &str| GroupDraft {
        tutor_id: tutor,
        description: description.to_string(),
    };
    let monday = stores.groups.create(course, draft("Monday")).await.unwrap();
    let friday = stores.groups.create(course, draft("Friday")).await.unwrap();
    assert_eq!(stores.groups.find_by_course(course).await.unwrap().len(), 2);

    stores.groups.assign_member(monday.id, student).await.unwrap();
    let group = stores.groups.find_for_member(course, student).await.unwrap();
    assert_eq!(group.map(|g| g.id), Some(monday.id));

    // one group per course
    stores.groups.assign_member(friday.id, student).await.unwrap();
    let group = stores.groups.find_for_member(course, student).await.unwrap();
    assert_eq!(group.map(|g| g.id), Some(friday.id));

    let led = stores.groups.find_for_tutor(course, tutor).await.unwrap();
    assert!(led.is_some());

    stores.enrollments.disenroll(student, course).await.unwrap();
    assert!(stores
        .groups
        .find_for_member(course, student)
        .await
        .unwrap()
        .is_none());

    stores.groups.delete(monday.id).await.unwrap();
    assert!(stores.groups.find_by_id(monday.id).await.unwrap().is_none());
}

async fn course_delete_cascades(stores: Stores) {
    let course = create_course(&stores, "Info2").await;
    let other = create_course(&stores, "Info1").await;
    let student = create_user(&stores, "Student").await;

    for id in [course, other] {
        stores
            .enrollments
            .enroll(student, id, CourseRole::Student)
            .await
            .unwrap();
    }
    let group = stores
        .groups
        .create(
            course,
            GroupDraft {
                tutor_id: student,
                description: "Tuesday".to_string(),
            },
        )
        .await
        .unwrap();
    let material = stores
        .materials
        .create(
            course,
            MaterialDraft {
                name: "Slides".to_string(),
                filename: "slides.pdf".to_string(),
                kind: MaterialKind::Slide,
                publish_at: Utc::now(),
                lecture_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    stores.courses.delete(course).await.unwrap();

    assert!(stores.courses.find_by_id(course).await.unwrap().is_none());
    assert!(stores.enrollments.find(student, course).await.unwrap().is_none());
    assert!(stores.groups.find_by_id(group.id).await.unwrap().is_none());
    assert!(stores.materials.find_by_id(material.id).await.unwrap().is_none());

    // the other course is untouched
    assert!(stores.enrollments.find(student, other).await.unwrap().is_some());

    let missing = stores.courses.delete(course).await;
    assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
}

async fn material_contract(stores: Stores) {
    let course = create_course(&stores, "Info2").await;
    let now = Utc::now();
    let draft = |name: &str, lecture_in: Duration| MaterialDraft {
        name: name.to_string(),
        filename: format!("{}.pdf", name),
        kind: MaterialKind::Supplementary,
        publish_at: now,
        lecture_at: now + lecture_in,
    };

    let late = stores
        .materials
        .create(course, draft("late", Duration::days(7)))
        .await
        .unwrap();
    let early = stores
        .materials
        .create(course, draft("early", Duration::days(1)))
        .await
        .unwrap();

    let ids: Vec<i64> = stores
        .materials
        .find_by_course(course)
        .await
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec![early.id, late.id]);

    let mut renamed = late.clone();
    renamed.name = "renamed".to_string();
    stores.materials.update(&renamed).await.unwrap();
    let stored = stores.materials.find_by_id(late.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "renamed");
    assert_eq!(stored.kind, MaterialKind::Supplementary);

    let orphan = stores.materials.create(-1, draft("orphan", Duration::zero())).await;
    assert!(matches!(orphan, Err(RepositoryError::NotFound(_))));
}

/// Deleting the newest row must not hand its id to the next insert
async fn deleted_ids_are_not_reused(stores: Stores) {
    let course = create_course(&stores, "Info2").await;
    let tutor = create_user(&stores, "Tutor").await;
    let draft = MaterialDraft {
        name: "sheet".to_string(),
        filename: "sheet.pdf".to_string(),
        kind: MaterialKind::Slide,
        publish_at: Utc::now(),
        lecture_at: Utc::now(),
    };

    let material = stores.materials.create(course, draft.clone()).await.unwrap();
    stores.materials.delete(material.id).await.unwrap();
    let next = stores.materials.create(course, draft).await.unwrap();
    assert!(next.id > material.id);

    let group_draft = GroupDraft {
        tutor_id: tutor,
        description: String::new(),
    };
    let group = stores.groups.create(course, group_draft.clone()).await.unwrap();
    stores.groups.delete(group.id).await.unwrap();
    let next = stores.groups.create(course, group_draft).await.unwrap();
    assert!(next.id > group.id);

    let old = create_course(&stores, "Info3").await;
    stores.courses.delete(old).await.unwrap();
    let next = create_course(&stores, "Info3").await;
    assert!(next > old);
}

#[tokio::test]
async fn test_memory_user_repository() {
    user_contract(memory_stores()).await;
}

#[tokio::test]
async fn test_memory_enrollment_repository() {
    enrollment_contract(memory_stores()).await;
}

#[tokio::test]
async fn test_memory_disenrolled_user_loses_access() {
    disenrolled_user_loses_access(memory_stores()).await;
}

#[tokio::test]
async fn test_memory_group_repository() {
    group_contract(memory_stores()).await;
}

#[tokio::test]
async fn test_memory_course_delete_cascades() {
    course_delete_cascades(memory_stores()).await;
}

#[tokio::test]
async fn test_memory_material_repository() {
    material_contract(memory_stores()).await;
}

#[tokio::test]
async fn test_memory_deleted_ids_are_not_reused() {
    deleted_ids_are_not_reused(memory_stores()).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_user_repository() {
    user_contract(postgres_stores().await).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_enrollment_repository() {
    enrollment_contract(postgres_stores().await).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_disenrolled_user_loses_access() {
    disenrolled_user_loses_access(postgres_stores().await).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_group_repository() {
    group_contract(postgres_stores().await).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_course_delete_cascades() {
    course_delete_cascades(postgres_stores().await).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_material_repository() {
    material_contract(postgres_stores().await).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_deleted_ids_are_not_reused() {
    deleted_ids_are_not_reused(postgres_stores().await).await;
}

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{accounts, auth, courses, enrollments, groups, materials};
use crate::state::AppState;

/// Builds the full application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = state.config.max_upload_bytes;

    let api = Router::new()
        // Auth
        .route("/auth/token", post(auth::login))
        .route("/auth/confirm_email", post(auth::confirm_email))
        // Account
        .route(
            "/account",
            post(accounts::create_account)
                .get(accounts::get_account)
                .patch(accounts::edit_account),
        )
        .route(
            "/account/enrollments",
            get(accounts::get_account_enrollments),
        )
        // Courses
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/courses/:id",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        .route("/courses/:id/emails", post(courses::send_course_email))
        // Enrollments
        .route(
            "/courses/:id/enrollments",
            get(enrollments::list_enrollments)
                .post(enrollments::enroll)
                .delete(enrollments::disenroll),
        )
        .route(
            "/courses/:id/enrollments/:user_id",
            put(enrollments::change_role).delete(enrollments::remove_enrollment),
        )
        // Groups
        .route(
            "/courses/:id/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route("/courses/:id/group", get(groups::find_my_group))
        .route(
            "/groups/:id",
            get(groups::get_group)
                .put(groups::update_group)
                .delete(groups::delete_group),
        )
        .route("/groups/:id/enrollments", post(groups::assign_member))
        // Materials
        .route(
            "/courses/:id/materials",
            get(materials::list_materials).post(materials::create_material),
        )
        .route(
            "/materials/:id",
            get(materials::get_material)
                .put(materials::update_material)
                .delete(materials::delete_material),
        )
        .route(
            "/materials/:id/file",
            get(materials::download_file)
                .post(materials::upload_file)
                .layer(DefaultBodyLimit::max(upload_limit)),
        );

    Router::new()
        .route("/ping", get(auth::ping))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

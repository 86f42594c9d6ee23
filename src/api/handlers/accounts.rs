use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::api::middleware::JwtAuth;
use crate::auth::password::{hash_password, verify_password};
use crate::domain::course::CourseRole;
use crate::domain::user::user::validate_password;
use crate::domain::user::{AccountDraft, Email, NewUser, ProfileDraft, User};
use crate::infrastructure::mail::{dispatch, OutgoingMail};
use crate::state::AppState;

/// Request body for account creation
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub account: AccountDraft,
    pub user: ProfileDraft,
}

/// Credentials sent along with an account edit
#[derive(Debug, Default, Deserialize)]
pub struct AccountEdit {
    /// Current password, always required
    #[serde(default)]
    pub plain_password: String,
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Profile fields to change, absent fields stay as they are
#[derive(Debug, Default, Deserialize)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub student_number: Option<String>,
    pub semester: Option<i32>,
    pub subject: Option<String>,
    pub language: Option<String>,
}

impl ProfilePatch {
    fn merge(self, user: &User) -> ProfileDraft {
        ProfileDraft {
            first_name: self.first_name.unwrap_or_else(|| user.first_name.clone()),
            last_name: self.last_name.unwrap_or_else(|| user.last_name.clone()),
            student_number: self
                .student_number
                .unwrap_or_else(|| user.student_number.clone()),
            semester: self.semester.unwrap_or(user.semester),
            subject: self.subject.unwrap_or_else(|| user.subject.clone()),
            language: self.language.unwrap_or_else(|| user.language.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditAccountRequest {
    #[serde(default)]
    pub account: AccountEdit,
    #[serde(default)]
    pub user: ProfilePatch,
}

/// Public view of an account, without credentials
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_number: String,
    pub semester: i32,
    pub subject: String,
    pub language: String,
    pub root: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.to_string(),
            student_number: user.student_number.clone(),
            semester: user.semester,
            subject: user.subject.clone(),
            language: user.language.clone(),
            root: user.root,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountEnrollmentResponse {
    pub course_id: i64,
    pub role: CourseRole,
}

fn confirmation_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Create a new account
///
/// POST /api/v1/account
#[tracing::instrument(skip_all)]
pub async fn create_account(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateAccountRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    req.user.validate()?;
    let email = req.account.validate_new(state.config.min_password_length)?;

    if state.stores.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let encrypted_password = hash_password(&req.account.plain_password)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    let token = confirmation_token();
    let user = state
        .stores
        .users
        .create(NewUser {
            profile: req.user,
            email,
            encrypted_password,
            confirm_email_token: Some(token.clone()),
            root: false,
        })
        .await?;

    dispatch(
        state.mailer.clone(),
        vec![OutgoingMail::email_confirmation(
            user.email.as_str(),
            &user.first_name,
            &token,
            &state.config.mail.public_url,
        )],
    );

    tracing::info!(user_id = user.id, "account created");
    Ok((StatusCode::OK, Json(UserResponse::from(&user))))
}

/// Get the account of the caller
///
/// GET /api/v1/account
#[tracing::instrument(skip_all, fields(user_id = principal.user_id))]
pub async fn get_account(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .stores
        .users
        .find_by_id(principal.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User not found: {}", principal.user_id)))?;

    Ok(Json(UserResponse::from(&user)))
}

/// Edit the account of the caller
///
/// PATCH /api/v1/account
///
/// The current password must be sent along. Changing the email address
/// starts a new confirmation round.
#[tracing::instrument(skip_all, fields(user_id = principal.user_id))]
pub async fn edit_account(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    JsonBody(req): JsonBody<EditAccountRequest>,
) -> Result<StatusCode, ApiError> {
    let mut user = state
        .stores
        .users
        .find_by_id(principal.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User not found: {}", principal.user_id)))?;

    // A malformed stored hash counts as a mismatch
    let valid = verify_password(&req.account.plain_password, &user.encrypted_password)
        .unwrap_or(false);
    if !valid {
        return Err(ApiError::bad_request("Incorrect password"));
    }

    let new_email = match &req.user.email {
        Some(raw) => {
            let email = Email::new(raw.as_str())?;
            (email != user.email).then_some(email)
        }
        None => None,
    };

    if let Some(email) = &new_email {
        if state.stores.users.find_by_email(email).await?.is_some() {
            return Err(ApiError::bad_request("Email already registered"));
        }
    }

    let profile = req.user.merge(&user);
    profile.validate()?;
    user.apply_profile(profile);

    if let Some(password) = &req.account.new_password {
        validate_password(password, state.config.min_password_length)?;
        user.encrypted_password =
            hash_password(password).map_err(|e| ApiError::internal_server_error(e.to_string()))?;
    }

    let mut mails = Vec::new();
    if let Some(email) = new_email {
        let token = confirmation_token();
        mails.push(OutgoingMail::email_confirmation(
            email.as_str(),
            &user.first_name,
            &token,
            &state.config.mail.public_url,
        ));
        user.change_email(email, token);
    }

    state.stores.users.update(&user).await?;
    dispatch(state.mailer.clone(), mails);

    tracing::info!("account updated");
    Ok(StatusCode::NO_CONTENT)
}

/// List the courses the caller is enrolled in
///
/// GET /api/v1/account/enrollments
#[tracing::instrument(skip_all, fields(user_id = principal.user_id))]
pub async fn get_account_enrollments(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
) -> Result<Json<Vec<AccountEnrollmentResponse>>, ApiError> {
    let enrollments = state
        .stores
        .enrollments
        .list_for_user(principal.user_id)
        .await?;

    Ok(Json(
        enrollments
            .into_iter()
            .map(|e| AccountEnrollmentResponse {
                course_id: e.course_id,
                role: e.role,
            })
            .collect(),
    ))
}

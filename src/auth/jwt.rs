// Access token creation and verification
// HS256 signed, carrying the user id and the global root flag

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::principal::Principal;

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (user id)
/// * `root` - Whether the user is a global administrator
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: i64,
    #[serde(default)]
    pub root: bool,
    pub exp: usize,
}

impl Claims {
    /// The principal these claims describe, if the subject is usable
    pub fn principal(&self) -> Option<Principal> {
        if self.sub <= 0 {
            return None;
        }
        Some(Principal::new(self.sub, self.root))
    }
}

/// Creates an access token for a user
///
/// # Example
/// ```
/// use lecturehall_api::auth::jwt::create_token;
///
/// let token = create_token(112, false, "your-secret-key", 8).expect("valid token");
/// assert_eq!(token.split('.').count(), 3);
/// ```
pub fn create_token(user_id: i64, root: bool, secret: &str, ttl_hours: i64) -> Result<String, String> {
    let expiry = Utc::now() + Duration::hours(ttl_hours);
    let claims = Claims {
        sub: user_id,
        root,
        exp: expiry.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| e.to_string())
}

/// Verifies and decodes an access token
///
/// # Example
/// ```
/// use lecturehall_api::auth::jwt::{create_token, verify_token};
///
/// let token = create_token(1, true, "your-secret-key", 8).unwrap();
/// let claims = verify_token(&token, "your-secret-key").expect("valid token");
/// assert_eq!(claims.sub, 1);
/// assert!(claims.root);
/// ```
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

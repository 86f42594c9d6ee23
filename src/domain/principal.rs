use serde::{Deserialize, Serialize};

/// The authenticated actor behind a request
///
/// Built from verified access claims and never changed while the request
/// is being served. `is_root` marks global administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub is_root: bool,
}

impl Principal {
    pub fn new(user_id: i64, is_root: bool) -> Self {
        Self { user_id, is_root }
    }
}

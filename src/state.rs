// Shared application state handed to every handler

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::repositories::{
    CourseRepository, EnrollmentRepository, GroupRepository, MaterialRepository, UserRepository,
};
use crate::infrastructure::files::{FileStore, LocalFileStore};
use crate::infrastructure::mail::Mailer;
use crate::infrastructure::repositories::{
    InMemoryStore, PostgresCourseRepository, PostgresEnrollmentRepository,
    PostgresGroupRepository, PostgresMaterialRepository, PostgresUserRepository,
};

/// One handle per repository
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub materials: Arc<dyn MaterialRepository>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            courses: Arc::new(PostgresCourseRepository::new(pool.clone())),
            enrollments: Arc::new(PostgresEnrollmentRepository::new(pool.clone())),
            groups: Arc::new(PostgresGroupRepository::new(pool.clone())),
            materials: Arc::new(PostgresMaterialRepository::new(pool)),
        }
    }

    /// Every repository backed by the same in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            courses: store.clone(),
            enrollments: store.clone(),
            groups: store.clone(),
            materials: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub files: Arc<dyn FileStore>,
}

impl AppState {
    /// Material files go to a local store below `config.upload_dir`
    pub fn new(stores: Stores, config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let files = Arc::new(LocalFileStore::new(
            config.upload_dir.clone(),
            config.max_upload_bytes,
        ));

        Self {
            stores,
            config: Arc::new(config),
            mailer,
            files,
        }
    }
}

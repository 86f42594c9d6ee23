// Repository contracts for each aggregate
// Implementations live in the infrastructure layer

pub mod course_repository;
pub mod enrollment_repository;
pub mod group_repository;
pub mod material_repository;
pub mod user_repository;

pub use course_repository::CourseRepository;
pub use enrollment_repository::EnrollmentRepository;
pub use group_repository::GroupRepository;
pub use material_repository::MaterialRepository;
pub use user_repository::UserRepository;

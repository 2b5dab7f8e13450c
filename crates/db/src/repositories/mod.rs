//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept any `SqliteExecutor` (a pool reference or an open
//! transaction) as the first argument, so the [`crate::store`] facade can
//! compose them inside one transaction.

pub mod course_repo;
pub mod video_repo;

pub use course_repo::CourseRepo;
pub use video_repo::VideoRepo;

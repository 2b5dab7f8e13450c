//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct
//! matching the database row and the create DTOs used for inserts.

pub mod course;
pub mod video;

pub use course::{Course, CreateCourse};
pub use video::{CreateVideo, Video};

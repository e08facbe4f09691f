pub mod course;

pub use course::{Course, NewCourse, UpdateCourseRequest};

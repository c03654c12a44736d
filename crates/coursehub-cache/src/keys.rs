//! Cache key builders.
//!
//! Both key shapes are shared with every other node talking to the same
//! Redis, so they must not change.

use coursehub_core::types::CourseId;

/// Key of a course's remaining-seat counter.
pub fn course_stock(course_id: CourseId) -> String {
    format!("course:{course_id}:stock")
}

/// Key of a course's selection lock.
pub fn course_lock(course_id: CourseId) -> String {
    format!("lock:course:{course_id}")
}

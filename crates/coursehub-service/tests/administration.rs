mod common;

use chrono::Duration;

use coursehub_core::error::ErrorKind;
use coursehub_core::traits::CacheProvider;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::course::UpdateCourse;
use coursehub_entity::student::CreateStudent;

use common::{course_input, harness};

fn update_from(course: &coursehub_entity::course::Course, available: i32) -> UpdateCourse {
    UpdateCourse {
        name: course.name.clone(),
        description: course.description.clone(),
        total_seats: course.total_seats,
        available_seats: available,
        selection_start_time: course.selection_start_time,
        selection_end_time: course.selection_end_time,
        is_active: course.is_active,
    }
}

#[tokio::test]
async fn test_create_seeds_stock_under_shared_key() {
    let h = harness();
    let course = h.open_course(30).await;

    assert_eq!(h.stock.get_stock(course.id).await.unwrap(), 30);
    assert_eq!(
        h.cache
            .get(&format!("course:{}:stock", course.id))
            .await
            .unwrap(),
        Some("30".to_string())
    );
}

#[tokio::test]
async fn test_create_rejects_invalid_course() {
    let h = harness();
    let now = chrono::Utc::now();
    let mut input = course_input(10, now, now + Duration::days(1));
    input.available_seats = Some(11);
    let err = h.courses.create(input).await.unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    let input = course_input(10, now, now);
    let err = h.courses.create(input).await.unwrap_err();
    assert!(err.is(ErrorKind::Validation));
}

#[tokio::test]
async fn test_update_overwrites_stock() {
    let h = harness();
    let course = h.open_course(10).await;

    let updated = h
        .courses
        .update(course.id, update_from(&course, 4), Some(course.updated_at))
        .await
        .unwrap();
    assert_eq!(updated.available_seats, 4);
    assert_eq!(h.stock.get_stock(course.id).await.unwrap(), 4);
}

#[tokio::test]
async fn test_update_conflict_and_not_found() {
    let h = harness();
    let course = h.open_course(10).await;

    h.courses
        .update(course.id, update_from(&course, 9), None)
        .await
        .unwrap();

    let err = h
        .courses
        .update(course.id, update_from(&course, 8), Some(course.updated_at))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Conflict));
    assert_eq!(h.stock.get_stock(course.id).await.unwrap(), 9);

    h.courses.delete(course.id).await.unwrap();
    let err = h
        .courses
        .update(course.id, update_from(&course, 8), Some(course.updated_at))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_delete_removes_stock() {
    let h = harness();
    let course = h.open_course(3).await;

    h.courses.delete(course.id).await.unwrap();
    assert!(!h.stock_counter.is_initialized(course.id).await.unwrap());
    assert!(h.courses.get(course.id).await.unwrap_err().is(ErrorKind::NotFound));
    assert!(
        h.courses
            .delete(course.id)
            .await
            .unwrap_err()
            .is(ErrorKind::NotFound)
    );
}

#[tokio::test]
async fn test_initialize_all_reseeds_from_database() {
    let h = harness();
    let a = h.open_course(3).await;
    let b = h.open_course(7).await;
    h.stock.set_stock(a.id, 0).await.unwrap();
    h.stock.remove_stock(b.id).await.unwrap();

    assert_eq!(h.stock.initialize_all().await.unwrap(), 2);
    assert_eq!(h.stock.get_stock(a.id).await.unwrap(), 3);
    assert_eq!(h.stock.get_stock(b.id).await.unwrap(), 7);

    let err = h.stock.initialize_stock(CourseId(404)).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    assert!(h.stock.set_stock(a.id, -1).await.unwrap_err().is(ErrorKind::Validation));
}

#[tokio::test]
async fn test_student_courses_and_delete_returns_seats() {
    let h = harness();
    let first = h.open_course(2).await;
    let second = h.open_course(2).await;
    let student = h.student(1).await;

    h.selection.select(student.id, first.id).await.unwrap();
    h.selection.select(student.id, second.id).await.unwrap();

    let courses = h.students.courses(student.id).await.unwrap();
    let ids: Vec<CourseId> = courses.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    h.students.delete(student.id).await.unwrap();
    for course in [&first, &second] {
        assert_eq!(h.stock.get_stock(course.id).await.unwrap(), 2);
        assert_eq!(h.stored_course(course).await.available_seats, 2);
    }
    assert!(
        h.students
            .courses(student.id)
            .await
            .unwrap_err()
            .is(ErrorKind::NotFound)
    );
}

#[tokio::test]
async fn test_student_update_and_duplicates() {
    let h = harness();
    let student = h.student(1).await;
    h.student(2).await;

    let updated = h
        .students
        .update(
            student.id,
            CreateStudent {
                name: "Grace Hopper".to_string(),
                student_number: student.student_number.clone(),
                email: "grace@example.edu".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Grace Hopper");

    let err = h
        .students
        .update(
            student.id,
            CreateStudent {
                name: "Grace Hopper".to_string(),
                student_number: "S00002".to_string(),
                email: "grace@example.edu".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Conflict));

    let err = h
        .students
        .update(
            StudentId(77),
            CreateStudent {
                name: "Nobody".to_string(),
                student_number: "S77".to_string(),
                email: "nobody@example.edu".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

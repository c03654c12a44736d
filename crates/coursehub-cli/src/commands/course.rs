//! Course inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use coursehub_core::config::AppConfig;
use coursehub_core::error::AppError;
use coursehub_core::types::CourseId;
use coursehub_database::{CourseRepository, CourseStore, EnrollmentRepository};
use coursehub_entity::course::Course;

use crate::output::{self, OutputFormat};

/// Arguments for course commands
#[derive(Debug, Args)]
pub struct CourseArgs {
    /// Course subcommand
    #[command(subcommand)]
    pub command: CourseCommand,
}

/// Course subcommands
#[derive(Debug, Subcommand)]
pub enum CourseCommand {
    /// List all courses
    List,
    /// Show one course and its enrollments
    Show {
        /// Course id
        id: CourseId,
    },
}

/// Course display row for table output
#[derive(Debug, Serialize, Tabled)]
struct CourseRow {
    id: i64,
    name: String,
    seats: String,
    window: String,
    active: bool,
}

impl From<&Course> for CourseRow {
    fn from(c: &Course) -> Self {
        Self {
            id: c.id.get(),
            name: c.name.clone(),
            seats: format!("{}/{}", c.available_seats, c.total_seats),
            window: format!(
                "{} .. {}",
                c.selection_start_time.format("%Y-%m-%d %H:%M"),
                c.selection_end_time.format("%Y-%m-%d %H:%M")
            ),
            active: c.is_active,
        }
    }
}

/// Execute course commands
pub async fn execute(
    args: &CourseArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::connect_database(config).await?;
    let courses = CourseRepository::new(pool.pool().clone());

    match &args.command {
        CourseCommand::List => {
            let rows: Vec<CourseRow> = courses.find_all().await?.iter().map(Into::into).collect();
            output::print_list(&rows, format);
        }
        CourseCommand::Show { id } => {
            let course = courses
                .find_by_id(*id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Course {id} not found")))?;
            output::print_item(&course, format);

            let enrollments = EnrollmentRepository::new(pool.pool().clone())
                .find_by_course(*id)
                .await?;
            output::print_kv("Enrollments", &enrollments.len().to_string());
            output::print_kv("Enrolled seats", &course.enrolled_seats().to_string());
            if enrollments.len() as i64 != i64::from(course.enrolled_seats()) {
                output::print_warning("Enrollment rows and seat count disagree");
            }
        }
    }

    Ok(())
}

//! Student inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use coursehub_core::config::AppConfig;
use coursehub_core::error::AppError;
use coursehub_core::types::StudentId;
use coursehub_database::{StudentRepository, StudentStore};
use coursehub_entity::student::Student;

use crate::output::{self, OutputFormat};

/// Arguments for student commands
#[derive(Debug, Args)]
pub struct StudentArgs {
    /// Student subcommand
    #[command(subcommand)]
    pub command: StudentCommand,
}

/// Student subcommands
#[derive(Debug, Subcommand)]
pub enum StudentCommand {
    /// List all students
    List,
    /// List the courses a student is enrolled in
    Courses {
        /// Student id
        id: StudentId,
    },
}

/// Student display row for table output
#[derive(Debug, Serialize, Tabled)]
struct StudentRow {
    id: i64,
    name: String,
    student_number: String,
    email: String,
}

impl From<&Student> for StudentRow {
    fn from(s: &Student) -> Self {
        Self {
            id: s.id.get(),
            name: s.name.clone(),
            student_number: s.student_number.clone(),
            email: s.email.clone(),
        }
    }
}

/// Enrolled course row for table output
#[derive(Debug, Serialize, Tabled)]
struct EnrolledRow {
    course_id: i64,
    name: String,
}

/// Execute student commands
pub async fn execute(
    args: &StudentArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::connect_database(config).await?;
    let students = StudentRepository::new(pool.pool().clone());

    match &args.command {
        StudentCommand::List => {
            let rows: Vec<StudentRow> =
                students.find_all().await?.iter().map(Into::into).collect();
            output::print_list(&rows, format);
        }
        StudentCommand::Courses { id } => {
            if students.find_by_id(*id).await?.is_none() {
                return Err(AppError::not_found(format!("Student {id} not found")));
            }
            let rows: Vec<EnrolledRow> = students
                .find_courses(*id)
                .await?
                .into_iter()
                .map(|c| EnrolledRow {
                    course_id: c.id.get(),
                    name: c.name,
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}

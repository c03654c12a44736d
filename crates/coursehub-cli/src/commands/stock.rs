//! Stock counter maintenance commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use coursehub_core::config::AppConfig;
use coursehub_core::error::AppError;
use coursehub_core::types::CourseId;

use crate::output::{self, OutputFormat};

/// Arguments for stock commands
#[derive(Debug, Args)]
pub struct StockArgs {
    /// Stock subcommand
    #[command(subcommand)]
    pub command: StockCommand,
}

/// Stock subcommands
#[derive(Debug, Subcommand)]
pub enum StockCommand {
    /// Seed every course's counter from its available seats
    InitAll,
    /// Seed one course's counter from its available seats
    Init {
        /// Course id
        id: CourseId,
    },
    /// Read one course's counter
    Get {
        /// Course id
        id: CourseId,
    },
    /// Overwrite one course's counter
    Set {
        /// Course id
        id: CourseId,
        /// New value
        value: i64,
    },
}

/// Counter display row
#[derive(Debug, Serialize, Tabled)]
struct StockRow {
    course_id: i64,
    stock: i64,
}

/// Execute stock commands
pub async fn execute(
    args: &StockArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let stock = super::stock_service(config).await?;

    match &args.command {
        StockCommand::InitAll => {
            let count = stock.initialize_all().await?;
            output::print_success(&format!("Initialized {count} stock counters."));
        }
        StockCommand::Init { id } => {
            let value = stock.initialize_stock(*id).await?;
            output::print_success(&format!("Course {id} stock set to {value}."));
        }
        StockCommand::Get { id } => {
            let row = StockRow {
                course_id: id.get(),
                stock: stock.get_stock(*id).await?,
            };
            output::print_list(&[row], format);
        }
        StockCommand::Set { id, value } => {
            stock.set_stock(*id, *value).await?;
            output::print_success(&format!("Course {id} stock set to {value}."));
        }
    }

    Ok(())
}

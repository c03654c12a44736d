//! CLI command definitions and dispatch.

pub mod config;
pub mod course;
pub mod migrate;
pub mod stock;
pub mod student;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use coursehub_cache::{CacheManager, StockCounter};
use coursehub_core::config::AppConfig;
use coursehub_core::error::AppError;
use coursehub_database::{CourseRepository, DatabasePool};
use coursehub_service::StockService;

use crate::output::{self, OutputFormat};

/// CourseHub administration tool
#[derive(Debug, Parser)]
#[command(name = "coursehub", version, about, long_about = None)]
pub struct Cli {
    /// Configuration overlay to merge over `config/default.toml`
    #[arg(short, long, env = "COURSEHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Course inspection
    Course(course::CourseArgs),
    /// Student inspection
    Student(student::StudentArgs),
    /// Stock counter maintenance
    Stock(stock::StockArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Course(args) => course::execute(args, &config, self.format).await,
            Commands::Student(args) => student::execute(args, &config, self.format).await,
            Commands::Stock(args) => stock::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, &self.env, self.format),
        }
    }
}

/// Helper: open the database pool described by the configuration
pub async fn connect_database(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: stock service over the configured database and cache
pub async fn stock_service(config: &AppConfig) -> Result<StockService, AppError> {
    if config.cache.provider != "redis" {
        output::print_warning(
            "Cache provider is not redis; counters written by this process vanish when it exits",
        );
    }
    let pool = connect_database(config).await?;
    let cache = CacheManager::new(&config.cache).await?;
    let courses = Arc::new(CourseRepository::new(pool.pool().clone()));
    Ok(StockService::new(courses, StockCounter::new(cache)))
}

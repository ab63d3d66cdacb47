//! Board Order Backend
//!
//! Layered architecture:
//! - domain: Core entities, ordering types and errors
//! - repository: SQLite access and the positioning engine
//! - commands: Request handlers returning user-facing errors
//! - config: Paths and timeouts

pub mod config;
pub mod domain;
pub mod repository;
pub mod commands;

use config::AppConfig;
use repository::{init_db, BoardRepository, DbState, SectionRepository, TaskRepository, TxLimits};

/// Application state shared across commands
pub struct AppState {
    pub db_state: DbState,
    pub config: AppConfig,
    pub boards: BoardRepository,
    pub sections: SectionRepository,
    pub tasks: TaskRepository,
}

impl AppState {
    /// Wire the repositories over an initialized database
    pub fn new(config: AppConfig, db_state: DbState) -> Self {
        Self {
            boards: BoardRepository::new(db_state.clone()),
            sections: SectionRepository::new(db_state.clone()),
            tasks: TaskRepository::new(db_state.clone()),
            db_state,
            config,
        }
    }
}

/// Start logging, open the database and build the app state
pub async fn bootstrap(config: AppConfig) -> Result<AppState, String> {
    let log_path = rolling_logger::init_logger(&config.log_dir, &config.app_name)?;
    log::info!("Logging to {}", log_path.display());

    let db_state = init_db(&config.db_path, TxLimits::from_config(&config)).await?;
    log::info!(
        "Timeouts: busy {:?}, lock {:?}, transaction {:?}",
        config.busy_timeout(),
        config.lock_timeout(),
        config.transaction_timeout()
    );

    Ok(AppState::new(config, db_state))
}

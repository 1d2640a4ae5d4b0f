mod config;
pub mod database;
mod memory;

pub use config::{Config, PlannerConfig, ReportConfig};
pub use database::ActivityDb;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::activity::Activity;
use crate::error::StoreError;

/// Durable record set behind the planner.
///
/// Holds templates and standalone activities only, never materialized
/// instances. The planner treats `save` and `delete` as fire-and-forget: a
/// failure is logged and the in-memory state is kept.
pub trait ActivityStore {
    /// Every stored record, in insertion order.
    fn load_all(&self) -> Result<Vec<Activity>, StoreError>;

    /// Insert or replace the record with `activity.id`.
    fn save(&self, activity: &Activity) -> Result<(), StoreError>;

    /// Remove the record with `id`. Unknown ids are not an error.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

impl<T: ActivityStore + ?Sized> ActivityStore for &T {
    fn load_all(&self) -> Result<Vec<Activity>, StoreError> {
        (**self).load_all()
    }

    fn save(&self, activity: &Activity) -> Result<(), StoreError> {
        (**self).save(activity)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}

/// Returns `~/.config/planboard[-dev]/` based on PLANBOARD_ENV.
///
/// Set PLANBOARD_ENV=dev to use the development data directory, or
/// PLANBOARD_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("PLANBOARD_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("PLANBOARD_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("planboard-dev")
            } else {
                base_dir.join("planboard")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

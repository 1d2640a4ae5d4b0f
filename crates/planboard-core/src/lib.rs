//! # Planboard Core Library
//!
//! This library provides the core business logic for Planboard, a departmental
//! activity planner. Recurring activities are stored once, as templates, and
//! expanded into calendar instances on demand. All operations are available
//! through the standalone `planboard-cli` binary, which is a thin layer over
//! this crate.
//!
//! ## Architecture
//!
//! - **Recurrence**: pure expansion of templates into dated instances
//! - **Series**: SINGLE / FUTURE / ALL edits and deletes on recurring series
//! - **Storage**: SQLite activity storage and TOML-based configuration
//! - **Import / Report**: CSV bulk import and the monthly report
//!
//! ## Key Components
//!
//! - [`Planner`]: record set plus the series mutator
//! - [`expand`]: recurrence expander
//! - [`ActivityDb`]: activity persistence
//! - [`Config`]: application configuration management

pub mod activity;
pub mod error;
pub mod filter;
pub mod ids;
pub mod import;
pub mod recurrence;
pub mod report;
pub mod series;
pub mod storage;

pub use activity::{
    Activity, ActivityDraft, Board, RecurrenceConfig, RecurrenceFrequency, Status, UpdateMode,
};
pub use error::{ConfigError, CoreError, DateError, ReportError, StoreError, ValidationError};
pub use filter::{ActivityFilter, DateRange};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use recurrence::{expand, instance_id};
pub use report::{GeminiReportGenerator, ReportGenerator, ReportPeriod};
pub use series::{Mutation, Planner};
pub use storage::{ActivityDb, ActivityStore, Config, MemoryStore};

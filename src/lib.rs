pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use config::AppConfig;
pub use crate::core::{LabelAnalyzer, SafetyClassifier};
pub use domain::model::{AnalysisResult, MedicationInfo, SafetyLevel, SafetyVerdict};
pub use server::{create_router, run_server, AppState};
pub use utils::error::{MedGuardError, Result};

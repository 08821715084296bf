pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{CliConfig, LocalStorage};
pub use crate::config::toml_config::TomlConfig;

pub use crate::adapters::openai::OpenAiOracle;
pub use crate::core::{
    oracle_client::{AreaCodeCache, AreaCodeOracleClient},
    planner::{NumberPlanner, PlanReport, PlanRequest},
    postal_code::{PostalCodeInput, PostalCodeParser},
    resolver::{AreaCodeResolver, TargetPlan, TargetSource},
    selector::{CandidateSelector, SelectionCriteria},
};
pub use crate::domain::model::{
    AreaCode, Capability, PhoneCandidate, PostalAreaCodeMap, PostalCode, ResolutionResult,
    SelectionOutcome, SelectionReason,
};
pub use crate::utils::error::{PickerError, Result};

pub mod oracle_client;
pub mod planner;
pub mod postal_code;
pub mod reply;
pub mod resolver;
pub mod selector;

pub use crate::domain::model::{
    AreaCode, PhoneCandidate, PostalAreaCodeMap, PostalCode, ResolutionResult, SelectionOutcome,
    SelectionReason,
};
pub use crate::domain::ports::{AreaCodeOracle, ConfigProvider, OracleRequest, Storage};
pub use crate::utils::error::Result;

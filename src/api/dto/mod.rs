//! Data Transfer Objects for REST request/response serialization.
//!
//! Decimal ratios are serialized as JSON strings with two decimal places
//! (`"70.00"`) so clients never see binary floating-point artefacts.

pub mod common_dto;
pub mod player_dto;

pub use common_dto::*;
pub use player_dto::*;

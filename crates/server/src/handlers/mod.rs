//! # API Route Handlers

pub mod analyze;
pub mod general;

pub use analyze::*;
pub use general::*;

use super::{
    errors::AppError,
    state::AppState,
    types::{AnalyzeRequest, AnalyzeResponse},
};

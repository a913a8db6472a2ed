/// Backend API module
///
/// This module owns everything that talks to the analysis backend:
/// - HTTP client and error mapping (client.rs)
/// - Response payload types (models.rs)

pub mod client;
pub mod models;

pub use client::{AnalysisClient, Error};
pub use models::AnalysisResponse;

// Adobe User Management API client
// IMS token lifecycle management and authenticated call dispatch

pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub use auth::{AuthFlow, TokenManager};
pub use client::{ApiResponse, UmapiClient, UserLookup};
pub use config::{EndpointConfig, ServiceIdentity};
pub use error::{ApiFailure, Error, Result};

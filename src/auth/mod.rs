// Authentication module
// Claim signing, IMS round-trips, and the cached-token lifecycle

mod claims;
mod manager;
mod types;

pub use manager::TokenManager;
pub use types::AuthFlow;

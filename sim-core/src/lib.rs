//! Core data model for the contract simulator
//!
//! This crate provides the types shared between the simulator and the
//! standalone VM runner it drives:
//! - Scalar types (Balance, Gas, StorageUsage, etc.)
//! - Execution context, receipts, and outcomes
//! - State blob encoding and signer key derivation

pub mod context;
pub mod error;
pub mod keys;
pub mod outcome;
pub mod receipt;
pub mod serialize;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use context::*;
pub use error::*;
pub use keys::*;
pub use outcome::*;
pub use receipt::*;
pub use state::*;
pub use types::*;

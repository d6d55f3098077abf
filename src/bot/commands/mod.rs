//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Customer management commands
pub mod customer;

/// Dashboard summary command
pub mod dashboard;

/// General utility commands
pub mod general;

/// Service order commands, including finalization
pub mod order;

/// Parts inventory commands
pub mod part;

/// Revenue report command
pub mod revenue;

/// Vehicle management commands
pub mod vehicle;

// Export commands
pub use customer::*;
pub use dashboard::*;
pub use general::*;
pub use order::*;
pub use part::*;
pub use revenue::*;
pub use vehicle::*;

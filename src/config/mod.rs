//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → one BreakerConfig per protected dependency
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - Breaker thresholds have no defaults; observability settings do
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{BreakerConfig, GuardConfig, LogFormat, ObservabilityConfig};
pub use validation::ValidationError;

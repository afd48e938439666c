//! # Utility Modules
//!
//! Constants, configuration, and small helpers shared across the engine.
//!
//! ## Available Utilities
//!
//! - **Config** (`config`) - Environment-driven runtime configuration
//! - **Constants** (`constant`) - Scoring weights, trust and points policy values
//! - **Secret** (`secret`) - Secret loading from files or env variables
//! - **Telemetry** (`telemetry`) - Tracing subscriber setup
//! - **Validators** (`validator`) - Custom request field validators

pub mod config;
pub mod constant;
pub mod secret;
pub mod telemetry;
pub mod validator;

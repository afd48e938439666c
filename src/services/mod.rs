//! # Business Logic Services
//!
//! Services hold the engine's rules and talk to persistence only through
//! [`Store`](crate::store::Store). HTTP handlers are thin wrappers around them.
//!
//! ## Available Services
//!
//! - **Recommendation** (`recommendation`) - Trust-aware scoring and ranking
//! - **Booking** (`booking`) - Booking creation and status transitions
//! - **Escrow** (`escrow`) - Payment custody and release to payouts
//! - **Trust** (`trust`) - Review intake and trust score adjustment
//! - **Points** (`points`) - Loyalty points ledger
//! - **Preference** (`preference`) - Quiz intake
//! - **JWT** (`jwt`) - Bearer token validation

pub mod booking;
pub mod escrow;
pub mod jwt;
pub mod points;
pub mod preference;
pub mod recommendation;
pub mod trust;

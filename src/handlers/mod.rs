//! # HTTP Request Handlers
//!
//! Thin axum wrappers around [`services`](crate::services). Every successful
//! response is a JSON object carrying `"success": true` next to the payload;
//! failures are rendered by [`AppError`](crate::error::AppError).
//!
//! ## Available Handlers
//!
//! - **Health Check** (`health_check`) - Application health monitoring
//! - **Preference** (`preference`) - Quiz submission and retrieval
//! - **Recommendation** (`recommendation`) - Ranked services for the caller
//! - **Booking** (`booking`) - Booking lifecycle
//! - **Payment** (`payment`) - Escrow creation, query and release
//! - **Review** (`review`) - Feedback and trust adjustment
//! - **Merchant** (`merchant`) - Trust score lookup
//! - **Points** (`points`) - Loyalty balance and history

mod booking;
mod extract;
mod health_check;
mod merchant;
mod payment;
mod points;
mod preference;
mod recommendation;
mod review;

pub use booking::*;
pub use extract::{ApiJson, ApiPath};
pub use health_check::*;
pub use merchant::*;
pub use payment::*;
pub use points::*;
pub use preference::*;
pub use recommendation::*;
pub use review::*;

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

pub(crate) fn success<T: Serialize>(data: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        data,
    })
}

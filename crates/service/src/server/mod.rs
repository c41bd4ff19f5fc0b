//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Validate requests and translate them into [`crate::crypto`] calls.
//! - Map every failure to a structured [`common::protocol::ErrorResponse`].

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

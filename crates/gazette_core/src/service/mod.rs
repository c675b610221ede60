//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate forms and repositories into use-case level APIs.
//! - Keep the HTTP layer decoupled from storage details.
//!
//! # Invariants
//! - Ownership checks happen through requester-scoped repository lookups
//!   before any form is validated.

pub mod auth_service;
pub mod news_service;
pub mod note_service;

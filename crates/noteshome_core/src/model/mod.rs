//! Validated domain entities shared by stores and services.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Enforce entity-level invariants at construction and before persistence.
//!
//! # Invariants
//! - Identity (`id`) is assigned by the store; `None` marks an unpersisted
//!   entity.
//! - Hydrated entities never carry credential material.

pub mod note;
pub mod user;

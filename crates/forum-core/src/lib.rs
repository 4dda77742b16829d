//! # forum-core
//!
//! Core types and error types for the forum.
//!
//! This crate provides the foundational types shared across all forum crates:
//! - Entity structs for the stored records (users, questions, answers, comments, votes)
//! - Enums for vote targets, vote directions, and reply kinds
//! - Validated input types that reject bad text before it reaches a service
//! - Cross-cutting error types
//! - Page and detail response shapes returned by the list/detail queries

pub mod entities;
pub mod enums;
pub mod errors;
pub mod input;
pub mod responses;

//! Business logic and repository trait definitions for the Nebula support chat.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the conversation lifecycle manager and the
//! rule-based responder engine. It depends only on `nebula-types` -- never on
//! `nebula-infra` or any database/IO crate.

pub mod chat;

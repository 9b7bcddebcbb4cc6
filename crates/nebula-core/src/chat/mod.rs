//! Support chat domain logic: persistence ports, session lifecycle,
//! and the rule-based responder.

pub mod lifecycle;
pub mod repository;
pub mod responder;

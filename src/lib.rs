//! User Events - User activity events over a partitioned pub/sub channel
//!
//! This crate models a user activity event in two representations, an
//! immutable `UserEvent` and a mutable `UserEventDraft`, and moves both over
//! a partitioned message channel as camelCase JSON.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

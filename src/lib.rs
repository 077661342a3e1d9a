//! Laurel: the student achievement lifecycle engine.
//!
//! Achievement content lives in a document store and its approval workflow in
//! a relational store. [`lifecycle::LifecycleEngine`] keeps the two in
//! agreement, gates every transition on ownership or advisorship, and scores
//! content deterministically.

pub mod authz;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod lifecycle;
pub mod scoring;
pub mod stats;
pub mod store;
pub mod ui;

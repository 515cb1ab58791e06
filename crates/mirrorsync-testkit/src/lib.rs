//! # mirrorsync Testkit
//!
//! Testing utilities for mirrorsync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Scenario vectors**: Chained producer runs with known deltas and history
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Scripted and shared sources, a failure-injecting transport,
//!   keyed elements with a matching differentiator
//!
//! ## Scenario Vectors
//!
//! ```rust,no_run
//! use mirrorsync_testkit::vectors::{all_scenarios, replay};
//!
//! async fn check() {
//!     for vector in all_scenarios() {
//!         let (deltas, retained) = replay(&vector).await.unwrap();
//!         println!("{}: {} deltas, history {:?}", vector.name, deltas.len(), retained);
//!     }
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use mirrorsync_testkit::generators::collection_sequence;
//!
//! proptest! {
//!     #[test]
//!     fn mirror_converges(states in collection_sequence(8, 16)) {
//!         // drive a producer through `states` and sync a consumer after each
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{by_id, churn, FlakyTransport, KeyedItem, ScriptedSource, SharedSource};

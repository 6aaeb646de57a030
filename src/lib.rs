//! # Trivia Session Engine
//!
//! This library implements the lifecycle and scoring engine for live,
//! multi-player trivia sessions. A session advances through timed phases
//! (lobby, question countdown, open answering, answer reveal, final results)
//! driven by owner actions and autonomous single-shot timers, while
//! concurrently accepting player joins and answer submissions, and produces
//! deterministic per-question and per-session scores and rankings.
//!
//! The engine is pure in-memory logic: it owns no threads and no clock
//! callbacks. Embeddings supply a scheduler closure for delayed alarms and
//! deliver expiries back through [`store::SessionStore::handle_alarm`];
//! stale alarms are recognized by token and swallowed as no-ops.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

pub mod constants;
pub mod error;
pub mod ledger;
pub mod names;
pub mod player;
pub mod quiz;
pub mod results;
pub mod scoring;
pub mod session;
pub mod session_id;
pub mod store;
pub mod timer;

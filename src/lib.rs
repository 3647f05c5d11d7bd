//! Huntr - a progressive short-domain availability hunter
//!
//! Huntr walks the keyspace of short domain names in priority order, probes
//! several independently noisy availability signals (DNS, WHOIS, registrar
//! endpoints), and folds them into a conservative consensus verdict. Search
//! progress is checkpointed after every candidate so a restart resumes
//! exactly where the previous run stopped.

pub mod classify;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod generator;
pub mod guard;
pub mod notify;
pub mod pacing;
pub mod probes;
pub mod runner;
pub mod store;

pub use error::{HuntError, Result};

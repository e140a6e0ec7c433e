//! Seed-driven DJ playlist building: feature extraction, harmonic key
//! compatibility, transition scoring, greedy sequencing and energy analysis.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod energy;
pub mod features;
pub mod keys;
pub mod report;
pub mod scoring;
pub mod sequencer;
pub mod types;

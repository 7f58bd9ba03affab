//! PONGEVO Core - Chromosomes and the match simulator
//!
//! This crate provides the core model for PONGEVO:
//! - Chromosome genotype, named traits and match statistics
//! - Deterministic display names derived from genes
//! - Fixed-timestep Pong physics (ball, two paddles)
//! - Trait-driven paddle AI with trajectory prediction

pub mod chromosome;
pub mod naming;
pub mod config;
pub mod game;
pub mod ai;

// Re-exports for convenient access
pub use chromosome::{Chromosome, ChromosomeSnapshot, Gene, Genes, Traits, NUM_GENES, gene_floor};
pub use naming::derive_name;
pub use config::SimConfig;
pub use game::{Ball, Paddle, PongGame, Side, MatchOutcome, GameSnapshot};
pub use ai::fold_into_court;

//! Scoring & Ranking: weighted scores, per-CV outcomes, batch ranking and reports.

pub mod engine;
pub mod export;
pub mod handlers;
pub mod orchestrator;
pub mod outcome;
pub mod report;
pub mod weights;


//! cellwise_engine - formula parsing/evaluation and dependency tracking.

pub mod engine;

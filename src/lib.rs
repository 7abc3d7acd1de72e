pub mod access;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod executor;
pub mod expression;
pub mod optimizer;
pub mod planner;
pub mod sql;

pub mod config;
pub mod error;
pub mod ledger;
pub mod optimizer;
pub mod output;
pub mod rules;
pub mod scheduler;
pub mod solver;
pub mod types;

// Library crate: the editing core plus the headless harness and command
// protocol used by integration tests and the `sculpt` script runner.

pub mod command;
pub mod controller;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod harness;
pub mod ops;
pub mod persistence;
pub mod ports;
pub mod replay;
pub mod state;
pub mod validation;
pub mod viewport;

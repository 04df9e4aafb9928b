#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::ignored_unit_patterns
)]

pub mod action;
pub mod animator;
pub mod config;
pub mod daemon;
pub mod device;
pub mod error;
pub mod event;
pub mod http;
pub mod machine;
pub mod notify;
pub mod remote;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

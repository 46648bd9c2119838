//! Reusable view components.

pub mod network;

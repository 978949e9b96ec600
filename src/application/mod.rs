//! Application layer - Pipeline services and the ports they depend on

pub mod ports;
pub mod services;

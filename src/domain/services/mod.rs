//! Domain services - Pure classification logic

pub mod classification;

//! Atmoscatter - interactive Rayleigh + Mie atmospheric scattering

pub mod core;
pub mod atmosphere;
pub mod render;
pub mod app;
pub mod ui;

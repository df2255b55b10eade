//! Polymarket API clients

pub mod gamma;

pub use gamma::GammaClient;

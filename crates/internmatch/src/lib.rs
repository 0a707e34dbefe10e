pub mod ats;
pub mod config;
pub mod error;
pub mod telemetry;

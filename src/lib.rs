//! Soil-fertility decision engine.
//!
//! Turns a soil analysis into a multi-year liming schedule and an annual
//! P₂O₅/K₂O/MgO/S recommendation. Every entry point is a pure function of
//! its inputs and an explicit [`config::EngineConfig`].

pub mod config;
pub mod document;
pub mod error;
pub mod logic;
pub mod models;

pub use crate::config::{AppConfig, EngineConfig};
pub use crate::document::InputDocument;
pub use crate::error::{FertiPlanError, Result};

//! Air-quality data normalization and analytics.
//!
//! Raw CSV/JSON rows flow through [`parser`] and [`normalize`] into a
//! [`series::SampleSeries`], which [`analytics`] summarizes and [`view`]
//! assembles for presentation. [`loader`] drives the whole pipeline for a
//! selected location.

pub mod analytics;
pub mod aqi;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod prediction;
pub mod sample;
pub mod series;
pub mod source;
pub mod view;

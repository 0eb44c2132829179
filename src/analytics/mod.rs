//! Descriptive statistics, correlation and coverage over a [`SampleSeries`].
//!
//! Everything here is a pure function of its input. Empty input never
//! panics; each function documents the sentinel it returns instead.
//!
//! [`SampleSeries`]: crate::series::SampleSeries

pub mod correlation;
pub mod coverage;
pub mod summary;
pub mod utility;

//! Location loading with last-request-wins supersession.
//!
//! Each call to [`LocationLoader::load`] takes a new generation number. A
//! load whose generation is no longer the newest when it finishes returns
//! [`LoadOutcome::Superseded`] instead of its (stale) view model.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, warn};

use crate::analytics::summary::{StatisticsSummary, SummaryOptions};
use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::normalize::SourceProfile;
use crate::parser::parse_json;
use crate::series::ingest;
use crate::source::AirQualitySource;
use crate::view::ViewModel;

#[derive(Debug)]
pub enum LoadOutcome {
    Current(ViewModel),
    /// A newer load started before this one finished.
    Superseded { location: String },
}

impl LoadOutcome {
    pub fn into_current(self) -> Option<ViewModel> {
        match self {
            LoadOutcome::Current(view) => Some(view),
            LoadOutcome::Superseded { .. } => None,
        }
    }
}

pub struct LocationLoader<S> {
    source: S,
    config: LoaderConfig,
    profile: SourceProfile,
    generation: AtomicU64,
}

impl<S: AirQualitySource> LocationLoader<S> {
    pub fn new(source: S, config: LoaderConfig) -> Self {
        let profile = SourceProfile::api().with_missing_policy(config.missing_policy);
        Self {
            source,
            config,
            profile,
            generation: AtomicU64::new(0),
        }
    }

    /// Replaces the profile used to normalize fetched history.
    pub fn with_profile(mut self, profile: SourceProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Loads history and prediction for `location` and assembles a view model.
    ///
    /// A failed prediction fetch degrades to no prediction. The load fails
    /// only if history cannot be fetched or parsed, or yields no valid samples.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, location: &str) -> Result<LoadOutcome, LoadError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let city = self.config.city_names.map(location);
        info!(%city, ticket, "Loading location");

        let (history, prediction) =
            tokio::join!(self.source.history(&city), self.source.prediction(&city));

        if self.is_stale(ticket) {
            info!(%city, ticket, "Discarding superseded load");
            return Ok(LoadOutcome::Superseded {
                location: location.to_string(),
            });
        }

        let prediction = match prediction {
            Ok(p) => {
                for d in p.aqi_disagreements() {
                    warn!(
                        field = d.field,
                        supplied = d.supplied,
                        canonical = d.canonical,
                        "Prediction AQI disagrees with breakpoint formula"
                    );
                }
                Some(p)
            }
            Err(e) => {
                warn!(%city, error = %e, "Prediction unavailable, continuing with history only");
                None
            }
        };

        let parsed = parse_json(&history.map_err(LoadError::Fetch)?)?;
        let (series, report) = ingest(parsed, &self.profile);

        if series.is_empty() {
            return Err(LoadError::NoValidSamples {
                location: location.to_string(),
                malformed_rows: report.malformed_rows,
                malformed_samples: report.malformed_samples,
            });
        }
        if report.skipped() > 0 {
            warn!(
                malformed_rows = report.malformed_rows,
                malformed_samples = report.malformed_samples,
                "Some records were skipped"
            );
        }

        let options = SummaryOptions {
            expected_hours: self.config.expected_hours,
            ..SummaryOptions::default()
        };
        let statistics = StatisticsSummary::compute(&series, &options);

        info!(
            %city,
            samples = series.len(),
            coverage = statistics.coverage_percent,
            has_prediction = prediction.is_some(),
            "Location loaded"
        );
        Ok(LoadOutcome::Current(ViewModel::assemble(
            series, statistics, prediction, report,
        )))
    }

    fn is_stale(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket
    }
}

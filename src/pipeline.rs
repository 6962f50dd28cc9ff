//! Pipeline - simulate, encode both signals, score the match
//!
//! ```text
//! FieldConfig ─▶ Integrator ─▶ probe time series ─▶ encoder (field policy)    ─┐
//!                                                                              ├─▶ compare
//! SpectrumProvider ─▶ spectrum values ───────────▶ encoder (spectrum policy) ─┘
//! ```

use crate::compare::{compare, MatchScore};
use crate::config::FieldConfig;
use crate::error::{FieldError, Result};
use crate::field::{fluctuation, FieldGrid};
use crate::integrator::Integrator;
use crate::spectrum::{Spectrum, SpectrumProvider};
use crate::symbol::{Symbol, SymbolEncoder, ThresholdPolicy};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a full comparison run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// Field integration parameters.
    pub field: FieldConfig,

    /// Spatial point whose time series is encoded. `None` = grid centre.
    pub probe: Option<(usize, usize, usize)>,

    /// Cutoffs for the simulated time series.
    pub field_policy: ThresholdPolicy,

    /// Cutoffs for the observed spectrum.
    pub spectrum_policy: ThresholdPolicy,
}

impl PipelineConfig {
    pub fn new(field: FieldConfig) -> Self {
        Self {
            field,
            ..Self::default()
        }
    }

    pub fn with_probe(mut self, x: usize, y: usize, z: usize) -> Self {
        self.probe = Some((x, y, z));
        self
    }

    pub fn with_policies(mut self, field: ThresholdPolicy, spectrum: ThresholdPolicy) -> Self {
        self.field_policy = field;
        self.spectrum_policy = spectrum;
        self
    }

    /// Probe point, resolved against the grid extents.
    pub fn probe_point(&self) -> (usize, usize, usize) {
        self.probe.unwrap_or_else(|| self.field.extents.center())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.field.validate()?;
        self.field_policy.validate()?;
        self.spectrum_policy.validate()?;

        let (x, y, z) = self.probe_point();
        if !self.field.extents.contains_point(x, y, z) {
            return Err(FieldError::Configuration(format!(
                "probe ({x}, {y}, {z}) outside grid {:?}",
                self.field.extents.shape()
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            probe: None,
            field_policy: ThresholdPolicy::field(),
            spectrum_policy: ThresholdPolicy::spectrum(),
        }
    }
}

/// Everything a presentation layer needs to render one comparison.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparisonReport {
    /// Spatial point the series was taken from.
    pub probe: (usize, usize, usize),

    /// Field values over time at the probe.
    pub series: Vec<f64>,

    /// Population standard deviation of `series`.
    pub fluctuation: f64,

    /// Symbols of the simulated series.
    pub simulated: Vec<Symbol>,

    /// Observed curve that was encoded.
    pub spectrum: Spectrum,

    /// Symbols of the observed curve.
    pub observed: Vec<Symbol>,

    /// Agreement between `observed` and `simulated`.
    pub score: MatchScore,
}

/// Simulates a field and scores it against an injected spectrum source.
pub struct Pipeline<P> {
    config: PipelineConfig,
    integrator: Integrator,
    field_encoder: SymbolEncoder,
    spectrum_encoder: SymbolEncoder,
    provider: P,
}

impl<P: SpectrumProvider> Pipeline<P> {
    /// Create a pipeline. Fails fast on invalid configuration.
    pub fn new(config: PipelineConfig, provider: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            integrator: Integrator::new(config.field.clone())?,
            field_encoder: SymbolEncoder::new(config.field_policy)?,
            spectrum_encoder: SymbolEncoder::new(config.spectrum_policy)?,
            config,
            provider,
        })
    }

    /// Get configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the integrator only.
    pub fn simulate(&self) -> Result<FieldGrid> {
        self.integrator.run()
    }

    /// Simulate and compare.
    pub fn run(&self) -> Result<ComparisonReport> {
        let grid = self.simulate()?;
        self.compare_grid(&grid)
    }

    /// Compare an already simulated grid against the provider's spectrum.
    pub fn compare_grid(&self, grid: &FieldGrid) -> Result<ComparisonReport> {
        let probe = self.config.probe_point();
        let (x, y, z) = probe;
        let series = grid.time_series(x, y, z)?;
        let simulated = self.field_encoder.encode(&series)?;

        let spectrum = self.provider.load()?;
        let observed = self.spectrum_encoder.encode(spectrum.values())?;
        debug!(
            series_len = series.len(),
            spectrum_len = spectrum.len(),
            "encoded both sequences"
        );

        let score = compare(&observed, &simulated);
        let fluctuation = fluctuation(&series);
        info!(
            score = score.value(),
            compared = score.compared,
            matched = score.matched,
            fluctuation,
            "comparison complete"
        );

        Ok(ComparisonReport {
            probe,
            series,
            fluctuation,
            simulated,
            spectrum,
            observed,
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Extents;
    use crate::spectrum::{FallbackProvider, FnProvider, SyntheticSpectrum};

    fn small_config() -> PipelineConfig {
        PipelineConfig::new(FieldConfig::new(Extents::new(12, 5, 5, 5)).with_seed(42))
    }

    #[test]
    fn test_default_probe_is_centre() {
        let config = PipelineConfig::default();
        assert_eq!(config.probe_point(), (7, 7, 7));
    }

    #[test]
    fn test_probe_outside_grid_rejected() {
        let config = small_config().with_probe(5, 0, 0);
        let result = Pipeline::new(config, SyntheticSpectrum::default());
        assert!(matches!(result, Err(FieldError::Configuration(_))));
    }

    #[test]
    fn test_run_reports_both_sequences() {
        let pipeline = Pipeline::new(small_config(), SyntheticSpectrum::default()).unwrap();
        let report = pipeline.run().unwrap();

        assert_eq!(report.probe, (2, 2, 2));
        assert_eq!(report.series.len(), 12);
        assert_eq!(report.simulated.len(), 12);
        assert_eq!(report.observed.len(), 100);
        assert_eq!(report.spectrum.len(), 100);

        let score = report.score.value();
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(report.score, compare(&report.observed, &report.simulated));
    }

    #[test]
    fn test_zero_field_scores_sentinel() {
        let config = PipelineConfig::new(
            FieldConfig::new(Extents::new(8, 5, 5, 5)).with_fluctuation(0.0),
        );
        let pipeline = Pipeline::new(config, SyntheticSpectrum::default()).unwrap();
        let report = pipeline.run().unwrap();

        assert!(report.simulated.iter().all(|&s| s == Symbol::Flat));
        assert_eq!(report.fluctuation, 0.0);
        assert!(report.score.is_empty());
        assert_eq!(report.score.value(), 0.0);
    }

    #[test]
    fn test_compare_grid_matches_hand_built_series() {
        let extents = Extents::new(6, 3, 3, 3);
        let mut grid = FieldGrid::zeros(extents);
        for (t, v) in [0.0, 1.0, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
            grid.set(t, 1, 1, 1, v);
        }

        let provider = FnProvider(|| Spectrum::new(vec![0.0; 6], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]));
        let config = PipelineConfig::new(FieldConfig::new(extents))
            .with_policies(ThresholdPolicy::scaled(0.5), ThresholdPolicy::scaled(0.5));
        let pipeline = Pipeline::new(config, provider).unwrap();

        let report = pipeline.compare_grid(&grid).unwrap();
        assert_eq!(report.simulated, vec![Symbol::Rising; 6]);
        assert_eq!(report.score.value(), 1.0);
        assert_eq!(report.score.compared, 6);
    }

    #[test]
    fn test_failing_provider_surfaces_error() {
        let provider = FnProvider(|| Err(FieldError::SpectrumUnavailable("offline".into())));
        let pipeline = Pipeline::new(small_config(), provider).unwrap();
        assert!(matches!(
            pipeline.run(),
            Err(FieldError::SpectrumUnavailable(_))
        ));
    }

    #[test]
    fn test_fallback_provider_keeps_pipeline_running() {
        let provider = FallbackProvider::new(FnProvider(|| {
            Err(FieldError::SpectrumUnavailable("offline".into()))
        }));
        let pipeline = Pipeline::new(small_config(), provider).unwrap();
        let report = pipeline.run().unwrap();

        assert_eq!(report.spectrum, SyntheticSpectrum::default().curve().unwrap());
    }

    #[test]
    fn test_divergence_propagates() {
        let config = PipelineConfig::new(FieldConfig::driven().with_seed(1));
        let pipeline = Pipeline::new(config, SyntheticSpectrum::default()).unwrap();
        assert!(matches!(
            pipeline.run(),
            Err(FieldError::NumericDivergence { .. })
        ));
    }
}

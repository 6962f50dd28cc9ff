//! Spectrum providers - where observed power-spectrum curves come from
//!
//! The core never fetches or caches anything itself. A [`SpectrumProvider`]
//! is injected into the pipeline; [`FallbackProvider`] guarantees a usable
//! curve by substituting [`SyntheticSpectrum`] when the primary source fails.

use crate::error::{FieldError, Result};
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A power-spectrum curve: index axis (multipole) and value axis (power).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spectrum {
    index: Vec<f64>,
    values: Vec<f64>,
}

impl Spectrum {
    /// Create a spectrum. Axes must be non-empty and of equal length.
    pub fn new(index: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(FieldError::InvalidSpectrum("empty curve".into()));
        }
        if index.len() != values.len() {
            return Err(FieldError::InvalidSpectrum(format!(
                "index has {} points, values has {}",
                index.len(),
                values.len()
            )));
        }
        Ok(Self { index, values })
    }

    /// Index axis.
    pub fn index(&self) -> &[f64] {
        &self.index
    }

    /// Value axis.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed spectrum.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Source of observed spectrum curves.
pub trait SpectrumProvider {
    /// Load a curve.
    fn load(&self) -> Result<Spectrum>;
}

/// Function-based provider for simple cases
pub struct FnProvider<F: Fn() -> Result<Spectrum>>(pub F);

impl<F: Fn() -> Result<Spectrum>> SpectrumProvider for FnProvider<F> {
    fn load(&self) -> Result<Spectrum> {
        (self.0)()
    }
}

/// Deterministic synthetic curve: `exp(−ℓ/1000) + 0.1·sin(ℓ/200)` sampled
/// at evenly spaced ℓ.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyntheticSpectrum {
    /// Number of samples.
    pub points: usize,

    /// First multipole.
    pub start: f64,

    /// Last multipole (inclusive).
    pub end: f64,
}

impl SyntheticSpectrum {
    pub fn new(points: usize, start: f64, end: f64) -> Self {
        Self { points, start, end }
    }

    /// Build the curve.
    pub fn curve(&self) -> Result<Spectrum> {
        if self.points == 0 || !self.start.is_finite() || !self.end.is_finite() {
            return Err(FieldError::Configuration(format!(
                "synthetic spectrum needs points > 0 and a finite range, got {self:?}"
            )));
        }

        let index = linspace(self.start, self.end, self.points);
        let values = index
            .iter()
            .map(|&ell| (-ell / 1000.0).exp() + 0.1 * (ell / 200.0).sin())
            .collect();
        Spectrum::new(index, values)
    }
}

impl Default for SyntheticSpectrum {
    fn default() -> Self {
        Self::new(100, 2.0, 2500.0)
    }
}

impl SpectrumProvider for SyntheticSpectrum {
    fn load(&self) -> Result<Spectrum> {
        self.curve()
    }
}

/// Provider that never leaves the caller without a curve.
///
/// Any error from `primary` is logged and replaced by the synthetic curve.
pub struct FallbackProvider<P> {
    primary: P,
    fallback: SyntheticSpectrum,
}

impl<P: SpectrumProvider> FallbackProvider<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: SyntheticSpectrum::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: SyntheticSpectrum) -> Self {
        self.fallback = fallback;
        self
    }
}

impl<P: SpectrumProvider> SpectrumProvider for FallbackProvider<P> {
    fn load(&self) -> Result<Spectrum> {
        match self.primary.load() {
            Ok(spectrum) => Ok(spectrum),
            Err(err) => {
                warn!(error = %err, "spectrum source failed, using synthetic curve");
                self.fallback.curve()
            }
        }
    }
}

/// `n` evenly spaced points over [start, end], endpoints included.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i + 1 == n { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_validation() {
        assert!(Spectrum::new(vec![1.0, 2.0], vec![0.5, 0.4]).is_ok());
        assert!(matches!(
            Spectrum::new(vec![], vec![]),
            Err(FieldError::InvalidSpectrum(_))
        ));
        assert!(matches!(
            Spectrum::new(vec![1.0], vec![0.5, 0.4]),
            Err(FieldError::InvalidSpectrum(_))
        ));
    }

    #[test]
    fn test_synthetic_default_curve() {
        let s = SyntheticSpectrum::default().load().unwrap();

        assert_eq!(s.len(), 100);
        assert_eq!(s.index()[0], 2.0);
        assert_eq!(s.index()[99], 2500.0);

        let ell = 2.0f64;
        let expected = (-ell / 1000.0).exp() + 0.1 * (ell / 200.0).sin();
        assert!((s.values()[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let a = SyntheticSpectrum::default().curve().unwrap();
        let b = SyntheticSpectrum::default().curve().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_synthetic_rejects_zero_points() {
        assert!(SyntheticSpectrum::new(0, 2.0, 2500.0).curve().is_err());
    }

    #[test]
    fn test_fn_provider() {
        let provider = FnProvider(|| Spectrum::new(vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]));
        assert_eq!(provider.load().unwrap().values(), &[3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_fallback_on_failure() {
        let failing = FnProvider(|| Err(FieldError::SpectrumUnavailable("offline".into())));
        let provider = FallbackProvider::new(failing);

        let s = provider.load().unwrap();
        assert_eq!(s, SyntheticSpectrum::default().curve().unwrap());
    }

    #[test]
    fn test_fallback_passes_primary_through() {
        let primary = FnProvider(|| Spectrum::new(vec![10.0], vec![0.25]));
        let provider = FallbackProvider::new(primary).with_fallback(SyntheticSpectrum::new(5, 0.0, 1.0));

        assert_eq!(provider.load().unwrap().values(), &[0.25]);
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }
}

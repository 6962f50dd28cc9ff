//! Symbol Encoder - trend classification of 1D sequences
//!
//! Each sample is classified from the discrete gradient and curvature of
//! the whole sequence. Curvature always wins: a sample whose curvature
//! crosses its threshold is a [`Symbol::Discontinuity`] no matter the slope.

use crate::error::{FieldError, Result};
use crate::field::fluctuation;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trend classification at one index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Symbol {
    Rising,
    Falling,
    Discontinuity,
    /// No significant trend.
    Flat,
}

impl Symbol {
    /// Whether this symbol carries a trend (anything but [`Symbol::Flat`]).
    #[inline]
    pub fn is_trend(self) -> bool {
        self != Symbol::Flat
    }

    /// Display glyph.
    pub fn glyph(self) -> &'static str {
        match self {
            Symbol::Rising => "τ↑",
            Symbol::Falling => "τ↓",
            Symbol::Discontinuity => "δτ⨉",
            Symbol::Flat => "·",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Render a symbol sequence as space-separated glyphs.
pub fn render(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| s.glyph())
        .collect::<Vec<_>>()
        .join(" ")
}

/// How classification cutoffs are chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ThresholdPolicy {
    /// Literal cutoffs.
    Fixed { gradient: f64, curvature: f64 },

    /// Cutoffs scaled by the standard deviation of the input's own
    /// gradient and curvature sequences.
    Adaptive {
        gradient_scale: f64,
        curvature_scale: f64,
    },
}

impl ThresholdPolicy {
    /// Fixed cutoffs with the curvature cutoff at ten times the gradient one.
    pub fn scaled(threshold: f64) -> Self {
        ThresholdPolicy::Fixed {
            gradient: threshold,
            curvature: threshold * 10.0,
        }
    }

    /// Cutoffs for simulated field time series.
    pub fn field() -> Self {
        Self::scaled(1e-5)
    }

    /// Cutoffs for observed spectrum curves.
    pub fn spectrum() -> Self {
        ThresholdPolicy::Adaptive {
            gradient_scale: 0.5,
            curvature_scale: 0.5,
        }
    }

    /// Validate policy parameters.
    pub fn validate(&self) -> Result<()> {
        let (a, b) = match *self {
            ThresholdPolicy::Fixed {
                gradient,
                curvature,
            } => (gradient, curvature),
            ThresholdPolicy::Adaptive {
                gradient_scale,
                curvature_scale,
            } => (gradient_scale, curvature_scale),
        };
        if !(a.is_finite() && a >= 0.0 && b.is_finite() && b >= 0.0) {
            return Err(FieldError::Configuration(format!(
                "thresholds must be finite and >= 0, got {self:?}"
            )));
        }
        Ok(())
    }

    /// Resolve to (gradient, curvature) cutoffs for the given sequences.
    fn resolve(&self, gradient: &[f64], curvature: &[f64]) -> (f64, f64) {
        match *self {
            ThresholdPolicy::Fixed {
                gradient,
                curvature,
            } => (gradient, curvature),
            ThresholdPolicy::Adaptive {
                gradient_scale,
                curvature_scale,
            } => (
                gradient_scale * fluctuation(gradient),
                curvature_scale * fluctuation(curvature),
            ),
        }
    }
}

/// Encodes sequences under one threshold policy.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SymbolEncoder {
    policy: ThresholdPolicy,
}

impl SymbolEncoder {
    /// Create an encoder. Rejects negative or non-finite cutoffs.
    pub fn new(policy: ThresholdPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Get policy.
    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    /// Classify every sample. Output has the same length as the input.
    pub fn encode(&self, samples: &[f64]) -> Result<Vec<Symbol>> {
        if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
            return Err(FieldError::NonFiniteSample { index });
        }

        let grad = gradient(samples);
        let curv = gradient(&grad);
        let (grad_cut, curv_cut) = self.policy.resolve(&grad, &curv);

        Ok(grad
            .iter()
            .zip(&curv)
            .map(|(&g, &c)| classify(g, c, grad_cut, curv_cut))
            .collect())
    }
}

#[inline]
fn classify(gradient: f64, curvature: f64, grad_cut: f64, curv_cut: f64) -> Symbol {
    if curvature.abs() > curv_cut {
        Symbol::Discontinuity
    } else if gradient > grad_cut {
        Symbol::Rising
    } else if gradient < -grad_cut {
        Symbol::Falling
    } else {
        Symbol::Flat
    }
}

/// Discrete gradient with unit spacing.
///
/// Centered differences `(x[i+1] − x[i−1]) / 2` in the interior, one-sided
/// differences at both ends. Sequences shorter than two samples have zero
/// gradient.
pub fn gradient(samples: &[f64]) -> Vec<f64> {
    let n = samples.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let mut out = Vec::with_capacity(n);
    out.push(samples[1] - samples[0]);
    out.extend(samples.windows(3).map(|w| (w[2] - w[0]) / 2.0));
    out.push(samples[n - 1] - samples[n - 2]);
    out
}

//! Tau Field - scalar field on a 4D grid, read back as trend symbols
//!
//! A field evolves by explicit finite-difference stepping. One spatial
//! point's time series becomes a sequence of trend symbols, which is scored
//! against the symbols of an observed power-spectrum curve.
//!
//! # Core Types
//!
//! - **FieldConfig**: Grid extents, mass, coupling, update weights, clamps
//! - **Integrator**: Fills a [`FieldGrid`] by stepping the field forward
//! - **SymbolEncoder**: Classifies each sample as rising, falling,
//!   discontinuity or flat
//! - **compare**: Positional agreement between two symbol sequences
//!
//! # Architecture: Integrator / Encoder / Comparator
//!
//! 1. **Integrator** - the substrate: a fully materialized 4D grid
//! 2. **Encoder** - gradient and curvature of a 1D signal, thresholded
//! 3. **Comparator** - fraction of aligned trend pairs that agree
//!
//! The observed curve comes from a [`SpectrumProvider`]. The core does no
//! I/O; wrap a fallible source in [`FallbackProvider`] to always get a curve.
//!
//! # Example
//!
//! ```rust
//! use tau_field::{Extents, FieldConfig, Pipeline, PipelineConfig, Symbol, SyntheticSpectrum};
//!
//! // 1. Configure the field (damped coefficients, both clamps on)
//! let field = FieldConfig::damped()
//!     .with_extents(Extents::new(20, 9, 9, 9))
//!     .with_seed(42);
//!
//! // 2. Inject a spectrum source
//! let pipeline = Pipeline::new(PipelineConfig::new(field), SyntheticSpectrum::default())?;
//!
//! // 3. Simulate, encode, compare
//! let report = pipeline.run()?;
//! assert_eq!(report.simulated.len(), 20);
//! assert!((0.0..=1.0).contains(&report.score.value()));
//!
//! let trends = report.simulated.iter().filter(|s| s.is_trend()).count();
//! println!("{trends} trend symbols, match {:.2}", report.score.value());
//! # let _ = Symbol::Flat;
//! # Ok::<(), tau_field::FieldError>(())
//! ```
//!
//! # Stability
//!
//! The scheme is explicit. [`FieldConfig::damped`] clamps and stays bounded;
//! [`FieldConfig::driven`] does not and usually ends in
//! [`FieldError::NumericDivergence`].

mod compare;
mod config;
mod error;
mod field;
mod integrator;
mod pipeline;
mod spectrum;
mod symbol;

pub use compare::{compare, MatchScore};
pub use config::{ClampFlags, Extents, FieldConfig, CUBIC_CLAMP, OUTPUT_CLAMP};
pub use error::{FieldError, Result};
pub use field::{fluctuation, FieldGrid};
pub use integrator::{potential_derivative, simulate, Integrator};
pub use pipeline::{ComparisonReport, Pipeline, PipelineConfig};
pub use spectrum::{FallbackProvider, FnProvider, Spectrum, SpectrumProvider, SyntheticSpectrum};
pub use symbol::{gradient, render, Symbol, SymbolEncoder, ThresholdPolicy};

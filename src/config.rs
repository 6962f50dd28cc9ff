//! Field configuration

use crate::error::{FieldError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Grid extents along (t, x, y, z).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extents {
    pub t: usize,
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Extents {
    pub fn new(t: usize, x: usize, y: usize, z: usize) -> Self {
        Self { t, x, y, z }
    }

    /// Shape tuple in (t, x, y, z) order.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.t, self.x, self.y, self.z)
    }

    /// Total number of cells.
    pub fn cells(&self) -> usize {
        self.t * self.x * self.y * self.z
    }

    /// Spatial center, used as the default probe point.
    pub fn center(&self) -> (usize, usize, usize) {
        (self.x / 2, self.y / 2, self.z / 2)
    }

    /// Whether a spatial point lies inside the grid.
    pub fn contains_point(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.x && y < self.y && z < self.z
    }
}

/// Which of the two stability clamps the integrator applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClampFlags {
    /// Clamp the potential input to [-1, 1] before cubing.
    pub cubic_clamp: bool,

    /// Clamp every written value to [-OUTPUT_CLAMP, OUTPUT_CLAMP].
    pub output_clamp: bool,
}

impl ClampFlags {
    pub const BOTH: Self = Self {
        cubic_clamp: true,
        output_clamp: true,
    };

    pub const NONE: Self = Self {
        cubic_clamp: false,
        output_clamp: false,
    };
}

/// Bound on written field values when output clamping is enabled.
pub const OUTPUT_CLAMP: f64 = 10.0;

/// Bound on the potential input when cubic clamping is enabled.
pub const CUBIC_CLAMP: f64 = 1.0;

/// Configuration for one field integration run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldConfig {
    /// Grid extents.
    pub extents: Extents,

    /// Field mass (m).
    pub mass: f64,

    /// Self-coupling strength (λ).
    pub coupling: f64,

    /// Weight of the wave operator in the update (α).
    pub alpha: f64,

    /// Weight of the potential derivative in the update (β).
    pub beta: f64,

    /// Time step.
    pub dt: f64,

    /// Spatial step, shared by all three axes.
    pub dx: f64,

    /// Standard deviation of the Gaussian fluctuation seeded into t = 0.
    pub fluctuation: f64,

    /// Stability clamps.
    pub clamps: ClampFlags,

    /// RNG seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl FieldConfig {
    /// Create a configuration with the damped coefficients on the given grid.
    pub fn new(extents: Extents) -> Self {
        Self {
            extents,
            ..Self::damped()
        }
    }

    /// Small update weights with both clamps on.
    ///
    /// α = 0.01, β = 0.01 on a 30 x 15 x 15 x 15 grid.
    pub fn damped() -> Self {
        Self {
            extents: Extents::new(30, 15, 15, 15),
            mass: 0.1,
            coupling: 0.05,
            alpha: 0.01,
            beta: 0.01,
            dt: 1e-3,
            dx: 1e-2,
            fluctuation: 1e-4,
            clamps: ClampFlags::BOTH,
            seed: None,
        }
    }

    /// Larger update weights with no clamping. Diverges on most grids.
    ///
    /// α = 0.1, β = 0.05 on a 30 x 15 x 15 x 15 grid.
    pub fn driven() -> Self {
        Self {
            alpha: 0.1,
            beta: 0.05,
            clamps: ClampFlags::NONE,
            ..Self::damped()
        }
    }

    pub fn with_extents(mut self, extents: Extents) -> Self {
        self.extents = extents;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn with_weights(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    pub fn with_steps(mut self, dt: f64, dx: f64) -> Self {
        self.dt = dt;
        self.dx = dx;
        self
    }

    pub fn with_fluctuation(mut self, fluctuation: f64) -> Self {
        self.fluctuation = fluctuation;
        self
    }

    pub fn with_clamps(mut self, clamps: ClampFlags) -> Self {
        self.clamps = clamps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        let e = &self.extents;
        if e.t == 0 || e.x == 0 || e.y == 0 || e.z == 0 {
            return Err(config_error(format!(
                "extents must be > 0, got {:?}",
                e.shape()
            )));
        }
        e.t.checked_mul(e.x)
            .and_then(|n| n.checked_mul(e.y))
            .and_then(|n| n.checked_mul(e.z))
            .ok_or_else(|| config_error("grid size overflows usize"))?;

        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(config_error("dt must be finite and > 0"));
        }
        if !(self.dx.is_finite() && self.dx > 0.0) {
            return Err(config_error("dx must be finite and > 0"));
        }
        if !(self.fluctuation.is_finite() && self.fluctuation >= 0.0) {
            return Err(config_error("fluctuation must be finite and >= 0"));
        }

        for (name, value) in [
            ("mass", self.mass),
            ("coupling", self.coupling),
            ("alpha", self.alpha),
            ("beta", self.beta),
        ] {
            if !value.is_finite() {
                return Err(config_error(format!("{name} must be finite")));
            }
        }
        Ok(())
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::damped()
    }
}

fn config_error(msg: impl Into<String>) -> FieldError {
    FieldError::Configuration(msg.into())
}

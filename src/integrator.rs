//! Field Integrator - explicit finite-difference stepping of the scalar field
//!
//! Evolves `u` on a 4D grid with
//!
//! ```text
//! u[t+1] = u[t] + α·□u − β·V'(u[t])
//! □u     = ∂²u/∂t² − (∂²u/∂x² + ∂²u/∂y² + ∂²u/∂z²)
//! V'(v)  = 4λv³ − 2mv
//! ```
//!
//! ## Boundaries
//!
//! Boundary shells are pinned (Dirichlet-like): slice t = 0 keeps its seeded
//! fluctuation, slice t = T−1 and the outer index on each spatial axis keep
//! zero. Only interior cells are ever written, so the stencil centre runs over
//! 1 ≤ t ≤ T−3 and writes slice t+1.
//!
//! ## Stability
//!
//! The scheme is explicit and unconditionally trusts α, β and λ. Two clamps
//! (see [`ClampFlags`]) keep it bounded. With clamping off a run may diverge;
//! the first non-finite write aborts with [`FieldError::NumericDivergence`].

use crate::config::{ClampFlags, FieldConfig, CUBIC_CLAMP, OUTPUT_CLAMP};
use crate::error::{FieldError, Result};
use crate::field::FieldGrid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use tracing::{debug, warn};

/// Runs one field simulation per call.
#[derive(Clone, Debug)]
pub struct Integrator {
    config: FieldConfig,
}

impl Integrator {
    /// Create an integrator. Fails fast on invalid configuration.
    pub fn new(config: FieldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get configuration.
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Run with an RNG seeded from the configuration (or OS entropy).
    pub fn run(&self) -> Result<FieldGrid> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(&mut rng)
    }

    /// Run drawing the initial fluctuation from `rng`.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<FieldGrid> {
        let config = &self.config;
        let noise = Normal::new(0.0, config.fluctuation)
            .map_err(|e| FieldError::Configuration(format!("fluctuation: {e}")))?;

        let (nt, nx, ny, nz) = config.extents.shape();
        debug!(
            t = nt,
            x = nx,
            y = ny,
            z = nz,
            alpha = config.alpha,
            beta = config.beta,
            cubic_clamp = config.clamps.cubic_clamp,
            output_clamp = config.clamps.output_clamp,
            "starting field integration"
        );

        let mut grid = FieldGrid::zeros(config.extents);
        grid.fill_slice(0, (0..nx * ny * nz).map(|_| rng.sample(noise)));

        let stencil = Stencil::new(config);
        for t in 1..nt.saturating_sub(2) {
            for x in 1..nx.saturating_sub(1) {
                for y in 1..ny.saturating_sub(1) {
                    for z in 1..nz.saturating_sub(1) {
                        let next = stencil.next_value(&grid, t, x, y, z);
                        if !next.is_finite() {
                            warn!(t = t + 1, x, y, z, "field diverged");
                            return Err(FieldError::NumericDivergence { t: t + 1, x, y, z });
                        }
                        grid.set(t + 1, x, y, z, next);
                    }
                }
            }
            debug!(
                t = t + 1,
                max_abs = grid.slice_at(t + 1).iter().fold(0.0f64, |m, v| m.max(v.abs())),
                "stepped"
            );
        }

        Ok(grid)
    }
}

/// Simulate a field from a configuration.
pub fn simulate(config: FieldConfig) -> Result<FieldGrid> {
    Integrator::new(config)?.run()
}

/// Potential derivative `4λv³ − 2mv`.
///
/// With `cubic_clamp`, `v` is clamped to [-1, 1] first and the clamped value
/// feeds both terms.
pub fn potential_derivative(v: f64, mass: f64, coupling: f64, cubic_clamp: bool) -> f64 {
    let v = if cubic_clamp {
        v.clamp(-CUBIC_CLAMP, CUBIC_CLAMP)
    } else {
        v
    };
    4.0 * coupling * v.powi(3) - 2.0 * mass * v
}

/// Per-run constants of the update rule.
struct Stencil {
    inv_dt2: f64,
    inv_dx2: f64,
    alpha: f64,
    beta: f64,
    mass: f64,
    coupling: f64,
    clamps: ClampFlags,
}

impl Stencil {
    fn new(config: &FieldConfig) -> Self {
        Self {
            inv_dt2: 1.0 / (config.dt * config.dt),
            inv_dx2: 1.0 / (config.dx * config.dx),
            alpha: config.alpha,
            beta: config.beta,
            mass: config.mass,
            coupling: config.coupling,
            clamps: config.clamps,
        }
    }

    /// Value to write at (t+1, x, y, z).
    fn next_value(&self, grid: &FieldGrid, t: usize, x: usize, y: usize, z: usize) -> f64 {
        let v = grid.get(t, x, y, z);
        let wave = self.d_alembertian(grid, t, x, y, z);
        let force = potential_derivative(v, self.mass, self.coupling, self.clamps.cubic_clamp);

        let next = v + self.alpha * wave - self.beta * force;
        if self.clamps.output_clamp {
            next.clamp(-OUTPUT_CLAMP, OUTPUT_CLAMP)
        } else {
            next
        }
    }

    /// Discrete wave operator at (t, x, y, z).
    ///
    /// Slice t+1 is read before this sweep writes it.
    fn d_alembertian(&self, grid: &FieldGrid, t: usize, x: usize, y: usize, z: usize) -> f64 {
        let e = grid.extents();
        let centre = grid.get(t, x, y, z);

        let d2t = (grid.get(t + 1, x, y, z) - 2.0 * centre + grid.get(t - 1, x, y, z)) * self.inv_dt2;

        let d2x = if 0 < x && x + 1 < e.x {
            (grid.get(t, x + 1, y, z) - 2.0 * centre + grid.get(t, x - 1, y, z)) * self.inv_dx2
        } else {
            0.0
        };
        let d2y = if 0 < y && y + 1 < e.y {
            (grid.get(t, x, y + 1, z) - 2.0 * centre + grid.get(t, x, y - 1, z)) * self.inv_dx2
        } else {
            0.0
        };
        let d2z = if 0 < z && z + 1 < e.z {
            (grid.get(t, x, y, z + 1) - 2.0 * centre + grid.get(t, x, y, z - 1)) * self.inv_dx2
        } else {
            0.0
        };

        d2t - (d2x + d2y + d2z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Extents;

    fn small(extents: Extents) -> FieldConfig {
        FieldConfig::damped().with_extents(extents).with_seed(7)
    }

    #[test]
    fn test_zero_field_stays_zero() {
        let config = FieldConfig::new(Extents::new(5, 5, 5, 5))
            .with_mass(0.1)
            .with_coupling(0.05)
            .with_weights(0.01, 0.01)
            .with_fluctuation(0.0);

        let grid = simulate(config).unwrap();
        assert!(grid.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_potential_vanishes_at_zero() {
        assert_eq!(potential_derivative(0.0, 0.1, 0.05, true), 0.0);
        assert_eq!(potential_derivative(0.0, 0.1, 0.05, false), 0.0);
    }

    #[test]
    fn test_potential_cubic_clamp() {
        // 4·0.05·1 − 2·0.1·1 = 0
        assert!(potential_derivative(3.0, 0.1, 0.05, true).abs() < 1e-12);
        // 4·0.05·27 − 2·0.1·3 = 4.8
        assert!((potential_derivative(3.0, 0.1, 0.05, false) - 4.8).abs() < 1e-12);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = small(Extents::new(6, 5, 5, 5));
        let a = simulate(config.clone()).unwrap();
        let b = simulate(config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_boundaries_pinned() {
        let extents = Extents::new(6, 5, 5, 5);
        let mut rng = StdRng::seed_from_u64(11);
        let grid = Integrator::new(small(extents))
            .unwrap()
            .run_with_rng(&mut rng)
            .unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        let noise = Normal::new(0.0, 1e-4).unwrap();
        let seeded: Vec<f64> = (0..125).map(|_| rng.sample(noise)).collect();
        assert_eq!(grid.slice_at(0).iter().copied().collect::<Vec<_>>(), seeded);

        for t in 1..6 {
            for x in 0..5 {
                for y in 0..5 {
                    for z in 0..5 {
                        if grid.is_boundary(t, x, y, z) {
                            assert_eq!(grid.get(t, x, y, z), 0.0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_first_step_is_wave_driven() {
        // Slice 1 is never written, so slice 2 = α·u0/dt² at the centre
        // (spatial terms vanish because slice 1 is zero).
        let extents = Extents::new(4, 3, 3, 3);
        let config = small(extents).with_clamps(ClampFlags::NONE);
        let grid = simulate(config).unwrap();

        let u0 = grid.get(0, 1, 1, 1);
        let expected = 0.01 * u0 / (1e-3 * 1e-3);
        assert_eq!(grid.get(1, 1, 1, 1), 0.0);
        assert!((grid.get(2, 1, 1, 1) - expected).abs() <= 1e-12 * expected.abs().max(1.0));
    }

    #[test]
    fn test_output_clamp_bounds_values() {
        let config = FieldConfig::damped().with_seed(3);
        let grid = simulate(config).unwrap();

        assert!(grid.max_abs() <= OUTPUT_CLAMP);
        assert!(grid.is_finite());
    }

    #[test]
    fn test_unclamped_driven_preset_diverges() {
        let config = FieldConfig::driven().with_seed(5);
        let result = simulate(config);
        assert!(matches!(result, Err(FieldError::NumericDivergence { .. })));
    }

    #[test]
    fn test_invalid_config_fails_before_run() {
        let config = FieldConfig::damped().with_fluctuation(-1.0);
        assert!(matches!(
            Integrator::new(config),
            Err(FieldError::Configuration(_))
        ));
    }

    #[test]
    fn test_tiny_grids_have_no_interior() {
        for extents in [Extents::new(1, 1, 1, 1), Extents::new(3, 2, 2, 2)] {
            let grid = simulate(small(extents)).unwrap();
            for t in 1..extents.t {
                assert!(grid.slice_at(t).iter().all(|&v| v == 0.0));
            }
        }
    }
}

//! Deterministic simulated training runs.
//!
//! Seeds a store with per-algorithm loss/accuracy curves for demos, benches,
//! and integration tests. Every value derives from the run name via BLAKE3,
//! so repeated seeding produces byte-identical series.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::session::RunOptions;
use crate::store::{MetricStore, StoreError};

/// Algorithms seeded by the demo, with their learning rates.
const ALGORITHMS: &[(&str, f64)] = &[("sgd", 0.1), ("adam", 0.001), ("rmsprop", 0.01)];

/// Knobs for [`seed_demo_runs`].
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Replicate runs per algorithm.
    pub seeds: usize,
    /// Logged steps per run.
    pub steps: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self { seeds: 3, steps: 200 }
    }
}

/// Seed simulated training runs into `project`. Returns the run count.
///
/// Each run logs `loss` and `accuracy` per step:
/// `loss = base · e^(−step/τ) + noise` and
/// `accuracy = clamp(1 − loss/3 + noise, 0, 1)`, with `base`/`τ` derived
/// from the algorithm and its learning rate.
pub fn seed_demo_runs(
    store: &MetricStore,
    project: &str,
    opts: &DemoOptions,
) -> Result<usize, StoreError> {
    let mut created = 0;
    for &(algo, lr) in ALGORITHMS {
        for seed in 0..opts.seeds {
            let name = format!("{algo}_s{seed}");
            let mut session = store.begin_run(
                project,
                RunOptions::named(&name).with_config(json!({
                    "algo": algo,
                    "lr": lr,
                    "seed": seed,
                })),
            )?;

            let mut rng = rng_for(&name);
            let (base, tau) = curve_shape(algo, lr, opts.steps);
            for step in 0..opts.steps {
                let loss =
                    base * (-(step as f64) / tau).exp() + rng.gen_range(-0.05..0.05);
                let accuracy =
                    (1.0 - loss / 3.0 + rng.gen_range(-0.02..0.02)).clamp(0.0, 1.0);
                session.log(&[("loss", loss), ("accuracy", accuracy)])?;
            }
            session.finish()?;
            created += 1;
        }
    }
    Ok(created)
}

/// Deterministic RNG seeded from the run name.
fn rng_for(run_name: &str) -> StdRng {
    let seed: [u8; 32] = *blake3::hash(run_name.as_bytes()).as_bytes();
    StdRng::from_seed(seed)
}

/// Initial loss and decay constant per algorithm. Larger learning rates
/// decay faster; the constants just keep the demo curves visually distinct.
fn curve_shape(algo: &str, lr: f64, steps: usize) -> (f64, f64) {
    let (base, tau_frac) = match algo {
        "adam" => (2.2, 0.2),
        "rmsprop" => (2.6, 0.3),
        _ => (3.0, 0.4),
    };
    let tau = (steps as f64 * tau_frac) / (1.0 + lr);
    (base, tau)
}

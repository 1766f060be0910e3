/*!
 * Grind Configuration
 * Runtime configuration for the memgrind workload harness
 */

use crate::core::limits::DEFAULT_GRIND_ITERATIONS;
use log::warn;

/// memgrind configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrindConfig {
    /// Rounds each workload is timed over
    pub iterations: usize,
    /// Seed for workload C; drawn from entropy when unset
    pub seed: Option<u64>,
    /// Emit the report as JSON instead of text
    pub json: bool,
}

impl Default for GrindConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_GRIND_ITERATIONS,
            seed: None,
            json: false,
        }
    }
}

impl GrindConfig {
    /// Load configuration from the environment
    ///
    /// Environment variables:
    /// - MEMGRIND_ITERATIONS: rounds per workload (default: 50)
    /// - MEMGRIND_SEED: fixed seed for the random workload
    /// - MEMGRIND_JSON: emit JSON (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let iterations = match lookup("MEMGRIND_ITERATIONS").map(|v| v.parse::<usize>()) {
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                warn!(
                    "Ignoring invalid MEMGRIND_ITERATIONS, using {}",
                    defaults.iterations
                );
                defaults.iterations
            }
            None => defaults.iterations,
        };

        let seed = match lookup("MEMGRIND_SEED").map(|v| v.parse::<u64>()) {
            Some(Ok(seed)) => Some(seed),
            Some(Err(e)) => {
                warn!("Ignoring invalid MEMGRIND_SEED: {}", e);
                None
            }
            None => None,
        };

        let json = lookup("MEMGRIND_JSON")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

        Self {
            iterations,
            seed,
            json,
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

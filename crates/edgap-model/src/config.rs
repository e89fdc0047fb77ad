//! Analysis configuration.
//!
//! All run-level knobs travel in one explicit value passed into every
//! estimation call. The seed and sampler settings are configuration, not
//! ambient state, so units stay independent and tests stay parallel-safe.

use serde::Serialize;

/// Configuration for one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisConfig {
    /// Random seed applied identically to every unit.
    pub seed: u64,
    /// Fits larger than this are subsampled down to this many rows.
    pub max_fit_rows: usize,
    /// Ensemble size of the response-surface model.
    pub trees: usize,
    /// Kept posterior draws, split across chains.
    pub draws: usize,
    /// Discarded warm-up iterations per chain.
    pub burn_in: usize,
    /// Independent chains.
    pub chains: usize,
    /// Dataset-level minimum row count (quality gate and overall gender
    /// unit).
    pub min_total_rows: usize,
    /// Minimum rows per race (quality gate and overall race units).
    pub min_race_rows: usize,
    /// Minimum rows in a (year, race) stratum. Deliberately lower than the
    /// per-year gender minimum: race strata are finer-grained. Policy, not a
    /// bug.
    pub min_year_race_rows: usize,
    /// Minimum rows in a year slice for the gender unit.
    pub min_year_gender_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_fit_rows: 2000,
            trees: 200,
            draws: 1000,
            burn_in: 200,
            chains: 2,
            min_total_rows: 100,
            min_race_rows: 10,
            min_year_race_rows: 50,
            min_year_gender_rows: 100,
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Override the sampler settings (smaller values make smoke runs and
    /// tests fast; defaults are the production literals).
    #[must_use]
    pub fn with_sampler(mut self, trees: usize, draws: usize, burn_in: usize, chains: usize) -> Self {
        self.trees = trees;
        self.draws = draws;
        self.burn_in = burn_in;
        self.chains = chains.max(1);
        self
    }

    #[must_use]
    pub fn with_max_fit_rows(mut self, max_fit_rows: usize) -> Self {
        self.max_fit_rows = max_fit_rows;
        self
    }

    /// Kept draws per chain. The configured draw budget is split evenly;
    /// the remainder goes to the first chain.
    pub fn draws_per_chain(&self, chain: usize) -> usize {
        let chains = self.chains.max(1);
        let base = self.draws / chains;
        if chain == 0 { base + self.draws % chains } else { base }
    }
}

#[cfg(test)]
mod tests {
    use super::AnalysisConfig;

    #[test]
    fn test_default_literals() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_fit_rows, 2000);
        assert_eq!(config.trees, 200);
        assert_eq!(config.draws, 1000);
        assert_eq!(config.burn_in, 200);
        assert_eq!(config.chains, 2);
        assert_eq!(config.min_total_rows, 100);
        assert_eq!(config.min_race_rows, 10);
        assert_eq!(config.min_year_race_rows, 50);
        assert_eq!(config.min_year_gender_rows, 100);
    }

    #[test]
    fn test_draws_split_across_chains() {
        let config = AnalysisConfig::default().with_sampler(10, 101, 10, 2);
        assert_eq!(config.draws_per_chain(0), 51);
        assert_eq!(config.draws_per_chain(1), 50);
        assert_eq!(
            config.draws_per_chain(0) + config.draws_per_chain(1),
            config.draws
        );
    }
}

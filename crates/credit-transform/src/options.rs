//! Runtime knobs for a normalization run.

use serde::{Deserialize, Serialize};

/// Whether output rows are shuffled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShufflePolicy {
    /// Shuffle when the field spec asks for it.
    #[default]
    FromSpec,
    Never,
    Always,
}

/// What happens to rows with a missing value in a kept feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFeaturePolicy {
    /// Drop the row, as the downstream dataset container does.
    #[default]
    Drop,
    /// Keep the row with the missing cell.
    Keep,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub shuffle: ShufflePolicy,
    /// Fixed RNG seed; without one the shuffle is not reproducible.
    pub seed: Option<u64>,
    pub missing_features: MissingFeaturePolicy,
}

impl NormalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: ShufflePolicy) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_missing_features(mut self, policy: MissingFeaturePolicy) -> Self {
        self.missing_features = policy;
        self
    }

    /// Resolves the shuffle decision against a spec's own flag.
    pub fn should_shuffle(&self, spec_shuffle: bool) -> bool {
        match self.shuffle {
            ShufflePolicy::FromSpec => spec_shuffle,
            ShufflePolicy::Never => false,
            ShufflePolicy::Always => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_policy_resolution() {
        let options = NormalizeOptions::new();
        assert!(options.should_shuffle(true));
        assert!(!options.should_shuffle(false));
        let never = options.clone().with_shuffle(ShufflePolicy::Never);
        assert!(!never.should_shuffle(true));
        let always = options.with_shuffle(ShufflePolicy::Always);
        assert!(always.should_shuffle(false));
    }
}

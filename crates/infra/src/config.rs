//! Configuration loading and representation.

use anyhow::{Context, bail};

use storefront_returns::DraftPolicy;

/// Last return order id issued by a previous system; the counter continues after it.
pub const ID_SEED_VAR: &str = "STOREFRONT_RMA_ID_SEED";
/// Evidence attachments allowed per returned item.
pub const MAX_EVIDENCE_VAR: &str = "STOREFRONT_RMA_MAX_EVIDENCE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RmaConfig {
    pub id_seed: u64,
    pub max_evidence_per_item: usize,
}

impl Default for RmaConfig {
    fn default() -> Self {
        Self {
            id_seed: 0,
            max_evidence_per_item: DraftPolicy::default().max_evidence_per_item,
        }
    }
}

impl RmaConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ID_SEED_VAR) {
            config.id_seed = raw
                .trim()
                .parse()
                .with_context(|| format!("{ID_SEED_VAR} must be a non-negative integer, got '{raw}'"))?;
        }

        if let Some(raw) = lookup(MAX_EVIDENCE_VAR) {
            let max: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("{MAX_EVIDENCE_VAR} must be a positive integer, got '{raw}'"))?;
            if max == 0 {
                bail!("{MAX_EVIDENCE_VAR} must be at least 1");
            }
            config.max_evidence_per_item = max;
        }

        tracing::debug!(
            id_seed = config.id_seed,
            max_evidence_per_item = config.max_evidence_per_item,
            "rma config loaded"
        );
        Ok(config)
    }

    pub fn draft_policy(&self) -> DraftPolicy {
        DraftPolicy {
            max_evidence_per_item: self.max_evidence_per_item,
        }
    }
}

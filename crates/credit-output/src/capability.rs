//! Optional capabilities compiled into this build.
//!
//! Checked once at startup; code paths that need a missing capability get a
//! typed [`Unavailable`] instead of failing somewhere deep inside a load.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// polars `DataFrame` hand-off and table previews.
    DataFrame,
}

impl Capability {
    pub const ALL: [Capability; 1] = [Capability::DataFrame];

    /// Cargo feature that enables the capability.
    pub fn feature(self) -> &'static str {
        match self {
            Self::DataFrame => "dataframe",
        }
    }

    fn compiled_in(self) -> bool {
        match self {
            Self::DataFrame => cfg!(feature = "dataframe"),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataFrame => f.write_str("DataFrame support"),
        }
    }
}

/// A capability this build was compiled without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{capability} is unavailable in this build (enable the `{feature}` feature)")]
pub struct Unavailable {
    pub capability: Capability,
    pub feature: &'static str,
}

impl Unavailable {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            feature: capability.feature(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityStatus {
    pub capability: Capability,
    pub feature: &'static str,
    pub available: bool,
}

/// Snapshot of what this build can do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    statuses: Vec<CapabilityStatus>,
}

impl Capabilities {
    pub fn detect() -> Self {
        let statuses = Capability::ALL
            .iter()
            .map(|capability| CapabilityStatus {
                capability: *capability,
                feature: capability.feature(),
                available: capability.compiled_in(),
            })
            .collect();
        Self { statuses }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.statuses
            .iter()
            .any(|status| status.capability == capability && status.available)
    }

    pub fn require(&self, capability: Capability) -> Result<(), Unavailable> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(Unavailable::new(capability))
        }
    }

    pub fn statuses(&self) -> &[CapabilityStatus] {
        &self.statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_matches_build_features() {
        let capabilities = Capabilities::detect();
        assert_eq!(
            capabilities.has(Capability::DataFrame),
            cfg!(feature = "dataframe")
        );
        assert_eq!(capabilities.statuses().len(), Capability::ALL.len());
    }

    #[test]
    fn unavailable_names_the_feature() {
        let error = Unavailable::new(Capability::DataFrame);
        assert_eq!(
            error.to_string(),
            "DataFrame support is unavailable in this build (enable the `dataframe` feature)"
        );
    }
}

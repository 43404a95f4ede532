//! Dataset keys accepted by the loader dispatch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Credit-risk sources with a built-in field spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Taiwan,
    German,
    Uk,
    Bene,
    HomeCredit,
    Gmsc,
    Pkdd,
    Nfl,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 8] = [
        DatasetKind::Taiwan,
        DatasetKind::German,
        DatasetKind::Uk,
        DatasetKind::Bene,
        DatasetKind::HomeCredit,
        DatasetKind::Gmsc,
        DatasetKind::Pkdd,
        DatasetKind::Nfl,
    ];

    /// Dispatch key, as accepted by [`DatasetKind::from_str`].
    pub fn key(self) -> &'static str {
        match self {
            Self::Taiwan => "taiwan",
            Self::German => "german",
            Self::Uk => "uk",
            Self::Bene => "bene",
            Self::HomeCredit => "homecredit",
            Self::Gmsc => "gmsc",
            Self::Pkdd => "pkdd",
            Self::Nfl => "nfl",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Taiwan => "Taiwan",
            Self::German => "German",
            Self::Uk => "UK",
            Self::Bene => "BENE",
            Self::HomeCredit => "HomeCredit",
            Self::Gmsc => "GMSC",
            Self::Pkdd => "PKDD",
            Self::Nfl => "NFL",
        }
    }

    fn expected_keys() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.key())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DatasetKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| ModelError::UnknownDataset {
                key: s.to_string(),
                expected: Self::expected_keys(),
            })
    }
}

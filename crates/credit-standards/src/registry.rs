//! Field specs for the built-in datasets.
//!
//! Each spec is a TOML file under `specs/`, compiled into the binary with
//! `include_str!` so loading a dataset never depends on the working
//! directory.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use credit_model::{DatasetKind, FieldSpec};

use crate::error::{Result, StandardsError};

const TAIWAN: &str = include_str!("../specs/taiwan.toml");
const GERMAN: &str = include_str!("../specs/german.toml");
const UK: &str = include_str!("../specs/uk.toml");
const BENE: &str = include_str!("../specs/bene.toml");
const HOMECREDIT: &str = include_str!("../specs/homecredit.toml");
const GMSC: &str = include_str!("../specs/gmsc.toml");
const PKDD: &str = include_str!("../specs/pkdd.toml");
const NFL: &str = include_str!("../specs/nfl.toml");

/// Raw TOML text of a built-in spec.
pub fn builtin_source(kind: DatasetKind) -> &'static str {
    match kind {
        DatasetKind::Taiwan => TAIWAN,
        DatasetKind::German => GERMAN,
        DatasetKind::Uk => UK,
        DatasetKind::Bene => BENE,
        DatasetKind::HomeCredit => HOMECREDIT,
        DatasetKind::Gmsc => GMSC,
        DatasetKind::Pkdd => PKDD,
        DatasetKind::Nfl => NFL,
    }
}

/// Parses and validates a spec; `origin` names the text in errors.
pub fn parse_spec(origin: &str, text: &str) -> Result<FieldSpec> {
    let spec: FieldSpec = toml::from_str(text).map_err(|source| StandardsError::Toml {
        origin: origin.to_string(),
        source,
    })?;
    spec.validate()?;
    Ok(spec)
}

/// Built-in spec for a dataset.
pub fn builtin_spec(kind: DatasetKind) -> Result<FieldSpec> {
    let spec = parse_spec(kind.key(), builtin_source(kind))?;
    if spec.name != kind.key() {
        return Err(StandardsError::NameMismatch {
            origin: kind.key().to_string(),
            found: spec.name,
        });
    }
    Ok(spec)
}

/// Selects the built-in spec by dispatch key (`taiwan`, `german`, ...).
pub fn spec_for_key(key: &str) -> Result<FieldSpec> {
    let kind: DatasetKind = key.parse()?;
    builtin_spec(kind)
}

/// Reads a user-supplied spec file.
pub fn load_spec_file(path: &Path) -> Result<FieldSpec> {
    let text = std::fs::read_to_string(path).map_err(|error| StandardsError::io(path, error))?;
    let spec = parse_spec(&path.display().to_string(), &text)?;
    debug!(path = %path.display(), spec = %spec.name, "loaded field spec");
    Ok(spec)
}

/// Renders a spec back to TOML.
pub fn spec_to_toml(spec: &FieldSpec) -> Result<String> {
    toml::to_string_pretty(spec).map_err(|source| StandardsError::Serialize {
        name: spec.name.clone(),
        source,
    })
}

/// All built-in specs, parsed once.
#[derive(Debug, Clone)]
pub struct SpecRegistry {
    specs: BTreeMap<DatasetKind, FieldSpec>,
}

impl SpecRegistry {
    pub fn builtin() -> Result<Self> {
        let mut specs = BTreeMap::new();
        for kind in DatasetKind::ALL {
            specs.insert(kind, builtin_spec(kind)?);
        }
        debug!(count = specs.len(), "built-in field specs loaded");
        Ok(Self { specs })
    }

    pub fn get(&self, kind: DatasetKind) -> Option<&FieldSpec> {
        self.specs.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DatasetKind, &FieldSpec)> {
        self.specs.iter().map(|(kind, spec)| (*kind, spec))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

//! Descriptor of a canonical record set.
//!
//! Carries what a fairness consumer needs next to the rows themselves:
//! label and protected attribute names, favorable and privileged values,
//! categorical features and human-readable value maps.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use credit_model::{CanonicalRecordSet, NormalizeReport, ValueLabel};

use crate::error::{OutputError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDescriptor {
    pub dataset: String,
    pub label_name: String,
    pub favorable_classes: Vec<f64>,
    pub protected_attribute_names: Vec<String>,
    /// One list of privileged values per protected attribute.
    pub privileged_classes: Vec<Vec<f64>>,
    pub unprivileged_classes: Vec<Vec<f64>>,
    pub features: Vec<String>,
    pub categorical_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores_name: Option<String>,
    pub metadata: DescriptorMetadata,
    pub report: NormalizeReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceInfo>,
    pub generated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorMetadata {
    pub label_maps: Vec<BTreeMap<String, String>>,
    pub protected_attribute_maps: Vec<BTreeMap<String, String>>,
}

/// Where the raw input came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub path: String,
    pub sha256: String,
}

fn value_map(labels: &[ValueLabel]) -> BTreeMap<String, String> {
    labels
        .iter()
        .map(|entry| (format!("{:?}", entry.value), entry.label.clone()))
        .collect()
}

impl StandardDescriptor {
    pub fn new(records: &CanonicalRecordSet, report: &NormalizeReport) -> Self {
        let schema = &records.schema;
        let metadata = &records.metadata;
        Self {
            dataset: records.dataset.clone(),
            label_name: schema.label.clone(),
            favorable_classes: metadata.favorable_labels.clone(),
            protected_attribute_names: vec![schema.protected_attribute.clone()],
            privileged_classes: vec![metadata.privileged_protected.clone()],
            unprivileged_classes: vec![metadata.unprivileged_protected.clone()],
            features: schema.features.clone(),
            categorical_features: schema.categorical_features.clone(),
            scores_name: schema.score.clone(),
            metadata: DescriptorMetadata {
                label_maps: vec![value_map(&metadata.label_map)],
                protected_attribute_maps: vec![value_map(&metadata.protected_attribute_map)],
            },
            report: report.clone(),
            source: None,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    #[must_use]
    pub fn with_source(mut self, path: &Path, sha256: impl Into<String>) -> Self {
        self.source = Some(SourceInfo {
            path: path.display().to_string(),
            sha256: sha256.into(),
        });
        self
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|error| OutputError::io(path, error))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| OutputError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(|error| OutputError::io(path, error))
    }
}

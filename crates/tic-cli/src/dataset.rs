//! # Dataset Files
//!
//! A dataset is a JSON or YAML document holding every institution with
//! its qualifications, facilities and change records:
//!
//! ```yaml
//! institutions:
//!   - id: 6f1c...
//!     name: Harbor Safety Academy
//!     qualifications: [...]
//!     facilities: [...]
//!     change_records: [...]
//! ```
//!
//! The format is chosen by file extension (`.json`, `.yaml`, `.yml`).

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use tic_state::Institution;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub institutions: Vec<Institution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Json,
    Yaml,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => bail!(
                "cannot tell dataset format of {}: expected a .json, .yaml or .yml file",
                path.display()
            ),
        }
    }
}

/// Read and parse a dataset file.
pub fn load(path: &Path) -> Result<Dataset> {
    let format = DatasetFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let dataset: Dataset = match format {
        DatasetFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON dataset {}", path.display()))?,
        DatasetFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML dataset {}", path.display()))?,
    };
    tracing::debug!(
        path = %path.display(),
        institutions = dataset.institutions.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Write a dataset back in the format its extension names.
pub fn save(path: &Path, dataset: &Dataset) -> Result<()> {
    let content = match DatasetFormat::from_path(path)? {
        DatasetFormat::Json => {
            let mut json = serde_json::to_string_pretty(dataset)?;
            json.push('\n');
            json
        }
        DatasetFormat::Yaml => serde_yaml::to_string(dataset)?,
    };
    std::fs::write(path, content)
        .with_context(|| format!("failed to write dataset {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        institutions = dataset.institutions.len(),
        "dataset written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tic_core::Timestamp;
    use tic_state::{ContactInfo, InstitutionStatus, NewInstitution};

    fn institution(code: &str) -> Institution {
        let now = Timestamp::parse("2026-03-01T08:00:00Z").unwrap();
        Institution::new(
            NewInstitution {
                id: None,
                name: format!("Institution {code}"),
                code: code.to_string(),
                institution_type: "vocational".to_string(),
                legal_representative: "Lin Wei".to_string(),
                contact: ContactInfo {
                    person: "Zhao Min".to_string(),
                    phone: "13800138000".to_string(),
                    email: "office@example.org".to_string(),
                },
                address: "1 Training Road".to_string(),
                business_scope: "work safety training".to_string(),
                established_on: now.date(),
                registration_number: format!("REG-{code}"),
                status: InstitutionStatus::Operating,
                organization_structure: Value::Null,
            },
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DatasetFormat::from_path(Path::new("a.json")).unwrap(), DatasetFormat::Json);
        assert_eq!(DatasetFormat::from_path(Path::new("a.YAML")).unwrap(), DatasetFormat::Yaml);
        assert_eq!(DatasetFormat::from_path(Path::new("a.yml")).unwrap(), DatasetFormat::Yaml);
        assert!(DatasetFormat::from_path(Path::new("a.toml")).is_err());
        assert!(DatasetFormat::from_path(Path::new("dataset")).is_err());
    }

    #[test]
    fn test_save_then_load_in_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = Dataset {
            institutions: vec![institution("A"), institution("B")],
        };
        for name in ["dataset.json", "dataset.yaml"] {
            let path = dir.path().join(name);
            save(&path, &dataset).unwrap();
            let loaded = load(&path).unwrap();
            assert_eq!(loaded.institutions, dataset.institutions);
        }
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = load(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read dataset"));

        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "institutions: [ {").unwrap();
        let err = load(&broken).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse YAML dataset"));
    }

    #[test]
    fn test_empty_document_has_no_institutions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(load(&path).unwrap().institutions.is_empty());
    }
}

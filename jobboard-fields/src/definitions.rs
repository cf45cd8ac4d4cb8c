//! Extra field definitions kept as YAML files, one descriptor per file

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{FieldsError, Result};
use crate::schema::SchemaExtension;
use crate::types::FieldDescriptor;

/// A directory of `.yaml` field descriptors, loaded once and merged into
/// every schema.
///
/// A definition whose key matches an existing field replaces it; others are
/// appended.
#[derive(Debug, Clone)]
pub struct FieldDefinitions {
    root: PathBuf,
    fields: Vec<FieldDescriptor>,
    key_index: HashMap<String, usize>,
}

impl FieldDefinitions {
    /// Load every definition under `root`. Files that do not parse are
    /// skipped with a warning; of two files declaring the same key the first
    /// in file-name order wins.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(FieldsError::NotInitialized { path: root });
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&root)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_yaml(path))
            .collect();
        paths.sort();

        let mut definitions = Self {
            root,
            fields: Vec::new(),
            key_index: HashMap::new(),
        };
        for path in paths {
            let content = fs::read_to_string(&path)?;
            match serde_yaml_ng::from_str::<FieldDescriptor>(&content) {
                Ok(def) if definitions.key_index.contains_key(&def.key) => {
                    warn!(?path, key = %def.key, "skipping duplicate field definition");
                }
                Ok(def) => {
                    definitions.key_index.insert(def.key.clone(), definitions.fields.len());
                    definitions.fields.push(def);
                }
                Err(e) => {
                    warn!(?path, %e, "skipping invalid field definition");
                }
            }
        }

        debug!(root = ?definitions.root, count = definitions.fields.len(), "field definitions opened");
        Ok(definitions)
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.key_index.get(key).map(|&idx| &self.fields[idx])
    }

    /// Definitions in load order.
    pub fn all(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

impl SchemaExtension for FieldDefinitions {
    fn extend_fields(&self, _listing_id: u64, fields: &mut Vec<FieldDescriptor>) {
        for def in &self.fields {
            match fields.iter_mut().find(|field| field.key == def.key) {
                Some(existing) => *existing = def.clone(),
                None => fields.push(def.clone()),
            }
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn open_missing_directory_errors() {
        let tmp = TempDir::new().unwrap();
        let result = FieldDefinitions::open(tmp.path().join("nope"));
        assert!(matches!(result, Err(FieldsError::NotInitialized { .. })));
    }

    #[test]
    fn open_skips_invalid_and_foreign_files() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "salary.yaml", "key: _job_salary\nlabel: Salary\n");
        write_file(tmp.path(), "broken.yaml", "key: [unterminated\n");
        write_file(tmp.path(), "notes.txt", "key: _ignored\nlabel: Ignored\n");

        let defs = FieldDefinitions::open(tmp.path()).unwrap();
        assert_eq!(defs.all().len(), 1);
        assert_eq!(defs.get("_job_salary").unwrap().label, "Salary");
        assert!(defs.get("_ignored").is_none());
    }

    #[test]
    fn first_duplicate_wins() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.yaml", "key: _job_salary\nlabel: First\n");
        write_file(tmp.path(), "b.yml", "key: _job_salary\nlabel: Second\n");

        let defs = FieldDefinitions::open(tmp.path()).unwrap();
        assert_eq!(defs.all().len(), 1);
        assert_eq!(defs.get("_job_salary").unwrap().label, "First");
    }

    #[test]
    fn open_reads_full_descriptor() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "salary.yml",
            "key: _job_salary\nlabel: Salary\ntype: select\npriority: 7\noptions:\n  low: Low\n  high: High\n",
        );

        let defs = FieldDefinitions::open(tmp.path()).unwrap();
        let field = FieldDescriptor::new("_job_salary", "Salary")
            .kind(FieldType::Select)
            .options([("low", "Low"), ("high", "High")])
            .priority(7);
        assert_eq!(defs.get("_job_salary"), Some(&field));
    }

    #[test]
    fn extension_replaces_and_appends() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.yaml", "key: _company_name\nlabel: Employer\npriority: 3\n");
        write_file(tmp.path(), "b.yaml", "key: _job_salary\nlabel: Salary\npriority: 7\n");
        let defs = FieldDefinitions::open(tmp.path()).unwrap();

        let mut fields = vec![
            FieldDescriptor::new("_job_location", "Location").priority(1),
            FieldDescriptor::new("_company_name", "Company Name").priority(3),
        ];
        defs.extend_fields(1, &mut fields);

        let labels: Vec<_> = fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Location", "Employer", "Salary"]);
    }
}

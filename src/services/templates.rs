//! Named template persistence and `{name}` substitution

use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
};
use thiserror::Error;
use tracing::{debug, info};

/// Template name → raw timer sequence
pub type Templates = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid JSON in template file {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write template file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode templates: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Template file backed by a flat JSON object
#[derive(Debug, Clone)]
pub struct TemplateStore {
    path: PathBuf,
}

impl TemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load every template. A missing file is an empty set.
    pub fn load(&self) -> Result<Templates, TemplateError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No template file at {}", self.path.display());
                return Ok(Templates::new());
            }
            Err(source) => {
                return Err(TemplateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let templates: Templates =
            serde_json::from_str(&raw).map_err(|source| TemplateError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        debug!("Loaded {} templates from {}", templates.len(), self.path.display());
        Ok(templates)
    }

    /// Overwrite the template file with the full mapping
    pub fn save(&self, templates: &Templates) -> Result<(), TemplateError> {
        let encoded = serde_json::to_string_pretty(templates)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| TemplateError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        fs::write(&self.path, encoded).map_err(|source| TemplateError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!("Saved {} templates to {}", templates.len(), self.path.display());
        Ok(())
    }

    /// Load, insert or replace one template, and write everything back
    pub fn save_one(&self, name: &str, raw: &str) -> Result<(), TemplateError> {
        let mut templates = self.load()?;
        templates.insert(name.to_string(), raw.to_string());
        self.save(&templates)
    }
}

/// Replace each `{name}` with its template in a single pass.
///
/// Inserted text is not scanned again, and unknown names stay as written.
pub fn substitute(input: &str, templates: &Templates) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replacement = after
            .find('}')
            .and_then(|close| templates.get(&after[..close]).map(|value| (close, value)));

        match replacement {
            Some((close, value)) => {
                output.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                output.push('{');
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Lines shown by `--list`
pub fn listing(templates: &Templates) -> Vec<String> {
    templates
        .iter()
        .map(|(name, value)| format!("{{{}}}: {}", name, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn templates(pairs: &[(&str, &str)]) -> Templates {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::new(dir.path().join("template.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("template.json");
        fs::write(&path, "{ nope").unwrap();
        let err = TemplateStore::new(&path).load().unwrap_err();
        assert!(matches!(err, TemplateError::Malformed { .. }));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn non_string_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("template.json");
        fs::write(&path, r#"{"pomo": 25}"#).unwrap();
        assert!(TemplateStore::new(&path).load().is_err());
    }

    #[test]
    fn save_one_keeps_existing_entries() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::new(dir.path().join("nested").join("template.json"));
        store.save_one("pomo", "25m'Focus'[bell]; 5m'Break'").unwrap();
        store.save_one("tea", "3m'Tea'").unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["pomo"], "25m'Focus'[bell]; 5m'Break'");
    }

    #[test]
    fn saved_template_splices_back_verbatim() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::new(dir.path().join("template.json"));
        let raw = "1h 'Deep work' [gong]; 10m \"x\" {literal}";
        store.save_one("deep", raw).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(substitute("{deep};5m", &loaded), format!("{};5m", raw));
    }

    #[test]
    fn substitution_replaces_every_occurrence() {
        let t = templates(&[("a", "1m")]);
        assert_eq!(substitute("{a};{a} 'x'", &t), "1m;1m 'x'");
    }

    #[test]
    fn substitution_is_single_pass() {
        let t = templates(&[("outer", "{inner}"), ("inner", "5s")]);
        assert_eq!(substitute("{outer}", &t), "{inner}");
    }

    #[test]
    fn unknown_tokens_are_left_alone() {
        let t = templates(&[("a", "1m")]);
        assert_eq!(substitute("{b} {a} {", &t), "{b} 1m {");
    }

    #[test]
    fn listing_formats_names_in_braces() {
        let t = templates(&[("b", "2m"), ("a", "1m")]);
        assert_eq!(listing(&t), vec!["{a}: 1m", "{b}: 2m"]);
    }
}

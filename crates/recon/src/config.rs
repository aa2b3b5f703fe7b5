use serde::Deserialize;

use crate::error::ReconError;
use crate::normalize::NormalizeOptions;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// An audit run: which uploads to ingest and how.
#[derive(Debug, Deserialize)]
pub struct AuditConfig {
    pub name: String,
    /// Uploader identity stamped on stored records.
    #[serde(default = "default_uploaded_by")]
    pub uploaded_by: String,
    pub inputs: InputsConfig,
    #[serde(default)]
    pub normalize: NormalizeOptions,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_uploaded_by() -> String {
    "cli".into()
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// CSV files per record kind. Several files of one kind are separate
/// uploads, appended in listed order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputsConfig {
    #[serde(default)]
    pub route: Vec<String>,
    #[serde(default)]
    pub roster: Vec<String>,
}

// ---------------------------------------------------------------------------
// Upload + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Write attempts per record before it counts as failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AuditConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: AuditConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.inputs.route.is_empty() && self.inputs.roster.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one route or roster input is required".into(),
            ));
        }

        for (kind, files) in [("route", &self.inputs.route), ("roster", &self.inputs.roster)] {
            if files.iter().any(|f| f.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "inputs.{kind}: empty file path"
                )));
            }
        }

        if self.upload.max_attempts == 0 {
            return Err(ReconError::ConfigValidation(
                "upload.max_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Week 44"
uploaded_by = "ops"

[inputs]
route = ["route-w44.csv", "route-w44-late.csv"]
roster = ["missing-w44.csv"]

[normalize]
quote_aware = true

[upload]
max_attempts = 5

[output]
json = "report.json"
"#;

    #[test]
    fn parse_valid() {
        let config = AuditConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Week 44");
        assert_eq!(config.uploaded_by, "ops");
        assert_eq!(config.inputs.route.len(), 2);
        assert_eq!(config.inputs.roster, vec!["missing-w44.csv"]);
        assert!(config.normalize.quote_aware);
        assert_eq!(config.upload.max_attempts, 5);
        assert_eq!(config.output.json.as_deref(), Some("report.json"));
    }

    #[test]
    fn defaults_applied() {
        let config = AuditConfig::from_toml(
            r#"
name = "Minimal"
[inputs]
route = ["r.csv"]
"#,
        )
        .unwrap();
        assert_eq!(config.uploaded_by, "cli");
        assert!(config.inputs.roster.is_empty());
        assert!(!config.normalize.quote_aware);
        assert_eq!(config.upload.max_attempts, 3);
        assert!(config.output.json.is_none());
    }

    #[test]
    fn reject_no_inputs() {
        let err = AuditConfig::from_toml("name = \"Empty\"\n[inputs]\n").unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn reject_empty_path() {
        let err = AuditConfig::from_toml(
            "name = \"Bad\"\n[inputs]\nroute = [\"r.csv\"]\nroster = [\" \"]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("inputs.roster"));
    }

    #[test]
    fn reject_zero_attempts() {
        let err = AuditConfig::from_toml(
            "name = \"Bad\"\n[inputs]\nroute = [\"r.csv\"]\n[upload]\nmax_attempts = 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn reject_missing_inputs_table() {
        let err = AuditConfig::from_toml("name = \"Bad\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}

//! Pipeline configuration
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```json
//! { "decimation": { "iterations": 5 }, "welding": null }
//! ```

use meshkit_core::{Error, Result};
use meshkit_simplification::{DecimationConfig, ParallelConfig, WeldConfig};
use meshkit_tessellation::TessellationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which passes to run and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Skipped when `None`
    pub tessellation: Option<TessellationConfig>,
    /// Skipped when `None`
    pub decimation: Option<DecimationConfig>,
    /// Skipped when `None`
    pub welding: Option<WeldConfig>,
    /// Drop vertices no triangle references after the passes
    pub remove_unreferenced: bool,
    pub parallel: ParallelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tessellation: None,
            decimation: Some(DecimationConfig::default()),
            welding: Some(WeldConfig::default()),
            remove_unreferenced: true,
            parallel: ParallelConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// A configuration that runs nothing
    pub fn empty() -> Self {
        Self {
            tessellation: None,
            decimation: None,
            welding: None,
            remove_unreferenced: false,
            parallel: ParallelConfig::default(),
        }
    }

    pub fn with_tessellation(mut self, config: TessellationConfig) -> Self {
        self.tessellation = Some(config);
        self
    }

    pub fn with_decimation(mut self, config: DecimationConfig) -> Self {
        self.decimation = Some(config);
        self
    }

    pub fn with_welding(mut self, config: WeldConfig) -> Self {
        self.welding = Some(config);
        self
    }

    pub fn with_remove_unreferenced(mut self, remove: bool) -> Self {
        self.remove_unreferenced = remove;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse pipeline config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("Failed to serialize pipeline config: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(tessellation) = &self.tessellation {
            tessellation.validate()?;
        }
        if let Some(decimation) = &self.decimation {
            decimation.validate()?;
        }
        if let Some(welding) = &self.welding {
            welding.validate()?;
        }
        if self.parallel.num_threads == Some(0) {
            return Err(Error::InvalidConfig(
                "parallel.num_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_document() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "tessellation": { "min_triangle_area": 0.5 },
                "decimation": { "iterations": 5 },
                "welding": null
            }"#,
        )
        .unwrap();

        let tessellation = config.tessellation.unwrap();
        assert_eq!(tessellation.iterations, 1);
        assert_eq!(tessellation.min_triangle_area, 0.5);
        let decimation = config.decimation.unwrap();
        assert_eq!(decimation.iterations, 5);
        assert_eq!(decimation.max_total_weight, 1.0);
        assert!(config.welding.is_none());
        assert!(config.remove_unreferenced);
        assert!(config.parallel.enabled);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"welding": {"max_weight": -2.0}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = PipelineConfig::from_json_str(r#"{"parallel": {"num_threads": 0}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = PipelineConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = PipelineConfig::empty()
            .with_tessellation(TessellationConfig::default())
            .with_remove_unreferenced(true);
        let json = config.to_json_string().unwrap();
        assert_eq!(PipelineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!("meshkit-config-{}.json", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            write!(file, r#"{{"decimation": {{"max_total_weight": 2.5}}}}"#).unwrap();
        }
        let config = PipelineConfig::from_path(&path).unwrap();
        assert_eq!(config.decimation.unwrap().max_total_weight, 2.5);
        fs::remove_file(&path).unwrap();

        let missing = PipelineConfig::from_path(&path).unwrap_err();
        assert!(matches!(missing, Error::Io(_)));
    }
}

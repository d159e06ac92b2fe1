use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IvrConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Location of the spreadsheet backing the call records.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
    /// Worksheet to read and write. Falls back to the first sheet on load
    /// when the workbook has no sheet with this name.
    pub sheet_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "IVR_Agentic_POC_Sample_Data.xlsx".to_string(),
            sheet_name: "Sheet1".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl IvrConfig {
    /// Load from an optional TOML file, then `IVR__SECTION__KEY` env overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("IVR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = IvrConfig::load("/nonexistent/ivr-config-test").unwrap();
        assert_eq!(config.store.path, "IVR_Agentic_POC_Sample_Data.xlsx");
        assert_eq!(config.store.sheet_name, "Sheet1");
        assert_eq!(config.http.port, 8000);
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn test_file_overrides_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[store]\npath = \"/tmp/calls.xlsx\"\nsheet_name = \"Calls\"\n\n[http]\nhost = \"0.0.0.0\"\nport = 9100"
        )
        .unwrap();

        let config = IvrConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.store.path, "/tmp/calls.xlsx");
        assert_eq!(config.store.sheet_name, "Calls");
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 9100);
        // Section absent from the file keeps its default
        assert_eq!(config.service.log_level, "info");
    }
}

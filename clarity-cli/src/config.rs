//! TOML profile configuration.
//!
//! ```toml
//! [profile]
//! filing_status = "married_joint"
//! jurisdiction = "California"
//! annual_income = "185000"
//!
//! [compare]
//! jurisdictions = ["Puerto Rico", "Texas", "California"]
//!
//! [logging]
//! level = "debug"
//! file = "income-clarity.log"
//!
//! [tables]
//! path = "federal_brackets.csv"
//! tax_year = 2025
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use clarity_core::Money;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "INCOME_CLARITY_CONFIG";

/// File picked up from the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "income-clarity.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClarityConfig {
    pub profile: ProfileConfig,
    pub compare: CompareConfig,
    pub logging: LoggingConfig,
    pub tables: TablesConfig,
}

/// Defaults for `--status`, `--jurisdiction` and `--income`.
///
/// `filing_status` stays a string here so a bad value is reported the same
/// way as a bad flag. `annual_income` takes a number or any string `--income`
/// accepts, such as `"$75,000"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub filing_status: Option<String>,
    pub jurisdiction: Option<String>,
    #[serde(deserialize_with = "deserialize_income")]
    pub annual_income: Option<Money>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IncomeValue {
    Text(String),
    Amount(Money),
}

fn deserialize_income<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    match IncomeValue::deserialize(deserializer)? {
        IncomeValue::Text(text) => Money::parse(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
        IncomeValue::Amount(amount) => Ok(Some(amount)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    pub jurisdictions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TablesConfig {
    pub path: Option<PathBuf>,
    pub tax_year: Option<i32>,
}

impl ClarityConfig {
    pub fn from_toml_str(
        text: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Finds and loads the active config.
    ///
    /// `--config` wins, then `$INCOME_CLARITY_CONFIG`, then
    /// `income-clarity.toml` in the working directory. Only the last one may be
    /// absent; with none of them present the defaults apply.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        Self::resolve_from(
            explicit,
            std::env::var_os(CONFIG_ENV_VAR),
            Path::new(DEFAULT_CONFIG_FILE),
        )
    }

    fn resolve_from(
        explicit: Option<&Path>,
        env_value: Option<OsString>,
        fallback: &Path,
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from));

        let path = match named {
            Some(path) => path,
            None if fallback.is_file() => fallback.to_path_buf(),
            None => {
                debug!("no config file found, using defaults");
                return Ok((Self::default(), None));
            }
        };

        debug!(path = %path.display(), "loading config");
        let config = Self::load(&path)?;
        Ok((config, Some(path)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const FULL: &str = r#"
[profile]
filing_status = "MFJ"
jurisdiction = "California"
annual_income = "185000.50"

[compare]
jurisdictions = ["Puerto Rico", "Texas"]

[logging]
level = "debug"
file = "clarity.log"

[tables]
path = "brackets.csv"
tax_year = 2025
"#;

    fn write_config(
        dir: &Path,
        name: &str,
        text: &str,
    ) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_every_section() {
        let config = ClarityConfig::from_toml_str(FULL, Path::new("test.toml")).unwrap();

        assert_eq!(
            config,
            ClarityConfig {
                profile: ProfileConfig {
                    filing_status: Some("MFJ".to_string()),
                    jurisdiction: Some("California".to_string()),
                    annual_income: Some(Money::new(dec!(185000.50))),
                },
                compare: CompareConfig {
                    jurisdictions: vec!["Puerto Rico".to_string(), "Texas".to_string()],
                },
                logging: LoggingConfig {
                    level: Some("debug".to_string()),
                    file: Some(PathBuf::from("clarity.log")),
                },
                tables: TablesConfig {
                    path: Some(PathBuf::from("brackets.csv")),
                    tax_year: Some(2025),
                },
            }
        );
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = ClarityConfig::from_toml_str("", Path::new("empty.toml")).unwrap();

        assert_eq!(config, ClarityConfig::default());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config =
            ClarityConfig::from_toml_str("[profile]\njurisdiction = \"Texas\"\n", Path::new("p.toml")).unwrap();

        assert_eq!(config.profile.jurisdiction.as_deref(), Some("Texas"));
        assert_eq!(config.profile.annual_income, None);
        assert!(config.compare.jurisdictions.is_empty());
    }

    #[test]
    fn annual_income_accepts_the_same_forms_as_the_flag() {
        for (text, expected) in [
            ("annual_income = \"$75,000\"", dec!(75000)),
            ("annual_income = \"1,234.56\"", dec!(1234.56)),
            ("annual_income = 90000", dec!(90000)),
        ] {
            let config =
                ClarityConfig::from_toml_str(&format!("[profile]\n{text}\n"), Path::new("income.toml")).unwrap();

            assert_eq!(config.profile.annual_income, Some(Money::new(expected)), "{text}");
        }
    }

    #[test]
    fn unparseable_annual_income_is_rejected() {
        let err = ClarityConfig::from_toml_str("[profile]\nannual_income = \"lots\"\n", Path::new("bad.toml"))
            .unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err:?}");
        assert!(err.to_string().contains("lots"), "{err}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ClarityConfig::from_toml_str("[profile]\nincome = 5\n", Path::new("typo.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err:?}");
        assert!(err.to_string().contains("typo.toml"));
    }

    #[test]
    fn explicit_path_wins_over_env_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = write_config(dir.path(), "explicit.toml", "[profile]\njurisdiction = \"Texas\"\n");
        let from_env = write_config(dir.path(), "env.toml", "[profile]\njurisdiction = \"Florida\"\n");
        let fallback = write_config(dir.path(), "fallback.toml", "[profile]\njurisdiction = \"Other\"\n");

        let (config, path) =
            ClarityConfig::resolve_from(Some(&explicit), Some(from_env.clone().into_os_string()), &fallback)
                .unwrap();
        assert_eq!(config.profile.jurisdiction.as_deref(), Some("Texas"));
        assert_eq!(path, Some(explicit));

        let (config, path) =
            ClarityConfig::resolve_from(None, Some(from_env.clone().into_os_string()), &fallback).unwrap();
        assert_eq!(config.profile.jurisdiction.as_deref(), Some("Florida"));
        assert_eq!(path, Some(from_env));

        let (config, _) = ClarityConfig::resolve_from(None, None, &fallback).unwrap();
        assert_eq!(config.profile.jurisdiction.as_deref(), Some("Other"));
    }

    #[test]
    fn missing_fallback_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let (config, path) =
            ClarityConfig::resolve_from(None, None, &dir.path().join("income-clarity.toml")).unwrap();

        assert_eq!(config, ClarityConfig::default());
        assert_eq!(path, None);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = ClarityConfig::resolve_from(Some(&missing), None, Path::new("unused.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(ref p) if *p == missing), "got: {err:?}");
    }

    #[test]
    fn missing_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("from-env.toml");

        let err = ClarityConfig::resolve_from(None, Some(missing.clone().into_os_string()), Path::new("unused.toml"))
            .unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)), "got: {err:?}");
    }
}

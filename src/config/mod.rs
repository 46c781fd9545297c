//! Validator options and the deployment configuration.
//!
//! Options are layered with figment, highest priority last:
//! 1. Built-in defaults (`./apiary.apib`, empty base path, native parser)
//! 2. The `custom.apibValidator` section of `serverless.yml`
//! 3. Environment variables (`APIB_VALIDATOR_*`, e.g. `APIB_VALIDATOR_BASE_PATH`)
//! 4. Command-line overrides

mod error;
mod serverless;

pub use error::ConfigError;
pub use serverless::ServerlessConfig;

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::model::DeclaredEndpoint;
use crate::parse::ParserKind;

/// Prefix of environment variables overriding options.
pub const ENV_PREFIX: &str = "APIB_VALIDATOR_";

fn default_blueprint_file() -> PathBuf {
    PathBuf::from("./apiary.apib")
}

fn default_drafter() -> String {
    "drafter".to_string()
}

/// Where declared endpoints and validator options come from
pub trait ConfigProvider {
    /// HTTP triggers in function declaration order; `None` when the
    /// configuration declares no functions at all.
    fn declared_endpoints(&self) -> Option<&[DeclaredEndpoint]>;

    /// Path of the description document
    fn document_path(&self) -> &Path;

    /// Prefix added to every declared path before matching
    fn base_path(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorOptions {
    /// Description document location.
    #[serde(default = "default_blueprint_file")]
    pub blueprint_file: PathBuf,

    /// Prefix added to declared paths before matching.
    #[serde(default)]
    pub base_path: String,

    #[serde(default)]
    pub parser: ParserKind,

    /// Program used by the drafter parser.
    #[serde(default = "default_drafter")]
    pub drafter: String,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            blueprint_file: default_blueprint_file(),
            base_path: String::new(),
            parser: ParserKind::default(),
            drafter: default_drafter(),
        }
    }
}

/// Options given explicitly, e.g. on the command line
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blueprint_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<ParserKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drafter: Option<String>,
}

impl From<PathBuf> for OptionOverrides {
    fn from(blueprint_file: PathBuf) -> Self {
        Self {
            blueprint_file: Some(blueprint_file),
            ..Default::default()
        }
    }
}

impl ValidatorOptions {
    /// Build the figment provider chain.
    ///
    /// `custom` is the `custom.apibValidator` section of the deployment
    /// configuration, if there is one.
    pub fn figment(custom: Option<&serde_yaml::Value>, overrides: &OptionOverrides) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(custom) = custom {
            figment = figment.merge(Serialized::globals(custom));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).map(|key| camel_case(key.as_str()).into()))
            .merge(Serialized::globals(overrides))
    }

    pub fn load(
        custom: Option<&serde_yaml::Value>,
        overrides: &OptionOverrides,
    ) -> Result<Self, ConfigError> {
        Self::figment(custom, overrides)
            .extract()
            .map_err(ConfigError::from)
    }
}

/// `base_path` -> `basePath`, matching the option names in `serverless.yml`.
fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_correct() {
        let options = ValidatorOptions::default();
        assert_eq!(options.blueprint_file, PathBuf::from("./apiary.apib"));
        assert!(options.base_path.is_empty());
        assert_eq!(options.parser, ParserKind::Native);
        assert_eq!(options.drafter, "drafter");
    }

    #[test]
    fn camel_cases_env_keys() {
        assert_eq!(camel_case("base_path"), "basePath");
        assert_eq!(camel_case("blueprint_file"), "blueprintFile");
        assert_eq!(camel_case("parser"), "parser");
    }

    #[test]
    fn figment_builds_without_sources() {
        Jail::expect_with(|_jail| {
            let options = ValidatorOptions::load(None, &OptionOverrides::default()).expect("options load");
            assert_eq!(options, ValidatorOptions::default());
            Ok(())
        });
    }

    #[test]
    fn custom_section_overrides_defaults() {
        Jail::expect_with(|_jail| {
            let custom: serde_yaml::Value =
                serde_yaml::from_str("blueprintFile: docs/api.apib\nbasePath: /dev\n").unwrap();
            let options = ValidatorOptions::load(Some(&custom), &OptionOverrides::default()).expect("options load");
            assert_eq!(options.blueprint_file, PathBuf::from("docs/api.apib"));
            assert_eq!(options.base_path, "/dev");
            assert_eq!(options.parser, ParserKind::Native);
            Ok(())
        });
    }

    #[test]
    fn env_beats_custom_section() {
        Jail::expect_with(|jail| {
            jail.set_env("APIB_VALIDATOR_BASE_PATH", "/prod");
            jail.set_env("APIB_VALIDATOR_PARSER", "drafter");
            let custom: serde_yaml::Value = serde_yaml::from_str("basePath: /dev\n").unwrap();
            let options = ValidatorOptions::load(Some(&custom), &OptionOverrides::default()).expect("options load");
            assert_eq!(options.base_path, "/prod");
            assert_eq!(options.parser, ParserKind::Drafter);
            Ok(())
        });
    }

    #[test]
    fn overrides_beat_env() {
        Jail::expect_with(|jail| {
            jail.set_env("APIB_VALIDATOR_BASE_PATH", "/prod");
            let overrides = OptionOverrides {
                base_path: Some("/cli".into()),
                parser: Some(ParserKind::Refract),
                ..Default::default()
            };
            let options = ValidatorOptions::load(None, &overrides).expect("options load");
            assert_eq!(options.base_path, "/cli");
            assert_eq!(options.parser, ParserKind::Refract);
            assert_eq!(options.blueprint_file, PathBuf::from("./apiary.apib"));
            Ok(())
        });
    }

    #[test]
    fn rejects_unknown_parser() {
        Jail::expect_with(|_jail| {
            let custom: serde_yaml::Value = serde_yaml::from_str("parser: protagonist\n").unwrap();
            let err = ValidatorOptions::load(Some(&custom), &OptionOverrides::default());
            assert!(matches!(err, Err(ConfigError::Figment(_))));
            Ok(())
        });
    }
}

//! Reading the package variant from the host app
//!
//! A plugin app does not compile in the host's package variant; it has to
//! read it from the host's build constants at runtime. How those constants
//! are reached is platform specific, so it sits behind [`HostVariantSource`].
//!
//! Two sources ship with the crate:
//!
//! - [`HostContext`]: the host's build constants exported as a JSON object
//!   (`{"TERMUX_PACKAGE_VARIANT": "nix-android-8", ...}`)
//! - [`EnvVariantSource`]: an environment variable, for hosts running in the
//!   same process tree
//!
//! Absence of the host is an expected outcome here, not a bug. Callers go
//! through [`fetch_host_variant_name`], which logs and returns `None`.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::Result;

/// Build constant holding the host app's package variant.
pub const BUILD_CONFIG_FIELD_PACKAGE_VARIANT: &str = "TERMUX_PACKAGE_VARIANT";

/// Package name of the host app.
pub const HOST_PACKAGE_NAME: &str = "com.termux";

/// Fully qualified name of the host app's build constants class.
pub const HOST_BUILD_CONFIG_CLASS_NAME: &str = "com.termux.BuildConfig";

/// Default location of the host's exported build constants.
pub const DEFAULT_BUILD_CONFIG_PATH: &str =
    "/data/data/com.termux/files/usr/etc/termux/build-config.json";

/// Failure to read the variant name from the host app.
#[derive(Error, Debug)]
pub enum HostError {
    /// The host app (or its exported constants) is not present
    #[error("Host app {package} not found: {} does not exist", .path.display())]
    NotInstalled { package: String, path: PathBuf },

    /// The constants exist but could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The constants could not be parsed
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The field is not defined by the host
    #[error("Field \"{field}\" not found in {class}")]
    FieldMissing { field: String, class: String },

    /// The field exists but does not hold a string
    #[error("Field \"{field}\" in {class} is not a string")]
    FieldNotString { field: String, class: String },
}

/// Something that can report the host app's raw package variant name.
pub trait HostVariantSource {
    /// Read the raw variant name from the host.
    fn fetch_variant_name(&self) -> std::result::Result<String, HostError>;

    /// Short description of where the value is read from, for diagnostics.
    fn describe(&self) -> String;
}

/// Read the variant name, logging any failure.
///
/// Returns `None` if the host could not be reached or the field is unusable.
pub fn fetch_host_variant_name(source: &dyn HostVariantSource) -> Option<String> {
    match source.fetch_variant_name() {
        Ok(name) => {
            tracing::debug!(
                host = %source.describe(),
                variant = %name,
                "Read package variant from host"
            );
            Some(name)
        }
        Err(e) => {
            tracing::error!(
                host = %source.describe(),
                error = %e,
                "Failed to get \"{}\" value from \"{}\" class",
                BUILD_CONFIG_FIELD_PACKAGE_VARIANT,
                HOST_BUILD_CONFIG_CLASS_NAME
            );
            None
        }
    }
}

/// Location of the host app's exported build constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostContext {
    /// Package name of the host app
    pub package_name: String,
    /// Fully qualified build constants class, used in diagnostics
    pub build_config_class: String,
    /// JSON file with the host's build constants
    pub build_config_path: PathBuf,
}

impl Default for HostContext {
    fn default() -> Self {
        Self {
            package_name: HOST_PACKAGE_NAME.to_string(),
            build_config_class: HOST_BUILD_CONFIG_CLASS_NAME.to_string(),
            build_config_path: PathBuf::from(DEFAULT_BUILD_CONFIG_PATH),
        }
    }
}

impl HostContext {
    /// Host context reading constants from `path`, with default names.
    pub fn with_build_config<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            build_config_path: path.into(),
            ..Self::default()
        }
    }

    /// Load a host context from a JSON file.
    ///
    /// Missing keys fall back to the defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let context: Self = serde_json::from_str(&content)?;
        Ok(context)
    }

    /// Read a single build constant from the host.
    pub fn build_config_field(&self, field: &str) -> std::result::Result<String, HostError> {
        let path = &self.build_config_path;
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => HostError::NotInstalled {
                package: self.package_name.clone(),
                path: path.clone(),
            },
            _ => HostError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let constants: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&content).map_err(|source| HostError::Parse {
                path: path.clone(),
                source,
            })?;

        let value = constants.get(field).ok_or_else(|| HostError::FieldMissing {
            field: field.to_string(),
            class: self.build_config_class.clone(),
        })?;

        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| HostError::FieldNotString {
                field: field.to_string(),
                class: self.build_config_class.clone(),
            })
    }
}

impl HostVariantSource for HostContext {
    fn fetch_variant_name(&self) -> std::result::Result<String, HostError> {
        self.build_config_field(BUILD_CONFIG_FIELD_PACKAGE_VARIANT)
    }

    fn describe(&self) -> String {
        format!(
            "{} ({})",
            self.package_name,
            self.build_config_path.display()
        )
    }
}

/// Reads the variant name from an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVariantSource {
    var: String,
}

impl Default for EnvVariantSource {
    fn default() -> Self {
        Self::new(BUILD_CONFIG_FIELD_PACKAGE_VARIANT)
    }
}

impl EnvVariantSource {
    /// Source reading the variable `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable read
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl HostVariantSource for EnvVariantSource {
    fn fetch_variant_name(&self) -> std::result::Result<String, HostError> {
        env::var(&self.var).map_err(|e| match e {
            env::VarError::NotPresent => HostError::FieldMissing {
                field: self.var.clone(),
                class: "environment".to_string(),
            },
            env::VarError::NotUnicode(_) => HostError::FieldNotString {
                field: self.var.clone(),
                class: "environment".to_string(),
            },
        })
    }

    fn describe(&self) -> String {
        format!("${}", self.var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn build_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_context() {
        let ctx = HostContext::default();
        assert_eq!(ctx.package_name, "com.termux");
        assert_eq!(ctx.build_config_class, "com.termux.BuildConfig");
        assert_eq!(ctx.build_config_path, PathBuf::from(DEFAULT_BUILD_CONFIG_PATH));
    }

    #[test]
    fn test_read_variant_field() {
        let file = build_config(r#"{"TERMUX_PACKAGE_VARIANT": "nix-android-8", "VERSION_CODE": 118}"#);
        let ctx = HostContext::with_build_config(file.path());
        assert_eq!(ctx.fetch_variant_name().unwrap(), "nix-android-8");
    }

    #[test]
    fn test_missing_host() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = HostContext::with_build_config(dir.path().join("absent.json"));
        let err = ctx.fetch_variant_name().unwrap_err();
        assert!(matches!(err, HostError::NotInstalled { .. }));
        assert!(err.to_string().contains("com.termux"));
    }

    #[test]
    fn test_unreadable_path_is_io_not_missing() {
        // Parent is a regular file: the path is unreachable, not absent
        let file = build_config("{}");
        let ctx = HostContext::with_build_config(file.path().join("build-config.json"));
        assert!(matches!(
            ctx.fetch_variant_name().unwrap_err(),
            HostError::Io { .. }
        ));

        let dir = tempfile::tempdir().unwrap();
        let ctx = HostContext::with_build_config(dir.path());
        assert!(matches!(
            ctx.fetch_variant_name().unwrap_err(),
            HostError::Io { .. }
        ));
    }

    #[test]
    fn test_unparseable_constants() {
        let file = build_config("not json");
        let ctx = HostContext::with_build_config(file.path());
        assert!(matches!(
            ctx.fetch_variant_name().unwrap_err(),
            HostError::Parse { .. }
        ));
    }

    #[test]
    fn test_missing_field() {
        let file = build_config(r#"{"VERSION_NAME": "0.119.0"}"#);
        let ctx = HostContext::with_build_config(file.path());
        let err = ctx.fetch_variant_name().unwrap_err();
        assert!(matches!(err, HostError::FieldMissing { .. }));
        assert_eq!(
            err.to_string(),
            "Field \"TERMUX_PACKAGE_VARIANT\" not found in com.termux.BuildConfig"
        );
    }

    #[test]
    fn test_non_string_field() {
        let file = build_config(r#"{"TERMUX_PACKAGE_VARIANT": 8}"#);
        let ctx = HostContext::with_build_config(file.path());
        assert!(matches!(
            ctx.fetch_variant_name().unwrap_err(),
            HostError::FieldNotString { .. }
        ));
    }

    #[test]
    fn test_fetch_wrapper_swallows_errors() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = HostContext::with_build_config(dir.path().join("absent.json"));
        assert_eq!(fetch_host_variant_name(&ctx), None);
    }

    #[test]
    fn test_load_context_with_defaults() {
        let file = build_config(r#"{"build_config_path": "/tmp/host.json"}"#);
        let ctx = HostContext::load_from_file(file.path()).unwrap();
        assert_eq!(ctx.package_name, HOST_PACKAGE_NAME);
        assert_eq!(ctx.build_config_path, PathBuf::from("/tmp/host.json"));
    }

    #[test]
    fn test_load_context_bad_json() {
        let file = build_config("{");
        let err = HostContext::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::error::TermuxBootstrapError::Json(_)));
    }

    #[test]
    fn test_load_context_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = HostContext::load_from_file(dir.path().join("host.json")).unwrap_err();
        assert!(matches!(err, crate::error::TermuxBootstrapError::Io(_)));
    }

    #[test]
    fn test_env_source_missing_var() {
        let source = EnvVariantSource::new("TERMUX_BOOTSTRAP_TEST_UNSET_VARIABLE");
        assert!(matches!(
            source.fetch_variant_name().unwrap_err(),
            HostError::FieldMissing { .. }
        ));
        assert_eq!(source.describe(), "$TERMUX_BOOTSTRAP_TEST_UNSET_VARIABLE");
    }

    #[test]
    fn test_env_source_default_var() {
        assert_eq!(EnvVariantSource::default().var(), "TERMUX_PACKAGE_VARIANT");
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bootstrap: resolve and instantiate a [`TypeCodeFactory`] by name.
//!
//! The implementation name is taken from the first source that sets it:
//!
//! 1. the explicit name passed by the caller
//! 2. the caller's properties map (`ORB_CLASS_KEY`)
//! 3. the process environment (`ORB_CLASS_ENV`)
//! 4. the per-user properties file
//! 5. the per-installation properties file
//! 6. [`DEFAULT_FACTORY`]
//!
//! # Example
//!
//! ```rust
//! use idl_any::locator::{ConfigSource, Locator, DEFAULT_FACTORY};
//! use idl_any::TCKind;
//!
//! let locator = Locator::new();
//! let (name, _source) = locator.resolve(Some(DEFAULT_FACTORY), None).unwrap();
//! assert_eq!(name, DEFAULT_FACTORY);
//!
//! let factory = locator.locate(Some(DEFAULT_FACTORY), None).unwrap();
//! let long = factory.primitive_tc(TCKind::Long).unwrap();
//! assert_eq!(long.kind(), TCKind::Long);
//! ```

use crate::any::Any;
use crate::error::Result;
use crate::typecode::{TCKind, TypeCode};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Properties key naming the factory implementation.
pub const ORB_CLASS_KEY: &str = "org.omg.CORBA.ORBClass";

/// Environment variable naming the factory implementation.
pub const ORB_CLASS_ENV: &str = "IDL_ANY_ORB_CLASS";

/// Name of the built-in factory.
pub const DEFAULT_FACTORY: &str = "standard";

/// Per-installation properties file.
pub const INSTALL_PROPERTIES: &str = "/etc/idl-any/orb.properties";

const USER_PROPERTIES: &str = ".config/idl-any/orb.properties";

/// Locator errors.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown TypeCode factory implementation '{0}'")]
    UnknownImplementation(String),
}

/// Where the resolved implementation name came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit,
    Properties,
    Environment,
    UserFile(PathBuf),
    InstallFile(PathBuf),
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit parameter"),
            Self::Properties => f.write_str("properties map"),
            Self::Environment => write!(f, "environment"),
            Self::UserFile(path) => write!(f, "user file {}", path.display()),
            Self::InstallFile(path) => write!(f, "install file {}", path.display()),
            Self::Default => f.write_str("default"),
        }
    }
}

/// Source of canonical TypeCodes and fresh Anys.
pub trait TypeCodeFactory: Send + Sync {
    /// Registered implementation name.
    fn name(&self) -> &str;

    /// Canonical TypeCode for a parameterless kind.
    fn primitive_tc(&self, kind: TCKind) -> Result<TypeCode>;

    fn create_any(&self) -> Any {
        Any::new()
    }
}

/// Factory backed by the process-wide primitive table.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFactory;

impl TypeCodeFactory for StandardFactory {
    fn name(&self) -> &str {
        DEFAULT_FACTORY
    }

    fn primitive_tc(&self, kind: TCKind) -> Result<TypeCode> {
        TypeCode::primitive(kind)
    }
}

/// Constructor of a factory implementation.
pub type FactoryConstructor = fn() -> Box<dyn TypeCodeFactory>;

/// Name -> constructor map.
pub struct FactoryRegistry {
    constructors: HashMap<String, FactoryConstructor>,
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(DEFAULT_FACTORY, || Box::new(StandardFactory));
        registry
    }
}

impl FactoryRegistry {
    /// Registry containing [`StandardFactory`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register (or replace) an implementation.
    pub fn register(&mut self, name: impl Into<String>, constructor: FactoryConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn create(&self, name: &str) -> std::result::Result<Box<dyn TypeCodeFactory>, LocatorError> {
        self.constructors
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| LocatorError::UnknownImplementation(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Locations consulted by [`Locator::resolve`].
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    pub env_var: String,
    pub user_file: Option<PathBuf>,
    pub install_file: Option<PathBuf>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            env_var: ORB_CLASS_ENV.to_string(),
            user_file: std::env::var_os("HOME").map(|home| PathBuf::from(home).join(USER_PROPERTIES)),
            install_file: Some(PathBuf::from(INSTALL_PROPERTIES)),
        }
    }
}

/// Parse `key=value` / `key: value` lines; `#` and `!` start comments.
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let split = line.find(|c: char| c == '=' || c == ':')?;
            let key = line[..split].trim();
            let value = line[split + 1..].trim();
            (!key.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Load a properties file; a missing file yields `None`.
pub fn load_properties(
    path: &Path,
) -> std::result::Result<Option<HashMap<String, String>>, LocatorError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(parse_properties(&text))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LocatorError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn name_from_file(path: &Path) -> std::result::Result<Option<String>, LocatorError> {
    match load_properties(path)? {
        Some(props) => Ok(non_empty(props.get(ORB_CLASS_KEY).map(String::as_str))),
        None => {
            log::debug!("[locator] {} not found, skipping", path.display());
            Ok(None)
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolves an implementation name and instantiates it.
#[derive(Default)]
pub struct Locator {
    config: LocatorConfig,
    registry: FactoryRegistry,
}

impl Locator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LocatorConfig) -> Self {
        Self {
            config,
            registry: FactoryRegistry::new(),
        }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FactoryRegistry {
        &mut self.registry
    }

    /// Implementation name and the source that supplied it.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        properties: Option<&HashMap<String, String>>,
    ) -> std::result::Result<(String, ConfigSource), LocatorError> {
        if let Some(name) = non_empty(explicit) {
            return Ok(self.found(name, ConfigSource::Explicit));
        }

        let from_map = properties.and_then(|p| p.get(ORB_CLASS_KEY)).map(String::as_str);
        if let Some(name) = non_empty(from_map) {
            return Ok(self.found(name, ConfigSource::Properties));
        }

        if let Some(name) = non_empty(std::env::var(&self.config.env_var).ok().as_deref()) {
            return Ok(self.found(name, ConfigSource::Environment));
        }

        if let Some(path) = &self.config.user_file {
            if let Some(name) = name_from_file(path)? {
                return Ok(self.found(name, ConfigSource::UserFile(path.clone())));
            }
        }

        if let Some(path) = &self.config.install_file {
            if let Some(name) = name_from_file(path)? {
                return Ok(self.found(name, ConfigSource::InstallFile(path.clone())));
            }
        }

        Ok(self.found(DEFAULT_FACTORY.to_string(), ConfigSource::Default))
    }

    fn found(&self, name: String, source: ConfigSource) -> (String, ConfigSource) {
        log::debug!("[locator] factory '{}' from {}", name, source);
        (name, source)
    }

    /// Resolve, then instantiate through the registry.
    pub fn locate(
        &self,
        explicit: Option<&str>,
        properties: Option<&HashMap<String, String>>,
    ) -> std::result::Result<Box<dyn TypeCodeFactory>, LocatorError> {
        let (name, source) = self.resolve(explicit, properties)?;
        self.registry.create(&name).map_err(|e| {
            log::warn!("[locator] '{}' from {} is not registered", name, source);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn isolated(env_var: &str) -> LocatorConfig {
        LocatorConfig {
            env_var: env_var.to_string(),
            user_file: None,
            install_file: None,
        }
    }

    #[test]
    fn test_parse_properties() {
        let props = parse_properties(
            "# comment\n! other comment\n\norg.omg.CORBA.ORBClass = custom\nkey: value:with:colons\nbare\n",
        );
        assert_eq!(props.get(ORB_CLASS_KEY).map(String::as_str), Some("custom"));
        assert_eq!(props.get("key").map(String::as_str), Some("value:with:colons"));
        assert!(!props.contains_key("bare"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_default_when_nothing_set() {
        let locator = Locator::with_config(isolated("IDL_ANY_TEST_UNSET_VAR"));
        let (name, source) = locator.resolve(None, None).unwrap();
        assert_eq!(name, DEFAULT_FACTORY);
        assert_eq!(source, ConfigSource::Default);
    }

    #[test]
    fn test_explicit_wins_over_properties() {
        let locator = Locator::with_config(isolated("IDL_ANY_TEST_UNSET_VAR"));
        let mut props = HashMap::new();
        props.insert(ORB_CLASS_KEY.to_string(), "from-map".to_string());

        let (name, source) = locator.resolve(Some("explicit"), Some(&props)).unwrap();
        assert_eq!((name.as_str(), source), ("explicit", ConfigSource::Explicit));

        let (name, source) = locator.resolve(Some("  "), Some(&props)).unwrap();
        assert_eq!((name.as_str(), source), ("from-map", ConfigSource::Properties));
    }

    #[test]
    fn test_environment() {
        let var = "IDL_ANY_TEST_LOCATOR_ENV";
        std::env::set_var(var, "from-env");
        let locator = Locator::with_config(isolated(var));
        let (name, source) = locator.resolve(None, None).unwrap();
        std::env::remove_var(var);
        assert_eq!(name, "from-env");
        assert_eq!(source, ConfigSource::Environment);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = isolated("IDL_ANY_TEST_UNSET_VAR");
        config.user_file = Some(dir.path().join("absent.properties"));
        let (_, source) = Locator::with_config(config).resolve(None, None).unwrap();
        assert_eq!(source, ConfigSource::Default);
    }

    #[test]
    fn test_user_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}={}", ORB_CLASS_KEY, "from-user").unwrap();
        let mut config = isolated("IDL_ANY_TEST_UNSET_VAR");
        config.user_file = Some(file.path().to_path_buf());

        let (name, source) = Locator::with_config(config).resolve(None, None).unwrap();
        assert_eq!(name, "from-user");
        assert_eq!(source, ConfigSource::UserFile(file.path().to_path_buf()));
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = isolated("IDL_ANY_TEST_UNSET_VAR");
        // A directory cannot be read as a properties file.
        config.install_file = Some(dir.path().to_path_buf());
        let err = Locator::with_config(config).resolve(None, None).unwrap_err();
        assert!(matches!(err, LocatorError::Io { .. }));
    }

    #[test]
    fn test_locate_unknown() {
        let locator = Locator::with_config(isolated("IDL_ANY_TEST_UNSET_VAR"));
        let err = locator.locate(Some("nope"), None).err().unwrap();
        assert!(matches!(err, LocatorError::UnknownImplementation(ref n) if n == "nope"));
    }

    #[test]
    fn test_registry() {
        struct Fixed;
        impl TypeCodeFactory for Fixed {
            fn name(&self) -> &str {
                "fixed"
            }
            fn primitive_tc(&self, _kind: TCKind) -> Result<TypeCode> {
                TypeCode::primitive(TCKind::Octet)
            }
        }

        let mut locator = Locator::with_config(isolated("IDL_ANY_TEST_UNSET_VAR"));
        locator.registry_mut().register("fixed", || Box::new(Fixed));
        assert_eq!(locator.registry().names(), vec!["fixed", "standard"]);

        let factory = locator.locate(Some("fixed"), None).unwrap();
        assert_eq!(factory.name(), "fixed");
        assert_eq!(
            factory.primitive_tc(TCKind::Long).unwrap().kind(),
            TCKind::Octet
        );
        assert!(!factory.create_any().is_typed());
    }
}

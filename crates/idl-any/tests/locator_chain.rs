// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic

//! Locator precedence across all configuration sources.

use idl_any::locator::{
    ConfigSource, Locator, LocatorConfig, LocatorError, TypeCodeFactory, DEFAULT_FACTORY,
    ORB_CLASS_KEY,
};
use idl_any::{Result, TCKind, TypeCode};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

struct Tracing;

impl TypeCodeFactory for Tracing {
    fn name(&self) -> &str {
        "tracing"
    }

    fn primitive_tc(&self, kind: TCKind) -> Result<TypeCode> {
        TypeCode::primitive(kind)
    }
}

fn write_properties(dir: &Path, file: &str, value: &str) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, format!("# generated\n{} = {}\n", ORB_CLASS_KEY, value))
        .expect("write properties");
    path
}

fn config(env_var: &str, user: Option<PathBuf>, install: Option<PathBuf>) -> LocatorConfig {
    LocatorConfig {
        env_var: env_var.to_string(),
        user_file: user,
        install_file: install,
    }
}

#[test]
fn test_user_file_shadows_install_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let user = write_properties(dir.path(), "user.properties", "from-user");
    let install = write_properties(dir.path(), "install.properties", "from-install");

    let locator = Locator::with_config(config(
        "IDL_ANY_CHAIN_UNSET_1",
        Some(user.clone()),
        Some(install.clone()),
    ));
    let (name, source) = locator.resolve(None, None).expect("resolve");
    assert_eq!(name, "from-user");
    assert_eq!(source, ConfigSource::UserFile(user));

    let locator = Locator::with_config(config(
        "IDL_ANY_CHAIN_UNSET_1",
        Some(dir.path().join("missing.properties")),
        Some(install.clone()),
    ));
    let (name, source) = locator.resolve(None, None).expect("resolve");
    assert_eq!(name, "from-install");
    assert_eq!(source, ConfigSource::InstallFile(install));
}

#[test]
fn test_blank_entries_fall_through() {
    let dir = tempfile::tempdir().expect("tempdir");
    let user = write_properties(dir.path(), "user.properties", "   ");
    let install = write_properties(dir.path(), "install.properties", "");

    let mut props = HashMap::new();
    props.insert(ORB_CLASS_KEY.to_string(), String::new());

    let locator = Locator::with_config(config("IDL_ANY_CHAIN_UNSET_2", Some(user), Some(install)));
    let (name, source) = locator.resolve(Some(""), Some(&props)).expect("resolve");
    assert_eq!(name, DEFAULT_FACTORY);
    assert_eq!(source, ConfigSource::Default);
}

#[test]
fn test_environment_shadows_files() {
    let var = "IDL_ANY_CHAIN_ENV_3";
    let dir = tempfile::tempdir().expect("tempdir");
    let user = write_properties(dir.path(), "user.properties", "from-user");

    std::env::set_var(var, "from-env");
    let locator = Locator::with_config(config(var, Some(user), None));
    let resolved = locator.resolve(None, None);
    std::env::remove_var(var);

    let (name, source) = resolved.expect("resolve");
    assert_eq!(name, "from-env");
    assert_eq!(source, ConfigSource::Environment);
}

#[test]
fn test_file_selects_registered_factory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let install = write_properties(dir.path(), "install.properties", "tracing");

    let mut locator = Locator::with_config(config("IDL_ANY_CHAIN_UNSET_4", None, Some(install)));
    locator.registry_mut().register("tracing", || Box::new(Tracing));

    let factory = locator.locate(None, None).expect("locate");
    assert_eq!(factory.name(), "tracing");
    let tc = factory.primitive_tc(TCKind::Double).expect("double");
    assert!(tc.equal(&TypeCode::primitive(TCKind::Double).expect("double")));

    let mut any = factory.create_any();
    any.insert_double(1.5);
    assert_eq!(any.extract_double(), Ok(1.5));
}

#[test]
fn test_unregistered_name_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let user = write_properties(dir.path(), "user.properties", "not-installed");

    let locator = Locator::with_config(config("IDL_ANY_CHAIN_UNSET_5", Some(user), None));
    match locator.locate(None, None) {
        Err(LocatorError::UnknownImplementation(name)) => assert_eq!(name, "not-installed"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(factory) => panic!("unexpected factory {}", factory.name()),
    }
}

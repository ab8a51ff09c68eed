// src/profile.rs

//! Profile files: settings, options and kitchen configuration in TOML
//!
//! ```toml
//! [settings]
//! os = "Linux"
//! arch = "x86_64"
//! build_type = "Release"
//!
//! [settings.compiler]
//! name = "gcc"
//! version = "11"
//!
//! [options]
//! shared = true
//!
//! [kitchen]
//! cache_dir = "/var/cache/glfw-recipe"
//! jobs = 8
//! ```
//!
//! Every section is optional. Missing settings are detected from the host,
//! missing options take their defaults. Command-line `key=value` overrides
//! are applied on top of the file.

use crate::error::{Error, Result};
use crate::options::OptionSet;
use crate::recipe::KitchenConfig;
use crate::settings::{Arch, BuildType, Compiler, Os, Settings, Toolchain};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed profile file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub settings: SettingsProfile,
    pub options: BTreeMap<String, bool>,
    pub kitchen: KitchenProfile,
}

/// Settings as written in a profile, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsProfile {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub build_type: Option<String>,
    pub compiler: CompilerProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerProfile {
    pub name: Option<String>,
    pub version: Option<String>,
    pub runtime: Option<String>,
    pub libcxx: Option<String>,
    pub cppstd: Option<String>,
}

/// Kitchen configuration as written in a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KitchenProfile {
    pub cache_dir: Option<PathBuf>,
    pub jobs: Option<u32>,
    pub cmake: Option<PathBuf>,
    pub source_sha256: Option<String>,
}

impl Profile {
    /// Load a profile from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read profile {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse a profile from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validated settings, after applying `key=value` overrides
    pub fn settings(&self, overrides: &[String]) -> Result<Settings> {
        let mut raw = self.settings.clone();
        for assignment in overrides {
            raw.apply_override(assignment)?;
        }
        raw.resolve()
    }

    /// Option set, after applying `name=value` overrides
    pub fn options(&self, overrides: &[String]) -> Result<OptionSet> {
        let mut options = OptionSet::default();
        for (name, value) in &self.options {
            options.set(name, *value)?;
        }
        for assignment in overrides {
            options.apply_override(assignment)?;
        }
        Ok(options)
    }

    /// Kitchen configuration with profile values over the defaults
    pub fn kitchen_config(&self) -> KitchenConfig {
        let mut config = KitchenConfig::default();
        let kitchen = &self.kitchen;
        if let Some(dir) = &kitchen.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(jobs) = kitchen.jobs {
            config.jobs = jobs.max(1);
        }
        if kitchen.cmake.is_some() {
            config.cmake = kitchen.cmake.clone();
        }
        if kitchen.source_sha256.is_some() {
            config.source_sha256 = kitchen.source_sha256.clone();
        }
        config
    }
}

impl SettingsProfile {
    /// Apply one `key=value` setting override; an empty value unsets the key
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            Error::ParseError(format!(
                "setting override '{}' must have the form key=value",
                assignment
            ))
        })?;
        let value = Some(value.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        match key.trim() {
            "os" => self.os = value,
            "arch" => self.arch = value,
            "build_type" => self.build_type = value,
            "compiler" => self.compiler.name = value,
            "compiler.version" => self.compiler.version = value,
            "compiler.runtime" => self.compiler.runtime = value,
            "compiler.libcxx" => self.compiler.libcxx = value,
            "compiler.cppstd" => self.compiler.cppstd = value,
            other => {
                return Err(Error::InvalidSetting(format!("unknown setting '{}'", other)));
            }
        }
        Ok(())
    }

    /// Validate into typed settings, detecting anything left unset
    pub fn resolve(&self) -> Result<Settings> {
        let os = match &self.os {
            Some(os) => os.parse::<Os>()?,
            None => Os::detect(),
        };
        let arch = match &self.arch {
            Some(arch) => arch.parse::<Arch>()?,
            None => Arch::detect(),
        };
        let build_type = match &self.build_type {
            Some(bt) => bt.parse::<BuildType>()?,
            None => BuildType::default(),
        };

        let name = self
            .compiler
            .name
            .clone()
            .unwrap_or_else(|| Toolchain::default_for(os, build_type).name().to_string());
        let mut compiler = Compiler::resolve(&name, self.compiler.runtime.as_deref(), build_type)?;
        compiler.version = self.compiler.version.clone();
        compiler.libcxx = self.compiler.libcxx.clone();
        compiler.cppstd = self.compiler.cppstd.clone();

        Ok(Settings {
            os,
            arch,
            build_type,
            compiler,
        })
    }
}

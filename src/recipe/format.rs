// src/recipe/format.rs

//! Package identity and requirement references

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Immutable identity of the packaged library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageIdentity {
    pub name: &'static str,
    pub version: &'static str,
    /// SPDX license identifier
    pub license: &'static str,
    pub description: &'static str,
    pub homepage: &'static str,
    /// Where the recipe itself is maintained
    pub url: &'static str,
    pub topics: &'static [&'static str],
    /// Upstream archive location; `{version}` is substituted
    pub source_url_template: &'static str,
}

/// GLFW 3.3.2
pub const GLFW: PackageIdentity = PackageIdentity {
    name: "glfw",
    version: "3.3.2",
    license: "Zlib",
    description: "GLFW is a free, Open Source, multi-platform library for OpenGL, OpenGL ES and Vulkan \
                  application development. It provides a simple, platform-independent API for creating \
                  windows, contexts and surfaces, reading input, handling events, etc.",
    homepage: "https://github.com/glfw/glfw",
    url: "https://github.com/conan-io/conan-center-index",
    topics: &["conan", "gflw", "opengl", "vulkan", "opengl-es"],
    source_url_template: "https://github.com/glfw/glfw/archive/{version}.zip",
};

impl PackageIdentity {
    /// `name/version`
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// Upstream archive URL for this version
    pub fn source_url(&self) -> String {
        self.source_url_template.replace("{version}", self.version)
    }

    /// Local filename for the downloaded archive
    pub fn archive_filename(&self) -> String {
        let extension = self
            .source_url_template
            .rsplit('/')
            .next()
            .and_then(|last| last.split_once('.'))
            .map(|(_, ext)| ext)
            .unwrap_or("zip");
        format!("{}-{}.{}", self.name, self.version, extension)
    }

    /// Root directory inside the upstream archive
    pub fn extracted_dir(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// A `name/version` reference to another package
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Requirement {
    pub name: String,
    pub version: String,
}

impl Requirement {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

impl FromStr for Requirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((name, version))
                if !name.is_empty() && !version.is_empty() && !version.contains('/') =>
            {
                Ok(Self::new(name, version))
            }
            _ => Err(Error::ParseError(format!(
                "invalid requirement '{}' (expected name/version)",
                s
            ))),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Requirement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

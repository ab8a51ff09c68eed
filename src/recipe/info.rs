// src/recipe/info.rs

//! Consumer-facing package metadata
//!
//! [`CppInfo`] is what downstream packages link against: library names,
//! system libraries and frameworks, and the directories inside the package
//! folder. [`PackageManifest`] wraps it together with the configuration the
//! package was built for and is stored as JSON next to the package files.

use crate::error::Result;
use crate::recipe::format::Requirement;
use crate::settings::Os;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Key under [`CppInfo::names`] holding the pkg-config module name
pub const PKG_CONFIG: &str = "pkg_config";

/// File name of the manifest inside the package folder
pub const MANIFEST_FILE: &str = "package_metadata.json";

/// Link information exported to consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CppInfo {
    /// Per-generator names (e.g. `pkg_config -> glfw3`)
    pub names: BTreeMap<String, String>,
    pub libs: Vec<String>,
    pub system_libs: Vec<String>,
    pub frameworks: Vec<String>,
    pub includedirs: Vec<String>,
    pub libdirs: Vec<String>,
    pub bindirs: Vec<String>,
}

impl Default for CppInfo {
    fn default() -> Self {
        Self {
            names: BTreeMap::new(),
            libs: Vec::new(),
            system_libs: Vec::new(),
            frameworks: Vec::new(),
            includedirs: vec!["include".to_string()],
            libdirs: vec!["lib".to_string()],
            bindirs: vec!["bin".to_string()],
        }
    }
}

impl CppInfo {
    pub fn pkg_config_name(&self) -> Option<&str> {
        self.names.get(PKG_CONFIG).map(String::as_str)
    }

    /// Render a pkg-config `.pc` file rooted at `prefix`
    pub fn pkg_config(&self, prefix: &Path, name: &str, version: &str, description: &str) -> String {
        let module = self.pkg_config_name().unwrap_or(name);
        let libdir = self.libdirs.first().map(String::as_str).unwrap_or("lib");
        let includedir = self.includedirs.first().map(String::as_str).unwrap_or("include");

        let mut libs = vec!["-L${libdir}".to_string()];
        libs.extend(self.libs.iter().map(|l| format!("-l{}", l)));
        libs.extend(self.system_libs.iter().map(|l| format!("-l{}", l)));
        libs.extend(self.frameworks.iter().map(|f| format!("-framework {}", f)));

        format!(
            "prefix={prefix}\n\
             libdir=${{prefix}}/{libdir}\n\
             includedir=${{prefix}}/{includedir}\n\
             \n\
             Name: {module}\n\
             Description: {description}\n\
             Version: {version}\n\
             Libs: {libs}\n\
             Cflags: -I${{includedir}}\n",
            prefix = prefix.display(),
            libs = libs.join(" "),
        )
    }
}

/// System libraries a GLFW consumer must link on `os`
pub fn system_libs(os: Os) -> &'static [&'static str] {
    match os {
        Os::Linux => &["m", "pthread", "dl", "rt"],
        _ => &[],
    }
}

/// Platform frameworks a GLFW consumer must link on `os`
pub fn frameworks(os: Os) -> &'static [&'static str] {
    match os {
        Os::Macos => &["Cocoa", "IOKit", "CoreFoundation"],
        _ => &[],
    }
}

/// Collect the link names of every library file directly inside `lib_dir`
///
/// A missing directory yields an empty list. Versioned shared objects and
/// their symlinks collapse to one name; the result is sorted.
pub fn collect_libs(lib_dir: &Path) -> Result<Vec<String>> {
    if !lib_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut libs = Vec::new();
    for entry in fs::read_dir(lib_dir)? {
        let entry = entry?;
        if entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str().and_then(lib_name) {
            libs.push(name);
        }
    }

    libs.sort();
    libs.dedup();
    Ok(libs)
}

/// Link name for a library file, or `None` if the file is not a library
fn lib_name(file_name: &str) -> Option<String> {
    if let Some(stem) = file_name.strip_suffix(".lib") {
        return Some(stem.to_string());
    }

    let stem = if let Some(stem) = file_name.strip_suffix(".dll.a") {
        stem
    } else if let Some(stem) = file_name.strip_suffix(".a") {
        stem
    } else if let Some(stem) = file_name.strip_suffix(".dylib") {
        // libglfw.3.3.dylib -> libglfw
        stem.split('.').next().unwrap_or(stem)
    } else if let Some(pos) = file_name.find(".so") {
        // libglfw.so, libglfw.so.3, libglfw.so.3.3
        let rest = &file_name[pos + 3..];
        if !(rest.is_empty() || rest.starts_with('.')) {
            return None;
        }
        &file_name[..pos]
    } else {
        return None;
    };

    let name = stem.strip_prefix("lib").unwrap_or(stem);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Metadata stored alongside a cooked package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// `name/version`
    pub reference: String,
    pub package_id: String,
    pub license: String,
    pub homepage: String,
    pub settings: BTreeMap<String, String>,
    pub options: BTreeMap<String, bool>,
    pub requires: Vec<Requirement>,
    pub cpp_info: CppInfo,
}

impl PackageManifest {
    /// Read the manifest from a package folder
    pub fn load(package_dir: &Path) -> Result<Self> {
        let content = fs::read_to_string(package_dir.join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the manifest into a package folder
    pub fn save(&self, package_dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(package_dir.join(MANIFEST_FILE), content)?;
        Ok(())
    }
}

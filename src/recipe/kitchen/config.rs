// src/recipe/kitchen/config.rs

//! Configuration and folder layout for the Kitchen

use crate::recipe::format::{PackageIdentity, Requirement};
use crate::recipe::info::CppInfo;
use std::path::{Path, PathBuf};

use super::process::find_tool;

/// Environment variable overriding the default cache directory
pub const CACHE_DIR_ENV: &str = "GLFW_RECIPE_HOME";

/// Folder the extracted upstream tree is moved to, inside the source folder
pub const SOURCE_SUBFOLDER: &str = "source_subfolder";

/// CMake binary directory, inside the build folder
pub const BUILD_SUBFOLDER: &str = "build_subfolder";

/// Configuration for the Kitchen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitchenConfig {
    /// Root of the local package cache
    pub cache_dir: PathBuf,
    /// Parallel build jobs passed to CMake
    pub jobs: u32,
    /// CMake executable; looked up on `PATH` when unset
    pub cmake: Option<PathBuf>,
    /// Pinned SHA-256 of the upstream archive
    pub source_sha256: Option<String>,
    /// Fetch sources again even if a prepared source folder exists
    pub force_source: bool,
    /// Show a progress bar while downloading
    pub show_progress: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        Self {
            cache_dir: default_cache_dir(),
            jobs,
            cmake: None,
            source_sha256: None,
            force_source: false,
            show_progress: false,
        }
    }
}

impl KitchenConfig {
    /// Configuration rooted at `cache_dir`, other values default
    pub fn with_cache_dir(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            ..Self::default()
        }
    }

    /// CMake program to invoke
    pub fn cmake_program(&self) -> PathBuf {
        self.cmake
            .clone()
            .or_else(|| find_tool("cmake").ok())
            .unwrap_or_else(|| PathBuf::from("cmake"))
    }

    /// Where downloaded archives are kept
    pub fn download_dir(&self) -> PathBuf {
        self.cache_dir.join("downloads")
    }
}

/// Cache directory used when none is configured
pub fn default_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::cache_dir()
        .map(|d| d.join("glfw-recipe"))
        .unwrap_or_else(|| PathBuf::from("/var/cache/glfw-recipe"))
}

/// Folders of one recipe configuration inside the cache
///
/// ```text
/// <cache>/<name>/<version>/source/source_subfolder
/// <cache>/<name>/<version>/build/<package_id>/build_subfolder
/// <cache>/<name>/<version>/package/<package_id>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub package_dir: PathBuf,
}

impl Layout {
    pub fn new(cache_dir: &Path, identity: &PackageIdentity, package_id: &str) -> Self {
        let root = cache_dir.join(identity.name).join(identity.version);
        Self {
            source_dir: root.join("source"),
            build_dir: root.join("build").join(package_id),
            package_dir: root.join("package").join(package_id),
        }
    }

    pub fn source_subfolder(&self) -> PathBuf {
        self.source_dir.join(SOURCE_SUBFOLDER)
    }

    pub fn build_subfolder(&self) -> PathBuf {
        self.build_dir.join(BUILD_SUBFOLDER)
    }
}

/// Result of cooking a recipe
#[derive(Debug, Clone)]
pub struct CookResult {
    pub package_id: String,
    pub layout: Layout,
    pub requirements: Vec<Requirement>,
    pub cpp_info: CppInfo,
    /// Path of the written package manifest
    pub manifest_path: PathBuf,
}

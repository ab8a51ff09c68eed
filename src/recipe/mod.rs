// src/recipe/mod.rs

//! The GLFW recipe
//!
//! A recipe declares what is being packaged and how its configuration
//! reacts to the target platform. The hooks run in a fixed order, driven by
//! the [`Kitchen`]:
//!
//! 1. **config_options**: drop options that make no sense on the target OS
//! 2. **configure**: normalize options and settings
//! 3. **requirements**: declare upstream packages
//! 4. **source / build / package**: performed by a [`Cook`]
//! 5. **package_info**: describe the result to consumers
//!
//! All compiler decisions are left to GLFW's own CMake build; the recipe only
//! threads settings into it and describes the output.

mod format;
pub mod info;
pub mod kitchen;
pub mod package_id;

pub use format::{GLFW, PackageIdentity, Requirement};
pub use info::{CppInfo, PackageManifest};
pub use kitchen::{Cook, CookResult, Kitchen, KitchenConfig, Layout};

use crate::error::Result;
use crate::options::OptionSet;
use crate::settings::{Os, Settings};
use kitchen::archive::SourceSpec;
use std::path::Path;
use tracing::debug;

/// CMake entry file substituted for the upstream one
pub const WRAPPER_CMAKELISTS: &str = include_str!("../../assets/CMakeLists.txt");

/// Name the upstream CMakeLists.txt is moved to
pub const ORIGINAL_CMAKELISTS: &str = "CMakeLists_original.txt";

/// pkg-config module name GLFW is known by
pub const PKG_CONFIG_NAME: &str = "glfw3";

/// One recipe instance: identity plus the configuration it is built for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub identity: PackageIdentity,
    pub settings: Settings,
    pub options: OptionSet,
}

impl Recipe {
    /// GLFW recipe for the given settings and options
    pub fn new(settings: Settings, options: OptionSet) -> Self {
        Self {
            identity: GLFW,
            settings,
            options,
        }
    }

    /// Recipe with both option hooks already applied
    pub fn configured(settings: Settings, options: OptionSet) -> Self {
        let mut recipe = Self::new(settings, options);
        recipe.config_options();
        recipe.configure();
        recipe
    }

    /// Remove options that do not apply to the target OS
    pub fn config_options(&mut self) {
        if self.settings.os == Os::Windows {
            debug!("Removing fPIC: not applicable on Windows");
            self.options.remove_fpic();
        }
    }

    /// Normalize options and strip settings that do not affect the binary
    pub fn configure(&mut self) {
        if self.options.shared {
            debug!("Removing fPIC: implied by shared build");
            self.options.remove_fpic();
        }
        self.settings.compiler.strip_cxx_abi();
    }

    /// Upstream packages this configuration needs
    pub fn requirements(&self) -> Vec<Requirement> {
        let mut requires = Vec::new();
        if !self.options.no_opengl {
            requires.push(Requirement::new("opengl", "system"));
        }
        if self.settings.os == Os::Linux && !self.options.no_xorg {
            requires.push(Requirement::new("xorg", "system"));
        }
        requires
    }

    /// Binary compatibility key of this configuration
    pub fn package_id(&self) -> String {
        package_id::package_id(&self.settings, &self.options)
    }

    /// Upstream archive to fetch
    pub fn source_spec(&self, sha256: Option<String>) -> SourceSpec {
        SourceSpec {
            url: self.identity.source_url(),
            filename: self.identity.archive_filename(),
            sha256,
        }
    }

    /// Describe a package folder to consumers
    pub fn package_info(&self, package_dir: &Path) -> Result<CppInfo> {
        let mut cpp_info = CppInfo::default();
        cpp_info
            .names
            .insert(info::PKG_CONFIG.to_string(), PKG_CONFIG_NAME.to_string());
        cpp_info.libs = info::collect_libs(&package_dir.join("lib"))?;
        cpp_info
            .system_libs
            .extend(info::system_libs(self.settings.os).iter().map(|s| s.to_string()));
        cpp_info
            .frameworks
            .extend(info::frameworks(self.settings.os).iter().map(|s| s.to_string()));
        Ok(cpp_info)
    }

    /// Manifest for a cooked package folder
    pub fn manifest(&self, cpp_info: CppInfo) -> PackageManifest {
        PackageManifest {
            reference: self.identity.reference(),
            package_id: self.package_id(),
            license: self.identity.license.to_string(),
            homepage: self.identity.homepage.to_string(),
            settings: self.settings.to_pairs(),
            options: self
                .options
                .to_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            requires: self.requirements(),
            cpp_info,
        }
    }
}

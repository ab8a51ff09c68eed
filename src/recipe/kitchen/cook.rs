// src/recipe/kitchen/cook.rs

//! Cook: the source, build and package phases of one recipe execution

use crate::error::{Error, Result};
use crate::recipe::{ORIGINAL_CMAKELISTS, Recipe, WRAPPER_CMAKELISTS};
use crate::settings::Os;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::Kitchen;
use super::cmake::CMake;
use super::config::Layout;
use super::process::CommandSpec;

/// A single cook operation
///
/// Owns the build handle: it is created and configured the first time a
/// phase needs it and reused afterwards, so CMake configures at most once
/// per cook.
pub struct Cook<'a> {
    kitchen: &'a Kitchen,
    recipe: &'a Recipe,
    layout: Layout,
    cmake: Option<CMake>,
}

impl<'a> Cook<'a> {
    pub(super) fn new(kitchen: &'a Kitchen, recipe: &'a Recipe) -> Self {
        let layout = kitchen.layout_for(recipe);
        Self {
            kitchen,
            recipe,
            layout,
            cmake: None,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Whether the build handle has been created yet
    pub fn has_build_handle(&self) -> bool {
        self.cmake.is_some()
    }

    /// Fetch the upstream archive and substitute the wrapper CMakeLists.txt
    pub fn source(&mut self) -> Result<()> {
        let files = self.kitchen.files.as_ref();
        let subfolder = self.layout.source_subfolder();

        if !self.kitchen.config.force_source && sources_prepared(&subfolder) {
            info!("Using cached sources in {}", subfolder.display());
            return Ok(());
        }

        info!("Fetching sources for {}", self.recipe.identity.reference());
        files.remove_dir(&self.layout.source_dir)?;
        files.create_dir(&self.layout.source_dir)?;

        let spec = self
            .recipe
            .source_spec(self.kitchen.config.source_sha256.clone());
        self.kitchen.fetcher.fetch(&spec, &self.layout.source_dir)?;

        let extracted = self
            .layout
            .source_dir
            .join(self.recipe.identity.extracted_dir());
        files.rename(&extracted, &subfolder)?;

        // Upstream's file does not forward architecture flags such as -m32
        files.rename(
            &subfolder.join("CMakeLists.txt"),
            &subfolder.join(ORIGINAL_CMAKELISTS),
        )?;
        files.write(
            &subfolder.join("CMakeLists.txt"),
            WRAPPER_CMAKELISTS.as_bytes(),
        )?;
        debug!("Substituted wrapper CMakeLists.txt in {}", subfolder.display());

        Ok(())
    }

    /// The build handle, configured on first use
    pub fn configure_cmake(&mut self) -> Result<&CMake> {
        let cmake = match self.cmake.take() {
            Some(cmake) => cmake,
            None => {
                let cmake = self.new_cmake();
                cmake.configure(self.kitchen.runner.as_ref())?;
                cmake
            }
        };
        let cmake: &CMake = self.cmake.insert(cmake);
        Ok(cmake)
    }

    fn new_cmake(&self) -> CMake {
        let settings = &self.recipe.settings;
        let options = &self.recipe.options;

        let mut cmake = CMake::new(
            self.kitchen.config.cmake_program(),
            &self.layout.source_subfolder(),
            &self.layout.build_subfolder(),
            settings,
            self.kitchen.config.jobs,
        );

        cmake.define(
            "CMAKE_INSTALL_PREFIX",
            &self.layout.package_dir.to_string_lossy(),
        );
        cmake.define_bool("BUILD_SHARED_LIBS", options.shared);
        if let Some(fpic) = options.fpic {
            cmake.define_bool("CMAKE_POSITION_INDEPENDENT_CODE", fpic);
        }

        // GLFW 3.3.2 declares a minimum that CMake 4 no longer accepts
        cmake.define("CMAKE_POLICY_VERSION_MINIMUM", "3.5");
        cmake.define_bool("GLFW_BUILD_EXAMPLES", false);
        cmake.define_bool("GLFW_BUILD_TESTS", false);
        cmake.define_bool("GLFW_BUILD_DOCS", false);
        if let Some(dynamic) = settings.compiler.toolchain.msvc_dynamic_runtime() {
            cmake.define_bool("USE_MSVC_RUNTIME_LIBRARY_DLL", dynamic);
        }

        cmake
    }

    /// Compile, then fix install names of macOS dylibs
    pub fn build(&mut self) -> Result<()> {
        let kitchen = self.kitchen;
        let cmake = self.configure_cmake()?;
        cmake.build(kitchen.runner.as_ref())?;

        if self.recipe.settings.os == Os::Macos && self.recipe.options.shared {
            self.fix_install_names()?;
        }
        Ok(())
    }

    /// Set each built dylib's install id to its bare file name
    ///
    /// The linker records the absolute build-tree path otherwise, which
    /// breaks the package once it is moved.
    fn fix_install_names(&self) -> Result<()> {
        let lib_dir = self.layout.build_subfolder().join("src");
        let dylibs = self.kitchen.files.find(&lib_dir, "*.dylib")?;

        for dylib in &dylibs {
            let Some(name) = dylib.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            debug!("Fixing install name of {}", name);
            let cmd = CommandSpec::new("install_name_tool")
                .args(["-id", name, name])
                .current_dir(&lib_dir);
            self.kitchen.runner.run(&cmd)?;
        }

        info!("Fixed install names of {} dylib(s)", dylibs.len());
        Ok(())
    }

    /// Install into the package folder and drop upstream consumer metadata
    pub fn package(&mut self) -> Result<()> {
        let kitchen = self.kitchen;
        let files = kitchen.files.as_ref();
        let package_dir = self.layout.package_dir.clone();

        let licenses = files.copy_matching(
            &self.layout.source_subfolder(),
            "LICENSE*",
            &package_dir.join("licenses"),
        )?;
        if licenses.is_empty() {
            return Err(Error::NotFound(format!(
                "no LICENSE* file in {}",
                self.layout.source_subfolder().display()
            )));
        }

        let cmake = self.configure_cmake()?;
        cmake.install(kitchen.runner.as_ref())?;

        // Consumers get the recipe's own metadata instead
        files.remove_dir(&package_dir.join("lib").join("cmake"))?;
        files.remove_dir(&package_dir.join("lib").join("pkgconfig"))?;

        info!("Packaged {} into {}", self.recipe.identity.reference(), package_dir.display());
        Ok(())
    }
}

/// Whether `subfolder` holds a fully prepared source tree
///
/// The wrapper is written last, so a tree left behind by an interrupted
/// source phase does not qualify.
fn sources_prepared(subfolder: &Path) -> bool {
    subfolder.join(ORIGINAL_CMAKELISTS).is_file()
        && fs::read_to_string(subfolder.join("CMakeLists.txt"))
            .is_ok_and(|content| content == WRAPPER_CMAKELISTS)
}

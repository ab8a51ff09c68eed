// src/recipe/kitchen/cmake.rs

//! CMake build handle
//!
//! One [`CMake`] value describes one configured binary directory: the cache
//! definitions, generator platform and folders. It is configured once and
//! then reused for the build and install steps.

use crate::error::Result;
use crate::settings::{Arch, BuildType, Settings, Toolchain};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use super::process::{CommandSpec, ProcessRunner};

/// Cache variable the wrapper CMakeLists.txt appends to compiler and linker flags
pub const ARCH_FLAGS_VAR: &str = "RECIPE_ARCH_FLAGS";

/// A configured CMake binary directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMake {
    program: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
    build_type: BuildType,
    /// `-A` value for Visual Studio generators
    generator_platform: Option<&'static str>,
    /// Visual Studio generators pick the configuration at build time
    multi_config: bool,
    jobs: u32,
    definitions: BTreeMap<String, String>,
}

impl CMake {
    /// Handle for `source_dir`, with the definitions implied by `settings`
    pub fn new(
        program: PathBuf,
        source_dir: &Path,
        build_dir: &Path,
        settings: &Settings,
        jobs: u32,
    ) -> Self {
        let multi_config = matches!(settings.compiler.toolchain, Toolchain::Msvc { .. });
        let mut cmake = Self {
            program,
            source_dir: source_dir.to_path_buf(),
            build_dir: build_dir.to_path_buf(),
            build_type: settings.build_type,
            generator_platform: None,
            multi_config,
            jobs,
            definitions: BTreeMap::new(),
        };

        if !multi_config {
            cmake.define("CMAKE_BUILD_TYPE", settings.build_type.as_str());
        }
        cmake.define("CMAKE_INSTALL_LIBDIR", "lib");

        match settings.compiler.toolchain {
            Toolchain::Msvc { .. } => {
                cmake.generator_platform = Some(match settings.arch {
                    Arch::X86 => "Win32",
                    Arch::X86_64 => "x64",
                    Arch::Armv7 => "ARM",
                    Arch::Armv8 => "ARM64",
                });
            }
            Toolchain::AppleClang => {
                let osx_arch = match settings.arch {
                    Arch::X86 => "i386",
                    Arch::X86_64 => "x86_64",
                    Arch::Armv7 => "armv7",
                    Arch::Armv8 => "arm64",
                };
                cmake.define("CMAKE_OSX_ARCHITECTURES", osx_arch);
            }
            Toolchain::Gcc | Toolchain::Clang => match settings.arch {
                Arch::X86 => cmake.define(ARCH_FLAGS_VAR, "-m32"),
                Arch::X86_64 => cmake.define(ARCH_FLAGS_VAR, "-m64"),
                Arch::Armv7 | Arch::Armv8 => {}
            },
        }

        cmake
    }

    /// Set a cache definition
    pub fn define(&mut self, key: &str, value: &str) {
        self.definitions.insert(key.to_string(), value.to_string());
    }

    /// Set a boolean cache definition (`ON`/`OFF`)
    pub fn define_bool(&mut self, key: &str, value: bool) {
        self.define(key, if value { "ON" } else { "OFF" });
    }

    pub fn definition(&self, key: &str) -> Option<&str> {
        self.definitions.get(key).map(String::as_str)
    }

    /// `cmake -S <src> -B <build> [-A <platform>] -D...`
    pub fn configure_command(&self) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.program)
            .arg("-S")
            .arg(self.source_dir.to_string_lossy())
            .arg("-B")
            .arg(self.build_dir.to_string_lossy());
        if let Some(platform) = self.generator_platform {
            cmd = cmd.args(["-A", platform]);
        }
        for (key, value) in &self.definitions {
            cmd = cmd.arg(format!("-D{}={}", key, value));
        }
        cmd
    }

    /// `cmake --build <build> --config <type> --parallel <jobs>`
    pub fn build_command(&self) -> CommandSpec {
        CommandSpec::new(&self.program)
            .arg("--build")
            .arg(self.build_dir.to_string_lossy())
            .args(["--config", self.build_type.as_str()])
            .args(["--parallel".to_string(), self.jobs.to_string()])
    }

    /// `cmake --install <build> --config <type>`
    pub fn install_command(&self) -> CommandSpec {
        CommandSpec::new(&self.program)
            .arg("--install")
            .arg(self.build_dir.to_string_lossy())
            .args(["--config", self.build_type.as_str()])
    }

    pub fn configure(&self, runner: &dyn ProcessRunner) -> Result<()> {
        info!("Running configure phase in {}", self.build_dir.display());
        runner.run(&self.configure_command())?;
        Ok(())
    }

    pub fn build(&self, runner: &dyn ProcessRunner) -> Result<()> {
        info!("Running build phase");
        runner.run(&self.build_command())?;
        Ok(())
    }

    pub fn install(&self, runner: &dyn ProcessRunner) -> Result<()> {
        info!("Running install phase");
        runner.run(&self.install_command())?;
        Ok(())
    }
}

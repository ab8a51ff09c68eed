// src/settings.rs

//! Platform settings the recipe branches on
//!
//! Settings are supplied by the caller (profile file, command line, or host
//! detection) and are read-only for the recipe, except that the configure
//! hook drops the C++ ABI fields of the compiler: GLFW's public interface is
//! plain C, so the caller's C++ standard library does not change the binary.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    Linux,
    Macos,
    FreeBSD,
}

impl Os {
    pub const ALL: [Os; 4] = [Os::Windows, Os::Linux, Os::Macos, Os::FreeBSD];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::Macos => "Macos",
            Self::FreeBSD => "FreeBSD",
        }
    }

    /// Operating system of the running host
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::Macos,
            "freebsd" => Self::FreeBSD,
            _ => Self::Linux,
        }
    }
}

impl FromStr for Os {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" => Ok(Self::Macos),
            "freebsd" => Ok(Self::FreeBSD),
            _ => Err(Error::InvalidSetting(format!("unknown os '{}'", s))),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X86_64,
    Armv7,
    Armv8,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Armv7 => "armv7",
            Self::Armv8 => "armv8",
        }
    }

    /// Architecture of the running host
    pub fn detect() -> Self {
        match std::env::consts::ARCH {
            "x86" => Self::X86,
            "arm" => Self::Armv7,
            "aarch64" => Self::Armv8,
            _ => Self::X86_64,
        }
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "i686" => Ok(Self::X86),
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "armv7" | "arm" => Ok(Self::Armv7),
            "armv8" | "aarch64" | "arm64" => Ok(Self::Armv8),
            _ => Err(Error::InvalidSetting(format!("unknown arch '{}'", s))),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CMake build configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "relwithdebinfo" => Ok(Self::RelWithDebInfo),
            "minsizerel" => Ok(Self::MinSizeRel),
            _ => Err(Error::InvalidSetting(format!("unknown build_type '{}'", s))),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// C runtime selection for the MSVC toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsvcRuntime {
    /// Multithreaded DLL runtime
    MD,
    /// Multithreaded debug DLL runtime
    MDd,
    /// Multithreaded static runtime
    MT,
    /// Multithreaded debug static runtime
    MTd,
}

impl MsvcRuntime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MD => "MD",
            Self::MDd => "MDd",
            Self::MT => "MT",
            Self::MTd => "MTd",
        }
    }

    /// Whether the C runtime is linked as a DLL
    pub fn links_dynamically(&self) -> bool {
        matches!(self, Self::MD | Self::MDd)
    }

    /// Runtime MSVC picks when the profile does not name one
    pub fn default_for(build_type: BuildType) -> Self {
        match build_type {
            BuildType::Debug => Self::MDd,
            _ => Self::MD,
        }
    }
}

impl FromStr for MsvcRuntime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MD" => Ok(Self::MD),
            "MDd" => Ok(Self::MDd),
            "MT" => Ok(Self::MT),
            "MTd" => Ok(Self::MTd),
            _ => Err(Error::InvalidSetting(format!(
                "unknown compiler.runtime '{}' (expected MD, MDd, MT or MTd)",
                s
            ))),
        }
    }
}

/// Compiler family, resolved once from the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toolchain {
    /// Microsoft Visual C++; the only family with a selectable C runtime
    Msvc { runtime: MsvcRuntime },
    Gcc,
    Clang,
    AppleClang,
}

impl Toolchain {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Msvc { .. } => "Visual Studio",
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::AppleClang => "apple-clang",
        }
    }

    /// Dynamic C runtime flag, present only for MSVC
    pub fn msvc_dynamic_runtime(&self) -> Option<bool> {
        match self {
            Self::Msvc { runtime } => Some(runtime.links_dynamically()),
            _ => None,
        }
    }

    /// Default toolchain for an operating system
    pub fn default_for(os: Os, build_type: BuildType) -> Self {
        match os {
            Os::Windows => Self::Msvc {
                runtime: MsvcRuntime::default_for(build_type),
            },
            Os::Macos => Self::AppleClang,
            Os::FreeBSD => Self::Clang,
            Os::Linux => Self::Gcc,
        }
    }
}

/// Compiler settings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Compiler {
    pub toolchain: Toolchain,
    pub version: Option<String>,
    /// C++ standard library; dropped by the configure hook
    pub libcxx: Option<String>,
    /// C++ language standard; dropped by the configure hook
    pub cppstd: Option<String>,
}

impl Compiler {
    pub fn new(toolchain: Toolchain) -> Self {
        Self {
            toolchain,
            version: None,
            libcxx: None,
            cppstd: None,
        }
    }

    /// Resolve a compiler from its profile strings
    ///
    /// `runtime` is accepted only for Visual Studio; other families have no
    /// runtime selection.
    pub fn resolve(name: &str, runtime: Option<&str>, build_type: BuildType) -> Result<Self> {
        let toolchain = match name.to_ascii_lowercase().as_str() {
            "visual studio" | "msvc" => {
                let runtime = match runtime {
                    Some(r) => r.parse()?,
                    None => MsvcRuntime::default_for(build_type),
                };
                Toolchain::Msvc { runtime }
            }
            other => {
                if runtime.is_some() {
                    return Err(Error::InvalidSetting(format!(
                        "compiler.runtime is not a setting of compiler '{}'",
                        name
                    )));
                }
                match other {
                    "gcc" => Toolchain::Gcc,
                    "clang" => Toolchain::Clang,
                    "apple-clang" => Toolchain::AppleClang,
                    _ => {
                        return Err(Error::InvalidSetting(format!(
                            "unknown compiler '{}'",
                            name
                        )))
                    }
                }
            }
        };

        Ok(Self::new(toolchain))
    }

    /// Drop the fields that only describe the C++ ABI
    pub fn strip_cxx_abi(&mut self) {
        self.libcxx = None;
        self.cppstd = None;
    }
}

/// The full settings object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Settings {
    pub os: Os,
    pub arch: Arch,
    pub build_type: BuildType,
    pub compiler: Compiler,
}

impl Settings {
    /// Settings for a given OS with the usual defaults for everything else
    pub fn for_os(os: Os) -> Self {
        let build_type = BuildType::default();
        Self {
            os,
            arch: Arch::X86_64,
            build_type,
            compiler: Compiler::new(Toolchain::default_for(os, build_type)),
        }
    }

    /// Settings describing the running host
    pub fn detect() -> Self {
        let os = Os::detect();
        Self {
            arch: Arch::detect(),
            ..Self::for_os(os)
        }
    }

    /// Flattened `key -> value` view, sorted by key
    ///
    /// Absent sub-settings are omitted, so a stripped compiler renders the
    /// same as one that never had the fields.
    pub fn to_pairs(&self) -> BTreeMap<String, String> {
        let mut pairs = BTreeMap::new();
        pairs.insert("os".to_string(), self.os.to_string());
        pairs.insert("arch".to_string(), self.arch.to_string());
        pairs.insert("build_type".to_string(), self.build_type.to_string());
        pairs.insert(
            "compiler".to_string(),
            self.compiler.toolchain.name().to_string(),
        );
        if let Some(version) = &self.compiler.version {
            pairs.insert("compiler.version".to_string(), version.clone());
        }
        if let Toolchain::Msvc { runtime } = self.compiler.toolchain {
            pairs.insert("compiler.runtime".to_string(), runtime.as_str().to_string());
        }
        if let Some(libcxx) = &self.compiler.libcxx {
            pairs.insert("compiler.libcxx".to_string(), libcxx.clone());
        }
        if let Some(cppstd) = &self.compiler.cppstd {
            pairs.insert("compiler.cppstd".to_string(), cppstd.clone());
        }
        pairs
    }
}

//! # Target triples
//!
//! The fixed (arch, platform) to LLVM target triple mapping.

/// Supported target architectures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    I386,
    X86_64,
    Aarch64,
}

impl Arch {
    const fn as_str(self) -> &'static str {
        match self {
            Self::I386 => "i386",
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }
}

impl std::str::FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "i386" => Ok(Self::I386),
            "x86_64" => Ok(Self::X86_64),
            "aarch64" => Ok(Self::Aarch64),
            other => Err(format!("unknown architecture `{other}`")),
        }
    }
}

/// Supported target platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "windows" => Ok(Self::Windows),
            "macos" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            other => Err(format!("unknown platform `{other}`")),
        }
    }
}

/// An (arch, platform) pair naming the compilation target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetTriple {
    pub arch: Arch,
    pub platform: Platform,
}

impl TargetTriple {
    pub const fn new(arch: Arch, platform: Platform) -> Self {
        Self { arch, platform }
    }

    /// The LLVM spelling of this target, e.g. `i386-pc-windows-msvc` or
    /// `x86_64-pc-linux-gnu`
    pub fn llvm_target_triple(&self) -> String {
        let suffix = match self.platform {
            Platform::Windows => "pc-windows-msvc",
            Platform::MacOs => "apple-darwin",
            Platform::Linux => "pc-linux-gnu",
        };
        format!("{}-{}", self.arch.as_str(), suffix)
    }

    pub const fn is_windows(&self) -> bool {
        matches!(self.platform, Platform::Windows)
    }
}

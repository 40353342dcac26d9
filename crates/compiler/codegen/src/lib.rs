//! # DBasic engine-interface code generation
//!
//! The backend lowers a typed program into an LLVM module; this crate
//! provides the runtime plumbing that module needs to talk to the host
//! engine:
//!
//! - per-command **thunks** that resolve the command's symbol in its owning
//!   plugin at runtime and forward the call with correct argument and
//!   return marshalling ([`EngineInterface::generate_command_thunk`])
//! - the program **entry point** that loads every plugin (DBProCore first),
//!   initialises the engine and jumps into the game
//!   ([`EngineInterface::generate_entry_point`])
//! - the [`TargetTriple`] mapping and the per-[`OutputType`] emission
//!   helpers
//!
//! The runtime ABI expected from the host engine is exactly four symbols:
//!
//! ```text
//! void* loadPlugin(const char* pluginName);
//! void* getFunctionAddress(void* plugin, const char* functionName);
//! void  debugPrintf(const char* fmt, ...);
//! int   initialiseEngine();
//! ```

pub mod emit;
pub mod engine_interface;
pub mod target;

pub use emit::write_module;
pub use engine_interface::EngineInterface;
pub use target::{Arch, Platform, TargetTriple};

use inkwell::builder::BuilderError;

/// The output artifact kind of a compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// Textual LLVM IR
    LlvmIr,
    /// LLVM bitcode
    LlvmBitcode,
    ObjectFile,
    Executable,
}

impl OutputType {
    /// The CLI spelling of this output kind
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LlvmIr => "llvm-ir",
            Self::LlvmBitcode => "llvm-bc",
            Self::ObjectFile => "obj",
            Self::Executable => "exe",
        }
    }
}

impl std::str::FromStr for OutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "llvm-ir" => Ok(Self::LlvmIr),
            "llvm-bc" => Ok(Self::LlvmBitcode),
            "obj" => Ok(Self::ObjectFile),
            "exe" => Ok(Self::Executable),
            other => Err(format!("unknown output type `{other}`")),
        }
    }
}

/// Errors that can occur during engine-interface generation and emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// The plugin list was empty
    NoPlugins,
    /// The mandatory core plugin is absent from the plugin list
    MissingCorePlugin,
    /// A command signature uses an internal type marker that has no ABI
    /// representation
    UnresolvableCommandType { command: String, type_char: char },
    /// An LLVM builder operation failed
    Builder(String),
    /// Target machine creation or file emission failed
    Emit(String),
    /// The external linker failed
    Link(String),
}

impl std::fmt::Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPlugins => write!(f, "no plugins specified"),
            Self::MissingCorePlugin => write!(f, "DBProCore.dll is missing"),
            Self::UnresolvableCommandType { command, type_char } => write!(
                f,
                "command `{command}` uses internal type marker `{type_char}` in its signature"
            ),
            Self::Builder(message) => write!(f, "LLVM builder error: {message}"),
            Self::Emit(message) => write!(f, "emission error: {message}"),
            Self::Link(message) => write!(f, "link error: {message}"),
        }
    }
}

impl std::error::Error for CodegenError {}

impl From<BuilderError> for CodegenError {
    fn from(error: BuilderError) -> Self {
        Self::Builder(error.to_string())
    }
}

/// Result type for codegen operations
pub type CodegenResult<T> = Result<T, CodegenError>;

//! # DBasic command catalogue
//!
//! Engine plugins export "commands": named functions invokable from BASIC
//! source. A command's display name may contain spaces and may end in a
//! type sigil, and one name may carry several overloads differing in
//! argument types. This crate owns the catalogue:
//!
//! - [`Plugin`]: a host engine library that defines commands
//! - [`Command`]: a single overload with its argument and return types
//! - [`CommandIndex`]: the registry mapping names to overloads, with
//!   insertion-order enumeration, exact-name lookup and the load-time
//!   duplicate-overload scan
//! - [`catalogue`]: the plugin string-table text format
//!
//! ## Ownership
//!
//! Plugins and commands live in `IndexVec` arenas owned by the index;
//! everything else refers to them through [`PluginId`] / [`CommandId`].
//! The index is built up while libraries load and must be treated as
//! immutable once conversion begins.

pub mod catalogue;
pub mod command;
pub mod index;
pub mod plugin;

pub use catalogue::CatalogueError;
pub use command::{Command, CommandArg, CommandType};
pub use index::{CommandIndex, ConflictError};
pub use plugin::Plugin;

index_vec::define_index_type! {
    /// Unique identifier for a command overload within a `CommandIndex`
    pub struct CommandId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a plugin within a `CommandIndex`
    pub struct PluginId = usize;
}

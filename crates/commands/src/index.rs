//! # Command index
//!
//! The registry of every overload the loaded plugins export. Insertion is
//! constant-time and conflict-blind; [`CommandIndex::find_conflicts`] runs
//! once after all libraries have loaded and fails compilation on the first
//! duplicate signature.

use index_vec::IndexVec;
use rustc_hash::FxHashMap;

use crate::{Command, CommandId, Plugin, PluginId};

/// Two overloads share a lowercased name, the same argument type vector and
/// the same return type. Reported with both defining libraries; the
/// first-declared overload is cited as the previous declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictError {
    pub name: String,
    pub type_info: String,
    pub library: String,
    pub previous_library: String,
}

impl std::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Command `{} {}` redefined in library `{}`; command was first declared in library `{}`",
            self.name, self.type_info, self.library, self.previous_library
        )
    }
}

impl std::error::Error for ConflictError {}

/// Registry mapping command names to their overloads
#[derive(Debug, Default)]
pub struct CommandIndex {
    plugins: IndexVec<PluginId, Plugin>,
    commands: IndexVec<CommandId, Command>,
    /// Exact display name -> overloads in insertion order
    lookup_table: FxHashMap<String, Vec<CommandId>>,
}

impl CommandIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin and returns its handle
    pub fn add_plugin(&mut self, plugin: Plugin) -> PluginId {
        self.plugins.push(plugin)
    }

    /// Gets a plugin by handle
    pub fn plugin(&self, id: PluginId) -> &Plugin {
        &self.plugins[id]
    }

    /// Returns all registered plugins in registration order
    pub fn plugins(&self) -> impl Iterator<Item = (PluginId, &Plugin)> {
        self.plugins.iter_enumerated()
    }

    /// Appends an overload. Does not detect conflicts; run
    /// [`Self::find_conflicts`] once loading is complete.
    pub fn add(&mut self, command: Command) -> CommandId {
        let name = command.name.clone();
        let id = self.commands.push(command);
        self.lookup_table.entry(name).or_default().push(id);
        id
    }

    /// Gets an overload by id
    pub fn command(&self, id: CommandId) -> &Command {
        &self.commands[id]
    }

    /// Returns every overload whose display name equals `name` exactly, in
    /// insertion order. The parser only emits command calls for names it
    /// recognised against this index, so lookups are case-sensitive here.
    pub fn lookup(&self, name: &str) -> &[CommandId] {
        self.lookup_table.get(name).map_or(&[], Vec::as_slice)
    }

    /// Ordered enumeration of every overload, in insertion order
    pub fn commands(&self) -> impl Iterator<Item = (CommandId, &Command)> {
        self.commands.iter_enumerated()
    }

    /// Returns the number of registered overloads
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Scans all overloads for duplicate signatures under the lowercased
    /// name key and reports the first conflict found.
    pub fn find_conflicts(&self) -> Result<(), ConflictError> {
        let mut by_key: FxHashMap<String, Vec<&Command>> = FxHashMap::default();

        for (_, command) in self.commands() {
            let overloads = by_key.entry(command.lowercase_name()).or_default();
            for previous in overloads.iter() {
                if Self::signatures_match(command, previous) {
                    return Err(ConflictError {
                        name: command.name.clone(),
                        type_info: command.type_info(),
                        library: self.plugin(command.plugin).name.clone(),
                        previous_library: self.plugin(previous.plugin).name.clone(),
                    });
                }
            }
            overloads.push(command);
        }

        tracing::debug!(commands = self.len(), "command index conflict scan passed");
        Ok(())
    }

    fn signatures_match(a: &Command, b: &Command) -> bool {
        a.args.len() == b.args.len()
            && a.return_type == b.return_type
            && a.args.iter().zip(&b.args).all(|(x, y)| x.ty == y.ty)
    }
}

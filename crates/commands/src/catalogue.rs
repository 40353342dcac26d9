//! # Plugin catalogue text format
//!
//! Each plugin ships a string table describing its exported commands, one
//! overload per line:
//!
//! ```text
//! # comment
//! print string%0S%PrintString
//! rgb%LLLL%MakeRgb
//! ```
//!
//! The middle field is the return type letter followed by one letter per
//! argument (see [`CommandType`](crate::CommandType) for the alphabet).

use crate::{Command, CommandArg, CommandId, CommandIndex, CommandType, PluginId};

/// A malformed line in a plugin catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    /// The line does not have the three `%`-separated fields
    MissingField { line: usize },
    /// A field that must not be empty was empty
    EmptyField { line: usize, field: &'static str },
    /// The type field used a letter outside the alphabet
    UnknownTypeChar { line: usize, found: char },
}

impl std::fmt::Display for CatalogueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { line } => {
                write!(f, "line {line}: expected `name%types%symbol`")
            }
            Self::EmptyField { line, field } => {
                write!(f, "line {line}: empty {field} field")
            }
            Self::UnknownTypeChar { line, found } => {
                write!(f, "line {line}: unknown type character `{found}`")
            }
        }
    }
}

impl std::error::Error for CatalogueError {}

impl CommandIndex {
    /// Parses a plugin's catalogue text and registers every overload in it,
    /// in file order. Blank lines and `#` comments are skipped.
    pub fn load_catalogue(
        &mut self,
        plugin: PluginId,
        text: &str,
    ) -> Result<Vec<CommandId>, CatalogueError> {
        let mut loaded = Vec::new();
        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            loaded.push(self.add(parse_line(line, number + 1, plugin)?));
        }
        tracing::debug!(
            plugin = %self.plugin(plugin),
            commands = loaded.len(),
            "loaded plugin catalogue"
        );
        Ok(loaded)
    }
}

fn parse_line(line: &str, number: usize, plugin: PluginId) -> Result<Command, CatalogueError> {
    let mut fields = line.split('%');
    let name = fields.next().unwrap_or_default().trim();
    let types = fields
        .next()
        .ok_or(CatalogueError::MissingField { line: number })?
        .trim();
    let symbol = fields
        .next()
        .ok_or(CatalogueError::MissingField { line: number })?
        .trim();

    if name.is_empty() {
        return Err(CatalogueError::EmptyField {
            line: number,
            field: "name",
        });
    }
    if symbol.is_empty() {
        return Err(CatalogueError::EmptyField {
            line: number,
            field: "symbol",
        });
    }

    let mut chars = types.chars();
    let return_type = chars
        .next()
        .ok_or(CatalogueError::EmptyField {
            line: number,
            field: "types",
        })
        .and_then(|c| {
            CommandType::try_from(c).map_err(|found| CatalogueError::UnknownTypeChar {
                line: number,
                found,
            })
        })?;

    let args = chars
        .map(|c| {
            CommandType::try_from(c)
                .map(CommandArg::new)
                .map_err(|found| CatalogueError::UnknownTypeChar {
                    line: number,
                    found,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Command::new(name, args, return_type, plugin, symbol))
}

//! # Command overloads
//!
//! A [`Command`] is one overload of an engine command: the display name the
//! parser recognises, the typed argument list, the return type, the plugin
//! that defines it and the symbol to call in that plugin.

use crate::PluginId;

/// The single-character type alphabet of plugin string tables.
///
/// `X` and `A` are engine-internal markers for variadic/any argument slots;
/// no call site can resolve them, so overload resolution excludes commands
/// that use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// `L`, 32-bit integer
    Integer,
    /// `F`, 32-bit float
    Float,
    /// `S`, string
    String,
    /// `O`, 64-bit float
    Double,
    /// `R`, 64-bit integer
    Long,
    /// `D`, pointer-sized unsigned integer
    Dword,
    /// `0`, no value (return position only)
    Void,
    /// `X`, variadic marker
    X,
    /// `A`, any marker
    A,
}

impl CommandType {
    /// The character this type is encoded as in catalogue text
    pub const fn to_char(self) -> char {
        match self {
            Self::Integer => 'L',
            Self::Float => 'F',
            Self::String => 'S',
            Self::Double => 'O',
            Self::Long => 'R',
            Self::Dword => 'D',
            Self::Void => '0',
            Self::X => 'X',
            Self::A => 'A',
        }
    }

    /// Whether this is one of the unresolvable engine-internal markers
    pub const fn is_internal_marker(self) -> bool {
        matches!(self, Self::X | Self::A)
    }
}

impl TryFrom<char> for CommandType {
    type Error = char;

    fn try_from(c: char) -> Result<Self, char> {
        match c {
            'L' => Ok(Self::Integer),
            'F' => Ok(Self::Float),
            'S' => Ok(Self::String),
            'O' => Ok(Self::Double),
            'R' => Ok(Self::Long),
            'D' => Ok(Self::Dword),
            '0' => Ok(Self::Void),
            'X' => Ok(Self::X),
            'A' => Ok(Self::A),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for CommandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// One declared argument of a command overload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandArg {
    pub ty: CommandType,
}

impl CommandArg {
    pub const fn new(ty: CommandType) -> Self {
        Self { ty }
    }
}

/// A single overload of an engine command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Display name as the parser recognises it (may contain spaces and a
    /// trailing sigil)
    pub name: String,
    pub args: Vec<CommandArg>,
    pub return_type: CommandType,
    /// The plugin that defines this overload
    pub plugin: PluginId,
    /// The callable symbol inside the plugin
    pub symbol: String,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        args: Vec<CommandArg>,
        return_type: CommandType,
        plugin: PluginId,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            args,
            return_type,
            plugin,
            symbol: symbol.into(),
        }
    }

    /// The lowercased key under which overloads of one name collide
    pub fn lowercase_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Render the signature as `<ret>(<args>)`, e.g. `0(SL)`
    pub fn type_info(&self) -> String {
        let mut info = String::with_capacity(self.args.len() + 3);
        info.push(self.return_type.to_char());
        info.push('(');
        for arg in &self.args {
            info.push(arg.ty.to_char());
        }
        info.push(')');
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_roundtrip() {
        for c in ['L', 'F', 'S', 'O', 'R', 'D', '0', 'X', 'A'] {
            assert_eq!(CommandType::try_from(c).unwrap().to_char(), c);
        }
        assert_eq!(CommandType::try_from('Q'), Err('Q'));
    }

    #[test]
    fn test_type_info() {
        let cmd = Command::new(
            "print string",
            vec![CommandArg::new(CommandType::String)],
            CommandType::Void,
            PluginId::from_raw(0),
            "PrintString",
        );
        assert_eq!(cmd.type_info(), "0(S)");
        assert_eq!(cmd.lowercase_name(), "print string");
    }
}

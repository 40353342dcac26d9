//! # Type rules
//!
//! The typing rules of the dialect: implicit types from sigils, the mapping
//! from catalogue type letters to IR types, convertibility, and the binary
//! common-type rule.

use dbasic_commands::CommandType;
use dbasic_compiler_ast::Sigil;
use dbasic_compiler_ir::{BuiltinType, Expression, Type};

/// The type a variable takes from its identifier's sigil when implicitly
/// declared: bare names are integers, `$` strings, `#` floats.
pub fn type_from_sigil(sigil: Sigil) -> Type {
    Type::builtin(BuiltinType::of_sigil(sigil))
}

/// Maps a catalogue type letter to an IR type.
///
/// The internal markers `X` and `A` have no IR counterpart; overload
/// filtering removes candidates that use them before any mapping happens,
/// so hitting one here is the caller's bug and is returned as an error.
pub fn type_from_command_type(ty: CommandType) -> Result<Type, CommandType> {
    match ty {
        CommandType::Integer => Ok(Type::builtin(BuiltinType::Integer)),
        CommandType::Float => Ok(Type::builtin(BuiltinType::Float)),
        CommandType::String => Ok(Type::builtin(BuiltinType::String)),
        CommandType::Double => Ok(Type::builtin(BuiltinType::DoubleFloat)),
        CommandType::Long => Ok(Type::builtin(BuiltinType::DoubleInteger)),
        CommandType::Dword => Ok(Type::builtin(BuiltinType::Dword)),
        CommandType::Void => Ok(Type::Void),
        CommandType::X | CommandType::A => Err(ty),
    }
}

/// Whether a value of `source` type can be converted to `target`.
///
/// Identical types always convert; among builtins any combination of
/// integral and floating-point archetypes converts; strings only convert to
/// strings. Arrays and user-defined types never convert.
pub fn is_type_convertible(source: &Type, target: &Type) -> bool {
    if source == target {
        return true;
    }
    let (Some(source), Some(target)) = (source.as_builtin(), target.as_builtin()) else {
        return false;
    };

    (source.is_integral() || source.is_floating_point())
        && (target.is_integral() || target.is_floating_point())
}

/// The common type both operands of a binary operation convert to.
///
/// TODO: this is the left-hand side's type for now; the correct rule
/// (usual arithmetic conversions vs. widest operand) is still undecided.
pub fn binary_common_type(lhs: &Expression, _rhs: &Expression) -> Type {
    lhs.ty.clone()
}

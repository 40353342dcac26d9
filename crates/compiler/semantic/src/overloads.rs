//! # Command overload resolution
//!
//! Given the overloads sharing a call's display name and the converted
//! argument expressions, selection works in two steps: filter out the
//! candidates that cannot apply (wrong arity, internal `X`/`A` type
//! markers, non-convertible argument), then rank the survivors by score.
//!
//! Scoring sums one contribution per argument: an exact type match is worth
//! 10, a shared builtin archetype (both integral or both floating point) is
//! worth 1. Candidates are sorted ascending with a stable sort and the last
//! one wins, so on equal scores the overload inserted into the index later
//! is preferred.

use dbasic_commands::{Command, CommandId, CommandIndex};
use dbasic_compiler_ir::Expression;

use crate::type_resolution::{is_type_convertible, type_from_command_type};

/// The outcome of overload selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadResolution {
    Selected(CommandId),
    /// Every candidate was filtered out
    NoMatch,
}

/// Selects the best overload for a call with at least one argument.
///
/// `candidates` is the insertion-ordered overload list for the command's
/// display name; `args` are the already converted argument expressions.
pub fn resolve_overload(
    index: &CommandIndex,
    candidates: &[CommandId],
    args: &[Expression],
) -> OverloadResolution {
    let mut applicable: Vec<CommandId> = candidates
        .iter()
        .copied()
        .filter(|&id| is_applicable(index.command(id), args))
        .collect();

    if applicable.is_empty() {
        return OverloadResolution::NoMatch;
    }

    // Stable ascending sort; the best match ends up at the back.
    applicable.sort_by_key(|&id| score_overload(index.command(id), args));
    let selected = *applicable.last().expect("applicable list is non-empty");
    tracing::debug!(
        command = %index.command(selected).name,
        signature = %index.command(selected).type_info(),
        "selected overload"
    );
    OverloadResolution::Selected(selected)
}

fn is_applicable(command: &Command, args: &[Expression]) -> bool {
    if command.args.len() != args.len() {
        return false;
    }
    command.args.iter().zip(args).all(|(parameter, arg)| {
        if parameter.ty.is_internal_marker() {
            return false;
        }
        let Ok(parameter_ty) = type_from_command_type(parameter.ty) else {
            return false;
        };
        is_type_convertible(&arg.ty, &parameter_ty)
    })
}

/// Scores one candidate against the actual argument types
pub fn score_overload(command: &Command, args: &[Expression]) -> i32 {
    let mut score = 0;
    for (parameter, arg) in command.args.iter().zip(args) {
        let Ok(parameter_ty) = type_from_command_type(parameter.ty) else {
            continue;
        };
        if parameter_ty == arg.ty {
            score += 10;
        } else if let (Some(parameter_ty), Some(arg_ty)) =
            (parameter_ty.as_builtin(), arg.ty.as_builtin())
        {
            if parameter_ty.is_integral() && arg_ty.is_integral() {
                score += 1;
            }
            if parameter_ty.is_floating_point() && arg_ty.is_floating_point() {
                score += 1;
            }
        }
    }
    score
}

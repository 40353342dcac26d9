//! # DBasic argdef
//!
//! The driver's CLI is table-driven: a declarative tree of sections and
//! actions (long/short option, help, handler symbol, argument lists and
//! dependency lists) is flattened into an [`ActionTable`] whose dependency
//! names are resolved to indices. The driver walks that table to parse its
//! argument vector and to order handler execution.
//!
//! The description tree is serde-deserializable, so it can live in a file
//! next to the driver or be assembled in code.

pub mod action;

pub use action::{
    Action, ActionDesc, ActionTable, ArgRange, ArgSpec, Node, OptionalArgSpec, Section,
    build_action_table,
};

index_vec::define_index_type! {
    /// Index of an action within an `ActionTable`
    pub struct ActionId = usize;
}

/// Errors produced while building an action table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgdefError {
    /// Two actions share a name
    DuplicateAction { name: String },
    /// An action shares its name with a section
    ActionNamedLikeSection { name: String },
    /// An explicit action has no help attribute
    MissingHelp { action: String },
    /// An action has no handler attribute
    MissingHandler { action: String },
    /// A dependency name resolves to no action or section
    UnknownDependency {
        action: String,
        list: &'static str,
        dependency: String,
    },
}

impl std::fmt::Display for ArgdefError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateAction { name } => write!(f, "duplicate action name `{name}`"),
            Self::ActionNamedLikeSection { name } => {
                write!(f, "action `{name}` has the same name as a section")
            }
            Self::MissingHelp { action } => write!(
                f,
                "action `{action}` has no help attribute; explicit actions must specify a help string"
            ),
            Self::MissingHandler { action } => write!(
                f,
                "action `{action}` has no handler attribute; actions must name a handler"
            ),
            Self::UnknownDependency {
                action,
                list,
                dependency,
            } => write!(
                f,
                "undefined action or section `{dependency}` referenced in {list} list of action `{action}`"
            ),
        }
    }
}

impl std::error::Error for ArgdefError {}

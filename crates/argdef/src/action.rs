//! # Action tables
//!
//! Flattening of the declarative section/action tree into the table the
//! driver executes against.

use index_vec::IndexVec;
use serde::{Deserialize, Serialize};

use crate::{ActionId, ArgdefError};

/// A group of actions; sections can nest and their names participate in
/// dependency resolution (a dependency naming a section expands to every
/// action in it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub children: Vec<Node>,
}

/// A child of a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Section(Section),
    Action(ActionDesc),
}

/// One required argument with its alternative names, documented as `<a|b>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSpec {
    pub names: Vec<String>,
}

/// One optional argument, documented as `[a|b]`; a continued tail
/// (`[a...]`) accepts unboundedly many values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalArgSpec {
    pub names: Vec<String>,
    #[serde(default)]
    pub continued: bool,
}

/// The declarative description of one CLI action.
///
/// Explicit actions surface as options and must carry help text and a
/// handler; implicit actions run as dependencies only and carry just a
/// handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDesc {
    /// The action's name; doubles as the long option of explicit actions
    pub name: String,
    #[serde(default)]
    pub short_option: Option<char>,
    #[serde(default)]
    pub help: Option<String>,
    /// The handler symbol invoked when the action runs
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
    #[serde(default)]
    pub optional_args: Vec<OptionalArgSpec>,
    /// Actions or sections that must run before this one when both are
    /// scheduled
    #[serde(default)]
    pub runafter: Vec<String>,
    /// Actions or sections this one requires to run
    #[serde(default)]
    pub requires: Vec<String>,
    /// Meta dependencies of meta actions
    #[serde(default)]
    pub metadeps: Vec<String>,
    #[serde(default)]
    pub implicit: bool,
    #[serde(default)]
    pub meta: bool,
}

/// Accepted argument counts: at least `low`, at most `high` (`None` means
/// an unbounded tail)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgRange {
    pub low: usize,
    pub high: Option<usize>,
}

impl ArgRange {
    /// Whether `count` arguments satisfy this range
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.low && self.high.is_none_or(|high| count <= high)
    }
}

/// One resolved entry of the flat table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub action_name: String,
    pub section_name: String,
    /// Empty for implicit actions
    pub long_option: String,
    pub short_option: Option<char>,
    pub help: String,
    pub func_name: String,
    /// Documentation string built from the argument lists, e.g.
    /// `<file> [name|index] [value...]`
    pub arg_doc: String,
    pub arg_range: ArgRange,
    pub runafter: Vec<ActionId>,
    pub requires: Vec<ActionId>,
    pub metadeps: Vec<ActionId>,
    pub is_implicit: bool,
    pub is_meta: bool,
}

/// The flat, dependency-resolved action table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionTable {
    actions: IndexVec<ActionId, Action>,
}

impl ActionTable {
    pub fn get(&self, id: ActionId) -> &Action {
        &self.actions[id]
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionId, &Action)> {
        self.actions.iter_enumerated()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Finds an explicit action by its long option
    pub fn by_long_option(&self, option: &str) -> Option<ActionId> {
        self.actions()
            .find(|(_, action)| !action.is_implicit && action.long_option == option)
            .map(|(id, _)| id)
    }

    /// Finds an explicit action by its short option
    pub fn by_short_option(&self, option: char) -> Option<ActionId> {
        self.actions()
            .find(|(_, action)| action.short_option == Some(option))
            .map(|(id, _)| id)
    }
}

/// Flattens the description tree into a table, enforcing the attribute and
/// uniqueness invariants and resolving dependency names to indices.
pub fn build_action_table(root: &Section) -> Result<ActionTable, ArgdefError> {
    // Pass 1: flatten in definition order and collect section names.
    let mut flat: Vec<(&ActionDesc, &str)> = Vec::new();
    let mut section_names: Vec<&str> = Vec::new();
    flatten(root, &mut flat, &mut section_names);

    // Pass 2: per-action attribute checks and table construction.
    let mut actions: IndexVec<ActionId, Action> = IndexVec::new();
    for (desc, section_name) in &flat {
        actions.push(build_action(desc, section_name)?);
    }

    // Action names are globally unique and never collide with sections.
    for (i, (desc, _)) in flat.iter().enumerate() {
        if flat[i + 1..].iter().any(|(other, _)| other.name == desc.name) {
            return Err(ArgdefError::DuplicateAction {
                name: desc.name.clone(),
            });
        }
        if section_names.iter().any(|section| *section == desc.name) {
            return Err(ArgdefError::ActionNamedLikeSection {
                name: desc.name.clone(),
            });
        }
    }

    // Pass 3: resolve dependency names. A name matches every action called
    // that name or living in a section of that name.
    for (index, (desc, _)) in flat.iter().enumerate() {
        for (list, names) in [
            ("runafter", &desc.runafter),
            ("requires", &desc.requires),
            ("metadeps", &desc.metadeps),
        ] {
            let mut resolved = Vec::new();
            for dependency in names {
                let matches: Vec<ActionId> = actions
                    .iter_enumerated()
                    .filter(|(_, action)| {
                        action.action_name == *dependency || action.section_name == *dependency
                    })
                    .map(|(id, _)| id)
                    .collect();
                if matches.is_empty() {
                    return Err(ArgdefError::UnknownDependency {
                        action: desc.name.clone(),
                        list,
                        dependency: dependency.clone(),
                    });
                }
                resolved.extend(matches);
            }
            let action = &mut actions[ActionId::from_raw(index)];
            match list {
                "runafter" => action.runafter = resolved,
                "requires" => action.requires = resolved,
                _ => action.metadeps = resolved,
            }
        }
    }

    Ok(ActionTable { actions })
}

fn flatten<'a>(
    section: &'a Section,
    flat: &mut Vec<(&'a ActionDesc, &'a str)>,
    section_names: &mut Vec<&'a str>,
) {
    section_names.push(&section.name);
    for child in &section.children {
        match child {
            Node::Action(desc) => flat.push((desc, &section.name)),
            Node::Section(inner) => flatten(inner, flat, section_names),
        }
    }
}

fn build_action(desc: &ActionDesc, section_name: &str) -> Result<Action, ArgdefError> {
    let func_name = desc
        .handler
        .clone()
        .ok_or_else(|| ArgdefError::MissingHandler {
            action: desc.name.clone(),
        })?;

    if desc.implicit {
        if desc.help.is_some() {
            tracing::warn!(
                action = %desc.name,
                "help attribute on an implicit action is ignored"
            );
        }
        if !desc.args.is_empty() || !desc.optional_args.is_empty() {
            tracing::warn!(
                action = %desc.name,
                "args attribute on an implicit action is ignored"
            );
        }
        return Ok(Action {
            action_name: desc.name.clone(),
            section_name: section_name.to_string(),
            long_option: String::new(),
            short_option: None,
            help: String::new(),
            func_name,
            arg_doc: String::new(),
            arg_range: ArgRange {
                low: 0,
                high: Some(0),
            },
            runafter: Vec::new(),
            requires: Vec::new(),
            metadeps: Vec::new(),
            is_implicit: true,
            is_meta: desc.meta,
        });
    }

    let help = desc.help.clone().ok_or_else(|| ArgdefError::MissingHelp {
        action: desc.name.clone(),
    })?;
    let (arg_doc, arg_range) = build_arg_doc_and_range(desc);

    Ok(Action {
        action_name: desc.name.clone(),
        section_name: section_name.to_string(),
        long_option: desc.name.clone(),
        short_option: desc.short_option,
        help,
        func_name,
        arg_doc,
        arg_range,
        runafter: Vec::new(),
        requires: Vec::new(),
        metadeps: Vec::new(),
        is_implicit: false,
        is_meta: desc.meta,
    })
}

/// Builds the `<a|b> [c|d] …` documentation string and the accepted
/// argument-count range
fn build_arg_doc_and_range(desc: &ActionDesc) -> (String, ArgRange) {
    let mut doc_parts: Vec<String> = Vec::new();
    let mut low = 0usize;
    let mut high = Some(0usize);

    for arg in &desc.args {
        doc_parts.push(format!("<{}>", arg.names.join("|")));
        low += 1;
        high = high.map(|h| h + 1);
    }
    for arg in &desc.optional_args {
        if arg.continued {
            doc_parts.push(format!("[{}...]", arg.names.join("|")));
            high = None;
        } else {
            doc_parts.push(format!("[{}]", arg.names.join("|")));
            high = high.map(|h| h + 1);
        }
    }

    (doc_parts.join(" "), ArgRange { low, high })
}

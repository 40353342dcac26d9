//! The `dbasic` command-line driver.
//!
//! The CLI surface is table-driven: the action tree below is flattened by
//! `dbasic-argdef` and the argument vector is matched against the resulting
//! table. Matched actions run in dependency order; the `output` action
//! performs the actual compilation with whatever configuration the earlier
//! actions established.

use std::path::PathBuf;
use std::process::ExitCode;

use dbasic_argdef::{Action, ActionDesc, ActionId, ActionTable, ArgSpec, Node, Section,
    build_action_table};
use dbasic_compiler::{CompileError, CompileOptions, compile_file};
use dbasic_compiler_codegen::{Arch, OutputType, Platform, TargetTriple};
use dbasic_compiler_diagnostics::{Diagnostic, build_diagnostic_message};
use dbasic_compiler_semantic::SemanticError;

fn action_tree() -> Section {
    let action = |name: &str, short: Option<char>, help: &str, args: &[&str]| {
        Node::Action(ActionDesc {
            name: name.to_string(),
            short_option: short,
            help: Some(help.to_string()),
            handler: Some(format!("handle_{}", name.replace('-', "_"))),
            args: args
                .iter()
                .map(|names| ArgSpec {
                    names: names.split('|').map(str::to_string).collect(),
                })
                .collect(),
            optional_args: Vec::new(),
            runafter: Vec::new(),
            requires: Vec::new(),
            metadeps: Vec::new(),
            implicit: false,
            meta: false,
        })
    };

    let mut output = action("output", Some('o'), "Write the output file", &["file"]);
    if let Node::Action(desc) = &mut output {
        // Everything else configures the compilation the output action runs.
        desc.runafter = vec![
            "frontend".to_string(),
            "codegen-options".to_string(),
        ];
    }

    Section {
        name: "global".to_string(),
        children: vec![
            action("help", Some('h'), "Print this help text", &[]),
            Node::Section(Section {
                name: "frontend".to_string(),
                children: vec![
                    action(
                        "commands",
                        Some('c'),
                        "Directory of plugin command catalogues (*.commands)",
                        &["dir"],
                    ),
                    action(
                        "input",
                        Some('i'),
                        "Post-processed syntax tree (JSON) produced by the parser",
                        &["file"],
                    ),
                    action(
                        "source",
                        Some('s'),
                        "Original source file, used to render diagnostics",
                        &["file"],
                    ),
                ],
            }),
            Node::Section(Section {
                name: "codegen-options".to_string(),
                children: vec![
                    action(
                        "output-type",
                        Some('t'),
                        "Output kind: llvm-ir, llvm-bc, obj or exe",
                        &["llvm-ir|llvm-bc|obj|exe"],
                    ),
                    action("arch", None, "Target architecture: i386, x86_64, aarch64", &["arch"]),
                    action(
                        "platform",
                        None,
                        "Target platform: windows, macos, linux",
                        &["platform"],
                    ),
                ],
            }),
            output,
        ],
    }
}

/// Configuration accumulated by the action handlers
struct DriverConfig {
    commands_dir: Option<PathBuf>,
    input: Option<PathBuf>,
    source: Option<PathBuf>,
    output_type: OutputType,
    arch: Arch,
    platform: Platform,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            commands_dir: None,
            input: None,
            source: None,
            output_type: OutputType::ObjectFile,
            arch: Arch::I386,
            platform: Platform::Windows,
        }
    }
}

/// One matched action with its collected arguments
struct Invocation {
    id: ActionId,
    args: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let table = match build_action_table(&action_tree()) {
        Ok(table) => table,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let invocations = match match_actions(&table, &argv) {
        Ok(invocations) => invocations,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    if invocations.is_empty() {
        print_usage(&table);
        return ExitCode::FAILURE;
    }

    run_actions(&table, order_by_dependencies(&table, invocations))
}

/// Matches the argument vector against the table, collecting each action's
/// arguments within its declared range.
fn match_actions(table: &ActionTable, argv: &[String]) -> Result<Vec<Invocation>, String> {
    let mut invocations: Vec<Invocation> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let token = &argv[i];
        let id = if let Some(long) = token.strip_prefix("--") {
            table
                .by_long_option(long)
                .ok_or_else(|| format!("unknown option `{token}`"))?
        } else if let Some(short) = token.strip_prefix('-') {
            let mut chars = short.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => table
                    .by_short_option(c)
                    .ok_or_else(|| format!("unknown option `{token}`"))?,
                _ => return Err(format!("unknown option `{token}`")),
            }
        } else {
            return Err(format!("unexpected argument `{token}`"));
        };
        i += 1;

        let action = table.get(id);
        let mut args = Vec::new();
        while i < argv.len()
            && !argv[i].starts_with('-')
            && action.arg_range.accepts(args.len() + 1)
        {
            args.push(argv[i].clone());
            i += 1;
        }
        if !action.arg_range.accepts(args.len()) {
            return Err(format!(
                "option `--{}` expects {} argument(s): {}",
                action.long_option, action.arg_range.low, action.arg_doc
            ));
        }
        invocations.push(Invocation { id, args });
    }

    Ok(invocations)
}

/// Orders matched actions so that everything in an action's `runafter` list
/// that is also scheduled runs before it.
fn order_by_dependencies(table: &ActionTable, mut pending: Vec<Invocation>) -> Vec<Invocation> {
    let mut ordered: Vec<Invocation> = Vec::new();
    while !pending.is_empty() {
        let ready = pending.iter().position(|invocation| {
            table
                .get(invocation.id)
                .runafter
                .iter()
                .all(|dep| !pending.iter().any(|other| other.id == *dep))
        });
        // A dependency cycle would leave nothing ready; fall back to the
        // declaration order rather than spinning.
        let next = ready.unwrap_or(0);
        ordered.push(pending.remove(next));
    }
    ordered
}

fn run_actions(table: &ActionTable, invocations: Vec<Invocation>) -> ExitCode {
    let mut config = DriverConfig::default();

    for invocation in invocations {
        let action = table.get(invocation.id);
        match run_handler(action, &invocation.args, &mut config, table) {
            Ok(true) => {}
            Ok(false) => return ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("error: {message}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

/// Dispatches one action to its handler. Returns `Ok(false)` when the
/// driver should stop without error (e.g. after printing help).
fn run_handler(
    action: &Action,
    args: &[String],
    config: &mut DriverConfig,
    table: &ActionTable,
) -> Result<bool, String> {
    match action.func_name.as_str() {
        "handle_help" => {
            print_usage(table);
            Ok(false)
        }
        "handle_commands" => {
            config.commands_dir = Some(PathBuf::from(&args[0]));
            Ok(true)
        }
        "handle_input" => {
            config.input = Some(PathBuf::from(&args[0]));
            Ok(true)
        }
        "handle_source" => {
            config.source = Some(PathBuf::from(&args[0]));
            Ok(true)
        }
        "handle_output_type" => {
            config.output_type = args[0].parse()?;
            Ok(true)
        }
        "handle_arch" => {
            config.arch = args[0].parse()?;
            Ok(true)
        }
        "handle_platform" => {
            config.platform = args[0].parse()?;
            Ok(true)
        }
        "handle_output" => run_compilation(config, &args[0]),
        other => Err(format!("no handler bound for `{other}`")),
    }
}

fn run_compilation(config: &DriverConfig, output: &str) -> Result<bool, String> {
    let commands_dir = config
        .commands_dir
        .as_ref()
        .ok_or("no command catalogue directory; pass --commands <dir>")?;
    let input = config
        .input
        .as_ref()
        .ok_or("no input syntax tree; pass --input <file>")?;

    let options = CompileOptions {
        module_name: input.display().to_string(),
        output_type: config.output_type,
        output_path: PathBuf::from(output),
        target: TargetTriple::new(config.arch, config.platform),
    };

    match compile_file(commands_dir, input, &options) {
        Ok(()) => Ok(true),
        Err(CompileError::Conflict(conflict)) => {
            let diagnostic = Diagnostic::command_conflict(
                &conflict.name,
                &conflict.type_info,
                &conflict.library,
                &conflict.previous_library,
            );
            eprintln!("{diagnostic}");
            Err("conflicting command catalogues".to_string())
        }
        Err(CompileError::Semantic(SemanticError::Failed(diagnostics))) => {
            report_diagnostics(&diagnostics, config);
            Err(diagnostics.summary())
        }
        Err(error) => Err(error.to_string()),
    }
}

/// Renders collected diagnostics, with source snippets when the original
/// source file is available.
fn report_diagnostics(
    diagnostics: &dbasic_compiler_diagnostics::DiagnosticCollection,
    config: &DriverConfig,
) {
    let source = config
        .source
        .as_ref()
        .and_then(|path| std::fs::read_to_string(path).ok());
    for diagnostic in diagnostics.iter() {
        match &source {
            Some(text) => eprint!("{}", build_diagnostic_message(text, diagnostic, true)),
            None => eprintln!("{diagnostic}"),
        }
    }
}

fn print_usage(table: &ActionTable) {
    eprintln!("Usage: dbasic [options]");
    eprintln!();
    for (_, action) in table.actions() {
        if action.is_implicit {
            continue;
        }
        let short = action
            .short_option
            .map(|c| format!("-{c}, "))
            .unwrap_or_else(|| "    ".to_string());
        eprintln!(
            "  {short}--{:<14} {:<28} {}",
            action.long_option, action.arg_doc, action.help
        );
    }
}

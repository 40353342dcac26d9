//! # DBasic compiler driver
//!
//! Wires the pipeline together: plugin catalogues are loaded into a
//! [`CommandIndex`], the parser front-end's post-processed syntax tree is
//! read as JSON, the semantic converter produces the typed program, and the
//! engine-interface generator emits the LLVM module carrying every
//! referenced command thunk plus the plugin-loading entry point. Lowering
//! of the function bodies themselves is the backend's job; this module
//! declares the game entry `__DBMain` as an external symbol for it.

use std::fs;
use std::path::{Path, PathBuf};

use inkwell::context::Context;
use inkwell::module::Module;
use thiserror::Error;

use dbasic_commands::{CatalogueError, CommandIndex, ConflictError, Plugin};
use dbasic_compiler_ast::Block;
use dbasic_compiler_codegen::{
    CodegenError, EngineInterface, OutputType, TargetTriple, write_module,
};
use dbasic_compiler_ir::{MAIN_FUNCTION_NAME, Program};
use dbasic_compiler_semantic::{SemanticError, convert_block};

/// The complete configuration of one compilation, threaded through the
/// pipeline instead of living in process globals.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub module_name: String,
    pub output_type: OutputType,
    pub output_path: PathBuf,
    pub target: TargetTriple,
}

impl CompileOptions {
    /// The output path with `.exe` appended for executables on Windows
    /// targets when it is absent
    pub fn resolved_output_path(&self) -> PathBuf {
        if self.output_type == OutputType::Executable
            && self.target.is_windows()
            && self.output_path.extension().is_none_or(|ext| ext != "exe")
        {
            let mut name = self.output_path.as_os_str().to_owned();
            name.push(".exe");
            return PathBuf::from(name);
        }
        self.output_path.clone()
    }
}

/// Top-level driver errors
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalogue `{path}`: {source}")]
    Catalogue {
        path: PathBuf,
        #[source]
        source: CatalogueError,
    },
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error("failed to parse syntax tree from `{path}`: {message}")]
    AstParse { path: PathBuf, message: String },
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

/// Loads every `<PluginName>.commands` catalogue in `dir` into a fresh
/// index and runs the conflict scan. Files load in name order so the index
/// is deterministic.
pub fn load_command_index(dir: &Path) -> Result<CommandIndex, CompileError> {
    let mut index = CommandIndex::new();

    let mut catalogue_paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| CompileError::Io {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "commands"))
        .collect();
    catalogue_paths.sort();

    for path in catalogue_paths {
        let plugin_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let text = fs::read_to_string(&path).map_err(|source| CompileError::Io {
            path: path.clone(),
            source,
        })?;

        let plugin = index.add_plugin(Plugin::new(
            plugin_name.clone(),
            format!("{plugin_name}.dll"),
        ));
        index
            .load_catalogue(plugin, &text)
            .map_err(|source| CompileError::Catalogue {
                path: path.clone(),
                source,
            })?;
        tracing::info!(plugin = %plugin_name, "loaded command catalogue");
    }

    index.find_conflicts()?;
    Ok(index)
}

/// Reads a post-processed syntax tree serialized by the parser front-end
pub fn read_ast(path: &Path) -> Result<Block, CompileError> {
    let text = fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    sonic_rs::from_str(&text).map_err(|error| CompileError::AstParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

/// Runs the semantic converter
pub fn compile_ast(
    block: &Block,
    index: &CommandIndex,
    source_name: &str,
) -> Result<Program, CompileError> {
    Ok(convert_block(block, index, source_name)?)
}

/// Builds the engine-interface module for a converted program: external
/// declarations for the game entry and the user functions, a thunk per
/// referenced command, and the plugin-loading `main`.
pub fn generate_engine_module<'ctx>(
    context: &'ctx Context,
    program: &Program,
    index: &CommandIndex,
    options: &CompileOptions,
) -> Result<Module<'ctx>, CompileError> {
    let mut interface = EngineInterface::new(context, &options.module_name, options.target);

    let void_fn = context.void_type().fn_type(&[], false);
    let game_entry = interface.declare_external_function(MAIN_FUNCTION_NAME, void_fn);

    for id in program.referenced_commands() {
        let command = index.command(id);
        let plugin = index.plugin(command.plugin).clone();
        let function_type = interface.command_function_type(command)?;
        interface.generate_command_thunk(command, &plugin, function_type)?;
    }

    let plugins: Vec<Plugin> = index.plugins().map(|(_, plugin)| plugin.clone()).collect();
    interface.generate_entry_point(game_entry, &plugins)?;

    Ok(interface.into_module())
}

/// The whole batch pipeline: catalogues, syntax tree, conversion, engine
/// module, output file.
pub fn compile_file(
    commands_dir: &Path,
    ast_path: &Path,
    options: &CompileOptions,
) -> Result<(), CompileError> {
    let index = load_command_index(commands_dir)?;
    let block = read_ast(ast_path)?;
    let source_name = ast_path.display().to_string();
    let program = compile_ast(&block, &index, &source_name)?;

    let context = Context::create();
    let module = generate_engine_module(&context, &program, &index, options)?;

    let output_path = options.resolved_output_path();
    tracing::info!(output = %output_path.display(), "creating output file");
    write_module(&module, &options.target, options.output_type, &output_path)?;
    Ok(())
}

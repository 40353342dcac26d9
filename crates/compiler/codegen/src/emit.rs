//! # Output emission
//!
//! Writes a finished module out as textual IR, bitcode or a target object
//! file. Executable output writes the object next to the requested path and
//! hands it to the platform linker; link policy beyond that lives outside
//! the compiler.

use std::path::Path;
use std::process::Command as ProcessCommand;

use inkwell::OptimizationLevel;
use inkwell::module::Module;
use inkwell::targets::{
    CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine,
};

use crate::{CodegenError, CodegenResult, OutputType, TargetTriple};

/// Writes `module` to `path` in the requested output format
pub fn write_module(
    module: &Module<'_>,
    target: &TargetTriple,
    output: OutputType,
    path: &Path,
) -> CodegenResult<()> {
    match output {
        OutputType::LlvmIr => module
            .print_to_file(path)
            .map_err(|error| CodegenError::Emit(error.to_string())),
        OutputType::LlvmBitcode => {
            if module.write_bitcode_to_path(path) {
                Ok(())
            } else {
                Err(CodegenError::Emit(format!(
                    "failed to write bitcode to `{}`",
                    path.display()
                )))
            }
        }
        OutputType::ObjectFile => {
            let machine = target_machine(target)?;
            machine
                .write_to_file(module, FileType::Object, path)
                .map_err(|error| CodegenError::Emit(error.to_string()))
        }
        OutputType::Executable => {
            let object_path = path.with_extension("o");
            let machine = target_machine(target)?;
            machine
                .write_to_file(module, FileType::Object, &object_path)
                .map_err(|error| CodegenError::Emit(error.to_string()))?;
            link_executable(&object_path, path)
        }
    }
}

fn target_machine(target: &TargetTriple) -> CodegenResult<TargetMachine> {
    Target::initialize_all(&InitializationConfig::default());
    let triple = inkwell::targets::TargetTriple::create(&target.llvm_target_triple());
    let llvm_target =
        Target::from_triple(&triple).map_err(|error| CodegenError::Emit(error.to_string()))?;
    llvm_target
        .create_target_machine(
            &triple,
            "generic",
            "",
            OptimizationLevel::Default,
            RelocMode::Default,
            CodeModel::Default,
        )
        .ok_or_else(|| {
            CodegenError::Emit(format!(
                "no target machine for `{}`",
                target.llvm_target_triple()
            ))
        })
}

/// Thin glue over the external link step: invokes the platform linker
/// driver on the object file.
fn link_executable(object_path: &Path, output_path: &Path) -> CodegenResult<()> {
    tracing::info!(object = %object_path.display(), output = %output_path.display(), "linking");
    let status = ProcessCommand::new("cc")
        .arg("-o")
        .arg(output_path)
        .arg(object_path)
        .status()
        .map_err(|error| CodegenError::Link(error.to_string()))?;
    if status.success() {
        Ok(())
    } else {
        Err(CodegenError::Link(format!(
            "linker exited with status {status}"
        )))
    }
}

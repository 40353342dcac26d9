//! # Engine interface
//!
//! Generates the runtime plumbing between a compiled program and the host
//! engine: the imported runtime ABI declarations, one handle global per
//! plugin, the per-command call thunks and the plugin-loading entry point.
//!
//! A `dword` crosses the plugin ABI as a pointer-sized value and is
//! modelled as an opaque pointer throughout, matching the host engine's
//! calling convention for handles and raw 32-bit payloads alike.

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType};
use inkwell::values::{BasicMetadataValueEnum, FunctionValue, GlobalValue, PointerValue};
use inkwell::{AddressSpace, DLLStorageClass, IntPredicate};
use rustc_hash::FxHashMap;

use dbasic_commands::{Command, CommandType, Plugin};

use crate::{CodegenError, CodegenResult, TargetTriple};

/// Builds engine-facing constructs into one LLVM module
pub struct EngineInterface<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    target: TargetTriple,

    load_plugin: FunctionValue<'ctx>,
    get_function_address: FunctionValue<'ctx>,
    #[allow(dead_code)]
    debug_printf: FunctionValue<'ctx>,
    initialise_engine: FunctionValue<'ctx>,

    /// Module-level `<PluginName>Handle` globals, created lazily
    plugin_handles: FxHashMap<String, GlobalValue<'ctx>>,
}

impl<'ctx> EngineInterface<'ctx> {
    /// Creates the module and declares the four runtime ABI functions. On
    /// Windows targets the declarations get DLL-import storage class.
    pub fn new(context: &'ctx Context, module_name: &str, target: TargetTriple) -> Self {
        let module = context.create_module(module_name);
        module.set_triple(&inkwell::targets::TargetTriple::create(
            &target.llvm_target_triple(),
        ));

        let ptr = context.ptr_type(AddressSpace::default());
        let void = context.void_type();
        let i32_ty = context.i32_type();

        let load_plugin =
            module.add_function("loadPlugin", ptr.fn_type(&[ptr.into()], false), None);
        let get_function_address = module.add_function(
            "getFunctionAddress",
            ptr.fn_type(&[ptr.into(), ptr.into()], false),
            None,
        );
        let debug_printf =
            module.add_function("debugPrintf", void.fn_type(&[ptr.into()], true), None);
        let initialise_engine =
            module.add_function("initialiseEngine", i32_ty.fn_type(&[], false), None);

        let interface = Self {
            context,
            module,
            target,
            load_plugin,
            get_function_address,
            debug_printf,
            initialise_engine,
            plugin_handles: FxHashMap::default(),
        };
        if interface.target.is_windows() {
            for function in [
                load_plugin,
                get_function_address,
                debug_printf,
                initialise_engine,
            ] {
                function
                    .as_global_value()
                    .set_dll_storage_class(DLLStorageClass::Import);
            }
        }
        interface
    }

    /// The module everything is generated into
    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    /// Hands the finished module to the caller
    pub fn into_module(self) -> Module<'ctx> {
        self.module
    }

    /// Declares an external function provided by another object file, such
    /// as the lowered game entry
    pub fn declare_external_function(
        &self,
        name: &str,
        function_type: FunctionType<'ctx>,
    ) -> FunctionValue<'ctx> {
        self.module
            .add_function(name, function_type, Some(Linkage::External))
    }

    /// The LLVM signature of a command overload
    pub fn command_function_type(&self, command: &Command) -> CodegenResult<FunctionType<'ctx>> {
        let params = command
            .args
            .iter()
            .map(|arg| self.abi_type(command, arg.ty).map(Into::into))
            .collect::<CodegenResult<Vec<BasicMetadataTypeEnum<'ctx>>>>()?;

        Ok(match command.return_type {
            CommandType::Void => self.context.void_type().fn_type(&params, false),
            other => self.abi_type(command, other)?.fn_type(&params, false),
        })
    }

    fn abi_type(&self, command: &Command, ty: CommandType) -> CodegenResult<BasicTypeEnum<'ctx>> {
        let ptr = self.context.ptr_type(AddressSpace::default());
        Ok(match ty {
            CommandType::Integer => self.context.i32_type().into(),
            CommandType::Float => self.context.f32_type().into(),
            CommandType::Double => self.context.f64_type().into(),
            CommandType::Long => self.context.i64_type().into(),
            CommandType::String | CommandType::Dword => ptr.into(),
            CommandType::Void | CommandType::X | CommandType::A => {
                return Err(CodegenError::UnresolvableCommandType {
                    command: command.name.clone(),
                    type_char: ty.to_char(),
                });
            }
        })
    }

    /// Emits the call trampoline for one command overload.
    ///
    /// The thunk resolves the command's address in its owning plugin via
    /// `getFunctionAddress` and forwards every argument. When the declared
    /// return type is `float` the plugin is called as returning a dword and
    /// the raw bits are punned back into a float through a stack slot.
    pub fn generate_command_thunk(
        &mut self,
        command: &Command,
        plugin: &Plugin,
        function_type: FunctionType<'ctx>,
    ) -> CodegenResult<FunctionValue<'ctx>> {
        let thunk_name = thunk_symbol_name(command);
        if let Some(existing) = self.module.get_function(&thunk_name) {
            return Ok(existing);
        }

        let function =
            self.module
                .add_function(&thunk_name, function_type, Some(Linkage::Internal));
        let builder = self.context.create_builder();
        let entry = self.context.append_basic_block(function, "");
        builder.position_at_end(entry);

        let ptr = self.context.ptr_type(AddressSpace::default());
        let f32_ty = self.context.f32_type();
        let returns_float = function_type.get_return_type() == Some(f32_ty.into());

        // The plugin-side signature: identical, except that float returns
        // come back as a dword.
        let params: Vec<BasicMetadataTypeEnum<'ctx>> = function_type
            .get_param_types()
            .into_iter()
            .map(Into::into)
            .collect();
        let plugin_function_type = if returns_float {
            ptr.fn_type(&params, function_type.is_var_arg())
        } else {
            function_type
        };

        let callee = self.plugin_function(
            &builder,
            plugin,
            &command.symbol,
            &format!("{thunk_name}Symbol"),
        )?;

        let forwarded: Vec<BasicMetadataValueEnum<'ctx>> = function
            .get_param_iter()
            .map(Into::into)
            .collect();
        let result = builder
            .build_indirect_call(plugin_function_type, callee, &forwarded, "result")?
            .try_as_basic_value()
            .left();

        if function_type.get_return_type().is_none() {
            builder.build_return(None)?;
        } else if returns_float {
            // Reinterpret the dword result's bits as a float through a
            // pointer-sized stack slot.
            let result = result.ok_or_else(|| {
                CodegenError::Builder(format!("plugin call for `{}` produced no value", command.name))
            })?;
            let slot = builder.build_alloca(ptr, "dword_storage")?;
            builder.build_store(slot, result)?;
            let as_float = builder.build_load(f32_ty, slot, "as_float")?;
            builder.build_return(Some(&as_float))?;
        } else {
            let result = result.ok_or_else(|| {
                CodegenError::Builder(format!("plugin call for `{}` produced no value", command.name))
            })?;
            builder.build_return(Some(&result))?;
        }

        tracing::debug!(command = %command.name, thunk = %thunk_name, "generated command thunk");
        Ok(function)
    }

    /// Emits the program's `main`: loads every plugin with DBProCore first,
    /// initialises the engine, then calls the game entry.
    pub fn generate_entry_point(
        &mut self,
        game_entry: FunctionValue<'ctx>,
        plugins: &[Plugin],
    ) -> CodegenResult<FunctionValue<'ctx>> {
        if plugins.is_empty() {
            return Err(CodegenError::NoPlugins);
        }

        // DBProCore initialises the engine core and must load first.
        let mut ordered: Vec<&Plugin> = plugins.iter().collect();
        if let Some(core) = ordered.iter().position(|plugin| plugin.is_core()) {
            ordered.swap(0, core);
        }
        if !ordered[0].is_core() {
            return Err(CodegenError::MissingCorePlugin);
        }

        let i32_ty = self.context.i32_type();
        let entry_point =
            self.module
                .add_function("main", i32_ty.fn_type(&[], false), Some(Linkage::External));
        let builder = self.context.create_builder();

        let loading_blocks: Vec<BasicBlock<'ctx>> = ordered
            .iter()
            .map(|plugin| {
                self.context
                    .append_basic_block(entry_point, &format!("load{}", plugin.name))
            })
            .collect();
        let initialise_block = self
            .context
            .append_basic_block(entry_point, "initialiseEngine");
        let failure_block = self
            .context
            .append_basic_block(entry_point, "failedToInitialiseEngine");
        let launch_block = self.context.append_basic_block(entry_point, "launchGame");

        for (i, plugin) in ordered.iter().enumerate() {
            builder.position_at_end(loading_blocks[i]);

            let file_name = builder
                .build_global_string_ptr(plugin.file_name(), &format!("{}Path", plugin.name))?
                .as_pointer_value();
            let handle = builder
                .build_call(self.load_plugin, &[file_name.into()], "handle")?
                .try_as_basic_value()
                .left()
                .ok_or_else(|| {
                    CodegenError::Builder("loadPlugin call produced no value".to_string())
                })?
                .into_pointer_value();
            builder.build_store(self.plugin_handle(plugin).as_pointer_value(), handle)?;

            let next_block = if i == ordered.len() - 1 {
                initialise_block
            } else {
                loading_blocks[i + 1]
            };
            let loaded = builder.build_is_not_null(handle, "loaded")?;
            builder.build_conditional_branch(loaded, next_block, failure_block)?;
        }

        builder.position_at_end(initialise_block);
        let status = builder
            .build_call(self.initialise_engine, &[], "status")?
            .try_as_basic_value()
            .left()
            .ok_or_else(|| {
                CodegenError::Builder("initialiseEngine call produced no value".to_string())
            })?
            .into_int_value();
        let ok = builder.build_int_compare(
            IntPredicate::EQ,
            status,
            i32_ty.const_int(0, false),
            "ok",
        )?;
        builder.build_conditional_branch(ok, launch_block, failure_block)?;

        builder.position_at_end(failure_block);
        builder.build_return(Some(&i32_ty.const_int(1, false)))?;

        builder.position_at_end(launch_block);
        builder.build_call(game_entry, &[], "")?;
        builder.build_return(Some(&i32_ty.const_int(0, false)))?;

        tracing::debug!(plugins = ordered.len(), "generated entry point");
        Ok(entry_point)
    }

    /// Loads the command's address out of its plugin
    fn plugin_function(
        &mut self,
        builder: &Builder<'ctx>,
        plugin: &Plugin,
        symbol: &str,
        symbol_global_name: &str,
    ) -> CodegenResult<PointerValue<'ctx>> {
        let ptr = self.context.ptr_type(AddressSpace::default());
        let handle_var = self.plugin_handle(plugin);
        let handle = builder.build_load(ptr, handle_var.as_pointer_value(), "plugin_handle")?;
        let symbol_name = builder
            .build_global_string_ptr(symbol, symbol_global_name)?
            .as_pointer_value();
        let address = builder
            .build_call(
                self.get_function_address,
                &[handle.into(), symbol_name.into()],
                "address",
            )?
            .try_as_basic_value()
            .left()
            .ok_or_else(|| {
                CodegenError::Builder("getFunctionAddress call produced no value".to_string())
            })?;
        Ok(address.into_pointer_value())
    }

    /// The module-level handle variable for a plugin, created on first use
    /// and initialised to null
    fn plugin_handle(&mut self, plugin: &Plugin) -> GlobalValue<'ctx> {
        if let Some(&existing) = self.plugin_handles.get(&plugin.name) {
            return existing;
        }
        let ptr = self.context.ptr_type(AddressSpace::default());
        let global = self
            .module
            .add_global(ptr, None, &format!("{}Handle", plugin.name));
        global.set_linkage(Linkage::Internal);
        global.set_initializer(&ptr.const_null());
        self.plugin_handles.insert(plugin.name.clone(), global);
        global
    }
}

/// The internal symbol name of a command's thunk; display names may contain
/// spaces and sigils, and overloads need distinct symbols, so the argument
/// letters are appended.
fn thunk_symbol_name(command: &Command) -> String {
    let mut name = String::from("cmd_");
    for c in command.name.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => name.push(c.to_ascii_lowercase()),
            ' ' => name.push('_'),
            '$' => name.push_str("_str"),
            '#' => name.push_str("_flt"),
            _ => name.push('_'),
        }
    }
    name.push('_');
    name.push(command.return_type.to_char());
    for arg in &command.args {
        name.push(arg.ty.to_char());
    }
    name
}

#[cfg(test)]
mod tests {
    use dbasic_commands::{CommandArg, PluginId};

    use super::*;

    #[test]
    fn test_thunk_symbol_names_are_distinct_per_overload() {
        let a = Command::new(
            "print string$",
            vec![CommandArg::new(CommandType::String)],
            CommandType::Void,
            PluginId::from_raw(0),
            "PrintS",
        );
        let b = Command::new(
            "print string$",
            vec![CommandArg::new(CommandType::Integer)],
            CommandType::Void,
            PluginId::from_raw(0),
            "PrintL",
        );
        assert_eq!(thunk_symbol_name(&a), "cmd_print_string_str_0S");
        assert_ne!(thunk_symbol_name(&a), thunk_symbol_name(&b));
    }
}

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Once,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use nova_core::{
    compiler::{CompileError, compile_source},
    vm::{BytecodeModule, Vm, VmLimits, disassemble},
};
use tracing::debug;

static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "nova_core=debug,nova=debug";


#[derive(Debug, Parser)]
#[command(name = "nova", author, version, about = "Compiler and VM for Nova", long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compile a source file into a NOVABC module.
    Compile {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// Execute a compiled module.
    Run {
        #[arg(value_name = "MODULE")]
        module: PathBuf,
        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Compile a source file in memory and execute it.
    Exec {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,
        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Print the string pool and instruction listing of a module.
    Disasm {
        #[arg(value_name = "MODULE")]
        module: PathBuf,
        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Overrides for the VM capacities; unset flags keep the defaults.
#[derive(Debug, Clone, Copy, Default, Args)]
struct LimitArgs {
    /// Operand stack capacity in cells
    #[arg(long, value_name = "N")]
    max_stack: Option<usize>,
    /// Maximum call depth
    #[arg(long, value_name = "N")]
    max_frames: Option<usize>,
    /// Abort after executing N instructions
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,
}

impl LimitArgs {
    fn to_limits(self) -> VmLimits {
        let defaults = VmLimits::default();
        VmLimits {
            max_stack: self.max_stack.unwrap_or(defaults.max_stack),
            max_frames: self.max_frames.unwrap_or(defaults.max_frames),
            max_steps: self.max_steps.or(defaults.max_steps),
            ..defaults
        }
    }
}

fn env_toggle_enabled(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    !(trimmed.eq_ignore_ascii_case("0") || trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("off"))
}

fn filter_expr_from(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("1")
        || trimmed.eq_ignore_ascii_case("true")
        || trimmed.eq_ignore_ascii_case("on")
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Install a stderr subscriber when `NOVA_TRACE` is set. Program output owns stdout.
fn maybe_init_tracing() {
    let raw = match std::env::var("NOVA_TRACE") {
        Ok(value) => value,
        Err(_) => return,
    };

    if !env_toggle_enabled(&raw) {
        return;
    }

    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let filter_expr = filter_expr_from(&raw).or_else(|| std::env::var("RUST_LOG").ok());

        let builder = fmt().with_writer(io::stderr);

        let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };

        let _ = builder.try_init();
    });
}

fn read_source(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read source '{}'", path.display()))
}

/// The single diagnostic line printed for a failed command.
fn diagnostic(err: &anyhow::Error) -> String {
    match err.downcast_ref::<CompileError>() {
        Some(compile) => format!("error(line {}): {}", compile.line, compile.kind),
        None => format!("error: {:#}", err),
    }
}

fn execute(module: &BytecodeModule, limits: VmLimits) -> anyhow::Result<()> {
    let mut vm = Vm::with_limits(limits);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = vm.run(module, &mut out);
    let limits = vm.limits();
    debug!(
        steps = vm.steps(),
        pc = vm.pc(),
        max_stack = limits.max_stack,
        max_frames = limits.max_frames,
        ok = result.is_ok(),
        "program finished"
    );
    result?;
    Ok(())
}

fn dispatch(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Compile { source, output } => {
            let src = read_source(&source)?;
            let module = compile_source(&src)?;
            module.save(&output)?;
            debug!(
                source = %source.display(),
                output = %output.display(),
                code_len = module.code.len(),
                "wrote module"
            );
            Ok(())
        }
        Commands::Run { module, limits } => {
            let module = BytecodeModule::load(&module)?;
            execute(&module, limits.to_limits())
        }
        Commands::Exec { source, limits } => {
            let src = read_source(&source)?;
            let module = compile_source(&src)?;
            execute(&module, limits.to_limits())
        }
        Commands::Disasm { module, json } => {
            let module = BytecodeModule::load(&module)?;
            let listing = disassemble(&module)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &listing)?;
                writeln!(out)?;
            } else {
                write!(out, "{}", listing)?;
            }
            out.flush()?;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    maybe_init_tracing();

    let CliArgs { command } = CliArgs::parse();

    match dispatch(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", diagnostic(&err));
            ExitCode::FAILURE
        }
    }
}

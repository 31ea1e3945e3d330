//! Compiler driver: the `tulpar` binary's entry point, wiring
//! lex → parse → (interpret | lower → codegen → link) into one CLI.
//!
//! Tulpar has a single pipeline rather than the multi-command shape a
//! general-purpose asset tool might have, so this crate exposes one
//! flat `Cli` (no subcommands) whose flags pick which stage the run
//! stops at and which of the two execution paths (§4.5/§4.6) it takes.

pub mod error;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser as ClapParser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tulpar_interp::Interpreter;
use tulpar_lex::{Lexer, Token};
use tulpar_par::Parser as TulparParser;
use tulpar_util::{Diagnostic, Handler, Level};

pub use error::{DriverError, Result};

/// `tulpar <source> [options]` — compiles and runs (or just compiles,
/// with `--aot -o`) one Tulpar source file. No subcommands: the core
/// toolchain has exactly one pipeline (§6's CLI surface).
#[derive(ClapParser, Debug)]
#[command(name = "tulpar")]
#[command(author = "Tulpar Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run or compile a Tulpar source file", long_about = None)]
pub struct Cli {
    /// Source file to run or compile.
    pub source: PathBuf,

    /// Ahead-of-time compile via LLVM instead of tree-walking (§4.5).
    /// Default is to interpret (§4.6).
    #[arg(long)]
    pub aot: bool,

    /// Output path for `--aot` (object file unless `--emit-ir` is
    /// also given, in which case it receives textual LLVM IR).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target triple for `--aot` (defaults to the host triple).
    #[arg(long)]
    pub target: Option<String>,

    /// Print the token stream and stop.
    #[arg(long)]
    pub emit_tokens: bool,

    /// Print the parsed AST and stop.
    #[arg(long)]
    pub emit_ast: bool,

    /// Print the lowered `tulpar-ir` module and stop (`--aot` only
    /// pulls in LLVM past this point, so this is the cheapest way to
    /// inspect AOT lowering without a codegen backend).
    #[arg(long)]
    pub emit_ir: bool,

    /// Verbose diagnostic logging.
    #[arg(short, long, global = true, env = "TULPAR_VERBOSE")]
    pub verbose: bool,

    /// Disable colored diagnostic output.
    #[arg(long, global = true, env = "TULPAR_NO_COLOR")]
    pub no_color: bool,
}

/// Binary entry point: parses arguments, sets up logging, and runs
/// the pipeline. Returns the process exit code a caller should use.
pub fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color)?;

    let code = run(&cli)?;
    std::process::exit(code);
}

fn init_logging(verbose: bool, no_color: bool) -> anyhow::Result<()> {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::new("info") };
    let subscriber = fmt::layer().with_ansi(!no_color).with_target(false).with_thread_ids(false).with_thread_names(false);

    // `try_init` rather than `init`: under `cargo test`, every test binary
    // shares one process and a second call would panic on the global
    // subscriber already being set.
    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
    Ok(())
}

/// Runs the pipeline described by `cli` and returns the process exit
/// code (§6: 0 unless an explicit top-level `return` supplies one).
pub fn run(cli: &Cli) -> Result<i32> {
    let source = std::fs::read_to_string(&cli.source).map_err(|e| DriverError::Io(cli.source.clone(), e))?;
    let handler = Handler::new();

    if cli.emit_tokens {
        emit_tokens(&source, &handler);
        print_diagnostics(&handler, cli.no_color);
        return Ok(if handler.has_errors() { 1 } else { 0 });
    }

    let mut parser = TulparParser::new(&source, &handler);
    let program = parser.parse();
    tracing::debug!(statements = %program_len(&program), "parsed program");

    if cli.emit_ast {
        println!("{:#?}", program);
        print_diagnostics(&handler, cli.no_color);
        return Ok(if handler.has_errors() { 1 } else { 0 });
    }

    if cli.aot {
        return run_aot(cli, &program, &handler);
    }

    print_diagnostics(&handler, cli.no_color);
    let mut interpreter = Interpreter::new();
    Ok(interpreter.run(&program) as i32)
}

fn run_aot(cli: &Cli, program: &tulpar_par::Node, handler: &Handler) -> Result<i32> {
    let source_dir = cli.source.parent().map(|p| p.to_path_buf()).unwrap_or_else(|| PathBuf::from("."));
    let module = tulpar_lower::lower_program(program, handler, &source_dir);
    tracing::debug!(functions = module.functions.len(), "lowered to tulpar-ir");

    if cli.emit_ir {
        println!("{:#?}", module);
        print_diagnostics(handler, cli.no_color);
        return Ok(if handler.has_errors() { 1 } else { 0 });
    }

    print_diagnostics(handler, cli.no_color);

    let target_triple = cli.target.clone().unwrap_or_else(host_target_triple);
    let context = inkwell::context::Context::create();
    let mut backend = tulpar_codegen::LlvmBackend::new(
        &context,
        module_name(&cli.source),
        target_triple.clone(),
        inkwell::OptimizationLevel::Default,
    );
    backend.compile_module(&module)?;
    backend.optimize();

    let output = cli.output.clone().unwrap_or_else(|| default_output_path(&cli.source));
    backend.write_object_file(&output)?;

    // Linking is an external collaborator (spec.md §1's scope note):
    // the linker invocation itself — which system linker, which
    // runtime libraries — is left to whatever wraps this driver.
    let linker = tulpar_codegen::Linker::new(target_triple);
    let _ = linker.link(&[output.as_path()], &output, &[]);

    tracing::info!(output = %output.display(), "wrote AOT artifact");
    Ok(0)
}

fn emit_tokens(source: &str, handler: &Handler) {
    let mut lexer = Lexer::new(source, handler);
    loop {
        let token = lexer.next_token();
        let is_eof = token == Token::Eof;
        println!(
            "{}:{} {:?}",
            lexer.token_start_line(),
            lexer.token_start_column(),
            token
        );
        if is_eof {
            break;
        }
    }
}

fn program_len(program: &tulpar_par::Node) -> usize {
    match program {
        tulpar_par::Node::Program(stmts) => stmts.len(),
        _ => 0,
    }
}

fn print_diagnostics(handler: &Handler, no_color: bool) {
    for diag in handler.diagnostics() {
        print_one_diagnostic(&diag, no_color);
    }
}

fn print_one_diagnostic(diag: &Diagnostic, no_color: bool) {
    let level = diag.level;
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    if no_color {
        let _ = writeln!(out, "{}:{}: {}: {}", diag.span.line, diag.span.column, level, diag.message);
    } else {
        let color = match diag.level {
            Level::Error => "\x1b[31m",
            Level::Warning => "\x1b[33m",
            Level::Note | Level::Help => "\x1b[36m",
        };
        let _ = writeln!(out, "{}:{}: {}{}\x1b[0m: {}", diag.span.line, diag.span.column, color, level, diag.message);
    }
    for note in &diag.notes {
        let _ = writeln!(out, "  note: {}", note);
    }
    for help in &diag.helps {
        let _ = writeln!(out, "  help: {}", help);
    }
}

fn module_name(source: &std::path::Path) -> &str {
    source.file_stem().and_then(|s| s.to_str()).unwrap_or("tulpar_module")
}

fn default_output_path(source: &std::path::Path) -> PathBuf {
    source.with_extension("o")
}

fn host_target_triple() -> String {
    inkwell::targets::TargetMachine::get_default_triple().as_str().to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_source_argument() {
        let cli = Cli::parse_from(["tulpar", "prog.tlp"]);
        assert_eq!(cli.source, PathBuf::from("prog.tlp"));
        assert!(!cli.aot);
        assert!(!cli.verbose);
    }

    #[test]
    fn parses_aot_with_output() {
        let cli = Cli::parse_from(["tulpar", "prog.tlp", "--aot", "-o", "prog.o"]);
        assert!(cli.aot);
        assert_eq!(cli.output, Some(PathBuf::from("prog.o")));
    }

    #[test]
    fn parses_emit_flags() {
        let cli = Cli::parse_from(["tulpar", "prog.tlp", "--emit-tokens"]);
        assert!(cli.emit_tokens);
        assert!(!cli.emit_ast);

        let cli = Cli::parse_from(["tulpar", "prog.tlp", "--emit-ast"]);
        assert!(cli.emit_ast);
    }

    #[test]
    fn parses_verbose_and_no_color() {
        let cli = Cli::parse_from(["tulpar", "prog.tlp", "--verbose", "--no-color"]);
        assert!(cli.verbose);
        assert!(cli.no_color);
    }

    #[test]
    fn default_output_path_replaces_source_extension_with_o() {
        assert_eq!(default_output_path(std::path::Path::new("prog.tlp")), PathBuf::from("prog.o"));
    }

    #[test]
    fn module_name_is_the_file_stem() {
        assert_eq!(module_name(std::path::Path::new("dir/prog.tlp")), "prog");
    }
}

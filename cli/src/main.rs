mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cblink::Config;

#[derive(Parser)]
#[command(name = "cblink", version, about = "Link Core Blockchain tokens in Markdown")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Annotate a Markdown file and print the result
    Annotate(AnnotateArgs),

    /// Report addresses that fail checksum verification
    Check(CheckArgs),

    /// Run .test.md fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct AnnotateArgs {
    /// Markdown source file
    file: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip address checksum verification
    #[arg(long)]
    no_validation: bool,

    /// Emit reference-style links for every network
    #[arg(long)]
    no_link_networks: bool,

    /// Log every synthesized node
    #[arg(long)]
    debug: bool,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Markdown source file
    file: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let cli = Cli::parse();

    let debug = matches!(&cli.command, Command::Annotate(args) if args.debug);
    init_logging(cli.verbose || debug, cli.no_color);

    match cli.command {
        Command::Annotate(args) => do_annotate(args),
        Command::Check(args) => do_check(args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn init_logging(verbose: bool, no_color: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!no_color)
                .with_target(true),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    match Config::load(path) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn read_source(file: &str) -> String {
    match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", file, e);
            process::exit(1);
        }
    }
}

fn ican_validator(payload: &str, strict: bool) -> bool {
    ican::is_valid(payload, strict)
}

fn do_annotate(args: AnnotateArgs) {
    let mut config = load_config(args.config.as_deref());
    if args.no_validation {
        config.enable_validation = false;
    }
    if args.no_link_networks {
        config.link_networks = false;
    }
    if args.debug {
        config.debug = true;
    }

    let source = read_source(&args.file);
    let output = cblink::annotate_markdown(&source, &config, &ican_validator);

    match args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, output) {
                eprintln!("error: cannot write '{}': {}", path.display(), e);
                process::exit(1);
            }
        }
        None => print!("{}", output),
    }
}

fn do_check(args: CheckArgs, no_color: bool) {
    let config = load_config(args.config.as_deref());
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let source = read_source(&args.file);

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let parser = cblink::parser::Parser::new(source, file_id);
    let diagnostics = parser.lint(&config, &ican_validator);

    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();
    for diagnostic in &diagnostics {
        let _ = term::emit_to_write_style(
            &mut writer.lock(),
            &term_config,
            &files,
            &diagnostic.to_diagnostic(),
        );
    }

    if diagnostics.is_empty() {
        eprintln!("ok: {} has no invalid addresses", args.file);
    } else {
        eprintln!("{}: {} invalid address(es)", args.file, diagnostics.len());
        process::exit(1);
    }
}

//! cu front end driver
//!
//! Command-line entry point for the front end. Each subcommand runs the
//! pipeline up to one stage and prints its result, as text or as JSON.

use clap::{ArgAction, Parser, Subcommand};
use cu_common::{CompilerError, Diagnostic};
use cu_frontend::{format_module, Frontend, FrontendConfig};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cuc")]
#[command(about = "cu front end")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Extra directory to search for `include`d files
    #[arg(short = 'I', long = "include-dir", global = true)]
    include_dirs: Vec<PathBuf>,

    /// Do not resolve names from the builtin headers
    #[arg(long, global = true)]
    no_builtins: bool,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream, including layout tokens
    Tokens {
        /// Input source file
        input: PathBuf,
    },

    /// Parse a file and print it back
    Parse {
        /// Input source file
        input: PathBuf,
    },

    /// Check a file and print the decorated tree
    Check {
        /// Input source file
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = build_config(&cli);
    let result = match &cli.command {
        Commands::Tokens { input } => tokens_command(input, cli.json),
        Commands::Parse { input } => parse_command(input, cli.json),
        Commands::Check { input } => check_command(input, config, cli.json),
    };

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            let diagnostic = Diagnostic::from(&e);
            if cli.json {
                match serde_json::to_string_pretty(&diagnostic) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("{}", diagnostic),
                }
            } else {
                eprintln!("{}", diagnostic);
            }
            std::process::exit(1);
        }
    }
}

fn build_config(cli: &Cli) -> FrontendConfig {
    let mut config = FrontendConfig::default();
    for dir in &cli.include_dirs {
        config = config.with_include_dir(dir.clone());
    }
    if cli.no_builtins {
        config = config.without_builtins();
    }
    config
}

fn read_source(input: &Path) -> Result<String, CompilerError> {
    fs::read_to_string(input).map_err(|err| CompilerError::IoError {
        message: format!("{}: {}", input.display(), err),
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CompilerError> {
    serde_json::to_string_pretty(value)
        .map(|json| json + "\n")
        .map_err(|err| CompilerError::from(format!("cannot serialize output: {}", err)))
}

fn tokens_command(input: &Path, json: bool) -> Result<String, CompilerError> {
    let source = read_source(input)?;
    let tokens = Frontend::tokenize_source(&source, &input.display().to_string())?;
    if json {
        return to_json(&tokens);
    }

    let mut output = String::new();
    for token in &tokens {
        output.push_str(&format!("{}:{}\t{}\n", token.line(), token.column(), token.token_type));
    }
    Ok(output)
}

fn parse_command(input: &Path, json: bool) -> Result<String, CompilerError> {
    let source = read_source(input)?;
    let module = Frontend::parse_source(&source, &input.display().to_string())?;
    if json {
        return to_json(&module);
    }
    Ok(format_module(&module))
}

fn check_command(input: &Path, config: FrontendConfig, json: bool) -> Result<String, CompilerError> {
    let unit = Frontend::check_file(input, config)?;
    log::debug!(
        "{} checked: {} builtin headers, {} included files",
        input.display(),
        unit.headers.len(),
        unit.units.len()
    );
    if json {
        return to_json(&unit);
    }

    let mut output = String::new();
    for header in &unit.headers {
        output.push_str(&format!("# needs {}\n", header));
    }
    for path in unit.units.keys() {
        output.push_str(&format!("# includes {}\n", path.display()));
    }
    output.push_str(&format_module(&unit.module));
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn source_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".cu").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_tokens_command_lists_layout_tokens() {
        let file = source_file("if x:\n    pass\n");
        let output = tokens_command(file.path(), false).unwrap();
        assert_eq!(output.lines().count(), 9);
        assert!(output.starts_with("1:1\t"));
    }

    #[test]
    fn test_check_command_reports_headers() {
        let file = source_file("n = strlen(\"abc\")\n");
        let output = check_command(file.path(), FrontendConfig::default(), false).unwrap();
        assert_eq!(
            output,
            "# needs stdlib.h\n# needs string.h\nn: uint = strlen(\"abc\")\n"
        );
    }

    #[test]
    fn test_check_command_json() {
        let file = source_file("x = 1\n");
        let output = check_command(file.path(), FrontendConfig::default(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["headers"], serde_json::json!([]));
        assert_eq!(value["globals"]["variables"]["x"], serde_json::json!({ "Scalar": "int" }));
    }

    #[test]
    fn test_errors_become_diagnostics() {
        let file = source_file("x = y\n");
        let err = check_command(file.path(), FrontendConfig::default(), false).unwrap_err();
        let diagnostic = Diagnostic::from(&err);
        assert_eq!(diagnostic.message, "Undefined name 'y'");
        assert_eq!(diagnostic.location.map(|l| (l.line, l.column)), Some((1, 5)));
    }

    #[test]
    fn test_missing_input() {
        let err = parse_command(Path::new("/nonexistent/input.cu"), false).unwrap_err();
        assert!(err.message().starts_with("/nonexistent/input.cu: "));
    }
}

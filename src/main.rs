use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use trellis::fmt::format_outline;
use trellis::grammar::{arith, outline, statements};
use trellis::interpreter::{self, Scope};
use trellis::parser::{ParseErrors, RecoveredItem};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Parse arithmetic, statement files and outlines")]
struct Args {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Source name used in diagnostics, defaults to the file path
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and evaluate a single expression
    Eval { expression: String },
    /// Parse a statement file with recovery and evaluate what parsed
    Check { file: PathBuf },
    /// Parse an indented outline
    Outline { file: PathBuf },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    match &args.command {
        Command::Eval { expression } => {
            let name = args.name.as_deref().unwrap_or("<expression>");
            eval(expression, name, args.format)
        }
        Command::Check { file } => {
            let (name, source) = read_source(file, args.name.as_deref())?;
            check(&source, &name, args.format)
        }
        Command::Outline { file } => {
            let (name, source) = read_source(file, args.name.as_deref())?;
            show_outline(&source, &name, args.format)
        }
    }
}

fn read_source(file: &Path, name: Option<&str>) -> anyhow::Result<(String, String)> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| file.display().to_string());
    Ok((name, source))
}

fn report(errors: &ParseErrors, format: Format) -> anyhow::Result<ExitCode> {
    match format {
        Format::Text => eprintln!("{errors}"),
        Format::Json => println!("{}", serde_json::to_string_pretty(errors)?),
    }
    Ok(ExitCode::FAILURE)
}

fn eval(input: &str, name: &str, format: Format) -> anyhow::Result<ExitCode> {
    let expr = match arith::parse_expression(name, input) {
        Ok(expr) => expr,
        Err(errors) => return report(&errors, format),
    };
    let value = expr.eval(&Scope::new()).with_context(|| format!("evaluating {expr}"))?;
    match format {
        Format::Text => println!("{value}"),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "expression": expr, "value": value }))?
        ),
    }
    Ok(ExitCode::SUCCESS)
}

fn check(source: &str, name: &str, format: Format) -> anyhow::Result<ExitCode> {
    let items = match statements::parse_statements(name, source) {
        Ok(items) => items,
        Err(errors) => return report(&errors, format),
    };
    let recovered = items.iter().filter(|item| item.is_recovered()).count();
    log::info!("{name}: {} statements, {recovered} recovered", items.len());

    let (parsed, failures) = RecoveredItem::partition(items.clone());
    let bindings = interpreter::run(&parsed);

    match format {
        Format::Text => {
            for failure in &failures {
                eprintln!("{name}:{failure}");
            }
            match &bindings {
                Ok(bindings) => {
                    for (variable, value) in bindings {
                        println!("{variable} = {value}");
                    }
                }
                Err(err) => eprintln!("{name}: {err}"),
            }
        }
        Format::Json => {
            let report = json!({
                "source": name,
                "items": items,
                "bindings": bindings.as_ref().ok(),
                "error": bindings.as_ref().err().map(ToString::to_string),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if failures.is_empty() && bindings.is_ok() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn show_outline(source: &str, name: &str, format: Format) -> anyhow::Result<ExitCode> {
    let items = match outline::parse_outline(name, source) {
        Ok(items) => items,
        Err(errors) => return report(&errors, format),
    };
    match format {
        Format::Text => print!("{}", format_outline(&items)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&items)?),
    }
    Ok(ExitCode::SUCCESS)
}

use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use layout_audit::{run, AuditOptions};

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.first().is_some_and(|arg| arg == "-h" || arg == "--help") {
        println!("{}", usage_text());
        return Ok(());
    }

    let mut options = AuditOptions::default();
    let mut path = None;
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--dimension" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --dimension".to_string())?;
                options.dimension = value
                    .parse::<u32>()
                    .ok()
                    .filter(|dimension| *dimension > 0)
                    .ok_or_else(|| format!("invalid --dimension value '{value}' (expected positive u32)"))?;
                index += 2;
            }
            "--strict" => {
                options.strict = true;
                index += 1;
            }
            "--list-gaps" => {
                options.list_gaps = true;
                index += 1;
            }
            flag if flag.starts_with("--") => {
                return Err(format!("unknown option '{flag}'\n\n{}", usage_text()));
            }
            value => {
                if path.is_some() {
                    return Err(format!("unexpected argument '{value}'"));
                }
                path = Some(PathBuf::from(value));
                index += 1;
            }
        }
    }
    if let Some(path) = path {
        options.path = path;
    }

    run(&options, &mut io::stdout())
}

fn usage_text() -> String {
    [
        "layout_audit - report how a tile layout builds into a world",
        "",
        "Usage:",
        "  layout_audit [<layout.csv>] [--dimension <u32>] [--strict] [--list-gaps]",
        "",
        "Defaults:",
        "  <layout.csv> assets/layout.csv",
        "  --dimension 80",
        "",
        "--strict exits non-zero when a path cell has no tile or a code is unknown.",
        "--list-gaps prints every neighborhood the path rules leave untiled.",
    ]
    .join("\n")
}

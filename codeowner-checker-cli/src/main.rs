use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use codeowner_checker::{
    matching_rules, resolve, OwnershipFile, Resolution, ResolutionQuery, CODEOWNERS_FILE_NAME,
};
use tracing_subscriber::EnvFilter;

mod config;
mod notify;
mod session;
mod workspace;

use config::Config;
use notify::TerminalSink;
use session::Session;
use workspace::Workspace;

#[derive(Parser)]
#[command(version, about = "Check whether you are a code owner of a file")]
struct Cli {
    /// Workspace root containing the CODEOWNERS files
    #[arg(short = 'C', long = "workspace", default_value = ".", global = true)]
    workspace: PathBuf,

    /// Your identifier as it appears in CODEOWNERS files
    #[arg(short, long, env = "CODEOWNER_CHECKER_USER", global = true)]
    user: Option<String>,

    /// Log more (repeatable); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether you own each of the given files
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Check each path read from stdin as it becomes the active file.
    /// A line `:user NAME` changes the user; `:user` alone clears it
    Follow,
    /// List every rule matching a file and who it belongs to
    Explain { path: PathBuf },
    /// Report unparseable lines and invalid patterns
    Validate,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = env::current_dir().context("failed to determine current directory")?;
    let workspace = Workspace::new(&cli.workspace, cwd);
    let config = Config::new(cli.user);

    match cli.command {
        Command::Check { paths } => check(&workspace, config, &paths),
        Command::Follow => {
            let sink = TerminalSink::new(io::stdout());
            let mut session = Session::new(&workspace, config, sink);
            session.run(io::stdin().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Explain { path } => explain(&workspace, &config, &path),
        Command::Validate => validate(&workspace),
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// Exit status: 0 if every path is owned, 1 if any isn't, 2 if ownership
// couldn't be determined.
fn check(workspace: &Workspace, config: Config, paths: &[PathBuf]) -> Result<ExitCode> {
    let mut session = Session::new(workspace, config, TerminalSink::new(io::stdout()));
    let mut status = 0;
    for path in paths {
        let code = match session.check(path)? {
            Resolution::Owner(_) => 0,
            Resolution::NotOwner => 1,
            Resolution::ConfigurationMissing | Resolution::NoOwnershipFiles => 2,
        };
        status = status.max(code);
    }
    Ok(ExitCode::from(status))
}

fn explain(workspace: &Workspace, config: &Config, path: &Path) -> Result<ExitCode> {
    let target = workspace.relative_path(path);
    let files = workspace.load_ownership_files();
    let resolution = resolve(&ResolutionQuery::new(&target, config.user()), &files);

    let mut out = io::stdout().lock();
    writeln!(out, "{}", target)?;
    let matches = matching_rules(&target, &files);
    if matches.is_empty() {
        writeln!(out, "  (no matching rules)")?;
    }
    for m in matches {
        let granted = matches!(
            &resolution,
            Resolution::Owner(owner) if owner.file_index == m.file_index && owner.line == m.rule.line()
        );
        writeln!(
            out,
            "{} {}:{:<4} {:<30}  {}",
            if granted { "*" } else { " " },
            display_path(m.file),
            m.rule.line(),
            m.rule.pattern(),
            m.rule.owners().join(" ")
        )?;
    }
    writeln!(out, "{}", resolution.notice())?;
    Ok(ExitCode::SUCCESS)
}

fn validate(workspace: &Workspace) -> Result<ExitCode> {
    let files = workspace.load_ownership_files();
    let mut out = io::stdout().lock();
    let mut problems = 0;
    for file in &files {
        for err in file.parse_errors() {
            writeln!(out, "{}:{}: {}", display_path(file), err.line, err.message)?;
            problems += 1;
        }
        for (rule, err) in file.invalid_patterns() {
            writeln!(out, "{}:{}: {}", display_path(file), rule.line(), err)?;
            problems += 1;
        }
    }

    if problems == 0 {
        writeln!(
            out,
            "{} ownership file(s) under {} OK",
            files.len(),
            workspace.root().display()
        )?;
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn display_path(file: &OwnershipFile) -> String {
    if file.root_directory().is_empty() {
        CODEOWNERS_FILE_NAME.to_owned()
    } else {
        format!("{}/{}", file.root_directory(), CODEOWNERS_FILE_NAME)
    }
}

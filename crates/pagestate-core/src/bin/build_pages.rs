use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Parser;

use pagestate_core::{init_logging, PageEntrySelector, PageRequest, PageSelection, BUILD_PAGES_ENV};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build all pages or a chosen subset")]
struct Cli {
    /// Pages to build (login, user-center, userCenter, user, all). Defaults to all.
    #[arg(value_name = "PAGE")]
    pages: Vec<String>,

    /// Bundler command, run through the shell.
    #[arg(long, value_name = "CMD", default_value = "vite build")]
    command: String,

    /// Print the selection without running the bundler.
    #[arg(long)]
    dry_run: bool,

    /// Print the accepted page names and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    if cli.list {
        for name in PageRequest::NAMES {
            println!("{}", name);
        }
        return Ok(());
    }

    let selection = PageEntrySelector::select(&cli.pages);
    match selection.build_pages_value() {
        Some(value) => println!("Building pages: {}", value),
        None => println!("Building all pages"),
    }
    for (target, document) in selection.entries() {
        println!("  {:<12} {}", target, document);
    }

    if cli.dry_run {
        return Ok(());
    }

    let status = build_command(&cli.command, &selection)
        .status()
        .with_context(|| format!("failed to start `{}`", cli.command))?;
    if !status.success() {
        bail!("`{}` failed with {}", cli.command, status);
    }

    println!("Build finished");
    Ok(())
}

fn build_command(command: &str, selection: &PageSelection) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    match selection.build_pages_value() {
        Some(value) => {
            cmd.env(BUILD_PAGES_ENV, value);
        }
        None => {
            cmd.env_remove(BUILD_PAGES_ENV);
        }
    }
    cmd
}

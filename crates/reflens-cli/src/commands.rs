use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;
use reflens_refs::{Config, GitCommandSource, RefDatabase, RefSource, Reference};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let source = GitCommandSource::new(&config.source)?;
    let mut db = RefDatabase::new(source, config.repo);
    db.load(false).context("failed to load references")?;

    match cli.command {
        Command::List(args) => cmd_list(&db, args, &cli.format),
        Command::Head => cmd_head(&db, &cli.format),
        Command::At(args) => cmd_at(&mut db, args, &cli.format),
    }
}

/// Config file first, then command-line flags on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.git_dir {
        config.repo.git_dir = Some(dir.clone());
    }
    if config.repo.git_dir.is_none() {
        config.repo.git_dir = Some(PathBuf::from("."));
    }
    if let Some(remote) = &cli.remote {
        config.repo.remote = remote.clone();
    }
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn cmd_list<S: RefSource>(
    db: &RefDatabase<S>,
    args: ListArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut refs = Vec::new();
    db.for_each(|r| {
        if args.limit.is_some_and(|limit| refs.len() >= limit) {
            return ControlFlow::Break(());
        }
        refs.push(r);
        ControlFlow::Continue(())
    });
    print_refs(&refs, format)
}

fn cmd_head<S: RefSource>(db: &RefDatabase<S>, format: &OutputFormat) -> anyhow::Result<()> {
    match (db.head(), format) {
        (Some(head), OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(head)?),
        (Some(head), OutputFormat::Text) => println!("{}", render_line(head)),
        (None, OutputFormat::Json) => println!("null"),
        (None, OutputFormat::Text) => println!("{}", "HEAD is not set".dimmed()),
    }
    Ok(())
}

fn cmd_at<S: RefSource>(
    db: &mut RefDatabase<S>,
    args: AtArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let refs = db.refs_at(&args.id)?;
    if refs.is_empty() && matches!(format, OutputFormat::Text) {
        println!("No references point at {}.", args.id.yellow());
        return Ok(());
    }
    print_refs(&refs, format)
}

fn print_refs(refs: &[&Reference], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(refs)?),
        OutputFormat::Text => {
            for r in refs {
                println!("{}", render_line(r));
            }
        }
    }
    Ok(())
}

fn render_line(r: &Reference) -> String {
    format!("{} {}", r.id().dimmed(), render_name(r))
}

/// Decorate a ref the way a log view labels commits.
fn render_name(r: &Reference) -> String {
    let label = if r.is_tag() {
        format!("[{}]", r.name()).yellow()
    } else if r.is_head() {
        format!("[{}]", r.name()).green().bold()
    } else if r.is_tracked_remote_head() {
        format!("{{{}}}", r.name()).cyan().bold()
    } else if r.is_remote() {
        format!("{{{}}}", r.name()).red()
    } else if r.is_replace() {
        format!("<{}>", r.name()).magenta()
    } else {
        format!("[{}]", r.name()).normal()
    };
    label.to_string()
}

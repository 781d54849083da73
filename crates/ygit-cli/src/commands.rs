use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use ygit_sdk::{
    global_config_path, hash_blob, Config, ConfigScope, InspectMode, ObjectId, Repository,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::HashObject(args) => cmd_hash_object(args),
        Command::CatFile(args) => cmd_cat_file(args),
        Command::Add(args) => cmd_add(args),
        Command::WriteTree => cmd_write_tree(),
        Command::Config(args) => cmd_config(args),
    }
}

fn current_repo() -> anyhow::Result<Repository> {
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    Ok(Repository::discover(&cwd)?)
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let path = PathBuf::from(args.path.unwrap_or_else(|| ".".into()));
    let repo = Repository::init(&path)?;
    println!(
        "{} Initialized empty ygit repository in {}",
        "✓".green().bold(),
        repo.meta_dir().display().to_string().bold()
    );
    Ok(())
}

fn cmd_hash_object(args: HashObjectArgs) -> anyhow::Result<()> {
    let path = Path::new(&args.file);
    let id = if args.write {
        current_repo()?.store_blob(path)?
    } else {
        hash_blob(path)?
    };
    println!("{id}");
    Ok(())
}

fn cmd_cat_file(args: CatFileArgs) -> anyhow::Result<()> {
    let id: ObjectId = args
        .object
        .parse()
        .with_context(|| format!("not a valid object name: {}", args.object))?;
    let mode = match (args.pretty, args.size) {
        (Some(PrettyStyle::Recursive), _) => InspectMode::PrettyRecursive,
        (Some(PrettyStyle::Simple), _) => InspectMode::Pretty,
        (None, true) => InspectMode::Size,
        (None, false) => InspectMode::Type,
    };

    let repo = current_repo()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    repo.inspect(&id, mode, &mut out)?;
    out.flush()?;
    Ok(())
}

fn cmd_add(args: AddArgs) -> anyhow::Result<()> {
    let repo = current_repo()?;
    for path in &args.paths {
        let report = repo
            .stage_path(Path::new(path))
            .with_context(|| format!("cannot add {path}"))?;
        for staged in &report.staged {
            println!("  {} {}", "staged:".green(), staged);
        }
        if !report.changed() && !report.unchanged.is_empty() {
            println!("  {} {}", "unchanged:".dimmed(), path);
        }
    }
    Ok(())
}

fn cmd_write_tree() -> anyhow::Result<()> {
    let id = current_repo()?.write_tree()?;
    println!("{id}");
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let scope = if args.global {
        ConfigScope::Global
    } else {
        ConfigScope::Local
    };
    let path = match scope {
        ConfigScope::Local => current_repo()?.local_config_path(),
        ConfigScope::Global => {
            global_config_path().context("cannot locate home directory for global config")?
        }
    };

    if args.username.is_none() && args.email.is_none() {
        // Local display shows the effective identity, global values filling gaps.
        let shown = match scope {
            ConfigScope::Local => {
                let global = global_config_path();
                Config::resolve(Some(path.as_path()), global.as_deref())?
            }
            ConfigScope::Global => Config::load(&path)?,
        };
        if shown.is_empty() {
            println!("{}", "No identity configured.".dimmed());
        } else {
            print_field("username", shown.username.as_deref());
            print_field("email", shown.email.as_deref());
        }
        return Ok(());
    }

    let mut config = Config::load(&path)?;
    if let Some(username) = args.username {
        config.username = Some(username);
    }
    if let Some(email) = args.email {
        config.email = Some(email);
    }
    config.save(&path)?;
    println!(
        "{} Updated {} config at {}",
        "✓".green().bold(),
        match scope {
            ConfigScope::Local => "local",
            ConfigScope::Global => "global",
        },
        path.display()
    );
    Ok(())
}

fn print_field(key: &str, value: Option<&str>) {
    match value {
        Some(value) => println!("{} = {}", key.bold(), value),
        None => println!("{} = {}", key.bold(), "(not set)".dimmed()),
    }
}

use std::io::{self, Write};

use clap::{CommandFactory, Parser};
use color_eyre::{owo_colors::OwoColorize, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod config;
mod discord;
mod fields;

use crate::{cli::Command, commands::Rejection, config::Config, discord::Dispatcher};

fn main() -> Result<()> {
    color_eyre::config::HookBuilder::default().display_env_section(false).install()?;
    init_tracing();
    let cli = cli::Args::parse();
    finish(run(cli), &mut io::stderr())
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Rejected input is reported on `err` and still exits with status 0. Every
/// other error is handed back to the report hook.
fn finish(result: Result<()>, err: &mut impl Write) -> Result<()> {
    let Err(report) = result else {
        return Ok(());
    };
    if let Some(rejection) = report.downcast_ref::<Rejection>() {
        writeln!(err, "{} {rejection}", "ERROR:".red())?;
        return Ok(());
    }
    Err(report)
}

fn run(cli: cli::Args) -> Result<()> {
    let dispatcher = Dispatcher::new();
    let config_path = config::default_path()?;
    let mut stdout = io::stdout().lock();
    match cli.command {
        None if cli.execute.url.is_none() => {
            cli::Args::command().print_help()?;
            Ok(())
        }
        None => commands::execute(&dispatcher, &config_path, cli.execute),
        Some(Command::Execute(args)) => commands::execute(&dispatcher, &config_path, args),
        Some(Command::Edit(args)) => commands::edit(&dispatcher, &config_path, args),
        Some(Command::Get(args)) => commands::get(&dispatcher, &config_path, args, &mut stdout),
        Some(Command::Delete(args)) => {
            commands::delete(&dispatcher, &config_path, args, &mut stdout)
        }
        Some(Command::Webhook { command }) => {
            let mut config = Config::load_from(&config_path)?;
            commands::webhook(&mut config, command, &mut stdout)?;
            config.save_to(&config_path)
        }
    }
}

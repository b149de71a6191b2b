//! `usertable` - CLI for the user table
//!
//! Starts the API service, or works with the table from the terminal through
//! the same API the browser page uses.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use usertable::cli::{Cli, Command, ConfigCommand, ServeCommand, UsersAction, UsersCommand};
use usertable::ui::{render, FormMode, Session, Status};
use usertable::{init_logging, server, ApiClient, Config};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, serve_cmd).await,
        Command::Users(users_cmd) => Ok(handle_users(&config, users_cmd).await),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<ExitCode> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    if let Some(database) = cmd.database {
        config.storage.database_path = Some(database);
    }
    config.validate()?;

    server::run(&config).await.context("running API server")?;
    Ok(ExitCode::SUCCESS)
}

async fn handle_users(config: &Config, cmd: UsersCommand) -> ExitCode {
    let base_url = cmd.api.url.unwrap_or_else(|| config.base_url());
    let mut session = Session::new(ApiClient::new(base_url));

    match cmd.action {
        UsersAction::List { page } => {
            session.refresh().await;
            session.select_page(page);
        }
        UsersAction::Show { id } => {
            session.refresh().await;
            session.begin_edit(&id).await;
        }
        UsersAction::Create(form) => {
            session.edit_form(form.into());
            session.submit().await;
        }
        UsersAction::Update { id, form } => {
            session.begin_edit(&id).await;
            if matches!(session.state().form_mode, FormMode::Edit { .. }) {
                session.edit_form(form.into());
                session.submit().await;
            }
        }
        UsersAction::Delete { id, yes } => {
            session.request_delete(&id).await;
            if yes {
                session.confirm_delete().await;
            } else if session.state().pending_delete.is_some() {
                print!("{}", render(session.state()));
                println!("Use --yes to confirm.");
                session.cancel_delete();
                return ExitCode::SUCCESS;
            }
        }
    }

    print!("{}", render(session.state()));
    if matches!(session.state().status, Some(Status::Error(_))) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!(
                    "  Public directory:   {}",
                    config
                        .server
                        .public_dir
                        .as_ref()
                        .map_or_else(|| "(built-in page)".to_string(), |p| p.display().to_string())
                );
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Client]");
                println!("  Base URL:           {}", config.base_url());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

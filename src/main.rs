//! Pagewriter CLI application entry point
//!
//! Each invocation is one visit to the document view: the session is entered
//! (current and marked documents restored, document names indexed), a single
//! command is applied through the controller, and the session is left.
//!
//! # Usage
//!
//! ```bash
//! # Append to a document (or to the marked one when --title is omitted)
//! pagewriter submit "buy milk" --title todo
//!
//! # Show the current document / open another one
//! pagewriter
//! pagewriter show ideas
//!
//! # Fuzzy picker: open, mark, delete, or move a snippet
//! pagewriter pick open tod
//! pagewriter pick move ideas --snippet 3
//!
//! # Change or remove a snippet of the current document
//! pagewriter edit 3 "buy oat milk"
//! pagewriter rm 3
//!
//! # Write every document to the export directory
//! pagewriter export
//! ```
//!
//! # Configuration
//!
//! Configuration is stored in the user's config directory
//! (`~/.config/pagewriter/config.toml` on Linux) and created on first run.
//! `RUST_LOG` overrides the configured log filter.

use colored::Colorize;
use pagewriter::{
    PageError,
    backend::{Library, SledBackend},
    cli::{Cli, Commands, ConfigCommands},
    config::AppConfig,
    controller::Controller,
    db::Database,
    keybinds::Command,
    picker::PickerMode,
    settings::JsonFileSettings,
    synchronizer::ViewSynchronizer,
    ui::TerminalPresenter,
};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, PageError>;

type CliController = Controller<SledBackend, JsonFileSettings, TerminalPresenter>;

/// Install the stderr subscriber; `RUST_LOG` wins over the configured filter
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Handle configuration subcommands
///
/// # Errors
/// Returns `PageError` if the configuration path cannot be determined.
fn handle_config_command(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            println!("{}", AppConfig::config_path()?.display());
        }
    }
    Ok(())
}

/// Select `id` in the current document or fail with a readable message
fn select_snippet(controller: &mut CliController, id: u64) -> Result<()> {
    if controller.select(id) {
        return Ok(());
    }
    let location = controller
        .session()
        .current_document()
        .map_or_else(|| "no document is open".to_string(), |doc| format!("not in '{doc}'"));
    Err(PageError::InvalidInput(format!("Snippet {id} is {location}")))
}

/// List document names, flagging the current (`>`) and marked (`*`) ones
fn print_documents(controller: &CliController, quiet: bool) {
    let session = controller.session();
    if session.known_documents().is_empty() && !quiet {
        println!("{}", "No documents".dimmed());
        return;
    }

    for name in session.known_documents() {
        let current = if session.current_document() == Some(name.as_str()) { ">" } else { " " };
        let marked = if session.marked_document() == Some(name.as_str()) { "*" } else { " " };
        if quiet {
            println!("{name}");
        } else {
            println!("{current}{marked} {}", name.cyan());
        }
    }
}

/// Effective chord for every command
fn print_keys(controller: &CliController) {
    let table = controller.resolver().effective();
    for command in Command::ALL {
        let chord = table.get(command.name()).unwrap_or("-");
        println!("{:<26} {:<12} {}", chord.yellow(), command.name(), command.description().dimmed());
    }
}

/// Run one command; returns whether the resulting view should be printed
///
/// # Errors
/// Returns `PageError::InvalidInput` for references to unknown documents or snippets.
async fn run(controller: &mut CliController, command: Commands, quiet: bool) -> Result<bool> {
    match command {
        Commands::Submit { text, title } => {
            controller.set_draft(title.unwrap_or_default(), text);
            controller.run_command(Command::SubmitSnippet).await;
            Ok(true)
        }
        Commands::Show { document } => {
            if let Some(name) = document {
                if !controller.open_document(&name).await {
                    return Err(PageError::InvalidInput(format!("Document '{name}' does not exist")));
                }
            }
            Ok(true)
        }
        Commands::Docs => {
            print_documents(controller, quiet);
            Ok(false)
        }
        Commands::Pick { mode, query, snippet } => {
            let mode = PickerMode::from(mode);
            if mode == PickerMode::MoveSnippet {
                let id = snippet.ok_or_else(|| {
                    PageError::InvalidInput("pick move needs --snippet <ID>".to_string())
                })?;
                select_snippet(controller, id)?;
            }

            controller.run_command(Command::opening(mode)).await;
            controller.handle_query_input(&query);
            controller.commit_picker().await;
            Ok(true)
        }
        Commands::Edit { id, text } => {
            select_snippet(controller, id)?;
            controller.set_edit_buffer(text);
            controller.run_command(Command::UpdateSelectedSnippet).await;
            Ok(true)
        }
        Commands::Remove { id } => {
            select_snippet(controller, id)?;
            controller.run_command(Command::DeleteSelectedSnippet).await;
            Ok(true)
        }
        Commands::Export => {
            if let Some(path) = controller.synchronizer_mut().export().await {
                if quiet {
                    println!("{}", path.display());
                }
            }
            Ok(false)
        }
        Commands::Keys => {
            print_keys(controller);
            Ok(false)
        }
        Commands::Config { .. } => Ok(false),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let command = cli.get_command();

    if let Commands::Config { command } = &command {
        return handle_config_command(command);
    }

    let config = AppConfig::load()?;
    init_logging(&config.settings.log_filter);

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => config.database_path()?,
    };
    tracing::debug!(db = %db_path.display(), "opening database");

    let backend = Library::new(Database::open(&db_path)?, config.export_path()?)
        .with_keybindings(config.keybindings.to_table());
    let settings = JsonFileSettings::open(JsonFileSettings::default_path()?)?;
    let presenter = TerminalPresenter::new().with_quiet(cli.quiet);

    let sync = ViewSynchronizer::new(backend, settings, presenter)
        .with_search(config.settings.threshold, config.settings.result_limit);
    let mut controller = Controller::start(sync).await;

    let outcome = run(&mut controller, command, cli.quiet).await;

    let mut sync = controller.finish();
    sync.backend().storage().flush()?;

    if outcome? {
        sync.presenter_mut().flush();
    }
    Ok(())
}

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use magick_canvas::Canvas;
use magick_canvas::collab::{Console, ExportDisplay, MemoryConsole, TerminalConsole};
use magick_canvas::config::Config;
use magick_canvas::document::{DOCUMENT_EXTENSION, FilePersistence};
use magick_canvas::temp::TempFileManager;

/// Route `log` output into the per-user log file, filtered by `filter`.
fn setup_logging(filter: &str) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("magick-canvas")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("magick-canvas.log");
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::new()
        .parse_filters(filter)
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging at '{}' to {}", filter, log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None | Some(Commands::Status) => handle_status_command(config),
        Some(Commands::Run {
            file,
            output,
            show_script,
            json,
        }) => {
            let mut config = config;
            config.show_script |= *show_script;
            handle_run_command(file.as_deref(), output.as_deref(), *json, config).await
        }
        Some(Commands::New) => handle_new_command(config),
        Some(Commands::Sweep) => handle_sweep_command(&config),
        Some(Commands::SaveAs { path, from }) => handle_save_as_command(path, from.as_deref(), config),
    }
}

fn start_canvas(config: Config) -> Canvas {
    let store = config.settings_store();
    Canvas::start(config, Box::new(store))
}

/// Run `action` against a fresh canvas, shutting it down whatever the outcome.
fn with_canvas<T>(config: Config, action: impl FnOnce(&mut Canvas) -> Result<T>) -> Result<T> {
    let mut canvas = start_canvas(config);
    let outcome = action(&mut canvas);
    canvas.shutdown();
    outcome
}

async fn handle_run_command(file: Option<&Path>, output: Option<&Path>, json: bool, config: Config) -> Result<()> {
    let dest = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("output.{}", config.image_extension.trim_start_matches('.'))));

    let mut canvas = start_canvas(config);
    let outcome = run_document(&mut canvas, file, &dest, json).await;
    canvas.shutdown();
    outcome
}

async fn run_document(canvas: &mut Canvas, file: Option<&Path>, dest: &Path, json: bool) -> Result<()> {
    if let Some(file) = file {
        canvas.document_mut().open(file)?;
    } else if canvas.document().document().is_untitled() {
        eyre::bail!("No remembered document; pass a FILE to run");
    }

    info!("Running {}", canvas.document().title());
    if !json {
        println!("{} {}", "Running:".green(), canvas.document().title());
    }

    let console: Arc<dyn Console> = if json {
        Arc::new(MemoryConsole::new())
    } else {
        Arc::new(TerminalConsole)
    };
    let display = Arc::new(ExportDisplay::new(dest));

    let result = canvas
        .spawn_run(console, display.clone())
        .await
        .context("Script task failed")?;

    let Some(result) = result else {
        println!("{}", "A script is already executing".yellow());
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if display.exported() {
        println!("{} {}", "Image:".green(), display.dest().display());
    } else {
        println!("{}", "No image produced".yellow());
    }
    Ok(())
}

fn handle_new_command(config: Config) -> Result<()> {
    with_canvas(config, |canvas| {
        canvas.document_mut().new_document();
        println!("{} {}", "New:".green(), canvas.document().title());
        Ok(())
    })
}

fn handle_status_command(config: Config) -> Result<()> {
    with_canvas(config, |canvas| {
        let document = canvas.document();

        println!("{}", document.title().bold());
        match document.path() {
            Some(path) => println!("  File:      {}", path.display()),
            None => println!("  File:      {}", "(untitled)".dimmed()),
        }
        println!("  Directory: {}", document.working_directory().display());
        println!("  Tool:      {}", canvas.config().tool_path);
        println!("  Dialect:   {:?}", canvas.config().dialect());
        Ok(())
    })
}

fn handle_sweep_command(config: &Config) -> Result<()> {
    let temp = TempFileManager::new(config.temp_prefix.clone());
    let removed = temp.sweep();
    println!(
        "{} {} stale file(s) from {}",
        "Swept:".green(),
        removed,
        temp.dir().display()
    );
    Ok(())
}

fn handle_save_as_command(path: &Path, from: Option<&Path>, config: Config) -> Result<()> {
    let path = match path.extension() {
        Some(_) => path.to_path_buf(),
        None => path.with_extension(DOCUMENT_EXTENSION),
    };
    with_canvas(config, |canvas| {
        if let Some(from) = from {
            let text = FilePersistence::read(from)?;
            canvas.document_mut().set_text(text);
        }
        canvas.document_mut().save_as(&path)?;
        println!("{} {}", "Saved:".green(), canvas.document().title());
        Ok(())
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config decides the log filter, so it loads before logging exists
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.show_script |= cli.is_verbose();

    setup_logging(&config.log_filter()).context("Failed to setup logging")?;
    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, config).await.context("Application failed")?;

    Ok(())
}

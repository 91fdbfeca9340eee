use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, Application, HttpClassifierApi, Locale, Region, ViewUpdate,
};
use shared::protocol::AnnotateRequest;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod shell;

use shell::{ShellCommand, HELP};

#[derive(Parser, Debug)]
#[command(name = "classifier-console", about = "Text value classification console")]
struct Cli {
    /// Overrides `server_url` from settings.
    #[arg(long)]
    server_url: Option<String>,
    /// `zh-CN` or `en`.
    #[arg(long)]
    locale: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Classify {
        text: String,
    },
    History,
    Annotations,
    /// Human annotation counts per day and per annotator.
    AnnotationStats,
    Annotate {
        #[arg(long)]
        text: String,
        #[arg(long)]
        main: String,
        #[arg(long = "sub")]
        sub: Vec<String>,
    },
    Suggest {
        text: String,
    },
    Retrain,
    Overview,
    Evaluate,
    /// Imports a JSON array of `{text, main_category, sub_categories}`.
    Import {
        file: PathBuf,
    },
    /// Writes exported rows as JSON.
    Export {
        file: PathBuf,
    },
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(locale) = cli.locale {
        settings.locale =
            Locale::parse(&locale).ok_or_else(|| anyhow!("unsupported locale `{locale}`"))?;
    }
    let api = Arc::new(HttpClassifierApi::from_settings(&settings)?);
    let app = Application::new(settings, api);

    match cli.command {
        Command::Classify { text } => {
            let result = app.classify(&text).await;
            print_regions(&app, &[Region::Classification, Region::History]);
            result?;
        }
        Command::History => {
            let result = app.load_history().await;
            print_regions(&app, &[Region::History]);
            result?;
        }
        Command::Annotations => {
            let result = app.load_annotations().await;
            print_regions(&app, &[Region::AnnotationTable]);
            result?;
        }
        Command::AnnotationStats => {
            let result = app.load_annotation_stats().await;
            print_regions(&app, &[Region::AnnotationStats]);
            result?;
        }
        Command::Annotate { text, main, sub } => {
            app.set_annotation_text(text);
            app.select_main_category(main);
            for name in sub {
                app.toggle_sub_category(name, true);
            }
            let result = app.submit_annotation().await;
            print_regions(&app, &[Region::AnnotationTable]);
            result?;
        }
        Command::Suggest { text } => {
            app.set_annotation_text(text);
            let result = app.request_ai_suggestion().await;
            print_regions(&app, &[Region::Suggestion]);
            result?;
        }
        Command::Retrain => {
            let result = app.retrain().await;
            print_regions(&app, &[Region::TrainingStatus]);
            result?;
        }
        Command::Overview => {
            let result = app.load_training_overview().await;
            print_regions(&app, &[Region::TrainingStatus]);
            result?;
        }
        Command::Evaluate => {
            let result = app.evaluate_model().await;
            print_regions(&app, &[Region::TrainingStatus]);
            result?;
        }
        Command::Import { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let items: Vec<AnnotateRequest> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not an annotation array", file.display()))?;
            let result = app.import_annotations(items).await;
            print_regions(&app, &[Region::AnnotationTable]);
            result?;
        }
        Command::Export { file } => {
            let result = app.export_annotations().await;
            print_regions(&app, &[]);
            let rows = result?;
            fs::write(&file, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("failed to write {}", file.display()))?;
            info!(rows = rows.len(), file = %file.display(), "annotations exported");
        }
        Command::Shell => run_shell(app).await?,
    }

    Ok(())
}

/// Prints the requested regions followed by whatever notifications are still showing.
fn print_regions(app: &Application, regions: &[Region]) {
    for region in regions {
        println!("[{}] {}", region.name(), app.render(*region));
    }
    if app.views().notifications.read(|v| !v.items.is_empty()) {
        println!(
            "[{}] {}",
            Region::Notifications.name(),
            app.render(Region::Notifications)
        );
    }
}

async fn run_shell(app: Arc<Application>) -> Result<()> {
    let printer = tokio::spawn(print_updates(Arc::clone(&app), app.subscribe()));
    app.start().await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match shell::parse_line(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Help)) => println!("{HELP}"),
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(ShellCommand::Action(action))) => {
                // Network flows run in the background; their updates arrive via the printer.
                let _ = app.dispatch(action);
            }
            Err(message) => eprintln!("{message}"),
        }
    }

    printer.abort();
    Ok(())
}

async fn print_updates(app: Arc<Application>, mut updates: broadcast::Receiver<ViewUpdate>) {
    loop {
        match updates.recv().await {
            Ok(update) => println!("[{}] {}", update.region.name(), app.render(update.region)),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "display fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}

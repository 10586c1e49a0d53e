//! Command dispatch.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use snipsearch_assistant::CodeAssistant;
use snipsearch_search::SnippetService;
use snipsearch_store::{NewSnippet, SnippetStore, SnippetUpdate};

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::output::{SnippetView, print_json, views};

/// Initialise logging on stderr.
///
/// `RUST_LOG` wins when set; otherwise the level follows the verbosity flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // A subscriber may already be installed (e.g. in tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run one CLI invocation.
pub async fn run(cli: Cli) -> Result<()> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();
    init_logging(cli.verbose, cli.quiet);

    let config = AppConfig::load(cli.config.as_deref())?;
    let app = open_app(&config).await?;
    execute(&app, cli.command).await
}

/// Everything a command may need.
pub struct App {
    pub service: SnippetService,
    pub assistant: CodeAssistant,
}

/// Open the store and wire up the service and assistant described by
/// `config`.
pub async fn open_app(config: &AppConfig) -> Result<App> {
    let root = config.store.resolved_root();
    let store = SnippetStore::open(&root)
        .await
        .with_context(|| format!("failed to open snippet store at {}", root.display()))?;

    let provider = config.embedding.build_provider();
    info!(
        "Using {} embeddings ({})",
        provider.name(),
        provider.model()
    );

    Ok(App {
        service: SnippetService::new(store, provider, config.search.clone()),
        assistant: config.build_assistant(),
    })
}

/// Execute a command.
pub async fn execute(app: &App, command: Command) -> Result<()> {
    let service = &app.service;
    match command {
        Command::Add {
            title,
            code,
            file,
            language,
            description,
            tags,
        } => {
            let code = match (code, file) {
                (Some(code), _) => code,
                (None, Some(file)) => read_code(&file).await?,
                (None, None) => bail!("either --code or --file is required"),
            };
            let mut input = NewSnippet::new(title, code, language).with_tags(tags);
            if let Some(description) = description {
                input = input.with_description(description);
            }
            let snippet = service
                .create_snippet(input)
                .await
                .context("failed to add snippet")?;
            print_json(&SnippetView::from(snippet))
        }
        Command::List => print_json(&views(service.list_snippets().await)),
        Command::Show { id } => match service.get_snippet(&id).await {
            Some(snippet) => print_json(&SnippetView::from(snippet)),
            None => bail!("snippet {id} not found"),
        },
        Command::Update {
            id,
            title,
            code,
            file,
            language,
            description,
            tags,
        } => {
            let code = match (code, file) {
                (Some(code), _) => Some(code),
                (None, Some(file)) => Some(read_code(&file).await?),
                (None, None) => None,
            };
            let update = SnippetUpdate {
                title,
                description,
                code,
                language,
                tags,
            };
            let snippet = service
                .update_snippet(&id, update)
                .await
                .with_context(|| format!("failed to update snippet {id}"))?;
            print_json(&SnippetView::from(snippet))
        }
        Command::Delete { id } => {
            service
                .delete_snippet(&id)
                .await
                .with_context(|| format!("failed to delete snippet {id}"))?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Command::Search { text } => print_json(&views(service.search_snippets(&text).await)),
        Command::Semantic { query } => {
            let matches = service
                .semantic_search(&query)
                .await
                .context("semantic search failed")?;
            debug!("{} semantic matches", matches.len());
            print_json(&views(matches))
        }
        Command::Reindex { force } => {
            let report = service.reindex(force).await.context("reindex failed")?;
            print_json(&report)
        }
        Command::Analyze { id } => {
            let Some(snippet) = service.get_snippet(&id).await else {
                bail!("snippet {id} not found");
            };
            let analysis = app
                .assistant
                .analyze_code(&snippet.code, &snippet.language)
                .await
                .with_context(|| format!("failed to analyze snippet {id}"))?;
            print_json(&serde_json::json!({ "analysis": analysis }))
        }
        Command::Suggest {
            description,
            language,
        } => {
            let code = app
                .assistant
                .suggest_snippet(&description, &language)
                .await
                .context("failed to suggest a snippet")?;
            print_json(&serde_json::json!({ "code": code }))
        }
    }
}

async fn read_code(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read code from {}", path.display()))
}

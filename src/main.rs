use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spbrowse::api::SharePointClient;
use spbrowse::config::Config;
use spbrowse::logic::breadcrumb::{build_breadcrumbs, BasePathPolicy};
use spbrowse::logic::errors::{classify_error, format_error_message, ErrorType};
use spbrowse::services::FileAggregator;
use spbrowse::ui::{build_file_rows, render_file_table, render_folder_table, IconRenderer, RowOptions};
use spbrowse::utils;

/// SharePoint document library browser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging to <tmp>/spbrowse-debug.log
    #[arg(short, long)]
    debug: bool,

    /// Path to config file (default: platform-specific, see docs)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the list's default view
    View,

    /// List the root folders of the list
    Folders,

    /// List every file under a folder, at any depth
    Files {
        /// UniqueId of the starting folder
        folder_id: String,

        /// Maximum concurrent folder fetches
        #[arg(long)]
        concurrency: Option<usize>,

        /// Hide the trail for files outside the starting folder
        #[arg(long)]
        strict_base: bool,
    },

    /// Print the breadcrumb trail for a server-relative path
    Breadcrumbs {
        /// Server-relative URL of the file or folder
        target: String,

        /// Server-relative URL of the library root
        #[arg(long)]
        base: String,

        /// Fail instead of treating a path outside the base as relative
        #[arg(long)]
        strict_base: bool,
    },
}

fn init_logging(debug: bool) -> Result<()> {
    if debug {
        let path = utils::get_debug_log_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open debug log {}", path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spbrowse=debug")),
            )
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
    Ok(())
}

fn policy(config: &Config, strict_flag: bool) -> BasePathPolicy {
    if strict_flag {
        BasePathPolicy::Strict
    } else {
        config.breadcrumb_policy()
    }
}

async fn run(command: Command, config: Config) -> Result<()> {
    let client = SharePointClient::new(config.client_settings())?;
    let renderer = IconRenderer::new(config.icon_mode());

    match command {
        Command::View => {
            let view = client.fetch_default_view(&config.list_name).await?;
            println!("Id:  {{{}}}", view.id.to_uppercase());
            println!("URL: {}", view.server_relative_url);
            if let Some(title) = view.title {
                println!("Title: {}", title);
            }
        }

        Command::Folders => {
            let folders = client.fetch_root_folders(&config.list_name).await?;
            print!("{}", render_folder_table(&folders, &renderer));
        }

        Command::Files {
            folder_id,
            concurrency,
            strict_base,
        } => {
            let view = client
                .fetch_default_view(&config.list_name)
                .await
                .context("Failed to load list view")?;

            let report = FileAggregator::new(&client)
                .with_max_concurrent(concurrency.unwrap_or(config.max_concurrent_fetches))
                .collect_files(&folder_id)
                .await
                .with_context(|| format!("Failed to list folder {}", folder_id))?;

            let options = RowOptions {
                base_path: &report.root_path,
                view: &view,
                policy: policy(&config, strict_base),
                locale: &config.locale,
                date_format: &config.date_format,
            };
            let rows = build_file_rows(&report.files, &renderer, &options);

            println!("{} {}", renderer.folder_icon(), report.root_path);
            print!("{}", render_file_table(&rows));
            println!(
                "{} files in {} folders",
                report.files.len(),
                report.folders_visited
            );

            for failed in &report.failed_folders {
                eprintln!("{} {}: {}", renderer.error_icon(), failed.folder_id, failed.error);
            }
        }

        Command::Breadcrumbs {
            target,
            base,
            strict_base,
        } => {
            let view = client.fetch_default_view(&config.list_name).await?;
            let items = build_breadcrumbs(&target, &base, &view, policy(&config, strict_base));
            if items.is_empty() {
                println!("(no trail)");
            }
            for item in items {
                println!("{}\t{}\t{}", item.label, item.url, item.target.as_str());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    init_logging(args.debug)?;
    tracing::debug!("Debug mode enabled");

    // Load configuration
    let (config, config_path) = Config::load(args.config)?;
    tracing::debug!("Loaded config from: {:?}", config_path);

    if let Err(e) = run(args.command, config).await {
        let hint = match classify_error(&e) {
            ErrorType::Unauthorized => " (check access_token)",
            ErrorType::NotFound => " (check list_name or folder id)",
            ErrorType::Timeout => " (try raising timeout_secs)",
            _ => "",
        };
        eprintln!("Error: {}{}", format_error_message(&e), hint);
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

//! QuickShare CLI: command-line client for a QuickShare server.
//!
//! Set `QUICKSHARE_SERVER` (default `http://localhost:8080`).

mod commands;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use quickshare_client::{ApiClient, DEFAULT_BASE_URL};
use quickshare_shared::AppConfig;
use quickshare_shared::types::PostId;

#[derive(Parser)]
#[command(name = "quickshare", about = "QuickShare file sharing and posts", version)]
struct Cli {
    /// Server base URL
    #[arg(long, env = "QUICKSHARE_SERVER", default_value = DEFAULT_BASE_URL, global = true)]
    server: String,

    /// Request timeout in seconds (defaults to the configured upload timeout)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server is up
    Health,
    /// Upload one or more files
    Upload {
        /// Files to upload
        files: Vec<PathBuf>,
        /// Maximum number of files uploaded at the same time
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Browse and delete uploaded files
    #[command(subcommand)]
    Files(FilesCommand),
    /// Read and write text posts
    #[command(subcommand)]
    Posts(PostsCommand),
}

#[derive(Subcommand)]
enum FilesCommand {
    /// List one page of files, newest first
    List {
        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,
        /// Files per page (defaults to the configured page size)
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Delete a file by name
    Delete {
        /// Object name as shown by `files list`
        name: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum PostsCommand {
    /// List all posts, newest first
    List,
    /// Create a post
    New {
        /// Title
        #[arg(long)]
        title: String,
        /// Rich-text content
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,
        /// Read the content from a file
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// Edit a post; omitted fields keep their current value
    Edit {
        /// Post ID
        id: PostId,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New rich-text content
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,
        /// Read the new content from a file
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// Delete a post
    Delete {
        /// Post ID
        id: PostId,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Print a post's content as plain text
    Copy {
        /// Post ID
        id: PostId,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().unwrap_or_default();

    let timeout = cli.timeout.unwrap_or(config.upload.request_timeout_secs);
    let client = ApiClient::new(&cli.server, Duration::from_secs(timeout))
        .context("Failed to create HTTP client")?;

    match cli.command {
        Commands::Health => commands::health(&client).await,
        Commands::Upload { files, concurrency } => {
            let concurrency = concurrency.unwrap_or(config.upload.concurrency);
            commands::upload(client, files, concurrency).await
        }
        Commands::Files(FilesCommand::List { page, per_page }) => {
            let per_page = per_page.unwrap_or(config.listing.page_size);
            commands::list_files(client, page, per_page).await
        }
        Commands::Files(FilesCommand::Delete { name, yes }) => {
            commands::delete_file(client, &name, yes).await
        }
        Commands::Posts(PostsCommand::List) => commands::list_posts(client).await,
        Commands::Posts(PostsCommand::New {
            title,
            content,
            content_file,
        }) => {
            let content = commands::read_content(content, content_file)
                .await?
                .unwrap_or_default();
            commands::new_post(client, title, content).await
        }
        Commands::Posts(PostsCommand::Edit {
            id,
            title,
            content,
            content_file,
        }) => {
            let content = commands::read_content(content, content_file).await?;
            commands::edit_post(client, id, title, content).await
        }
        Commands::Posts(PostsCommand::Delete { id, yes }) => {
            commands::delete_post(client, id, yes).await
        }
        Commands::Posts(PostsCommand::Copy { id }) => commands::copy_post(client, id).await,
    }
}

//! Command implementations over the shared view controllers.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use quickshare_client::ApiClient;
use quickshare_core::files::FileListView;
use quickshare_core::posts::PostBoard;
use quickshare_core::upload::{BatchProgress, LocalFile, UploadError, UploadOrchestrator, UploadReport};
use quickshare_shared::types::PostId;

pub async fn health(client: &ApiClient) -> anyhow::Result<()> {
    let health = client.health().await?;
    println!("{} {} ({})", client.base_url(), health.status, health.version);
    Ok(())
}

// ============================================================================
// Uploads
// ============================================================================

pub async fn upload(client: ApiClient, paths: Vec<PathBuf>, concurrency: usize) -> anyhow::Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = LocalFile::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }

    let orchestrator = UploadOrchestrator::new(Arc::new(client), concurrency);
    let batch = match orchestrator.start(files) {
        Ok(batch) => batch,
        Err(UploadError::NoFiles) => bail!("Please select a file first"),
        Err(e) => return Err(e.into()),
    };

    let progress = batch.progress();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(200));
        loop {
            interval.tick().await;
            eprint!("\r{}", render_progress(&progress));
        }
    });

    let result = batch.finish().await;
    ticker.abort();
    eprintln!();

    match result {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(UploadError::Failed {
            file_name,
            message,
            report,
        }) => {
            print_report(&report);
            bail!("{file_name}: {message}")
        }
        Err(e) => Err(e.into()),
    }
}

fn render_progress(progress: &BatchProgress) -> String {
    let bars: Vec<String> = progress.percents().iter().map(|p| format!("{p:>3}%")).collect();
    format!("{} [{}]", progress.summary(), bars.join(" "))
}

fn print_report(report: &UploadReport) {
    for task in &report.tasks {
        match (&task.result, &task.error) {
            (Some(stored), _) => println!("uploaded  {}  {}", task.file_name, stored.public_url),
            (None, Some(error)) => println!("failed    {}  {error}", task.file_name),
            (None, None) => println!("pending   {}", task.file_name),
        }
    }
}

// ============================================================================
// Files
// ============================================================================

pub async fn list_files(client: ApiClient, page: u32, per_page: u32) -> anyhow::Result<()> {
    let view = FileListView::new(Arc::new(client), per_page);
    view.set_page(page).await?;

    let snapshot = view.snapshot();
    if snapshot.entries.is_empty() {
        println!("No files uploaded yet.");
    }
    for file in &snapshot.entries {
        println!(
            "{:<48} {:>10}  {:<24} {}",
            file.name,
            human_size(file.size),
            file.mime_type,
            format_time(file.created_at)
        );
        println!("    {}", file.public_url);
    }
    println!(
        "Page {} of {} ({} files)",
        snapshot.page, snapshot.total_pages, snapshot.total
    );
    Ok(())
}

pub async fn delete_file(client: ApiClient, name: &str, yes: bool) -> anyhow::Result<()> {
    let view = FileListView::new(Arc::new(client), 1);
    view.request_delete(name)?;

    let message = view
        .pending()
        .map(|p| p.dialog().message().to_string())
        .unwrap_or_default();
    if !yes && !confirm(message).await? {
        view.cancel_delete();
        println!("Cancelled.");
        return Ok(());
    }

    view.confirm_delete().await?;
    println!("Deleted {name}.");
    Ok(())
}

// ============================================================================
// Posts
// ============================================================================

pub async fn list_posts(client: ApiClient) -> anyhow::Result<()> {
    let board = PostBoard::new(Arc::new(client));
    board.load().await?;

    let snapshot = board.snapshot();
    if snapshot.posts.is_empty() {
        println!("No posts yet.");
    }
    for post in &snapshot.posts {
        let edited = if post.is_edited() { " (edited)" } else { "" };
        println!("{}  {}{edited}", post.id, format_time(Some(post.created_at)));
        println!("  {}", post.title);
        if let Some(text) = board.copy_plain_text(post.id) {
            for line in text.lines() {
                println!("    {line}");
            }
        }
    }
    Ok(())
}

pub async fn new_post(client: ApiClient, title: String, content: String) -> anyhow::Result<()> {
    let board = PostBoard::new(Arc::new(client));
    board.set_title(title);
    board.set_content(content);

    let post = board.save().await?;
    println!("Created post {}", post.id);
    Ok(())
}

pub async fn edit_post(
    client: ApiClient,
    id: PostId,
    title: Option<String>,
    content: Option<String>,
) -> anyhow::Result<()> {
    let board = PostBoard::new(Arc::new(client));
    board.load().await?;
    board.begin_edit(id)?;
    if let Some(title) = title {
        board.set_title(title);
    }
    if let Some(content) = content {
        board.set_content(content);
    }

    let post = board.save().await?;
    println!("Updated post {}", post.id);
    Ok(())
}

pub async fn delete_post(client: ApiClient, id: PostId, yes: bool) -> anyhow::Result<()> {
    let board = PostBoard::new(Arc::new(client));
    board.request_delete(id)?;

    let message = board
        .pending()
        .map(|p| p.dialog().message().to_string())
        .unwrap_or_default();
    if !yes && !confirm(message).await? {
        board.cancel_delete();
        println!("Cancelled.");
        return Ok(());
    }

    board.confirm_delete().await?;
    println!("Deleted post {id}.");
    Ok(())
}

pub async fn copy_post(client: ApiClient, id: PostId) -> anyhow::Result<()> {
    let board = PostBoard::new(Arc::new(client));
    board.load().await?;

    let text = board
        .copy_plain_text(id)
        .with_context(|| format!("post not found: {id}"))?;
    println!("{text}");
    Ok(())
}

/// Inline content, or the contents of `file`.
pub async fn read_content(
    content: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<Option<String>> {
    match (content, file) {
        (Some(content), _) => Ok(Some(content)),
        (None, Some(path)) => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(Some(content))
        }
        (None, None) => Ok(None),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn confirm(message: String) -> anyhow::Result<bool> {
    let answer = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{message} [y/N] ")?;
        stderr.flush()?;
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    })
    .await??;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES" | "Yes"))
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string())
}

#[allow(clippy::cast_precision_loss)]
fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(10 * 1024 * 1024), "10.0 MB");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(None), "-");
        let at = DateTime::parse_from_rfc3339("2026-01-08T12:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_time(Some(at)), "2026-01-08 12:30");
    }

    #[test]
    fn test_render_progress() {
        let progress = BatchProgress::new(2);
        assert_eq!(render_progress(&progress), "0 of 2 complete [  0%   0%]");
    }

    #[tokio::test]
    async fn test_read_content_prefers_inline() {
        let content = read_content(Some("<p>x</p>".to_string()), None).await.unwrap();
        assert_eq!(content.as_deref(), Some("<p>x</p>"));
        assert!(read_content(None, None).await.unwrap().is_none());
    }
}

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use client_core::{BlogClient, DraftField, HttpPostService, ViewState};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    server_url: String,
    /// Title for a new post; submitted when body and author are also given.
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    body: Option<String>,
    #[arg(long)]
    author: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let service = Arc::new(HttpPostService::new(&args.server_url)?);
    let client = BlogClient::new(service);

    client.load_posts().await;
    render(&client.state().await);

    if let (Some(title), Some(body), Some(author)) = (args.title, args.body, args.author) {
        client.toggle_form().await;
        client.update_draft_field(DraftField::Title, title).await;
        client.update_draft_field(DraftField::Body, body).await;
        client.update_draft_field(DraftField::Author, author).await;

        if !client.state().await.draft.is_complete() {
            println!("All of --title, --body and --author must be non-empty.");
            return Ok(());
        }

        client.submit_draft().await;
        let state = client.state().await;
        if state.form_visible {
            println!("Post was not accepted; the draft is kept for another attempt.");
        } else {
            render(&state);
        }
    }

    Ok(())
}

fn render(state: &ViewState) {
    if state.posts.is_empty() {
        println!("No posts yet.");
        return;
    }
    for post in &state.posts {
        let when = DateTime::<Utc>::from_timestamp_millis(post.timestamp_millis())
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        println!("#{} {}", post.post_id.0, post.title);
        println!("  By {} | {}", post.author, when);
        println!("  {}", post.body);
    }
}

use shared::{
    domain::PostId,
    error::{ApiError, ErrorCode},
    protocol::PostPayload,
};
use storage::Storage;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

const MAX_TITLE_BYTES: usize = 200;
const MAX_BODY_BYTES: usize = 20_000;
const MAX_AUTHOR_BYTES: usize = 80;

pub async fn list_posts(ctx: &ApiContext) -> Result<Vec<PostPayload>, ApiError> {
    let posts = ctx.storage.list_posts().await.map_err(internal)?;
    Ok(posts
        .into_iter()
        .map(|post| PostPayload {
            post_id: post.post_id,
            title: post.title,
            body: post.body,
            author: post.author,
            timestamp_ns: post.timestamp_ns,
        })
        .collect())
}

pub async fn create_post(
    ctx: &ApiContext,
    title: &str,
    body: &str,
    author: &str,
) -> Result<PostId, ApiError> {
    validate_field("title", title, MAX_TITLE_BYTES)?;
    validate_field("body", body, MAX_BODY_BYTES)?;
    validate_field("author", author, MAX_AUTHOR_BYTES)?;

    let post_id = ctx
        .storage
        .insert_post(title, body, author)
        .await
        .map_err(internal)?;
    tracing::info!(post_id = post_id.0, "post created");
    Ok(post_id)
}

fn validate_field(name: &str, value: &str, max_bytes: usize) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("{name} cannot be empty"),
        ));
    }
    if value.len() > max_bytes {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("{name} exceeds {max_bytes} bytes"),
        ));
    }
    Ok(())
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    #[tokio::test]
    async fn create_rejects_empty_title() {
        let ctx = setup().await;
        let err = create_post(&ctx, "  ", "body", "alice")
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
        assert!(err.message.contains("title"));
    }

    #[tokio::test]
    async fn create_rejects_oversized_author() {
        let ctx = setup().await;
        let long_author = "a".repeat(MAX_AUTHOR_BYTES + 1);
        let err = create_post(&ctx, "Title", "body", &long_author)
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn created_posts_appear_in_listing_with_service_fields() {
        let ctx = setup().await;
        let post_id = create_post(&ctx, "Hello", "first body", "alice")
            .await
            .expect("create");

        let posts = list_posts(&ctx).await.expect("list");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].post_id, post_id);
        assert_eq!(posts[0].title, "Hello");
        assert!(posts[0].timestamp_ns > 0);
    }

    #[tokio::test]
    async fn listing_returns_newest_first() {
        let ctx = setup().await;
        create_post(&ctx, "Older", "body", "alice")
            .await
            .expect("create");
        let newer = create_post(&ctx, "Newer", "body", "bob")
            .await
            .expect("create");

        let posts = list_posts(&ctx).await.expect("list");
        assert_eq!(posts[0].post_id, newer);
        assert_eq!(posts[0].title, "Newer");
    }
}

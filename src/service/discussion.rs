//! Discussion service
//!
//! Membership-gated posts and comments. Every operation passes through
//! `membership::require_member` against current store state; author and group
//! are assigned from the authenticated caller and path context, never from the
//! payload.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::comment::{self, CommentResponse};
use crate::entity::discussion_post::{self, PostResponse};
use crate::entity::{chapter, reading_group, user};
use crate::error::{AppError, AppResult, OptionExt};
use crate::service::membership;

/// New post input
#[derive(Debug, Clone)]
pub struct NewPost {
    pub content: String,
    pub chapter_id: Option<i64>,
}

/// Posts of a group in creation order, each with its comments in creation
/// order. Members only.
pub async fn list_posts(
    db: &DatabaseConnection,
    user_id: i64,
    group_id: i64,
) -> AppResult<Vec<PostResponse>> {
    membership::require_member(db, user_id, group_id).await?;

    let posts = discussion_post::Entity::find()
        .filter(discussion_post::Column::GroupId.eq(group_id))
        .order_by_asc(discussion_post::Column::Id)
        .all(db)
        .await?;

    build_post_responses(db, posts).await
}

/// Create a post in a group. A referenced chapter must belong to the group's
/// book; a cross-book reference is a validation error, not silently accepted.
pub async fn create_post(
    db: &DatabaseConnection,
    user_id: i64,
    group_id: i64,
    input: NewPost,
) -> AppResult<PostResponse> {
    membership::require_member(db, user_id, group_id).await?;

    if input.content.trim().is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }

    let group = reading_group::Entity::find_by_id(group_id)
        .one(db)
        .await?
        .ok_or_not_found("Group not found")?;

    let chapter = match input.chapter_id {
        Some(chapter_id) => {
            let chapter = chapter::Entity::find_by_id(chapter_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    AppError::Validation("Referenced chapter does not exist".to_string())
                })?;
            if chapter.book_id != group.book_id {
                return Err(AppError::Validation(
                    "Chapter does not belong to this group's book".to_string(),
                ));
            }
            Some(chapter)
        }
        None => None,
    };

    let post = discussion_post::ActiveModel {
        group_id: Set(group_id),
        author_id: Set(user_id),
        chapter_id: Set(input.chapter_id),
        content: Set(input.content),
        created_at: Set(chrono::Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let author = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_not_found("User not found")?;

    Ok(PostResponse::from(post)
        .with_author_name(author.username)
        .with_chapter_title(chapter.map(|c| c.title)))
}

/// Add a comment to a post in a group, then return the whole post with its
/// comment list freshly re-read so callers get one consistent view.
pub async fn add_comment(
    db: &DatabaseConnection,
    user_id: i64,
    group_id: i64,
    post_id: i64,
    content: String,
) -> AppResult<PostResponse> {
    membership::require_member(db, user_id, group_id).await?;

    // The post must live in the given group; a member of group A must not be
    // able to comment on group B's posts by guessing identifiers.
    let post = discussion_post::Entity::find_by_id(post_id)
        .filter(discussion_post::Column::GroupId.eq(group_id))
        .one(db)
        .await?
        .ok_or_not_found("Post not found")?;

    if content.trim().is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }

    comment::ActiveModel {
        post_id: Set(post.id),
        author_id: Set(user_id),
        content: Set(content),
        created_at: Set(chrono::Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    // Re-read the post so the response observes the just-written comment
    let post = discussion_post::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or_not_found("Post not found")?;

    let mut responses = build_post_responses(db, vec![post]).await?;
    Ok(responses.remove(0))
}

/// Enrich post models with author names, chapter titles and nested comments.
async fn build_post_responses(
    db: &DatabaseConnection,
    posts: Vec<discussion_post::Model>,
) -> AppResult<Vec<PostResponse>> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    let comments = comment::Entity::find()
        .filter(comment::Column::PostId.is_in(post_ids))
        .order_by_asc(comment::Column::Id)
        .all(db)
        .await?;

    let mut author_ids: Vec<i64> = posts.iter().map(|p| p.author_id).collect();
    author_ids.extend(comments.iter().map(|c| c.author_id));
    let usernames: HashMap<i64, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let chapter_ids: Vec<i64> = posts.iter().filter_map(|p| p.chapter_id).collect();
    let chapter_titles: HashMap<i64, String> = if chapter_ids.is_empty() {
        HashMap::new()
    } else {
        chapter::Entity::find()
            .filter(chapter::Column::Id.is_in(chapter_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.title))
            .collect()
    };

    let mut comments_by_post: HashMap<i64, Vec<CommentResponse>> = HashMap::new();
    for c in comments {
        let author_name = usernames.get(&c.author_id).cloned().unwrap_or_default();
        comments_by_post
            .entry(c.post_id)
            .or_default()
            .push(CommentResponse::from(c).with_author_name(author_name));
    }

    Ok(posts
        .into_iter()
        .map(|p| {
            let author_name = usernames.get(&p.author_id).cloned().unwrap_or_default();
            let chapter_title = p.chapter_id.and_then(|id| chapter_titles.get(&id).cloned());
            let comments = comments_by_post.remove(&p.id).unwrap_or_default();
            PostResponse::from(p)
                .with_author_name(author_name)
                .with_chapter_title(chapter_title)
                .with_comments(comments)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::group_membership;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn group_fixture(id: i64, book_id: i64) -> reading_group::Model {
        reading_group::Model {
            id,
            name: "Sci-Fi Club".to_string(),
            book_id,
            creator_id: 1,
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            created_at: chrono::Utc::now().fixed_offset(),
        }
    }

    fn membership_fixture(user_id: i64, group_id: i64) -> group_membership::Model {
        group_membership::Model {
            id: 1,
            user_id,
            group_id,
            joined_at: chrono::Utc::now().fixed_offset(),
        }
    }

    fn user_fixture(id: i64, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            password: "hash".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    fn post_fixture(id: i64, group_id: i64, author_id: i64) -> discussion_post::Model {
        discussion_post::Model {
            id,
            group_id,
            author_id,
            chapter_id: None,
            content: "What did everyone think?".to_string(),
            created_at: chrono::Utc::now().fixed_offset(),
        }
    }

    fn comment_fixture(id: i64, post_id: i64, author_id: i64, content: &str) -> comment::Model {
        comment::Model {
            id,
            post_id,
            author_id,
            content: content.to_string(),
            created_at: chrono::Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn test_list_posts_requires_membership() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![group_fixture(7, 1)]])
            .append_query_results([Vec::<group_membership::Model>::new()])
            .into_connection();

        let result = list_posts(&db, 99, 7).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_post_rejects_empty_content() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![group_fixture(7, 1)]])
            .append_query_results([vec![membership_fixture(5, 7)]])
            .into_connection();

        let input = NewPost {
            content: "   ".to_string(),
            chapter_id: None,
        };
        let result = create_post(&db, 5, 7, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_post_rejects_cross_book_chapter() {
        let foreign_chapter = chapter::Model {
            id: 30,
            book_id: 2,
            chapter_number: 3,
            title: "Chapter Three".to_string(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![group_fixture(7, 1)]])
            .append_query_results([vec![membership_fixture(5, 7)]])
            .append_query_results([vec![group_fixture(7, 1)]])
            .append_query_results([vec![foreign_chapter]])
            .into_connection();

        let input = NewPost {
            content: "Thoughts on chapter three".to_string(),
            chapter_id: Some(30),
        };
        let result = create_post(&db, 5, 7, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_comment_rejects_post_from_other_group() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![group_fixture(7, 1)]])
            .append_query_results([vec![membership_fixture(5, 7)]])
            // Post 13 lives in another group, so the group-scoped lookup is empty
            .append_query_results([Vec::<discussion_post::Model>::new()])
            .into_connection();

        let result = add_comment(&db, 5, 7, 13, "sneaky".to_string()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_comment_returns_post_with_fresh_comments() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![group_fixture(7, 1)]])
            .append_query_results([vec![membership_fixture(5, 7)]])
            .append_query_results([vec![post_fixture(13, 7, 2)]])
            .append_query_results([vec![comment_fixture(40, 13, 5, "Loved the ending")]])
            .append_query_results([vec![post_fixture(13, 7, 2)]])
            .append_query_results([vec![comment_fixture(40, 13, 5, "Loved the ending")]])
            .append_query_results([vec![user_fixture(2, "alice"), user_fixture(5, "bob")]])
            .into_connection();

        let post = add_comment(&db, 5, 7, 13, "Loved the ending".to_string())
            .await
            .unwrap();

        assert_eq!(post.id, 13);
        assert_eq!(post.author_name, "alice");
        assert_eq!(post.comments.len(), 1);
        assert_eq!(post.comments[0].content, "Loved the ending");
        assert_eq!(post.comments[0].author_name, "bob");
    }
}

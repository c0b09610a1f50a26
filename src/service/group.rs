//! Group service
//!
//! Group creation (with atomic creator enrollment), the caller's group list,
//! the member-gated group detail, and book discovery with available groups.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};

use crate::entity::group_membership::{self, MemberResponse};
use crate::entity::reading_group::{self, GroupDetailResponse, GroupResponse};
use crate::entity::{book, user};
use crate::error::{AppError, AppResult, OptionExt};
use crate::service::membership;

/// New group input, already detached from the request payload
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub book_id: i64,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
}

/// Invariant: start_date <= end_date (equal dates are a valid one-day group)
pub fn validate_dates(
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
) -> AppResult<()> {
    if start_date > end_date {
        return Err(AppError::Validation(
            "end_date must not be before start_date".to_string(),
        ));
    }
    Ok(())
}

/// Create a group and enroll its creator as the first member in one
/// transaction. A freshly created group is never observable with zero members.
pub async fn create(
    db: &DatabaseConnection,
    creator_id: i64,
    input: NewGroup,
) -> AppResult<GroupResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    validate_dates(input.start_date, input.end_date)?;

    let book = book::Entity::find_by_id(input.book_id)
        .one(db)
        .await?
        .ok_or_not_found("Book not found")?;
    let creator = user::Entity::find_by_id(creator_id)
        .one(db)
        .await?
        .ok_or_not_found("User not found")?;

    let group = db
        .transaction::<_, reading_group::Model, DbErr>(|txn| {
            Box::pin(async move {
                let now = chrono::Utc::now().fixed_offset();

                let group = reading_group::ActiveModel {
                    name: Set(input.name),
                    book_id: Set(input.book_id),
                    creator_id: Set(creator_id),
                    start_date: Set(input.start_date),
                    end_date: Set(input.end_date),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                group_membership::ActiveModel {
                    user_id: Set(creator_id),
                    group_id: Set(group.id),
                    joined_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                Ok(group)
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(e) => AppError::Database(e),
            TransactionError::Transaction(e) => AppError::Database(e),
        })?;

    tracing::info!("User {} created group {} ({})", creator_id, group.id, group.name);

    Ok(GroupResponse::from(group)
        .with_book_title(book.title)
        .with_creator_name(creator.username)
        .with_member_count(1))
}

/// All groups where the user holds a membership, in membership insertion order.
pub async fn list_for_user(db: &DatabaseConnection, user_id: i64) -> AppResult<Vec<GroupResponse>> {
    let memberships = group_membership::Entity::find()
        .filter(group_membership::Column::UserId.eq(user_id))
        .order_by_asc(group_membership::Column::Id)
        .all(db)
        .await?;

    let group_ids: Vec<i64> = memberships.iter().map(|m| m.group_id).collect();
    let groups = reading_group::Entity::find()
        .filter(reading_group::Column::Id.is_in(group_ids.clone()))
        .all(db)
        .await?;
    let by_id: HashMap<i64, reading_group::Model> =
        groups.into_iter().map(|g| (g.id, g)).collect();

    let ordered: Vec<reading_group::Model> = group_ids
        .into_iter()
        .filter_map(|id| by_id.get(&id).cloned())
        .collect();

    build_group_responses(db, ordered).await
}

/// Member-gated group detail, adding the member list with usernames.
pub async fn detail(
    db: &DatabaseConnection,
    user_id: i64,
    group_id: i64,
) -> AppResult<GroupDetailResponse> {
    membership::require_member(db, user_id, group_id).await?;

    let group = reading_group::Entity::find_by_id(group_id)
        .one(db)
        .await?
        .ok_or_not_found("Group not found")?;

    let members = group_membership::Entity::find()
        .filter(group_membership::Column::GroupId.eq(group_id))
        .order_by_asc(group_membership::Column::Id)
        .all(db)
        .await?;

    let member_user_ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();
    let usernames: HashMap<i64, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(member_user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let member_responses: Vec<MemberResponse> = members
        .into_iter()
        .map(|m| {
            let username = usernames.get(&m.user_id).cloned().unwrap_or_default();
            MemberResponse::from(m).with_username(username)
        })
        .collect();

    let group_response = build_group_responses(db, vec![group]).await?.remove(0);

    Ok(GroupDetailResponse {
        group: group_response,
        members: member_responses,
    })
}

/// The book plus all of its groups that are not full. Availability is the
/// capacity predicate alone: a zero-member group is available.
pub async fn book_with_available_groups(
    db: &DatabaseConnection,
    book_id: i64,
) -> AppResult<(book::Model, Vec<GroupResponse>)> {
    let book = book::Entity::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or_not_found("Book not found")?;

    let groups = reading_group::Entity::find()
        .filter(reading_group::Column::BookId.eq(book_id))
        .order_by_asc(reading_group::Column::Id)
        .all(db)
        .await?;

    let available = build_group_responses(db, groups)
        .await?
        .into_iter()
        .filter(|g| !g.is_full)
        .collect();

    Ok((book, available))
}

/// Enrich group models with book titles, creator names and live membership
/// counts. Counts are computed from current membership rows on every call,
/// never cached.
async fn build_group_responses(
    db: &DatabaseConnection,
    groups: Vec<reading_group::Model>,
) -> AppResult<Vec<GroupResponse>> {
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let book_ids: Vec<i64> = groups.iter().map(|g| g.book_id).collect();
    let creator_ids: Vec<i64> = groups.iter().map(|g| g.creator_id).collect();
    let group_ids: Vec<i64> = groups.iter().map(|g| g.id).collect();

    let book_titles: HashMap<i64, String> = book::Entity::find()
        .filter(book::Column::Id.is_in(book_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|b| (b.id, b.title))
        .collect();

    let creator_names: HashMap<i64, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(creator_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let mut counts: HashMap<i64, u64> = HashMap::new();
    let memberships = group_membership::Entity::find()
        .filter(group_membership::Column::GroupId.is_in(group_ids))
        .all(db)
        .await?;
    for m in &memberships {
        *counts.entry(m.group_id).or_insert(0) += 1;
    }

    Ok(groups
        .into_iter()
        .map(|g| {
            let book_title = book_titles.get(&g.book_id).cloned().unwrap_or_default();
            let creator_name = creator_names.get(&g.creator_id).cloned().unwrap_or_default();
            let count = counts.get(&g.id).copied().unwrap_or(0);
            GroupResponse::from(g)
                .with_book_title(book_title)
                .with_creator_name(creator_name)
                .with_member_count(count)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::reading_group::GROUP_CAPACITY;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn book_fixture(id: i64) -> book::Model {
        book::Model {
            id,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: "Sci-Fi".to_string(),
            description: "Spice and sand".to_string(),
            total_pages: 412,
            total_chapters: 48,
            cover_url: None,
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

    fn group_fixture(id: i64, book_id: i64) -> reading_group::Model {
        reading_group::Model {
            id,
            name: format!("Group {}", id),
            book_id,
            creator_id: 1,
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            created_at: chrono::Utc::now().fixed_offset(),
        }
    }

    fn membership_fixture(id: i64, user_id: i64, group_id: i64) -> group_membership::Model {
        group_membership::Model {
            id,
            user_id,
            group_id,
            joined_at: chrono::Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn test_validate_dates() {
        let early = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let late = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        assert!(validate_dates(early, late).is_ok());
        // A one-day group is valid
        assert!(validate_dates(early, early).is_ok());
        assert!(matches!(
            validate_dates(late, early),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_reversed_dates() {
        // Validation fails before any query is issued
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let input = NewGroup {
            name: "Sci-Fi Club".to_string(),
            book_id: 1,
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let result = create(&db, 1, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let input = NewGroup {
            name: "  ".to_string(),
            book_id: 1,
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let result = create(&db, 1, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_missing_book_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<book::Model>::new()])
            .into_connection();

        let input = NewGroup {
            name: "Sci-Fi Club".to_string(),
            book_id: 404,
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let result = create(&db, 1, input).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_available_groups_keeps_empty_groups() {
        // Group 1 has zero members, group 2 is at capacity. Only group 1 is
        // available; an empty group must not be hidden from discovery.
        let full_memberships: Vec<group_membership::Model> = (1..=GROUP_CAPACITY as i64)
            .map(|i| membership_fixture(i, i, 2))
            .collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![book_fixture(1)]])
            .append_query_results([vec![group_fixture(1, 1), group_fixture(2, 1)]])
            .append_query_results([vec![book_fixture(1)]])
            .append_query_results([vec![user_fixture(1, "alice")]])
            .append_query_results([full_memberships])
            .into_connection();

        let (book, available) = book_with_available_groups(&db, 1).await.unwrap();
        assert_eq!(book.id, 1);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, 1);
        assert_eq!(available[0].member_count, 0);
        assert!(!available[0].is_full);
    }
}

//! Membership guard
//!
//! Decides whether a user may act within a reading group, and owns the one
//! genuinely racy write in the system: joining a group with a bounded number
//! of seats. The count-check-then-insert sequence runs inside a serializable
//! transaction, with the composite unique index on (user_id, group_id) as the
//! storage-level backstop, so capacity and uniqueness hold under any
//! interleaving of concurrent joins.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};
use thiserror::Error;

use crate::entity::group_membership;
use crate::entity::reading_group::{self, GROUP_CAPACITY};
use crate::error::AppError;

/// Join failure modes
#[derive(Error, Debug)]
pub enum JoinError {
    #[error("Group not found")]
    GroupNotFound,

    #[error("Group is full")]
    GroupFull,

    #[error("Already a member of this group")]
    AlreadyMember,

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl From<JoinError> for AppError {
    fn from(err: JoinError) -> Self {
        match err {
            JoinError::GroupNotFound => AppError::NotFound("Group not found".to_string()),
            JoinError::GroupFull => AppError::Conflict("Group is full".to_string()),
            JoinError::AlreadyMember => {
                AppError::Conflict("Already a member of this group".to_string())
            }
            JoinError::Db(e) => AppError::Database(e),
        }
    }
}

/// Access failure modes for membership-gated reads and writes
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Group not found")]
    GroupNotFound,

    #[error("Not a member of this group")]
    NotAMember,

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::GroupNotFound => AppError::NotFound("Group not found".to_string()),
            AccessError::NotAMember => {
                AppError::Forbidden("Not a member of this group".to_string())
            }
            AccessError::Db(e) => AppError::Database(e),
        }
    }
}

/// True iff a membership row exists for (user, group). Pure read.
pub async fn is_member<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    group_id: i64,
) -> Result<bool, DbErr> {
    let membership = group_membership::Entity::find()
        .filter(group_membership::Column::UserId.eq(user_id))
        .filter(group_membership::Column::GroupId.eq(group_id))
        .one(db)
        .await?;
    Ok(membership.is_some())
}

/// Count of active membership rows for a group, read from live state.
pub async fn member_count<C: ConnectionTrait>(db: &C, group_id: i64) -> Result<u64, DbErr> {
    group_membership::Entity::find()
        .filter(group_membership::Column::GroupId.eq(group_id))
        .count(db)
        .await
}

/// Precondition gate for discussion and group-detail operations. Re-reads
/// membership state at call time.
pub async fn require_member(
    db: &DatabaseConnection,
    user_id: i64,
    group_id: i64,
) -> Result<(), AccessError> {
    let group = reading_group::Entity::find_by_id(group_id).one(db).await?;
    if group.is_none() {
        return Err(AccessError::GroupNotFound);
    }
    if !is_member(db, user_id, group_id).await? {
        return Err(AccessError::NotAMember);
    }
    Ok(())
}

/// Atomically enroll a user in a group.
///
/// The whole exists/duplicate/count/insert sequence is one serializable
/// transaction: either the membership lands and the capacity invariant holds,
/// or nothing is persisted. A unique-violation on insert (two identical joins
/// racing) is reported as `AlreadyMember`.
pub async fn try_join(
    db: &DatabaseConnection,
    user_id: i64,
    group_id: i64,
) -> Result<group_membership::Model, JoinError> {
    let txn = db
        .begin_with_config(Some(IsolationLevel::Serializable), None)
        .await?;

    let result = join_in_txn(&txn, user_id, group_id).await;

    match result {
        Ok(membership) => {
            txn.commit().await?;
            tracing::info!("User {} joined group {}", user_id, group_id);
            Ok(membership)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

async fn join_in_txn<C: ConnectionTrait>(
    txn: &C,
    user_id: i64,
    group_id: i64,
) -> Result<group_membership::Model, JoinError> {
    let group = reading_group::Entity::find_by_id(group_id).one(txn).await?;
    if group.is_none() {
        return Err(JoinError::GroupNotFound);
    }

    if is_member(txn, user_id, group_id).await? {
        return Err(JoinError::AlreadyMember);
    }

    let count = member_count(txn, group_id).await?;
    if count >= GROUP_CAPACITY {
        return Err(JoinError::GroupFull);
    }

    let membership = group_membership::ActiveModel {
        user_id: Set(user_id),
        group_id: Set(group_id),
        joined_at: Set(chrono::Utc::now().fixed_offset()),
        ..Default::default()
    };

    match membership.insert(txn).await {
        Ok(m) => Ok(m),
        // The unique index catches a duplicate that raced past the check above
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Err(JoinError::AlreadyMember),
            _ => Err(e.into()),
        },
    }
}

//! ReadingGroup entity
//!
//! Table: club_group
//!
//! `member_count` and `is_full` are derived from live membership rows at read
//! time, never stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed maximum number of concurrent memberships a group may hold.
pub const GROUP_CAPACITY: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "club_group")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "String(Some(255))")]
    pub name: String,

    #[sea_orm(indexed)]
    pub book_id: i64,

    pub creator_id: i64,

    /// Invariant: start_date <= end_date, checked at creation
    pub start_date: Date,

    pub end_date: Date,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Book,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Creator,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Group response (book/creator names and membership figures filled in by the
/// group service from current store state)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: i64,
    pub name: String,
    pub book: i64,
    pub book_title: String,
    pub creator: i64,
    pub creator_name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub member_count: u64,
    pub is_full: bool,
}

impl From<Model> for GroupResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            book: model.book_id,
            book_title: String::new(),
            creator: model.creator_id,
            creator_name: String::new(),
            start_date: model.start_date,
            end_date: model.end_date,
            member_count: 0,
            is_full: false,
        }
    }
}

impl GroupResponse {
    pub fn with_book_title(mut self, title: String) -> Self {
        self.book_title = title;
        self
    }

    pub fn with_creator_name(mut self, name: String) -> Self {
        self.creator_name = name;
        self
    }

    pub fn with_member_count(mut self, count: u64) -> Self {
        self.member_count = count;
        self.is_full = count >= GROUP_CAPACITY;
        self
    }
}

/// Group detail response (adds the member list)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupDetailResponse {
    #[serde(flatten)]
    pub group: GroupResponse,
    pub members: Vec<super::group_membership::MemberResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_response_wire_shape() {
        let model = Model {
            id: 1,
            name: "Sci-Fi Club".to_string(),
            book_id: 2,
            creator_id: 3,
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            created_at: chrono::Utc::now().fixed_offset(),
        };
        let response = GroupResponse::from(model)
            .with_book_title("Dune".to_string())
            .with_creator_name("alice".to_string())
            .with_member_count(GROUP_CAPACITY);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["bookTitle"], "Dune");
        assert_eq!(json["creatorName"], "alice");
        assert_eq!(json["memberCount"], 10);
        assert_eq!(json["isFull"], true);
        assert_eq!(json["startDate"], "2024-01-01");
    }

    #[test]
    fn test_member_count_below_capacity_not_full() {
        let model = Model {
            id: 1,
            name: "Sci-Fi Club".to_string(),
            book_id: 2,
            creator_id: 3,
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            created_at: chrono::Utc::now().fixed_offset(),
        };
        let response = GroupResponse::from(model).with_member_count(GROUP_CAPACITY - 1);
        assert!(!response.is_full);
        assert_eq!(response.member_count, 9);
    }
}

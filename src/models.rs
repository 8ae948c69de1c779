//! Data models for volunteer statistics.
//!
//! This module contains the snapshot documents (users, boards, task lists
//! and cards) as they are stored in the document database, together with
//! the aggregate structures produced by the analysis layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category used when a card has no type of work set.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Upper bound for the work hours of a single card.
pub const MAX_WORK_HOURS: u32 = 8;

/// A registered user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    /// Document id of the user.
    pub id: String,
    /// Display name.
    pub name: String,
    pub email: String,
    pub mobile: String,
    /// Profile image URL.
    pub image: String,
    /// Push notification token.
    pub fcm_token: String,
}

/// A unit of volunteer work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Card {
    pub name: String,
    /// Id of the user who created the card.
    pub created_by: String,
    /// Ids of the members working on the card.
    pub assigned_to: Vec<String>,
    /// Due date, stored as epoch milliseconds where `0` means none.
    #[serde(with = "epoch_millis")]
    pub due_date: Option<DateTime<Utc>>,
    /// Hex colour of the card label, empty when unset.
    pub label_color: String,
    /// Free-text category of the work.
    pub type_of_work: String,
    /// Hours of work logged on the card.
    pub work_hours: u32,
}

impl Card {
    /// Creates an empty card with the given name and creator.
    #[allow(dead_code)] // Constructor for editors and tests
    pub fn new(name: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_by: created_by.into(),
            ..Self::default()
        }
    }

    /// Returns the category label as stored, using `fallback` when it is empty.
    pub fn category<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.type_of_work.is_empty() {
            fallback
        } else {
            &self.type_of_work
        }
    }

    /// Whether the given user works on this card.
    pub fn is_assigned(&self, user_id: &str) -> bool {
        self.assigned_to.iter().any(|id| id == user_id)
    }

    /// Returns the label colour if one is set.
    pub fn label_color(&self) -> Option<&str> {
        if self.label_color.is_empty() {
            None
        } else {
            Some(&self.label_color)
        }
    }
}

/// An ordered list of cards on a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskList {
    pub title: String,
    pub created_by: String,
    pub cards: Vec<Card>,
}

impl TaskList {
    /// Creates an empty task list.
    #[allow(dead_code)] // Constructor for editors and tests
    pub fn new(title: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            created_by: created_by.into(),
            cards: Vec::new(),
        }
    }
}

/// A volunteer organization's workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Board {
    /// Document id of the board.
    #[serde(rename = "documentId", alias = "id")]
    pub id: String,
    pub name: String,
    pub image: String,
    /// Id of the owner.
    pub created_by: String,
    /// Ids of the board members.
    pub assigned_to: Vec<String>,
    pub task_list: Vec<TaskList>,
}

impl Board {
    /// Creates a board owned (and joined) by `owner`.
    #[allow(dead_code)] // Constructor for editors and tests
    pub fn new(id: impl Into<String>, name: impl Into<String>, owner: impl Into<String>) -> Self {
        let owner = owner.into();
        Self {
            id: id.into(),
            name: name.into(),
            assigned_to: vec![owner.clone()],
            created_by: owner,
            ..Self::default()
        }
    }

    /// Whether the given user is a member of this board.
    pub fn is_member(&self, user_id: &str) -> bool {
        self.assigned_to.iter().any(|id| id == user_id)
    }

    /// Iterates over all cards of all task lists, in order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.task_list.iter().flat_map(|list| list.cards.iter())
    }

    /// Total number of cards on the board.
    pub fn card_count(&self) -> usize {
        self.task_list.iter().map(|list| list.cards.len()).sum()
    }
}

/// A full in-memory copy of the users and boards collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub boards: Vec<Board>,
}

impl Snapshot {
    /// Looks up a user by id.
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Looks up a board by id.
    pub fn board(&self, id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    /// Looks up a board by id for editing.
    pub fn board_mut(&mut self, id: &str) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == id)
    }

    /// Boards the given user is a member of, in snapshot order.
    pub fn boards_for_member<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Board> {
        self.boards.iter().filter(move |b| b.is_member(user_id))
    }

    /// Total number of cards across all boards.
    pub fn card_count(&self) -> usize {
        self.boards.iter().map(Board::card_count).sum()
    }
}

/// Hours a user logged in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryHours {
    pub category: String,
    pub hours: u64,
}

/// A user's contribution to one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationHours {
    pub board_id: String,
    pub name: String,
    pub hours: u64,
    /// Hours per category, in first-seen order.
    pub categories: Vec<CategoryHours>,
}

/// Statistics for a single user across all boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnalytics {
    pub user_id: String,
    pub name: String,
    pub total_hours: u64,
    /// Boards where the user logged at least one hour.
    pub organizations: Vec<OrganizationHours>,
}

/// Hours and distinct volunteers for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub hours: u64,
    pub volunteers: usize,
}

/// Statistics for a single board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardAnalytics {
    pub board_id: String,
    pub name: String,
    pub total_hours: u64,
    /// Distinct users assigned to any card of the board.
    pub total_volunteers: usize,
    pub categories: Vec<CategoryStats>,
}

/// Category statistics across the whole system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCategoryStats {
    pub category: String,
    pub hours: u64,
    pub volunteers: usize,
    /// Distinct boards with at least one card in this category.
    pub organizations: usize,
}

/// Statistics across every board in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemAnalytics {
    pub total_hours: u64,
    pub total_volunteers: usize,
    pub total_organizations: usize,
    pub categories: Vec<SystemCategoryStats>,
}

/// One row of the volunteer ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// 1-based rank.
    pub position: usize,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub hours: u64,
}

/// Which statistics view to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum View {
    User,
    Board,
    #[default]
    System,
    Ranking,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::User => write!(f, "User"),
            View::Board => write!(f, "Organization"),
            View::System => write!(f, "System"),
            View::Ranking => write!(f, "Ranking"),
        }
    }
}

/// Serde adapter for due dates stored as epoch milliseconds.
mod epoch_millis {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.map(|d| d.timestamp_millis()).unwrap_or(0))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
        if millis <= 0 {
            return Ok(None);
        }
        DateTime::from_timestamp_millis(millis)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("due date out of range: {}", millis)))
    }
}

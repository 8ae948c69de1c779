//! Hour aggregation and statistics.
//!
//! This module groups card work hours by category, board and volunteer.
//! Every function recomputes from the full snapshot it is given.

use crate::models::{
    Board, BoardAnalytics, CategoryHours, CategoryStats, OrganizationHours, RankingEntry,
    Snapshot, SystemAnalytics, SystemCategoryStats, UserAnalytics, DEFAULT_CATEGORY,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Settings that influence how cards are grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationOptions {
    /// Category used for cards without a type of work.
    pub fallback_category: String,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            fallback_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl From<&crate::config::AnalyticsConfig> for AggregationOptions {
    fn from(config: &crate::config::AnalyticsConfig) -> Self {
        Self {
            fallback_category: config.fallback_category.clone(),
        }
    }
}

/// Per-category accumulator that remembers the order categories were first seen.
struct CategoryTally<T> {
    index: HashMap<String, usize>,
    rows: Vec<(String, T)>,
}

impl<T: Default> CategoryTally<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            rows: Vec::new(),
        }
    }

    fn entry(&mut self, category: &str) -> &mut T {
        let position = match self.index.get(category) {
            Some(&position) => position,
            None => {
                self.rows.push((category.to_string(), T::default()));
                self.index.insert(category.to_string(), self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        &mut self.rows[position].1
    }

    fn into_rows(self) -> Vec<(String, T)> {
        self.rows
    }
}

#[derive(Default)]
struct Bucket<'a> {
    hours: u64,
    volunteers: HashSet<&'a str>,
    boards: HashSet<&'a str>,
}

/// Tally every card of `boards` by category.
fn tally_boards<'a>(
    boards: impl Iterator<Item = &'a Board>,
    opts: &AggregationOptions,
) -> (Vec<(String, Bucket<'a>)>, HashSet<&'a str>) {
    let mut tally: CategoryTally<Bucket<'a>> = CategoryTally::new();
    let mut volunteers = HashSet::new();

    for board in boards {
        for card in board.cards() {
            let bucket = tally.entry(card.category(&opts.fallback_category));
            bucket.hours += u64::from(card.work_hours);
            bucket.boards.insert(board.id.as_str());

            for user_id in &card.assigned_to {
                bucket.volunteers.insert(user_id.as_str());
                volunteers.insert(user_id.as_str());
            }
        }
    }

    (tally.into_rows(), volunteers)
}

/// Compute statistics for a single user.
///
/// Returns `None` when the user is not part of the snapshot. Only boards the
/// user is a member of are considered, and boards where the user logged no
/// hours are left out.
pub fn user_analytics(
    snapshot: &Snapshot,
    user_id: &str,
    opts: &AggregationOptions,
) -> Option<UserAnalytics> {
    let user = snapshot.user(user_id)?;

    let organizations: Vec<OrganizationHours> = snapshot
        .boards_for_member(user_id)
        .filter_map(|board| {
            let mut tally: CategoryTally<u64> = CategoryTally::new();
            let mut hours = 0;

            for card in board.cards().filter(|c| c.is_assigned(user_id)) {
                let card_hours = u64::from(card.work_hours);
                hours += card_hours;
                *tally.entry(card.category(&opts.fallback_category)) += card_hours;
            }

            if hours == 0 {
                return None;
            }

            Some(OrganizationHours {
                board_id: board.id.clone(),
                name: board.name.clone(),
                hours,
                categories: tally
                    .into_rows()
                    .into_iter()
                    .map(|(category, hours)| CategoryHours { category, hours })
                    .collect(),
            })
        })
        .collect();

    let total_hours: u64 = organizations.iter().map(|o| o.hours).sum();
    debug!(
        "User {} logged {}h across {} organizations",
        user_id,
        total_hours,
        organizations.len()
    );

    Some(UserAnalytics {
        user_id: user.id.clone(),
        name: user.name.clone(),
        total_hours,
        organizations,
    })
}

/// Merge a user's category hours across all organizations.
pub fn user_category_hours(user: &UserAnalytics) -> Vec<CategoryHours> {
    let mut tally: CategoryTally<u64> = CategoryTally::new();

    for org in &user.organizations {
        for category in &org.categories {
            *tally.entry(&category.category) += category.hours;
        }
    }

    tally
        .into_rows()
        .into_iter()
        .map(|(category, hours)| CategoryHours { category, hours })
        .collect()
}

/// Number of distinct categories a user worked in.
pub fn unique_category_count(user: &UserAnalytics) -> usize {
    user.organizations
        .iter()
        .flat_map(|org| org.categories.iter().map(|c| c.category.as_str()))
        .collect::<HashSet<_>>()
        .len()
}

/// Compute statistics for a single board.
///
/// Returns `None` when the board is not part of the snapshot.
pub fn board_analytics(
    snapshot: &Snapshot,
    board_id: &str,
    opts: &AggregationOptions,
) -> Option<BoardAnalytics> {
    let board = snapshot.board(board_id)?;
    let (rows, volunteers) = tally_boards(std::iter::once(board), opts);

    let categories: Vec<CategoryStats> = rows
        .into_iter()
        .map(|(category, bucket)| CategoryStats {
            category,
            hours: bucket.hours,
            volunteers: bucket.volunteers.len(),
        })
        .collect();

    Some(BoardAnalytics {
        board_id: board.id.clone(),
        name: board.name.clone(),
        total_hours: categories.iter().map(|c| c.hours).sum(),
        total_volunteers: volunteers.len(),
        categories,
    })
}

/// Compute statistics across every board in the snapshot.
pub fn system_analytics(snapshot: &Snapshot, opts: &AggregationOptions) -> SystemAnalytics {
    let (rows, volunteers) = tally_boards(snapshot.boards.iter(), opts);

    let categories: Vec<SystemCategoryStats> = rows
        .into_iter()
        .map(|(category, bucket)| SystemCategoryStats {
            category,
            hours: bucket.hours,
            volunteers: bucket.volunteers.len(),
            organizations: bucket.boards.len(),
        })
        .collect();

    SystemAnalytics {
        total_hours: categories.iter().map(|c| c.hours).sum(),
        total_volunteers: volunteers.len(),
        total_organizations: snapshot.boards.len(),
        categories,
    }
}

/// Rank every user by total hours, highest first.
///
/// Ties are broken by name, then by id.
pub fn volunteer_ranking(snapshot: &Snapshot, opts: &AggregationOptions) -> Vec<RankingEntry> {
    let mut rows: Vec<_> = snapshot
        .users
        .iter()
        .map(|user| {
            let hours = user_analytics(snapshot, &user.id, opts)
                .map(|a| a.total_hours)
                .unwrap_or(0);
            (user, hours)
        })
        .collect();

    rows.sort_by(|(a, a_hours), (b, b_hours)| {
        b_hours
            .cmp(a_hours)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });

    rows.into_iter()
        .enumerate()
        .map(|(i, (user, hours))| RankingEntry {
            position: i + 1,
            user_id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            hours,
        })
        .collect()
}

/// The board selected by default in the organization view: the user's first board.
pub fn default_board_for<'a>(snapshot: &'a Snapshot, user_id: &'a str) -> Option<&'a Board> {
    snapshot.boards_for_member(user_id).next()
}

//! Snapshot validation and repair.
//!
//! The document store does not enforce the data-model invariants, so the
//! snapshot is checked after loading. Violations are reported as warnings
//! and never stop aggregation.

use crate::models::Snapshot;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// A data-model invariant violated by the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotWarning {
    DuplicateUser {
        id: String,
    },
    DuplicateBoard {
        id: String,
    },
    HoursOutOfRange {
        board: String,
        card: String,
        hours: u32,
        max: u32,
    },
    /// A card member who is not a member of the card's board.
    CardMemberNotOnBoard {
        board: String,
        card: String,
        user: String,
    },
    /// A board member with no matching user document.
    UnknownMember {
        board: String,
        user: String,
    },
    InvalidLabelColor {
        board: String,
        card: String,
        color: String,
    },
}

impl fmt::Display for SnapshotWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotWarning::DuplicateUser { id } => write!(f, "duplicate user id '{}'", id),
            SnapshotWarning::DuplicateBoard { id } => write!(f, "duplicate board id '{}'", id),
            SnapshotWarning::HoursOutOfRange {
                board,
                card,
                hours,
                max,
            } => write!(
                f,
                "card '{}' on board '{}' has {}h (maximum {}h)",
                card, board, hours, max
            ),
            SnapshotWarning::CardMemberNotOnBoard { board, card, user } => write!(
                f,
                "card '{}' on board '{}' is assigned to non-member '{}'",
                card, board, user
            ),
            SnapshotWarning::UnknownMember { board, user } => {
                write!(f, "board '{}' lists unknown member '{}'", board, user)
            }
            SnapshotWarning::InvalidLabelColor { board, card, color } => write!(
                f,
                "card '{}' on board '{}' has invalid label colour '{}'",
                card, board, color
            ),
        }
    }
}

/// A change made by [`repair`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Repair {
    ClampedHours {
        board: String,
        card: String,
        from: u32,
        to: u32,
    },
    RemovedCardMember {
        board: String,
        card: String,
        user: String,
    },
    ClearedLabelColor {
        board: String,
        card: String,
        color: String,
    },
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repair::ClampedHours {
                board,
                card,
                from,
                to,
            } => write!(f, "{}/{}: hours {} -> {}", board, card, from, to),
            Repair::RemovedCardMember { board, card, user } => {
                write!(f, "{}/{}: removed non-member '{}'", board, card, user)
            }
            Repair::ClearedLabelColor { board, card, color } => {
                write!(f, "{}/{}: cleared label colour '{}'", board, card, color)
            }
        }
    }
}

/// Whether `color` looks like `#RRGGBB` or `#AARRGGBB`.
pub fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => {
            (hex.len() == 6 || hex.len() == 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Check the snapshot against the data-model invariants.
pub fn validate(snapshot: &Snapshot, max_hours: u32) -> Vec<SnapshotWarning> {
    let mut warnings = Vec::new();

    let mut user_ids = HashSet::new();
    for user in &snapshot.users {
        if !user_ids.insert(user.id.as_str()) {
            warnings.push(SnapshotWarning::DuplicateUser {
                id: user.id.clone(),
            });
        }
    }

    let mut board_ids = HashSet::new();
    for board in &snapshot.boards {
        if !board_ids.insert(board.id.as_str()) {
            warnings.push(SnapshotWarning::DuplicateBoard {
                id: board.id.clone(),
            });
        }

        for member in &board.assigned_to {
            if !user_ids.contains(member.as_str()) {
                warnings.push(SnapshotWarning::UnknownMember {
                    board: board.id.clone(),
                    user: member.clone(),
                });
            }
        }

        for card in board.cards() {
            if card.work_hours > max_hours {
                warnings.push(SnapshotWarning::HoursOutOfRange {
                    board: board.id.clone(),
                    card: card.name.clone(),
                    hours: card.work_hours,
                    max: max_hours,
                });
            }

            for user in card.assigned_to.iter().filter(|u| !board.is_member(u)) {
                warnings.push(SnapshotWarning::CardMemberNotOnBoard {
                    board: board.id.clone(),
                    card: card.name.clone(),
                    user: user.clone(),
                });
            }

            if let Some(color) = card.label_color() {
                if !is_hex_color(color) {
                    warnings.push(SnapshotWarning::InvalidLabelColor {
                        board: board.id.clone(),
                        card: card.name.clone(),
                        color: color.to_string(),
                    });
                }
            }
        }
    }

    for warning in &warnings {
        warn!("{}", warning);
    }

    warnings
}

/// Fix what can be fixed in place: clamp hours, drop non-member card
/// assignments and clear malformed label colours.
pub fn repair(snapshot: &mut Snapshot, max_hours: u32) -> Vec<Repair> {
    let mut repairs = Vec::new();

    for board in &mut snapshot.boards {
        let members = board.assigned_to.clone();

        for card in board.task_list.iter_mut().flat_map(|l| l.cards.iter_mut()) {
            if card.work_hours > max_hours {
                let from = card.work_hours;
                card.work_hours = max_hours;
                repairs.push(Repair::ClampedHours {
                    board: board.id.clone(),
                    card: card.name.clone(),
                    from,
                    to: max_hours,
                });
            }

            let outsiders: Vec<String> = card
                .assigned_to
                .iter()
                .filter(|u| !members.contains(u))
                .cloned()
                .collect();
            for user in outsiders {
                card.unassign(&user);
                repairs.push(Repair::RemovedCardMember {
                    board: board.id.clone(),
                    card: card.name.clone(),
                    user,
                });
            }

            if !card.label_color.is_empty() && !is_hex_color(&card.label_color) {
                let color = std::mem::take(&mut card.label_color);
                repairs.push(Repair::ClearedLabelColor {
                    board: board.id.clone(),
                    card: card.name.clone(),
                    color,
                });
            }
        }
    }

    debug!("Applied {} repairs", repairs.len());
    repairs
}

//! Card and board editing.
//!
//! Edits are applied to the in-memory snapshot, which is then persisted
//! wholesale. There are no partial updates.

use crate::error::SnapshotError;
use crate::models::{Board, Card};
use std::fmt;
use std::str::FromStr;

/// Location of a card: board id, task list index and card index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRef {
    pub board: String,
    pub list: usize,
    pub card: usize,
}

impl fmt::Display for CardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.board, self.list, self.card)
    }
}

impl FromStr for CardRef {
    type Err = String;

    /// Parses `BOARD:LIST:CARD`, splitting from the right so board ids may contain ':'.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let card = parts.next();
        let list = parts.next();
        let board = parts.next();

        match (board, list, card) {
            (Some(board), Some(list), Some(card)) if !board.is_empty() => Ok(Self {
                board: board.to_string(),
                list: list
                    .parse()
                    .map_err(|_| format!("invalid task list index '{}'", list))?,
                card: card
                    .parse()
                    .map_err(|_| format!("invalid card index '{}'", card))?,
            }),
            _ => Err(format!("expected BOARD:LIST:CARD, got '{}'", s)),
        }
    }
}

/// A `--set-hours` request: `BOARD:LIST:CARD=HOURS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursEdit {
    pub target: CardRef,
    pub hours: u32,
}

impl FromStr for HoursEdit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, hours) = s
            .split_once('=')
            .ok_or_else(|| format!("expected BOARD:LIST:CARD=HOURS, got '{}'", s))?;
        Ok(Self {
            target: target.parse()?,
            hours: hours
                .trim()
                .parse()
                .map_err(|_| format!("invalid hours '{}'", hours))?,
        })
    }
}

/// An `--assign` request: `BOARD:LIST:CARD=USER`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignEdit {
    pub target: CardRef,
    pub user: String,
}

impl FromStr for AssignEdit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((target, user)) if !user.trim().is_empty() => Ok(Self {
                target: target.parse()?,
                user: user.trim().to_string(),
            }),
            _ => Err(format!("expected BOARD:LIST:CARD=USER, got '{}'", s)),
        }
    }
}

impl Card {
    /// Sets the card's work hours, rejecting values above `max`.
    pub fn set_work_hours(&mut self, hours: u32, max: u32) -> Result<(), SnapshotError> {
        if hours > max {
            return Err(SnapshotError::Hours { hours, max });
        }
        self.work_hours = hours;
        Ok(())
    }

    /// Adds a member to the card. Returns `false` if already assigned.
    pub fn assign(&mut self, user_id: &str) -> bool {
        if self.is_assigned(user_id) {
            return false;
        }
        self.assigned_to.push(user_id.to_string());
        true
    }

    /// Removes a member from the card. Returns `false` if not assigned.
    pub fn unassign(&mut self, user_id: &str) -> bool {
        let before = self.assigned_to.len();
        self.assigned_to.retain(|id| id != user_id);
        self.assigned_to.len() != before
    }
}

impl Board {
    fn unknown_card(&self, list: usize, card: usize) -> SnapshotError {
        SnapshotError::UnknownCard {
            board: self.id.clone(),
            list,
            card,
        }
    }

    /// Returns the card at the given position for editing.
    pub fn card_mut(&mut self, list: usize, card: usize) -> Result<&mut Card, SnapshotError> {
        let err = self.unknown_card(list, card);
        self.task_list
            .get_mut(list)
            .and_then(|l| l.cards.get_mut(card))
            .ok_or(err)
    }

    /// Removes and returns the card at the given position.
    pub fn remove_card(&mut self, list: usize, card: usize) -> Result<Card, SnapshotError> {
        let in_range = self
            .task_list
            .get(list)
            .map_or(false, |l| card < l.cards.len());
        if !in_range {
            return Err(self.unknown_card(list, card));
        }
        Ok(self.task_list[list].cards.remove(card))
    }

    /// Assigns a board member to a card. Only board members can be assigned.
    pub fn assign_card_member(
        &mut self,
        list: usize,
        card: usize,
        user_id: &str,
    ) -> Result<bool, SnapshotError> {
        if !self.is_member(user_id) {
            return Err(SnapshotError::NotMember {
                board: self.id.clone(),
                user: user_id.to_string(),
            });
        }
        Ok(self.card_mut(list, card)?.assign(user_id))
    }
}

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

use super::schedule::Schedule;

/// Core election data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCore {
    /// Display title.
    pub title: String,
    /// Voting window.
    #[serde(flatten)]
    pub schedule: Schedule,
    /// Candidates in declared order. Never removed once created;
    /// `vote_count` is mutated only by the vote recorder.
    pub candidates: Vec<Candidate>,
}

impl ElectionCore {
    /// Find a candidate by its ID.
    pub fn candidate(&self, candidate_id: Id) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == candidate_id)
    }
}

/// A candidate embedded in an election, with its running tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate unique ID (within the election).
    pub id: Id,
    /// Candidate display name.
    pub name: String,
    /// Number of votes received so far.
    pub vote_count: u64,
}

impl Candidate {
    /// A fresh candidate with no votes.
    pub fn new(name: String) -> Self {
        Self {
            id: Id::new(),
            name,
            vote_count: 0,
        }
    }
}

/// An election without an ID, ready for insertion.
pub type NewElection = ElectionCore;

/// An election from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Election {
        pub fn example() -> Self {
            Self {
                id: Id::new(),
                election: ElectionCore {
                    title: "Student Union President".to_string(),
                    schedule: Schedule {
                        start_date: "2026-03-01".to_string(),
                        start_time: "09:00".to_string(),
                        end_date: "2026-03-01".to_string(),
                        end_time: "09:10".to_string(),
                    },
                    candidates: vec![
                        Candidate::new("Alice Okafor".to_string()),
                        Candidate::new("Bola Adeyemi".to_string()),
                    ],
                },
            }
        }
    }
}

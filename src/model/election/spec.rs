use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::election_core::{Candidate, NewElection};
use super::schedule::{InvalidSchedule, Schedule};

/// Minimum number of candidates an election must have.
pub const MIN_CANDIDATES: usize = 2;

/// An election specification, as submitted by an admin.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSpec {
    pub title: String,
    #[serde(flatten)]
    pub schedule: Schedule,
    /// Candidate names in declared order.
    pub candidates: Vec<String>,
}

impl ElectionSpec {
    /// Validate the spec and turn it into an insertable election.
    /// Candidate IDs are assigned here; tallies start at zero.
    pub fn into_election(self) -> Result<NewElection, InvalidSpec> {
        if self.title.trim().is_empty() {
            return Err(InvalidSpec::EmptyTitle);
        }
        if self.candidates.len() < MIN_CANDIDATES {
            return Err(InvalidSpec::TooFewCandidates {
                count: self.candidates.len(),
            });
        }
        let mut seen = HashSet::new();
        for name in &self.candidates {
            if !seen.insert(name.as_str()) {
                return Err(InvalidSpec::DuplicateCandidate { name: name.clone() });
            }
        }
        self.schedule.validate()?;

        Ok(NewElection {
            title: self.title,
            schedule: self.schedule,
            candidates: self.candidates.into_iter().map(Candidate::new).collect(),
        })
    }
}

/// Reasons an election spec is rejected at creation.
#[derive(Debug, Error)]
pub enum InvalidSpec {
    #[error("Election title must not be empty")]
    EmptyTitle,
    #[error("An election needs at least {MIN_CANDIDATES} candidates, got {count}")]
    TooFewCandidates { count: usize },
    #[error("Duplicate candidate {name:?}")]
    DuplicateCandidate { name: String },
    #[error(transparent)]
    Schedule(#[from] InvalidSchedule),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ElectionSpec {
        ElectionSpec {
            title: "Sports Secretary".to_string(),
            schedule: Schedule {
                start_date: "2026-03-01".to_string(),
                start_time: "09:00".to_string(),
                end_date: "2026-03-01".to_string(),
                end_time: "17:00".to_string(),
            },
            candidates: vec!["Asha".to_string(), "Dev".to_string()],
        }
    }

    #[test]
    fn valid_spec_becomes_an_election() {
        let election = spec().into_election().unwrap();
        assert_eq!(election.candidates.len(), 2);
        assert!(election.candidates.iter().all(|c| c.vote_count == 0));
        // Declared order is preserved.
        assert_eq!(election.candidates[0].name, "Asha");
        // IDs are unique.
        assert_ne!(election.candidates[0].id, election.candidates[1].id);
    }

    #[test]
    fn single_candidate_is_rejected() {
        let mut s = spec();
        s.candidates.pop();
        assert!(matches!(
            s.into_election(),
            Err(InvalidSpec::TooFewCandidates { count: 1 })
        ));
    }

    #[test]
    fn duplicate_candidates_are_rejected() {
        let mut s = spec();
        s.candidates.push("Asha".to_string());
        assert!(matches!(
            s.into_election(),
            Err(InvalidSpec::DuplicateCandidate { .. })
        ));
    }

    #[test]
    fn bad_schedule_is_rejected() {
        let mut s = spec();
        s.schedule.end_time = "09:01".to_string();
        assert!(matches!(s.into_election(), Err(InvalidSpec::Schedule(_))));
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut s = spec();
        s.title = "  ".to_string();
        assert!(matches!(s.into_election(), Err(InvalidSpec::EmptyTitle)));
    }
}

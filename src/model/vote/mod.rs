mod recorder;

pub use recorder::record_vote;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    election::{Candidate, Election, ElectionPhase, InvalidSchedule},
    mongodb::Id,
};

/// Why a vote was refused. Every variant is reported to the caller;
/// none are retried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("No election found with ID {election_id}")]
    ElectionNotFound { election_id: Id },
    /// The payload carries the phase so the client can tell "not yet open"
    /// from "already closed".
    #[error("Voting is not open for this election (currently {phase:?})")]
    VotingNotOpen { phase: ElectionPhase },
    #[error("No candidate {candidate_id} in election {election_id}")]
    CandidateNotFound { election_id: Id, candidate_id: Id },
    #[error("Student has already voted in election {election_id}")]
    DuplicateVote { election_id: Id },
    #[error(transparent)]
    Schedule(#[from] InvalidSchedule),
}

/// Confirmation returned to the student after a successful vote.
/// Echoes only their own choice; tallies and other ballots stay private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub election_id: Id,
    pub election_title: String,
    pub candidate_id: Id,
    pub candidate_name: String,
    pub cast_at: DateTime<Utc>,
}

/// Check the vote preconditions in their contractual order and resolve the
/// candidate. The duplicate check here is advisory ordering only: the
/// recorder re-enforces it with a conditional update so that concurrent
/// requests cannot both pass.
pub fn check_vote<'e>(
    election: &'e Election,
    has_voted: &HashSet<Id>,
    candidate_id: Id,
    now: DateTime<Utc>,
) -> Result<&'e Candidate, VoteError> {
    let phase = election.schedule.phase(now)?;
    if phase != ElectionPhase::Ongoing {
        return Err(VoteError::VotingNotOpen { phase });
    }
    let candidate = election
        .candidate(candidate_id)
        .ok_or(VoteError::CandidateNotFound {
            election_id: election.id,
            candidate_id,
        })?;
    if has_voted.contains(&election.id) {
        return Err(VoteError::DuplicateVote {
            election_id: election.id,
        });
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn election() -> Election {
        Election::example()
    }

    #[test]
    fn vote_during_the_window_resolves_the_candidate() {
        let election = election();
        let now = election.schedule.start_at().unwrap() + Duration::seconds(1);
        let candidate_id = election.candidates[0].id;

        let candidate = check_vote(&election, &HashSet::new(), candidate_id, now).unwrap();
        assert_eq!(candidate.name, "Alice Okafor");
    }

    #[test]
    fn vote_at_the_start_instant_is_allowed() {
        let election = election();
        let now = election.schedule.start_at().unwrap();
        let candidate_id = election.candidates[1].id;

        assert!(check_vote(&election, &HashSet::new(), candidate_id, now).is_ok());
    }

    #[test]
    fn vote_at_the_end_instant_is_refused_as_completed() {
        let election = election();
        let now = election.schedule.end_at().unwrap();
        let candidate_id = election.candidates[0].id;

        let err = check_vote(&election, &HashSet::new(), candidate_id, now).unwrap_err();
        assert_eq!(
            err,
            VoteError::VotingNotOpen {
                phase: ElectionPhase::Completed
            }
        );
    }

    #[test]
    fn vote_before_the_window_is_refused_as_upcoming() {
        let election = election();
        let now = election.schedule.start_at().unwrap() - Duration::minutes(1);
        let candidate_id = election.candidates[0].id;

        let err = check_vote(&election, &HashSet::new(), candidate_id, now).unwrap_err();
        assert_eq!(
            err,
            VoteError::VotingNotOpen {
                phase: ElectionPhase::Upcoming
            }
        );
    }

    #[test]
    fn unknown_candidate_is_refused() {
        let election = election();
        let now = election.schedule.start_at().unwrap() + Duration::seconds(1);

        let err = check_vote(&election, &HashSet::new(), Id::new(), now).unwrap_err();
        assert!(matches!(err, VoteError::CandidateNotFound { .. }));
    }

    #[test]
    fn second_vote_in_the_same_election_is_a_duplicate() {
        let election = election();
        let now = election.schedule.start_at().unwrap() + Duration::seconds(2);
        // First vote succeeded and recorded membership.
        let has_voted: HashSet<Id> = [election.id].into_iter().collect();
        // A different candidate does not help.
        let other_candidate = election.candidates[1].id;

        let err = check_vote(&election, &has_voted, other_candidate, now).unwrap_err();
        assert_eq!(
            err,
            VoteError::DuplicateVote {
                election_id: election.id
            }
        );
    }

    #[test]
    fn broken_schedule_surfaces_instead_of_refusing_quietly() {
        let mut election = election();
        election.election.schedule.start_date = "soon".to_string();
        let candidate_id = election.candidates[0].id;

        let err = check_vote(&election, &HashSet::new(), candidate_id, Utc::now()).unwrap_err();
        assert!(matches!(err, VoteError::Schedule(_)));
    }
}

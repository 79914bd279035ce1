use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::election_core::Election;
use super::schedule::{ElectionPhase, InvalidSchedule};

/// How to order candidates in a results view.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResultsOrder {
    /// The order the candidates were declared in (live view default).
    Declared,
    /// Descending vote count (completed view default).
    Ranked,
}

/// A read-only projection of an election's tallies, safe to poll at any
/// rate and in any phase: live tallies while ongoing, final tallies after.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionResults {
    pub title: String,
    pub phase: ElectionPhase,
    pub candidates: Vec<CandidateTally>,
    pub as_of: DateTime<Utc>,
}

/// One candidate's current tally. Deliberately contains nothing that could
/// identify who cast the votes.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTally {
    pub name: String,
    pub vote_count: u64,
}

impl ElectionResults {
    /// Project the given election at instant `now`.
    pub fn project(
        election: &Election,
        now: DateTime<Utc>,
        order: Option<ResultsOrder>,
    ) -> Result<Self, InvalidSchedule> {
        let phase = election.schedule.phase(now)?;
        let order = order.unwrap_or(match phase {
            ElectionPhase::Completed => ResultsOrder::Ranked,
            _ => ResultsOrder::Declared,
        });

        let mut candidates = election
            .candidates
            .iter()
            .map(|c| CandidateTally {
                name: c.name.clone(),
                vote_count: c.vote_count,
            })
            .collect::<Vec<_>>();
        if order == ResultsOrder::Ranked {
            candidates.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
        }

        Ok(Self {
            title: election.title.clone(),
            phase,
            candidates,
            as_of: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn election_with_votes() -> Election {
        let mut election = Election::example();
        election.election.candidates[0].vote_count = 1;
        election
    }

    #[test]
    fn live_view_keeps_declared_order() {
        let election = election_with_votes();
        let now = election.schedule.start_at().unwrap() + Duration::seconds(2);

        let results = ElectionResults::project(&election, now, None).unwrap();
        assert_eq!(results.phase, ElectionPhase::Ongoing);
        assert_eq!(results.as_of, now);
        let tallies: Vec<_> = results
            .candidates
            .iter()
            .map(|c| (c.name.as_str(), c.vote_count))
            .collect();
        assert_eq!(tallies, vec![("Alice Okafor", 1), ("Bola Adeyemi", 0)]);
    }

    #[test]
    fn completed_view_ranks_by_votes() {
        let mut election = Election::example();
        election.election.candidates[1].vote_count = 3;
        let now = election.schedule.end_at().unwrap() + Duration::seconds(1);

        let results = ElectionResults::project(&election, now, None).unwrap();
        assert_eq!(results.phase, ElectionPhase::Completed);
        assert_eq!(results.candidates[0].name, "Bola Adeyemi");
        assert_eq!(results.candidates[0].vote_count, 3);
    }

    #[test]
    fn caller_can_override_the_order() {
        let mut election = Election::example();
        election.election.candidates[1].vote_count = 3;
        let now = election.schedule.start_at().unwrap();

        let results =
            ElectionResults::project(&election, now, Some(ResultsOrder::Ranked)).unwrap();
        assert_eq!(results.candidates[0].name, "Bola Adeyemi");
    }

    #[test]
    fn upcoming_elections_still_project() {
        let election = Election::example();
        let now = election.schedule.start_at().unwrap() - Duration::hours(1);

        let results = ElectionResults::project(&election, now, None).unwrap();
        assert_eq!(results.phase, ElectionPhase::Upcoming);
        assert!(results.candidates.iter().all(|c| c.vote_count == 0));
    }
}

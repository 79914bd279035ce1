mod election_core;
mod results;
mod schedule;
mod spec;

pub use election_core::{Candidate, Election, ElectionCore, NewElection};
pub use results::{CandidateTally, ElectionResults, ResultsOrder};
pub use schedule::{ElectionPhase, InvalidSchedule, Schedule, MIN_DURATION_SECONDS};
pub use spec::{ElectionSpec, InvalidSpec, MIN_CANDIDATES};

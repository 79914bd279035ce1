use std::collections::HashSet;

use chrono::{DateTime, Utc};
use mongodb::{bson::doc, Client};
use rocket::http::Status;

use crate::error::{Error, Result};
use crate::model::{
    election::Election,
    mongodb::{Coll, Id},
    student::Student,
};

use super::{check_vote, VoteError, VoteReceipt};

/// Record a vote: add the election to the student's voting history and
/// increment the chosen candidate's tally, as one unit.
///
/// Both writes happen inside a multi-document transaction, and the
/// duplicate-vote guard is the conditional filter on the history update
/// rather than a separate read, so concurrent requests for the same
/// (student, election) pair cannot both succeed, and a vote can never be
/// counted without being remembered (or vice versa). Transaction conflicts
/// abort the whole unit and surface as a retryable database error.
pub async fn record_vote(
    db_client: &Client,
    elections: &Coll<Election>,
    students: &Coll<Student>,
    student_id: Id,
    election_id: Id,
    candidate_id: Id,
    now: DateTime<Utc>,
) -> Result<VoteReceipt> {
    // Preconditions that need no serialization: election exists, window is
    // open, candidate belongs to it.
    let election = elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or(VoteError::ElectionNotFound { election_id })?;
    // The duplicate check is deliberately left to the conditional update
    // below; an empty history here means it cannot trip early.
    let candidate = check_vote(&election, &HashSet::new(), candidate_id, now)?;
    let candidate_name = candidate.name.clone();

    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    // Mark the student as having voted, but only if they haven't already.
    // Matching zero documents means either a duplicate vote or a student
    // that no longer exists; distinguishing the two is read-only.
    let mark_voted = students
        .update_one_with_session(
            doc! { "_id": *student_id, "has_voted": { "$ne": election_id } },
            doc! { "$addToSet": { "has_voted": election_id } },
            None,
            &mut session,
        )
        .await?;
    if mark_voted.matched_count == 0 {
        session.abort_transaction().await?;
        return if students.find_one(student_id.as_doc(), None).await?.is_some() {
            Err(VoteError::DuplicateVote { election_id }.into())
        } else {
            Err(Error::Status(
                Status::NotFound,
                format!("No student found with ID {student_id}"),
            ))
        };
    }

    // Count the vote.
    let count_vote = elections
        .update_one_with_session(
            doc! { "_id": *election_id, "candidates.id": candidate_id },
            doc! { "$inc": { "candidates.$.vote_count": 1 } },
            None,
            &mut session,
        )
        .await?;
    if count_vote.matched_count == 0 {
        // Candidates are never removed, so this only fires if the election
        // vanished mid-transaction.
        session.abort_transaction().await?;
        return Err(VoteError::CandidateNotFound {
            election_id,
            candidate_id,
        }
        .into());
    }

    session.commit_transaction().await?;

    info!("Vote recorded for election {election_id}");

    Ok(VoteReceipt {
        election_id,
        election_title: election.title.clone(),
        candidate_id,
        candidate_name,
        cast_at: now,
    })
}

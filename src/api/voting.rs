use chrono::Utc;
use mongodb::Client;
use rocket::{http::Status, serde::json::Json, Route, State};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{
    auth::AuthToken,
    election::Election,
    mongodb::{Coll, Id},
    student::Student,
    vote::{record_vote, VoteReceipt},
};

pub fn routes() -> Vec<Route> {
    routes![cast_vote, voted_elections]
}

/// The ballot a student submits: just the chosen candidate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BallotSpec {
    candidate_id: Id,
}

#[post("/elections/<election_id>/votes", data = "<ballot>", format = "json")]
async fn cast_vote(
    token: AuthToken<Student>,
    election_id: Id,
    ballot: Json<BallotSpec>,
    elections: Coll<Election>,
    students: Coll<Student>,
    db_client: &State<Client>,
) -> Result<Json<VoteReceipt>> {
    let receipt = record_vote(
        db_client,
        &elections,
        &students,
        token.id(),
        election_id,
        ballot.candidate_id,
        Utc::now(),
    )
    .await?;

    Ok(Json(receipt))
}

/// The elections this student has already voted in. Only membership is
/// returned, never which candidate was chosen.
#[get("/voter/voted")]
async fn voted_elections(
    token: AuthToken<Student>,
    students: Coll<Student>,
) -> Result<Json<Vec<Id>>> {
    let student = students
        .find_one(token.id().as_doc(), None)
        .await?
        .ok_or_else(|| {
            Error::Status(
                Status::NotFound,
                format!("No student found with ID {}", token.id()),
            )
        })?;

    Ok(Json(student.has_voted.iter().copied().collect()))
}

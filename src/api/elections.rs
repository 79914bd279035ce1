use chrono::Utc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{
    admin::Admin,
    auth::AuthToken,
    election::{
        Election, ElectionPhase, ElectionResults, ElectionSpec, NewElection, ResultsOrder,
        Schedule,
    },
    mongodb::{Coll, Id},
    student::Student,
    vote::VoteError,
};

pub fn routes() -> Vec<Route> {
    routes![
        create_election,
        elections_admin,
        elections_student,
        election_admin,
        election_student,
        results_admin,
        results_student,
    ]
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    _token: AuthToken<Admin>,
    spec: Json<ElectionSpec>,
    new_elections: Coll<NewElection>,
    elections: Coll<Election>,
) -> Result<Json<Election>> {
    // Candidate counts and the schedule are validated here and never again.
    let election = spec.0.into_election()?;

    let new_id: Id = new_elections
        .insert_one(&election, None)
        .await?
        .inserted_id
        .as_object_id()
        .unwrap() // Valid because the ID comes directly from the DB
        .into();
    let election = elections
        .find_one(new_id.as_doc(), None)
        .await?
        .unwrap(); // Just inserted.

    info!("Created election {} ({})", election.id, election.title);

    Ok(Json(election))
}

/// A single election in the dashboard listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ElectionSummary {
    id: Id,
    title: String,
    #[serde(flatten)]
    schedule: Schedule,
    /// `None` iff the stored schedule is corrupt; one broken election must
    /// not take the rest of the listing down with it.
    phase: Option<ElectionPhase>,
}

#[get("/elections", rank = 1)]
async fn elections_admin(
    _token: AuthToken<Admin>,
    elections: Coll<Election>,
) -> Result<Json<Vec<ElectionSummary>>> {
    list_elections(elections).await
}

#[get("/elections", rank = 2)]
async fn elections_student(
    _token: AuthToken<Student>,
    elections: Coll<Election>,
) -> Result<Json<Vec<ElectionSummary>>> {
    list_elections(elections).await
}

async fn list_elections(elections: Coll<Election>) -> Result<Json<Vec<ElectionSummary>>> {
    let now = Utc::now();
    let all: Vec<Election> = elections.find(None, None).await?.try_collect().await?;

    let summaries = all
        .into_iter()
        .map(|election| {
            let phase = match election.schedule.phase(now) {
                Ok(phase) => Some(phase),
                Err(err) => {
                    warn!("Election {} has a corrupt schedule: {err}", election.id);
                    None
                }
            };
            ElectionSummary {
                id: election.id,
                title: election.election.title,
                schedule: election.election.schedule,
                phase,
            }
        })
        .collect();

    Ok(Json(summaries))
}

#[get("/elections/<election_id>", rank = 1)]
async fn election_admin(
    _token: AuthToken<Admin>,
    election_id: Id,
    elections: Coll<Election>,
) -> Result<Json<Election>> {
    Ok(Json(election_by_id(election_id, &elections).await?))
}

#[get("/elections/<election_id>", rank = 2)]
async fn election_student(
    _token: AuthToken<Student>,
    election_id: Id,
    elections: Coll<Election>,
) -> Result<Json<Election>> {
    Ok(Json(election_by_id(election_id, &elections).await?))
}

#[get("/elections/<election_id>/results?<ranked>", rank = 1)]
async fn results_admin(
    _token: AuthToken<Admin>,
    election_id: Id,
    ranked: Option<bool>,
    elections: Coll<Election>,
) -> Result<Json<ElectionResults>> {
    results(election_id, ranked, &elections).await
}

#[get("/elections/<election_id>/results?<ranked>", rank = 2)]
async fn results_student(
    _token: AuthToken<Student>,
    election_id: Id,
    ranked: Option<bool>,
    elections: Coll<Election>,
) -> Result<Json<ElectionResults>> {
    results(election_id, ranked, &elections).await
}

/// Project the current tallies. Exposed in every phase (the student UI
/// polls this during the voting window), so it has to stay cheap and
/// side-effect free.
async fn results(
    election_id: Id,
    ranked: Option<bool>,
    elections: &Coll<Election>,
) -> Result<Json<ElectionResults>> {
    let election = election_by_id(election_id, elections).await?;
    let order = ranked.map(|ranked| {
        if ranked {
            ResultsOrder::Ranked
        } else {
            ResultsOrder::Declared
        }
    });
    let results = ElectionResults::project(&election, Utc::now(), order)?;
    Ok(Json(results))
}

/// Look up an election by ID.
pub async fn election_by_id(election_id: Id, elections: &Coll<Election>) -> Result<Election> {
    elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::Vote(VoteError::ElectionNotFound { election_id }))
}

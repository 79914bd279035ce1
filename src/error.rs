use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use mongodb::error::Error as DbError;
use rocket::{
    http::{ContentType, Status},
    response::Responder,
    serde::json::json,
    Request, Response,
};
use std::io::Cursor;
use thiserror::Error;

use crate::model::{
    election::{ElectionPhase, InvalidSchedule, InvalidSpec},
    vote::VoteError,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("Face service request failed: {0}")]
    FaceService(#[from] reqwest::Error),
    #[error(transparent)]
    Vote(#[from] VoteError),
    #[error(transparent)]
    Schedule(#[from] InvalidSchedule),
    #[error(transparent)]
    Spec(#[from] InvalidSpec),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// The HTTP status this error maps to.
    fn status(&self) -> Status {
        match self {
            Self::Db(_) => Status::InternalServerError,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Csv(_) => Status::BadRequest,
            Self::FaceService(_) => Status::BadGateway,
            Self::Vote(err) => match err {
                VoteError::ElectionNotFound { .. } | VoteError::CandidateNotFound { .. } => {
                    Status::NotFound
                }
                VoteError::VotingNotOpen { .. } => Status::Forbidden,
                VoteError::DuplicateVote { .. } => Status::Conflict,
                // Corrupt stored data, not a client mistake.
                VoteError::Schedule(_) => Status::InternalServerError,
            },
            Self::Schedule(_) => Status::InternalServerError,
            Self::Spec(_) => Status::BadRequest,
            Self::Status(status, _) => *status,
        }
    }

    /// The election phase to include in the error payload, where relevant,
    /// so clients can tell "not yet open" from "already closed".
    fn phase(&self) -> Option<ElectionPhase> {
        match self {
            Self::Vote(VoteError::VotingNotOpen { phase }) => Some(*phase),
            _ => None,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        match status.class() {
            rocket::http::StatusClass::ServerError => error!("{self}"),
            _ => warn!("{self}"),
        }

        let body = json!({
            "error": self.to_string(),
            "phase": self.phase(),
        })
        .to_string();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::mongodb::Id;

    use super::*;

    #[test]
    fn vote_errors_map_to_distinct_statuses() {
        let election_id = Id::new();
        let not_found: Error = VoteError::ElectionNotFound { election_id }.into();
        let not_open: Error = VoteError::VotingNotOpen {
            phase: ElectionPhase::Completed,
        }
        .into();
        let duplicate: Error = VoteError::DuplicateVote { election_id }.into();

        assert_eq!(not_found.status(), Status::NotFound);
        assert_eq!(not_open.status(), Status::Forbidden);
        assert_eq!(duplicate.status(), Status::Conflict);
    }

    #[test]
    fn not_open_errors_carry_the_phase() {
        let err: Error = VoteError::VotingNotOpen {
            phase: ElectionPhase::Upcoming,
        }
        .into();
        assert_eq!(err.phase(), Some(ElectionPhase::Upcoming));

        let err: Error = VoteError::DuplicateVote {
            election_id: Id::new(),
        }
        .into();
        assert_eq!(err.phase(), None);
    }

    #[test]
    fn corrupt_schedules_are_server_errors() {
        let err: Error = InvalidSchedule::BadDate {
            value: "soon".to_string(),
        }
        .into();
        assert_eq!(err.status(), Status::InternalServerError);
    }
}

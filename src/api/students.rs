use chrono::Utc;
use mongodb::bson::doc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};
use serde::Serialize;

use crate::error::Result;
use crate::face::FaceClient;
use crate::model::{
    admin::Admin,
    auth::AuthToken,
    mongodb::{Coll, Id},
    student::{
        parse_delete, parse_import, DeleteSummary, ImportSummary, NewStudent, Student,
        StudentCore,
    },
};

pub fn routes() -> Vec<Route> {
    routes![list_students, import_students, delete_students]
}

/// A student as shown to admins: no password hash, no raw embeddings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StudentSummary {
    id: Id,
    name: String,
    roll_no: String,
    email: String,
    face_registered: bool,
    elections_voted: usize,
}

impl From<Student> for StudentSummary {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            name: student.student.name,
            roll_no: student.student.roll_no,
            email: student.student.email,
            face_registered: student.student.face_registered,
            elections_voted: student.student.has_voted.len(),
        }
    }
}

#[get("/students")]
async fn list_students(
    _token: AuthToken<Admin>,
    students: Coll<Student>,
) -> Result<Json<Vec<StudentSummary>>> {
    let all: Vec<Student> = students.find(None, None).await?.try_collect().await?;
    Ok(Json(all.into_iter().map(StudentSummary::from).collect()))
}

#[post("/students/import", data = "<csv_data>", format = "text/csv")]
async fn import_students(
    _token: AuthToken<Admin>,
    csv_data: String,
    students: Coll<Student>,
    new_students: Coll<NewStudent>,
    face: &State<FaceClient>,
) -> Result<Json<ImportSummary>> {
    let rows = parse_import(&csv_data)?;
    let mut summary = ImportSummary::default();

    for row in rows {
        if !row.is_valid() {
            warn!("Skipping invalid import row");
            summary.skipped += 1;
            continue;
        }

        // Duplicates are skipped, not overwritten. The unique index on
        // `email` backstops this check against concurrent imports.
        let existing = students
            .find_one(doc! { "email": &row.email }, None)
            .await?;
        if existing.is_some() {
            warn!("Skipping duplicate student {}", row.email);
            summary.duplicates += 1;
            continue;
        }

        let salt: [u8; 16] = rand::random();
        let password_hash =
            argon2::hash_encoded(row.password.as_bytes(), &salt, &argon2::Config::default())
                .unwrap(); // Infallible with the default config.

        let mut student = StudentCore::new(row.name, row.roll_no, row.email, password_hash);

        // A face image is optional; an embedding failure degrades the
        // account to password-only login rather than failing the row.
        if !row.image_url.trim().is_empty() {
            match face.generate_embedding(&row.image_url).await {
                Ok(embedding) if !embedding.is_empty() => {
                    student.register_face(row.image_url, embedding, Utc::now());
                }
                Ok(_) => {
                    warn!("Empty embedding for {}, face factor disabled", student.email);
                    student.image_urls.push(row.image_url);
                }
                Err(err) => {
                    warn!(
                        "Embedding failed for {}, face factor disabled: {err}",
                        student.email
                    );
                    student.image_urls.push(row.image_url);
                }
            }
        }

        new_students.insert_one(&student, None).await?;
        summary.inserted += 1;
    }

    info!(
        "Student import finished: {} inserted, {} skipped, {} duplicates",
        summary.inserted, summary.skipped, summary.duplicates
    );

    Ok(Json(summary))
}

#[post("/students/delete", data = "<csv_data>", format = "text/csv")]
async fn delete_students(
    _token: AuthToken<Admin>,
    csv_data: String,
    students: Coll<Student>,
) -> Result<Json<DeleteSummary>> {
    let rows = parse_delete(&csv_data)?;
    let mut summary = DeleteSummary::default();

    for row in rows {
        if row.email.trim().is_empty() {
            continue;
        }
        let deleted = students
            .delete_one(doc! { "email": &row.email }, None)
            .await?;
        if deleted.deleted_count == 1 {
            summary.deleted += 1;
        } else {
            summary.not_found.push(row.email);
        }
    }

    info!(
        "Student delete finished: {} deleted, {} not found",
        summary.deleted,
        summary.not_found.len()
    );

    Ok(Json(summary))
}

//! Client for the external face-embedding microservice. The service is an
//! opaque collaborator: it either returns a similarity decision or an
//! embedding vector, and everything about the model behind it is its own
//! business.

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A handle on the face service, kept in managed state.
#[derive(Debug, Clone)]
pub struct FaceClient {
    http: HttpClient,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    face_image: &'a str,
    stored_embeddings: &'a [Vec<f64>],
}

/// The service's similarity decision.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VerifyResponse {
    #[serde(rename = "match")]
    pub matched: bool,
    pub confidence: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingRequest<'a> {
    image_path: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f64>,
}

impl FaceClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: HttpClient::new(),
            base_url,
        }
    }

    /// Ask the service whether the submitted image matches any of the
    /// stored embeddings.
    pub async fn verify(
        &self,
        face_image: &str,
        stored_embeddings: &[Vec<f64>],
    ) -> Result<VerifyResponse> {
        let url = format!("{}/verify-face", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&VerifyRequest {
                face_image,
                stored_embeddings,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<VerifyResponse>()
            .await?;
        Ok(response)
    }

    /// Ask the service for an embedding of the image at the given path.
    pub async fn generate_embedding(&self, image_path: &str) -> Result<Vec<f64>> {
        let url = format!("{}/generate-embedding", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&EmbeddingRequest { image_path })
            .send()
            .await?
            .error_for_status()?
            .json::<EmbeddingResponse>()
            .await?;
        Ok(response.embedding)
    }
}

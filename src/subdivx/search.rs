//! Subtitle search against the results table endpoint

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{de_string, de_u64, parse_datetime, Candidate, SubdivxClient};
use crate::error::{Result, SubdxError};

/// One page of the results table
#[derive(Debug, Deserialize)]
struct ResultsPage {
    #[serde(rename = "sEcho", default, deserialize_with = "de_string")]
    echo: String,
    #[serde(rename = "iTotalRecords", default, deserialize_with = "de_u64")]
    total_records: u64,
    #[serde(rename = "aaData", default)]
    data: Value,
    #[serde(default, deserialize_with = "de_string")]
    mensaje: String,
}

/// Row as sent by the site
#[derive(Debug, Deserialize)]
struct RawCandidate {
    #[serde(deserialize_with = "de_u64")]
    id: u64,
    #[serde(default, deserialize_with = "de_string")]
    titulo: String,
    #[serde(default, deserialize_with = "de_string")]
    descripcion: String,
    #[serde(default, deserialize_with = "de_u64")]
    descargas: u64,
    #[serde(default, deserialize_with = "de_u64")]
    comentarios: u64,
    #[serde(default, deserialize_with = "de_string")]
    fecha_subida: String,
    #[serde(default, deserialize_with = "de_string")]
    nick: String,
}

impl From<RawCandidate> for Candidate {
    fn from(raw: RawCandidate) -> Self {
        Candidate {
            id: raw.id,
            title: raw.titulo,
            description: raw.descripcion,
            downloads: raw.descargas,
            comment_count: raw.comentarios,
            uploaded_at: parse_datetime(&raw.fecha_subida),
            uploader: raw.nick,
            score: 0.0,
            tier: None,
        }
    }
}

impl SubdivxClient {
    /// Search subtitles for `query`.
    ///
    /// Fails with `NoResults` when the site reports zero records, which is
    /// distinct from the filter later finding nothing suitable.
    pub async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        debug!("Searching subtitles for: {}", query);

        let mut body = self.post_search(query).await?;
        let mut attempt = 0;
        while body.trim().is_empty() && attempt < self.retry.attempts {
            attempt += 1;
            debug!("Empty results page, request attempt #{}", attempt);
            tokio::time::sleep(self.retry.backoff(self.retry.attempts)).await;
            body = self.post_search(query).await?;
        }
        if body.trim().is_empty() {
            debug!("Could not load results page");
            return Err(SubdxError::EmptyResponse);
        }

        let mut page: ResultsPage = serde_json::from_str(&body)?;
        if page.echo == "0" {
            tokio::time::sleep(self.retry.backoff(self.retry.attempts)).await;
            let body = self.post_search(query).await?;
            if body.trim().is_empty() {
                return Err(SubdxError::EmptyResponse);
            }
            page = serde_json::from_str(&body)?;
            if page.echo == "0" {
                return Err(SubdxError::SiteMessage(page.mensaje));
            }
        }

        if page.total_records == 0 {
            return Err(SubdxError::NoResults(query.to_string()));
        }

        parse_candidates(page.data, query)
    }

    async fn post_search(&self, query: &str) -> Result<String> {
        let fields = [
            (format!("buscar{}", self.search_field), query.to_string()),
            ("filtros".to_string(), String::new()),
            ("tabla".to_string(), "resultados".to_string()),
            ("token".to_string(), self.token.clone()),
        ];

        let body = self
            .client
            .post(self.ajax_url())
            .form(&fields)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(body)
    }
}

/// Rows must be a list of objects; rows missing an id are skipped
fn parse_candidates(data: Value, query: &str) -> Result<Vec<Candidate>> {
    let rows = match data {
        Value::Array(rows) if rows.iter().all(Value::is_object) => rows,
        _ => return Err(SubdxError::NoSuitable(query.to_string())),
    };

    let candidates: Vec<Candidate> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<RawCandidate>(row) {
            Ok(raw) => Some(raw.into()),
            Err(e) => {
                warn!("Skipping malformed result row: {}", e);
                None
            }
        })
        .collect();

    debug!("Parsed {} candidates", candidates.len());
    Ok(candidates)
}

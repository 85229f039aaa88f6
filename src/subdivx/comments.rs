//! Comments posted on a subtitle

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{de_string, parse_datetime, Comment, SubdivxClient};
use crate::error::Result;
use crate::markup::to_plain_text;

#[derive(Debug, Deserialize)]
struct CommentsPage {
    #[serde(rename = "aaData", default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    #[serde(default, deserialize_with = "de_string")]
    comentario: String,
    #[serde(default, deserialize_with = "de_string")]
    nick: String,
    #[serde(default, deserialize_with = "de_string")]
    fecha_creacion: String,
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Comment {
            text: to_plain_text(&raw.comentario),
            author: to_plain_text(&raw.nick),
            created_at: parse_datetime(&raw.fecha_creacion),
        }
    }
}

impl SubdivxClient {
    /// Comments for subtitle `id`.
    ///
    /// `None` on any transport or decoding failure; the caller shows an
    /// empty state instead of an error.
    pub async fn comments(&self, id: u64) -> Option<Vec<Comment>> {
        match self.fetch_comments(id).await {
            Ok(comments) => {
                debug!("Loaded {} comments for ID:{}", comments.len(), id);
                Some(comments)
            }
            Err(e) => {
                warn!("Could not load comments ID:{}: {}", id, e);
                None
            }
        }
    }

    async fn fetch_comments(&self, id: u64) -> Result<Vec<Comment>> {
        let body = self
            .client
            .post(self.ajax_url())
            .form(&[("getComentarios", id.to_string())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let page: CommentsPage = serde_json::from_str(&body)?;
        Ok(parse_comments(page.data))
    }
}

fn parse_comments(data: Value) -> Vec<Comment> {
    let Value::Array(rows) = data else {
        return Vec::new();
    };

    rows.into_iter()
        .filter_map(|row| serde_json::from_value::<RawComment>(row).ok())
        .map(Comment::from)
        .collect()
}

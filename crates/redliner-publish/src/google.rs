//! Google Docs and Drive REST client.
//!
//! Documents are created empty, filled with a single `batchUpdate`, and then
//! shared with an anyone-with-the-link reader permission. Text positions in
//! the Docs API are UTF-16 code unit offsets starting at 1.
//!
//! Every call is bounded by the timeout of the client passed to
//! [`GoogleDocsPublisher::new`].

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::auth::GoogleAuth;
use crate::{DocumentPublisher, ISSUES_HEADING, ISSUES_TITLE, PublishError, REVISION_TITLE};

const DOCS_API: &str = "https://docs.googleapis.com";
const DRIVE_API: &str = "https://www.googleapis.com";
const HEADING_FONT_SIZE: f64 = 14.0;
const BULLET_PRESET: &str = "BULLET_DISC_CIRCLE_SQUARE";

pub struct GoogleDocsPublisher {
    client: reqwest::Client,
    auth: GoogleAuth,
    docs_base_url: String,
    drive_base_url: String,
}

impl std::fmt::Debug for GoogleDocsPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDocsPublisher")
            .field("auth", &self.auth)
            .field("docs_base_url", &self.docs_base_url)
            .field("drive_base_url", &self.drive_base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct CreateDocument<'a> {
    title: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    #[serde(default)]
    document_id: Option<String>,
}

#[derive(Serialize)]
struct Permission {
    #[serde(rename = "type")]
    kind: &'static str,
    role: &'static str,
}

impl GoogleDocsPublisher {
    /// `client` carries the transport timeout for every Docs, Drive and
    /// token call.
    #[must_use]
    pub fn new(auth: GoogleAuth, client: reqwest::Client) -> Self {
        Self {
            client,
            auth,
            docs_base_url: DOCS_API.to_owned(),
            drive_base_url: DRIVE_API.to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_urls(mut self, docs: impl Into<String>, drive: impl Into<String>) -> Self {
        self.docs_base_url = docs.into();
        self.drive_base_url = drive.into();
        self
    }

    #[must_use]
    pub fn document_url(document_id: &str) -> String {
        format!("https://docs.google.com/document/d/{document_id}/edit")
    }

    async fn create_document(&self, token: &str, title: &str) -> Result<String, PublishError> {
        let resp = self
            .client
            .post(format!("{}/v1/documents", self.docs_base_url))
            .bearer_auth(token)
            .json(&CreateDocument { title })
            .send()
            .await?;
        let created: CreatedDocument = check("documents.create", resp).await?.json().await?;

        let id = created
            .document_id
            .filter(|id| !id.is_empty())
            .ok_or(PublishError::MissingDocumentId)?;
        tracing::debug!(document_id = %id, title, "created Google document");
        Ok(id)
    }

    async fn batch_update(
        &self,
        token: &str,
        document_id: &str,
        requests: Vec<Value>,
    ) -> Result<(), PublishError> {
        let resp = self
            .client
            .post(format!(
                "{}/v1/documents/{document_id}:batchUpdate",
                self.docs_base_url
            ))
            .bearer_auth(token)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        check("documents.batchUpdate", resp).await?;
        Ok(())
    }

    async fn share_with_link(&self, token: &str, document_id: &str) -> Result<(), PublishError> {
        let resp = self
            .client
            .post(format!(
                "{}/drive/v3/files/{document_id}/permissions",
                self.drive_base_url
            ))
            .bearer_auth(token)
            .json(&Permission {
                kind: "anyone",
                role: "reader",
            })
            .send()
            .await?;
        check("permissions.create", resp).await?;
        Ok(())
    }

    async fn publish(&self, title: &str, requests: Vec<Value>) -> Result<String, PublishError> {
        let token = self.auth.access_token(&self.client).await?;
        let id = self.create_document(&token, title).await?;
        self.batch_update(&token, &id, requests).await?;
        self.share_with_link(&token, &id).await?;
        let url = Self::document_url(&id);
        tracing::info!(url = %url, title, "published Google document");
        Ok(url)
    }
}

impl DocumentPublisher for GoogleDocsPublisher {
    async fn publish_issues(&self, issues: &[String]) -> Result<String, PublishError> {
        self.publish(ISSUES_TITLE, issues_requests(issues)).await
    }

    async fn publish_revision(&self, _original: &str, revised: &str) -> Result<String, PublishError> {
        self.publish(REVISION_TITLE, revision_requests(revised)).await
    }

    fn name(&self) -> &'static str {
        "google-docs"
    }
}

pub(crate) async fn check(
    operation: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, PublishError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::error!(operation, status = status.as_u16(), "Google API call failed");
    Err(PublishError::Api {
        operation,
        status: status.as_u16(),
        body,
    })
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Build the `batchUpdate` requests for the issues document: a bold 14pt
/// heading followed by one bulleted paragraph per issue.
pub(crate) fn issues_requests(issues: &[String]) -> Vec<Value> {
    let heading = format!("{ISSUES_HEADING}\n\n");
    let mut requests = vec![
        json!({ "insertText": { "location": { "index": 1 }, "text": heading } }),
        json!({
            "updateTextStyle": {
                "range": { "startIndex": 1, "endIndex": 1 + utf16_len(ISSUES_HEADING) },
                "textStyle": {
                    "bold": true,
                    "fontSize": { "magnitude": HEADING_FONT_SIZE, "unit": "PT" }
                },
                "fields": "bold,fontSize"
            }
        }),
    ];

    let mut index = 1 + utf16_len(&heading);
    for (i, issue) in issues.iter().enumerate() {
        let line = format!("{issue}\n");
        let end = index + utf16_len(&line);
        requests.push(json!({ "insertText": { "location": { "index": index }, "text": line } }));
        requests.push(json!({
            "createParagraphBullets": {
                "range": { "startIndex": index, "endIndex": end },
                "bulletPreset": BULLET_PRESET
            }
        }));
        tracing::debug!(issue = i + 1, total = issues.len(), "added issue to issues document");
        index = end;
    }
    requests.push(json!({ "insertText": { "location": { "index": index }, "text": "\n" } }));
    requests
}

pub(crate) fn revision_requests(revised: &str) -> Vec<Value> {
    vec![json!({ "insertText": { "location": { "index": 1 }, "text": format!("{revised}\n") } })]
}

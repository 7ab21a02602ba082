use super::{ContentStore, SitemapDocument, SlugQuery, StoreError, TranslationEntry};
use crate::config::Config;
use crate::retry::{with_retry_if, RetryConfig};
use crate::routes::DocumentType;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

const TRANSLATION_ENTRIES_QUERY: &str = r#"*[_type == "translation.metadata" && references($documentId)][0].translations[]{
  "language": _key,
  "id": value._ref,
  "slug": value->slug.current,
  "type": value->_type
}"#;

const PAGE_ID_QUERY: &str = r#"*[_type == $type && language == $language][0]._id"#;

const DETAIL_ID_QUERY: &str =
    r#"*[_type == $type && language == $language && slug.current == $slug][0]._id"#;

const SLUG_COUNT_PER_LANGUAGE_QUERY: &str = r#"count(*[
  _type == $type &&
  language == $language &&
  slug.current == $slug &&
  !(_id in [$baseId, $draftId])
])"#;

const SLUG_COUNT_QUERY: &str = r#"count(*[
  _type == $type &&
  slug.current == $slug &&
  !(_id in [$baseId, $draftId])
])"#;

const SITEMAP_QUERY: &str = r#"*[_type == $type && defined(slug.current) && !(_id in path("drafts.**"))]{
  "slug": slug.current,
  language,
  _updatedAt
}"#;

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Read-only client for the Sanity HTTP query API.
#[derive(Debug, Clone)]
pub struct SanityClient {
    http: reqwest::Client,
    query_url: String,
    token: Option<String>,
    retry: RetryConfig,
}

impl SanityClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            query_url: config.query_url(),
            token: config.sanity_api_token.clone(),
            retry: RetryConfig::content_store(config.content_store_max_attempts),
        }
    }

    /// Run a GROQ query. Parameters are JSON-encoded into `$name` query
    /// arguments so values are never spliced into the query text.
    async fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, Value)],
    ) -> Result<T, StoreError> {
        let mut args: Vec<(String, String)> = vec![("query".to_string(), query.to_string())];
        for (name, value) in params {
            args.push((format!("${}", name), value.to_string()));
        }

        with_retry_if(
            &self.retry,
            "Sanity query",
            || async {
                let mut request = self.http.get(&self.query_url).query(&args);
                if let Some(token) = &self.token {
                    request = request.bearer_auth(token);
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| StoreError::Transport(e.to_string()))?;

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(StoreError::Status { status, body });
                }

                let body: QueryResponse<T> = response
                    .json()
                    .await
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
                Ok(body.result)
            },
            StoreError::is_transient,
        )
        .await
    }
}

#[async_trait]
impl ContentStore for SanityClient {
    async fn translation_entries(
        &self,
        document_id: &str,
    ) -> Result<Option<Vec<TranslationEntry>>, StoreError> {
        debug!("Looking up translation link for {}", document_id);
        self.fetch(TRANSLATION_ENTRIES_QUERY, &[("documentId", json!(document_id))])
            .await
    }

    async fn document_id(
        &self,
        doc_type: DocumentType,
        language: &str,
        slug: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        match slug {
            Some(slug) => {
                self.fetch(
                    DETAIL_ID_QUERY,
                    &[
                        ("type", json!(doc_type.as_str())),
                        ("language", json!(language)),
                        ("slug", json!(slug)),
                    ],
                )
                .await
            }
            None => {
                self.fetch(
                    PAGE_ID_QUERY,
                    &[("type", json!(doc_type.as_str())), ("language", json!(language))],
                )
                .await
            }
        }
    }

    async fn count_slug_matches(&self, query: &SlugQuery) -> Result<u64, StoreError> {
        let [base_id, draft_id] = &query.exclude_ids;
        let mut params = vec![
            ("type", json!(query.doc_type)),
            ("slug", json!(query.slug)),
            ("baseId", json!(base_id)),
            ("draftId", json!(draft_id)),
        ];

        let groq = match &query.language {
            Some(language) => {
                params.push(("language", json!(language)));
                SLUG_COUNT_PER_LANGUAGE_QUERY
            }
            None => SLUG_COUNT_QUERY,
        };

        self.fetch(groq, &params).await
    }

    async fn sitemap_documents(
        &self,
        doc_type: DocumentType,
    ) -> Result<Vec<SitemapDocument>, StoreError> {
        let documents: Option<Vec<SitemapDocument>> = self
            .fetch(SITEMAP_QUERY, &[("type", json!(doc_type.as_str()))])
            .await?;
        Ok(documents.unwrap_or_default())
    }
}

//! HTTP surface for the renderer, the CMS authoring tool and CMS webhooks.

use crate::cache::TaggedCache;
use crate::cms::{AlternateUrls, ContentStore, LinkResolution, Resolution, TranslationResolver};
use crate::config::Config;
use crate::i18n::{
    default_slug_table, delocalize, LocaleRegistry, PathTranslator, ResolutionMetrics,
    SlugContext, SlugValidator,
};
use crate::revalidate::authorize_and_parse;
use crate::routes::{default_route_prefixes, DocumentType, RoutePrefixTable};
use crate::security::SIGNATURE_HEADER;
use crate::seo::{build_sitemap, page_metadata, render_sitemap};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

const SITEMAP_CACHE_KEY: &str = "sitemap.xml";
const SITEMAP_TAG: &str = "sitemap";

/// Everything the handlers share, built once at startup.
pub struct AppState {
    pub config: Config,
    pub registry: Arc<LocaleRegistry>,
    pub prefixes: Arc<RoutePrefixTable>,
    pub store: Arc<dyn ContentStore>,
    pub resolver: TranslationResolver,
    pub validator: SlugValidator,
    pub metrics: Arc<ResolutionMetrics>,
    /// `None` records a document that is not linked to any translation.
    pub alternates_cache: TaggedCache<Option<AlternateUrls>>,
    pub sitemap_cache: TaggedCache<String>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ContentStore>) -> Result<Self> {
        let registry = Arc::new(LocaleRegistry::default());
        let slugs = default_slug_table().context("Invalid slug translation table")?;
        let prefixes = Arc::new(default_route_prefixes());
        let metrics = Arc::new(ResolutionMetrics::new());

        let translator = PathTranslator::new(Arc::clone(&registry), Arc::new(slugs));
        let resolver = TranslationResolver::new(
            Arc::clone(&store),
            Arc::clone(&prefixes),
            translator,
            Arc::clone(&metrics),
        );
        let validator = SlugValidator::new(Arc::clone(&store), config.slug_store_failure_policy);

        Ok(Self {
            config,
            registry,
            prefixes,
            store,
            resolver,
            validator,
            metrics,
            alternates_cache: TaggedCache::new().with_max_age(Duration::hours(1)),
            sitemap_cache: TaggedCache::new().with_max_age(Duration::hours(1)),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/alternates/:id", get(alternates))
        .route("/api/language-switch", get(language_switch))
        .route("/api/metadata", get(metadata))
        .route("/api/slug/validate", post(validate_slug))
        .route("/api/revalidate/tag", post(revalidate_tag))
        .route("/sitemap.xml", get(sitemap))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    Json(state.metrics.report()).into_response()
}

async fn alternates(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let cached = state.alternates_cache.get(&id);
    let resolved = match cached {
        Some(hit) => {
            debug!("Alternates for {} served from cache", id);
            hit
        }
        None => {
            let LinkResolution { resolution, tags } = state.resolver.resolve_link(&id).await;
            match resolution {
                Resolution::Resolved(urls) => {
                    state.alternates_cache.insert(id.clone(), tags, Some(urls.clone()));
                    Some(urls)
                }
                Resolution::NotLinked => {
                    state.alternates_cache.insert(id.clone(), tags, None);
                    None
                }
                // Not cached, the next request retries the store
                Resolution::Unavailable(_) => {
                    return Json(json!({ "alternates": {}, "degraded": true })).into_response();
                }
            }
        }
    };

    match resolved {
        Some(urls) => Json(json!({ "alternates": urls })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Document {} has no translations", id) })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct LanguageSwitchParams {
    path: String,
    to: String,
}

async fn language_switch(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LanguageSwitchParams>,
) -> Response {
    if !state.registry.is_valid(&params.to) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Unsupported locale '{}'", params.to) })),
        )
            .into_response();
    }

    let current = delocalize(&state.registry, &params.path).locale.code.clone();
    let url = state
        .resolver
        .translated_path(&params.path, &current, &params.to)
        .await;
    Json(json!({ "url": url })).into_response()
}

#[derive(Debug, Deserialize)]
struct MetadataParams {
    path: String,
    image: Option<String>,
}

async fn metadata(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetadataParams>,
) -> Response {
    let metadata = page_metadata(
        &state.resolver,
        &state.registry,
        &state.config.site_url,
        &params.path,
        params.image.as_deref(),
    )
    .await;
    Json(metadata).into_response()
}

#[derive(Debug, Deserialize)]
struct SlugValidationRequest {
    #[serde(default)]
    slug: String,
    document: SlugContext,
}

async fn validate_slug(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SlugValidationRequest>,
) -> Response {
    match state.validator.is_unique(&request.slug, &request.document).await {
        Ok(unique) => Json(json!({ "unique": unique })).into_response(),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

async fn sitemap(State(state): State<Arc<AppState>>) -> Response {
    let xml = match state.sitemap_cache.get(SITEMAP_CACHE_KEY) {
        Some(xml) => xml,
        None => {
            let entries = build_sitemap(
                state.store.as_ref(),
                &state.registry,
                &state.prefixes,
                &state.config.site_url,
                Utc::now(),
            )
            .await;
            let xml = render_sitemap(&entries);

            // Webhooks may name a type by its document name or its revalidate tag
            let tags = [SITEMAP_TAG].into_iter().chain(
                DocumentType::ALL
                    .iter()
                    .flat_map(|doc_type| [doc_type.as_str(), doc_type.revalidate_tag()]),
            );
            state
                .sitemap_cache
                .insert(SITEMAP_CACHE_KEY, tags, xml.clone());
            xml
        }
    };

    ([(header::CONTENT_TYPE, "application/xml")], xml).into_response()
}

async fn revalidate_tag(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match authorize_and_parse(state.config.revalidate_secret.as_deref(), signature, &body) {
        Ok(tags) => {
            let dropped = state.alternates_cache.invalidate_tags(&tags)
                + state.sitemap_cache.invalidate_tags(&tags);
            info!("Revalidated {:?}, dropped {} cached entries", tags, dropped);
            Json(json!({ "revalidated": tags })).into_response()
        }
        Err(err) => {
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, err.to_string()).into_response()
        }
    }
}

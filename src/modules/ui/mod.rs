//! Browser front-end for the catalog, served from `/app`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use libris_kernel::{settings::UiSettings, InitCtx, Module};

const INDEX_HTML: &str = include_str!("assets/index.html");
const APP_JS: &str = include_str!("assets/app.js");
const API_BASE_PLACEHOLDER: &str = "\"__LIBRIS_API_BASE__\"";

pub struct UiModule {
    page: Arc<str>,
}

impl UiModule {
    pub fn new(settings: &UiSettings) -> anyhow::Result<Self> {
        Ok(Self {
            page: render_index(&settings.api_base_url)?.into(),
        })
    }
}

#[async_trait]
impl Module for UiModule {
    fn name(&self) -> &'static str {
        "ui"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let base = ctx.settings.ui.api_base_url.as_str();
        let api_base = if base.is_empty() { "<same origin>" } else { base };
        tracing::info!(module = self.name(), api_base, "ui module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        let page = self.page.clone();
        Router::new()
            .route("/app", get(move || async move { Html(page.to_string()) }))
            .route("/app/app.js", get(app_js))
    }
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}

/// Inline the API base URL as a JS string literal.
fn render_index(api_base_url: &str) -> anyhow::Result<String> {
    // `</` would let a crafted URL close the script element.
    let literal = serde_json::to_string(api_base_url)?.replace("</", "<\\/");
    Ok(INDEX_HTML.replace(API_BASE_PLACEHOLDER, &literal))
}

/// Create a new instance of the UI module
pub fn create_module(settings: &UiSettings) -> anyhow::Result<Arc<dyn Module>> {
    Ok(Arc::new(UiModule::new(settings)?))
}

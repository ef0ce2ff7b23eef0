use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    CmsError,
    client::ContentSource,
    config::ImageConfig,
    image_url::{AutoMode, FitMode, ImageUrls},
    models::{
        BlogPost, BlogPostSummary, DestinationDetail, DestinationSummary, Image, PostFilter,
        SiteSettings, Testimonial, TourDetail, TourSummary,
    },
    queries,
};

/// Shared handler state. The content source is injected once at startup.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ContentSource>,
    pub images: ImageUrls,
    pub image_config: ImageConfig,
}

impl AppState {
    pub fn new(source: Arc<dyn ContentSource>, images: ImageUrls, image_config: ImageConfig) -> Self {
        Self {
            source,
            images,
            image_config,
        }
    }

    /// Default transform for images embedded in payloads; `None` without an asset
    fn image_url(&self, image: Option<&Image>) -> Option<String> {
        let mut builder = self
            .images
            .for_image(image?)?
            .max_width(self.image_config.max_width)
            .fit(FitMode::Max);
        if self.image_config.auto_format {
            builder = builder.auto(AutoMode::Format);
        }
        Some(builder.url())
    }

    fn present<T: Illustrated>(&self, item: T) -> Presented<T> {
        let image_url = self.image_url(item.image());
        Presented { item, image_url }
    }

    fn present_all<T: Illustrated>(&self, items: Vec<T>) -> Vec<Presented<T>> {
        items.into_iter().map(|item| self.present(item)).collect()
    }
}

/// Documents with a primary image
trait Illustrated {
    fn image(&self) -> Option<&Image>;
}

impl Illustrated for TourSummary {
    fn image(&self) -> Option<&Image> {
        self.cover()
    }
}

impl Illustrated for TourDetail {
    fn image(&self) -> Option<&Image> {
        self.images.first()
    }
}

impl Illustrated for DestinationSummary {
    fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }
}

impl Illustrated for DestinationDetail {
    fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }
}

impl Illustrated for BlogPostSummary {
    fn image(&self) -> Option<&Image> {
        self.main_image.as_ref()
    }
}

impl Illustrated for BlogPost {
    fn image(&self) -> Option<&Image> {
        self.main_image.as_ref()
    }
}

impl Illustrated for Testimonial {
    fn image(&self) -> Option<&Image> {
        self.customer_image.as_ref()
    }
}

impl Illustrated for SiteSettings {
    fn image(&self) -> Option<&Image> {
        self.logo.as_ref()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presented<T> {
    #[serde(flatten)]
    pub item: T,
    pub image_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPage {
    #[serde(flatten)]
    pub tour: Presented<TourDetail>,
    pub gallery_urls: Vec<String>,
    pub meta: PageMeta,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    #[serde(flatten)]
    pub post: Presented<BlogPost>,
    pub reading_time_minutes: usize,
    pub meta: PageMeta,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPage {
    #[serde(flatten)]
    pub settings: Presented<SiteSettings>,
    pub whatsapp_link: Option<String>,
    pub meta: PageMeta,
}

/// Resolved page metadata, document fields first then their fallbacks
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    pub featured_tours: Vec<Presented<TourSummary>>,
    pub latest_posts: Vec<Presented<BlogPostSummary>>,
    pub testimonials: Vec<Presented<Testimonial>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TourListParams {
    pub destination: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    pub q: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestimonialListParams {
    pub featured: Option<bool>,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    Upstream(CmsError),
}

impl From<CmsError> for ApiError {
    fn from(err: CmsError) -> Self {
        ApiError::Upstream(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{what} not found") })),
            )
                .into_response(),
            ApiError::Upstream(err) => {
                tracing::error!(error = %err, transient = err.is_transient(), "Content fetch failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": err.user_message() })),
                )
                    .into_response()
            }
        }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/home", get(get_home))
        .route("/tours", get(get_tours))
        .route("/tours/{slug}", get(get_tour))
        .route("/destinations", get(get_destinations))
        .route("/destinations/{slug}", get(get_destination))
        .route("/posts", get(get_posts))
        .route("/posts/{slug}", get(get_post))
        .route("/testimonials", get(get_testimonials))
        .route("/settings", get(get_settings))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

async fn get_home(State(state): State<AppState>) -> ApiResult<HomeResponse> {
    let home = queries::home_page(state.source.as_ref()).await?;
    Ok(Json(HomeResponse {
        featured_tours: state.present_all(home.featured_tours),
        latest_posts: state.present_all(home.latest_posts),
        testimonials: state.present_all(home.testimonials),
    }))
}

async fn get_tours(
    State(state): State<AppState>,
    Query(params): Query<TourListParams>,
) -> ApiResult<Vec<Presented<TourSummary>>> {
    let source = state.source.as_ref();
    let featured = params.featured.unwrap_or(false);

    let tours = match params.destination.as_deref() {
        Some(destination) => {
            let mut tours = queries::tours_by_destination(source, destination).await?;
            if featured {
                tours.retain(|tour| tour.featured);
            }
            tours
        }
        None if featured => queries::featured_tours(source).await?,
        None => queries::tours(source).await?,
    };
    Ok(Json(state.present_all(tours)))
}

async fn get_tour(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<TourPage> {
    let tour = queries::tour_by_slug(state.source.as_ref(), &slug)
        .await?
        .ok_or(ApiError::NotFound("Tour"))?;

    let gallery_urls = tour
        .images
        .iter()
        .filter_map(|image| state.image_url(Some(image)))
        .collect();
    let meta = PageMeta {
        title: tour.seo_title().to_string(),
        description: tour.seo_description().map(str::to_string),
    };
    Ok(Json(TourPage {
        tour: state.present(tour),
        gallery_urls,
        meta,
    }))
}

async fn get_destinations(
    State(state): State<AppState>,
) -> ApiResult<Vec<Presented<DestinationSummary>>> {
    let destinations = queries::destinations(state.source.as_ref()).await?;
    Ok(Json(state.present_all(destinations)))
}

async fn get_destination(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Presented<DestinationDetail>> {
    let destination = queries::destination_by_slug(state.source.as_ref(), &slug)
        .await?
        .ok_or(ApiError::NotFound("Destination"))?;
    Ok(Json(state.present(destination)))
}

async fn get_posts(
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> ApiResult<Vec<Presented<BlogPostSummary>>> {
    let posts = queries::posts(state.source.as_ref()).await?;
    let posts = PostFilter::new(params.q, params.category).apply(posts);
    Ok(Json(state.present_all(posts)))
}

async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<PostPage> {
    let post = queries::post_by_slug(state.source.as_ref(), &slug)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    let reading_time_minutes = post.reading_time_minutes();
    let meta = PageMeta {
        title: post.seo_title().to_string(),
        description: post.seo_description().map(str::to_string),
    };
    Ok(Json(PostPage {
        post: state.present(post),
        reading_time_minutes,
        meta,
    }))
}

async fn get_testimonials(
    State(state): State<AppState>,
    Query(params): Query<TestimonialListParams>,
) -> ApiResult<Vec<Presented<Testimonial>>> {
    let source = state.source.as_ref();
    let testimonials = if params.featured.unwrap_or(false) {
        queries::featured_testimonials(source).await?
    } else {
        queries::testimonials(source).await?
    };
    Ok(Json(state.present_all(testimonials)))
}

async fn get_settings(State(state): State<AppState>) -> ApiResult<SettingsPage> {
    let settings = queries::site_settings(state.source.as_ref())
        .await?
        .ok_or(ApiError::NotFound("Site settings"))?;
    let whatsapp_link = settings.whatsapp_link(None);
    let meta = PageMeta {
        title: settings.meta_title().to_string(),
        description: settings
            .seo
            .as_ref()
            .and_then(|seo| seo.meta_description.clone())
            .or_else(|| settings.description.clone()),
    };
    Ok(Json(SettingsPage {
        settings: state.present(settings),
        whatsapp_link,
        meta,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::QueryParams;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    type Responder = fn(&str, &QueryParams) -> crate::Result<Value>;

    struct Stub(Responder);

    #[async_trait]
    impl ContentSource for Stub {
        async fn query(&self, groq: &str, params: &QueryParams) -> crate::Result<Value> {
            (self.0)(groq, params)
        }
    }

    fn app(responder: Responder) -> Router {
        let state = AppState::new(
            Arc::new(Stub(responder)),
            ImageUrls::new("https://cdn.sanity.io", "abc123", "production"),
            ImageConfig {
                max_width: 800,
                auto_format: true,
            },
        );
        router(state)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn tour(id: &str, featured: bool, with_image: bool) -> Value {
        let images = if with_image {
            json!([{"asset": {"_ref": "image-abc-1200x800-jpg"}, "alt": "Rock"}])
        } else {
            json!([{"alt": "missing asset"}])
        };
        json!({
            "_id": id,
            "title": format!("Tour {id}"),
            "slug": {"current": format!("tour-{id}")},
            "price": 120,
            "images": images,
            "featured": featured
        })
    }

    fn posts() -> Value {
        json!([
            {"_id": "p3", "title": "Tea Country by Train", "slug": "tea-country",
             "excerpt": "Hill country rails", "publishedAt": "2024-03-15T00:00:00Z", "category": "Travel Tips"},
            {"_id": "p2", "title": "Sigiriya at Dawn", "slug": "sigiriya-dawn",
             "excerpt": "Climbing early", "publishedAt": "2024-03-10T00:00:00Z", "category": "Destinations"},
            {"_id": "p1", "title": "Packing for the Tropics", "slug": "packing",
             "excerpt": "Light layers", "publishedAt": "2024-03-08T00:00:00Z", "category": "Travel Tips"}
        ])
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(|_, _| Ok(Value::Null)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_tours_prebuild_image_urls() {
        let app = app(|_, _| Ok(json!([tour("a", true, true), tour("b", false, false)])));
        let (status, body) = get(app, "/tours").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body[0]["imageUrl"],
            "https://cdn.sanity.io/images/abc123/production/abc-1200x800.jpg?max-w=800&fit=max&auto=format"
        );
        assert_eq!(body[0]["slug"], "tour-a");
        assert!(body[1]["imageUrl"].is_null());
    }

    #[tokio::test]
    async fn test_tours_by_destination_passes_slug() {
        let app = app(|groq, params| {
            assert!(groq.contains("$destinationSlug"));
            assert_eq!(params.get("destinationSlug"), Some(&json!("kandy")));
            Ok(json!([tour("a", true, false), tour("b", false, false)]))
        });
        let (status, body) = get(app, "/tours?destination=kandy&featured=true").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["_id"], "a");
    }

    #[tokio::test]
    async fn test_empty_collection_is_empty_array() {
        let (status, body) = get(app(|_, _| Ok(Value::Null)), "/destinations").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_missing_slug_is_not_found() {
        let app = app(|_, params| {
            assert_eq!(params.get("slug"), Some(&json!("does-not-exist")));
            Ok(Value::Null)
        });
        let (status, body) = get(app, "/tours/does-not-exist").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Tour not found");
    }

    #[tokio::test]
    async fn test_tour_page_gallery() {
        let (status, body) = get(app(|_, _| Ok(tour("a", false, true))), "/tours/tour-a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["galleryUrls"].as_array().unwrap().len(), 1);
        assert_eq!(body["title"], "Tour a");
        assert_eq!(body["meta"]["title"], "Tour a");
        assert!(body["meta"]["description"].is_null());
    }

    #[tokio::test]
    async fn test_posts_filter_keeps_order() {
        let (status, body) = get(app(|_, _| Ok(posts())), "/posts?category=Travel%20Tips").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|post| post["_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["p3", "p1"]);

        let (_, body) = get(app(|_, _| Ok(posts())), "/posts?q=SIGIRIYA").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_post_page_seo_and_reading_time() {
        let app = app(|groq, params| {
            assert!(groq.contains("body"));
            assert_eq!(params.get("slug"), Some(&json!("tea-country")));
            Ok(json!({
                "_id": "p3",
                "title": "Tea Country by Train",
                "slug": "tea-country",
                "excerpt": "Hill country rails",
                "publishedAt": "2024-03-15T00:00:00Z",
                "seoTitle": "Kandy to Ella by Train",
                "body": [{"_type": "block", "_key": "b1",
                          "children": [{"_type": "span", "text": "All aboard."}]}]
            }))
        });
        let (status, body) = get(app, "/posts/tea-country").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["readingTimeMinutes"], 1);
        assert_eq!(body["meta"]["title"], "Kandy to Ella by Train");
        assert_eq!(body["meta"]["description"], "Hill country rails");
        assert_eq!(body["body"][0]["_key"], "b1");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let app = app(|_, _| Err(CmsError::Unauthorized { status: 401 }));
        let (status, body) = get(app, "/posts").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("credentials"));
    }

    #[tokio::test]
    async fn test_settings_whatsapp_link() {
        let app = app(|_, _| {
            Ok(json!({
                "title": "Island Tours",
                "description": "Small-group tours",
                "whatsappNumber": "+94 77 123 4567"
            }))
        });
        let (status, body) = get(app, "/settings").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["whatsappLink"], "https://wa.me/94771234567");
        assert_eq!(body["meta"]["title"], "Island Tours");
        assert_eq!(body["meta"]["description"], "Small-group tours");
        assert!(body["imageUrl"].is_null());
    }

    #[tokio::test]
    async fn test_home_aggregates_sections() {
        let app = app(|groq, _| {
            if groq.contains("\"blogPost\"") {
                Ok(posts())
            } else if groq.contains("\"tour\"") {
                Ok(json!([tour("a", true, true)]))
            } else {
                Ok(json!([]))
            }
        });
        let (status, body) = get(app, "/home").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["featuredTours"].as_array().unwrap().len(), 1);
        assert_eq!(body["latestPosts"][0]["_id"], "p3");
        assert_eq!(body["testimonials"], json!([]));
    }
}

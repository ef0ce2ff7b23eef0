//! Named queries and their typed fetch functions
//!
//! Every query here is read-only and stateless. Single-document queries end
//! in `[0]` and come back as `Option`; collection queries always spell out
//! their ordering and come back as `Vec`. References are only resolved
//! where the query says `->`.

use futures::try_join;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::Result;
use crate::client::{ContentSource, QueryParams, fetch_all, fetch_one};
use crate::models::{
    BlogPost, BlogPostSummary, DestinationDetail, DestinationSummary, SiteSettings, Testimonial,
    TourDetail, TourSummary, featured_posts,
};

/// Whether a query yields at most one document or an ordered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Single,
    Collection,
}

/// A named GROQ expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroqQuery {
    pub name: &'static str,
    pub groq: &'static str,
    pub kind: QueryKind,
}

pub const TOURS: GroqQuery = GroqQuery {
    name: "tours",
    groq: r#"*[_type == "tour"] | order(featured desc, _createdAt desc) {
  _id,
  title,
  "slug": slug.current,
  price,
  duration,
  location,
  category,
  "destination": destination->{name, "slug": slug.current},
  images[]{asset->{_id, url, "lqip": metadata.lqip}, alt, hotspot, crop},
  featured
}"#,
    kind: QueryKind::Collection,
};

pub const FEATURED_TOURS: GroqQuery = GroqQuery {
    name: "featured_tours",
    groq: r#"*[_type == "tour" && featured == true] | order(_createdAt desc) [0...4] {
  _id,
  title,
  "slug": slug.current,
  price,
  duration,
  location,
  category,
  "destination": destination->{name, "slug": slug.current},
  images[]{asset->{_id, url, "lqip": metadata.lqip}, alt, hotspot, crop},
  featured
}"#,
    kind: QueryKind::Collection,
};

pub const TOUR_BY_SLUG: GroqQuery = GroqQuery {
    name: "tour_by_slug",
    groq: r#"*[_type == "tour" && slug.current == $slug][0] {
  _id,
  title,
  "slug": slug.current,
  description,
  price,
  duration,
  location,
  category,
  difficulty,
  "tourType": duration_type,
  "destination": destination->{name, "slug": slug.current},
  images[]{asset->{_id, url, "lqip": metadata.lqip}, alt, hotspot, crop},
  included,
  notIncluded,
  featured,
  seoTitle,
  seoDescription
}"#,
    kind: QueryKind::Single,
};

pub const TOURS_BY_DESTINATION: GroqQuery = GroqQuery {
    name: "tours_by_destination",
    groq: r#"*[_type == "tour" && destination->slug.current == $destinationSlug] | order(_createdAt desc) {
  _id,
  title,
  "slug": slug.current,
  price,
  duration,
  location,
  category,
  images[]{asset->{_id, url, "lqip": metadata.lqip}, alt, hotspot, crop},
  featured
}"#,
    kind: QueryKind::Collection,
};

pub const DESTINATIONS: GroqQuery = GroqQuery {
    name: "destinations",
    groq: r#"*[_type == "destination"] | order(name asc) {
  _id,
  name,
  "slug": slug.current,
  image{asset->{_id, url, "lqip": metadata.lqip}, alt, hotspot, crop}
}"#,
    kind: QueryKind::Collection,
};

pub const DESTINATION_BY_SLUG: GroqQuery = GroqQuery {
    name: "destination_by_slug",
    groq: r#"*[_type == "destination" && slug.current == $slug][0] {
  _id,
  name,
  "slug": slug.current,
  image,
  "heroImageUrl": image.asset->url,
  heroTags,
  overviewDescription,
  quickFacts,
  whyVisitPoints,
  ctaSection,
  topAttractions,
  bestTimeToVisit,
  gettingAround,
  localTips,
  "tours": *[_type == "tour" && references(^._id)] | order(_createdAt desc) {
    _id,
    title,
    "slug": slug.current,
    price,
    duration,
    "imageUrl": images[0].asset->url
  }
}"#,
    kind: QueryKind::Single,
};

pub const POSTS: GroqQuery = GroqQuery {
    name: "posts",
    groq: r#"*[_type == "blogPost"] | order(publishedAt desc) {
  _id,
  title,
  "slug": slug.current,
  excerpt,
  mainImage,
  publishedAt,
  category,
  author->{name, image}
}"#,
    kind: QueryKind::Collection,
};

pub const POST_BY_SLUG: GroqQuery = GroqQuery {
    name: "post_by_slug",
    groq: r#"*[_type == "blogPost" && slug.current == $slug][0] {
  _id,
  title,
  "slug": slug.current,
  excerpt,
  mainImage,
  publishedAt,
  category,
  author->{name, image},
  body,
  seoTitle,
  seoDescription
}"#,
    kind: QueryKind::Single,
};

pub const TESTIMONIALS: GroqQuery = GroqQuery {
    name: "testimonials",
    groq: r#"*[_type == "testimonial"] | order(featured desc, _createdAt desc) {
  _id,
  customerName,
  customerImage,
  location,
  review,
  "tourTaken": tourTaken->{title, "slug": slug.current},
  featured
}"#,
    kind: QueryKind::Collection,
};

pub const FEATURED_TESTIMONIALS: GroqQuery = GroqQuery {
    name: "featured_testimonials",
    groq: r#"*[_type == "testimonial" && featured == true] | order(_createdAt desc) [0...5] {
  _id,
  customerName,
  customerImage,
  location,
  review,
  "tourTaken": tourTaken->{title, "slug": slug.current},
  featured
}"#,
    kind: QueryKind::Collection,
};

pub const SITE_SETTINGS: GroqQuery = GroqQuery {
    name: "site_settings",
    groq: r#"*[_type == "siteSettings"][0] {
  title,
  description,
  logo,
  favicon,
  whatsappNumber,
  socialMedia,
  contactInfo,
  seo
}"#,
    kind: QueryKind::Single,
};

/// Every named query
pub const ALL: [GroqQuery; 11] = [
    TOURS,
    FEATURED_TOURS,
    TOUR_BY_SLUG,
    TOURS_BY_DESTINATION,
    DESTINATIONS,
    DESTINATION_BY_SLUG,
    POSTS,
    POST_BY_SLUG,
    TESTIMONIALS,
    FEATURED_TESTIMONIALS,
    SITE_SETTINGS,
];

fn slug_params(slug: &str) -> QueryParams {
    QueryParams::new().with("slug", slug)
}

#[instrument(skip(source))]
pub async fn tours<S: ContentSource + ?Sized>(source: &S) -> Result<Vec<TourSummary>> {
    let tours = fetch_all(source, TOURS.groq, &QueryParams::new()).await?;
    debug!(count = tours.len(), "Fetched tours");
    Ok(tours)
}

#[instrument(skip(source))]
pub async fn featured_tours<S: ContentSource + ?Sized>(source: &S) -> Result<Vec<TourSummary>> {
    fetch_all(source, FEATURED_TOURS.groq, &QueryParams::new()).await
}

#[instrument(skip(source))]
pub async fn tour_by_slug<S: ContentSource + ?Sized>(
    source: &S,
    slug: &str,
) -> Result<Option<TourDetail>> {
    let tour: Option<TourDetail> = fetch_one(source, TOUR_BY_SLUG.groq, &slug_params(slug)).await?;
    if tour.is_none() {
        debug!("No tour with this slug");
    }
    Ok(tour)
}

#[instrument(skip(source))]
pub async fn tours_by_destination<S: ContentSource + ?Sized>(
    source: &S,
    destination_slug: &str,
) -> Result<Vec<TourSummary>> {
    let params = QueryParams::new().with("destinationSlug", destination_slug);
    fetch_all(source, TOURS_BY_DESTINATION.groq, &params).await
}

#[instrument(skip(source))]
pub async fn destinations<S: ContentSource + ?Sized>(
    source: &S,
) -> Result<Vec<DestinationSummary>> {
    fetch_all(source, DESTINATIONS.groq, &QueryParams::new()).await
}

#[instrument(skip(source))]
pub async fn destination_by_slug<S: ContentSource + ?Sized>(
    source: &S,
    slug: &str,
) -> Result<Option<DestinationDetail>> {
    fetch_one(source, DESTINATION_BY_SLUG.groq, &slug_params(slug)).await
}

#[instrument(skip(source))]
pub async fn posts<S: ContentSource + ?Sized>(source: &S) -> Result<Vec<BlogPostSummary>> {
    fetch_all(source, POSTS.groq, &QueryParams::new()).await
}

#[instrument(skip(source))]
pub async fn post_by_slug<S: ContentSource + ?Sized>(
    source: &S,
    slug: &str,
) -> Result<Option<BlogPost>> {
    fetch_one(source, POST_BY_SLUG.groq, &slug_params(slug)).await
}

#[instrument(skip(source))]
pub async fn testimonials<S: ContentSource + ?Sized>(source: &S) -> Result<Vec<Testimonial>> {
    fetch_all(source, TESTIMONIALS.groq, &QueryParams::new()).await
}

#[instrument(skip(source))]
pub async fn featured_testimonials<S: ContentSource + ?Sized>(
    source: &S,
) -> Result<Vec<Testimonial>> {
    fetch_all(source, FEATURED_TESTIMONIALS.groq, &QueryParams::new()).await
}

#[instrument(skip(source))]
pub async fn site_settings<S: ContentSource + ?Sized>(source: &S) -> Result<Option<SiteSettings>> {
    fetch_one(source, SITE_SETTINGS.groq, &QueryParams::new()).await
}

/// Everything the landing page needs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub featured_tours: Vec<TourSummary>,
    pub latest_posts: Vec<BlogPostSummary>,
    pub testimonials: Vec<Testimonial>,
}

/// Fetch the landing page sections concurrently. Any failure fails the page.
#[instrument(skip(source))]
pub async fn home_page<S: ContentSource + ?Sized>(source: &S) -> Result<HomePage> {
    let (featured_tours, recent_posts, testimonials) = try_join!(
        featured_tours(source),
        posts(source),
        featured_testimonials(source)
    )?;

    Ok(HomePage {
        featured_tours,
        latest_posts: featured_posts(&recent_posts).to_vec(),
        testimonials,
    })
}

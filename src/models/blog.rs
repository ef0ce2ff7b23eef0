//! Blog posts and their authors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Image, RichBlock, null_as_default, rich_text, slug};

const WORDS_PER_MINUTE: usize = 200;
const FEATURED_POSTS: usize = 3;

/// Category value the blog index uses for "no category filter"
pub const ALL_CATEGORIES: &str = "All Categories";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub image: Option<Image>,
}

/// Post as listed on the blog index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "slug")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,
    #[serde(default)]
    pub main_image: Option<Image>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
    /// Present only when the query expands the reference
    #[serde(default)]
    pub author: Option<Author>,
}

/// Full post for the article page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "slug")]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub main_image: Option<Image>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<RichBlock>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
}

impl BlogPost {
    #[must_use]
    pub fn plain_text(&self) -> String {
        rich_text::plain_text(&self.body)
    }

    /// Estimated reading time, never below one minute
    #[must_use]
    pub fn reading_time_minutes(&self) -> usize {
        let words = self.plain_text().split_whitespace().count();
        words.div_ceil(WORDS_PER_MINUTE).max(1)
    }

    #[must_use]
    pub fn seo_title(&self) -> &str {
        self.seo_title.as_deref().unwrap_or(&self.title)
    }

    #[must_use]
    pub fn seo_description(&self) -> Option<&str> {
        self.seo_description.as_deref().or(self.excerpt.as_deref())
    }
}

/// Search box and category pills of the blog index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl PostFilter {
    #[must_use]
    pub fn new(search: Option<String>, category: Option<String>) -> Self {
        Self { search, category }
    }

    /// Case-insensitive substring match on title or excerpt, taken as typed
    /// without trimming; exact match on category
    #[must_use]
    pub fn matches(&self, post: &BlogPostSummary) -> bool {
        let matches_search = match self.search.as_deref() {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                post.title.to_lowercase().contains(&term)
                    || post.excerpt.to_lowercase().contains(&term)
            }
        };

        let matches_category = match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) => true,
            Some(category) => post.category.as_deref() == Some(category),
        };

        matches_search && matches_category
    }

    /// Keep matching posts, preserving their order
    #[must_use]
    pub fn apply(&self, posts: Vec<BlogPostSummary>) -> Vec<BlogPostSummary> {
        posts.into_iter().filter(|post| self.matches(post)).collect()
    }
}

/// Posts shown in the blog hero carousel: the newest few
#[must_use]
pub fn featured_posts(posts: &[BlogPostSummary]) -> &[BlogPostSummary] {
    &posts[..posts.len().min(FEATURED_POSTS)]
}

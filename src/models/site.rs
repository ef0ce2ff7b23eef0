//! Site-wide settings singleton

use serde::{Deserialize, Serialize};

use super::Image;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialMedia {
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoDefaults {
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub open_graph_image: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<Image>,
    #[serde(default)]
    pub favicon: Option<Image>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub social_media: Option<SocialMedia>,
    #[serde(default)]
    pub contact_info: Option<ContactInfo>,
    #[serde(default)]
    pub seo: Option<SeoDefaults>,
}

impl SiteSettings {
    /// `wa.me` chat link for the configured number, with an optional prefilled message
    #[must_use]
    pub fn whatsapp_link(&self, message: Option<&str>) -> Option<String> {
        let digits: String = self
            .whatsapp_number
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            return None;
        }

        let mut link = format!("https://wa.me/{digits}");
        if let Some(message) = message.filter(|m| !m.is_empty()) {
            link.push_str("?text=");
            link.push_str(&urlencoding::encode(message));
        }
        Some(link)
    }

    #[must_use]
    pub fn meta_title(&self) -> &str {
        self.seo
            .as_ref()
            .and_then(|seo| seo.meta_title.as_deref())
            .unwrap_or(&self.title)
    }
}

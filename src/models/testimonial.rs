use serde::{Deserialize, Serialize};

use super::{Image, null_as_default, slug};

/// The expanded `tourTaken->{title, "slug": slug.current}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestimonialTour {
    pub title: String,
    #[serde(deserialize_with = "slug")]
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(rename = "_id")]
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_image: Option<Image>,
    #[serde(default)]
    pub location: Option<String>,
    pub review: String,
    #[serde(default)]
    pub tour_taken: Option<TestimonialTour>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_testimonial_with_tour() {
        let testimonial: Testimonial = serde_json::from_value(json!({
            "_id": "t-1",
            "customerName": "Emma",
            "location": "London, UK",
            "review": "Our guide made Sigiriya unforgettable.",
            "tourTaken": {"title": "Sigiriya Rock Fortress Climb", "slug": "sigiriya-rock-fortress-climb"},
            "featured": true
        }))
        .unwrap();

        assert_eq!(testimonial.tour_taken.unwrap().slug, "sigiriya-rock-fortress-climb");
        assert!(testimonial.featured);
        assert!(testimonial.customer_image.is_none());
    }

    #[test]
    fn test_testimonial_without_tour() {
        let testimonial: Testimonial = serde_json::from_value(json!({
            "_id": "t-2",
            "customerName": "Lukas",
            "review": "Great trip.",
            "tourTaken": null
        }))
        .unwrap();
        assert!(testimonial.tour_taken.is_none());
        assert!(!testimonial.featured);
    }
}

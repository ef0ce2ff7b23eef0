//! Block content: ordered text blocks and inline images

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Image, null_as_default};

fn span_type() -> String {
    "span".to_string()
}

/// A run of text with its decorator marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "_type", default = "span_type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub marks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// `normal`, `h2`, `blockquote`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Span>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mark_defs: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl TextBlock {
    #[must_use]
    pub fn text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum KnownBlock {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
}

/// An image placed between text blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub image: Image,
}

/// One entry of a rich-text array. Block types this crate does not know
/// are kept verbatim so they can be passed through to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichBlock {
    Known(KnownBlock),
    Other(Value),
}

impl RichBlock {
    #[must_use]
    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            RichBlock::Known(KnownBlock::Text(block)) => Some(block),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            RichBlock::Known(KnownBlock::Image(block)) => Some(&block.image),
            _ => None,
        }
    }
}

/// Text of all text blocks, one paragraph per block
#[must_use]
pub fn plain_text(blocks: &[RichBlock]) -> String {
    blocks
        .iter()
        .filter_map(RichBlock::as_text)
        .map(TextBlock::text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> Vec<RichBlock> {
        serde_json::from_value(json!([
            {
                "_type": "block",
                "_key": "a1",
                "style": "h2",
                "children": [{"_key": "s1", "_type": "span", "text": "Getting to ", "marks": []},
                             {"_type": "span", "text": "Ella", "marks": ["strong"]}],
                "markDefs": []
            },
            {
                "_type": "image",
                "_key": "a2",
                "asset": {"_type": "reference", "_ref": "image-abc123-640x480-jpg"}
            },
            {
                "_type": "youtube",
                "_key": "a3",
                "url": "https://youtu.be/xyz"
            },
            {
                "_type": "block",
                "_key": "a4",
                "style": "normal",
                "listItem": "bullet",
                "level": 1,
                "children": [{"_type": "span", "text": "Take the train from Kandy."}]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_block_kinds() {
        let blocks = body();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].as_text().unwrap().style.as_deref(), Some("h2"));
        assert!(blocks[1].as_image().unwrap().asset_id().is_some());
        assert!(matches!(blocks[2], RichBlock::Other(_)));
        assert_eq!(blocks[3].as_text().unwrap().list_item.as_deref(), Some("bullet"));
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            plain_text(&body()),
            "Getting to Ella\n\nTake the train from Kandy."
        );
        assert_eq!(plain_text(&[]), "");
    }

    #[test]
    fn test_serialized_blocks_stay_portable_text() {
        let value = serde_json::to_value(body()).unwrap();

        assert_eq!(value[0]["_type"], "block");
        assert_eq!(value[0]["_key"], "a1");
        assert_eq!(value[0]["children"][0]["_key"], "s1");
        assert_eq!(value[0]["children"][0]["_type"], "span");
        assert_eq!(value[0]["children"][1]["marks"], json!(["strong"]));
        assert!(value[0].get("level").is_none());
        assert!(value[0].get("listItem").is_none());

        assert_eq!(value[1]["_type"], "image");
        assert_eq!(value[1]["_key"], "a2");
        assert_eq!(value[1]["asset"]["_ref"], "image-abc123-640x480-jpg");
        assert_eq!(value[1]["asset"]["_type"], "reference");

        assert_eq!(value[2]["_type"], "youtube");
        assert_eq!(value[3]["listItem"], "bullet");
        assert_eq!(value[3]["level"], 1);
        assert_eq!(value[3]["children"][0]["_type"], "span");

        let again: Vec<RichBlock> = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(again).unwrap(), value);
    }

    #[test]
    fn test_unknown_block_kept_verbatim() {
        let blocks = body();
        let RichBlock::Other(value) = &blocks[2] else {
            panic!("expected an opaque block");
        };
        assert_eq!(value["url"], "https://youtu.be/xyz");
    }
}

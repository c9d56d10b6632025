use serde::{Deserialize, Deserializer, Serialize};

/// The structured description of a presentation as returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub slides: Vec<SlideSpec>,
}

impl Outline {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// One slide as declared by the model. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub content: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_query: Option<ImageQuery>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub layout: LayoutTag,
}

/// `image_query` is a single string for single-image layouts and a list for
/// the block layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageQuery {
    Single(String),
    Many(Vec<String>),
}

impl ImageQuery {
    /// All query terms in order, blank terms dropped to `None`.
    pub fn terms(&self) -> Vec<Option<String>> {
        let normalize = |q: &String| {
            let q = q.trim();
            (!q.is_empty()).then(|| q.to_string())
        };
        match self {
            ImageQuery::Single(q) => vec![normalize(q)],
            ImageQuery::Many(qs) => qs.iter().map(normalize).collect(),
        }
    }
}

/// Layout tag as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayoutTag {
    TitleSlide,
    #[default]
    BasicContent,
    TwoThirdsImageLeft,
    TwoThirdsImageRight,
    HalfImageLeft,
    HalfImageRight,
    ThreeBlock,
    FourBlock,
    /// Anything the model invented. Rendered as basic content.
    Unknown(String),
}

impl LayoutTag {
    pub const KNOWN: [LayoutTag; 8] = [
        LayoutTag::TitleSlide,
        LayoutTag::BasicContent,
        LayoutTag::TwoThirdsImageLeft,
        LayoutTag::TwoThirdsImageRight,
        LayoutTag::HalfImageLeft,
        LayoutTag::HalfImageRight,
        LayoutTag::ThreeBlock,
        LayoutTag::FourBlock,
    ];

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "1ST_SLIDE" => LayoutTag::TitleSlide,
            "BASIC_CONTENT_SLIDE" => LayoutTag::BasicContent,
            "2/3RD_IMAGE_LEFT" => LayoutTag::TwoThirdsImageLeft,
            "2/3RD_IMAGE_RIGHT" => LayoutTag::TwoThirdsImageRight,
            "HALF_IMAGE_LEFT" => LayoutTag::HalfImageLeft,
            "HALF_IMAGE_RIGHT" => LayoutTag::HalfImageRight,
            "3_BLOCK_LAYOUT" => LayoutTag::ThreeBlock,
            "4_BLOCK_LAYOUT" => LayoutTag::FourBlock,
            other => LayoutTag::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LayoutTag::TitleSlide => "1ST_SLIDE",
            LayoutTag::BasicContent => "BASIC_CONTENT_SLIDE",
            LayoutTag::TwoThirdsImageLeft => "2/3RD_IMAGE_LEFT",
            LayoutTag::TwoThirdsImageRight => "2/3RD_IMAGE_RIGHT",
            LayoutTag::HalfImageLeft => "HALF_IMAGE_LEFT",
            LayoutTag::HalfImageRight => "HALF_IMAGE_RIGHT",
            LayoutTag::ThreeBlock => "3_BLOCK_LAYOUT",
            LayoutTag::FourBlock => "4_BLOCK_LAYOUT",
            LayoutTag::Unknown(s) => s.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, LayoutTag::Unknown(_))
    }
}

impl From<String> for LayoutTag {
    fn from(s: String) -> Self {
        LayoutTag::parse(&s)
    }
}

impl From<LayoutTag> for String {
    fn from(tag: LayoutTag) -> Self {
        tag.as_str().to_string()
    }
}

impl std::fmt::Display for LayoutTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Models occasionally return a bare string where a list of bullets is
/// expected; treat it as a single bullet.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Null(()) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_outline_with_mixed_queries() {
        let json = r#"{
            "title": "Deck",
            "slides": [
                {"title": "A", "content": ["x"], "image_query": "city", "layout": "HALF_IMAGE_LEFT"},
                {"title": "B", "content": ["1", "2", "3"], "image_query": ["a", "b", "c"], "layout": "3_BLOCK_LAYOUT"}
            ]
        }"#;
        let outline: Outline = serde_json::from_str(json).unwrap();
        assert_eq!(outline.title, "Deck");
        assert_eq!(outline.slide_count(), 2);
        assert_eq!(outline.slides[0].layout, LayoutTag::HalfImageLeft);
        assert_eq!(
            outline.slides[0].image_query,
            Some(ImageQuery::Single("city".to_string()))
        );
        assert_eq!(outline.slides[1].layout, LayoutTag::ThreeBlock);
        assert_eq!(
            outline.slides[1].image_query.as_ref().unwrap().terms().len(),
            3
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let spec: SlideSpec = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert_eq!(spec.title, "");
        assert!(spec.content.is_empty());
        assert!(spec.image_query.is_none());
        assert_eq!(spec.layout, LayoutTag::BasicContent);
    }

    #[test]
    fn null_layout_renders_as_basic_content() {
        let outline: Outline = serde_json::from_str(
            r#"{"title":"T","slides":[{"title":"a","content":["x"],"layout":null}]}"#,
        )
        .unwrap();
        assert_eq!(outline.slides[0].layout, LayoutTag::BasicContent);
        assert_eq!(outline.slides[0].content, vec!["x".to_string()]);
    }

    #[test]
    fn null_deck_title_is_accepted() {
        let outline: Outline =
            serde_json::from_str(r#"{"title": null, "slides": [{"title":"a"}]}"#).unwrap();
        assert_eq!(outline.title, "");
        assert_eq!(outline.slide_count(), 1);
    }

    #[test]
    fn bare_string_content_becomes_one_bullet() {
        let spec: SlideSpec = serde_json::from_str(r#"{"content": "only"}"#).unwrap();
        assert_eq!(spec.content, vec!["only".to_string()]);
    }

    #[test]
    fn unknown_tag_is_preserved() {
        let spec: SlideSpec = serde_json::from_str(r#"{"layout": "FANCY_GRID"}"#).unwrap();
        assert_eq!(spec.layout, LayoutTag::Unknown("FANCY_GRID".to_string()));
        assert!(!spec.layout.is_known());
        assert_eq!(serde_json::to_string(&spec.layout).unwrap(), r#""FANCY_GRID""#);
    }

    #[test]
    fn known_tags_round_trip_through_strings() {
        for tag in LayoutTag::KNOWN {
            assert_eq!(LayoutTag::parse(tag.as_str()), tag);
        }
    }

    #[test]
    fn outline_without_slides_is_rejected() {
        assert!(serde_json::from_str::<Outline>(r#"{"title": "x"}"#).is_err());
    }

    #[test]
    fn blank_query_terms_are_absent() {
        let q = ImageQuery::Many(vec!["a".into(), "  ".into()]);
        assert_eq!(q.terms(), vec![Some("a".to_string()), None]);
    }
}

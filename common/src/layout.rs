//! Closed, typed form of a [`SlideSpec`].
//!
//! Each variant carries exactly what its template draws, so renderers never
//! index into loosely-typed lists.

use crate::types::{LayoutTag, SlideSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFraction {
    Half,
    TwoThirds,
}

impl ImageFraction {
    pub fn ratio(self) -> f64 {
        match self {
            ImageFraction::Half => 0.5,
            ImageFraction::TwoThirds => 2.0 / 3.0,
        }
    }
}

/// One image + caption cell of a block layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub query: Option<String>,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlideLayout {
    Title {
        title: String,
        subtitle: Vec<String>,
    },
    BasicContent {
        title: String,
        bullets: Vec<String>,
    },
    ImageText {
        title: String,
        body: Vec<String>,
        query: Option<String>,
        side: ImageSide,
        fraction: ImageFraction,
    },
    ThreeBlock {
        title: String,
        blocks: [Block; 3],
    },
    FourBlock {
        title: String,
        blocks: [Block; 4],
    },
}

impl SlideLayout {
    pub fn title(&self) -> &str {
        match self {
            SlideLayout::Title { title, .. }
            | SlideLayout::BasicContent { title, .. }
            | SlideLayout::ImageText { title, .. }
            | SlideLayout::ThreeBlock { title, .. }
            | SlideLayout::FourBlock { title, .. } => title,
        }
    }

    /// Image queries in drawing order. Layouts without images return an
    /// empty list; an absent entry means "use the placeholder".
    pub fn image_queries(&self) -> Vec<Option<&str>> {
        match self {
            SlideLayout::Title { .. } | SlideLayout::BasicContent { .. } => Vec::new(),
            SlideLayout::ImageText { query, .. } => vec![query.as_deref()],
            SlideLayout::ThreeBlock { blocks, .. } => {
                blocks.iter().map(|b| b.query.as_deref()).collect()
            }
            SlideLayout::FourBlock { blocks, .. } => {
                blocks.iter().map(|b| b.query.as_deref()).collect()
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SlideLayout::Title { .. } => "title",
            SlideLayout::BasicContent { .. } => "basic-content",
            SlideLayout::ImageText { .. } => "image-text",
            SlideLayout::ThreeBlock { .. } => "three-block",
            SlideLayout::FourBlock { .. } => "four-block",
        }
    }
}

impl From<&SlideSpec> for SlideLayout {
    fn from(spec: &SlideSpec) -> Self {
        let title = spec.title.clone();
        let queries = spec
            .image_query
            .as_ref()
            .map(|q| q.terms())
            .unwrap_or_default();

        let image_text = |title: String, side, fraction| SlideLayout::ImageText {
            title,
            body: spec.content.clone(),
            query: queries.first().cloned().flatten(),
            side,
            fraction,
        };

        match spec.layout {
            LayoutTag::TitleSlide => SlideLayout::Title {
                title,
                subtitle: spec.content.clone(),
            },
            LayoutTag::TwoThirdsImageLeft => image_text(title, ImageSide::Left, ImageFraction::TwoThirds),
            LayoutTag::TwoThirdsImageRight => image_text(title, ImageSide::Right, ImageFraction::TwoThirds),
            LayoutTag::HalfImageLeft => image_text(title, ImageSide::Left, ImageFraction::Half),
            LayoutTag::HalfImageRight => image_text(title, ImageSide::Right, ImageFraction::Half),
            LayoutTag::ThreeBlock => SlideLayout::ThreeBlock {
                blocks: blocks(&queries, &spec.content),
                title,
            },
            LayoutTag::FourBlock => SlideLayout::FourBlock {
                blocks: blocks(&queries, &spec.content),
                title,
            },
            LayoutTag::BasicContent | LayoutTag::Unknown(_) => SlideLayout::BasicContent {
                title,
                bullets: spec.content.clone(),
            },
        }
    }
}

/// Pads or truncates queries and captions to exactly `N` blocks.
fn blocks<const N: usize>(queries: &[Option<String>], captions: &[String]) -> [Block; N] {
    std::array::from_fn(|i| Block {
        query: queries.get(i).cloned().flatten(),
        caption: captions.get(i).cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageQuery;

    fn spec(layout: &str, content: &[&str], query: Option<ImageQuery>) -> SlideSpec {
        SlideSpec {
            title: "T".to_string(),
            content: content.iter().map(|s| s.to_string()).collect(),
            image_query: query,
            layout: LayoutTag::parse(layout),
        }
    }

    #[test]
    fn four_block_pads_missing_captions_and_queries() {
        let s = spec(
            "4_BLOCK_LAYOUT",
            &["one", "two"],
            Some(ImageQuery::Many(vec!["a".into(), "b".into(), "c".into()])),
        );
        let SlideLayout::FourBlock { blocks, .. } = SlideLayout::from(&s) else {
            panic!("expected four-block");
        };
        assert_eq!(blocks[1].caption, "two");
        assert_eq!(blocks[2].caption, "");
        assert_eq!(blocks[3].caption, "");
        assert_eq!(blocks[2].query.as_deref(), Some("c"));
        assert_eq!(blocks[3].query, None);
    }

    #[test]
    fn single_query_on_block_layout_fills_first_block_only() {
        let s = spec(
            "3_BLOCK_LAYOUT",
            &["a", "b", "c", "d"],
            Some(ImageQuery::Single("forest".into())),
        );
        let layout = SlideLayout::from(&s);
        assert_eq!(layout.image_queries(), vec![Some("forest"), None, None]);
    }

    #[test]
    fn list_query_on_image_layout_uses_first_term() {
        let s = spec(
            "2/3RD_IMAGE_RIGHT",
            &["body"],
            Some(ImageQuery::Many(vec!["x".into(), "y".into()])),
        );
        match SlideLayout::from(&s) {
            SlideLayout::ImageText {
                query,
                side,
                fraction,
                ..
            } => {
                assert_eq!(query.as_deref(), Some("x"));
                assert_eq!(side, ImageSide::Right);
                assert_eq!(fraction, ImageFraction::TwoThirds);
            }
            other => panic!("unexpected layout {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_becomes_basic_content() {
        let s = spec("SOMETHING_ELSE", &["p"], None);
        assert_eq!(
            SlideLayout::from(&s),
            SlideLayout::BasicContent {
                title: "T".into(),
                bullets: vec!["p".into()]
            }
        );
    }

    #[test]
    fn text_only_layouts_need_no_images() {
        assert!(SlideLayout::from(&spec("1ST_SLIDE", &["sub"], None))
            .image_queries()
            .is_empty());
        assert!(SlideLayout::from(&spec("BASIC_CONTENT_SLIDE", &[], None))
            .image_queries()
            .is_empty());
    }
}

use crate::error::Result as SlideResult;
use anyhow::Result;
use async_trait::async_trait;
use slidegen_chatgpt::{ChatGptClient, OutlineRequest};
use slidegen_common::Outline;
use std::path::Path;

/// Anything that can turn a prompt into an outline.
///
/// `Ok(None)` means the source answered but produced nothing usable.
#[async_trait]
pub trait OutlineSource: Send + Sync {
    async fn outline(&self, request: &OutlineRequest) -> Result<Option<Outline>>;
}

#[async_trait]
impl OutlineSource for ChatGptClient {
    async fn outline(&self, request: &OutlineRequest) -> Result<Option<Outline>> {
        self.generate_outline(request).await
    }
}

/// Fixed outline, e.g. one saved earlier with `slidegen outline`.
pub struct StaticOutline {
    outline: Option<Outline>,
}

impl StaticOutline {
    pub fn new(outline: Outline) -> Self {
        Self {
            outline: Some(outline),
        }
    }

    /// A source that never produces an outline.
    pub fn empty() -> Self {
        Self { outline: None }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> SlideResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let outline: Outline = serde_json::from_str(&content)?;
        tracing::info!(
            "Loaded outline with {} slides from {}",
            outline.slide_count(),
            path.as_ref().display()
        );
        Ok(Self::new(outline))
    }
}

#[async_trait]
impl OutlineSource for StaticOutline {
    async fn outline(&self, request: &OutlineRequest) -> Result<Option<Outline>> {
        if let Some(outline) = &self.outline {
            if !request.bounds.contains(outline.slide_count()) {
                tracing::warn!(
                    "Outline has {} slides, outside the requested {}..={}",
                    outline.slide_count(),
                    request.bounds.min(),
                    request.bounds.max()
                );
            }
        }
        Ok(self.outline.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidegen_common::SlideBounds;

    #[tokio::test]
    async fn static_outline_round_trips_a_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.json");
        std::fs::write(
            &path,
            r#"{"title": "Tea", "slides": [{"title": "Green", "layout": "1ST_SLIDE"}]}"#,
        )
        .unwrap();

        let source = StaticOutline::from_file(&path).unwrap();
        let request = OutlineRequest::new("tea", SlideBounds::default());
        let outline = source.outline(&request).await.unwrap().unwrap();
        assert_eq!(outline.title, "Tea");
        assert_eq!(outline.slides[0].title, "Green");
    }

    #[test]
    fn outline_file_without_slides_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.json");
        std::fs::write(&path, r#"{"title": "Tea"}"#).unwrap();
        assert!(StaticOutline::from_file(&path).is_err());
    }

    #[tokio::test]
    async fn empty_source_yields_nothing() {
        let request = OutlineRequest::new("tea", SlideBounds::default());
        assert!(StaticOutline::empty().outline(&request).await.unwrap().is_none());
    }
}

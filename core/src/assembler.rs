//! Deck Assembler: outline in, presentation file out.

use crate::client::OutlineSource;
use crate::convert::{PdfConvert, PdfConverter};
use crate::deck::{Deck, PageGeometry};
use crate::error::{Result, SlideError};
use crate::images::{load_image, HttpImageFetcher, ImageFetch, ImageSearch, UnsplashClient};
use crate::render::LayoutRenderer;
use slidegen_chatgpt::{ChatGptClient, OutlineRequest};
use slidegen_common::{
    deck_output_path, pdf_path_for, DeckConfig, FontFamily, Outline, SlideBounds, SlideLayout,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Everything one generation run needs besides the collaborators.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub bounds: SlideBounds,
    pub font: FontFamily,
    /// Explicit deck path; otherwise derived from the prompt.
    pub output: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub convert_pdf: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            bounds: SlideBounds::default(),
            font: FontFamily::default(),
            output: None,
            output_dir: None,
            convert_pdf: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub deck_path: PathBuf,
    pub slide_count: usize,
    /// Images that fell back to a placeholder.
    pub placeholder_images: usize,
    /// Set only when conversion was requested and succeeded.
    pub pdf_path: Option<PathBuf>,
}

/// Progress notifications for interactive front ends.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    OutlineRequested,
    OutlineReady { title: String, slides: usize },
    SlideRendered { index: usize, total: usize, layout: &'static str },
    DeckSaved(PathBuf),
    PdfConverted(PathBuf),
    PdfFailed,
}

pub struct DeckAssembler {
    outlines: Arc<dyn OutlineSource>,
    search: Arc<dyn ImageSearch>,
    fetcher: Arc<dyn ImageFetch>,
    converter: Arc<dyn PdfConvert>,
    geometry: PageGeometry,
    events: Option<UnboundedSender<GenerationEvent>>,
}

impl DeckAssembler {
    pub fn new(
        outlines: Arc<dyn OutlineSource>,
        search: Arc<dyn ImageSearch>,
        fetcher: Arc<dyn ImageFetch>,
        converter: Arc<dyn PdfConvert>,
    ) -> Self {
        Self {
            outlines,
            search,
            fetcher,
            converter,
            geometry: PageGeometry::default(),
            events: None,
        }
    }

    /// Live collaborators: the chat model, photo search, HTTP fetches and
    /// the platform's office suite. Both API keys must be configured.
    pub fn from_config(config: &DeckConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(ChatGptClient::from_config(config)?),
            Arc::new(UnsplashClient::from_config(config)?),
            Arc::new(HttpImageFetcher::new()),
            Arc::new(PdfConverter::new()),
        ))
    }

    /// Same as [`DeckAssembler::from_config`] but with a fixed outline
    /// source, so no text-generation key is needed.
    pub fn with_outline_source(config: &DeckConfig, outlines: Arc<dyn OutlineSource>) -> Result<Self> {
        Ok(Self::new(
            outlines,
            Arc::new(UnsplashClient::from_config(config)?),
            Arc::new(HttpImageFetcher::new()),
            Arc::new(PdfConverter::new()),
        ))
    }

    pub fn with_events(mut self, tx: UnboundedSender<GenerationEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn emit(&self, event: GenerationEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// Ask the outline source; an absent outline is a generation failure.
    pub async fn request_outline(&self, prompt: &str, bounds: SlideBounds) -> Result<Outline> {
        self.emit(GenerationEvent::OutlineRequested);
        let request = OutlineRequest::new(prompt, bounds);
        match self.outlines.outline(&request).await? {
            Some(outline) => {
                self.emit(GenerationEvent::OutlineReady {
                    title: outline.title.clone(),
                    slides: outline.slide_count(),
                });
                Ok(outline)
            }
            None => Err(SlideError::Generation {
                reason: "no usable outline returned".to_string(),
            }),
        }
    }

    /// Render every slide of `outline`, in order. Returns the deck and the
    /// number of images that fell back to a placeholder.
    pub async fn build_deck(&self, outline: &Outline, font: FontFamily) -> Result<(Deck, usize)> {
        let renderer = LayoutRenderer::new(self.geometry, font);
        let mut deck = Deck::new(outline.title.as_str());
        deck.geometry = self.geometry;
        let mut placeholders = 0;
        let total = outline.slide_count();

        for (index, spec) in outline.slides.iter().enumerate() {
            let layout = SlideLayout::from(spec);
            let urls = self.search.resolve_all(&layout.image_queries()).await;

            let mut images = Vec::with_capacity(urls.len());
            for url in &urls {
                let (image, substituted) = load_image(self.fetcher.as_ref(), url.as_deref()).await?;
                if substituted {
                    placeholders += 1;
                }
                images.push(image);
            }

            let slide = renderer.render(&layout, images);
            tracing::debug!("Rendered slide {}/{total} as {}", index + 1, slide.layout);
            self.emit(GenerationEvent::SlideRendered {
                index,
                total,
                layout: slide.layout,
            });
            deck.push(slide);
        }

        Ok((deck, placeholders))
    }

    /// Full pipeline: outline, images, render, save, optional PDF.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReport> {
        let outline = self.request_outline(&request.prompt, request.bounds).await?;
        self.generate_from_outline(request, &outline).await
    }

    pub async fn generate_from_outline(
        &self,
        request: &GenerationRequest,
        outline: &Outline,
    ) -> Result<GenerationReport> {
        let (deck, placeholder_images) = self.build_deck(outline, request.font).await?;

        let deck_path = deck_output_path(
            &request.prompt,
            request.output.as_deref(),
            request.output_dir.as_deref(),
        );
        if let Some(parent) = deck_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        deck.save(&deck_path)?;
        tracing::info!(
            "Presentation saved as {} ({} slides, {placeholder_images} placeholder images)",
            deck_path.display(),
            deck.slide_count()
        );
        self.emit(GenerationEvent::DeckSaved(deck_path.clone()));

        let pdf_path = if request.convert_pdf {
            let pdf = pdf_path_for(&deck_path);
            if self.converter.convert(&deck_path, &pdf).await {
                self.emit(GenerationEvent::PdfConverted(pdf.clone()));
                Some(pdf)
            } else {
                self.emit(GenerationEvent::PdfFailed);
                None
            }
        } else {
            None
        };

        Ok(GenerationReport {
            deck_path,
            slide_count: deck.slide_count(),
            placeholder_images,
            pdf_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StaticOutline;
    use crate::deck::ImageData;
    use crate::images::PLACEHOLDER_URL;
    use async_trait::async_trait;
    use slidegen_common::{ImageQuery, LayoutTag, SlideSpec};
    use std::path::Path;
    use std::sync::Mutex;

    struct EchoSearch;

    #[async_trait]
    impl ImageSearch for EchoSearch {
        async fn first_image_url(&self, query: &str) -> Option<String> {
            (query != "missing").then(|| format!("https://img.test/{query}"))
        }
    }

    #[derive(Default)]
    struct CountingFetcher {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageFetch for CountingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(ImageData::placeholder()?.bytes)
        }
    }

    struct FixedConverter(bool);

    #[async_trait]
    impl PdfConvert for FixedConverter {
        async fn convert(&self, _deck: &Path, pdf: &Path) -> bool {
            if self.0 {
                std::fs::write(pdf, b"%PDF-1.4").is_ok()
            } else {
                false
            }
        }
    }

    fn spec(layout: &str, content: &[&str], query: Option<ImageQuery>) -> SlideSpec {
        SlideSpec {
            title: format!("{layout} title"),
            content: content.iter().map(|s| s.to_string()).collect(),
            image_query: query,
            layout: LayoutTag::parse(layout),
        }
    }

    fn one_of_each() -> Outline {
        let many = |n: usize| ImageQuery::Many((0..n).map(|i| format!("q{i}")).collect());
        let one = || Some(ImageQuery::Single("photo".into()));
        Outline {
            title: "Every layout".into(),
            slides: vec![
                spec("1ST_SLIDE", &["subtitle"], None),
                spec("BASIC_CONTENT_SLIDE", &["a", "b"], None),
                spec("2/3RD_IMAGE_LEFT", &["body"], one()),
                spec("2/3RD_IMAGE_RIGHT", &["body"], one()),
                spec("HALF_IMAGE_LEFT", &["body"], one()),
                spec("HALF_IMAGE_RIGHT", &["body"], one()),
                spec("3_BLOCK_LAYOUT", &["x", "y", "z"], Some(many(3))),
                spec("4_BLOCK_LAYOUT", &["w", "x", "y", "z"], Some(many(4))),
            ],
        }
    }

    fn assembler(
        outline: Option<Outline>,
        fetcher: Arc<CountingFetcher>,
        pdf_ok: bool,
    ) -> DeckAssembler {
        let source = match outline {
            Some(outline) => StaticOutline::new(outline),
            None => StaticOutline::empty(),
        };
        DeckAssembler::new(
            Arc::new(source),
            Arc::new(EchoSearch),
            fetcher,
            Arc::new(FixedConverter(pdf_ok)),
        )
    }

    #[tokio::test]
    async fn one_slide_per_layout_tag_in_order() {
        let fetcher = Arc::new(CountingFetcher::default());
        let (deck, placeholders) = assembler(None, fetcher.clone(), false)
            .build_deck(&one_of_each(), FontFamily::Verdana)
            .await
            .unwrap();

        let layouts: Vec<&str> = deck.slides().iter().map(|s| s.layout).collect();
        assert_eq!(
            layouts,
            vec![
                "title",
                "basic-content",
                "image-text",
                "image-text",
                "image-text",
                "image-text",
                "three-block",
                "four-block"
            ]
        );
        assert_eq!(deck.slide_count(), LayoutTag::KNOWN.len());
        assert_eq!(placeholders, 0);
        assert_eq!(fetcher.urls.lock().unwrap().len(), 4 + 3 + 4);
        assert_eq!(deck.slides()[6].pictures().count(), 3);
    }

    #[tokio::test]
    async fn unresolved_images_use_the_placeholder() {
        let outline = Outline {
            title: String::new(),
            slides: vec![
                spec("HALF_IMAGE_LEFT", &["a"], Some(ImageQuery::Single("missing".into()))),
                spec("HALF_IMAGE_RIGHT", &["b"], None),
            ],
        };
        let fetcher = Arc::new(CountingFetcher::default());
        let (deck, placeholders) = assembler(None, fetcher.clone(), false)
            .build_deck(&outline, FontFamily::Arial)
            .await
            .unwrap();
        assert_eq!(placeholders, 2);
        assert_eq!(
            fetcher.urls.lock().unwrap().as_slice(),
            [PLACEHOLDER_URL, PLACEHOLDER_URL]
        );
        assert!(deck.slides().iter().all(|s| s.pictures().count() == 1));
    }

    #[test]
    fn live_assembler_needs_both_keys() {
        let mut config = DeckConfig::default();
        config.image_api_key = Some("img".into());
        assert!(matches!(
            DeckAssembler::from_config(&config),
            Err(SlideError::Config(_))
        ));
        assert!(
            DeckAssembler::with_outline_source(&config, Arc::new(StaticOutline::empty())).is_ok()
        );
        config.text_api_key = Some("txt".into());
        assert!(DeckAssembler::from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn missing_outline_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = GenerationRequest::new("Anything at all");
        request.output_dir = Some(dir.path().to_path_buf());

        let err = assembler(None, Arc::new(CountingFetcher::default()), false)
            .generate(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, SlideError::Generation { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn deck_lands_at_the_slugified_name_with_pdf_alongside() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = GenerationRequest::new("The Future of AI!");
        request.output_dir = Some(dir.path().join("decks"));
        request.convert_pdf = true;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let report = assembler(Some(one_of_each()), Arc::new(CountingFetcher::default()), true)
            .with_events(tx)
            .generate(&request)
            .await
            .unwrap();

        let expected = dir.path().join("decks").join("the_future_of_ai.pptx");
        assert_eq!(report.deck_path, expected);
        assert!(expected.is_file());
        assert_eq!(report.slide_count, 8);
        assert_eq!(report.pdf_path, Some(expected.with_extension("pdf")));

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.first(), Some(&GenerationEvent::OutlineRequested));
        assert_eq!(
            events.last(),
            Some(&GenerationEvent::PdfConverted(expected.with_extension("pdf")))
        );
    }

    #[tokio::test]
    async fn failed_conversion_keeps_the_deck() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = GenerationRequest::new("tea");
        request.output = Some(dir.path().join("custom.pptx"));
        request.convert_pdf = true;

        let report = assembler(Some(one_of_each()), Arc::new(CountingFetcher::default()), false)
            .generate(&request)
            .await
            .unwrap();
        assert_eq!(report.deck_path, dir.path().join("custom.pptx"));
        assert!(report.deck_path.is_file());
        assert_eq!(report.pdf_path, None);
    }

    #[tokio::test]
    async fn slide_count_stays_within_requested_bounds() {
        for (min, max) in [(3, 3), (3, 15), (5, 10), (7, 9), (15, 15)] {
            let bounds = SlideBounds::new(min, max).unwrap();
            for count in bounds.range() {
                let outline = Outline {
                    title: "t".into(),
                    slides: (0..count)
                        .map(|i| spec("BASIC_CONTENT_SLIDE", &[format!("point {i}").as_str()], None))
                        .collect(),
                };
                let stubbed = assembler(Some(outline), Arc::new(CountingFetcher::default()), false);
                let outline = stubbed.request_outline("topic", bounds).await.unwrap();
                let (deck, _) = stubbed.build_deck(&outline, FontFamily::Arial).await.unwrap();
                assert!(bounds.contains(deck.slide_count()));
            }
        }
    }
}

//! Slide templates.
//!
//! Rendering is a pure function of the typed slide, page geometry, font and
//! already-fetched image data; nothing here touches the network.

use crate::deck::{
    ImageData, PageGeometry, Paragraph, Picture, Rect, RenderedSlide, Rgb, RunStyle, Shape,
    TextBox,
};
use slidegen_common::{Block, FontFamily, ImageFraction, ImageSide, SlideLayout};

const BANNER_BLUE: Rgb = Rgb(0, 102, 204);
const BODY_GRAY: Rgb = Rgb(80, 80, 80);

pub struct LayoutRenderer {
    page: PageGeometry,
    font: FontFamily,
}

impl LayoutRenderer {
    pub fn new(page: PageGeometry, font: FontFamily) -> Self {
        Self { page, font }
    }

    /// Draw one slide. `images` are consumed in the order of
    /// [`SlideLayout::image_queries`]; a missing entry leaves that picture out.
    pub fn render(&self, layout: &SlideLayout, images: Vec<ImageData>) -> RenderedSlide {
        let mut images = images.into_iter();
        let shapes = match layout {
            SlideLayout::Title { title, subtitle } => self.title_slide(title, subtitle),
            SlideLayout::BasicContent { title, bullets } => self.basic_content(title, bullets),
            SlideLayout::ImageText {
                title,
                body,
                side,
                fraction,
                ..
            } => self.image_text(title, body, *side, *fraction, images.next()),
            SlideLayout::ThreeBlock { title, blocks } => {
                self.three_block(title, blocks, &mut images)
            }
            SlideLayout::FourBlock { title, blocks } => self.four_block(title, blocks, &mut images),
        };

        RenderedSlide {
            layout: layout.name(),
            title: layout.title().to_string(),
            shapes,
        }
    }

    fn style(&self, size_pt: f64) -> RunStyle {
        RunStyle::new(self.font, size_pt)
    }

    fn text(frame: Rect, paragraphs: Vec<Paragraph>) -> Shape {
        Shape::Text(TextBox {
            frame,
            paragraphs,
            word_wrap: true,
        })
    }

    fn picture(frame: Rect, image: Option<ImageData>, description: &str) -> Option<Shape> {
        image.map(|image| {
            Shape::Picture(Picture {
                frame,
                image,
                description: description.to_string(),
            })
        })
    }

    fn title_slide(&self, title: &str, subtitle: &[String]) -> Vec<Shape> {
        let w = self.page.width_in();
        vec![
            Self::text(
                Rect::from_inches((w - 8.5) / 2.0, 2.33, 8.5, 1.61),
                vec![Paragraph::new(title, self.style(44.0)).centered()],
            ),
            Self::text(
                Rect::from_inches((w - 7.0) / 2.0, 4.25, 7.0, 1.92),
                vec![Paragraph::new(subtitle.join("\n"), self.style(24.0)).centered()],
            ),
        ]
    }

    fn basic_content(&self, title: &str, bullets: &[String]) -> Vec<Shape> {
        let w = self.page.width_in();
        vec![
            Self::text(
                Rect::from_inches(0.5, 0.3, w - 1.0, 1.25),
                vec![Paragraph::new(title, self.style(44.0))],
            ),
            Self::text(
                Rect::from_inches(0.5, 1.75, w - 1.0, 4.95),
                bullets
                    .iter()
                    .map(|b| Paragraph::new(b.as_str(), self.style(18.0)).bulleted())
                    .collect(),
            ),
        ]
    }

    fn image_text(
        &self,
        title: &str,
        body: &[String],
        side: ImageSide,
        fraction: ImageFraction,
        image: Option<ImageData>,
    ) -> Vec<Shape> {
        let w = self.page.width_in();
        let h = self.page.height_in();
        let image_width = w * fraction.ratio();
        let text_width = w - image_width;
        let (img_x, txt_x) = match side {
            ImageSide::Right => (w - image_width, 0.0),
            ImageSide::Left => (0.0, image_width),
        };

        let mut shapes = Vec::with_capacity(2);
        shapes.extend(Self::picture(
            Rect::from_inches(img_x, 0.0, image_width, h),
            image,
            title,
        ));
        shapes.push(Self::text(
            Rect::from_inches(txt_x, 0.0, text_width, h),
            vec![
                Paragraph::new(title, self.style(32.0).bold().color(Rgb::BLACK)),
                Paragraph::new(body.join("\n"), self.style(18.0).color(BODY_GRAY))
                    .space_before(20.0),
            ],
        ));
        shapes
    }

    fn banner(&self, frame: Rect, title: &str) -> Shape {
        Self::text(
            frame,
            vec![Paragraph::new(title, self.style(32.0).bold().color(BANNER_BLUE))],
        )
    }

    fn three_block(
        &self,
        title: &str,
        blocks: &[Block; 3],
        images: &mut impl Iterator<Item = ImageData>,
    ) -> Vec<Shape> {
        let w = self.page.width_in();
        let block_width = w / 3.0;
        let image_size = 2.0;
        let text_height = 2.0;
        let top_margin = 1.5;

        let mut shapes = Vec::new();
        if !title.trim().is_empty() {
            shapes.push(self.banner(Rect::from_inches(0.5, 0.2, w - 1.0, 1.0), title));
        }

        for (i, block) in blocks.iter().enumerate() {
            let column_x = i as f64 * block_width;
            shapes.extend(Self::picture(
                Rect::from_inches(
                    column_x + (block_width - image_size) / 2.0,
                    top_margin,
                    image_size,
                    image_size,
                ),
                images.next(),
                &block.caption,
            ));
            shapes.push(Self::text(
                Rect::from_inches(
                    column_x + 0.1,
                    top_margin + image_size + 0.3,
                    block_width - 0.2,
                    text_height,
                ),
                vec![Paragraph::new(block.caption.as_str(), self.style(16.0))],
            ));
        }
        shapes
    }

    fn four_block(
        &self,
        title: &str,
        blocks: &[Block; 4],
        images: &mut impl Iterator<Item = ImageData>,
    ) -> Vec<Shape> {
        let w = self.page.width_in();
        let margin = 0.3;
        let spacing = 0.2;
        let card_width = (w - 2.0 * margin - 3.0 * spacing) / 4.0;
        let image_height = 1.5;
        let text_height = 2.5;
        let top_img = 1.2;
        let top_txt = top_img + image_height + 0.1;

        let mut shapes = vec![self.banner(
            Rect::from_inches(margin, 0.2, w - 2.0 * margin, 1.0),
            title,
        )];

        for (i, block) in blocks.iter().enumerate() {
            let left = margin + i as f64 * (card_width + spacing);
            shapes.extend(Self::picture(
                Rect::from_inches(left, top_img, card_width, image_height),
                images.next(),
                &block.caption,
            ));
            shapes.push(Self::text(
                Rect::from_inches(left, top_txt, card_width, text_height),
                vec![Paragraph::new(
                    block.caption.as_str(),
                    self.style(18.0).color(Rgb::BLACK),
                )],
            ));
        }
        shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{inches, ImageKind};
    use slidegen_common::{LayoutTag, SlideSpec};

    fn image() -> ImageData {
        ImageData {
            bytes: vec![1, 2, 3],
            kind: ImageKind::Png,
        }
    }

    fn renderer() -> LayoutRenderer {
        LayoutRenderer::new(PageGeometry::default(), FontFamily::Georgia)
    }

    fn layout(tag: &str, content: &[&str]) -> SlideLayout {
        SlideLayout::from(&SlideSpec {
            title: "Heading".into(),
            content: content.iter().map(|s| s.to_string()).collect(),
            image_query: None,
            layout: LayoutTag::parse(tag),
        })
    }

    #[test]
    fn four_block_with_two_captions_fills_the_rest_with_empty_text() {
        let slide = renderer().render(
            &layout("4_BLOCK_LAYOUT", &["first", "second"]),
            vec![image(), image(), image(), image()],
        );
        let captions: Vec<&str> = slide
            .text_boxes()
            .skip(1)
            .map(|t| t.paragraphs[0].text.as_str())
            .collect();
        assert_eq!(captions, vec!["first", "second", "", ""]);
        assert_eq!(slide.pictures().count(), 4);

        let page = PageGeometry::default();
        for picture in slide.pictures() {
            assert!(picture.frame.x >= inches(0.3) - 1);
            assert!(picture.frame.right() <= page.width - inches(0.3) + 1);
        }
    }

    #[test]
    fn two_thirds_right_puts_image_on_the_right() {
        let slide = renderer().render(&layout("2/3RD_IMAGE_RIGHT", &["a", "b"]), vec![image()]);
        let page = PageGeometry::default();
        let picture = slide.pictures().next().unwrap();
        assert_eq!(picture.frame.x, inches(10.0 / 3.0));
        assert_eq!(picture.frame.right(), page.width);
        assert_eq!(picture.frame.height, page.height);

        let text = slide.text_boxes().next().unwrap();
        assert_eq!(text.frame.x, 0);
        assert_eq!(text.frame.width, inches(10.0 / 3.0));
        assert_eq!(text.paragraphs[0].text, "Heading");
        assert!(text.paragraphs[0].style.bold);
        assert_eq!(text.paragraphs[1].text, "a\nb");
        assert_eq!(text.paragraphs[1].space_before_pt, Some(20.0));
    }

    #[test]
    fn half_left_splits_the_page_evenly() {
        let slide = renderer().render(&layout("HALF_IMAGE_LEFT", &["x"]), vec![image()]);
        let picture = slide.pictures().next().unwrap();
        let text = slide.text_boxes().next().unwrap();
        assert_eq!(picture.frame.x, 0);
        assert_eq!(picture.frame.width, inches(5.0));
        assert_eq!(text.frame.x, inches(5.0));
    }

    #[test]
    fn three_block_centers_images_in_columns() {
        let slide = renderer().render(
            &layout("3_BLOCK_LAYOUT", &["a", "b", "c"]),
            vec![image(), image(), image()],
        );
        let xs: Vec<i64> = slide.pictures().map(|p| p.frame.x).collect();
        let column = 10.0 / 3.0;
        let expected: Vec<i64> = (0..3)
            .map(|i| inches(i as f64 * column + (column - 2.0) / 2.0))
            .collect();
        assert_eq!(xs, expected);
        assert_eq!(slide.text_boxes().count(), 4);
    }

    #[test]
    fn three_block_without_title_has_no_banner() {
        let spec = SlideSpec {
            title: "  ".into(),
            content: vec!["a".into()],
            image_query: None,
            layout: LayoutTag::ThreeBlock,
        };
        let slide = renderer().render(&SlideLayout::from(&spec), vec![]);
        assert_eq!(slide.text_boxes().count(), 3);
        assert_eq!(slide.pictures().count(), 0);
    }

    #[test]
    fn unknown_layout_renders_as_basic_content() {
        let slide = renderer().render(&layout("MYSTERY", &["one", "two"]), vec![]);
        assert_eq!(slide.layout, "basic-content");
        let body = slide.text_boxes().nth(1).unwrap();
        assert_eq!(body.paragraphs.len(), 2);
        assert!(body.paragraphs.iter().all(|p| p.bullet));
    }

    #[test]
    fn every_run_uses_the_selected_font() {
        let slide = renderer().render(&layout("1ST_SLIDE", &["sub", "line"]), vec![]);
        for text in slide.text_boxes() {
            for p in &text.paragraphs {
                assert_eq!(p.style.font, FontFamily::Georgia);
            }
        }
        assert_eq!(slide.text_boxes().nth(1).unwrap().paragraphs[0].text, "sub\nline");
    }
}

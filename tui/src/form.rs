//! State of the generation form, independent of the terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use slidegen_common::{ConfigError, DeckConfig, FontFamily, SlideBounds, MAX_SLIDES, MIN_SLIDES};
use slidegen_core::GenerationRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Prompt,
    MinSlides,
    MaxSlides,
    Font,
    Pdf,
    Generate,
}

impl Field {
    const ORDER: [Field; 6] = [
        Field::Prompt,
        Field::MinSlides,
        Field::MaxSlides,
        Field::Font,
        Field::Pdf,
        Field::Generate,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Quit,
}

#[derive(Debug, Clone)]
pub struct GeneratorForm {
    pub prompt: String,
    pub min_slides: usize,
    pub max_slides: usize,
    pub font: FontFamily,
    pub convert_pdf: bool,
    pub focus: Field,
}

impl GeneratorForm {
    pub fn new(config: &DeckConfig) -> Self {
        let bounds = config.bounds().unwrap_or_default();
        Self {
            prompt: String::new(),
            min_slides: bounds.min(),
            max_slides: bounds.max(),
            font: config.font,
            convert_pdf: true,
            focus: Field::Prompt,
        }
    }

    pub fn bounds(&self) -> Result<SlideBounds, ConfigError> {
        SlideBounds::new(self.min_slides, self.max_slides)
    }

    /// The request to run, or `None` while the prompt is blank.
    pub fn request(&self, output_dir: Option<&std::path::Path>) -> Option<GenerationRequest> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return None;
        }
        let mut request = GenerationRequest::new(prompt);
        request.bounds = self.bounds().ok()?;
        request.font = self.font;
        request.output_dir = output_dir.map(|p| p.to_path_buf());
        request.convert_pdf = self.convert_pdf;
        Some(request)
    }

    /// Min can't pass max and both stay inside the global limits.
    fn adjust(&mut self, delta: isize) {
        let step = |value: usize, lo: usize, hi: usize| -> usize {
            value.saturating_add_signed(delta).clamp(lo, hi)
        };
        match self.focus {
            Field::MinSlides => self.min_slides = step(self.min_slides, MIN_SLIDES, self.max_slides),
            Field::MaxSlides => self.max_slides = step(self.max_slides, self.min_slides, MAX_SLIDES),
            Field::Font => {
                self.font = if delta > 0 {
                    self.font.next()
                } else {
                    self.font.previous()
                }
            }
            Field::Pdf => self.convert_pdf = !self.convert_pdf,
            Field::Prompt | Field::Generate => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => FormAction::Quit,
                _ => FormAction::None,
            };
        }

        match key.code {
            KeyCode::Esc => return FormAction::Quit,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.previous(),
            KeyCode::Right => self.adjust(1),
            KeyCode::Left => self.adjust(-1),
            KeyCode::Char(c) if self.focus == Field::Prompt => self.prompt.push(c),
            KeyCode::Backspace if self.focus == Field::Prompt => {
                self.prompt.pop();
            }
            KeyCode::Char(' ') if self.focus == Field::Pdf => self.adjust(1),
            KeyCode::Char('+') => self.adjust(1),
            KeyCode::Char('-') => self.adjust(-1),
            _ => {}
        }
        FormAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn form() -> GeneratorForm {
        GeneratorForm::new(&DeckConfig::default())
    }

    #[test]
    fn typing_goes_to_the_prompt() {
        let mut form = form();
        for c in "AI ethics".chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
        form.handle_key(key(KeyCode::Backspace));
        assert_eq!(form.prompt, "AI ethic");
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormAction::Submit);
    }

    #[test]
    fn slide_counts_never_cross_or_leave_the_range() {
        let mut form = form();
        form.focus = Field::MinSlides;
        for _ in 0..20 {
            form.handle_key(key(KeyCode::Left));
        }
        assert_eq!(form.min_slides, MIN_SLIDES);
        for _ in 0..20 {
            form.handle_key(key(KeyCode::Right));
        }
        assert_eq!(form.min_slides, form.max_slides);

        form.focus = Field::MaxSlides;
        for _ in 0..20 {
            form.handle_key(key(KeyCode::Right));
        }
        assert_eq!(form.max_slides, MAX_SLIDES);
        assert!(form.bounds().is_ok());
    }

    #[test]
    fn font_selector_cycles_through_every_family() {
        let mut form = form();
        form.focus = Field::Font;
        let start = form.font;
        let mut seen = vec![start];
        for _ in 1..FontFamily::ALL.len() {
            form.handle_key(key(KeyCode::Right));
            seen.push(form.font);
        }
        form.handle_key(key(KeyCode::Right));
        assert_eq!(form.font, start);
        seen.sort_by_key(|f| f.typeface());
        seen.dedup();
        assert_eq!(seen.len(), FontFamily::ALL.len());
    }

    #[test]
    fn tab_walks_every_field_and_wraps() {
        let mut form = form();
        let mut order = vec![form.focus];
        for _ in 0..6 {
            form.handle_key(key(KeyCode::Tab));
            order.push(form.focus);
        }
        assert_eq!(order.first(), order.last());
        form.handle_key(key(KeyCode::BackTab));
        assert_eq!(form.focus, Field::Generate);
    }

    #[test]
    fn blank_prompt_builds_no_request() {
        let mut form = form();
        assert!(form.request(None).is_none());
        form.prompt = "  Rust in production ".into();
        form.font = FontFamily::Georgia;
        let request = form.request(None).unwrap();
        assert_eq!(request.prompt, "Rust in production");
        assert_eq!(request.font, FontFamily::Georgia);
        assert!(request.convert_pdf);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut form = form();
        let action = form.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action, FormAction::Quit);
        assert!(form.prompt.is_empty());
    }
}

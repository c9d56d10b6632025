use crate::form::{Field, FormAction, GeneratorForm};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use slidegen_common::DeckConfig;
use slidegen_core::{DeckAssembler, ErrorReporter, GenerationEvent, GenerationReport};
use std::io;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Duration;
use unicode_width::UnicodeWidthStr;

const LABEL_WIDTH: u16 = 13;

/// What the results panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Running { stage: String },
    Done { report: GenerationReport, pdf_requested: bool },
    Failed(String),
}

type Finished = std::result::Result<GenerationReport, String>;

pub struct InteractiveApp {
    running: bool,
    config: DeckConfig,
    form: GeneratorForm,
    status: Status,
    pdf_requested: bool,
    progress_tx: UnboundedSender<GenerationEvent>,
    progress_rx: UnboundedReceiver<GenerationEvent>,
    done_tx: UnboundedSender<Finished>,
    done_rx: UnboundedReceiver<Finished>,
}

impl InteractiveApp {
    pub fn new(config: DeckConfig) -> Self {
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            running: true,
            form: GeneratorForm::new(&config),
            config,
            status: Status::Idle,
            pdf_requested: false,
            progress_tx,
            progress_rx,
            done_tx,
            done_rx,
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while self.running {
            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                Some(ev) = self.progress_rx.recv() => {
                    self.handle_progress(ev);
                }
                Some(done) = self.done_rx.recv() => {
                    self.handle_finished(done);
                }
                // Terminal input is polled on a blocking thread so progress keeps flowing
                event_result = tokio::task::spawn_blocking(|| event::poll(Duration::from_millis(100))) => {
                    if let Ok(Ok(true)) = event_result {
                        if let Event::Key(key) = event::read()? {
                            if key.kind == KeyEventKind::Press {
                                match self.form.handle_key(key) {
                                    FormAction::Quit => self.running = false,
                                    FormAction::Submit => self.submit(),
                                    FormAction::None => {}
                                }
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn is_busy(&self) -> bool {
        matches!(self.status, Status::Running { .. })
    }

    /// Start a generation run in the background.
    pub fn submit(&mut self) {
        if self.is_busy() {
            return;
        }
        let Some(request) = self.form.request(self.config.output_dir.as_deref()) else {
            self.status = Status::Failed("Enter a presentation topic first.".to_string());
            return;
        };
        let assembler = match DeckAssembler::from_config(&self.config) {
            Ok(assembler) => assembler.with_events(self.progress_tx.clone()),
            Err(e) => {
                self.status = Status::Failed(ErrorReporter::format_user_error(&e));
                return;
            }
        };

        tracing::info!("Generating presentation for '{}'", request.prompt);
        self.status = Status::Running {
            stage: "Generating presentation...".to_string(),
        };
        self.pdf_requested = request.convert_pdf;
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = assembler.generate(&request).await.map_err(|e| {
                tracing::error!("Generation failed: {e}");
                ErrorReporter::format_user_error(&e)
            });
            let _ = done_tx.send(result);
        });
    }

    pub fn handle_progress(&mut self, ev: GenerationEvent) {
        if !self.is_busy() {
            return;
        }
        let stage = match ev {
            GenerationEvent::OutlineRequested => "Asking the model for an outline...".to_string(),
            GenerationEvent::OutlineReady { title, slides } => {
                format!("Outline '{title}' ready: {slides} slides")
            }
            GenerationEvent::SlideRendered { index, total, layout } => {
                format!("Rendered slide {}/{total} ({layout})", index + 1)
            }
            GenerationEvent::DeckSaved(path) => format!("Saved {}", path.display()),
            GenerationEvent::PdfConverted(path) => format!("Converted {}", path.display()),
            GenerationEvent::PdfFailed => "PDF conversion failed".to_string(),
        };
        self.status = Status::Running { stage };
    }

    pub fn handle_finished(&mut self, done: Finished) {
        self.status = match done {
            Ok(report) => Status::Done {
                report,
                pdf_requested: self.pdf_requested,
            },
            Err(message) => Status::Failed(message),
        };
    }

    fn field_line<'a>(&self, field: Field, label: &'a str, value: String) -> Line<'a> {
        let focused = self.form.focus == field;
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(
                format!("{label:<width$}", width = LABEL_WIDTH as usize),
                Style::default().add_modifier(Modifier::DIM),
            ),
            Span::styled(value, value_style),
        ])
    }

    fn form_lines(&self) -> Vec<Line<'_>> {
        let form = &self.form;
        let generate_style = if form.focus == Field::Generate {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        vec![
            self.field_line(Field::Prompt, "Topic", form.prompt.clone()),
            self.field_line(Field::MinSlides, "Min slides", format!("< {} >", form.min_slides)),
            self.field_line(Field::MaxSlides, "Max slides", format!("< {} >", form.max_slides)),
            self.field_line(Field::Font, "Font", format!("< {} >", form.font)),
            self.field_line(
                Field::Pdf,
                "Also PDF",
                if form.convert_pdf { "[x]" } else { "[ ]" }.to_string(),
            ),
            Line::from(""),
            Line::from(Span::styled(" Generate Presentation ", generate_style)),
        ]
    }

    fn result_lines(&self) -> Vec<Line<'_>> {
        match &self.status {
            Status::Idle => vec![Line::from("Enter a topic, adjust the options and press Enter.")],
            Status::Running { stage } => vec![
                Line::from(Span::styled(
                    "Generating presentation...",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(stage.as_str()),
            ],
            Status::Done {
                report,
                pdf_requested,
            } => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        format!("✔ Presentation ready ({} slides)", report.slide_count),
                        Style::default().fg(Color::Green),
                    )),
                    Line::from(format!("PPTX: {}", report.deck_path.display())),
                ];
                match &report.pdf_path {
                    Some(pdf) => lines.push(Line::from(format!("PDF:  {}", pdf.display()))),
                    None if *pdf_requested => lines.push(Line::from(Span::styled(
                        "⚠ PDF conversion failed or is not supported on this system.",
                        Style::default().fg(Color::Yellow),
                    ))),
                    None => {}
                }
                if report.placeholder_images > 0 {
                    lines.push(Line::from(format!(
                        "{} image(s) replaced by placeholders",
                        report.placeholder_images
                    )));
                }
                lines
            }
            Status::Failed(message) => message
                .lines()
                .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Red))))
                .collect(),
        }
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(4), Constraint::Length(1)])
            .split(f.area());

        let form = Paragraph::new(self.form_lines()).block(
            Block::default()
                .title("AI Presentation Generator")
                .borders(Borders::ALL),
        );
        f.render_widget(form, chunks[0]);

        let results = Paragraph::new(self.result_lines())
            .block(Block::default().title("Result").borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        f.render_widget(results, chunks[1]);

        let help = Paragraph::new(
            "Tab/↑↓ move  ←→ change  Space toggle  Enter generate  Esc quit",
        )
        .style(Style::default().add_modifier(Modifier::DIM));
        f.render_widget(help, chunks[2]);

        if self.form.focus == Field::Prompt {
            let x = chunks[0].x + 1 + LABEL_WIDTH + self.form.prompt.width() as u16;
            let y = chunks[0].y + 1;
            f.set_cursor_position((x.min(chunks[0].right().saturating_sub(2)), y));
        }
    }
}

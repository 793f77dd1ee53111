use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Convert an assistant answer into styled lines
pub fn parse_markdown(input: &str) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let mut writer = LineWriter::default();
    for event in Parser::new_ext(input, options) {
        writer.handle(event);
    }
    writer.finish()
}

#[derive(Default)]
struct LineWriter {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    code_block: Option<String>,
    list_depth: usize,
    /// Next item number per open ordered list, `None` for bullets
    list_numbers: Vec<Option<u64>>,
}

impl LineWriter {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => {
                let style = self.start(tag);
                self.styles.push(style);
            }
            Event::End(tag) => {
                self.styles.pop();
                self.end(tag);
            }
            Event::Text(text) => match &mut self.code_block {
                Some(code) => code.push_str(&text),
                None => {
                    let style = self.style();
                    self.spans.push(Span::styled(text.to_string(), style));
                }
            },
            Event::Code(code) => {
                self.spans.push(Span::styled(
                    format!(" {} ", code),
                    Style::default().fg(Color::Yellow).bg(Color::Rgb(40, 40, 40)),
                ));
            }
            Event::SoftBreak | Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(24),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) -> Style {
        let current = self.style();
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                match level {
                    HeadingLevel::H1 => Style::default().fg(Color::Cyan),
                    HeadingLevel::H2 => Style::default().fg(Color::Blue),
                    HeadingLevel::H3 => Style::default().fg(Color::Green),
                    _ => Style::default().fg(Color::Yellow),
                }
                .add_modifier(Modifier::BOLD)
            }
            Tag::Emphasis => current.add_modifier(Modifier::ITALIC),
            Tag::Strong => current.add_modifier(Modifier::BOLD),
            Tag::Strikethrough => current.add_modifier(Modifier::CROSSED_OUT),
            Tag::CodeBlock(kind) => {
                self.flush();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.lines.push(Line::from(vec![
                    Span::styled("```", Style::default().fg(Color::DarkGray)),
                    Span::styled(lang, Style::default().fg(Color::Magenta)),
                ]));
                self.code_block = Some(String::new());
                Style::default().fg(Color::Gray)
            }
            Tag::List(first) => {
                self.flush();
                self.list_depth += 1;
                self.list_numbers.push(first);
                current
            }
            Tag::Item => {
                let indent = "  ".repeat(self.list_depth.saturating_sub(1));
                let marker = match self.list_numbers.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.spans.push(Span::raw(indent));
                self.spans
                    .push(Span::styled(marker, Style::default().fg(Color::Yellow)));
                current
            }
            Tag::Link { .. } => Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            Tag::BlockQuote(_) => {
                self.flush();
                self.spans
                    .push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
            }
            _ => current,
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item | TagEnd::BlockQuote(_) => {
                self.flush()
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code_block.take() {
                    for line in code.lines() {
                        self.lines.push(Line::from(Span::styled(
                            line.to_string(),
                            Style::default().fg(Color::Gray),
                        )));
                    }
                }
                self.lines.push(Line::from(Span::styled(
                    "```",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            TagEnd::List(_) => {
                self.list_depth = self.list_depth.saturating_sub(1);
                self.list_numbers.pop();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        self.lines
    }
}

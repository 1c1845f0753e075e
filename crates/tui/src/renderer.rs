use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use slidesync_core::Nav;
use slidesync_protocol::{ElementRole, ElementStyle, LifecycleClass, Millis, Pagination, TrackKind};

use crate::playground::{PX_PER_COL, Playground};

const FRAME: Duration = Duration::from_millis(33);
/// Page pixels per terminal cell of element offset.
const PX_PER_OFFSET_CELL: f64 = 5.0;

fn opacity_color(opacity: f64) -> Option<Color> {
    match opacity {
        o if o >= 0.99 => Some(Color::White),
        o if o >= 0.5 => Some(Color::Gray),
        o if o > 0.05 => Some(Color::DarkGray),
        _ => None,
    }
}

fn lifecycle_color(class: Option<LifecycleClass>) -> Color {
    match class {
        Some(LifecycleClass::Ready) => Color::Green,
        Some(LifecycleClass::Transitioning) => Color::Yellow,
        Some(LifecycleClass::Initializing) | None => Color::DarkGray,
    }
}

/// DOM key names for the keys the carousel listens to.
fn dom_key(code: KeyCode) -> Option<&'static str> {
    match code {
        KeyCode::Left => Some("ArrowLeft"),
        KeyCode::Right => Some("ArrowRight"),
        KeyCode::PageUp => Some("PageUp"),
        KeyCode::PageDown => Some("PageDown"),
        _ => None,
    }
}

fn element_line(role: ElementRole, style: ElementStyle) -> Line<'static> {
    let Some(fg) = opacity_color(style.opacity) else {
        return Line::from("");
    };
    let indent = (8.0 + style.offset.x / PX_PER_OFFSET_CELL).round().max(0.0) as usize;
    let drift = match style.offset.y {
        y if y > 0.5 => " ↓",
        y if y < -0.5 => " ↑",
        _ => "",
    };
    Line::from(vec![
        Span::raw(" ".repeat(indent)),
        Span::styled(role.slug(), Style::default().fg(fg)),
        Span::styled(drift, Style::default().fg(Color::DarkGray)),
    ])
}

fn pagination_line(pagination: Option<&Pagination>, slides: usize) -> Line<'static> {
    match pagination {
        Some(Pagination::Bullets { active }) => Line::from(
            (0..slides)
                .map(|i| {
                    if i == *active {
                        Span::styled("● ", Style::default().fg(Color::Cyan))
                    } else {
                        Span::raw("○ ")
                    }
                })
                .collect::<Vec<_>>(),
        ),
        Some(Pagination::Fraction { label }) => Line::from(label.clone()),
        Some(Pagination::Progress { fraction }) => {
            let filled = (fraction * 20.0).round() as usize;
            Line::from(vec![
                Span::styled("█".repeat(filled), Style::default().fg(Color::Cyan)),
                Span::raw("░".repeat(20usize.saturating_sub(filled))),
            ])
        }
        None => Line::from(""),
    }
}

fn draw(frame: &mut Frame, playground: &Playground, now: Millis) {
    let scene = playground.scene();
    let Some(instance) = playground.instance() else {
        return;
    };
    let area = frame.area();
    let [header, image, content, status, log] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Length(11),
        Constraint::Length(4),
        Constraint::Min(3),
    ])
    .areas(area);

    let title = Paragraph::new(
        " slidesync | ←→ navigate | 1-9 go to | h hover | o overflow | r reinit | q quit ",
    )
    .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(title, header);

    // Image track: every rendered copy, with the current one highlighted.
    let rendered = instance.controller().image().rendered_len();
    let cells: Vec<Span> = (0..rendered)
        .map(|internal| {
            let logical = instance.controller().image().logical_of(internal);
            let label = format!(" {} ", logical + 1);
            if internal == scene.image_internal() {
                Span::styled(label, Style::default().fg(Color::Black).bg(Color::Yellow))
            } else {
                Span::raw(label)
            }
        })
        .collect();
    let image_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            " image track · {:?} · {} ms ",
            instance.config().effect,
            scene.speed(TrackKind::Image)
        ))
        .border_style(Style::default().fg(lifecycle_color(scene.lifecycle())));
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(cells),
            pagination_line(scene.pagination(), instance.slide_count()),
        ])
        .block(image_block),
        image,
    );

    // Content track: the slide it shows and its elements as sampled now.
    let mut lines = Vec::new();
    let title = match scene.content_slide() {
        Some(slide) if scene.container_visible(slide) => {
            lines.extend(
                ElementRole::ALL
                    .into_iter()
                    .map(|role| element_line(role, scene.element(slide, role, now))),
            );
            format!(" content track · slide {} ", slide + 1)
        }
        Some(slide) => format!(" content track · slide {} (hidden) ", slide + 1),
        None => " content track · empty ".to_owned(),
    };
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        content,
    );

    let spacer = instance
        .spacer_height()
        .map_or_else(|| "-".to_owned(), |h| format!("{h} px"));
    let status_lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{:?}", instance.state()),
                Style::default()
                    .fg(lifecycle_color(scene.lifecycle()))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "  active {:?}  loop {}  tier {:?}",
                instance.active_index().map(|i| i + 1),
                instance.looped(),
                playground.registry().tier(),
            )),
        ]),
        Line::from(format!(
            "autoplay {}  hover {}  spacer {spacer}  overflow {} px{}",
            scene.autoplay(),
            playground.hovered(),
            playground.host().overflow_px,
            instance
                .options_error()
                .map(|e| format!("  options: {e}"))
                .unwrap_or_default(),
        )),
    ];
    frame.render_widget(
        Paragraph::new(status_lines).block(Block::default().borders(Borders::ALL).title(" state ")),
        status,
    );

    let visible = usize::from(log.height.saturating_sub(2));
    let mut recent: Vec<Line> = playground
        .log()
        .rev()
        .take(visible)
        .map(|line| Line::from(line.clone()))
        .collect();
    recent.reverse();
    frame.render_widget(
        Paragraph::new(recent)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title(" commands ")),
        log,
    );
}

/// Width of the simulated page for a terminal `cols` wide.
pub fn page_width(cols: u16) -> f64 {
    f64::from(cols) * PX_PER_COL
}

pub fn run(playground: &mut Playground) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let start = Instant::now();
    let clock = || start.elapsed().as_millis() as Millis;

    let result = (|| -> Result<()> {
        loop {
            let now = clock();
            playground.tick(now);
            terminal.draw(|frame| draw(frame, playground, now))?;

            if !event::poll(FRAME)? {
                continue;
            }
            let now = clock();
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('h') => playground.toggle_hover(now),
                    KeyCode::Char('o') => playground.cycle_overflow(now),
                    KeyCode::Char('r') => playground.reinit(now)?,
                    KeyCode::Char(c @ '1'..='9') => {
                        let index = c as usize - '1' as usize;
                        playground.navigate(Nav::To(index), now);
                    }
                    code => {
                        if let Some(key) = dom_key(code) {
                            playground.key(key, now);
                        }
                    }
                },
                Event::Resize(cols, _) => playground.resize(page_width(cols), now),
                _ => {}
            }
        }
        Ok(())
    })();

    playground.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

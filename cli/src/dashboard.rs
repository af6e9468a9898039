use std::cell::RefCell;
use std::{io, time::Duration};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use millrun_core::model::stats::ChartPoint;
use millrun_core::time::today;
use millrun_core::{
    ChartMode, DateRange, EntryFilter, EntryStore, LiveEntries, Notifier, ProductionReport, ProductionType,
    ReportUseCase, Severity,
};
use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Gauge, Padding, Paragraph},
};

use crate::display::truncate;

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    good: Color,
    warn: Color,
    bad: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    good: Color::Green,
    warn: Color::Yellow,
    bad: Color::Red,
};

const BAR_WIDTH: u16 = 7;

/// Keeps the latest notification for the footer; the alternate screen
/// cannot take stderr output.
#[derive(Default)]
struct StatusLine {
    last: RefCell<Option<(String, Severity)>>,
}

impl Notifier for StatusLine {
    fn show_toast(&self, message: &str, severity: Severity) {
        *self.last.borrow_mut() = Some((message.to_string(), severity));
    }
}

pub struct DashboardApp {
    pub mode: ChartMode,
    pub range: DateRange,
    pub report: ProductionReport,
}

impl DashboardApp {
    pub fn new(live: &LiveEntries, range: DateRange, mode: ChartMode) -> Self {
        Self {
            mode,
            range,
            report: build(live, range),
        }
    }

    pub fn next_mode(&mut self) {
        self.mode = self.mode.next();
    }

    pub fn next_range(&mut self, live: &LiveEntries) {
        self.range = self.range.next();
        self.refresh(live);
    }

    pub fn refresh(&mut self, live: &LiveEntries) {
        self.report = build(live, self.range);
    }
}

fn build(live: &LiveEntries, range: DateRange) -> ProductionReport {
    ReportUseCase::build(
        live.entries(),
        live.production_type(),
        &EntryFilter::with_range(range),
        today(),
    )
}

fn next_type(kind: ProductionType) -> ProductionType {
    let all = ProductionType::ALL;
    let index = all.iter().position(|k| *k == kind).unwrap_or(0);
    all[(index + 1) % all.len()]
}

pub fn run<S: EntryStore>(
    store: &S,
    owner: Option<&str>,
    kind: ProductionType,
    range: DateRange,
    mode: ChartMode,
) -> Result<()> {
    let Some(owner) = owner else {
        println!("Please log in to view production analytics.");
        return Ok(());
    };

    let status = StatusLine::default();
    let mut live = LiveEntries::new(kind);
    live.start(store, owner, kind)?;
    live.pump(&status);
    let mut app = DashboardApp::new(&live, range, mode);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, store, &mut live, &status, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_loop<S: EntryStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: &S,
    live: &mut LiveEntries,
    status: &StatusLine,
    app: &mut DashboardApp,
) -> Result<()> {
    loop {
        if live.pump(status) {
            app.refresh(live);
        }

        terminal.draw(|f| ui(f, app, live, status))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Tab => app.next_mode(),
                        KeyCode::Char('r') => app.next_range(live),
                        KeyCode::Char('p') => {
                            if let Err(e) = live.switch_type(store, next_type(live.production_type())) {
                                status.show_toast(&e.to_string(), Severity::Error);
                            }
                            app.refresh(live);
                        }
                        // Other processes do not push to this subscription.
                        KeyCode::F(5) => {
                            if let Err(e) = live.switch_type(store, live.production_type()) {
                                status.show_toast(&e.to_string(), Severity::Error);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }
    Ok(())
}

fn ui(frame: &mut Frame, app: &DashboardApp, live: &LiveEntries, status: &StatusLine) {
    let size = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Chart + sidebar
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help
        ])
        .split(size);

    draw_header(frame, app, live, main_layout[0]);

    if live.is_loading() && live.entries().is_empty() {
        frame.render_widget(
            Paragraph::new("Loading production data...").alignment(Alignment::Center),
            main_layout[1],
        );
    } else if app.report.matched == 0 {
        frame.render_widget(
            Paragraph::new("No entries in this period").alignment(Alignment::Center),
            main_layout[1],
        );
    } else {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(70),
                Constraint::Length(1),
                Constraint::Percentage(30),
            ])
            .split(main_layout[1]);

        draw_chart(frame, app, content_chunks[0]);
        draw_side_panel(frame, &app.report, content_chunks[2]);
    }

    if let Some((message, severity)) = status.last.borrow().as_ref() {
        let color = match severity {
            Severity::Success => THEME.good,
            Severity::Info => THEME.text,
            Severity::Warning => THEME.warn,
            Severity::Error => THEME.bad,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message.clone(), Style::default().fg(color))),
            main_layout[2],
        );
    }

    let help = Line::from(vec![
        Span::styled("CHART: ", Style::default().fg(THEME.muted)),
        Span::styled("Tab ", Style::default().fg(THEME.text)),
        Span::raw("  "),
        Span::styled("RANGE: ", Style::default().fg(THEME.muted)),
        Span::styled("r ", Style::default().fg(THEME.text)),
        Span::raw("  "),
        Span::styled("TYPE: ", Style::default().fg(THEME.muted)),
        Span::styled("p ", Style::default().fg(THEME.text)),
        Span::raw("  "),
        Span::styled("RELOAD: ", Style::default().fg(THEME.muted)),
        Span::styled("F5 ", Style::default().fg(THEME.text)),
        Span::raw("  "),
        Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
        Span::styled("q", Style::default().fg(THEME.text)),
    ]);
    let footer = Paragraph::new(help).alignment(Alignment::Center);
    frame.render_widget(footer, main_layout[3]);
}

fn draw_header(frame: &mut Frame, app: &DashboardApp, live: &LiveEntries, area: Rect) {
    let header_block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(THEME.muted));

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(1), Constraint::Length(40)])
        .split(area);

    let title = Paragraph::new(Span::styled(
        live.production_type().label().to_uppercase(),
        Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(title, header_layout[0]);

    let selector = Line::from(vec![
        Span::styled(format!(" {} ", app.mode.title()), Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)),
        Span::styled(" | ", Style::default().fg(THEME.muted)),
        Span::styled(format!(" {} ", app.range.label()), Style::default().fg(THEME.text)),
    ]);
    let nav = Paragraph::new(selector)
        .alignment(Alignment::Right)
        .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(nav, header_layout[2]);

    frame.render_widget(header_block, area);
}

/// Bars carry tenths so fractional quantities still scale.
fn bars(points: &[ChartPoint], color: Color) -> Vec<Bar<'_>> {
    points
        .iter()
        .map(|p| {
            let value = (p.value.max(0.0) * 10.0).round() as u64;
            Bar::default()
                .label(truncate(&p.label, BAR_WIDTH as usize))
                .value(value)
                .style(Style::default().fg(color))
                .text_value(if p.value.fract() == 0.0 { format!("{}", p.value) } else { format!("{:.1}", p.value) })
        })
        .collect()
}

fn draw_chart(frame: &mut Frame, app: &DashboardApp, area: Rect) {
    let points = app.report.chart(app.mode);
    let color = match app.mode {
        ChartMode::Daily => THEME.primary,
        ChartMode::Efficiency => THEME.good,
        ChartMode::Quality => THEME.warn,
        ChartMode::Defects => THEME.bad,
    };
    let bar_items = bars(&points, color);

    let chart_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
        .title(format!(" {} ", app.mode.title()));

    let mut chart = BarChart::default()
        .block(chart_block)
        .bar_width(BAR_WIDTH)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bar_items));
    if app.mode == ChartMode::Efficiency {
        chart = chart.max(1000);
    }

    frame.render_widget(chart, area);
}

fn draw_side_panel(frame: &mut Frame, report: &ProductionReport, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Stats
            Constraint::Length(3),  // Efficiency gauge
            Constraint::Min(1),     // Grades
        ])
        .split(area);

    let stats = &report.stats;
    let kind = report.production_type;
    let label = |text: &'static str| Span::styled(text, Style::default().fg(THEME.muted));
    let value = |text: String, color: Color| Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD));

    let info_text = vec![
        Line::from(vec![Span::styled("Overview", Style::default().add_modifier(Modifier::BOLD))]),
        Line::from(""),
        Line::from(vec![label("Entries:    "), value(stats.total_entries.to_string(), THEME.text)]),
        Line::from(vec![
            label("Production: "),
            value(format!("{} {}", stats.total_production, kind.unit()), THEME.primary),
        ]),
        Line::from(vec![label("Grade A:    "), value(format!("{}%", stats.quality_grade_a_percent), THEME.good)]),
        Line::from(vec![label("Defects:    "), value(stats.total_defects.to_string(), THEME.bad)]),
        Line::from(vec![label("Avg hours:  "), value(format!("{:.1}", stats.avg_hours), THEME.text)]),
    ];

    let info_block = Paragraph::new(info_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(THEME.muted))
            .title(" Summary "),
    );
    frame.render_widget(info_block, chunks[0]);

    let ratio = (stats.avg_efficiency as f64 / 100.0).clamp(0.0, 1.0);
    let gauge_color = if stats.avg_efficiency >= 85 {
        THEME.good
    } else if stats.avg_efficiency >= 70 {
        THEME.warn
    } else {
        THEME.bad
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Avg Efficiency ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(THEME.muted)),
        )
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(ratio)
        .label(format!("{}%", stats.avg_efficiency));
    frame.render_widget(gauge, chunks[1]);

    let grades: Vec<Line> = report
        .distribution
        .iter()
        .map(|g| {
            Line::from(vec![
                Span::styled(format!("{:<26}", g.grade.label()), Style::default().fg(THEME.muted)),
                Span::styled(g.count.to_string(), Style::default().fg(THEME.text)),
            ])
        })
        .collect();
    let grade_block = Paragraph::new(grades).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(THEME.muted))
            .title(" Quality Grades "),
    );
    frame.render_widget(grade_block, chunks[2]);
}

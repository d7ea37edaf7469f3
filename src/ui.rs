use crate::assistant::{self, Answer, HINT};
use crate::dataset::Dataset;
use crate::report::AnalysisReport;
use crate::stats::GroupRate;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Departments,
    JobRoles,
    Overtime,
    Assistant,
}

impl Page {
    const ALL: [Page; 5] = [
        Page::Overview,
        Page::Departments,
        Page::JobRoles,
        Page::Overtime,
        Page::Assistant,
    ];

    fn index(&self) -> usize {
        Page::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Overview => "Overview",
            Page::Departments => "Departments",
            Page::JobRoles => "Job Roles",
            Page::Overtime => "Overtime",
            Page::Assistant => "Assistant",
        }
    }
}

pub struct App {
    pub dataset: Dataset,
    pub report: AnalysisReport,
    pub current_page: Page,
    pub department_state: TableState,
    pub job_role_state: TableState,
    pub input: String,
    pub answer: Option<Answer>,
}

impl App {
    pub fn new(dataset: Dataset, report: AnalysisReport) -> Self {
        let mut department_state = TableState::default();
        if !report.departments.is_empty() {
            department_state.select(Some(0));
        }

        let mut job_role_state = TableState::default();
        if !report.job_roles.is_empty() {
            job_role_state.select(Some(0));
        }

        Self {
            dataset,
            report,
            current_page: Page::Overview,
            department_state,
            job_role_state,
            input: String::new(),
            answer: None,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn active_table(&mut self) -> Option<(&mut TableState, usize)> {
        match self.current_page {
            Page::Departments => Some((&mut self.department_state, self.report.departments.len())),
            Page::JobRoles => Some((&mut self.job_role_state, self.report.job_roles.len())),
            _ => None,
        }
    }

    pub fn next(&mut self) {
        if let Some((state, len)) = self.active_table() {
            if len == 0 {
                return;
            }
            let i = match state.selected() {
                Some(i) if i + 1 < len => i + 1,
                _ => 0,
            };
            state.select(Some(i));
        }
    }

    pub fn previous(&mut self) {
        if let Some((state, len)) = self.active_table() {
            if len == 0 {
                return;
            }
            let i = match state.selected() {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            };
            state.select(Some(i));
        }
    }

    pub fn submit_question(&mut self) {
        let question = self.input.trim().to_string();
        self.answer = Some(assistant::answer(&self.dataset, &question));
        self.input.clear();
    }

    /// Apply a key press; returns true when the app should quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Esc => return true,
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Enter if self.current_page == Page::Assistant => self.submit_question(),
            KeyCode::Backspace if self.current_page == Page::Assistant => {
                self.input.pop();
            }
            KeyCode::Char(c) if self.current_page == Page::Assistant => {
                if modifiers.contains(KeyModifiers::CONTROL) && c == 'c' {
                    return true;
                }
                self.input.push(c);
            }
            KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            _ => {}
        }
        false
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, event::read);

    // Restore terminal before reporting a loop failure
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B, E>(terminal: &mut Terminal<B>, app: &mut App, mut next_event: E) -> io::Result<()>
where
    B: ratatui::backend::Backend,
    E: FnMut() -> io::Result<Event>,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = next_event()? {
            if app.handle_key(key.code, key.modifiers) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Overview => render_overview(f, chunks[1], app),
        Page::Departments => {
            let rows = app.report.departments.clone();
            render_group_table(f, chunks[1], " Attrition by Department ", &rows, &mut app.department_state)
        }
        Page::JobRoles => {
            let rows = app.report.job_roles.clone();
            render_group_table(f, chunks[1], " Attrition by Job Role ", &rows, &mut app.job_role_state)
        }
        Page::Overtime => render_overtime(f, chunks[1], app),
        Page::Assistant => render_assistant(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let kpis = &app.report.kpis;

    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Employees: {}", kpis.total_employees),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Attrition: {} ({:.1}%)", kpis.attrition_count, kpis.attrition_rate),
        Style::default().fg(Color::Magenta),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn kpi_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {:<22}", label),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

fn render_overview(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let kpis = &app.report.kpis;
    let focus = &app.report.risk_focus;

    let kpi_lines = vec![
        Line::from(""),
        kpi_line("Total employees", kpis.total_employees.to_string(), Color::White),
        kpi_line(
            "Attrition rate",
            format!("{:.1}% ({} left)", kpis.attrition_rate, kpis.attrition_count),
            Color::Magenta,
        ),
        kpi_line("Average age", or_na(kpis.avg_age.map(|v| format!("{:.1}", v))), Color::Yellow),
        kpi_line("Avg monthly income", or_na(kpis.avg_income), Color::Green),
        kpi_line("Avg years at company", or_na(kpis.avg_years_at_company.map(|v| format!("{:.1}", v))), Color::White),
        kpi_line("Overtime share", or_na(kpis.overtime_pct.map(|v| format!("{:.1}%", v))), Color::White),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        kpi_line(
            "Highest stress dept",
            or_na(focus.department.as_ref().map(|g| g.group.clone())),
            Color::Red,
        ),
        kpi_line(
            "Critical role cluster",
            or_na(focus.job_role.as_ref().map(|g| g.group.clone())),
            Color::Red,
        ),
    ];

    let kpi_panel = Paragraph::new(kpi_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Key workforce indicators "),
    );
    f.render_widget(kpi_panel, columns[0]);

    let mut story: Vec<Line> = vec![Line::from("")];
    for line in app.report.story() {
        story.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(Color::Cyan)),
            Span::raw(line),
        ]));
    }

    let story_panel = Paragraph::new(story)
        .wrap(ratatui::widgets::Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Workforce story "),
        );
    f.render_widget(story_panel, columns[1]);
}

fn rate_color(rate: f64) -> Color {
    if rate >= 25.0 {
        Color::Red
    } else if rate >= 15.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn render_group_table(f: &mut Frame, area: Rect, title: &str, groups: &[GroupRate], state: &mut TableState) {
    let header_cells = ["Group", "Employees", "Left", "Attrition %"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = groups.iter().map(|g| {
        let color = rate_color(g.rate);
        Row::new(vec![
            Cell::from(truncate(&g.group, 30)),
            Cell::from(g.total.to_string()),
            Cell::from(g.left.to_string()),
            Cell::from(format!("{:.1}", g.rate)).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title.to_string()),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, state);
}

fn render_overtime(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Overtime vs Attrition ");

    let Some(tab) = &app.report.overtime else {
        f.render_widget(
            Paragraph::new("  Need OverTime and Attrition columns for this panel.").block(block),
            area,
        );
        return;
    };

    let mut header_cells = vec![Cell::from(tab.row_column.clone())];
    header_cells.extend(
        tab.cols
            .iter()
            .map(|c| Cell::from(format!("{} = {}", tab.col_column, c))),
    );
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray).fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .height(1);

    let rows = tab.rows.iter().zip(&tab.counts).map(|(label, counts)| {
        let mut cells = vec![Cell::from(label.clone())];
        cells.extend(counts.iter().map(|n| Cell::from(n.to_string())));
        Row::new(cells).height(1)
    });

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(16))
        .chain(tab.cols.iter().map(|_| Constraint::Length(20)))
        .collect();

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}

fn render_assistant(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Yellow)),
        Span::raw(app.input.clone()),
        Span::styled("█", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Ask (e.g. 'high risk jobs', 'overtime') "),
    );
    f.render_widget(input, chunks[0]);

    let text = match &app.answer {
        Some(answer) => answer.to_string(),
        None => HINT.to_string(),
    };
    let lines: Vec<Line> = text.lines().map(|l| Line::from(format!("  {}", l))).collect();

    let output = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Answer "),
    );
    f.render_widget(output, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![
        Span::styled(
            format!(" {} ", app.current_page.title()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
    ];

    if app.current_page == Page::Assistant {
        status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Ask | "));
        status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    } else {
        status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Nav | "));
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crossterm::event::KeyEvent;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let csv = "Attrition,Department,OverTime\nYes,Sales,Yes\nNo,Sales,No\nNo,HR,No\n";
        let ds = Dataset::from_reader(csv.as_bytes(), "tui").unwrap();
        let report = AnalysisReport::build(&ds, &AnalysisConfig::default()).unwrap();
        App::new(ds, report)
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Overview.next(), Page::Departments);
        assert_eq!(Page::Assistant.next(), Page::Overview);
        assert_eq!(Page::Overview.previous(), Page::Assistant);
    }

    #[test]
    fn test_table_navigation_wraps() {
        let mut app = app();
        app.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(app.current_page, Page::Departments);
        assert_eq!(app.department_state.selected(), Some(0));

        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(app.department_state.selected(), Some(1));
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(app.department_state.selected(), Some(0));
        app.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(app.department_state.selected(), Some(1));
    }

    #[test]
    fn test_assistant_input() {
        let mut app = app();
        app.handle_key(KeyCode::BackTab, KeyModifiers::NONE);
        assert_eq!(app.current_page, Page::Assistant);

        // 'q' is text on the assistant page
        for c in "overtimeq".chars() {
            assert!(!app.handle_key(KeyCode::Char(c), KeyModifiers::NONE));
        }
        app.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.input, "overtime");

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.input.is_empty());
        assert!(matches!(app.answer, Some(Answer::Counts { .. })));

        assert!(app.handle_key(KeyCode::Esc, KeyModifiers::NONE));
    }

    #[test]
    fn test_quit_outside_assistant() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
    }

    fn key(code: KeyCode) -> io::Result<Event> {
        Ok(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn test_run_app_walks_pages_until_quit() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut events = vec![key(KeyCode::Tab), key(KeyCode::Tab), key(KeyCode::Char('q'))].into_iter();

        run_app(&mut terminal, &mut app, || events.next().unwrap()).unwrap();
        assert_eq!(app.current_page, Page::JobRoles);
    }

    #[test]
    fn test_run_app_returns_event_errors() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut events = vec![
            key(KeyCode::Tab),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone")),
        ]
        .into_iter();

        let err = run_app(&mut terminal, &mut app, || events.next().unwrap()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(app.current_page, Page::Departments);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Research & Development", 30), "Research & Development");
        assert_eq!(truncate("Healthcare Representative", 10), "Healthc...");
    }
}

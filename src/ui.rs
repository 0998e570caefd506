use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs},
    Frame, Terminal,
};
use std::io;
use std::sync::mpsc::Receiver;

use fridge_manager::form::{format_quantity, ItemForm};
use fridge_manager::view::{row_ids, zone_summaries};
use fridge_manager::{
    InventoryError, InventoryItem, InventoryStore, ItemRow, ListView, StorageZone, StoreChange,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Inventory,
    Settings,
}

/// Form field order in the popup
const FORM_FIELDS: [&str; 6] = ["Name", "Expiry (YYYY-MM-DD)", "Quantity", "Unit", "Category", "Zone"];

#[derive(Debug, Clone)]
pub struct FormState {
    pub form: ItemForm,
    /// None when adding
    pub editing: Option<InventoryItem>,
    pub field: usize,
    pub errors: Vec<String>,
}

impl FormState {
    fn value_mut(&mut self) -> Option<&mut String> {
        match self.field {
            0 => Some(&mut self.form.name),
            1 => Some(&mut self.form.expiry_date),
            2 => Some(&mut self.form.quantity),
            3 => Some(&mut self.form.unit),
            // category and zone are picked, not typed
            _ => None,
        }
    }

    fn values(&self) -> [&str; 6] {
        [
            &self.form.name,
            &self.form.expiry_date,
            &self.form.quantity,
            &self.form.unit,
            &self.form.category,
            &self.form.storage_zone,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    DeleteItems(Vec<String>),
    DeleteCategory(String),
}

#[derive(Debug, Clone)]
pub enum Mode {
    Normal,
    Form(FormState),
    Confirm { prompt: String, action: PendingAction },
    CategoryInput(String),
}

pub struct App {
    pub store: InventoryStore,
    pub view: ListView,
    pub rows: Vec<ItemRow>,
    pub state: TableState,
    pub current_page: Page,
    pub mode: Mode,
    pub category_state: TableState,
    pub status: Option<String>,
    pub today: NaiveDate,
    changes: Receiver<StoreChange>,
}

impl App {
    pub fn new(mut store: InventoryStore) -> Self {
        let changes = store.subscribe();
        let mut app = Self {
            store,
            view: ListView::new(StorageZone::Cold),
            rows: Vec::new(),
            state: TableState::default(),
            current_page: Page::Inventory,
            mode: Mode::Normal,
            category_state: TableState::default(),
            status: None,
            today: Local::now().date_naive(),
            changes,
        };
        app.category_state.select(Some(0));
        app.refresh();
        app
    }

    /// Recompute rows after any store or view change
    pub fn refresh(&mut self) {
        self.rows = self
            .view
            .rows(self.store.items(), self.store.settings().reminder_days, self.today);

        let selected = match self.state.selected() {
            _ if self.rows.is_empty() => None,
            Some(i) if i >= self.rows.len() => Some(self.rows.len() - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        self.state.select(selected);

        let categories = self.store.settings().custom_categories.len();
        if let Some(i) = self.category_state.selected() {
            if i >= categories {
                self.category_state.select(categories.checked_sub(1));
            }
        }
    }

    pub fn selected_row(&self) -> Option<&ItemRow> {
        self.state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn next(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn switch_zone(&mut self, zone: StorageZone) {
        self.view.set_zone(zone);
        self.state.select(Some(0));
        self.refresh();
    }

    fn report(&mut self, result: std::result::Result<String, InventoryError>) {
        self.status = Some(match result {
            Ok(message) => message,
            Err(e) => format!("✗ {}", e),
        });
    }

    /// Rebuild rows once if the store changed since the last key
    fn apply_store_changes(&mut self) {
        if self.changes.try_iter().count() > 0 {
            self.refresh();
        }
    }

    // ========================================================================
    // KEY HANDLING
    // ========================================================================

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let quit = match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => match self.current_page {
                Page::Inventory => self.handle_inventory_key(key),
                Page::Settings => {
                    self.handle_settings_key(key);
                    false
                }
            },
            Mode::Form(form) => {
                self.handle_form_key(form, key);
                false
            }
            Mode::Confirm { prompt, action } => {
                self.handle_confirm_key(prompt, action, key);
                false
            }
            Mode::CategoryInput(input) => {
                self.handle_category_input(input, key);
                false
            }
        };

        self.apply_store_changes();
        quit
    }

    fn handle_inventory_key(&mut self, key: KeyEvent) -> bool {
        self.status = None;
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc if self.view.batch_mode() => self.view.toggle_batch_mode(),
            KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Right => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.switch_zone(self.view.zone().previous());
                } else {
                    self.switch_zone(self.view.zone().next());
                }
            }
            KeyCode::BackTab | KeyCode::Left => self.switch_zone(self.view.zone().previous()),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => self.state.select(if self.rows.is_empty() { None } else { Some(0) }),
            KeyCode::End => self.state.select(self.rows.len().checked_sub(1)),
            KeyCode::Char('f') => {
                let next = self.view.category().cycle(&self.store.settings().custom_categories);
                self.view.set_category(next);
                self.refresh();
            }
            KeyCode::Char('s') => {
                self.view.set_sort_key(self.view.sort_key().toggle());
                self.refresh();
            }
            KeyCode::Char('n') => {
                self.mode = Mode::Form(FormState {
                    form: ItemForm::blank(self.view.zone(), self.store.settings()),
                    editing: None,
                    field: 0,
                    errors: Vec::new(),
                });
            }
            KeyCode::Char('e') | KeyCode::Enter if !self.view.batch_mode() => {
                if let Some(row) = self.selected_row() {
                    let item = row.item.clone();
                    self.mode = Mode::Form(FormState {
                        form: ItemForm::from_item(&item),
                        editing: Some(item),
                        field: 0,
                        errors: Vec::new(),
                    });
                }
            }
            KeyCode::Char('b') => self.view.toggle_batch_mode(),
            KeyCode::Char(' ') | KeyCode::Enter if self.view.batch_mode() => {
                if let Some(id) = self.selected_row().map(|r| r.item.id.clone()) {
                    self.view.toggle_selection(&id);
                    self.next();
                }
            }
            KeyCode::Char('a') if self.view.batch_mode() => {
                let rows = self.rows.clone();
                self.view.toggle_select_all(&rows);
            }
            KeyCode::Char('d') if self.view.batch_mode() => {
                let count = self.view.selected().len();
                if count == 0 {
                    self.status = Some("Nothing selected".to_string());
                } else {
                    self.mode = Mode::Confirm {
                        prompt: format!("Delete the {} selected items? This cannot be undone.", count),
                        action: PendingAction::DeleteItems(self.view.selected().iter().cloned().collect()),
                    };
                }
            }
            KeyCode::Char('d') => {
                if let Some((id, name)) = self.selected_row().map(|r| (r.item.id.clone(), r.item.name.clone())) {
                    self.mode = Mode::Confirm {
                        prompt: format!("Delete {}?", name),
                        action: PendingAction::DeleteItems(vec![id]),
                    };
                }
            }
            KeyCode::Char('x') => {
                let expired = self.view.expired_rows(&self.rows);
                if expired.is_empty() {
                    self.status = Some("No expired items here".to_string());
                } else {
                    let names: Vec<String> = expired
                        .iter()
                        .map(|r| format!("{} ({})", r.item.name, r.item.expiry_date))
                        .collect();
                    self.mode = Mode::Confirm {
                        prompt: format!(
                            "Delete {} expired items?\n{}",
                            expired.len(),
                            names.join("\n")
                        ),
                        action: PendingAction::DeleteItems(row_ids(&expired)),
                    };
                }
            }
            KeyCode::Char('X') => match self.view.category_rows(&self.rows) {
                Err(e) => self.status = Some(format!("✗ {}", e)),
                Ok(rows) if rows.is_empty() => {
                    self.status = Some(format!("{} has no items here", self.view.category()));
                }
                Ok(rows) => {
                    self.mode = Mode::Confirm {
                        prompt: format!(
                            "Delete all {} items of '{}'? This cannot be undone.",
                            rows.len(),
                            self.view.category()
                        ),
                        action: PendingAction::DeleteItems(row_ids(&rows)),
                    };
                }
            },
            KeyCode::Char('o') => self.current_page = Page::Settings,
            _ => {}
        }
        false
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        self.status = None;
        let categories = self.store.settings().custom_categories.clone();
        match key.code {
            KeyCode::Esc | KeyCode::Char('o') | KeyCode::Char('q') => {
                self.current_page = Page::Inventory;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let days = i64::from(self.store.settings().reminder_days) + 1;
                let result = self
                    .store
                    .update_reminder_days(days)
                    .map(|d| format!("✓ Reminder window: {} days", d));
                self.report(result);
            }
            KeyCode::Char('-') => {
                let days = i64::from(self.store.settings().reminder_days) - 1;
                let result = self
                    .store
                    .update_reminder_days(days)
                    .map(|d| format!("✓ Reminder window: {} days", d));
                self.report(result);
            }
            KeyCode::Down | KeyCode::Char('j') if !categories.is_empty() => {
                let i = self.category_state.selected().map_or(0, |i| (i + 1) % categories.len());
                self.category_state.select(Some(i));
            }
            KeyCode::Up | KeyCode::Char('k') if !categories.is_empty() => {
                let i = match self.category_state.selected() {
                    Some(0) | None => categories.len() - 1,
                    Some(i) => i - 1,
                };
                self.category_state.select(Some(i));
            }
            KeyCode::Char('n') => self.mode = Mode::CategoryInput(String::new()),
            KeyCode::Char('d') => {
                if let Some(name) = self.category_state.selected().and_then(|i| categories.get(i)) {
                    if self.store.can_delete_category(name) {
                        self.mode = Mode::Confirm {
                            prompt: format!("Delete category '{}'?", name),
                            action: PendingAction::DeleteCategory(name.clone()),
                        };
                    } else {
                        self.status = Some(format!(
                            "✗ '{}' is in use or is the last category",
                            name
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, mut form: FormState, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                match form.form.submit(&mut self.store, form.editing.as_ref()) {
                    Ok(item) => {
                        let verb = if form.editing.is_some() { "Updated" } else { "Added" };
                        self.report(Ok(format!("✓ {} {}", verb, item.name)));
                        return;
                    }
                    Err(InventoryError::Validation(errors)) => {
                        form.errors = errors.iter().map(|e| e.to_string()).collect();
                    }
                    Err(e) => form.errors = vec![e.to_string()],
                }
            }
            KeyCode::Tab | KeyCode::Down => form.field = (form.field + 1) % FORM_FIELDS.len(),
            KeyCode::BackTab | KeyCode::Up => {
                form.field = (form.field + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
            }
            KeyCode::Left | KeyCode::Right if form.field >= 4 => {
                let forward = key.code == KeyCode::Right;
                if form.field == 4 {
                    let categories = &self.store.settings().custom_categories;
                    form.form.category = cycle_option(categories, &form.form.category, forward);
                } else {
                    let zone = form.form.storage_zone.parse::<StorageZone>().unwrap_or_default();
                    let zone = if forward { zone.next() } else { zone.previous() };
                    form.form.storage_zone = zone.as_str().to_string();
                }
            }
            KeyCode::Backspace => {
                if let Some(value) = form.value_mut() {
                    value.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(value) = form.value_mut() {
                    value.push(c);
                }
            }
            _ => {}
        }
        self.mode = Mode::Form(form);
    }

    fn handle_confirm_key(&mut self, prompt: String, action: PendingAction, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                let result = match action {
                    PendingAction::DeleteItems(ids) => {
                        // a confirmed batch also ends batch mode
                        if self.view.batch_mode() {
                            let _ = self.view.take_batch();
                        }
                        self.store
                            .delete_items(&ids)
                            .map(|n| format!("✓ Deleted {} items", n))
                    }
                    PendingAction::DeleteCategory(name) => self
                        .store
                        .delete_category(&name)
                        .map(|_| format!("✓ Deleted category {}", name)),
                };
                self.report(result);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.status = Some("Cancelled".to_string());
            }
            _ => self.mode = Mode::Confirm { prompt, action },
        }
    }

    fn handle_category_input(&mut self, mut input: String, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {}
            KeyCode::Enter => {
                let result = self.store.add_category(&input).map(|added| {
                    if added {
                        format!("✓ Added category {}", input.trim())
                    } else {
                        format!("{} already exists", input.trim())
                    }
                });
                self.report(result);
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::CategoryInput(input);
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::CategoryInput(input);
            }
            _ => self.mode = Mode::CategoryInput(input),
        }
    }
}

fn cycle_option(options: &[String], current: &str, forward: bool) -> String {
    if options.is_empty() {
        return current.to_string();
    }
    let len = options.len();
    let next = match options.iter().position(|o| o == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    options[next].clone()
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Zone tabs
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Inventory => render_table(f, chunks[1], app),
        Page::Settings => render_settings(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    match &app.mode {
        Mode::Normal => {}
        Mode::Form(form) => render_form(f, form, app),
        Mode::Confirm { prompt, .. } => render_confirm(f, prompt),
        Mode::CategoryInput(input) => render_category_input(f, input),
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let summaries = zone_summaries(app.store.items(), app.store.settings().reminder_days, app.today);

    let titles: Vec<Line> = summaries
        .iter()
        .map(|s| {
            let mut spans = vec![Span::raw(format!("{} {} ({})", s.zone.icon(), s.label, s.total))];
            if s.near_expiry > 0 {
                spans.push(Span::styled(
                    format!(" ⚠{}", s.near_expiry),
                    Style::default().fg(Color::Yellow),
                ));
            }
            Line::from(spans)
        })
        .collect();

    let selected = StorageZone::ALL
        .iter()
        .position(|z| *z == app.view.zone())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .divider(" │ ")
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Fridge Manager "),
        );

    f.render_widget(tabs, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let batch = app.view.batch_mode();

    let header_cells = ["", "Name", "Qty", "Unit", "Category", "Expires", "Left"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.rows.iter().map(|row| {
        let color = if row.is_expired {
            Color::Red
        } else if row.is_warning {
            Color::Yellow
        } else {
            Color::White
        };

        let mark = if batch {
            if app.view.is_selected(&row.item.id) { "[x]" } else { "[ ]" }
        } else if row.is_warning {
            "⚠"
        } else {
            ""
        };

        let cells = vec![
            Cell::from(mark),
            Cell::from(truncate(&row.item.name, 28)),
            Cell::from(format_quantity(row.item.quantity)),
            Cell::from(truncate(&row.item.unit, 8)),
            Cell::from(truncate(&row.item.category, 14)),
            Cell::from(row.item.expiry_date.to_string()),
            Cell::from(format!("{}d", row.days_left)),
        ];

        Row::new(cells).style(Style::default().fg(color)).height(1)
    });

    let title = format!(
        " {} | category: {} | sort: {}{} ",
        app.view.zone().label(),
        app.view.category(),
        app.view.sort_key().label(),
        if batch {
            format!(" | BATCH ({} selected)", app.view.selected().len())
        } else {
            String::new()
        }
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(30),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_settings(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let settings = app.store.settings();
    let font = settings
        .font_size
        .map(|s| s.to_string())
        .unwrap_or_else(|| "system".to_string());

    let general = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("  Reminder window: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(format!("{} days", settings.reminder_days)),
            Span::styled("   (+/-)", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled("  Font size: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(font),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Settings "),
    );
    f.render_widget(general, chunks[0]);

    let rows: Vec<Row> = settings
        .custom_categories
        .iter()
        .map(|name| {
            let used = app.store.has_category_inventory(name);
            Row::new(vec![
                Cell::from(name.clone()),
                Cell::from(if used { "in use" } else { "" }).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(24), Constraint::Length(8)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Categories (n add, d delete) "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut app.category_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if let Some(message) = &app.status {
        status_spans.push(Span::styled(format!(" {} ", message), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw("|"));
    }

    let keys: &[(&str, &str)] = match (app.current_page, app.view.batch_mode()) {
        (Page::Settings, _) => &[("+/-", "Days"), ("n", "Add"), ("d", "Delete"), ("Esc", "Back")],
        (Page::Inventory, true) => &[("Space", "Select"), ("a", "All"), ("d", "Delete"), ("Esc", "Exit batch")],
        (Page::Inventory, false) => &[
            ("Tab", "Zone"),
            ("n", "New"),
            ("e", "Edit"),
            ("d", "Delete"),
            ("f", "Category"),
            ("s", "Sort"),
            ("b", "Batch"),
            ("x/X", "Purge"),
            ("o", "Settings"),
            ("q", "Quit"),
        ],
    };

    for (key, label) in keys {
        status_spans.push(Span::raw(" "));
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(format!(" {} ", label)));
    }

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_form(f: &mut Frame, form: &FormState, app: &App) {
    let area = centered_rect(60, 60, f.size());
    let title = if form.editing.is_some() { " Edit Item " } else { " New Item " };

    let mut lines = vec![Line::from("")];
    for (i, (label, value)) in FORM_FIELDS.iter().zip(form.values()).enumerate() {
        let active = i == form.field;
        let label_style = if active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let shown = if i >= 4 {
            format!("◀ {} ▶", value)
        } else if active {
            format!("{}_", value)
        } else {
            value.to_string()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<22}", label), label_style),
            Span::raw(shown),
        ]));
    }

    lines.push(Line::from(""));
    for error in &form.errors {
        lines.push(Line::from(Span::styled(format!("  ✗ {}", error), Style::default().fg(Color::Red))));
    }
    if app.store.settings().custom_categories.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Add a category in settings first",
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        "  Tab/↑↓ field  ←→ pick  Enter save  Esc cancel",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn render_confirm(f: &mut Frame, prompt: &str) {
    let area = centered_rect(50, 40, f.size());

    let mut lines: Vec<Line> = vec![Line::from("")];
    lines.extend(prompt.lines().map(|l| Line::from(format!("  {}", l))));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" confirm   "),
        Span::styled("n", Style::default().fg(Color::Yellow)),
        Span::raw(" cancel"),
    ]));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Confirm "),
    );

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn render_category_input(f: &mut Frame, input: &str) {
    let area = centered_rect(40, 20, f.size());

    let popup = Paragraph::new(vec![
        Line::from(""),
        Line::from(format!("  {}_", input)),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" New Category "),
    );

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use rusqlite::Connection;

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn test_app() -> App {
        let store = InventoryStore::open(Connection::open_in_memory().unwrap()).unwrap();
        let mut app = App::new(store);
        app.today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        app.refresh();
        app
    }

    fn add_via_form(app: &mut App, name: &str, expiry: &str) {
        press(app, KeyCode::Char('n'));
        type_text(app, name);
        press(app, KeyCode::Tab);
        type_text(app, expiry);
        press(app, KeyCode::Tab);
        press(app, KeyCode::Tab);
        type_text(app, "pc");
        press(app, KeyCode::Enter);
    }

    #[test]
    fn test_form_adds_item_to_current_zone() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab); // Frozen
        add_via_form(&mut app, "Peas", "2027-01-01");

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.rows[0].item.storage_zone, StorageZone::Frozen);
        assert_eq!(app.rows[0].item.category, "Meat");
    }

    #[test]
    fn test_invalid_form_stays_open_with_errors() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);

        match &app.mode {
            Mode::Form(form) => assert_eq!(form.errors.len(), 3), // name, expiry, unit
            other => panic!("expected form, got {:?}", other),
        }
        assert!(app.store.items().is_empty());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = test_app();
        add_via_form(&mut app, "Milk", "2026-10-18");

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.rows.len(), 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.rows.is_empty());
    }

    #[test]
    fn test_batch_select_all_and_delete() {
        let mut app = test_app();
        add_via_form(&mut app, "A", "2026-10-18");
        add_via_form(&mut app, "B", "2026-10-19");

        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.view.selected().len(), 2);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Enter);

        assert!(app.store.items().is_empty());
        assert!(!app.view.batch_mode());
    }

    #[test]
    fn test_purge_expired_only_hits_expired_rows() {
        let mut app = test_app();
        add_via_form(&mut app, "Old", "2026-10-01");
        add_via_form(&mut app, "Fresh", "2026-12-01");

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('y'));

        let names: Vec<&str> = app.store.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Fresh"]);
    }

    #[test]
    fn test_settings_page_adjusts_reminder_and_categories() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.store.settings().reminder_days, 4);

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Fruit");
        press(&mut app, KeyCode::Enter);
        assert!(app.store.settings().has_category("Fruit"));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.current_page, Page::Inventory);
    }

    #[test]
    fn test_rows_follow_store_changes() {
        let mut app = test_app();
        let item = app
            .store
            .add_item(fridge_manager::NewItem {
                name: "Yogurt".to_string(),
                expiry_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
                quantity: 1.0,
                unit: "cup".to_string(),
                category: "Dairy".to_string(),
                storage_zone: StorageZone::Cold,
            })
            .unwrap();
        assert!(app.rows.is_empty());

        press(&mut app, KeyCode::Null);
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.rows[0].item.id, item.id);
    }

    #[test]
    fn test_draws_every_mode_without_panicking() {
        let mut app = test_app();
        add_via_form(&mut app, "Milk", "2026-10-17");
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| ui(f, &mut app)).unwrap();
        press(&mut app, KeyCode::Char('e'));
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('d'));
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('o'));
        terminal.draw(|f| ui(f, &mut app)).unwrap();
    }
}

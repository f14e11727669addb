use crate::db::store::KeyValueStore;
use crate::ledger::{Confirmation, Ledger};
use crate::models::category::all_categories;
use crate::models::transaction::{Transaction, TransactionType};
use crate::operations::aggregate::{balance, monthly_summary, totals};
use crate::operations::filter::{filter_transactions, sort_by_date_desc, FilterCriteria};
use crate::operations::format::{format_currency, format_date, format_month, format_naive_date};
use crate::operations::render::{transaction_cells, truncate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::{Alignment, Color, Constraint, Direction, Layout, Rect, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use std::cmp::{max, min};
use std::collections::HashMap;
use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    List,
    Details,
    CategoryInput,
    Confirm(PendingAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingAction {
    Delete(String),
    ClearAll,
}

struct BrowseState {
    mode: Mode,

    visible_ids: Vec<String>,
    // Positions of `visible_ids` in the ledger slice they were computed from
    visible_rows: Vec<usize>,
    table_state: TableState,

    filter: FilterCriteria,
    show_summary: bool,

    input_buffer: String,
    notice: Option<(String, bool)>,

    // Cached per-draw
    last_page_size: usize,
}

impl BrowseState {
    fn new(transactions: &[Transaction]) -> Self {
        let mut state = Self {
            mode: Mode::List,
            visible_ids: Vec::new(),
            visible_rows: Vec::new(),
            table_state: TableState::default(),
            filter: FilterCriteria::default(),
            show_summary: false,
            input_buffer: String::new(),
            notice: None,
            last_page_size: 10,
        };
        state.recompute(transactions);
        state
    }

    fn recompute(&mut self, transactions: &[Transaction]) {
        let positions: HashMap<&str, usize> = transactions
            .iter()
            .enumerate()
            .map(|(index, t)| (t.id.as_str(), index))
            .collect();
        let visible = sort_by_date_desc(filter_transactions(transactions, &self.filter));
        self.visible_rows = visible
            .iter()
            .filter_map(|t| positions.get(t.id.as_str()).copied())
            .collect();
        self.visible_ids = visible.into_iter().map(|t| t.id.clone()).collect();

        if self.visible_ids.is_empty() {
            self.table_state.select(None);
        } else {
            let new_selected = match self.table_state.selected() {
                Some(sel) => min(sel, self.visible_ids.len().saturating_sub(1)),
                None => 0,
            };
            self.table_state.select(Some(new_selected));
        }
    }

    fn selected_id(&self) -> Option<&str> {
        let selected = self.table_state.selected()?;
        self.visible_ids.get(selected).map(String::as_str)
    }

    fn move_selection(&mut self, delta: i32) {
        if self.visible_ids.is_empty() {
            self.table_state.select(None);
            return;
        }

        let current = self.table_state.selected().unwrap_or(0) as i32;
        let max_index = self.visible_ids.len().saturating_sub(1) as i32;
        let next = (current + delta).clamp(0, max_index) as usize;
        self.table_state.select(Some(next));
    }

    fn page_up(&mut self) {
        let page = max(1, self.last_page_size) as i32;
        self.move_selection(-page);
    }

    fn page_down(&mut self) {
        let page = max(1, self.last_page_size) as i32;
        self.move_selection(page);
    }

    fn cycle_type_filter(&mut self, transactions: &[Transaction]) {
        self.filter.transaction_type = match self.filter.transaction_type {
            None => Some(TransactionType::Expense),
            Some(TransactionType::Expense) => Some(TransactionType::Income),
            Some(TransactionType::Income) => None,
        };
        self.recompute(transactions);
    }

    fn clear_filters(&mut self, transactions: &[Transaction]) {
        self.filter = FilterCriteria::default();
        self.recompute(transactions);
    }

    fn start_category_input(&mut self) {
        self.input_buffer = self.filter.category.clone().unwrap_or_default();
        self.mode = Mode::CategoryInput;
    }

    fn commit_category_input(&mut self, transactions: &[Transaction]) {
        let raw = self.input_buffer.trim();
        self.filter.category = if raw.is_empty() {
            None
        } else {
            // Pick the vocabulary spelling when the user typed a known name.
            let canonical = all_categories()
                .into_iter()
                .find(|c| c.eq_ignore_ascii_case(raw))
                .unwrap_or(raw);
            Some(canonical.to_string())
        };
        self.mode = Mode::List;
        self.recompute(transactions);
    }

    fn request(&mut self, action: PendingAction) {
        self.mode = Mode::Confirm(action);
    }

    fn resolve<S: KeyValueStore>(&mut self, ledger: &mut Ledger<S>, confirmation: Confirmation) {
        let action = match std::mem::replace(&mut self.mode, Mode::List) {
            Mode::Confirm(action) => action,
            other => {
                self.mode = other;
                return;
            }
        };

        let result = match action {
            PendingAction::Delete(ref id) => ledger.remove(id, confirmation),
            PendingAction::ClearAll => ledger.clear(confirmation),
        };
        self.notice = match result {
            Ok(true) => Some((
                match action {
                    PendingAction::Delete(_) => "Transaction deleted successfully!".to_string(),
                    PendingAction::ClearAll => "All data cleared successfully!".to_string(),
                },
                false,
            )),
            Ok(false) => None,
            Err(e) => Some((e.to_string(), true)),
        };
        self.recompute(ledger.transactions());
    }
}

pub fn run_browse<S: KeyValueStore>(ledger: &mut Ledger<S>) -> Result<(), String> {
    enable_raw_mode().map_err(|e| format!("Failed to enable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| format!("Failed to enter alternate screen: {}", e))?;

    let result = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)
            .map_err(|e| format!("Failed to initialize terminal: {}", e))?;

        let mut state = BrowseState::new(ledger.transactions());

        loop {
            terminal
                .draw(|frame| {
                    let size = frame.area();
                    let layout = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([
                            Constraint::Length(3),
                            Constraint::Min(5),
                            Constraint::Length(3),
                        ])
                        .split(size);

                    render_header(frame, layout[0], ledger.transactions(), &state);
                    if state.show_summary {
                        let body = Layout::default()
                            .direction(Direction::Horizontal)
                            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                            .split(layout[1]);
                        render_table(frame, body[0], ledger.transactions(), &mut state);
                        render_summary(frame, body[1], ledger.transactions());
                    } else {
                        render_table(frame, layout[1], ledger.transactions(), &mut state);
                    }
                    render_footer(frame, layout[2], &state);

                    match state.mode {
                        Mode::CategoryInput => render_input_modal(frame, size, &state),
                        Mode::Details => render_details_modal(frame, size, ledger, &state),
                        Mode::Confirm(ref action) => render_confirm_modal(frame, size, action),
                        Mode::List => {}
                    }
                })
                .map_err(|e| format!("Failed to draw terminal UI: {}", e))?;

            if event::poll(std::time::Duration::from_millis(200))
                .map_err(|e| format!("Failed to poll input: {}", e))?
            {
                let event = event::read().map_err(|e| format!("Failed to read input: {}", e))?;
                if let Event::Key(key) = event {
                    if handle_key(ledger, &mut state, key) {
                        break;
                    }
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode().map_err(|e| format!("Failed to disable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)
        .map_err(|e| format!("Failed to leave alternate screen: {}", e))?;

    result
}

/// Returns `true` when the browser should exit.
fn handle_key<S: KeyValueStore>(ledger: &mut Ledger<S>, state: &mut BrowseState, key: KeyEvent) -> bool {
    // Many terminals emit both a Press and a Release event. Only act on Press/Repeat.
    if key.kind == KeyEventKind::Release {
        return false;
    }

    match state.mode {
        Mode::List => {
            state.notice = None;
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return true,
                KeyCode::Up => state.move_selection(-1),
                KeyCode::Down => state.move_selection(1),
                KeyCode::PageUp => state.page_up(),
                KeyCode::PageDown => state.page_down(),
                KeyCode::Home => state.move_selection(i32::MIN / 2),
                KeyCode::End => state.move_selection(i32::MAX / 2),
                KeyCode::Enter => {
                    if state.selected_id().is_some() {
                        state.mode = Mode::Details;
                    }
                }
                KeyCode::Char('c') => state.start_category_input(),
                KeyCode::Char('t') => state.cycle_type_filter(ledger.transactions()),
                KeyCode::Char('x') => state.clear_filters(ledger.transactions()),
                KeyCode::Char('m') => state.show_summary = !state.show_summary,
                KeyCode::Char('d') | KeyCode::Delete => {
                    if let Some(id) = state.selected_id().map(str::to_string) {
                        state.request(PendingAction::Delete(id));
                    }
                }
                KeyCode::Char('X') => state.request(PendingAction::ClearAll),
                _ => {}
            }
        }
        Mode::Details => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => state.mode = Mode::List,
            KeyCode::Char('d') => {
                if let Some(id) = state.selected_id().map(str::to_string) {
                    state.request(PendingAction::Delete(id));
                }
            }
            _ => {}
        },
        Mode::CategoryInput => {
            // Allow Ctrl+C / Ctrl+Q to cancel
            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
            {
                state.mode = Mode::List;
                return false;
            }

            match key.code {
                KeyCode::Esc => state.mode = Mode::List,
                KeyCode::Enter => state.commit_category_input(ledger.transactions()),
                KeyCode::Backspace => {
                    state.input_buffer.pop();
                }
                KeyCode::Char(ch) => state.input_buffer.push(ch),
                _ => {}
            }
        }
        Mode::Confirm(_) => {
            let confirmation = match key.code {
                KeyCode::Char(ch) => Confirmation::from_answer(&ch.to_string()),
                _ => Confirmation::Declined,
            };
            state.resolve(ledger, confirmation);
        }
    }

    false
}

fn render_header(frame: &mut ratatui::Frame, area: Rect, transactions: &[Transaction], state: &BrowseState) {
    let total = balance(transactions);
    let balance_color = if total.is_sign_negative() && !total.is_zero() {
        Color::Red
    } else {
        Color::Green
    };

    let category = state.filter.category.as_deref().unwrap_or("(any)");
    let ttype = state
        .filter
        .transaction_type
        .map(TransactionType::as_str)
        .unwrap_or("(any)");

    let line = Line::from(vec![
        Span::styled("Cashbook", Style::default().fg(Color::Cyan).bold()),
        Span::raw("  "),
        Span::styled(
            format!("Balance: {}", format_currency(total)),
            Style::default().fg(balance_color).bold(),
        ),
        Span::raw("  |  "),
        Span::raw(format!("Category: {}", category)),
        Span::raw("  |  "),
        Span::raw(format!("Type: {}", ttype)),
        Span::raw("  |  "),
        Span::raw(format!("Rows: {}", state.visible_ids.len())),
    ]);

    let block = Block::default().borders(Borders::ALL);
    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState) {
    let block = Block::default().borders(Borders::ALL);

    if let Some((ref message, is_error)) = state.notice {
        let color = if is_error { Color::Red } else { Color::Green };
        frame.render_widget(
            Paragraph::new(message.as_str())
                .block(block)
                .style(Style::default().fg(color)),
            area,
        );
        return;
    }

    let hint = match state.mode {
        Mode::List => "↑/↓ move  Enter details  c category  t type  x clear filters  m monthly  d delete  X clear all  q/Esc exit",
        Mode::Details => "d delete  Esc/q/b back",
        Mode::CategoryInput => "Type, Enter apply, Esc cancel",
        Mode::Confirm(_) => "y confirm  any other key cancels",
    };

    frame.render_widget(
        Paragraph::new(hint)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_table(frame: &mut ratatui::Frame, area: Rect, transactions: &[Transaction], state: &mut BrowseState) {
    let block = Block::default().title("Transactions").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header = Row::new([
        Cell::from("Date").style(Style::default().bold()),
        Cell::from("Amount").style(Style::default().bold()),
        Cell::from("Category").style(Style::default().bold()),
        Cell::from("Payment").style(Style::default().bold()),
        Cell::from("Description").style(Style::default().bold()),
    ])
    .style(Style::default().fg(Color::White));

    let rows = state
        .visible_rows
        .iter()
        .filter_map(|&index| transactions.get(index))
        .map(|tx| {
            let [date, amount, category, payment, description, _] = transaction_cells(tx);
            let color = match tx.transaction_type {
                TransactionType::Income => Color::Green,
                TransactionType::Expense => Color::Red,
            };
            Row::new([
                Cell::from(date),
                Cell::from(amount).style(Style::default().fg(color)),
                Cell::from(category),
                Cell::from(payment),
                Cell::from(truncate(&description, 42)),
            ])
        });

    // Leave room for the header row.
    state.last_page_size = max(1, inner.height.saturating_sub(2) as usize);

    let widths = [
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White).bold())
        .highlight_symbol("➤ ")
        .column_spacing(1);

    frame.render_stateful_widget(table, inner, &mut state.table_state);

    if state.visible_ids.is_empty() {
        let empty = Paragraph::new("No transactions found matching your filters.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
    }
}

fn render_summary(frame: &mut ratatui::Frame, area: Rect, transactions: &[Transaction]) {
    let all = totals(transactions);
    let mut lines = vec![
        Line::from(format!("Income:   {}", format_currency(all.income))),
        Line::from(format!("Expenses: {}", format_currency(all.expense))),
        Line::from(format!("Net:      {}", format_currency(all.net))),
        Line::from(""),
    ];

    let months = monthly_summary(transactions);
    if months.is_empty() {
        lines.push(Line::from(Span::styled(
            "No transactions to summarize.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for month in months {
        lines.push(Line::from(Span::styled(
            format_month(&month.month),
            Style::default().fg(Color::Cyan).bold(),
        )));
        lines.push(Line::from(vec![
            Span::styled(format!("  +{}", format_currency(month.income)), Style::default().fg(Color::Green)),
            Span::raw("  "),
            Span::styled(format!("-{}", format_currency(month.expense)), Style::default().fg(Color::Red)),
            Span::raw(format!("  = {}", format_currency(month.balance()))),
        ]));
    }

    let block = Block::default().title("Monthly Summary").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_input_modal(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState) {
    let popup_area = centered_rect(80, 30, area);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(vec![Span::styled("Filter Category", Style::default().bold())]),
        Line::from("Enter category name (empty clears)"),
        Line::from(""),
        Line::from(vec![Span::styled(
            format!("> {}", state.input_buffer),
            Style::default().fg(Color::Yellow),
        )]),
    ];

    let block = Block::default().borders(Borders::ALL).title("Input");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}

fn render_confirm_modal(frame: &mut ratatui::Frame, area: Rect, action: &PendingAction) {
    let popup_area = centered_rect(60, 20, area);
    frame.render_widget(Clear, popup_area);

    let question = match action {
        PendingAction::Delete(_) => {
            "Are you sure you want to delete this transaction? This action cannot be undone."
        }
        PendingAction::ClearAll => {
            "Are you sure you want to delete all transactions? This action cannot be undone."
        }
    };

    let lines = vec![
        Line::from(Span::styled(question, Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from("Press y to confirm, any other key to cancel."),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Confirm"))
            .wrap(Wrap { trim: true }),
        popup_area,
    );
}

fn render_details_modal<S: KeyValueStore>(
    frame: &mut ratatui::Frame,
    area: Rect,
    ledger: &Ledger<S>,
    state: &BrowseState,
) {
    let popup_area = centered_rect(90, 60, area);
    frame.render_widget(Clear, popup_area);

    let tx = match state.selected_id().and_then(|id| ledger.get(id)) {
        Some(tx) => tx,
        None => {
            frame.render_widget(
                Paragraph::new("No selection")
                    .block(Block::default().borders(Borders::ALL).title("Details"))
                    .alignment(Alignment::Center),
                popup_area,
            );
            return;
        }
    };

    let lines = vec![
        Line::from(vec![Span::styled(
            "Transaction Details",
            Style::default().fg(Color::Cyan).bold(),
        )]),
        Line::from(""),
        Line::from(format!("Id: {}", tx.id)),
        Line::from(format!("Date: {}", format_naive_date(tx.date))),
        Line::from(format!("Type: {}", tx.transaction_type)),
        Line::from(format!("Category: {}", tx.category)),
        Line::from(format!("Payment mode: {}", tx.payment_mode)),
        Line::from(format!("Amount: {}", format_currency(tx.amount))),
        Line::from(format!("Recorded: {}", format_date(&tx.timestamp.to_rfc3339()))),
        Line::from(""),
        Line::from("Description:"),
        Line::from(tx.description.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "d to delete, Esc/q/b to go back",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default().borders(Borders::ALL).title("Details");
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        popup_area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}

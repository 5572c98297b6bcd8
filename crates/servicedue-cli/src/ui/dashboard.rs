//! Interactive campaign dashboard.
//!
//! Segment tabs over a selectable lead table. `Enter` opens the channel
//! drawer (template preview and quote), a second `Enter` the confirmation
//! modal, and confirming it starts the launch runner whose events drive
//! the progress gauge.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, Gauge, List, ListItem, ListState, Paragraph, Row, Table,
        TableState, Tabs, Wrap,
    },
    Frame,
};
use servicedue_sdk::{
    CampaignRunner, Channel, Dashboard, FlowState, LaunchEvent, LaunchOutcome, PageRequest,
    ProgressConfig, SdkConfig, Segment, ServiceDueClient, SessionStore,
};
use servicedue_models::Amount;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::app_state::{AppController, Banner};
use crate::tui::{self, Action, EventHandler};
use crate::ui::centered_rect;

const TICK_RATE_MS: u64 = 250;

/// Zero-based index of a `1`-based digit key.
fn digit_index(c: char) -> Option<usize> {
    let digit = c.to_digit(10)?.checked_sub(1)?;
    usize::try_from(digit).ok()
}

/// Which overlay, if any, owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Table,
    Drawer,
    Confirm,
    Running { finished: bool },
}

pub struct DashboardApp {
    dashboard: Dashboard,
    client: ServiceDueClient,
    config: SdkConfig,
    store: SessionStore,
    progress: ProgressConfig,
    tx: UnboundedSender<Action>,
    table: TableState,
    channel_cursor: usize,
    banner: Option<Banner>,
    loading: bool,
    should_quit: bool,
}

impl DashboardApp {
    pub fn new(
        client: ServiceDueClient,
        config: SdkConfig,
        store: SessionStore,
        segment: Segment,
        tx: UnboundedSender<Action>,
    ) -> Self {
        Self {
            dashboard: Dashboard::new(segment),
            client,
            config,
            store,
            progress: ProgressConfig::default(),
            tx,
            table: TableState::default(),
            channel_cursor: 0,
            banner: None,
            loading: false,
            should_quit: false,
        }
    }

    fn screen(&self) -> Screen {
        match self.dashboard.flow().state() {
            FlowState::Idle => Screen::Table,
            FlowState::DrawerOpen { .. } => Screen::Drawer,
            FlowState::ConfirmOpen { .. } => Screen::Confirm,
            FlowState::Running { outcome, .. } => Screen::Running {
                finished: outcome.is_some(),
            },
        }
    }

    fn user_label(&self) -> String {
        self.client.session().map_or_else(String::new, |s| {
            if s.user.dealership_name.is_empty() {
                s.user.display_name()
            } else {
                format!("{} · {}", s.user.display_name(), s.user.dealership_name)
            }
        })
    }

    // ── Data ─────────────────────────────────────────────────────────

    /// Fetch the active segment's first page in the background.
    pub fn load_leads(&mut self) {
        let segment = self.dashboard.segment();
        let page = PageRequest::first(self.config.page_size);
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.loading = true;
        tokio::spawn(async move {
            let action = match client.customers(segment, page).await {
                Ok(leads) => Action::LeadsLoaded(segment, leads),
                Err(e) => Action::LoadFailed {
                    segment,
                    message: e.banner(),
                    signed_out: e.is_auth_failure(),
                },
            };
            let _ = tx.send(action);
        });
    }

    fn on_leads_loaded(&mut self, segment: Segment, page: servicedue_sdk::LeadPage) {
        if !self.dashboard.replace_leads(segment, page) {
            return;
        }
        self.loading = false;
        let len = self.dashboard.leads().len();
        if len == 0 {
            self.table.select(None);
        } else {
            let row = self.table.selected().unwrap_or(0).min(len - 1);
            self.table.select(Some(row));
        }
    }

    fn on_load_failed(&mut self, segment: Segment, message: String, signed_out: bool) {
        if segment != self.dashboard.segment() {
            return;
        }
        self.loading = false;
        if signed_out {
            self.forget_session();
            self.banner = Some(Banner::Error(
                "Your session has expired. Quit and run `servicedue signin`.".into(),
            ));
        } else {
            self.banner = Some(Banner::Error(message));
        }
    }

    /// The backend rejected the token; drop it from disk.
    fn forget_session(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear session");
        }
    }

    fn switch_to(&mut self, segment: Segment) {
        if self.dashboard.switch_segment(segment) {
            self.table.select(None);
            self.banner = None;
            self.load_leads();
        }
    }

    // ── Table ────────────────────────────────────────────────────────

    fn move_cursor(&mut self, delta: isize) {
        let len = self.dashboard.leads().len();
        if len == 0 {
            self.table.select(None);
            return;
        }
        let len = isize::try_from(len).unwrap_or(isize::MAX);
        let current = self
            .table
            .selected()
            .and_then(|i| isize::try_from(i).ok())
            .unwrap_or(0);
        let next = usize::try_from((current + delta).rem_euclid(len)).unwrap_or(0);
        self.table.select(Some(next));
    }

    fn toggle_under_cursor(&mut self) {
        let id = self
            .table
            .selected()
            .and_then(|i| self.dashboard.leads().get(i))
            .map(|lead| lead.id.clone());
        if let Some(id) = id {
            self.dashboard.toggle(&id);
        }
    }

    fn on_key_table(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.banner = None,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.switch_to(self.dashboard.segment().next());
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.switch_to(self.dashboard.segment().previous());
            }
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(index) = digit_index(c) {
                    self.switch_to(Segment::ALL[index]);
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Char(' ') => self.toggle_under_cursor(),
            KeyCode::Char('a') => {
                if self.dashboard.all_selected() {
                    self.dashboard.clear_selection();
                } else {
                    self.dashboard.select_all();
                }
            }
            KeyCode::Char('c') => self.dashboard.clear_selection(),
            KeyCode::Char('r') => {
                self.banner = None;
                self.load_leads();
            }
            KeyCode::Enter => {
                if self.dashboard.open_drawer() {
                    self.channel_cursor = 0;
                    self.banner = None;
                } else {
                    self.banner = Some(Banner::Notice(
                        "Select at least one customer to start a campaign.".into(),
                    ));
                }
            }
            _ => {}
        }
    }

    // ── Drawer & confirmation ────────────────────────────────────────

    fn on_key_drawer(&mut self, key: KeyEvent) {
        let count = Channel::ALL.len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.dashboard.cancel();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.channel_cursor = (self.channel_cursor + 1) % count;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.channel_cursor = (self.channel_cursor + count - 1) % count;
            }
            KeyCode::Char(' ') => {
                self.dashboard.choose_channel(Channel::ALL[self.channel_cursor]);
            }
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(index) = digit_index(c) {
                    self.channel_cursor = index;
                    self.dashboard.choose_channel(Channel::ALL[index]);
                }
            }
            KeyCode::Enter => {
                self.dashboard.choose_channel(Channel::ALL[self.channel_cursor]);
                self.dashboard.confirm_drawer();
            }
            _ => {}
        }
    }

    fn on_key_confirm(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => self.start_launch(),
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('q') => {
                self.dashboard.cancel();
            }
            _ => {}
        }
    }

    // ── Launch ───────────────────────────────────────────────────────

    fn start_launch(&mut self) {
        let Some(request) = self.dashboard.confirm_launch() else {
            return;
        };
        info!(
            segment = %request.segment,
            channel = %request.channel,
            recipients = request.lead_ids.len(),
            "confirmed campaign launch"
        );
        self.banner = None;

        let client = self.client.clone();
        let mut events = CampaignRunner::spawn(
            async move { client.launch_campaign(&request).await },
            self.progress,
        );
        let tx = self.tx.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if tx.send(Action::Launch(event)).is_err() {
                    break;
                }
            }
        });
    }

    fn on_launch(&mut self, event: LaunchEvent) {
        match event {
            LaunchEvent::Progress(progress) => {
                self.dashboard.record_progress(progress);
            }
            LaunchEvent::Completed(receipt) => {
                if self.dashboard.launch_succeeded() {
                    let sent = receipt
                        .queued
                        .map_or_else(|| self.dashboard.selected_count().to_string(), |n| n.to_string());
                    self.banner = Some(Banner::Notice(format!(
                        "Campaign launched to {sent} customers."
                    )));
                }
            }
            LaunchEvent::Failed {
                message,
                signed_out,
            } => {
                if signed_out {
                    self.forget_session();
                }
                if self.dashboard.launch_failed(message.as_str()) {
                    let text = if signed_out {
                        format!(
                            "Campaign launch failed: {}. Quit and run `servicedue signin`.",
                            message.trim_end_matches('.')
                        )
                    } else {
                        format!("Campaign launch failed: {message}")
                    };
                    self.banner = Some(Banner::Error(text));
                }
            }
            LaunchEvent::Dismissed => {
                self.dashboard.dismiss();
            }
        }
    }

    fn request_quit(&mut self) {
        if self.screen() == (Screen::Running { finished: false }) {
            self.banner = Some(Banner::Notice(
                "A campaign is being sent; wait for it to finish.".into(),
            ));
        } else {
            self.should_quit = true;
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_tabs(&self, f: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Segment::ALL
            .iter()
            .map(|s| Line::from(format!(" {} {} ", s.index() + 1, s.label())))
            .collect();
        let user = self.user_label();
        let title = if user.is_empty() {
            " ServiceDue ".to_string()
        } else {
            format!(" ServiceDue · {user} ")
        };
        let tabs = Tabs::new(titles)
            .select(self.dashboard.segment().index())
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn render_table(&mut self, f: &mut Frame, area: Rect) {
        let segment = self.dashboard.segment();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", segment.label()));

        if self.dashboard.leads().is_empty() {
            let text = if self.loading || self.dashboard.page().is_none() {
                "Loading customers..."
            } else {
                "No customers in this segment."
            };
            f.render_widget(Paragraph::new(text).block(block), area);
            return;
        }

        let header = Row::new(vec![
            Cell::from(""),
            Cell::from("Customer"),
            Cell::from("Phone"),
            Cell::from("Bike"),
            Cell::from("Vehicle"),
            Cell::from(segment.urgency_heading()),
            Cell::from("Value"),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .dashboard
            .leads()
            .iter()
            .map(|lead| {
                let selected = self.dashboard.is_selected(&lead.id);
                let row = Row::new(vec![
                    Cell::from(if selected { "[x]" } else { "[ ]" }),
                    Cell::from(lead.name.clone()),
                    Cell::from(lead.phone.clone()),
                    Cell::from(lead.bike_model.clone()),
                    Cell::from(lead.vehicle_number.clone()),
                    Cell::from(lead.urgency().to_string()),
                    Cell::from(Amount::from_rupees(lead.estimated_value).to_string()),
                ]);
                if selected {
                    row.style(Style::default().fg(Color::Green))
                } else {
                    row
                }
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Min(18),
            Constraint::Length(15),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(11),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        f.render_stateful_widget(table, area, &mut self.table);
    }

    fn render_summary(&self, f: &mut Frame, area: Rect) {
        let total = self.dashboard.page().map_or(0, |p| p.total);
        let revenue = self.dashboard.quote(Channel::Whatsapp).total_revenue;
        let mut lines = vec![Line::from(vec![
            Span::raw("Selected "),
            Span::styled(
                self.dashboard.selected_count().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                " of {} · {total} in segment · Potential revenue ",
                self.dashboard.leads().len()
            )),
            Span::styled(
                revenue.to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ])];
        if let Some(banner) = &self.banner {
            let color = if banner.is_error() { Color::Red } else { Color::Cyan };
            lines = vec![Line::from(Span::styled(
                banner.text().to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))];
        }
        let summary = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        f.render_widget(summary, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help = match self.screen() {
            Screen::Table => {
                "Tab segment · ↑↓ move · Space select · a all · Enter campaign · r reload · q quit"
            }
            Screen::Drawer => "↑↓ channel · Space choose · Enter continue · Esc close",
            Screen::Confirm => "Enter launch · Esc back",
            Screen::Running { finished: false } => "Sending campaign...",
            Screen::Running { finished: true } => "Enter close",
        };
        f.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }

    fn render_drawer(&self, f: &mut Frame) {
        let FlowState::DrawerOpen {
            segment, channel, ..
        } = self.dashboard.flow().state()
        else {
            return;
        };
        let template = segment.template();

        let area = centered_rect(70, 80, f.area());
        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" New campaign · {} ", segment.label()))
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(5),
                Constraint::Length(5),
                Constraint::Length(2),
            ])
            .split(inner);

        let info = Paragraph::new(vec![
            Line::from(vec![
                Span::raw("Template: "),
                Span::styled(template.name, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!(" ({})", template.id)),
            ]),
            Line::from(Span::styled(
                template.description,
                Style::default().fg(Color::DarkGray),
            )),
        ]);
        f.render_widget(info, chunks[0]);

        let preview = Paragraph::new(self.dashboard.preview(&self.config.booking_url))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Preview "));
        f.render_widget(preview, chunks[1]);

        let items: Vec<ListItem> = Channel::ALL
            .iter()
            .map(|c| {
                let marker = if *channel == Some(*c) { "(•)" } else { "( )" };
                ListItem::new(format!(
                    "{marker} {:<9} {}/msg  {}",
                    c.label(),
                    c.unit_cost(),
                    c.description()
                ))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" Channel "))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");
        let mut state = ListState::default().with_selected(Some(self.channel_cursor));
        f.render_stateful_widget(list, chunks[2], &mut state);

        let quote = self.dashboard.quote(Channel::ALL[self.channel_cursor]);
        let line = Line::from(vec![
            Span::raw(format!(
                "{} recipients × {} = ",
                quote.recipients, quote.unit_cost
            )),
            Span::styled(
                quote.total_cost.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" · potential revenue "),
            Span::styled(
                quote.total_revenue.to_string(),
                Style::default().fg(Color::Green),
            ),
        ]);
        f.render_widget(Paragraph::new(line), chunks[3]);
    }

    fn render_confirm(&self, f: &mut Frame) {
        let FlowState::ConfirmOpen {
            pending,
            recipients,
        } = self.dashboard.flow().state()
        else {
            return;
        };
        let quote = self.dashboard.quote(pending.channel);

        let area = centered_rect(50, 35, f.area());
        f.render_widget(Clear, area);
        let text = vec![
            Line::from(Span::styled(
                format!("Launch {} campaign?", pending.segment.label()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Channel:    {}", pending.channel.label())),
            Line::from(format!("Template:   {}", pending.template_id)),
            Line::from(format!("Recipients: {recipients}")),
            Line::from(format!("Cost:       {}", quote.total_cost)),
            Line::from(""),
            Line::from("[Enter] Launch   [Esc] Back"),
        ];
        let modal = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .style(Style::default().bg(Color::Blue).fg(Color::White)),
        );
        f.render_widget(modal, area);
    }

    fn render_progress(&self, f: &mut Frame) {
        let FlowState::Running {
            progress, outcome, ..
        } = self.dashboard.flow().state()
        else {
            return;
        };
        let area = centered_rect(50, 20, f.area());
        f.render_widget(Clear, area);

        if let Some(LaunchOutcome::Failed(reason)) = outcome {
            let text = vec![
                Line::from(Span::styled(
                    "Campaign launch failed",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(reason.as_str()),
                Line::from(""),
                Line::from("[Enter] Close"),
            ];
            let modal = Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Launch "));
            f.render_widget(modal, area);
            return;
        }

        let title = if progress.is_complete() {
            " Campaign launched "
        } else {
            " Launching campaign "
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .gauge_style(Style::default().fg(Color::Green))
            .percent(progress.percent())
            .label(format!("{}%", progress.percent()));
        f.render_widget(gauge, area);
    }
}

impl AppController for DashboardApp {
    fn update(&mut self, action: Action) {
        match action {
            Action::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    self.request_quit();
                    return;
                }
                match self.screen() {
                    Screen::Table => self.on_key_table(key),
                    Screen::Drawer => self.on_key_drawer(key),
                    Screen::Confirm => self.on_key_confirm(key),
                    Screen::Running { finished } => {
                        if finished && matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                            self.dashboard.dismiss();
                        }
                    }
                }
            }
            Action::LeadsLoaded(segment, page) => self.on_leads_loaded(segment, page),
            Action::LoadFailed {
                segment,
                message,
                signed_out,
            } => self.on_load_failed(segment, message, signed_out),
            Action::Launch(event) => self.on_launch(event),
            Action::Tick | Action::Resize(..) => {}
        }
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_tabs(f, chunks[0]);
        self.render_table(f, chunks[1]);
        self.render_summary(f, chunks[2]);
        self.render_help(f, chunks[3]);

        match self.screen() {
            Screen::Table => {}
            Screen::Drawer => self.render_drawer(f),
            Screen::Confirm => self.render_confirm(f),
            Screen::Running { .. } => self.render_progress(f),
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Run the dashboard until the user quits.
pub async fn run(
    client: ServiceDueClient,
    config: SdkConfig,
    store: SessionStore,
    segment: Segment,
) -> anyhow::Result<()> {
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(TICK_RATE_MS);
    let mut app = DashboardApp::new(client, config, store, segment, events.get_sender());
    app.load_leads();

    let result = event_loop(&mut terminal, &mut events, &mut app).await;
    tui::restore()?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut tui::Tui,
    events: &mut EventHandler,
    app: &mut impl AppController,
) -> anyhow::Result<()> {
    terminal.draw(|f| app.render(f))?;
    while let Some(action) = events.next_async().await {
        app.update(action);
        if app.should_quit() {
            break;
        }
        terminal.draw(|f| app.render(f))?;
    }
    Ok(())
}

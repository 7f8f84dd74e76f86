//! Chooser panel - Main application screen
//!
//! Displays the metadata type tree with check markers, a detail pane for the
//! focused node, and status/help bars. Owns navigation and search state.

use crate::action::Action;
use crate::component::Component;
use crate::components::calculate_main_layout;
use crate::model::BuildRecord;
use crate::model::manifest::{Manifest, LOADING};
use crate::model::metadata::MetadataObject;
use crate::model::metadata_type::MetadataType;
use crate::model::tree::{Check, ChildState, Row};
use crate::model::SelectionTree;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// The package.xml chooser
///
/// At most one exists per application; `App` keeps it in an `Option`.
pub struct ChooserPanel {
    pub tree: SelectionTree,

    /// List selection state
    pub list_state: ListState,

    /// Search query string
    pub search_query: String,

    /// Whether search mode is active
    pub search_mode: bool,

    /// Whether the type catalog request is outstanding
    pub loading_types: bool,
}

impl Default for ChooserPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChooserPanel {
    pub fn new() -> Self {
        Self {
            tree: SelectionTree::default(),
            list_state: ListState::default(),
            search_query: String::new(),
            search_mode: false,
            loading_types: false,
        }
    }

    /// Replace the tree with a fresh catalog seeded from the saved manifest
    pub fn load_types(&mut self, objects: &[MetadataObject], existing: &Manifest) {
        self.tree = SelectionTree::from_objects(objects, existing);
        self.loading_types = false;
        self.select_first();
    }

    pub fn rows(&self) -> Vec<Row> {
        self.tree.visible_rows(&self.search_query)
    }

    /// Row under the cursor
    pub fn focused(&self) -> Option<Row> {
        let index = self.list_state.selected()?;
        self.rows().get(index).copied()
    }

    /// Type name of the row under the cursor, members resolving to their type
    pub fn focused_type(&self) -> Option<String> {
        let row = self.focused()?;
        self.tree.row_target(row).map(|(ty, _)| ty.to_string())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn next(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let next = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(next));
    }

    pub fn previous(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let prev = match self.list_state.selected() {
            Some(i) if i > 0 && i <= len => i - 1,
            _ => len - 1,
        };
        self.list_state.select(Some(prev));
    }

    pub fn select_first(&mut self) {
        let selected = if self.rows().is_empty() { None } else { Some(0) };
        self.list_state.select(selected);
    }

    pub fn select_last(&mut self) {
        let len = self.rows().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    /// Keep the cursor inside the list after rows disappear
    pub fn clamp_selection(&mut self) {
        let len = self.rows().len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tree operations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn toggle_check(&mut self) {
        let Some(row) = self.focused() else {
            return;
        };
        let Some((ty, member)) = self.tree.row_target(row) else {
            return;
        };
        let (ty, member) = (ty.to_string(), member.map(str::to_string));
        match (row, member) {
            (Row::Member(..), Some(member)) => self.tree.toggle_member(&ty, &member),
            (Row::Type(_), _) => self.tree.toggle_type(&ty),
            _ => {}
        }
    }

    /// Collapse the focused type, moving the cursor onto it
    pub fn collapse(&mut self) {
        let Some(row) = self.focused() else {
            return;
        };
        let type_index = match row {
            Row::Type(ti) | Row::Member(ti, _) | Row::Loading(ti) => ti,
        };
        let Some(ty) = self.focused_type() else {
            return;
        };
        self.tree.collapse(&ty);
        let position = self.rows().iter().position(|r| *r == Row::Type(type_index));
        self.list_state.select(position);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
    }

    pub fn exit_search_mode(&mut self) {
        self.search_mode = false;
    }

    pub fn search_input(&mut self, c: char) {
        self.search_query.push(c);
        self.select_first();
    }

    pub fn search_backspace(&mut self) {
        self.search_query.pop();
        self.select_first();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for ChooserPanel {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            // Navigation
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::FirstItem),
            KeyCode::Char('G') | KeyCode::End => Some(Action::LastItem),

            // Tree
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => {
                self.focused_type().map(Action::FetchChildren)
            }
            KeyCode::Char('h') | KeyCode::Left => Some(Action::Collapse),
            KeyCode::Char(' ') => Some(Action::ToggleCheck),
            KeyCode::Char('c') => Some(Action::ClearAll),

            // Manifest
            KeyCode::Char('b') => Some(Action::BuildPackageXml),
            KeyCode::Char('e') => Some(Action::OpenEditor),
            KeyCode::Char('R') => Some(Action::GetMetadataTypes),

            // Search
            KeyCode::Char('/') => Some(Action::EnterSearchMode),

            // Modals
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),

            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Drawing is done through draw_chooser_screen which takes full context
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering Functions
// ═══════════════════════════════════════════════════════════════════════════════

/// Context needed for rendering the chooser screen
pub struct ChooserRenderContext<'a> {
    pub manifest_path: &'a std::path::Path,
    pub api_version: &'a str,
    pub status_message: Option<&'a str>,
    pub last_build: Option<&'a BuildRecord>,
}

/// Draw the chooser screen
pub fn draw_chooser_screen(
    frame: &mut Frame,
    area: Rect,
    panel: &mut ChooserPanel,
    ctx: &ChooserRenderContext,
) -> Result<()> {
    let layout = calculate_main_layout(area);

    render_tree(frame, layout.tree, panel);
    render_detail(frame, layout.detail, panel, ctx);
    render_status_bar(frame, layout.status, ctx);
    render_help_bar(frame, layout.help, panel);

    Ok(())
}

/// Cut `text` to `width` display columns, marking the cut with an ellipsis
fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn check_style(check: Check) -> Style {
    match check {
        Check::Checked => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Check::Partial => Style::default().fg(Color::Yellow),
        Check::Unchecked => Style::default().fg(Color::DarkGray),
    }
}

fn render_tree(frame: &mut Frame, area: Rect, panel: &mut ChooserPanel) {
    let rows = panel.rows();
    // borders, highlight symbol, arrow and marker
    let name_width = (area.width as usize).saturating_sub(14);

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let line = match *row {
                Row::Type(ti) => {
                    let node = &panel.tree.types()[ti];
                    let arrow = match (node.expanded, node.state) {
                        (true, ChildState::Loaded | ChildState::Loading) => "▾ ",
                        _ => "▸ ",
                    };
                    let check = node.check();
                    let mut spans = vec![
                        Span::styled(arrow, Style::default().fg(Color::DarkGray)),
                        Span::styled(format!("{} ", check.marker()), check_style(check)),
                        Span::styled(
                            truncate_to_width(&node.name, name_width),
                            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                        ),
                    ];
                    if node.state == ChildState::Loaded {
                        spans.push(Span::styled(
                            format!(" ({})", node.members.len()),
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                    Line::from(spans)
                }
                Row::Member(ti, mi) => {
                    let member = &panel.tree.types()[ti].members[mi];
                    let check = if member.checked { Check::Checked } else { Check::Unchecked };
                    Line::from(vec![
                        Span::raw("    "),
                        Span::styled(format!("{} ", check.marker()), check_style(check)),
                        Span::styled(
                            truncate_to_width(&member.name, name_width.saturating_sub(2)),
                            Style::default().fg(Color::White),
                        ),
                    ])
                }
                Row::Loading(_) => Line::from(vec![
                    Span::raw("    "),
                    Span::styled(
                        LOADING,
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    ),
                ]),
            };
            ListItem::new(line)
        })
        .collect();

    let mut title = format!(" Metadata Types ({}) ", panel.tree.types().len());
    let checked = panel.tree.checked_count();
    if checked > 0 {
        title = format!("{}[{}✓] ", title, checked);
    }
    if !panel.search_query.is_empty() {
        title = format!("{}[/{}] ", title, panel.search_query);
    }

    let list = if items.is_empty() {
        let message = if panel.loading_types {
            "Loading metadata types..."
        } else if panel.tree.is_empty() {
            "No metadata types. Press R to reload."
        } else {
            "Nothing matches the search."
        };
        List::new(vec![ListItem::new(Span::styled(
            message,
            Style::default().fg(Color::DarkGray),
        ))])
    } else {
        List::new(items)
    };

    let list = list
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut panel.list_state);
}

fn render_detail(frame: &mut Frame, area: Rect, panel: &ChooserPanel, ctx: &ChooserRenderContext) {
    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::DarkGray));
    let mut lines = vec![];

    let target = panel
        .focused()
        .and_then(|row| panel.tree.row_target(row))
        .map(|(ty, member)| (ty.to_string(), member.map(str::to_string)));

    if let Some((ty, member)) = target {
        let classification = MetadataType::classify(&ty);
        lines.push(Line::from(Span::styled(
            member.clone().unwrap_or_else(|| classification.name.to_string()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        if member.is_some() {
            lines.push(Line::from(vec![label("type: "), Span::raw(ty.clone())]));
        }
        lines.push(Line::from(""));

        if let Some(node) = panel.tree.get(&ty) {
            lines.push(Line::from(vec![
                label("wildcard: "),
                Span::raw(if classification.accepts_wildcard { "yes (*)" } else { "no" }),
            ]));
            if let Some(folder_type) = classification.folder_type {
                lines.push(Line::from(vec![label("folders: "), Span::raw(folder_type)]));
            }
            let state = match node.state {
                ChildState::NotLoaded => "not loaded".to_string(),
                ChildState::Loading => "loading".to_string(),
                ChildState::Loaded => format!("{} loaded", node.members.len()),
            };
            lines.push(Line::from(vec![label("members: "), Span::raw(state)]));
            if node.saved_only {
                lines.push(Line::from(Span::styled(
                    "only in package.xml; not in the org catalog",
                    Style::default().fg(Color::Yellow),
                )));
            }
            if !node.pending.is_empty() {
                lines.push(Line::from(vec![
                    label("saved: "),
                    Span::styled(node.pending.join(", "), Style::default().fg(Color::Yellow)),
                ]));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        label("manifest: "),
        Span::raw(ctx.manifest_path.display().to_string()),
    ]));
    lines.push(Line::from(vec![label("version: "), Span::raw(ctx.api_version.to_string())]));
    if let Some(build) = ctx.last_build {
        lines.push(Line::from(vec![
            label("last build: "),
            Span::raw(build.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Detail ")
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, ctx: &ChooserRenderContext) {
    let mut spans = vec![Span::styled(
        " package.xml ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(status) = ctx.status_message {
        spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(build) = ctx.last_build {
        spans.push(Span::styled(
            format!(" {} ", build.summary()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help_bar(frame: &mut Frame, area: Rect, panel: &ChooserPanel) {
    let key = |k: &'static str, color: Color| {
        Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };

    let help_spans = if panel.search_mode {
        vec![
            key(" Esc/Enter ", Color::Yellow),
            Span::raw("Done  "),
            Span::styled(
                format!("Search: {}", panel.search_query),
                Style::default().fg(Color::Cyan),
            ),
        ]
    } else {
        vec![
            key(" q ", Color::Yellow),
            Span::raw("Quit "),
            key(" Space ", Color::Green),
            Span::raw("Check "),
            key(" l ", Color::Cyan),
            Span::raw("Expand "),
            key(" h ", Color::Cyan),
            Span::raw("Collapse "),
            key(" b ", Color::Green),
            Span::raw("Build "),
            key(" e ", Color::Cyan),
            Span::raw("Edit "),
            key(" / ", Color::Cyan),
            Span::raw("Search "),
            key(" ? ", Color::White),
            Span::raw("Help"),
        ]
    };

    frame.render_widget(Paragraph::new(Line::from(help_spans)), area);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use tourdesk_core::auth::GateDecision;
use tourdesk_core::form::FieldKind;

use crate::app::{App, AppState, FormModal, LoginFocus, Tab};

use super::styles;
use super::tabs::{appointments, cities, destinations, users};

const LOGO: [&str; 3] = [
    "  ╔╦╗╔═╗╦ ╦╦═╗╔╦╗╔═╗╔═╗╦╔═",
    "   ║ ║ ║║ ║╠╦╝ ║║║╣ ╚═╗╠╩╗",
    "   ╩ ╚═╝╚═╝╩╚══╩╝╚═╝╚═╝╩ ╩",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::EditingForm => {
            if let Some(ref modal) = app.modal {
                render_form_overlay(frame, modal);
            }
        }
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Tourdesk Admin";
    let user = match app.current_user {
        Some(ref u) => format!("{} <{}>  ", u.name, u.email),
        None => String::new(),
    };
    let help_hint = "[?] Help";

    let used = title.chars().count() + user.chars().count() + help_hint.len() + 4;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(user, styles::highlight_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    // Nothing protected is drawn without a session.
    if let GateDecision::Redirect(_) = app.gate() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        let message = Line::from(Span::styled(" Login required", styles::muted_style()));
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    match app.current_tab {
        Tab::Travelers | Tab::TourGuides => users::render(frame, app, app.current_tab, area),
        Tab::Cities => cities::render(frame, app, area),
        Tab::Destinations => destinations::render(frame, app, area),
        Tab::Appointments => appointments::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[a]dd [e]dit [d]elete [r]efresh | [q]uit";

    let (left_text, left_style) = match app.status {
        Some(ref notice) if notice.is_error() => (format!(" {} ", notice.text()), styles::error_style()),
        Some(ref notice) => (format!(" {} ", notice.text()), styles::success_style()),
        None => match app.cache_age(app.current_tab) {
            Some(age) => (format!(" Updated {} ", age), styles::muted_style()),
            None => (String::new(), styles::muted_style()),
        },
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|row| Line::from(Span::styled(format!("      {}", row), styles::title_style())))
        .collect()
}

fn help_row(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 28, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = logo_lines();
    help_text.extend([
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_row("1-5", "Switch tabs"),
        help_row("←/→", "Prev/next tab"),
        help_row("↑/↓ j/k", "Navigate rows"),
        help_row("[ / ]", "Prev/next page"),
        help_row("/", "Search"),
        help_row("Esc", "Clear search"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_row("a", "Add a record"),
        help_row("e, Enter", "Edit selected record"),
        help_row("d", "Delete selected record"),
        help_row("r", "Refresh from server"),
        help_row("L", "Log out"),
        help_row("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Forms", styles::highlight_style())),
        help_row("Tab/↑/↓", "Move between fields"),
        help_row("←/→ Space", "Change an option"),
        help_row("Ctrl+S", "Save"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    frame.render_widget(Paragraph::new(help_text).block(overlay_block()), area);
}

/// A `[value▌]` input box, highlighted when focused.
fn input_spans(label: &str, value: String, focused: bool) -> Vec<Span<'static>> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    vec![
        Span::styled(format!("{:<18}[", label), styles::muted_style()),
        Span::styled(format!("{:<24}{}", value, cursor), style),
        Span::styled("]", styles::muted_style()),
    ]
}

/// Show the tail of long input so the cursor end stays visible.
fn tail(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count <= width {
        value.to_string()
    } else {
        let skipped: String = value.chars().skip(count - width + 1).collect();
        format!("…{}", skipped)
    }
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    if focused {
        Line::from(vec![
            Span::raw("            ["),
            Span::styled(format!(" ▶ {} ◀ ", label), styles::selected_style()),
            Span::raw("]"),
        ])
    } else {
        Line::from(vec![
            Span::raw("            ["),
            Span::styled(format!("   {}   ", label), styles::list_item_style()),
            Span::raw("]"),
        ])
    }
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 15 } else { 13 };
    let area = centered_rect_fixed(58, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    let mut email = vec![Span::raw("  ")];
    email.extend(input_spans(
        "Email:",
        tail(&app.login_email, 24),
        app.login_focus == LoginFocus::Email,
    ));
    lines.push(Line::from(email));

    let masked = "*".repeat(app.login_password.chars().count().min(24));
    let mut password = vec![Span::raw("  ")];
    password.extend(input_spans(
        "Password:",
        masked,
        app.login_focus == LoginFocus::Password,
    ));
    lines.push(Line::from(password));

    let check = if app.remember_password { "[x]" } else { "[ ]" };
    let remember_style = if app.login_focus == LoginFocus::Remember {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<18}", "Remember me:"), styles::muted_style()),
        Span::styled(check, remember_style),
    ]));

    lines.push(Line::from(""));
    lines.push(button_line("Login", app.login_focus == LoginFocus::Button));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    frame.render_widget(Paragraph::new(lines).block(overlay_block()), area);
}

fn render_form_overlay(frame: &mut Frame, modal: &FormModal) {
    let form = modal.form();
    let fields = form.fields();

    let mut lines = vec![Line::from("")];
    for (i, field) in fields.iter().enumerate() {
        let focused = modal.focus == i;
        let raw = form.input(field.key);
        let value = match field.kind {
            FieldKind::Secret => "*".repeat(raw.chars().count().min(24)),
            FieldKind::Choice(_) => format!("◀ {} ▶", raw),
            FieldKind::Text | FieldKind::File => tail(&raw, 24),
        };
        let mut spans = vec![Span::raw("  ")];
        spans.extend(input_spans(field.label, value, focused));
        lines.push(Line::from(spans));

        if let Some(error) = form.error(field.key) {
            lines.push(Line::from(Span::styled(
                format!("  {:<18} {}", "", error),
                styles::error_style(),
            )));
        }
    }

    lines.push(Line::from(""));
    let label = if form.is_submitting() { "Saving..." } else { "Save" };
    lines.push(button_line(label, modal.on_button()));
    lines.push(Line::from(Span::styled(
        "  Ctrl+S save, Esc cancel",
        styles::muted_style(),
    )));

    let height = (lines.len() as u16).saturating_add(2);
    let area = centered_rect_fixed(72, height, frame.area());
    frame.render_widget(Clear, area);

    let block = overlay_block()
        .title(format!(" {} ", modal.title()))
        .title_style(styles::title_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(52, 8, frame.area());
    frame.render_widget(Clear, area);

    let label = app
        .delete_target
        .as_ref()
        .map(|t| t.label.clone())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to delete",
            styles::highlight_style(),
        )),
        Line::from(Span::styled(format!("   {}?", label), styles::title_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(overlay_block()), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    frame.render_widget(Paragraph::new(lines).block(overlay_block()), area);
}

fn overlay_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default())
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

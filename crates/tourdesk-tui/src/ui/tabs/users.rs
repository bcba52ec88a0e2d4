use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Wrap},
    Frame,
};

use tourdesk_core::models::{Role, User};
use tourdesk_core::utils::{format_optional, format_price, truncate_string};

use crate::app::{App, Tab};
use crate::ui::styles;

use super::{detail_block, detail_line, render_table, row_style};

/// Travelers and tour guides: one users collection filtered by role.
pub fn render(frame: &mut Frame, app: &App, tab: Tab, area: Rect) {
    let role = tab.role().unwrap_or(Role::Traveler);
    let users = app.filtered_users(role);
    let page = app.view(tab).pager.slice(&users);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let guide = role == Role::TourGuide;
    let rows: Vec<Row> = page
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let mut cells = vec![
                Cell::from(truncate_string(&user.name, 28)),
                Cell::from(truncate_string(&user.email, 32)),
            ];
            if guide {
                cells.push(Cell::from(format_price(&user.price)));
                cells.push(Cell::from(Span::styled(
                    user.active_display(),
                    styles::active_style(user.is_active),
                )));
            }
            Row::new(cells).style(row_style(app, tab, i))
        })
        .collect();

    if guide {
        render_table(
            frame,
            app,
            tab,
            chunks[0],
            &["Name", "Email", "Price", "Status"],
            rows,
            &[
                Constraint::Percentage(30),
                Constraint::Fill(2),
                Constraint::Length(12),
                Constraint::Length(9),
            ],
            users.len(),
        );
    } else {
        render_table(
            frame,
            app,
            tab,
            chunks[0],
            &["Name", "Email"],
            rows,
            &[Constraint::Percentage(40), Constraint::Fill(1)],
            users.len(),
        );
    }

    let selected = page.get(app.view(tab).selection).copied();
    render_detail(frame, selected, chunks[1]);
}

fn render_detail(frame: &mut Frame, user: Option<&User>, area: Rect) {
    let placeholder = "-";

    let lines = match user {
        Some(user) => {
            let mut lines = vec![
                Line::from(Span::styled(user.name.clone(), styles::title_style())),
                Line::from(""),
                detail_line("ID", user.id.to_string()),
                detail_line("Role", user.role_display()),
                detail_line("Email", user.email.clone()),
                detail_line("Photo", format_optional(&user.photo_url, placeholder)),
            ];
            if user.is_tour_guide() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Tour Guide", styles::highlight_style())));
                lines.push(detail_line("City ID", format_optional(&user.city_id, placeholder)));
                lines.push(detail_line("Price", format_price(&user.price)));
                lines.push(detail_line("Status", user.active_display().to_string()));
                lines.push(detail_line(
                    "About",
                    format_optional(&user.description, placeholder),
                ));
            }
            lines
        }
        None => vec![Line::from(Span::styled("No user selected", styles::muted_style()))],
    };

    let paragraph = Paragraph::new(lines)
        .block(detail_block("Details"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

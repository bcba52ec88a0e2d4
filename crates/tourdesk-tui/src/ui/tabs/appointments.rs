use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Row},
    Frame,
};

use tourdesk_core::utils::{format_date, format_time, truncate_string};

use crate::app::{App, Tab};
use crate::ui::styles;

use super::{render_table, row_style};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let tab = Tab::Appointments;
    let appointments = app.filtered_appointments();
    let page = app.view(tab).pager.slice(&appointments);

    let rows: Vec<Row> = page
        .iter()
        .enumerate()
        .map(|(i, a)| {
            Row::new(vec![
                Cell::from(format_date(&a.appointment_date)),
                Cell::from(format!("{}-{}", format_time(&a.start_time), format_time(&a.end_time))),
                Cell::from(truncate_string(&a.traveler_name(), 24)),
                Cell::from(truncate_string(&a.tour_guide_name(), 24)),
                Cell::from(truncate_string(&a.destination_name(), 28)),
                Cell::from(Span::styled(a.status.to_string(), styles::status_style(a.status))),
            ])
            .style(row_style(app, tab, i))
        })
        .collect();

    render_table(
        frame,
        app,
        tab,
        area,
        &["Date", "Time", "Traveler", "Tour guide", "Destination", "Status"],
        rows,
        &[
            Constraint::Length(13),
            Constraint::Length(12),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(10),
        ],
        appointments.len(),
    );
}

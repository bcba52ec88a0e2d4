use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Wrap},
    Frame,
};

use tourdesk_core::models::Destination;
use tourdesk_core::utils::truncate_string;

use crate::app::{App, Tab};
use crate::ui::styles;

use super::{detail_block, detail_line, render_table, row_style};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let tab = Tab::Destinations;
    let destinations = app.filtered_destinations();
    let page = app.view(tab).pager.slice(&destinations);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let rows: Vec<Row> = page
        .iter()
        .enumerate()
        .map(|(i, d)| {
            Row::new(vec![
                Cell::from(truncate_string(&d.destination_name, 30)),
                Cell::from(d.city_name().to_string()),
                Cell::from(fee_display(d.entry_fee)),
                Cell::from(d.rating_display()),
            ])
            .style(row_style(app, tab, i))
        })
        .collect();

    render_table(
        frame,
        app,
        tab,
        chunks[0],
        &["Name", "City", "Entry fee", "Rating"],
        rows,
        &[
            Constraint::Percentage(38),
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
        destinations.len(),
    );

    let selected = page.get(app.view(tab).selection).copied();
    render_detail(frame, selected, chunks[1]);
}

fn fee_display(fee: f64) -> String {
    if fee == 0.0 {
        "Free".to_string()
    } else {
        format!("Rp {:.0}", fee)
    }
}

fn render_detail(frame: &mut Frame, destination: Option<&Destination>, area: Rect) {
    let lines = match destination {
        Some(d) => vec![
            Line::from(Span::styled(d.destination_name.clone(), styles::title_style())),
            Line::from(""),
            detail_line("ID", d.id.to_string()),
            detail_line("City", format!("{} (#{})", d.city_name(), d.city_id)),
            detail_line("Address", d.address.clone()),
            detail_line("Location", format!("{:.5}, {:.5}", d.latitude, d.longitude)),
            detail_line("Hours", d.operational_hours.clone()),
            detail_line("Entry fee", fee_display(d.entry_fee)),
            detail_line("Rating", d.rating_display()),
            detail_line("Images", d.images.len().to_string()),
            Line::from(""),
            Line::from(Span::styled("Description", styles::highlight_style())),
            Line::from(d.description.clone()),
        ],
        None => vec![Line::from(Span::styled(
            "No destination selected",
            styles::muted_style(),
        ))],
    };

    let paragraph = Paragraph::new(lines)
        .block(detail_block("Details"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_display() {
        assert_eq!(fee_display(0.0), "Free");
        assert_eq!(fee_display(25000.0), "Rp 25000");
    }
}

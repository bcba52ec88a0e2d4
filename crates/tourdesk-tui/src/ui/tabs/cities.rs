use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Cell, Row},
    Frame,
};

use crate::app::{App, Tab};

use super::{render_table, row_style};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let tab = Tab::Cities;
    let cities = app.filtered_cities();
    let page = app.view(tab).pager.slice(&cities);

    let rows: Vec<Row> = page
        .iter()
        .enumerate()
        .map(|(i, city)| {
            Row::new(vec![
                Cell::from(format!("{:>5}", city.id)),
                Cell::from(city.name.clone()),
            ])
            .style(row_style(app, tab, i))
        })
        .collect();

    render_table(
        frame,
        app,
        tab,
        area,
        &["   ID", "Name"],
        rows,
        &[Constraint::Length(6), Constraint::Fill(1)],
        cities.len(),
    );
}

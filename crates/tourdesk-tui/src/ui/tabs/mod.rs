//! Per-tab table rendering.

pub mod appointments;
pub mod cities;
pub mod destinations;
pub mod users;

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, AppState, Tab};
use crate::ui::styles;

/// Render one page of a tab's rows with its pager summary in the title.
#[allow(clippy::too_many_arguments)]
pub(crate) fn render_table(
    frame: &mut Frame,
    app: &App,
    tab: Tab,
    area: Rect,
    header: &[&str],
    rows: Vec<Row>,
    widths: &[Constraint],
    total: usize,
) {
    let view = app.view(tab);

    let header = Row::new(header.iter().map(|h| Cell::from(*h)))
        .style(styles::title_style())
        .height(1);

    let title = format!(
        " {} ({}) - {} - page {}/{} ",
        tab.title(),
        total,
        view.pager.summary(total),
        view.pager.page(),
        view.pager.total_pages(total),
    );

    let mut block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if app.state == AppState::Searching || !app.search_query.is_empty() {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" /{} ", app.search_query),
            styles::search_style(),
        )));
    }

    if rows.is_empty() {
        let message = match app.tab_error(tab) {
            Some(err) => Span::styled(format!(" {}", err), styles::error_style()),
            None if app.is_busy(tab) => Span::styled(" Loading...", styles::muted_style()),
            None => Span::styled(" No records", styles::muted_style()),
        };
        frame.render_widget(Paragraph::new(Line::from(message)).block(block), area);
        return;
    }

    let table = Table::new(rows, widths.iter().copied())
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(view.selection));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Row style for position `i` on the current page.
pub(crate) fn row_style(app: &App, tab: Tab, i: usize) -> Style {
    if i == app.view(tab).selection {
        styles::selected_style()
    } else {
        styles::list_item_style()
    }
}

/// A "Label:     value" detail line.
pub(crate) fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", format!("{}:", label)), styles::muted_style()),
        Span::raw(value),
    ])
}

pub(crate) fn detail_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
}

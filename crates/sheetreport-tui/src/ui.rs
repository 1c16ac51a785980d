use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};
use sheetreport_core::{format_usd, GenerationStatus, SaleStatus};
use crate::app::{App, FocusPane, FormField, InputMode, NoticeKind};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [form_area, main_area, notice_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(body_area);

    let [table_area, report_area] = Layout::horizontal([
        Constraint::Percentage(55),
        Constraint::Percentage(45),
    ])
    .areas(main_area);

    render_form(app, frame, form_area);
    render_table(app, frame, table_area);
    render_report(app, frame, report_area);
    render_notice(app, frame, notice_area);
    render_footer(app, frame, footer_area);

    app.table_area = Some(table_area);
    app.report_area = Some(report_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let store = app.state.store();

    let title = Line::from(vec![
        Span::styled(" SheetReport ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("   "),
        Span::styled(
            format!("{} records", store.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("   Total Revenue "),
        Span::styled(
            format_usd(store.total_revenue()),
            Style::default().fg(Color::Green).bold(),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_form(app: &mut App, frame: &mut Frame, area: Rect) {
    let columns = Layout::horizontal([
        Constraint::Length(12),
        Constraint::Min(16),
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Length(14),
        Constraint::Length(15),
    ])
    .split(area);

    let form_focused = app.focus == FocusPane::Form;

    for (field, cell_area) in FormField::ALL.iter().zip(columns.iter()) {
        let active = form_focused && app.form.field == *field;
        let editing = active && app.input_mode == InputMode::Editing;

        let text = if field.is_choice() {
            format!("< {} >", app.form.value(*field))
        } else {
            app.form.value(*field)
        };

        let border = if editing {
            Style::default().fg(Color::Yellow)
        } else if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            border_style(false)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", field.label()));

        let value_style = if active {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        frame.render_widget(Paragraph::new(text).style(value_style).block(block), *cell_area);

        if editing {
            let max_x = cell_area.width.saturating_sub(2);
            let cursor_x = (app.form.cursor as u16).min(max_x);
            frame.set_cursor_position((cell_area.x + 1 + cursor_x, cell_area.y + 1));
        }
    }
}

fn status_style(status: SaleStatus) -> Style {
    match status {
        SaleStatus::Completed => Style::default().fg(Color::Green),
        SaleStatus::Pending => Style::default().fg(Color::Yellow),
        SaleStatus::Cancelled => Style::default().fg(Color::Red),
    }
}

fn render_table(app: &mut App, frame: &mut Frame, area: Rect) {
    let records = app.state.records();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == FocusPane::Table))
        .title(format!(" Current Data Sheet ({} records) ", records.len()));

    if records.is_empty() {
        let empty = Paragraph::new("No records. Add an entry above.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Date"),
        Cell::from("Product"),
        Cell::from("Category"),
        Cell::from(Text::from("Units").alignment(Alignment::Right)),
        Cell::from(Text::from("Revenue").alignment(Alignment::Right)),
        Cell::from("Status"),
    ])
    .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            Row::new(vec![
                Cell::from(record.date.format("%Y-%m-%d").to_string()),
                Cell::from(record.product.clone()),
                Cell::from(record.category.as_str()),
                Cell::from(Text::from(record.units.to_string()).alignment(Alignment::Right)),
                Cell::from(Text::from(format_usd(record.revenue)).alignment(Alignment::Right)),
                Cell::from(Span::styled(record.status.as_str(), status_style(record.status))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Min(12),
        Constraint::Length(9),
        Constraint::Length(5),
        Constraint::Length(12),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_report(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == FocusPane::Report))
        .title(format!(" AI Report ({}) ", app.client.model()));

    let mut lines: Vec<Line> = Vec::new();

    match app.state.status() {
        GenerationStatus::Generating => {
            let dots = ".".repeat(app.animation_frame as usize + 1);
            lines.push(Line::from(Span::styled(
                format!("Analyzing Data{}", dots),
                Style::default().fg(Color::Yellow).italic(),
            )));
        }
        GenerationStatus::Error => {
            lines.push(Line::from(Span::styled(
                "Error generating report. Please check your API key and try again.",
                Style::default().fg(Color::Red).bold(),
            )));
            if let Some(err) = app.state.last_error() {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    err.to_string(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        GenerationStatus::Idle => {
            lines.push(Line::from(Span::styled(
                "Press 'g' to generate an AI report for the current data sheet.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        GenerationStatus::Success => {}
    }

    if let Some(report) = app.state.report() {
        let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

        lines.push(Line::from(Span::styled("Executive Summary", heading)));
        lines.push(Line::from(report.summary.clone()));
        lines.push(Line::default());

        lines.push(Line::from(Span::styled("Key Insights", heading)));
        for insight in &report.key_insights {
            lines.push(Line::from(vec![
                Span::styled("  • ", Style::default().fg(Color::Green)),
                Span::raw(insight.clone()),
            ]));
        }
        lines.push(Line::default());

        lines.push(Line::from(Span::styled("Strategic Recommendation", heading)));
        lines.push(Line::from(report.recommendation.clone()));
        lines.push(Line::default());

        lines.push(Line::from(Span::styled(
            format!("Generated {}", report.generated_at.format("%m/%d/%Y")),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.report_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect) {
    let Some(notice) = &app.notice else {
        return;
    };

    let style = match notice.kind {
        NoticeKind::Info => Style::default().fg(Color::Green),
        NoticeKind::Warning => Style::default().fg(Color::Yellow),
        NoticeKind::Error => Style::default().fg(Color::Red),
    };

    frame.render_widget(Paragraph::new(format!(" {}", notice.text)).style(style), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (app.input_mode, app.focus) {
        (InputMode::Editing, _) => " EDIT ",
        (InputMode::Normal, FocusPane::Form) => " FORM ",
        (InputMode::Normal, FocusPane::Table) => " TABLE ",
        (InputMode::Normal, FocusPane::Report) => " REPORT ",
    };

    let hints = match (app.input_mode, app.focus) {
        (InputMode::Editing, _) => "Enter add entry  Tab next field  Esc stop editing",
        (InputMode::Normal, FocusPane::Form) => {
            "j/k field  h/l choose  Enter edit  s add entry  g generate  p print  Tab pane  q quit"
        }
        (InputMode::Normal, FocusPane::Table) => {
            "j/k select  d delete  g generate  p print  Tab pane  q quit"
        }
        (InputMode::Normal, FocusPane::Report) => {
            "j/k scroll  g generate  p print  Tab pane  q quit"
        }
    };

    let generate_hint = if app.state.is_generating() {
        Span::styled(" generating… ", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("")
    };

    let footer = Line::from(vec![
        Span::styled(mode_text, mode_style),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
        generate_hint,
    ]);

    frame.render_widget(Paragraph::new(footer), area);
}

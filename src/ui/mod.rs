mod theme;

use crate::app::SelectionModel;
use crate::domain::{Order, format_order_date, truncate_utf8_bytes};
use ratatui::prelude::*;
use ratatui::widgets::*;
use time::UtcOffset;
use unicode_width::UnicodeWidthStr;

pub const NAME_BYTE_BUDGET: usize = 58;
pub const STATUS_BYTE_BUDGET: usize = 10;

const CHECK_COL_WIDTH: usize = 4;
const SEQ_COL_WIDTH: usize = 6;
const NAME_COL_WIDTH: usize = 60;
const ORDER_ID_COL_WIDTH: usize = 18;
const STATUS_COL_WIDTH: usize = 10;

pub fn render_selection(frame: &mut Frame, model: &SelectionModel) {
    let area = frame.area();
    if area.width == 0 || area.height == 0 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(format!("{} orders in total", model.orders().len())),
        Line::from(Span::styled(
            "Keys: ↑/↓=move  Space=select  a=select all  c=clear  Enter=confirm  Esc=quit",
            Style::default().fg(theme::MUTED),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER))
            .padding(Padding::horizontal(1))
            .title(Span::styled(
                " Bilibili order deleter ",
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(header, chunks[0]);

    frame.render_widget(
        Paragraph::new(format!("  {}", order_table_header()))
            .style(Style::default().fg(theme::DIM).add_modifier(Modifier::BOLD)),
        chunks[1],
    );

    let list_area = chunks[2];
    let rows = usize::from(list_area.height);
    let window = model.window(rows);
    let items: Vec<ListItem> = window
        .clone()
        .map(|index| {
            let checked = model.selected()[index];
            let text = order_row_text(&model.orders()[index], index, checked, model.date_offset);
            let style = if checked {
                Style::default().fg(theme::SUCCESS)
            } else {
                Style::default().fg(theme::FG)
            };
            ListItem::new(Line::from(Span::styled(text, style)))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("► ")
        .highlight_spacing(HighlightSpacing::Always);

    let mut state = ListState::default();
    if !window.is_empty() {
        state.select(Some(model.cursor().saturating_sub(window.start)));
    }
    frame.render_stateful_widget(list, list_area, &mut state);

    frame.render_widget(footer_paragraph(model, model.hidden_below(rows)), chunks[3]);
}

fn footer_paragraph(model: &SelectionModel, hidden: usize) -> Paragraph<'static> {
    let more = if hidden > 0 {
        Line::from(Span::styled(
            format!("... {hidden} more orders"),
            Style::default().fg(theme::DIM),
        ))
    } else {
        Line::from("")
    };
    let selected = Line::from(vec![
        Span::raw(format!("Selected: {} orders", model.selected_count())),
        Span::styled(
            "  ·  deletion cannot be undone",
            Style::default().fg(theme::ERROR),
        ),
    ]);
    Paragraph::new(vec![more, selected])
}

pub fn order_table_header() -> String {
    [
        pad_right("Sel", CHECK_COL_WIDTH),
        pad_right("No.", SEQ_COL_WIDTH),
        pad_right("Order", NAME_COL_WIDTH),
        pad_right("Order ID", ORDER_ID_COL_WIDTH),
        pad_right("Status", STATUS_COL_WIDTH),
        "Created".to_string(),
    ]
    .join(" ")
}

/// One list row: checkbox, 1-based sequence number, name, id, status and date.
pub fn order_row_text(order: &Order, index: usize, checked: bool, offset: UtcOffset) -> String {
    let check = if checked { "[✓]" } else { "[ ]" };
    let name = truncate_utf8_bytes(&order.display_name, NAME_BYTE_BUDGET);
    let status = truncate_utf8_bytes(&order.status_text, STATUS_BYTE_BUDGET);
    let date = format_order_date(order.created_at, offset);

    [
        pad_right(check, CHECK_COL_WIDTH),
        pad_right(&(index + 1).to_string(), SEQ_COL_WIDTH),
        pad_right(&name, NAME_COL_WIDTH),
        pad_right(&order.order_id, ORDER_ID_COL_WIDTH),
        pad_right(&status, STATUS_COL_WIDTH),
        date,
    ]
    .join(" ")
}

fn pad_right(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current >= width {
        return text.to_string();
    }
    format!("{}{}", text, " ".repeat(width.saturating_sub(current)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{SelectionEvent, update};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Cell;

    fn browse_model(count: usize, cursor: usize) -> SelectionModel {
        let orders = (0..count)
            .map(|index| Order {
                order_id: format!("9000{index:02}"),
                order_type: None,
                display_name: format!("show-{index}"),
                status_text: "paid".to_string(),
                created_at: Some(1_700_000_000),
            })
            .collect();
        (0..cursor).fold(SelectionModel::new(orders, UtcOffset::UTC), |model, _| {
            update(model, SelectionEvent::MoveDown).0
        })
    }

    fn render_lines(model: &SelectionModel, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal
            .draw(|frame| render_selection(frame, model))
            .expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .chunks(usize::from(width))
            .map(|row| row.iter().map(Cell::symbol).collect::<String>())
            .collect()
    }

    fn shows(lines: &[String], needle: &str) -> bool {
        lines.iter().any(|line| line.contains(needle))
    }

    #[test]
    fn short_terminal_counts_every_row_below_the_list() {
        let model = browse_model(30, 15);
        let lines = render_lines(&model, 120, 24);

        assert!(shows(&lines, "show-5 "));
        assert!(shows(&lines, "show-21 "));
        assert!(!shows(&lines, "show-4 "));
        assert!(!shows(&lines, "show-22 "));
        assert!(shows(&lines, "... 8 more orders"));
        assert!(shows(&lines, "► "));
    }

    #[test]
    fn tall_terminal_shows_full_window() {
        let model = browse_model(30, 15);
        let lines = render_lines(&model, 120, 40);

        assert!(shows(&lines, "show-24 "));
        assert!(!shows(&lines, "show-25 "));
        assert!(shows(&lines, "... 5 more orders"));
        assert!(shows(&lines, "Selected: 0 orders"));
    }

    #[test]
    fn footer_omits_more_line_when_everything_fits() {
        let lines = render_lines(&browse_model(3, 0), 120, 30);
        assert!(shows(&lines, "show-2 "));
        assert!(!shows(&lines, "more orders"));
        assert!(shows(&lines, "3 orders in total"));
    }

    fn order(name: &str, status: &str) -> Order {
        Order {
            order_id: "12345".to_string(),
            order_type: None,
            display_name: name.to_string(),
            status_text: status.to_string(),
            created_at: Some(1_700_000_000),
        }
    }

    #[test]
    fn row_shows_checkbox_sequence_and_date() {
        let row = order_row_text(&order("Concert", "paid"), 0, true, UtcOffset::UTC);
        assert!(row.starts_with("[✓]  1 "));
        assert!(row.contains("Concert"));
        assert!(row.contains("12345"));
        assert!(row.ends_with("2023-11-14"));

        let row = order_row_text(&order("Concert", "paid"), 9, false, UtcOffset::UTC);
        assert!(row.starts_with("[ ]  10 "));
    }

    #[test]
    fn row_truncates_long_name_and_status_by_bytes() {
        let long_name = "演唱会".repeat(10);
        let row = order_row_text(&order(&long_name, "待支付订单已取消"), 0, false, UtcOffset::UTC);
        let expected_name = truncate_utf8_bytes(&long_name, NAME_BYTE_BUDGET);
        assert!(expected_name.ends_with("..."));
        assert!(expected_name.len() <= NAME_BYTE_BUDGET);
        assert!(row.contains(&expected_name));
        assert!(row.contains("待支..."));
    }
}

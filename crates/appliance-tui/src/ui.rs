use appliance_core::state::POPULAR_BRANDS;
use appliance_core::{
    ApplianceType, AvailabilityBadge, Author, ChatMessage, ContentBlock, WizardStep,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_height(app.step())),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn input_height(step: WizardStep) -> u16 {
    match step {
        WizardStep::ApplianceType => ApplianceType::all().len() as u16 + 2,
        WizardStep::Brand => 10,
        WizardStep::BrandForBrand => 4,
        WizardStep::Model | WizardStep::DollarLimit | WizardStep::Results => 3,
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Appliance Research Assistant ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!(" {} ", app.api_url), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_text = if app.is_loading() {
        " SEARCHING "
    } else if app.step() == WizardStep::Results {
        " RESULTS "
    } else {
        " QUESTION "
    };

    let hints = match app.step() {
        _ if app.is_loading() => "PgUp/PgDn scroll  Ctrl+N new search  Ctrl+C quit",
        WizardStep::ApplianceType => "j/k select  Enter confirm  Ctrl+C quit",
        WizardStep::Brand => "Up/Down presets  type a brand  Enter confirm  Esc back",
        WizardStep::Model | WizardStep::DollarLimit => "Enter confirm  Esc back  PgUp/PgDn scroll",
        WizardStep::BrandForBrand => "Space toggle  y/n  Enter confirm  Esc back",
        WizardStep::Results => "Enter new search  j/k scroll  q quit",
    };

    let footer = Line::from(vec![
        Span::styled(mode_text, Style::default().bg(Color::Blue).fg(Color::White)),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(footer), area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in app.conversation.messages() {
        lines.extend(message_lines(message));
        lines.push(Line::default());
    }

    if app.is_loading() {
        lines.push(author_line(Author::Bot));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Searching{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    // Wrapped here so the scroll bounds count exactly the rows drawn
    let lines = wrap_lines(lines, app.chat_width as usize);
    let total_lines = lines.len().min(u16::MAX as usize) as u16;
    let follow = app.take_follow_request();
    app.clamp_scroll(total_lines, follow);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", app.step().label()));

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    lines.into_iter().flat_map(|line| wrap_line(line, width)).collect()
}

/// Break a styled line into rows of at most `width` cells, splitting
/// between words and only cutting a word that is wider than a whole row
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line.width() <= width {
        return vec![line];
    }

    let cells: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars().map(move |c| (c, span.style)))
        .collect();

    let mut rows: Vec<Vec<(char, Style)>> = Vec::new();
    let mut row: Vec<(char, Style)> = Vec::new();
    let mut start = 0;
    while start < cells.len() {
        // A word is a run of non-blank cells plus the blanks after it
        let mut end = start;
        while end < cells.len() && cells[end].0 != ' ' {
            end += 1;
        }
        let visible = end - start;
        while end < cells.len() && cells[end].0 == ' ' {
            end += 1;
        }

        if !row.is_empty() && row.len() + visible > width {
            while row.last().is_some_and(|(c, _)| *c == ' ') {
                row.pop();
            }
            rows.push(std::mem::take(&mut row));
        }
        for &cell in &cells[start..end] {
            if row.len() == width {
                if cell.0 == ' ' {
                    continue;
                }
                rows.push(std::mem::take(&mut row));
            }
            row.push(cell);
        }
        start = end;
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }

    rows.into_iter().map(|row| row_line(row, line.style)).collect()
}

fn row_line(row: Vec<(char, Style)>, style: Style) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut text = String::new();
    let mut current: Option<Style> = None;
    for (c, cell_style) in row {
        if current != Some(cell_style) {
            if let Some(prev) = current {
                spans.push(Span::styled(std::mem::take(&mut text), prev));
            }
            current = Some(cell_style);
        }
        text.push(c);
    }
    if let Some(prev) = current {
        spans.push(Span::styled(text, prev));
    }
    Line::from(spans).style(style)
}

fn author_line(author: Author) -> Line<'static> {
    match author {
        Author::User => Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Author::Bot => Line::from(Span::styled(
            "Assistant:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    }
}

fn message_lines(message: &ChatMessage) -> Vec<Line<'static>> {
    let mut lines = vec![author_line(message.author)];
    lines.extend(block_lines(&message.content));
    lines
}

fn bullet(text: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("  • ", Style::default().fg(Color::DarkGray)),
        Span::raw(text.to_string()),
    ])
}

fn label_value(label: &str, value: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value.to_string()),
        Span::raw("  "),
    ]
}

fn block_lines(block: &ContentBlock) -> Vec<Line<'static>> {
    match block {
        ContentBlock::PlainText { text } => {
            text.lines().map(|l| Line::from(l.to_string())).collect()
        }
        ContentBlock::OriginalProduct {
            brand,
            model,
            appliance_type,
            size,
            fuel,
            source,
            features,
        } => {
            let mut lines = vec![
                Line::from(Span::styled(
                    "Original Product Found!",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("{} {}", brand, model),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(
                    [
                        label_value("Type", appliance_type),
                        label_value("Size", size),
                        label_value("Fuel", fuel),
                    ]
                    .concat(),
                ),
                Line::from(label_value("Source", source)),
            ];
            lines.extend(features.iter().map(|f| bullet(f)));
            lines
        }
        ContentBlock::Summary {
            replacement_count,
            retailers_searched,
        } => vec![
            Line::from(Span::styled(
                format!("Found {} Replacement Options", replacement_count),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Searched {} retailers", retailers_searched),
                Style::default().fg(Color::DarkGray),
            )),
        ],
        ContentBlock::ReplacementCard {
            rank,
            product_name,
            retailer,
            badge,
            match_score,
            brand,
            price,
            size,
            fuel,
            features,
            url,
        } => {
            let mut header = vec![
                Span::styled(
                    format!("#{} ", rank),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(product_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!(" [{}]", retailer), Style::default().fg(Color::Blue)),
            ];
            if let Some(badge) = badge {
                let color = match badge {
                    AvailabilityBadge::InStock => Color::Green,
                    AvailabilityBadge::LimitedStock => Color::Yellow,
                };
                header.push(Span::raw(" "));
                header.push(Span::styled(
                    format!(" {} ", badge.label()),
                    Style::default().fg(Color::Black).bg(color),
                ));
            }

            let mut lines = vec![
                Line::from(header),
                Line::from(label_value("Match score", &match_score.to_string())),
                Line::from(
                    [
                        label_value("Brand", brand),
                        label_value("Price", price),
                        label_value("Size", size),
                        label_value("Fuel", fuel),
                    ]
                    .concat(),
                ),
            ];
            lines.extend(features.iter().map(|f| bullet(f)));
            lines.push(Line::from(vec![
                Span::styled("View Product: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    url.clone(),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                ),
            ]));
            lines
        }
        ContentBlock::Error { kind, message } => vec![
            Line::from(vec![
                Span::styled(
                    format!("{}: ", kind.title()),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(message.clone(), Style::default().fg(Color::Red)),
            ]),
            Line::from(Span::styled(
                kind.hint().to_string(),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ],
    }
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let step = app.step();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} ", step.label()));

    match step {
        WizardStep::ApplianceType => {
            let items: Vec<ListItem> = ApplianceType::all()
                .iter()
                .map(|t| ListItem::new(format!(" {} ", t.display_name())))
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(highlight_style())
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, area, &mut app.appliance_state);
        }
        WizardStep::Brand => {
            let inner = block.inner(area);
            frame.render_widget(block, area);

            let [presets_area, text_area] =
                Layout::horizontal([Constraint::Length(18), Constraint::Min(0)]).areas(inner);

            let items: Vec<ListItem> = POPULAR_BRANDS
                .iter()
                .map(|b| ListItem::new(format!(" {} ", b)))
                .collect();
            let list = List::new(items)
                .highlight_style(highlight_style())
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, presets_area, &mut app.brand_state);

            let [text_box, _] =
                Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(text_area);
            let editing = app.brand_uses_text();
            render_text_box(app, frame, text_box, "Or type brand name...", editing, Borders::ALL);
        }
        WizardStep::Model => {
            render_text_box_in(app, frame, area, block, "e.g., JGB735");
        }
        WizardStep::DollarLimit => {
            render_text_box_in(app, frame, area, block, "Leave empty for no limit");
        }
        WizardStep::BrandForBrand => {
            let same_brand = if app.conversation.state().brand.is_empty() {
                "Yes - Same brand only".to_string()
            } else {
                format!("Yes - Same brand only ({})", app.conversation.state().brand)
            };
            let options = [
                ("No - Show all brands".to_string(), !app.brand_for_brand),
                (same_brand, app.brand_for_brand),
            ];
            let lines: Vec<Line> = options
                .into_iter()
                .map(|(label, selected)| {
                    if selected {
                        Line::from(Span::styled(format!("(•) {}", label), highlight_style()))
                    } else {
                        Line::from(format!("( ) {}", label))
                    }
                })
                .collect();
            frame.render_widget(Paragraph::new(lines).block(block), area);
        }
        WizardStep::Results => {
            let text = if app.is_loading() {
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                Span::styled(
                    format!("Searching{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )
            } else {
                Span::styled(
                    "Press Enter to start a new search",
                    Style::default().fg(Color::Green),
                )
            };
            frame.render_widget(Paragraph::new(Line::from(text)).block(block), area);
        }
    }
}

fn highlight_style() -> Style {
    Style::default()
        .bg(Color::Cyan)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

fn render_text_box_in(app: &App, frame: &mut Frame, area: Rect, block: Block, placeholder: &str) {
    let inner = block.inner(area);
    frame.render_widget(block, area);
    render_text_box(app, frame, inner, placeholder, true, Borders::NONE);
}

fn render_text_box(
    app: &App,
    frame: &mut Frame,
    area: Rect,
    placeholder: &str,
    editing: bool,
    borders: Borders,
) {
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);

    // Calculate scroll offset to keep cursor visible
    let inner_width = inner.width as usize;
    let cursor_pos = app.text_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let content = if app.text_input.is_empty() {
        Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = app
            .text_input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Span::styled(visible, Style::default().fg(Color::Cyan))
    };

    frame.render_widget(Paragraph::new(Line::from(content)).block(block), area);

    if editing && inner.height > 0 {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}

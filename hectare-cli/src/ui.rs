use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Map, MapResolution},
        Block, Borders, Paragraph, Wrap,
    },
};
use ratatui_image::StatefulImage;

use hectare::panel::{COORDINATES_TITLE, TITLE};
use hectare::{DrawLayer, PanelContent, Point};

use crate::app::App;

const SPINNER: [char; 8] = ['|', '/', '-', '\\', '|', '/', '-', '\\'];

/// Rows reserved for the preview image in the sidebar.
const PREVIEW_ROWS: u16 = 12;

pub fn ui(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(3)])
        .split(frame.area());

    let top_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(67), Constraint::Percentage(33)])
        .split(main_layout[0]);

    render_map(frame, app, top_layout[0]);
    render_sidebar(frame, app, top_layout[1]);
    render_status(frame, app, main_layout[1]);
}

fn draw_ring(ctx: &mut Context, ring: &[Point], color: Color) {
    for pair in ring.windows(2) {
        ctx.draw(&CanvasLine {
            x1: pair[0].x,
            y1: pair[0].y,
            x2: pair[1].x,
            y2: pair[1].y,
            color,
        });
    }
}

fn draw_layer(ctx: &mut Context, layer: &DrawLayer, cursor: Point) {
    let selected = layer.selected().map(|f| f.id.as_str());
    for (index, feature) in layer.features().iter().enumerate() {
        let color = if Some(feature.id.as_str()) == selected {
            Color::Yellow
        } else if index == 0 {
            Color::LightGreen
        } else {
            Color::Gray
        };
        draw_ring(ctx, &feature.polygon.outer, color);
        for hole in &feature.polygon.holes {
            draw_ring(ctx, hole, color);
        }
    }

    // Open sketch plus a rubber band to the cursor
    let sketch = layer.sketch();
    draw_ring(ctx, sketch, Color::Magenta);
    if let Some(last) = sketch.last() {
        ctx.draw(&CanvasLine {
            x1: last.x,
            y1: last.y,
            x2: cursor.x,
            y2: cursor.y,
            color: Color::DarkGray,
        });
    }
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    if app.is_locating() {
        let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
        let waiting = Paragraph::new(format!("[{}] Locating...", spinner))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(" Map ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        frame.render_widget(waiting, area);
        return;
    }

    let (Some(map), Some(layer)) = (app.map(), app.layer()) else {
        return;
    };

    let block = Block::default()
        .title(format!(" {} ", map.style()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    let (x_bounds, y_bounds) = map.bounds(inner.width, inner.height);
    let cursor = map.center();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::Blue,
                resolution: MapResolution::High,
            });
            ctx.layer();
            draw_layer(ctx, layer, cursor);
            ctx.print(cursor.x, cursor.y, Span::styled("+", Style::default().fg(Color::Red)));
        });

    frame.render_widget(canvas, area);
}

fn render_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", TITLE))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &app.panel {
        PanelContent::Empty { message } => {
            let text = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true });
            frame.render_widget(text, inner);
        }
        PanelContent::Selected {
            area_label,
            polygons,
            ..
        } => {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(2),
                    Constraint::Length(PREVIEW_ROWS),
                    Constraint::Min(3),
                ])
                .split(inner);

            let label = Paragraph::new(area_label.as_str())
                .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
                .wrap(Wrap { trim: true });
            frame.render_widget(label, layout[0]);

            let mut lines = vec![Line::from(Span::styled(
                COORDINATES_TITLE,
                Style::default().fg(Color::Magenta),
            ))];
            for polygon in polygons {
                lines.push(Line::from(format!("{}:", polygon.label)));
                lines.extend(polygon.points.iter().map(|p| Line::from(format!("  {}", p))));
            }
            frame.render_widget(Paragraph::new(lines), layout[2]);

            if let Some(ref mut preview) = app.preview {
                frame.render_stateful_widget(StatefulImage::new(None), layout[1], preview);
            }
        }
    }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let position = match (app.map(), app.layer()) {
        (Some(map), Some(layer)) => format!(
            "{} | {:.5}, {:.5} z{:.0} | ",
            layer.mode().name(),
            map.center().lat(),
            map.center().lng(),
            map.zoom()
        ),
        _ => String::new(),
    };
    let log = app
        .log_dir
        .as_ref()
        .map(|dir| format!(" | logs: {}", dir.display()))
        .unwrap_or_default();

    let status = Paragraph::new(vec![
        Line::from(format!("{}{}{}", position, app.status, log)),
        Line::from(Span::styled(
            "WASD pan  +/- zoom  Space vertex  f finish  u undo  Esc cancel  p polygon  Tab select  HJKL move  x trash  e export  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().borders(Borders::TOP));

    frame.render_widget(status, area);
}

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color as TuiColor, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine};
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::Frame;

use timer_core::{format_ms, whole_seconds, Color, DrawOp, Mode, Point, Shape, WaveFrame};

use crate::app::{Screen, TimerApp};

/// Material dark surface. Alpha layers are blended against it.
pub const BACKGROUND: Color = Color::rgb(0x12, 0x12, 0x12);
const FOREGROUND: TuiColor = TuiColor::Rgb(0xE8, 0xE8, 0xE8);
const DIM: TuiColor = TuiColor::Rgb(0x70, 0x70, 0x70);

/// Virtual canvas width; height follows the terminal's aspect ratio.
const CANVAS_WIDTH: f64 = 360.0;

/// Neighbours shown either side of the selected preset.
const PICKER_RADIUS: usize = 3;

const HELP_TEXT: &str = "WAVETIMER

Selector
  left/right, h/l   choose duration
  enter, space      start

Countdown
  space, p          pause / resume
  r                 reset

  ?                 this help
  q, esc            quit";

// 3x5 block glyphs for 0-9
const DIGITS: [[&str; 5]; 10] = [
    ["███", "█ █", "█ █", "█ █", "███"],
    [" █ ", "██ ", " █ ", " █ ", "███"],
    ["███", "  █", "███", "█  ", "███"],
    ["███", "  █", "███", "  █", "███"],
    ["█ █", "█ █", "███", "  █", "  █"],
    ["███", "█  ", "███", "  █", "███"],
    ["███", "█  ", "███", "█ █", "███"],
    ["███", "  █", "  █", "  █", "  █"],
    ["███", "█ █", "███", "█ █", "███"],
    ["███", "█ █", "███", "  █", "███"],
];

fn tui_color(c: Color) -> TuiColor {
    TuiColor::Rgb(c.r, c.g, c.b)
}

pub fn draw(frame: &mut Frame, app: &TimerApp, now_ms: u64) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(tui_color(BACKGROUND)).fg(FOREGROUND)),
        area,
    );

    match app.screen {
        Screen::Selector => draw_selector(frame, area, app),
        Screen::Countdown | Screen::Draining => draw_countdown(frame, area, app, now_ms),
    }

    if app.help_visible {
        draw_help(frame, area);
    } else if app.confirm_exit {
        draw_confirm_exit(frame, area);
    }
}

/// Big block-digit rendering of `n`, one string per row.
pub fn big_digits(n: u64) -> Vec<String> {
    let digits: Vec<usize> = n
        .to_string()
        .bytes()
        .map(|b| usize::from(b - b'0'))
        .collect();
    (0..5)
        .map(|row| {
            digits
                .iter()
                .map(|&d| DIGITS[d][row].replace('█', "██").replace(' ', "  "))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect()
}

/// Range of preset indices to show around the cursor.
fn visible_presets(cursor: usize, len: usize) -> std::ops::Range<usize> {
    let start = cursor.saturating_sub(PICKER_RADIUS);
    let end = (cursor + PICKER_RADIUS + 1).min(len);
    start..end
}

fn draw_selector(frame: &mut Frame, area: Rect, app: &TimerApp) {
    let rows = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(5),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "WAVETIMER",
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, rows[0]);

    // Selected preset in big digits, neighbours small and dimmed under it
    let picker = &app.picker;
    let mut lines: Vec<Line> = big_digits(u64::from(picker.selected_seconds()))
        .into_iter()
        .map(|row| Line::from(Span::styled(row, Style::default().fg(tui_color(app.config.color)))))
        .collect();

    let presets = picker.presets();
    let mut spans = Vec::new();
    for i in visible_presets(picker.cursor, presets.len()) {
        let label = format!(" {:>2} ", presets[i]);
        let style = if i == picker.cursor {
            Style::default()
                .fg(FOREGROUND)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(DIM)
        };
        spans.push(Span::styled(label, style));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(spans));

    let picker_area = Rect {
        height: rows[2].height + 2,
        ..rows[2]
    }
    .intersection(area);
    frame.render_widget(
        Paragraph::new(Text::from(lines)).alignment(Alignment::Center),
        picker_area,
    );

    let nav = Paragraph::new("left/right=choose  ENTER=start  ?=help  q=quit")
        .style(Style::default().fg(DIM))
        .alignment(Alignment::Center);
    frame.render_widget(nav, rows[4]);
}

fn draw_countdown(frame: &mut Frame, area: Rect, app: &TimerApp, now_ms: u64) {
    let rows = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(area);
    let wave_area = rows[0];

    if wave_area.width > 0 && wave_area.height > 0 {
        // Braille dots are close to square: 2 per cell across, 4 down
        let dots_x = f64::from(wave_area.width) * 2.0;
        let dots_y = f64::from(wave_area.height) * 4.0;
        let canvas_height = CANVAS_WIDTH * dots_y / dots_x;

        let wave = app.wave_frame(CANVAS_WIDTH as f32, canvas_height as f32, now_ms);
        let column_step = CANVAS_WIDTH / dots_x;
        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .background_color(tui_color(BACKGROUND))
            .x_bounds([0.0, CANVAS_WIDTH])
            .y_bounds([0.0, canvas_height])
            .paint(|ctx| paint_wave(ctx, &wave, column_step));
        frame.render_widget(canvas, wave_area);
    }

    // Remaining whole seconds, centred over the wave
    let digits = big_digits(whole_seconds(app.time_left_ms()));
    let number_height = digits.len() as u16;
    let number_area = Rect {
        y: wave_area.y + wave_area.height.saturating_sub(number_height) / 2,
        height: number_height.min(wave_area.height),
        ..wave_area
    };
    let number = Paragraph::new(Text::from(
        digits.into_iter().map(Line::from).collect::<Vec<_>>(),
    ))
    .style(Style::default().fg(FOREGROUND).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center);
    frame.render_widget(number, number_area);

    let status = match (app.screen, app.timer.mode) {
        (Screen::Draining, _) => "RESET",
        (_, Mode::Running) => "RUNNING",
        (_, Mode::Paused) => "PAUSED",
        (_, Mode::Selecting) => "",
    };
    let footer = Line::from(vec![
        Span::styled(
            format!(" {:<8}{} ", status, format_ms(app.time_left_ms())),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " SPACE=pause/resume  r=reset  ?=help  q=quit",
            Style::default().fg(DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(footer), rows[1]);
}

/// Replay a `WaveFrame` onto a y-up canvas, one column at a time.
///
/// The canvas keeps one color per cell, so alpha layers are composited
/// here: each column is cut into bands wherever a shape starts or ends, and
/// every band gets the ops covering it blended in paint order.
fn paint_wave(ctx: &mut Context, wave: &WaveFrame, column_step: f64) {
    let height = f64::from(wave.height);
    let flip = |y: f32| height - f64::from(y);

    let mut cx = 0.0;
    while cx <= f64::from(wave.width) {
        let spans: Vec<(f32, f32, &DrawOp)> = wave
            .ops
            .iter()
            .filter_map(|op| {
                column_span(&op.shape, cx as f32, wave.top_offset).map(|(top, bottom)| (top, bottom, op))
            })
            .collect();

        let mut edges: Vec<f32> = spans.iter().flat_map(|&(top, bottom, _)| [top, bottom]).collect();
        edges.sort_by(f32::total_cmp);
        edges.dedup();

        for band in edges.windows(2) {
            let (top, bottom) = (band[0], band[1]);
            let mid = (top + bottom) * 0.5;
            let mut covered = false;
            let color = spans
                .iter()
                .filter(|&&(t, b, _)| t <= mid && mid <= b)
                .fold(BACKGROUND, |under, &(_, _, op)| {
                    covered = true;
                    op.color.over(under, op.alpha)
                });
            if covered {
                ctx.draw(&CanvasLine::new(cx, flip(top), cx, flip(bottom), tui_color(color)));
            }
        }
        cx += column_step;
    }
}

/// Vertical extent (y-down, top first) a shape covers in column `x`.
fn column_span(shape: &Shape, x: f32, baseline: f32) -> Option<(f32, f32)> {
    match shape {
        Shape::Rect {
            x: left,
            y,
            width,
            height,
        } => (*height > 0.0 && x >= *left && x <= *left + *width).then(|| (*y, *y + *height)),
        Shape::Path(points) => {
            // First point is the move-to on the baseline
            let y = sample_at(points.get(1..).unwrap_or_default(), x)?;
            (y < baseline).then_some((y, baseline))
        }
    }
}

/// Linear interpolation of a polyline sorted by x.
fn sample_at(points: &[Point], x: f32) -> Option<f32> {
    let first = points.first()?;
    if x <= first.x {
        return Some(first.y);
    }
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if x <= b.x {
            if b.x <= a.x {
                return Some(b.y);
            }
            let t = (x - a.x) / (b.x - a.x);
            return Some(a.y + (b.y - a.y) * t);
        }
    }
    points.last().map(|p| p.y)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let lines = HELP_TEXT.lines().count() as u16;
    let popup = centered(area, 44, lines + 4);
    frame.render_widget(Clear, popup);
    let help = Paragraph::new(HELP_TEXT).block(
        Block::bordered()
            .title(" Help ")
            .title_bottom(" any key to close ")
            .style(Style::default().bg(tui_color(BACKGROUND)).fg(FOREGROUND)),
    );
    frame.render_widget(help, popup);
}

fn draw_confirm_exit(frame: &mut Frame, area: Rect) {
    let popup = centered(area, 34, 7);
    frame.render_widget(Clear, popup);
    let text = "A timer is still running.\nQuit anyway?\n\n  y = quit   n = cancel";
    let dialog = Paragraph::new(text).block(
        Block::bordered()
            .title(" Timer Running ")
            .style(Style::default().bg(tui_color(BACKGROUND)).fg(FOREGROUND)),
    );
    frame.render_widget(dialog, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::pump::Pump;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    fn rows(buf: &Buffer) -> Vec<String> {
        buf.content()
            .chunks(buf.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn render(app: &TimerApp, now_ms: u64) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(72, 24)).unwrap();
        terminal.draw(|f| draw(f, app, now_ms)).unwrap();
        rows(terminal.backend().buffer())
    }

    fn app() -> TimerApp {
        TimerApp::new(AppConfig::default(), Pump::detached(16), 0)
    }

    #[test]
    fn test_big_digits() {
        let rows = big_digits(30);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], "██████  ██████");
        assert_eq!(rows[1], "    ██  ██  ██");
        assert_eq!(big_digits(0)[2], "██  ██");
    }

    #[test]
    fn test_visible_presets() {
        assert_eq!(visible_presets(0, 12), 0..4);
        assert_eq!(visible_presets(5, 12), 2..9);
        assert_eq!(visible_presets(11, 12), 8..12);
    }

    #[test]
    fn test_sample_at() {
        let pts = [
            Point { x: 0.0, y: 4.0 },
            Point { x: 10.0, y: 8.0 },
            Point { x: 20.0, y: 8.0 },
        ];
        assert_eq!(sample_at(&pts, -1.0), Some(4.0));
        assert_eq!(sample_at(&pts, 5.0), Some(6.0));
        assert_eq!(sample_at(&pts, 15.0), Some(8.0));
        assert_eq!(sample_at(&pts, 99.0), Some(8.0));
        assert_eq!(sample_at(&[], 1.0), None);
    }

    #[test]
    fn test_selector_screen() {
        let screen = render(&app(), 0).join("\n");
        assert!(screen.contains("WAVETIMER"));
        assert!(screen.contains(" 30 "));
        assert!(screen.contains(" 15 "));
        assert!(screen.contains(" 45 "));
        assert!(!screen.contains(" 50 "));
        assert!(screen.contains("ENTER=start"));
    }

    #[test]
    fn test_countdown_screen() {
        let mut app = app();
        app.start_countdown(0);
        app.handle_pump(1_000);
        let screen = render(&app, 1_000).join("\n");
        assert!(screen.contains("RUNNING"));
        assert!(screen.contains("00:29"));
        assert!(screen.contains("SPACE=pause/resume"));
        // Wave fill shows up as braille
        assert!(screen.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
    }

    #[test]
    fn test_paused_and_confirm_dialog() {
        let mut app = app();
        app.start_countdown(0);
        app.handle_pump(2_000);
        app.toggle_pause(2_000);
        let screen = render(&app, 2_000).join("\n");
        assert!(screen.contains("PAUSED"));

        app.toggle_pause(2_100);
        app.confirm_exit = true;
        let screen = render(&app, 2_100).join("\n");
        assert!(screen.contains("Quit anyway?"));
    }

    #[test]
    fn test_help_overlay() {
        let mut app = app();
        app.help_visible = true;
        let screen = render(&app, 0).join("\n");
        assert!(screen.contains("choose duration"));
        assert!(screen.contains("pause / resume"));
    }

    fn flat_path(y: f32, width: f32, baseline: f32) -> Shape {
        Shape::Path(vec![
            Point { x: 0.0, y: baseline },
            Point { x: 0.0, y },
            Point { x: width, y },
            Point { x: width, y: baseline },
        ])
    }

    #[test]
    fn test_overlapping_waves_stack_their_alphas() {
        // 20x40 canvas units on 10x10 cells: one unit per braille dot
        let purple = Color::rgb(0xBB, 0x86, 0xFC);
        let wave = WaveFrame {
            width: 20.0,
            height: 40.0,
            top_offset: 40.0,
            ops: vec![
                DrawOp {
                    shape: flat_path(10.0, 20.0, 40.0),
                    color: purple,
                    alpha: 0.5,
                },
                DrawOp {
                    shape: flat_path(20.0, 20.0, 40.0),
                    color: purple,
                    alpha: 0.3,
                },
            ],
        };

        let mut terminal = Terminal::new(TestBackend::new(10, 10)).unwrap();
        terminal
            .draw(|f| {
                let canvas = Canvas::default()
                    .marker(Marker::Braille)
                    .background_color(tui_color(BACKGROUND))
                    .x_bounds([0.0, 20.0])
                    .y_bounds([0.0, 40.0])
                    .paint(|ctx| paint_wave(ctx, &wave, 1.0));
                f.render_widget(canvas, f.area());
            })
            .unwrap();
        let buf = terminal.backend().buffer();

        let upper_only = purple.over(BACKGROUND, 0.5);
        let stacked = purple.over(upper_only, 0.3);
        assert_eq!(upper_only, Color::rgb(103, 76, 135));
        assert_eq!(stacked, Color::rgb(128, 93, 170));

        assert_eq!(buf.cell((5u16, 3u16)).unwrap().fg, tui_color(upper_only));
        assert_eq!(buf.cell((5u16, 7u16)).unwrap().fg, tui_color(stacked));
    }

    #[test]
    fn test_column_span() {
        let rect = Shape::Rect {
            x: 0.0,
            y: 30.0,
            width: 20.0,
            height: 10.0,
        };
        assert_eq!(column_span(&rect, 5.0, 30.0), Some((30.0, 40.0)));
        assert_eq!(column_span(&rect, 25.0, 30.0), None);

        let wave = flat_path(12.0, 20.0, 30.0);
        assert_eq!(column_span(&wave, 5.0, 30.0), Some((12.0, 30.0)));
        // Sitting on the baseline covers nothing
        assert_eq!(column_span(&flat_path(30.0, 20.0, 30.0), 5.0, 30.0), None);
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let mut app = app();
        app.start_countdown(0);
        app.help_visible = true;
        let mut terminal = Terminal::new(TestBackend::new(3, 2)).unwrap();
        terminal.draw(|f| draw(f, &app, 100)).unwrap();
    }
}

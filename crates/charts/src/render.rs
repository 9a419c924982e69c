//! SVG rendering of a [`Chart`].

use chrono::{Duration, NaiveDateTime};

use crate::chart::{Chart, Series, SeriesKind, TimeTicks};
use crate::scale::{
    auto_time_ticks, daily_time_ticks, format_tick, nice_ticks, to_seconds, LinearScale,
};
use crate::svg::{Anchor, Color, SvgDocument, TextStyle};

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 110.0;

const Y_TICK_TARGET: usize = 6;
const Y_PADDING: f64 = 0.05;

/// x tick format used when a daily axis has no midnight to label.
const DAILY_FALLBACK_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Plot rectangle in pixels.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl Frame {
    fn for_chart(chart: &Chart) -> Self {
        let w = f64::from(chart.width);
        let h = f64::from(chart.height);
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            right: (w - MARGIN_RIGHT).max(MARGIN_LEFT + 1.0),
            bottom: (h - MARGIN_BOTTOM).max(MARGIN_TOP + 1.0),
        }
    }

    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }

    fn clamp_y(&self, y: f64) -> f64 {
        y.clamp(self.top, self.bottom)
    }
}

/// Render `chart` to a standalone SVG document.
pub fn render_svg(chart: &Chart) -> String {
    let frame = Frame::for_chart(chart);
    let mut doc = SvgDocument::new(chart.width, chart.height).title(&chart.title);
    doc.rect(
        0.0,
        0.0,
        f64::from(chart.width),
        f64::from(chart.height),
        Some(Color::WHITE),
        None,
    );
    draw_titles(&mut doc, chart, &frame);

    let Some((lo, hi)) = chart.time_extent() else {
        doc.text(
            frame.left + frame.width() / 2.0,
            frame.top + frame.height() / 2.0,
            "No data",
            TextStyle {
                size: 16.0,
                anchor: Anchor::Middle,
                ..TextStyle::default()
            },
        );
        doc.rect(
            frame.left,
            frame.top,
            frame.width(),
            frame.height(),
            None,
            Some((Color::BLACK, 1.0)),
        );
        return doc.finish();
    };

    let span = hi - lo;
    let pad = if span <= Duration::zero() {
        Duration::minutes(30)
    } else {
        span / 50
    };
    let (x_start, x_end) = (lo - pad, hi + pad);
    let xs = LinearScale::new(
        (to_seconds(x_start), to_seconds(x_end)),
        (frame.left, frame.right),
    );
    let (y_min, y_max) = y_domain(chart);
    let ys = LinearScale::new((y_min, y_max), (frame.bottom, frame.top));

    draw_y_axis(&mut doc, &frame, &ys);
    draw_x_axis(&mut doc, chart, &frame, &xs, x_start, x_end);

    let has_bars = chart
        .series
        .iter()
        .any(|s| matches!(s.kind, SeriesKind::Bar { .. }));
    if has_bars && y_min < 0.0 && y_max > 0.0 {
        let y0 = ys.map(0.0);
        doc.line(frame.left, y0, frame.right, y0, Color::BLACK, 0.8);
    }

    for series in &chart.series {
        match series.kind {
            SeriesKind::Bar { width, edge } => {
                draw_bars(&mut doc, &frame, &xs, &ys, series, width, edge)
            }
            SeriesKind::Line { stroke_width } => {
                draw_line(&mut doc, &frame, &xs, &ys, series, stroke_width)
            }
        }
    }

    doc.rect(frame.left, frame.top, frame.width(), frame.height(), None, Some((Color::BLACK, 1.0)));
    if chart.legend {
        draw_legend(&mut doc, chart, &frame);
    }
    doc.finish()
}

/// Fixed limits when given and usable, otherwise the data range (with zero
/// for bar charts) plus a small margin.
fn y_domain(chart: &Chart) -> (f64, f64) {
    if let Some((a, b)) = chart.y_range {
        if a.is_finite() && b.is_finite() && a < b {
            return (a, b);
        }
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for series in &chart.series {
        for (_, v) in series.finite_points() {
            min = min.min(v);
            max = max.max(v);
        }
        if matches!(series.kind, SeriesKind::Bar { .. }) {
            min = min.min(0.0);
            max = max.max(0.0);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span == 0.0 {
        let pad = if max == 0.0 { 1.0 } else { max.abs() * 0.1 };
        return (min - pad, max + pad);
    }
    (min - span * Y_PADDING, max + span * Y_PADDING)
}

fn draw_titles(doc: &mut SvgDocument, chart: &Chart, frame: &Frame) {
    let mid_x = frame.left + frame.width() / 2.0;
    doc.text(
        mid_x,
        30.0,
        &chart.title,
        TextStyle {
            size: 18.0,
            anchor: Anchor::Middle,
            bold: true,
            ..TextStyle::default()
        },
    );
    if !chart.x_label.is_empty() {
        doc.text(
            mid_x,
            f64::from(chart.height) - 12.0,
            &chart.x_label,
            TextStyle {
                size: 14.0,
                anchor: Anchor::Middle,
                ..TextStyle::default()
            },
        );
    }
    if !chart.y_label.is_empty() {
        doc.text(
            22.0,
            frame.top + frame.height() / 2.0,
            &chart.y_label,
            TextStyle {
                size: 14.0,
                anchor: Anchor::Middle,
                rotate: -90.0,
                ..TextStyle::default()
            },
        );
    }
}

fn draw_y_axis(doc: &mut SvgDocument, frame: &Frame, ys: &LinearScale) {
    let (min, max) = ys.domain();
    let (ticks, step) = nice_ticks(min, max, Y_TICK_TARGET);
    for value in ticks {
        let y = ys.map(value);
        doc.line(frame.left, y, frame.right, y, Color::LIGHT_GRAY, 0.8);
        doc.line(frame.left - 5.0, y, frame.left, y, Color::BLACK, 1.0);
        doc.text(
            frame.left - 8.0,
            y + 4.0,
            &format_tick(value, step),
            TextStyle {
                size: 11.0,
                anchor: Anchor::End,
                ..TextStyle::default()
            },
        );
    }
}

fn draw_x_axis(
    doc: &mut SvgDocument,
    chart: &Chart,
    frame: &Frame,
    xs: &LinearScale,
    start: NaiveDateTime,
    end: NaiveDateTime,
) {
    let (ticks, format) = match chart.x_ticks {
        TimeTicks::Auto => (auto_time_ticks(start, end), chart.x_format.as_str()),
        TimeTicks::Daily => match daily_time_ticks(start, end) {
            Some(ticks) => (ticks, chart.x_format.as_str()),
            None => (auto_time_ticks(start, end), DAILY_FALLBACK_FORMAT),
        },
    };
    for ts in ticks {
        let x = xs.map(to_seconds(ts));
        doc.line(x, frame.bottom, x, frame.bottom + 5.0, Color::BLACK, 1.0);
        doc.text(
            x,
            frame.bottom + 18.0,
            &ts.format(format).to_string(),
            TextStyle {
                size: 11.0,
                anchor: Anchor::End,
                rotate: -45.0,
                ..TextStyle::default()
            },
        );
    }
}

fn draw_bars(
    doc: &mut SvgDocument,
    frame: &Frame,
    xs: &LinearScale,
    ys: &LinearScale,
    series: &Series,
    width: Duration,
    edge: Option<Color>,
) {
    let px_width = xs
        .length(width.num_milliseconds() as f64 / 1_000.0)
        .max(1.0);
    let zero = ys.map(0.0);
    for (ts, v) in series.finite_points() {
        let x = xs.map(to_seconds(ts)) - px_width / 2.0;
        let value_y = ys.map(v);
        let top = frame.clamp_y(value_y.min(zero));
        let bottom = frame.clamp_y(value_y.max(zero));
        doc.rect(
            x,
            top,
            px_width,
            bottom - top,
            Some(series.color),
            edge.map(|c| (c, 0.5)),
        );
    }
}

fn draw_line(
    doc: &mut SvgDocument,
    frame: &Frame,
    xs: &LinearScale,
    ys: &LinearScale,
    series: &Series,
    stroke_width: f64,
) {
    let mut run: Vec<(f64, f64)> = Vec::new();
    let flush = |doc: &mut SvgDocument, run: &mut Vec<(f64, f64)>| {
        match run.len() {
            0 => {}
            1 => doc.circle(run[0].0, run[0].1, stroke_width + 1.0, series.color),
            _ => doc.polyline(run, series.color, stroke_width),
        }
        run.clear();
    };
    for &(ts, v) in &series.points {
        match v.filter(|v| v.is_finite()) {
            Some(v) => run.push((xs.map(to_seconds(ts)), frame.clamp_y(ys.map(v)))),
            None => flush(doc, &mut run),
        }
    }
    flush(doc, &mut run);
}

fn draw_legend(doc: &mut SvgDocument, chart: &Chart, frame: &Frame) {
    let longest = chart
        .series
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0) as f64;
    let width = longest * 7.0 + 44.0;
    let row = 20.0;
    let height = row * chart.series.len() as f64 + 8.0;
    let left = frame.right - width - 10.0;
    let top = frame.top + 10.0;
    doc.rect(left, top, width, height, Some(Color::WHITE), Some((Color::GRAY, 0.8)));

    for (i, series) in chart.series.iter().enumerate() {
        let y = top + 4.0 + row * i as f64 + row / 2.0;
        match series.kind {
            SeriesKind::Bar { edge, .. } => doc.rect(
                left + 8.0,
                y - 6.0,
                20.0,
                12.0,
                Some(series.color),
                edge.map(|c| (c, 0.5)),
            ),
            SeriesKind::Line { stroke_width } => {
                doc.line(left + 8.0, y, left + 28.0, y, series.color, stroke_width)
            }
        }
        doc.text(
            left + 36.0,
            y + 4.0,
            &series.label,
            TextStyle {
                size: 12.0,
                ..TextStyle::default()
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_empty_chart_says_no_data() {
        let chart = Chart::new("Price Variation over Time", 800, 400).y_label("Price (USD)");
        let svg = render_svg(&chart);
        assert!(svg.contains(">No data</text>"));
        assert!(svg.contains(">Price Variation over Time</text>"));
        assert!(svg.contains(">Price (USD)</text>"));
    }

    #[test]
    fn test_bars_filled_with_edge() {
        let chart = Chart::new("bars", 800, 400)
            .x_axis("Timestamp", TimeTicks::Auto, "%H:%M")
            .series(Series::bar(
                "Buys",
                Color::GREEN,
                Duration::minutes(3),
                Some(Color::BLACK),
                vec![(at(1, 10, 0), Some(5.0)), (at(1, 10, 5), Some(7.0))],
            ))
            .series(Series::bar(
                "Sells",
                Color::RED,
                Duration::minutes(3),
                Some(Color::BLACK),
                vec![(at(1, 10, 0), Some(-3.0)), (at(1, 10, 5), Some(-2.0))],
            ));
        let svg = render_svg(&chart);
        assert_eq!(svg.matches("fill=\"#008000\" stroke=\"#000000\"").count(), 2);
        assert_eq!(svg.matches("fill=\"#ff0000\" stroke=\"#000000\"").count(), 2);
        assert!(svg.contains(">10:00</text>"));
        assert!(svg.contains(">10:05</text>"));
        assert!(svg.contains("rotate(-45"));
    }

    #[test]
    fn test_fixed_y_range_sets_ticks() {
        let chart = Chart::new("t", 800, 400)
            .y_range(Some((-13.0, 25.0)))
            .series(Series::bar(
                "b",
                Color::GREEN,
                Duration::minutes(3),
                None,
                vec![(at(1, 1, 0), Some(20.0))],
            ));
        let svg = render_svg(&chart);
        for label in [">-10</text>", ">0</text>", ">10</text>", ">20</text>"] {
            assert!(svg.contains(label), "missing tick {label}");
        }
    }

    #[test]
    fn test_line_breaks_at_gaps() {
        let chart = Chart::new("t", 800, 400).series(Series::line(
            "ratio",
            Color::GREEN,
            2.0,
            vec![
                (at(1, 1, 0), Some(1.0)),
                (at(1, 2, 0), Some(2.0)),
                (at(1, 3, 0), None),
                (at(1, 4, 0), Some(1.5)),
                (at(1, 5, 0), Some(1.0)),
                (at(1, 6, 0), None),
                (at(1, 7, 0), Some(3.0)),
            ],
        ));
        let svg = render_svg(&chart);
        assert_eq!(svg.matches("<path").count(), 2);
        // Isolated sample drawn as a marker.
        assert_eq!(svg.matches("<circle").count(), 1);
    }

    #[test]
    fn test_daily_ticks_and_fallback() {
        let daily = Chart::new("t", 800, 400)
            .x_axis("Timestamp", TimeTicks::Daily, "%Y-%m-%d")
            .series(Series::line(
                "p",
                Color::BLUE,
                2.0,
                vec![(at(1, 12, 0), Some(1.0)), (at(3, 12, 0), Some(2.0))],
            ));
        let svg = render_svg(&daily);
        assert!(svg.contains(">2024-03-02</text>"));
        assert!(svg.contains(">2024-03-03</text>"));

        let same_day = Chart::new("t", 800, 400)
            .x_axis("Timestamp", TimeTicks::Daily, "%Y-%m-%d")
            .series(Series::line(
                "p",
                Color::BLUE,
                2.0,
                vec![(at(1, 10, 0), Some(1.0)), (at(1, 14, 0), Some(2.0))],
            ));
        let svg = render_svg(&same_day);
        assert!(svg.contains(">2024-03-01 12:00</text>"));
    }

    #[test]
    fn test_legend_lists_series() {
        let chart = Chart::new("t", 800, 400)
            .legend(true)
            .series(Series::line(
                "Buy Volume Ratio",
                Color::GREEN,
                2.0,
                vec![(at(1, 1, 0), Some(1.0))],
            ))
            .series(Series::line(
                "Sell Volume Ratio",
                Color::RED,
                2.0,
                vec![(at(1, 1, 0), Some(-1.0))],
            ));
        let svg = render_svg(&chart);
        assert!(svg.contains(">Buy Volume Ratio</text>"));
        assert!(svg.contains(">Sell Volume Ratio</text>"));
    }

    #[test]
    fn test_y_domain_includes_zero_for_bars() {
        let chart = Chart::new("t", 800, 400).series(Series::bar(
            "v",
            Color::BLUE,
            Duration::hours(19),
            None,
            vec![(at(1, 0, 0), Some(100.0)), (at(2, 0, 0), Some(200.0))],
        ));
        let (min, max) = y_domain(&chart);
        assert!(min < 0.0 && min > -20.0);
        assert!(max > 200.0);
    }

    #[test]
    fn test_y_domain_flat_line() {
        let chart = Chart::new("t", 800, 400).series(Series::line(
            "p",
            Color::BLUE,
            2.0,
            vec![(at(1, 0, 0), Some(2.0))],
        ));
        let (min, max) = y_domain(&chart);
        assert!((min - 1.8).abs() < 1e-12);
        assert!((max - 2.2).abs() < 1e-12);
    }
}

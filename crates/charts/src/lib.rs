//! # px-charts
//!
//! Minimal SVG chart renderer for time series: bar and line series over a
//! date-time x axis, with "nice" y ticks, rotated date labels and a legend.
//!
//! ```
//! use chrono::NaiveDate;
//! use px_charts::{render_svg, Chart, Color, Series, TimeTicks};
//!
//! let t = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
//! let chart = Chart::new("Price", 800, 400)
//!     .x_axis("Timestamp", TimeTicks::Auto, "%H:%M")
//!     .y_label("Price (USD)")
//!     .series(Series::line("Price (USD)", Color::BLUE, 2.0, vec![(t, Some(1.0))]));
//! let svg = render_svg(&chart);
//! assert!(svg.starts_with("<svg"));
//! ```

pub mod chart;
pub mod render;
pub mod scale;
pub mod svg;

pub use chart::{Chart, Series, SeriesKind, TimeTicks};
pub use render::render_svg;
pub use svg::{escape_xml, Color, SvgDocument};

//! The four dashboard figures.

use chrono::Duration;

use px_analytics::{Bucket, DashboardData};
use px_charts::{render_svg, Chart, Color, Series, TimeTicks};
use px_core::config::ChartsConfig;

/// 0.002 day.
const BUY_SELL_BAR_WIDTH_MS: i64 = 172_800;
/// 0.8 day.
const VOLUME_BAR_WIDTH_MS: i64 = 69_120_000;

const HOUR_MINUTE: &str = "%H:%M";
const DAY: &str = "%Y-%m-%d";

/// One of the dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    BuysSells,
    Price,
    Volume,
    VolumeRatio,
}

impl ChartKind {
    /// Grid order: buys/sells and price on the first row, volume and ratio
    /// on the second.
    pub const ALL: [ChartKind; 4] = [
        ChartKind::BuysSells,
        ChartKind::Price,
        ChartKind::Volume,
        ChartKind::VolumeRatio,
    ];

    /// File name under `/charts/` and in exported directories.
    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::BuysSells => "buys-sells.svg",
            ChartKind::Price => "price.svg",
            ChartKind::Volume => "volume.svg",
            ChartKind::VolumeRatio => "volume-ratio.svg",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.file_name() == name)
    }

    /// Build the chart description for `data`.
    pub fn chart(self, data: &DashboardData, sizes: &ChartsConfig) -> Chart {
        match self {
            ChartKind::BuysSells => buys_sells_chart(data, sizes),
            ChartKind::Price => price_chart(data, sizes),
            ChartKind::Volume => volume_chart(data, sizes),
            ChartKind::VolumeRatio => volume_ratio_chart(data, sizes),
        }
    }

    pub fn render(self, data: &DashboardData, sizes: &ChartsConfig) -> String {
        render_svg(&self.chart(data, sizes))
    }
}

fn buys_sells_chart(data: &DashboardData, sizes: &ChartsConfig) -> Chart {
    let width = Duration::milliseconds(BUY_SELL_BAR_WIDTH_MS);
    let buys = data
        .buys_sells
        .iter()
        .map(|b| (b.timestamp, Some(b.buys)))
        .collect();
    let sells = data
        .buys_sells
        .iter()
        .map(|b| (b.timestamp, Some(b.sells)))
        .collect();

    Chart::new(
        format!("5 mins buys and sells in the last {} hours", data.window_hours),
        sizes.width,
        sizes.height,
    )
    .x_axis("Timestamp", TimeTicks::Auto, HOUR_MINUTE)
    .y_label("Transactions")
    .y_range(data.buys_sells_limits.map(|l| (l.min, l.max)))
    .legend(true)
    .series(Series::bar("buys", Color::GREEN, width, Some(Color::BLACK), buys))
    .series(Series::bar("sells", Color::RED, width, Some(Color::BLACK), sells))
}

fn price_chart(data: &DashboardData, sizes: &ChartsConfig) -> Chart {
    let points = data.price.iter().map(|&(ts, p)| (ts, Some(p))).collect();
    Chart::new("Price Variation over Time", sizes.width, sizes.height)
        .x_axis("Timestamp", TimeTicks::Daily, DAY)
        .y_label("Price (USD)")
        .y_range(data.price_limits.map(|l| (l.min, l.max)))
        .legend(true)
        .series(Series::line("Price (USD)", Color::BLUE, 2.0, points))
}

fn volume_chart(data: &DashboardData, sizes: &ChartsConfig) -> Chart {
    Chart::new("24h Volume over Time", sizes.width, sizes.height)
        .x_axis("Timestamp", TimeTicks::Daily, DAY)
        .y_label("24h Volume")
        .legend(true)
        .series(Series::bar(
            "24h Volume",
            Color::BLUE,
            Duration::milliseconds(VOLUME_BAR_WIDTH_MS),
            None,
            data.daily_volume.clone(),
        ))
}

fn volume_ratio_chart(data: &DashboardData, sizes: &ChartsConfig) -> Chart {
    let line = |label: &str, color: Color, values: &[Bucket]| {
        Series::line(label, color, 1.5, values.to_vec())
    };
    Chart::new(
        "Volume Ratio over Time (Large Transactions)",
        sizes.width,
        sizes.ratio_height,
    )
    .x_axis("Timestamp (Hourly)", TimeTicks::Daily, DAY)
    .y_label("Volume Ratio")
    .legend(true)
    .series(line("Buy Volume Ratio", Color::GREEN, &data.volume_ratios.buys))
    .series(line("Sell Volume Ratio", Color::RED, &data.volume_ratios.sells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use px_analytics::{BuySellBar, VolumeRatios, YLimits};
    use px_core::types::TokenPair;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn data() -> DashboardData {
        DashboardData {
            pair: TokenPair::new("PLSX", "WPLS"),
            rows: 2,
            latest: at(2, 6),
            window_start: at(2, 0),
            window_hours: 6,
            buys_sells: vec![BuySellBar {
                timestamp: at(2, 6),
                buys: 10.0,
                sells: -4.0,
            }],
            buys_sells_limits: Some(YLimits { min: -9.0, max: 15.0 }),
            price: vec![(at(1, 6), 1.0), (at(2, 6), 2.0)],
            price_limits: Some(YLimits { min: 0.9, max: 2.1 }),
            daily_volume: vec![(at(1, 0), Some(100.0)), (at(2, 0), Some(120.0))],
            volume_ratios: VolumeRatios {
                buys: vec![(at(1, 6), Some(0.1)), (at(1, 7), None)],
                sells: vec![(at(1, 6), Some(-0.05)), (at(1, 7), None)],
            },
        }
    }

    #[test]
    fn test_file_names_round_trip() {
        for kind in ChartKind::ALL {
            assert_eq!(ChartKind::from_file_name(kind.file_name()), Some(kind));
        }
        assert_eq!(ChartKind::from_file_name("other.svg"), None);
    }

    #[test]
    fn test_buys_sells_chart_styling() {
        let chart = ChartKind::BuysSells.chart(&data(), &ChartsConfig::default());
        assert_eq!(chart.title, "5 mins buys and sells in the last 6 hours");
        assert_eq!(chart.y_label, "Transactions");
        assert_eq!(chart.y_range, Some((-9.0, 15.0)));
        assert_eq!((chart.width, chart.height), (1400, 700));
        assert_eq!(chart.series[0].label, "buys");
        assert_eq!(chart.series[0].color, Color::GREEN);
        assert_eq!(chart.series[1].points, vec![(at(2, 6), Some(-4.0))]);
    }

    #[test]
    fn test_ratio_chart_is_taller() {
        let chart = ChartKind::VolumeRatio.chart(&data(), &ChartsConfig::default());
        assert_eq!(chart.height, 730);
        assert_eq!(chart.x_label, "Timestamp (Hourly)");
        assert_eq!(chart.series[1].label, "Sell Volume Ratio");
        assert_eq!(chart.series[1].color, Color::RED);
    }

    #[test]
    fn test_render_all_charts() {
        let data = data();
        for kind in ChartKind::ALL {
            let svg = kind.render(&data, &ChartsConfig::default());
            assert!(svg.starts_with("<svg"), "{kind:?}");
        }
        let svg = ChartKind::Volume.render(&data, &ChartsConfig::default());
        assert!(svg.contains(">24h Volume over Time</text>"));
        assert!(svg.contains(">2024-03-02</text>"));
    }
}

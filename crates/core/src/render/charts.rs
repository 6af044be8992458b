use std::fmt::Write as _;

use html_escape::encode_text;

use crate::domain::charts::{ChartSet, PricePeriod, PRICE_PERIODS};
use crate::domain::record::{CompanyRecord, FinancialTable};
use crate::ingest::types::{PriceBar, PriceHistory};
use crate::scoring::metrics::row_values;

/// Fewer bars than this and a period gets no price chart.
pub const MIN_PRICE_BARS: usize = 10;

const UP: &str = "#10B981";
const DOWN: &str = "#EF4444";
const BLUE: &str = "#3B82F6";
const AMBER: &str = "#F59E0B";
const GRID: &str = "#E5E7EB";
const MUTED: &str = "#6B7280";

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 300.0;
const LEFT: f64 = 56.0;
const RIGHT: f64 = 16.0;
const TOP: f64 = 32.0;
const BOTTOM: f64 = 64.0;

#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
    /// Per-point colours overriding `color` (e.g. red bars for losses).
    pub point_colors: Option<Vec<String>>,
}

impl Series {
    pub fn new(name: &str, color: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            values,
            point_colors: None,
        }
    }

    fn color_at(&self, i: usize) -> &str {
        self.point_colors
            .as_ref()
            .and_then(|c| c.get(i))
            .map(String::as_str)
            .unwrap_or(&self.color)
    }
}

#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
    top: f64,
    bottom: f64,
}

impl Scale {
    fn new(min: f64, max: f64, top: f64, bottom: f64) -> Self {
        let (min, max) = if max > min {
            (min, max)
        } else {
            (min - 1.0, max + 1.0)
        };
        Self { min, max, top, bottom }
    }

    fn y(&self, v: f64) -> f64 {
        self.bottom - (v - self.min) / (self.max - self.min) * (self.bottom - self.top)
    }
}

fn bounds<'a>(values: impl IntoIterator<Item = &'a f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

fn svg_open(out: &mut String, key: &str, title: &str, height: f64) {
    let _ = write!(
        out,
        r##"<figure class="chart" data-chart="{key}"><svg viewBox="0 0 {WIDTH} {height}" width="100%" role="img" xmlns="http://www.w3.org/2000/svg"><title>{t}</title><text x="{LEFT}" y="18" class="chart-title" font-size="13" font-weight="600" fill="#111827">{t}</text>"##,
        t = encode_text(title),
    );
}

fn svg_close(out: &mut String) {
    out.push_str("</svg></figure>");
}

fn axis_label(v: f64) -> String {
    if v.abs() >= 10.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn y_grid(out: &mut String, scale: &Scale) {
    for step in 0..=4 {
        let v = scale.min + (scale.max - scale.min) * step as f64 / 4.0;
        let y = scale.y(v);
        let _ = write!(
            out,
            r##"<line x1="{LEFT}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="{GRID}" stroke-width="1"/><text x="{lx}" y="{ty:.1}" font-size="10" text-anchor="end" fill="{MUTED}">{label}</text>"##,
            x2 = WIDTH - RIGHT,
            lx = LEFT - 6.0,
            ty = y + 3.0,
            label = axis_label(v),
        );
    }
}

fn x_labels(out: &mut String, categories: &[String], slot: f64) {
    // Thin out labels so they never overlap.
    let every = (categories.len() / 12).max(1);
    for (i, c) in categories.iter().enumerate() {
        if i % every != 0 && i + 1 != categories.len() {
            continue;
        }
        let x = LEFT + slot * (i as f64 + 0.5);
        let _ = write!(
            out,
            r##"<text x="{x:.1}" y="{y}" font-size="10" text-anchor="middle" fill="{MUTED}">{c}</text>"##,
            y = HEIGHT - BOTTOM + 16.0,
            c = encode_text(c),
        );
    }
}

fn legend(out: &mut String, series: &[Series], y: f64) {
    let mut x = LEFT;
    for s in series {
        let _ = write!(
            out,
            r##"<rect x="{x:.1}" y="{ry:.1}" width="10" height="10" fill="{c}"/><text x="{tx:.1}" y="{y:.1}" font-size="11" fill="#374151">{n}</text>"##,
            ry = y - 9.0,
            c = s.color,
            tx = x + 14.0,
            n = encode_text(&s.name),
        );
        x += 24.0 + s.name.chars().count() as f64 * 6.5;
    }
}

fn plot_scale(series: &[Series], include_zero: bool, extra: Option<f64>) -> Option<Scale> {
    let (mut lo, mut hi) = bounds(series.iter().flat_map(|s| s.values.iter()));
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if let Some(r) = extra {
        lo = lo.min(r);
        hi = hi.max(r);
    }
    Some(Scale::new(lo, hi, TOP, HEIGHT - BOTTOM))
}

pub fn grouped_bars(key: &str, title: &str, categories: &[String], series: &[Series]) -> Option<String> {
    if categories.is_empty() || series.is_empty() {
        return None;
    }
    let scale = plot_scale(series, true, None)?;
    let slot = (WIDTH - LEFT - RIGHT) / categories.len() as f64;
    let bar = slot * 0.8 / series.len() as f64;
    let zero = scale.y(0.0);

    let mut out = String::new();
    svg_open(&mut out, key, title, HEIGHT);
    y_grid(&mut out, &scale);
    for (si, s) in series.iter().enumerate() {
        for (i, v) in s.values.iter().enumerate().take(categories.len()) {
            let x = LEFT + slot * i as f64 + slot * 0.1 + bar * si as f64;
            let y = scale.y(*v);
            let _ = write!(
                out,
                r##"<rect x="{x:.1}" y="{top:.1}" width="{w:.1}" height="{h:.1}" fill="{c}"><title>{n}: {v:.0}</title></rect>"##,
                top = y.min(zero),
                w = (bar - 1.0).max(1.0),
                h = (y - zero).abs(),
                c = s.color_at(i),
                n = encode_text(&s.name),
            );
        }
    }
    x_labels(&mut out, categories, slot);
    legend(&mut out, series, HEIGHT - 14.0);
    svg_close(&mut out);
    Some(out)
}

pub fn stacked_bars(key: &str, title: &str, categories: &[String], series: &[Series]) -> Option<String> {
    if categories.is_empty() || series.is_empty() {
        return None;
    }
    let totals: Vec<f64> = (0..categories.len())
        .map(|i| series.iter().filter_map(|s| s.values.get(i)).map(|v| v.max(0.0)).sum())
        .collect();
    let (_, hi) = bounds(totals.iter());
    if !hi.is_finite() || hi <= 0.0 {
        return None;
    }
    let scale = Scale::new(0.0, hi, TOP, HEIGHT - BOTTOM);
    let slot = (WIDTH - LEFT - RIGHT) / categories.len() as f64;

    let mut out = String::new();
    svg_open(&mut out, key, title, HEIGHT);
    y_grid(&mut out, &scale);
    for i in 0..categories.len() {
        let mut base = 0.0;
        let x = LEFT + slot * i as f64 + slot * 0.15;
        for s in series {
            let v = s.values.get(i).copied().unwrap_or(0.0).max(0.0);
            if v == 0.0 {
                continue;
            }
            let (y0, y1) = (scale.y(base), scale.y(base + v));
            let _ = write!(
                out,
                r##"<rect x="{x:.1}" y="{y1:.1}" width="{w:.1}" height="{h:.1}" fill="{c}"><title>{n}: {v:.2}%</title></rect>"##,
                w = slot * 0.7,
                h = y0 - y1,
                c = s.color,
                n = encode_text(&s.name),
            );
            base += v;
        }
    }
    x_labels(&mut out, categories, slot);
    legend(&mut out, series, HEIGHT - 14.0);
    svg_close(&mut out);
    Some(out)
}

pub fn line_chart(
    key: &str,
    title: &str,
    categories: &[String],
    series: &[Series],
    reference: Option<f64>,
) -> Option<String> {
    if categories.is_empty() || series.is_empty() {
        return None;
    }
    let scale = plot_scale(series, false, reference)?;
    let slot = (WIDTH - LEFT - RIGHT) / categories.len() as f64;

    let mut out = String::new();
    svg_open(&mut out, key, title, HEIGHT);
    y_grid(&mut out, &scale);
    if let Some(r) = reference {
        let y = scale.y(r);
        let _ = write!(
            out,
            r##"<line x1="{LEFT}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="#9CA3AF" stroke-dasharray="6 4"/><text x="{x2}" y="{ty:.1}" font-size="10" text-anchor="end" fill="#9CA3AF">{r:.0}%</text>"##,
            x2 = WIDTH - RIGHT,
            ty = y - 4.0,
        );
    }
    for s in series {
        let points: Vec<String> = s
            .values
            .iter()
            .take(categories.len())
            .enumerate()
            .map(|(i, v)| format!("{:.1},{:.1}", LEFT + slot * (i as f64 + 0.5), scale.y(*v)))
            .collect();
        let _ = write!(
            out,
            r##"<polyline points="{}" fill="none" stroke="{}" stroke-width="2.5"/>"##,
            points.join(" "),
            s.color
        );
        for (i, v) in s.values.iter().take(categories.len()).enumerate() {
            let _ = write!(
                out,
                r##"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}"><title>{}: {v:.1}</title></circle>"##,
                LEFT + slot * (i as f64 + 0.5),
                scale.y(*v),
                s.color,
                encode_text(&s.name),
            );
        }
    }
    x_labels(&mut out, categories, slot);
    legend(&mut out, series, HEIGHT - 14.0);
    svg_close(&mut out);
    Some(out)
}

/// Trailing simple moving average; `None` until the window fills.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        out.push((i + 1 >= window).then(|| sum / window as f64));
    }
    out
}

fn ma_polyline(out: &mut String, ma: &[Option<f64>], x: impl Fn(usize) -> f64, scale: &Scale, color: &str) {
    let points: Vec<String> = ma
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| format!("{:.1},{:.1}", x(i), scale.y(v))))
        .collect();
    if points.len() < 2 {
        return;
    }
    let _ = write!(
        out,
        r##"<polyline points="{}" fill="none" stroke="{color}" stroke-width="1.2"/>"##,
        points.join(" ")
    );
}

pub fn price_chart(ticker: &str, period: PricePeriod, bars: &[PriceBar]) -> Option<String> {
    if bars.len() < MIN_PRICE_BARS {
        return None;
    }
    const PRICE_BOTTOM: f64 = 300.0;
    const VOL_TOP: f64 = 318.0;
    const VOL_BOTTOM: f64 = 390.0;
    const TOTAL: f64 = 440.0;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let (lo, hi) = bounds(bars.iter().map(|b| &b.low).chain(bars.iter().map(|b| &b.high)));
    let price = Scale::new(lo, hi, TOP, PRICE_BOTTOM);
    let (_, vol_hi) = bounds(bars.iter().map(|b| &b.volume));
    let volume = Scale::new(0.0, vol_hi.max(1.0), VOL_TOP, VOL_BOTTOM);
    let step = (WIDTH - LEFT - RIGHT) / bars.len() as f64;
    let x = |i: usize| LEFT + step * (i as f64 + 0.5);

    let mut out = String::new();
    let title = format!("{ticker} · {}", period.label());
    svg_open(&mut out, period.key(), &title, TOTAL);
    y_grid(&mut out, &price);

    for (i, b) in bars.iter().enumerate() {
        let color = if b.close >= b.open { UP } else { DOWN };
        let y = volume.y(b.volume);
        let _ = write!(
            out,
            r##"<rect x="{:.1}" y="{y:.1}" width="{:.2}" height="{:.1}" fill="{color}" opacity="0.5"/>"##,
            x(i) - step * 0.4,
            (step * 0.8).max(0.5),
            VOL_BOTTOM - y,
        );
    }

    let line: Vec<String> = closes
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:.1},{:.1}", x(i), price.y(*c)))
        .collect();
    let trend = if closes.last() >= closes.first() { UP } else { DOWN };
    let _ = write!(
        out,
        r##"<polyline points="{}" fill="none" stroke="{trend}" stroke-width="1.6"/>"##,
        line.join(" ")
    );

    let mut legend_series = vec![Series::new("Price", trend, Vec::new())];
    if bars.len() >= 20 {
        ma_polyline(&mut out, &moving_average(&closes, 20), x, &price, BLUE);
        legend_series.push(Series::new("MA20", BLUE, Vec::new()));
    }
    if bars.len() >= 50 {
        ma_polyline(&mut out, &moving_average(&closes, 50), x, &price, AMBER);
        legend_series.push(Series::new("MA50", AMBER, Vec::new()));
    }

    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        let _ = write!(
            out,
            r##"<text x="{LEFT}" y="{y}" font-size="10" fill="{MUTED}">{}</text><text x="{rx}" y="{y}" font-size="10" text-anchor="end" fill="{MUTED}">{}</text>"##,
            first.date.format("%d %b %Y"),
            last.date.format("%d %b %Y"),
            y = TOTAL - 8.0,
            rx = WIDTH - RIGHT,
        );
    }
    legend(&mut out, &legend_series, TOTAL - 28.0);
    svg_close(&mut out);
    Some(out)
}

/// Aligns period labels with a value row from the right and keeps the last `max`.
fn aligned(periods: &[String], values: Vec<f64>, max: usize) -> (Vec<String>, Vec<f64>) {
    let n = periods.len().min(values.len()).min(max);
    (
        periods[periods.len() - n..].to_vec(),
        values[values.len() - n..].to_vec(),
    )
}

fn first_row(table: &FinancialTable, labels: &[&str]) -> Vec<f64> {
    labels
        .iter()
        .map(|l| row_values(table, l, table.periods.len()))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

fn tail(values: Vec<f64>, n: usize) -> Vec<f64> {
    values[values.len().saturating_sub(n)..].to_vec()
}

fn annual_pl(record: &CompanyRecord) -> Option<String> {
    let pl = &record.profit_loss;
    let (periods, sales) = aligned(&pl.periods, first_row(pl, &["Sales", "Revenue"]), usize::MAX);
    if sales.is_empty() {
        return None;
    }
    let mut series = vec![Series::new("Revenue", BLUE, sales)];
    let profit = tail(first_row(pl, &["Net Profit"]), periods.len());
    if profit.len() == periods.len() {
        series.push(Series::new("Net Profit", UP, profit));
    }
    grouped_bars("annual_pl", "Revenue & Net Profit (₹ Cr)", &periods, &series)
}

fn quarterly(record: &CompanyRecord) -> Option<String> {
    let q = &record.quarterly;
    let (periods, sales) = aligned(&q.periods, first_row(q, &["Sales", "Revenue"]), 8);
    if sales.is_empty() {
        return None;
    }
    let mut series = vec![Series::new("Revenue", "#60A5FA", sales)];
    let profit = tail(first_row(q, &["Net Profit"]), periods.len());
    if profit.len() == periods.len() {
        let colors = profit
            .iter()
            .map(|v| (if *v >= 0.0 { UP } else { DOWN }).to_string())
            .collect();
        let mut s = Series::new("Net Profit", UP, profit);
        s.point_colors = Some(colors);
        series.push(s);
    }
    grouped_bars("quarterly", "Quarterly Revenue & Net Profit (₹ Cr)", &periods, &series)
}

fn margins(record: &CompanyRecord) -> Option<String> {
    let pl = &record.profit_loss;
    let opm = first_row(pl, &["OPM", "Financing Margin"]);
    let sales = first_row(pl, &["Sales", "Revenue"]);
    let profit = first_row(pl, &["Net Profit"]);
    let n = pl.periods.len().min(opm.len()).min(sales.len()).min(profit.len());
    if n == 0 {
        return None;
    }
    let sales = tail(sales, n);
    let profit = tail(profit, n);
    let npm = sales
        .iter()
        .zip(&profit)
        .map(|(s, p)| if *s > 0.0 { p / s * 100.0 } else { 0.0 })
        .collect();
    let periods = pl.periods[pl.periods.len() - n..].to_vec();
    let series = [
        Series::new("OPM %", BLUE, tail(opm, n)),
        Series::new("NPM %", UP, npm),
    ];
    line_chart("margins", "Margin Trends (%)", &periods, &series, None)
}

fn returns(record: &CompanyRecord) -> Option<String> {
    let r = &record.ratios;
    let mut series = Vec::new();
    let mut periods = Vec::new();
    for (label, color) in [("ROCE %", BLUE), ("ROE %", UP)] {
        let (p, v) = aligned(&r.periods, first_row(r, &[label]), usize::MAX);
        if v.is_empty() {
            continue;
        }
        if periods.is_empty() || p.len() < periods.len() {
            periods = p;
        }
        series.push(Series::new(label, color, v));
    }
    for s in &mut series {
        s.values = tail(std::mem::take(&mut s.values), periods.len());
    }
    line_chart("returns", "Return Ratios (%)", &periods, &series, Some(15.0))
}

fn shareholding(record: &CompanyRecord) -> Option<String> {
    let sh = &record.shareholding;
    let groups = [
        ("Promoters", "#16A34A"),
        ("FIIs", BLUE),
        ("DIIs", "#0891B2"),
        ("Public", "#9CA3AF"),
        ("Government", "#8B5CF6"),
    ];
    let series: Vec<Series> = groups
        .iter()
        .filter_map(|(label, color)| {
            let (_, v) = aligned(&sh.periods, first_row(sh, &[*label]), usize::MAX);
            (!v.is_empty()).then(|| Series::new(label, color, v))
        })
        .collect();
    let n = series.iter().map(|s| s.values.len()).min()?;
    let periods = sh.periods[sh.periods.len() - n..].to_vec();
    let series: Vec<Series> = series
        .into_iter()
        .map(|mut s| {
            s.values = tail(s.values, n);
            s
        })
        .collect();
    stacked_bars("shareholding", "Shareholding Pattern (%)", &periods, &series)
}

fn cashflow(record: &CompanyRecord) -> Option<String> {
    let cf = &record.cash_flow;
    let (periods, cfo) = aligned(&cf.periods, first_row(cf, &["Operating Activity"]), usize::MAX);
    if cfo.is_empty() {
        return None;
    }
    let mut series = vec![Series::new("Operating", UP, cfo)];
    for (label, name, color) in [
        ("Investing Activity", "Investing", DOWN),
        ("Financing Activity", "Financing", BLUE),
    ] {
        let v = tail(first_row(cf, &[label]), periods.len());
        if v.len() == periods.len() {
            series.push(Series::new(name, color, v));
        }
    }
    grouped_bars("cashflow", "Cash Flow Trend (₹ Cr)", &periods, &series)
}

pub fn build_chart_set(record: &CompanyRecord, prices: &PriceHistory) -> ChartSet {
    let mut set = ChartSet::default();
    for period in PRICE_PERIODS {
        if let Some(svg) = price_chart(&record.ticker, period, prices.window(period)) {
            set.insert(period.key(), svg);
        }
    }
    let financial: [(&str, fn(&CompanyRecord) -> Option<String>); 6] = [
        ("annual_pl", annual_pl),
        ("quarterly", quarterly),
        ("margins", margins),
        ("returns", returns),
        ("shareholding", shareholding),
        ("cashflow", cashflow),
    ];
    for (key, render) in financial {
        if let Some(svg) = render(record) {
            set.insert(key, svg);
        }
    }
    set
}

use console::{style, Style};

use crate::domain::analysis::{Analysis, DimensionScore, Grade, MarginTrend, Sentiment, Signal, Trend};
use crate::domain::record::CompanyRecord;
use crate::render::format::{fmt_cr, fmt_indian, fmt_pct, fmt_price, sparkline, MISSING};

const WIDTH: usize = 74;
const BAR: usize = 30;
const KEY_RATIOS: [&str; 6] = [
    "Debtor Days",
    "Inventory Days",
    "Days Payable",
    "Cash Conversion Cycle",
    "Working Capital Days",
    "ROCE %",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Full,
    Brief,
}

pub fn render_report(record: &CompanyRecord, analysis: &Analysis, mode: ReportMode) -> String {
    let mut r = Report::default();
    r.header(record);
    r.scorecard(analysis);
    r.key_metrics(analysis);
    r.range_bar(analysis);
    if mode == ReportMode::Brief {
        r.flags(analysis);
        r.blank();
        return r.out;
    }
    r.profit_loss(analysis);
    r.growth(analysis);
    r.quarterly(analysis);
    r.balance_sheet(analysis);
    r.cash_flow(analysis);
    r.shareholding(analysis);
    r.segments(record);
    r.key_ratios(record);
    r.signals("VALUATION SIGNALS", &analysis.valuation.signals);
    r.signals("TECHNICAL SIGNALS", &analysis.momentum.signals);
    r.flags(analysis);
    r.pros_cons(record);
    r.peers(record);
    r.documents(record);
    r.footer(record);
    r.out
}

#[derive(Default)]
struct Report {
    out: String,
}

fn grey() -> Style {
    Style::new().black().bright()
}

/// Green at or above `good`, yellow at or above `ok`, red below.
fn tiered(value: f64, good: f64, ok: f64) -> Style {
    if value >= good {
        Style::new().green()
    } else if value >= ok {
        Style::new().yellow()
    } else {
        Style::new().red()
    }
}

fn sign_style(value: f64) -> Style {
    if value > 0.0 {
        Style::new().green()
    } else {
        Style::new().red()
    }
}

fn grade_style(grade: Grade) -> Style {
    match grade {
        Grade::APlus | Grade::A => Style::new().green().bold(),
        Grade::BPlus | Grade::B => Style::new().yellow().bold(),
        Grade::C | Grade::D => Style::new().red().bold(),
    }
}

fn trend_style(trend: Trend) -> Style {
    match trend {
        Trend::Increasing => Style::new().green(),
        Trend::Decreasing => Style::new().red(),
        Trend::Stable | Trend::InsufficientData => Style::new(),
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

fn or_missing(value: Option<f64>, f: impl Fn(f64) -> String) -> String {
    value.map(f).unwrap_or_else(|| MISSING.to_string())
}

impl Report {
    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn rule(&mut self) {
        self.line("═".repeat(WIDTH));
    }

    fn banner(&mut self, text: &str, bg: Style) {
        let padded = format!("{:^WIDTH$}", format!(" {text} "));
        self.blank();
        self.line(bg.white().bold().apply_to(padded).to_string());
    }

    fn section(&mut self, text: &str) {
        self.banner(text, Style::new().on_blue());
    }

    fn kv(&mut self, key: &str, value: impl Into<String>, value_style: Style) {
        let key = format!("{key:<22}");
        self.line(format!(
            "  {} {}",
            grey().apply_to(key),
            value_style.apply_to(value.into())
        ));
    }

    fn header(&mut self, record: &CompanyRecord) {
        let basis = if record.is_consolidated {
            "Consolidated"
        } else {
            "Standalone"
        };
        self.blank();
        self.rule();
        self.line(
            style(format!("  {}  ({})", record.display_name(), record.ticker))
                .cyan()
                .bold()
                .to_string(),
        );
        self.line(format!(
            "  {}",
            grey().apply_to(format!("{basis} · {}", record.fetched_at.format("%Y-%m-%d")))
        ));
        if !record.about.is_empty() {
            self.line(format!("  {}", style(truncate(&record.about, 140)).dim()));
        }
        self.rule();
    }

    fn scorecard(&mut self, a: &Analysis) {
        let card = &a.scorecard;
        self.section("SCORECARD");
        self.line(format!(
            "  {}  {}  ({})    {}  {}  ({})",
            style("Quality Grade:").bold(),
            grade_style(card.grade).apply_to(format!(" {} ", card.grade)),
            tiered(card.overall, 60.0, 40.0).apply_to(format!("{:.1}/100", card.overall)),
            style("Valuation:").bold(),
            tiered(a.valuation.score as f64, 60.0, 40.0).apply_to(&a.valuation.verdict),
            tiered(a.valuation.score as f64, 60.0, 40.0)
                .apply_to(format!("{}/100", a.valuation.score)),
        ));
        self.blank();
        for (name, dim) in card.dimensions() {
            self.dimension_bar(name, dim);
        }
    }

    fn dimension_bar(&mut self, name: &str, dim: &DimensionScore) {
        let filled = (dim.score.clamp(0, 100) as usize * BAR) / 100;
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR - filled));
        let tier = tiered(dim.score as f64, 60.0, 40.0);
        self.line(format!(
            "  {} {} {}",
            grey().apply_to(format!("{name:<18}")),
            tier.apply_to(bar),
            tier.apply_to(format!("{:>3}", dim.score)),
        ));
    }

    fn key_metrics(&mut self, a: &Analysis) {
        let m = &a.key_metrics;
        self.section("KEY METRICS");
        let range = match (m.high_52w, m.low_52w) {
            (Some(h), Some(l)) => format!("{} / {}", fmt_price(h), fmt_price(l)),
            _ => MISSING.to_string(),
        };
        let ret_style = |v: Option<f64>| v.map_or_else(Style::new, |v| tiered(v, 15.0, 10.0));
        let left = [
            ("Market Cap", or_missing(m.market_cap, fmt_cr), Style::new()),
            ("Current Price", or_missing(m.current_price, fmt_price), Style::new()),
            ("52W High / Low", range, Style::new()),
            ("Stock P/E", or_missing(m.pe, |v| format!("{v:.1}")), Style::new().cyan()),
            ("P/B Ratio", or_missing(m.pb, |v| format!("{v:.2}")), Style::new().cyan()),
        ];
        let right = [
            ("Book Value", or_missing(m.book_value, fmt_price), Style::new()),
            (
                "Dividend Yield",
                or_missing(m.div_yield, |v| format!("{v:.2}%")),
                if m.div_yield.unwrap_or(0.0) > 1.0 {
                    Style::new().green()
                } else {
                    Style::new()
                },
            ),
            ("Face Value", or_missing(m.face_value, |v| format!("₹{v:.0}")), grey()),
            ("ROCE", or_missing(m.roce, |v| format!("{v:.1}%")), ret_style(m.roce)),
            ("ROE", or_missing(m.roe, |v| format!("{v:.1}%")), ret_style(m.roe)),
        ];
        for ((k1, v1, s1), (k2, v2, s2)) in left.into_iter().zip(right) {
            self.line(format!(
                "  {} {} {} {}",
                grey().apply_to(format!("{k1:<20}")),
                s1.apply_to(format!("{v1:<18}")),
                grey().apply_to(format!("{k2:<18}")),
                s2.apply_to(v2),
            ));
        }
    }

    fn range_bar(&mut self, a: &Analysis) {
        let Some(pos) = a.momentum.pos_in_52w else {
            return;
        };
        let pos = pos.clamp(0.0, 1.0);
        let filled = (pos * BAR as f64) as usize;
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR - filled));
        let bar_style = if pos > 0.6 {
            Style::new().green()
        } else if pos < 0.3 {
            Style::new().red()
        } else {
            Style::new().yellow()
        };
        self.blank();
        self.line(format!(
            "  {}  {} {} {}  ({:.0}%)",
            grey().apply_to("52W Range:"),
            style("Low").red(),
            bar_style.apply_to(bar),
            style("High").green(),
            pos * 100.0
        ));
    }

    fn profit_loss(&mut self, a: &Analysis) {
        let Some(pl) = &a.profit_loss else {
            return;
        };
        self.section("PROFIT & LOSS");
        self.kv("Revenue (Latest FY)", fmt_cr(pl.sales_latest), Style::new());
        self.kv("Net Profit", fmt_cr(pl.net_profit_latest), sign_style(pl.net_profit_latest));
        self.kv("EPS", format!("₹{:.1}", pl.eps_latest), Style::new());
        let margin_label = if pl.is_bank { "Financing Margin" } else { "OPM" };
        self.kv(margin_label, format!("{:.0}%", pl.opm_latest), tiered(pl.opm_latest, 20.0, 10.0));
        self.kv("NPM", format!("{:.1}%", pl.npm_latest), tiered(pl.npm_latest, 15.0, 8.0));
        let trend_style = match pl.margin_trend {
            MarginTrend::Expanding => Style::new().green(),
            MarginTrend::Contracting => Style::new().red(),
            MarginTrend::Stable => Style::new().yellow(),
        };
        self.kv("Margin Trend", title_case(pl.margin_trend.as_str()), trend_style);

        if pl.sales_history.len() >= 2 {
            self.blank();
            self.line(format!(
                "  {}  {}  ({}Y)",
                grey().apply_to("Revenue Trend:"),
                style(sparkline(&pl.sales_history)).cyan(),
                pl.sales_history.len()
            ));
        }
        if let (Some(first), Some(last)) = (pl.profit_history.first(), pl.profit_history.last()) {
            if pl.profit_history.len() >= 2 {
                self.line(format!(
                    "  {}  {}  ({}Y)",
                    grey().apply_to("Profit Trend: "),
                    sign_style(last - first).apply_to(sparkline(&pl.profit_history)),
                    pl.profit_history.len()
                ));
            }
        }
    }

    fn growth(&mut self, a: &Analysis) {
        if a.growth.is_empty() {
            return;
        }
        self.section("GROWTH");
        for g in &a.growth {
            let label = g
                .category
                .replace("Compounded ", "")
                .replace("Stock Price CAGR", "Stock CAGR")
                .replace("Return on Equity", "ROE Trend");
            let parts: Vec<String> = g
                .rates
                .iter()
                .filter_map(|(period, v)| {
                    v.map(|v| format!("{period}: {}", tiered(v, 10.0, 0.0).apply_to(format!("{v:+.0}%"))))
                })
                .collect();
            if parts.is_empty() {
                continue;
            }
            self.line(format!(
                "  {} {}",
                grey().apply_to(format!("{label:<20}")),
                parts.join(" · ")
            ));
        }
    }

    fn quarterly(&mut self, a: &Analysis) {
        let Some(q) = &a.quarterly else {
            return;
        };
        if q.periods.is_empty() {
            return;
        }
        self.section("QUARTERLY TREND");
        self.kv("Latest Q Revenue", fmt_cr(q.sales_latest), Style::new());
        self.kv("Latest Q Profit", fmt_cr(q.profit_latest), sign_style(q.profit_latest));
        if let Some(v) = q.sales_yoy {
            self.kv("Revenue YoY", fmt_pct(v), sign_style(v));
        }
        if let Some(v) = q.profit_yoy {
            self.kv("Profit YoY", fmt_pct(v), sign_style(v));
        }
        self.kv("OPM Latest Q", format!("{:.0}%", q.opm_latest), tiered(q.opm_latest, 20.0, f64::MIN));
        if q.improving_margins {
            self.kv("Margin Improving?", "Yes ✓", Style::new().green());
        } else {
            self.kv("Margin Improving?", "No ✗", Style::new().red());
        }

        let n = q
            .periods
            .len()
            .min(q.sales_history.len())
            .min(q.profit_history.len())
            .min(6);
        if n < 2 {
            return;
        }
        let mut head = format!("{:<12}", "Quarter");
        for p in &q.periods[q.periods.len() - n..] {
            head.push_str(&format!("{p:>12}"));
        }
        self.blank();
        self.line(format!("  {}", grey().apply_to(head)));
        let mut sales = format!("  {:<12}", "Revenue");
        for &v in &q.sales_history[q.sales_history.len() - n..] {
            sales.push_str(&style(format!("{:>12}", fmt_indian(v))).cyan().to_string());
        }
        self.line(sales);
        let mut profit = format!("  {:<12}", "Net Profit");
        for &v in &q.profit_history[q.profit_history.len() - n..] {
            let text = if v < 0.0 {
                format!("-{}", fmt_indian(v))
            } else {
                fmt_indian(v)
            };
            profit.push_str(&sign_style(v).apply_to(format!("{text:>12}")).to_string());
        }
        self.line(profit);
    }

    fn balance_sheet(&mut self, a: &Analysis) {
        let Some(bs) = &a.balance_sheet else {
            return;
        };
        self.section("BALANCE SHEET");
        self.kv("Shareholder Equity", fmt_cr(bs.shareholder_equity), Style::new());
        let de = bs.debt_to_equity;
        let low_debt = de.is_some_and(|d| d < 0.5);
        self.kv(
            "Total Borrowings",
            fmt_cr(bs.borrowings),
            if low_debt { Style::new().green() } else { Style::new().red() },
        );
        self.kv("Total Assets", fmt_cr(bs.total_assets), Style::new());
        let de_style = match de {
            Some(d) if d < 0.5 => Style::new().green(),
            Some(d) if d < 1.0 => Style::new().yellow(),
            _ => Style::new().red(),
        };
        self.kv("Debt/Equity Ratio", or_missing(de, |d| format!("{d:.2}")), de_style);
        let debt_style = match bs.debt_trend {
            Trend::Decreasing => Style::new().green(),
            Trend::Increasing => Style::new().red(),
            Trend::Stable | Trend::InsufficientData => Style::new().yellow(),
        };
        self.kv("Debt Trend", title_case(bs.debt_trend.as_str()), debt_style);
        if bs.cwip > 0.0 {
            self.kv("CWIP", fmt_cr(bs.cwip), grey());
        }
    }

    fn cash_flow(&mut self, a: &Analysis) {
        let Some(cf) = &a.cash_flow else {
            return;
        };
        self.section("CASH FLOW");
        self.kv("CFO (Latest)", fmt_cr(cf.cfo_latest), sign_style(cf.cfo_latest));
        self.kv(
            "CFI (Latest)",
            fmt_cr(cf.cfi_latest),
            if cf.cfi_latest < 0.0 { Style::new().red() } else { Style::new().green() },
        );
        self.kv("CFF (Latest)", fmt_cr(cf.cff_latest), Style::new());
        self.kv("Free Cash Flow", fmt_cr(cf.fcf_latest), sign_style(cf.fcf_latest));
        let positive = (cf.cfo_consistency * cf.total_years as f64).round() as usize;
        self.kv(
            "CFO Positive Years",
            format!("{positive}/{}", cf.total_years),
            if cf.cfo_consistency >= 1.0 { Style::new().green() } else { Style::new().yellow() },
        );
        if cf.cfo_history.len() >= 2 {
            self.blank();
            self.line(format!(
                "  {}  {}",
                grey().apply_to("CFO Trend:    "),
                style(sparkline(&cf.cfo_history)).green()
            ));
        }
        if cf.fcf_history.len() >= 2 {
            self.line(format!(
                "  {}  {}",
                grey().apply_to("FCF Trend:    "),
                sign_style(cf.fcf_latest).apply_to(sparkline(&cf.fcf_history))
            ));
        }
    }

    fn shareholding(&mut self, a: &Analysis) {
        let Some(sh) = &a.shareholding else {
            return;
        };
        if sh.promoter <= 0.0 {
            return;
        }
        self.section("SHAREHOLDING");
        let promoter_style = if sh.promoter_trend == Trend::Decreasing {
            Style::new().red()
        } else {
            Style::new().green()
        };
        self.kv(
            "Promoters",
            format!("{:.1}%  ({})", sh.promoter, sh.promoter_trend.as_str()),
            promoter_style,
        );
        self.kv(
            "FIIs",
            format!("{:.1}%  ({})", sh.fii, sh.fii_trend.as_str()),
            trend_style(sh.fii_trend),
        );
        let dii_style = if sh.dii_trend == Trend::Increasing {
            Style::new().green()
        } else {
            Style::new()
        };
        self.kv("DIIs", format!("{:.1}%  ({})", sh.dii, sh.dii_trend.as_str()), dii_style);
        self.kv("Public", format!("{:.1}%", sh.public), grey());
        if sh.num_shareholders > 0.0 {
            self.kv("Shareholders", fmt_indian(sh.num_shareholders), grey());
        }

        let total = sh.promoter + sh.fii + sh.dii + sh.public;
        if total <= 0.0 {
            return;
        }
        let width = 50usize;
        let share = |v: f64| ((v / total) * width as f64) as usize;
        let (p, f, d) = (share(sh.promoter), share(sh.fii), share(sh.dii));
        let rest = width.saturating_sub(p + f + d);
        self.blank();
        self.line(format!(
            "  {}{}{}{}",
            style("█".repeat(p)).green(),
            style("█".repeat(f)).blue(),
            style("█".repeat(d)).cyan(),
            grey().apply_to("█".repeat(rest)),
        ));
        self.line(format!(
            "  {}  {}  {}  {}",
            style("Promoter").green(),
            style("FII").blue(),
            style("DII").cyan(),
            grey().apply_to("Public"),
        ));
    }

    fn segments(&mut self, record: &CompanyRecord) {
        if record.segments.is_empty() {
            return;
        }
        self.section("BUSINESS SEGMENTS");
        for seg in &record.segments {
            self.line(format!("  {} {seg}", style("●").cyan()));
        }
    }

    fn key_ratios(&mut self, record: &CompanyRecord) {
        let table = &record.ratios;
        if table.rows.is_empty() {
            return;
        }
        let rows: Vec<_> = KEY_RATIOS
            .iter()
            .filter_map(|label| table.find_row_exact(label).map(|row| (*label, row)))
            .collect();
        if rows.is_empty() {
            return;
        }
        self.section("KEY RATIOS");
        let periods = table.last_periods(4);
        for (label, row) in rows {
            let values = &row.values[row.values.len().saturating_sub(4)..];
            let parts: Vec<String> = periods
                .iter()
                .zip(values)
                .map(|(p, v)| {
                    let year: String = {
                        let chars: Vec<char> = p.chars().collect();
                        chars[chars.len().saturating_sub(4)..].iter().collect()
                    };
                    format!("{year}: {v}")
                })
                .collect();
            self.line(format!(
                "  {} {}",
                grey().apply_to(format!("{label:<28}")),
                parts.join(" · ")
            ));
        }
    }

    fn signals(&mut self, title: &str, signals: &[Signal]) {
        self.section(title);
        for s in signals {
            let icon_style = match s.sentiment {
                Sentiment::Bullish => Style::new().green(),
                Sentiment::Bearish => Style::new().red(),
                Sentiment::Caution | Sentiment::Neutral => Style::new().yellow(),
                Sentiment::Info => grey(),
            };
            self.line(format!("  {} {}", icon_style.apply_to(s.sentiment.icon()), s.text));
        }
    }

    fn flags(&mut self, a: &Analysis) {
        let flags = &a.flags;
        if flags.is_empty() {
            return;
        }
        self.banner("GREEN FLAGS", Style::new().on_green());
        for f in &flags.green {
            self.line(format!("  {} {f}", style("✓").green()));
        }
        if flags.green.is_empty() {
            self.line(format!("  {}", grey().apply_to("None")));
        }
        if !flags.amber.is_empty() {
            self.banner("AMBER FLAGS", Style::new().on_yellow());
            for f in &flags.amber {
                self.line(format!("  {} {f}", style("⚠").yellow()));
            }
        }
        self.banner("RED FLAGS", Style::new().on_red());
        for f in &flags.red {
            self.line(format!("  {} {f}", style("✗").red()));
        }
        if flags.red.is_empty() {
            self.line(format!("  {}", grey().apply_to("None")));
        }
    }

    fn pros_cons(&mut self, record: &CompanyRecord) {
        let pc = &record.pros_cons;
        if pc.pros.is_empty() && pc.cons.is_empty() {
            return;
        }
        self.section("SCREENER PROS & CONS");
        for p in &pc.pros {
            self.line(format!("  {} {p}", style("✓").green()));
        }
        for c in &pc.cons {
            self.line(format!("  {} {c}", style("✗").red()));
        }
    }

    fn peers(&mut self, record: &CompanyRecord) {
        let peers = &record.peers;
        if peers.rows.len() < 2 {
            return;
        }
        self.section("PEER COMPARISON");
        let cols = peers.headers.len().min(8);
        let cell = |s: &str| format!("{:>13}", s.chars().take(12).collect::<String>());
        let head: String = peers.headers[..cols].iter().map(|h| cell(h.as_str())).collect();
        self.line(format!("  {}", grey().apply_to(head)));
        self.line(format!("  {}", grey().apply_to("─".repeat(13 * cols))));
        for row in peers.rows.iter().take(8) {
            let own = row
                .ticker
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(&record.ticker));
            let text: String = (0..cols)
                .map(|i| cell(row.cells.get(i).map(String::as_str).unwrap_or("")))
                .collect();
            let row_style = if own { Style::new().cyan().bold() } else { Style::new() };
            self.line(format!("  {}", row_style.apply_to(text)));
        }
    }

    fn documents(&mut self, record: &CompanyRecord) {
        let docs = &record.documents;
        if docs.concalls.is_empty() && docs.annual_reports.is_empty() {
            return;
        }
        self.section("RECENT DOCUMENTS");
        for doc in docs.concalls.iter().take(3) {
            self.line(format!("  {} {}", style("📞").blue(), truncate(&doc.text, 65)));
        }
        for doc in docs.annual_reports.iter().take(3) {
            self.line(format!("  {} {}", style("📄").cyan(), truncate(&doc.text, 65)));
        }
    }

    fn footer(&mut self, record: &CompanyRecord) {
        self.blank();
        self.rule();
        self.line(format!(
            "  {}",
            grey().apply_to(format!("Source: screener.in · {}", record.url))
        ));
        self.line(format!(
            "  {}",
            grey().apply_to(format!("Generated: {}", record.fetched_at.format("%d %b %Y %H:%M")))
        ));
        self.rule();
        self.blank();
    }
}

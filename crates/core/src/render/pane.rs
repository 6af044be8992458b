use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::domain::analysis::{Analysis, Flags, Signal, Trend};
use crate::domain::charts::{FINANCIAL_CHARTS, PRICE_PERIODS};
use crate::domain::record::CompanyRecord;
use crate::domain::ScreenedStock;
use crate::render::format::{fmt_cr, fmt_price, MISSING};
use crate::render::income;

fn tone(value: f64, good: f64, bad: f64) -> &'static str {
    if value > good {
        " positive"
    } else if value < bad {
        " negative"
    } else {
        ""
    }
}

fn score_color(score: f64) -> &'static str {
    if score >= 60.0 {
        "#10B981"
    } else if score >= 40.0 {
        "#F59E0B"
    } else {
        "#EF4444"
    }
}

fn opt_pct(v: Option<f64>, decimals: usize) -> String {
    v.map(|v| format!("{v:.decimals$}%"))
        .unwrap_or_else(|| MISSING.to_string())
}

fn metric(out: &mut String, key: &str, value: &str, class: &str) {
    let _ = write!(
        out,
        r#"<div class="metric"><span class="key">{}</span><span class="val{class}">{}</span></div>"#,
        text(key),
        text(value)
    );
}

pub fn flags_html(flags: &Flags) -> String {
    let mut out = String::new();
    for (class, icon, items) in [
        ("green", "✓", &flags.green),
        ("amber", "⚠", &flags.amber),
        ("red", "✗", &flags.red),
    ] {
        for f in items {
            let _ = writeln!(out, r#"<div class="flag {class}">{icon} {}</div>"#, text(f));
        }
    }
    out
}

fn signals_html(signals: &[Signal]) -> String {
    let mut out = String::new();
    for s in signals {
        let class = format!("{:?}", s.sentiment).to_lowercase();
        let _ = write!(
            out,
            r#"<div class="signal {class}">{} {}</div>"#,
            s.sentiment.icon(),
            text(&s.text)
        );
    }
    out
}

pub fn pane_html(stock: &ScreenedStock, active: bool) -> String {
    let record = &stock.record;
    let a = &stock.analysis;
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="tab-pane" data-ticker="{}" style="display:{}">"#,
        attr(&record.ticker),
        if active { "block" } else { "none" }
    );
    header(&mut out, record, a);
    scorecard(&mut out, a);
    price_charts(&mut out, stock);
    if let Some(stmt) = income::latest_income(&record.profit_loss) {
        let _ = write!(
            out,
            r#"<div class="section"><h2>Income Flow</h2>{}</div>"#,
            income::waterfall_html(&stmt)
        );
    }
    financial_charts(&mut out, stock);
    metric_grid(&mut out, a);
    shareholding(&mut out, a);
    growth_table(&mut out, a);
    let _ = write!(
        out,
        r#"<div class="grid"><div class="section"><h2>Valuation Signals</h2>{}</div><div class="section"><h2>Technical Signals</h2>{}</div></div>"#,
        signals_html(&a.valuation.signals),
        signals_html(&a.momentum.signals)
    );
    let _ = write!(
        out,
        r#"<div class="section"><h2>Flags</h2>{}</div>"#,
        flags_html(&a.flags)
    );
    segments(&mut out, record);
    peers(&mut out, record);
    documents(&mut out, record);
    let _ = write!(
        out,
        r#"<div class="footer"><p>Source: <a href="{}" target="_blank">screener.in/{}</a> · Generated {}</p></div></div>"#,
        attr(&record.url),
        text(&record.ticker),
        record.fetched_at.format("%d %b %Y %H:%M")
    );
    out
}

fn header(out: &mut String, record: &CompanyRecord, a: &Analysis) {
    let m = &a.key_metrics;
    let basis = if record.is_consolidated {
        "Consolidated"
    } else {
        "Standalone"
    };
    let range = match (m.low_52w, m.high_52w) {
        (Some(lo), Some(hi)) => format!("52W: {} – {}", fmt_price(lo), fmt_price(hi)),
        _ => String::new(),
    };
    let _ = write!(
        out,
        r#"<div class="stock-header"><div><h1>{}</h1><div class="sub">{} · {basis} · {}</div></div><div class="price-block"><div class="price">{}</div><div class="meta">{}</div></div></div>"#,
        text(record.display_name()),
        text(&record.ticker),
        record.fetched_at.format("%Y-%m-%d"),
        m.current_price.map(fmt_price).unwrap_or_default(),
        text(&range)
    );
}

fn score_card(out: &mut String, label: &str, value: &str, color: &str, desc: &str) {
    let _ = write!(
        out,
        r#"<div class="score-card"><div class="label">{label}</div><div class="value" style="color:{color}">{}</div><div class="desc">{}</div></div>"#,
        text(value),
        text(desc)
    );
}

fn scorecard(out: &mut String, a: &Analysis) {
    let m = &a.key_metrics;
    let card = &a.scorecard;
    let val = a.valuation.score as f64;
    out.push_str(r#"<div class="scorecard">"#);
    score_card(
        out,
        "Quality",
        card.grade.as_str(),
        card.grade.color(),
        &format!("{:.1}/100", card.overall),
    );
    score_card(
        out,
        "Valuation",
        &a.valuation.verdict,
        score_color(val),
        &format!("{}/100", a.valuation.score),
    );
    score_card(
        out,
        "Market Cap",
        &m.market_cap.map(fmt_cr).unwrap_or_else(|| MISSING.into()),
        "var(--dark)",
        &format!("P/E: {}", m.pe.map(|v| format!("{v:.1}")).unwrap_or_else(|| MISSING.into())),
    );
    score_card(
        out,
        "ROCE / ROE",
        &opt_pct(m.roce, 1),
        "var(--dark)",
        &format!("ROE: {}", opt_pct(m.roe, 1)),
    );
    score_card(
        out,
        "P/B · Div",
        &m.pb.map(|v| format!("{v:.2}")).unwrap_or_else(|| MISSING.into()),
        "var(--dark)",
        &format!("Div: {}", opt_pct(m.div_yield, 1)),
    );
    out.push_str("</div>");

    out.push_str(r#"<div class="section"><h2>Score Breakdown</h2><div class="dims">"#);
    for (name, dim) in card.dimensions() {
        let score = dim.score.clamp(0, 100);
        let notes = dim.notes.join("; ");
        let _ = write!(
            out,
            r#"<div class="dim" title="{}"><div class="name"><span>{name}</span><span>{score}</span></div><div class="track"><div class="fill" style="width:{score}%;background:{}"></div></div></div>"#,
            attr(&notes),
            score_color(score as f64)
        );
    }
    out.push_str("</div></div>");
}

fn price_charts(out: &mut String, stock: &ScreenedStock) {
    let available: Vec<_> = PRICE_PERIODS
        .iter()
        .filter_map(|p| stock.charts.get(p.key()).map(|svg| (*p, svg)))
        .collect();
    let Some(default) = available.last().map(|(p, _)| *p) else {
        return;
    };
    let mut buttons = String::new();
    let mut blocks = String::new();
    for (period, svg) in &available {
        let on = *period == default;
        let _ = write!(
            buttons,
            r#"<button class="period-btn{}" data-period="{}">{}</button>"#,
            if on { " active" } else { "" },
            period.key(),
            period.label()
        );
        let _ = write!(
            blocks,
            r#"<div class="price-period" data-period="{}" style="display:{}">{svg}</div>"#,
            period.key(),
            if on { "block" } else { "none" }
        );
    }
    let _ = write!(
        out,
        r#"<div class="section price-block-charts"><div class="period-bar">{buttons}</div>{blocks}</div>"#
    );
}

fn financial_charts(out: &mut String, stock: &ScreenedStock) {
    let cards: String = FINANCIAL_CHARTS
        .iter()
        .filter_map(|(key, _)| stock.charts.get(key))
        .map(|svg| format!(r#"<div class="chart-card">{svg}</div>"#))
        .collect();
    if !cards.is_empty() {
        let _ = write!(out, r#"<div class="charts-grid">{cards}</div>"#);
    }
}

fn metric_grid(out: &mut String, a: &Analysis) {
    let m = &a.key_metrics;
    out.push_str(r#"<div class="grid-4"><div class="section"><h2>Key Metrics</h2>"#);
    metric(out, "Price", &m.current_price.map(fmt_price).unwrap_or_else(|| MISSING.into()), "");
    if let (Some(hi), Some(lo)) = (m.high_52w, m.low_52w) {
        metric(out, "52W H/L", &format!("{} / {}", fmt_price(hi), fmt_price(lo)), "");
    }
    metric(out, "Book Value", &m.book_value.map(fmt_price).unwrap_or_else(|| MISSING.into()), "");
    metric(out, "ROCE", &opt_pct(m.roce, 1), m.roce.map_or("", |v| tone(v, 15.0, 10.0)));
    metric(out, "ROE", &opt_pct(m.roe, 1), m.roe.map_or("", |v| tone(v, 15.0, 10.0)));
    if let Some(pos) = a.momentum.pos_in_52w {
        let color = if pos > 0.6 {
            "var(--green)"
        } else if pos < 0.3 {
            "var(--red)"
        } else {
            "var(--amber)"
        };
        let _ = write!(
            out,
            r#"<div class="bar-52w"><div class="fill" style="width:{:.0}%;background:{color}"></div></div>"#,
            pos.clamp(0.0, 1.0) * 100.0
        );
    }
    out.push_str("</div>");

    if let Some(pl) = &a.profit_loss {
        out.push_str(r#"<div class="section"><h2>Profit &amp; Loss</h2>"#);
        metric(out, "Revenue", &fmt_cr(pl.sales_latest), "");
        metric(
            out,
            "Net Profit",
            &fmt_cr(pl.net_profit_latest),
            if pl.net_profit_latest > 0.0 { " positive" } else { " negative" },
        );
        metric(out, "OPM / NPM", &format!("{:.0}% / {:.1}%", pl.opm_latest, pl.npm_latest), "");
        let cagr = |v: Option<f64>| v.map(|v| format!("{v:+.1}%")).unwrap_or_else(|| MISSING.into());
        metric(out, "3Y Rev CAGR", &cagr(pl.sales_cagr_3y), "");
        metric(out, "3Y Profit CAGR", &cagr(pl.profit_cagr_3y), "");
        out.push_str("</div>");
    }
    if let Some(bs) = &a.balance_sheet {
        out.push_str(r#"<div class="section"><h2>Balance Sheet</h2>"#);
        metric(out, "Equity", &fmt_cr(bs.shareholder_equity), "");
        metric(out, "Borrowings", &fmt_cr(bs.borrowings), "");
        let de_class = match bs.debt_to_equity {
            Some(d) if d < 0.5 => " positive",
            Some(d) if d <= 1.5 => "",
            _ => " negative",
        };
        metric(
            out,
            "D/E",
            &bs.debt_to_equity.map(|d| format!("{d:.2}")).unwrap_or_else(|| MISSING.into()),
            de_class,
        );
        metric(out, "Assets", &fmt_cr(bs.total_assets), "");
        out.push_str("</div>");
    }
    if let Some(cf) = &a.cash_flow {
        out.push_str(r#"<div class="section"><h2>Cash Flow</h2>"#);
        let sign = |v: f64| if v > 0.0 { " positive" } else { " negative" };
        metric(out, "CFO", &fmt_cr(cf.cfo_latest), sign(cf.cfo_latest));
        metric(out, "FCF", &fmt_cr(cf.fcf_latest), sign(cf.fcf_latest));
        let positive = (cf.cfo_consistency * cf.total_years as f64).round() as usize;
        metric(out, "CFO +ve", &format!("{positive}/{} yrs", cf.total_years), "");
        out.push_str("</div>");
    }
    out.push_str("</div>");
}

fn shareholding(out: &mut String, a: &Analysis) {
    let Some(sh) = &a.shareholding else {
        return;
    };
    if sh.promoter <= 0.0 {
        return;
    }
    let fii_class = match sh.fii_trend {
        Trend::Increasing => " positive",
        Trend::Decreasing => " negative",
        Trend::Stable | Trend::InsufficientData => "",
    };
    out.push_str(r#"<div class="section"><h2>Shareholding Pattern</h2><div class="sh-bar">"#);
    for (label, value, color) in [
        ("P", sh.promoter, "#16A34A"),
        ("FII", sh.fii, "#3B82F6"),
        ("DII", sh.dii, "#0891B2"),
        ("Pub", sh.public, "#9CA3AF"),
    ] {
        let _ = write!(
            out,
            r#"<div style="width:{value:.2}%;background:{color}">{label} {value:.0}%</div>"#
        );
    }
    out.push_str("</div>");
    metric(out, "Promoter Trend", sh.promoter_trend.as_str(), "");
    metric(out, "FII Trend", sh.fii_trend.as_str(), fii_class);
    metric(out, "DII Trend", sh.dii_trend.as_str(), "");
    out.push_str("</div>");
}

fn growth_table(out: &mut String, a: &Analysis) {
    let Some(first) = a.growth.first() else {
        return;
    };
    let mut rows = String::new();
    for g in &a.growth {
        let label = g
            .category
            .replace("Compounded ", "")
            .replace("Stock Price CAGR", "Stock CAGR")
            .replace("Return on Equity", "ROE");
        let cells: String = g
            .rates
            .iter()
            .map(|(_, v)| match v {
                Some(v) => {
                    let color = if *v > 10.0 {
                        "#10B981"
                    } else if *v > 0.0 {
                        "#F59E0B"
                    } else {
                        "#EF4444"
                    };
                    format!(r#"<td style="color:{color};font-weight:600">{v:+.0}%</td>"#)
                }
                None => format!("<td>{MISSING}</td>"),
            })
            .collect();
        let _ = write!(rows, "<tr><td>{}</td>{cells}</tr>", text(&label));
    }
    let heads: String = first
        .rates
        .iter()
        .map(|(p, _)| format!("<th>{}</th>", text(p)))
        .collect();
    let _ = write!(
        out,
        r#"<div class="section"><h2>Compounded Growth</h2><table class="data-table"><tr><th>Metric</th>{heads}</tr>{rows}</table></div>"#
    );
}

fn segments(out: &mut String, record: &CompanyRecord) {
    if !record.segments.is_empty() {
        let tags: String = record
            .segments
            .iter()
            .map(|s| format!(r#"<span class="segment-tag">{}</span>"#, text(s)))
            .collect();
        let _ = write!(
            out,
            r#"<div class="section"><h2>Business Segments</h2><div>{tags}</div></div>"#
        );
    }
    if !record.expense_breakdown.is_empty() {
        out.push_str(r#"<div class="section"><h2>Expense Breakdown</h2>"#);
        for e in &record.expense_breakdown {
            metric(out, &e.name, &format!("{:.1}%", e.pct), "");
        }
        out.push_str("</div>");
    }
}

fn peers(out: &mut String, record: &CompanyRecord) {
    let peers = &record.peers;
    if peers.rows.len() < 2 {
        return;
    }
    let cols = peers.headers.len().min(8);
    let head: String = peers.headers[..cols]
        .iter()
        .map(|h| format!("<th>{}</th>", text(h)))
        .collect();
    let mut body = String::new();
    for row in peers.rows.iter().take(10) {
        let own = row
            .ticker
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(&record.ticker));
        let cells: String = (0..cols)
            .map(|i| format!("<td>{}</td>", text(row.cells.get(i).map(String::as_str).unwrap_or(""))))
            .collect();
        let _ = write!(
            body,
            "<tr{}>{cells}</tr>",
            if own { r#" class="self""# } else { "" }
        );
    }
    let _ = write!(
        out,
        r#"<div class="section"><h2>Peer Comparison</h2><table class="data-table"><tr>{head}</tr>{body}</table></div>"#
    );
}

fn documents(out: &mut String, record: &CompanyRecord) {
    let docs = &record.documents;
    if docs.concalls.is_empty() && docs.annual_reports.is_empty() {
        return;
    }
    out.push_str(r#"<div class="section"><h2>Recent Documents</h2>"#);
    let items = docs
        .concalls
        .iter()
        .take(3)
        .map(|d| ("📞", d))
        .chain(docs.annual_reports.iter().take(2).map(|d| ("📄", d)));
    for (icon, doc) in items {
        let label: String = doc.text.chars().take(80).collect();
        let _ = write!(
            out,
            r#"<div class="doc-item">{icon} <a href="{}" target="_blank">{}</a></div>"#,
            attr(&doc.url),
            text(&label)
        );
    }
    out.push_str("</div>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::Grade;
    use crate::domain::charts::ChartSet;
    use crate::domain::record::DocumentLink;

    fn stock() -> ScreenedStock {
        let mut record = CompanyRecord::new("M&M");
        record.company_name = "Mahindra & Mahindra <Ltd>".to_string();
        record.url = "https://www.screener.in/company/M&M/consolidated/".to_string();
        record.documents.concalls.push(DocumentLink {
            text: "Transcript".into(),
            url: "https://example.com/a?b=1&c=2".into(),
        });
        let mut analysis = Analysis::default();
        analysis.scorecard.grade = Grade::A;
        analysis.flags.red.push("Debt <rising>".into());
        let mut charts = ChartSet::default();
        charts.insert("price_1y", "<svg id=\"one\"></svg>".into());
        charts.insert("price_max", "<svg id=\"max\"></svg>".into());
        ScreenedStock {
            record,
            analysis,
            charts,
        }
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let html = pane_html(&stock(), true);
        assert!(html.contains("Mahindra &amp; Mahindra &lt;Ltd&gt;"));
        assert!(html.contains(r#"data-ticker="M&amp;M""#));
        assert!(html.contains("a?b=1&amp;c=2"));
        assert!(html.contains(r#"<div class="flag red">✗ Debt &lt;rising&gt;</div>"#));
    }

    #[test]
    fn longest_price_period_is_shown_first() {
        let html = pane_html(&stock(), false);
        assert!(html.contains(r#"<button class="period-btn active" data-period="price_max">Max</button>"#));
        assert!(html.contains(r#"<div class="price-period" data-period="price_1y" style="display:none">"#));
        assert!(html.starts_with(r#"<div class="tab-pane" data-ticker="M&amp;M" style="display:none">"#));
    }

    #[test]
    fn flags_render_in_colour_order() {
        let flags = Flags {
            green: vec!["g".into()],
            amber: vec!["a".into()],
            red: vec!["r".into()],
        };
        let html = flags_html(&flags);
        let g = html.find("flag green").unwrap();
        let a = html.find("flag amber").unwrap();
        let r = html.find("flag red").unwrap();
        assert!(g < a && a < r);
    }
}

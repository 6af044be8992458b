pub const MISSING: &str = "N/A";

/// Integer part with Indian digit grouping: `1234567` -> `12,34,567`.
pub fn fmt_indian(value: f64) -> String {
    let digits = format!("{}", value.abs().trunc() as u64);
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (h, t) = rest.split_at(rest.len() - 2);
        groups.push(t);
        rest = h;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Amount in crores: `₹12,345 Cr`, `₹1.2 Lakh Cr`, `₹15 Lakh Cr`.
pub fn fmt_cr(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 100_000.0 {
        let lakh_cr = abs / 100_000.0;
        if lakh_cr >= 10.0 {
            format!("{sign}₹{lakh_cr:.0} Lakh Cr")
        } else {
            format!("{sign}₹{lakh_cr:.1} Lakh Cr")
        }
    } else if abs >= 1.0 {
        format!("{sign}₹{} Cr", fmt_indian(abs))
    } else if abs > 0.0 {
        format!("{sign}₹{abs:.1} Cr")
    } else {
        "₹0".to_string()
    }
}

pub fn fmt_pct(value: f64) -> String {
    if value == 0.0 {
        return "0%".to_string();
    }
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{sign}{value:.1}%")
}

/// Share price: Indian grouping, paise only below ₹100.
pub fn fmt_price(value: f64) -> String {
    if value.abs() >= 100.0 {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}₹{}", fmt_indian(value.round()))
    } else {
        format!("₹{value:.2}")
    }
}

pub fn opt<F: Fn(f64) -> String>(value: Option<f64>, f: F) -> String {
    value.map(f).unwrap_or_else(|| MISSING.to_string())
}

pub fn sparkline(values: &[f64]) -> String {
    const BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    if values.len() < 2 {
        return String::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max > min { max - min } else { 1.0 };
    values
        .iter()
        .map(|v| {
            let idx = (((v - min) / range) * 8.0) as usize;
            BLOCKS[idx.min(8)]
        })
        .collect()
}

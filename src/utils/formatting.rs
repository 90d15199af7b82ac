use chrono::NaiveDate;

/// Money with thousands separators, e.g. `12,063.44 DKK`.
pub fn format_money(amount: f64, currency: &str) -> String {
    let amount = if amount == 0.0 { 0.0 } else { amount }; // avoid "-0.00"
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{cents} {currency}")
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

pub fn format_area(m2: f64) -> String {
    format!("{:.1} m²", m2)
}

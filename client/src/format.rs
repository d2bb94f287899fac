use alloy_primitives::{utils::format_units, U256};

pub const MAX_SIGNIFICANT_DIGITS: i32 = 4;

/// Render a fixed-point amount for display: at most four significant
/// digits with `,` grouping, e.g. `1234567 * 10^18` -> `"1,235,000"`.
pub fn format_amount(value: U256, decimals: u8) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    match format_units(value, decimals)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
    {
        Some(number) => format_significant(number),
        None => value.to_string(),
    }
}

fn format_significant(number: f64) -> String {
    let magnitude = number.abs().log10().floor() as i32;
    let last_digit = MAX_SIGNIFICANT_DIGITS - 1;

    let text = if magnitude >= last_digit {
        let factor = 10f64.powi(magnitude - last_digit);
        format!("{:.0}", (number / factor).round() * factor)
    } else {
        let fraction_digits = (last_digit - magnitude) as usize;
        let fixed = format!("{number:.fraction_digits$}");
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    };

    group_thousands(&text)
}

fn group_thousands(text: &str) -> String {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(text.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

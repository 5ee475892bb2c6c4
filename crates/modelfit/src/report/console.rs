//! The plain-text model report printed after an evaluation.

use crate::stats::CvSummary;

/// Format `value` like C's `%.{sig}g`.
///
/// Uses fixed notation when the decimal exponent is in `[-4, sig)` and
/// scientific notation otherwise, with trailing zeros removed in both.
pub fn format_g(value: f64, sig: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let sig = sig.max(1);
    // Round to `sig` significant digits first, the exponent can move.
    let sci = format!("{:.*e}", sig - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= sig as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (sig as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Build the report text, starting with a blank line.
pub fn render_report(train_auc: f64, cv: Option<&CvSummary>) -> String {
    let mut out = String::from("\nModel Report\n");
    out.push_str(&format!("AUC Score (Train): {:.6}\n", train_auc));
    if let Some(cv) = cv {
        out.push_str(&format!(
            "CV Score : Mean - {} | Std - {} | Min - {} | Max - {}\n",
            format_g(cv.mean, 7),
            format_g(cv.std, 7),
            format_g(cv.min, 7),
            format_g(cv.max, 7)
        ));
    }
    out
}

pub fn print_report(train_auc: f64, cv: Option<&CvSummary>) {
    print!("{}", render_report(train_auc, cv));
}

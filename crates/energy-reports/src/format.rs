//! Number, date and markup helpers shared by the renderers

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

fn group_digits(int_part: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn grouped(value: f64, decimals: usize, force_sign: bool) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let body = format!("{:.*}", decimals, value.abs());
    let (int_part, frac) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body.as_str(), None),
    };

    let sign = if value.is_sign_negative() {
        "-"
    } else if force_sign {
        "+"
    } else {
        ""
    };

    let mut out = format!("{sign}{}", group_digits(int_part));
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Comma-grouped number: `thousands(1234567.0, 0)` is `"1,234,567"`
pub fn thousands(value: f64, decimals: usize) -> String {
    grouped(value, decimals, false)
}

/// Comma-grouped number with an explicit sign: `"+1,234.5"`
pub fn signed_thousands(value: f64, decimals: usize) -> String {
    grouped(value, decimals, true)
}

/// Number with an explicit sign and no grouping: `"+0.0123"`
pub fn signed(value: f64, decimals: usize) -> String {
    format!("{value:+.decimals$}")
}

/// Signed percentage with two decimals: `"-1.25%"`
pub fn pct(value: f64) -> String {
    format!("{value:+.2}%")
}

/// Portuguese long date, e.g. `14 de novembro de 2025`
pub fn pt_long_date(date: NaiveDate) -> String {
    let month = MONTHS_PT[date.month0() as usize];
    format!("{} de {} de {}", date.day(), month, date.year())
}

/// Escape `<`, `>` and `&` for Telegram HTML
pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("valid regex"));
// a lone `*` followed by a space is a list bullet, not emphasis
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").expect("valid regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+?)[ \t]*$").expect("valid regex"));

/// Turn LLM Markdown into Telegram-safe HTML
///
/// The text is escaped first. Then `` `code` `` becomes `<code>`, `**bold**`
/// and `#` headings become `<b>`, and `*italic*` becomes `<i>`.
pub fn telegram_html(markdown: &str) -> String {
    let escaped = escape_html(markdown);
    let html = CODE.replace_all(&escaped, "<code>$1</code>");
    let html = BOLD.replace_all(&html, "<b>$1</b>");
    let html = ITALIC.replace_all(&html, "<i>$1</i>");
    HEADING.replace_all(&html, "<b>$1</b>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(1_234_567.4, 0), "1,234,567");
        assert_eq!(thousands(999.0, 0), "999");
        assert_eq!(thousands(2892.26, 1), "2,892.3");
        assert_eq!(thousands(-1500.0, 0), "-1,500");
        assert_eq!(thousands(0.0, 1), "0.0");
    }

    #[test]
    fn test_signed_thousands() {
        assert_eq!(signed_thousands(2_100_000.0, 0), "+2,100,000");
        assert_eq!(signed_thousands(-97.0, 1), "-97.0");
        assert_eq!(signed_thousands(0.0, 0), "+0");
        assert_eq!(signed_thousands(-0.2, 0), "-0");
    }

    #[test]
    fn test_signed_and_pct() {
        assert_eq!(signed(-0.01234, 4), "-0.0123");
        assert_eq!(signed(0.5, 4), "+0.5000");
        assert_eq!(pct(1.0), "+1.00%");
        assert_eq!(pct(-0.456), "-0.46%");
    }

    #[test]
    fn test_pt_long_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(pt_long_date(date), "4 de março de 2025");
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(pt_long_date(date), "31 de dezembro de 2025");
    }

    #[test]
    fn test_telegram_html() {
        let md = "## 1) Preço spot\n**Brent** acima de <80> & WTI";
        assert_eq!(
            telegram_html(md),
            "<b>1) Preço spot</b>\n<b>Brent</b> acima de &lt;80&gt; &amp; WTI"
        );
        assert_eq!(telegram_html("sem marcação"), "sem marcação");
    }

    #[test]
    fn test_telegram_html_italic_and_code() {
        assert_eq!(
            telegram_html("*cenário base* com `spread < 5`"),
            "<i>cenário base</i> com <code>spread &lt; 5</code>"
        );
        assert_eq!(
            telegram_html("**Brent** e *WTI* em alta"),
            "<b>Brent</b> e <i>WTI</i> em alta"
        );
        assert_eq!(telegram_html("* item um\n* item dois"), "* item um\n* item dois");
    }
}

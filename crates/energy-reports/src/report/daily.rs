//! Daily price report text
//!
//! The context block is the factual input of the LLM prompt. When no model
//! is available the same facts fill the fixed topics of a plain report.

use super::LegSummary;
use crate::commodity::{Commodity, CommodityProfile};
use crate::format::{escape_html, pt_long_date, telegram_html};
use crate::metrics::Trend;
use crate::series::Series;
use chrono::NaiveDate;
use energy_prompt::DocumentBuilder;

const NO_NARRATIVE: &str = "Sem dados narrativos.";

/// Footer provider name of the plain report
pub const PLAIN_PROVIDER: &str = "nenhum (relatório automático)";

fn price_label(profile: &CommodityProfile, leg: &LegSummary, legs: usize) -> String {
    if legs > 1 {
        format!("{} {}", profile.price_label, leg.name)
    } else {
        profile.price_label.to_string()
    }
}

/// Latest reading and, when there is one, the previous reading
fn price_lines(profile: &CommodityProfile, leg: &LegSummary, legs: usize) -> Vec<String> {
    let s = &leg.summary;
    let unit = profile.unit;
    let (date, price) = s.latest;

    let mut lines = vec![format!(
        "- {}: {price:.4} {unit} em {date}.",
        price_label(profile, leg, legs)
    )];

    if let Some((prev_date, prev)) = s.previous {
        lines.push(format!(
            "- Leitura anterior: {prev:.4} {unit} em {prev_date}. Variação diária: {:+.4} {unit} ({:+.2}%).",
            s.delta, s.pct
        ));
    }
    lines
}

fn period_line(leg: &LegSummary) -> String {
    let s = &leg.summary;
    format!(
        "- Período disponível na série {} ({}): {} → {}.",
        s.source.tag(),
        s.series_id,
        s.first_date,
        s.last_date
    )
}

fn range_line(profile: &CommodityProfile, leg: &LegSummary) -> String {
    format!(
        "- Faixa histórica de preço: mínimo {:.4} {unit}, máximo {:.4} {unit}.",
        leg.summary.min,
        leg.summary.max,
        unit = profile.unit
    )
}

fn trend_line(leg: &LegSummary, threshold: f64) -> Option<String> {
    leg.summary.previous?;
    let trend: Trend = leg.summary.trend(threshold);
    Some(format!(
        "- Leitura de tendência do último movimento: {trend} (limiar de ±{threshold:.1}%)."
    ))
}

/// Headline lines of multi-leg reports: each price and the spread of the
/// second leg over the first (oil: Brent−WTI)
fn leg_headlines(legs: &[LegSummary]) -> Vec<String> {
    if legs.len() < 2 {
        return Vec::new();
    }

    let mut lines: Vec<String> = legs
        .iter()
        .map(|leg| format!("- {}: USD {:.2}", leg.name, leg.summary.latest.1))
        .collect();

    let (first, second) = (&legs[0], &legs[1]);
    lines.push(format!(
        "- Spread {}−{}: USD {:+.2}",
        second.name,
        first.name,
        second.summary.latest.1 - first.summary.latest.1
    ));
    lines
}

/// Factual context handed to the model
pub fn context_block(profile: &CommodityProfile, legs: &[LegSummary], threshold: f64) -> String {
    let mut lines = leg_headlines(legs);

    for leg in legs {
        lines.extend(price_lines(profile, leg, legs.len()));
        lines.push(period_line(leg));
        lines.push(range_line(profile, leg));
    }

    if let Some(line) = legs.first().and_then(|leg| trend_line(leg, threshold)) {
        lines.push(line);
    }

    lines.extend(profile.commentary.iter().map(|c| (*c).to_string()));
    lines.join("\n")
}

fn is_executive(topic: &str) -> bool {
    topic.to_lowercase().starts_with("interpretação")
}

/// Fixed-topic report built from the numbers alone
pub fn plain_report(profile: &CommodityProfile, legs: &[LegSummary], threshold: f64) -> String {
    let mut headline = leg_headlines(legs);
    for leg in legs {
        headline.extend(price_lines(profile, leg, legs.len()));
    }

    let mut executive: Vec<String> = Vec::new();
    if let Some(line) = legs.first().and_then(|leg| trend_line(leg, threshold)) {
        executive.push(line);
    }
    for leg in legs {
        executive.push(period_line(leg));
        executive.push(range_line(profile, leg));
    }
    executive.extend(profile.commentary.iter().map(|c| (*c).to_string()));

    let mut doc = DocumentBuilder::new();
    for (i, topic) in profile.topics.iter().enumerate() {
        if i > 0 {
            doc = doc.blank();
        }
        doc = doc.line(format!("**{}) {topic}**", i + 1));

        let body = if i == 0 {
            &headline
        } else if is_executive(topic) {
            &executive
        } else {
            doc = doc.line(NO_NARRATIVE);
            continue;
        };

        doc = if body.is_empty() {
            doc.line(NO_NARRATIVE)
        } else {
            doc.lines(body.iter().cloned())
        };
    }
    doc.build()
}

/// Report title for number `n` dated `date` (already in UTC−3)
pub fn report_title(commodity: Commodity, date: NaiveDate, n: u64) -> String {
    commodity.title(&pt_long_date(date), n)
}

/// Telegram HTML message: bold title, converted body, provider footer
pub fn final_message(title: &str, body_markdown: &str, provider: &str, elapsed_secs: f64) -> String {
    format!(
        "<b>{}</b>\n\n{}\n\n<i>Provedor LLM: {} • {elapsed_secs:.1}s</i>",
        escape_html(title),
        telegram_html(body_markdown.trim()),
        escape_html(provider),
    )
}

/// Markdown summary posted after the uranium price download
///
/// `None` when the series has no numeric observation.
pub fn uranium_summary(series: &Series) -> Option<String> {
    let (last_date, last_price) = series.valued().last()?;
    let first_date = series.valued().next().map_or(last_date, |(d, _)| d);
    let count = series.valued().count();

    Some(format!(
        "📊 *Uranium — Relatório Diário*\n\n\
         Último preço: *{last_price:.2} USD/lb* em *{last_date}*.\n\n\
         Período baixado: {first_date} → {last_date}\n\
         Total de observações: {count}"
    ))
}

//! Weekly macro summary across crude, products and gas storage

use crate::format::{pct, signed, signed_thousands, thousands};
use crate::interpret::{interpret_gas_weekly, interpret_petroleum_weekly, macro_view};
use crate::metrics::{ChangeOutlook, SeriesStats, WindowChange, crude_4w_trend};
use crate::series::Series;
use chrono::NaiveDate;
use serde::Serialize;

/// Latest numbers of the three inventory series
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeeklySnapshot {
    pub crude: Option<SeriesStats>,
    pub products: Option<SeriesStats>,
    pub gas: Option<SeriesStats>,
    pub crude_4w: Option<WindowChange>,
    pub crude_outlook: Option<ChangeOutlook>,
    pub products_outlook: Option<ChangeOutlook>,
    pub gas_outlook: Option<ChangeOutlook>,
}

impl WeeklySnapshot {
    pub fn from_series(crude: Option<&Series>, products: Option<&Series>, gas: Option<&Series>) -> Self {
        Self {
            crude: crude.and_then(SeriesStats::latest),
            products: products.and_then(SeriesStats::latest),
            gas: gas.and_then(SeriesStats::latest),
            crude_4w: crude.and_then(crude_4w_trend),
            crude_outlook: crude.and_then(ChangeOutlook::for_series),
            products_outlook: products.and_then(ChangeOutlook::for_series),
            gas_outlook: gas.and_then(ChangeOutlook::for_series),
        }
    }

    /// Week the crude reading refers to
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.crude.as_ref().map(|s| s.date)
    }

    pub fn macro_view(&self) -> String {
        macro_view(
            self.crude.as_ref(),
            self.products.as_ref(),
            self.gas.as_ref(),
            self.crude_4w.as_ref(),
        )
    }
}

pub(crate) fn barrels(value: Option<f64>) -> String {
    value.map_or_else(|| "n/d".to_string(), |v| thousands(v, 0))
}

pub(crate) fn bcf(value: Option<f64>) -> String {
    value.map_or_else(|| "n/d".to_string(), |v| thousands(v, 1))
}

fn petroleum_line(name: &str, stats: &SeriesStats) -> String {
    format!(
        "🛢️ *{name}*: {} bbl | {} bbl WoW ({}) — {}",
        barrels(stats.value),
        signed_thousands(stats.delta, 0),
        pct(stats.pct),
        interpret_petroleum_weekly(stats.pct)
    )
}

/// Telegram Markdown summary of the week
pub fn summary_message(snapshot: &WeeklySnapshot) -> String {
    let mut lines = vec!["📊 *ENERGY — Weekly Macro Summary*\n".to_string()];

    if let Some(date) = snapshot.reference_date() {
        lines.push(format!("🗓 *Referência semanal:* {date}\n"));
    }

    if let Some(crude) = &snapshot.crude {
        lines.push(petroleum_line("Crude (Ex-SPR)", crude));
    }
    if let Some(products) = &snapshot.products {
        lines.push(petroleum_line("Crude + Products (Total US)", products));
    }
    if let Some(gas) = &snapshot.gas {
        lines.push(format!(
            "⛽ *Gas Storage (Lower 48)*: {} Bcf | {} Bcf WoW ({}) — {}",
            bcf(gas.value),
            signed(gas.delta, 1),
            pct(gas.pct),
            interpret_gas_weekly(gas.delta)
        ));
    }

    lines.push(String::new());
    lines.push(format!("🧭 *Leitura macro da semana:*\n{}\n", snapshot.macro_view()));

    if let Some(trend) = &snapshot.crude_4w {
        lines.push(format!(
            "📉 *Tendência 4 semanas (Crude)*: {} bbl desde 4 semanas atrás ({}).",
            signed_thousands(trend.delta, 0),
            pct(trend.pct)
        ));
    }

    lines.push("\n🔗 Dados detalhados: relatórios individuais de Petroleum & Gas Storage.".to_string());
    lines.join("\n")
}

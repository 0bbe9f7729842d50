//! Weekly EIA inventory messages (Telegram Markdown)

use crate::format::{pct, signed_thousands, thousands};
use crate::interpret::{interpret_gas_quick, interpret_petroleum_quick};
use crate::metrics::SeriesStats;
use crate::series::ValueColumn;

/// The three weekly inventory series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inventory {
    /// Crude oil stocks excluding SPR
    Crude,
    /// Crude oil plus petroleum products, total US
    Products,
    /// Working gas in storage, Lower 48
    GasStorage,
}

impl Inventory {
    pub const ALL: [Inventory; 3] = [Inventory::Crude, Inventory::Products, Inventory::GasStorage];

    pub fn default_series_id(self) -> &'static str {
        match self {
            Inventory::Crude => "PET.WCESTUS1.W",
            Inventory::Products => "PET.WTTSTUS1.W",
            Inventory::GasStorage => "NG.NW2_EPG0_SWO_R48_BCF.W",
        }
    }

    /// Environment variable overriding the series id
    pub fn env_var(self) -> &'static str {
        match self {
            Inventory::Crude => "EIA_PETROLEUM_CRUDE_SERIES_ID",
            Inventory::Products => "EIA_PETROLEUM_PRODUCTS_SERIES_ID",
            Inventory::GasStorage => "EIA_GAS_STORAGE_SERIES_ID",
        }
    }

    pub fn csv_file(self) -> &'static str {
        match self {
            Inventory::Crude => "petroleum_crude.csv",
            Inventory::Products => "petroleum_products.csv",
            Inventory::GasStorage => "gas_storage.csv",
        }
    }

    /// Text file the message is written to
    pub fn message_file(self) -> &'static str {
        match self {
            Inventory::Crude => "telegram_petroleum_crude.txt",
            Inventory::Products => "telegram_petroleum_products.txt",
            Inventory::GasStorage => "telegram_gas_storage.txt",
        }
    }

    pub fn column(self) -> ValueColumn {
        match self {
            Inventory::GasStorage => ValueColumn::StorageBcf,
            _ => ValueColumn::Value,
        }
    }

    /// Series id after the environment override
    pub fn series_id<F>(self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(self.env_var())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.default_series_id().to_string())
    }
}

fn or_nd(value: Option<f64>, render: impl Fn(f64) -> String) -> String {
    value.map_or_else(|| "n/d".to_string(), render)
}

fn body(
    header: &str,
    stats: &SeriesStats,
    level_line: String,
    change_line: String,
    interpretation: &str,
    dataset_link: Option<&str>,
) -> String {
    format!(
        "{header}\n\n\
         🔖 *Série:* {} ({})\n\
         📅 *Data:* {}\n\
         {level_line}\n\
         {change_line}\n\n\
         🔍 *Interpretação rápida:* {interpretation}\n\n\
         🔗 Dados: {}\n",
        stats.label,
        stats.series_id,
        stats.date,
        dataset_link.unwrap_or("local"),
    )
}

fn petroleum_message(
    header: &str,
    level: &str,
    stats: &SeriesStats,
    dataset_link: Option<&str>,
) -> String {
    body(
        header,
        stats,
        format!("📈 *{level}:* {} bbl", or_nd(stats.value, |v| thousands(v, 0))),
        format!(
            "🔁 *Variação WoW:* {} bbl ({})",
            signed_thousands(stats.delta, 0),
            pct(stats.pct)
        ),
        interpret_petroleum_quick(stats.pct),
        dataset_link,
    )
}

/// Crude stocks message; a fixed notice when there is no data
pub fn crude_message(stats: Option<&SeriesStats>, dataset_link: Option<&str>) -> String {
    match stats {
        Some(stats) => petroleum_message(
            "📦 *ENERGY — Petroleum (Crude) Weekly*",
            "Estoque",
            stats,
            dataset_link,
        ),
        None => "📦 *ENERGY — Petroleum (Crude)*\n\nSem dados disponíveis.".to_string(),
    }
}

/// Crude plus products message
pub fn products_message(stats: Option<&SeriesStats>, dataset_link: Option<&str>) -> String {
    match stats {
        Some(stats) => petroleum_message(
            "🛢️ *ENERGY — Petroleum (Crude + Products) Weekly*",
            "Estoque Total",
            stats,
            dataset_link,
        ),
        None => "🛢️ *ENERGY — Petroleum (Crude + Products)*\n\nSem dados disponíveis.".to_string(),
    }
}

/// Gas storage message, read against `hist_avg` (Bcf) when known
pub fn gas_message(
    stats: Option<&SeriesStats>,
    hist_avg: Option<f64>,
    dataset_link: Option<&str>,
) -> String {
    const HEADER: &str = "⛽ *ENERGY — Gas Storage Weekly*";

    let Some(stats) = stats else {
        return format!("{HEADER}\n\nSem dados disponíveis.");
    };

    body(
        HEADER,
        stats,
        format!("📦 *Storage Total:* {} Bcf", or_nd(stats.value, |v| thousands(v, 1))),
        format!(
            "🔁 *Variação WoW:* {} Bcf ({})",
            signed_thousands(stats.delta, 1),
            pct(stats.pct)
        ),
        interpret_gas_quick(stats.value, stats.delta, hist_avg),
        dataset_link,
    )
}

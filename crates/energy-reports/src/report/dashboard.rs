//! Weekly dashboards (Markdown and HTML)
//!
//! Both embed the weekly summary text and reference chart images by file
//! name; the images themselves are produced elsewhere.

use super::weekly::{WeeklySnapshot, barrels, bcf};
use crate::format::{pct, signed, signed_thousands, thousands};
use crate::metrics::{ChangeOutlook, SeriesStats};
use energy_prompt::DocumentBuilder;

const SOURCE_NOTE: &str =
    "Fonte: U.S. EIA (API v2, séries PET.WCESTUS1.W, PET.WTTSTUS1.W, NG.NW2_EPG0_SWO_R48_BCF.W).";

const CRUDE: &str = "Crude (Ex-SPR)";
const PRODUCTS: &str = "Crude + Products (Total US)";
const GAS: &str = "Gas Storage (Lower 48)";

struct Chart {
    markdown_title: &'static str,
    html_title: &'static str,
    file: &'static str,
    alt: &'static str,
}

const CHARTS: [Chart; 5] = [
    Chart {
        markdown_title: "Crude Inventories — últimas 12 semanas",
        html_title: "Crude Inventories — últimas 12 semanas",
        file: "crude_12w.png",
        alt: "Crude 12w",
    },
    Chart {
        markdown_title: "Crude + Products — Total US — últimas 12 semanas",
        html_title: "Crude + Products — Total US — últimas 12 semanas",
        file: "products_12w.png",
        alt: "Crude+Products 12w",
    },
    Chart {
        markdown_title: "Gas Storage — Lower 48 — últimas 12 semanas",
        html_title: "Gas Storage — Lower 48 — últimas 12 semanas",
        file: "gas_12w.png",
        alt: "Gas 12w",
    },
    Chart {
        markdown_title: "Gas Storage — ano atual vs média 5 anos",
        html_title: "Gas Storage — ano atual vs média 5 anos",
        file: "gas_vs_5y.png",
        alt: "Gas vs 5y",
    },
    Chart {
        markdown_title: "Crude Seasonality — últimos 5 anos",
        html_title: "Crude Inventories — sazonalidade (últimos 5 anos)",
        file: "crude_seasonality_5y.png",
        alt: "Crude Seasonality 5y",
    },
];

const STYLE: &str = "<style>\
body{font-family:-apple-system,BlinkMacSystemFont,Segoe UI,Roboto,Helvetica,Arial,sans-serif;\
background:#0d1117;color:#e6edf3;margin:0;padding:0;}\
h1,h2,h3{color:#e6edf3;margin-bottom:0.4rem;}\
a{color:#58a6ff;}\
.container{max-width:1100px;margin:0 auto;padding:24px;}\
.card{background:#161b22;border-radius:12px;padding:16px 20px;margin-bottom:16px;\
box-shadow:0 0 0 1px #30363d;}\
.badge{display:inline-block;padding:2px 8px;border-radius:999px;font-size:11px;\
background:#238636;color:#fff;margin-left:6px;}\
table{width:100%;border-collapse:collapse;margin-top:8px;font-size:13px;}\
th,td{border-bottom:1px solid #30363d;padding:6px 4px;text-align:right;}\
th:first-child,td:first-child{text-align:left;}\
img{max-width:100%;border-radius:10px;border:1px solid #30363d;margin-top:4px;}\
code{font-family:Menlo,Consolas,monospace;font-size:12px;white-space:pre-wrap;}\
ul{margin-top:4px;margin-bottom:4px;padding-left:18px;}\
</style>";

fn petroleum_bullet(name: &str, stats: &SeriesStats) -> String {
    format!(
        "**{name}**: {} bbl  ({} bbl WoW, {})",
        barrels(stats.value),
        signed_thousands(stats.delta, 0),
        pct(stats.pct)
    )
}

/// Markdown dashboard around the weekly `summary` text
pub fn markdown_dashboard(snapshot: &WeeklySnapshot, summary: &str) -> String {
    let mut doc = DocumentBuilder::new().heading(1, "📊 Energy Weekly Dashboard");
    if let Some(date) = snapshot.reference_date() {
        doc = doc.line(format!("**Referência semanal:** {date}"));
    }

    doc = doc.rule().heading(2, "1. Visão rápida — Números principais").blank();
    if let Some(crude) = &snapshot.crude {
        doc = doc.bullet(petroleum_bullet(CRUDE, crude));
    }
    if let Some(products) = &snapshot.products {
        doc = doc.bullet(petroleum_bullet(PRODUCTS, products));
    }
    if let Some(gas) = &snapshot.gas {
        doc = doc.bullet(format!(
            "**{GAS}**: {} Bcf  ({} Bcf WoW, {})",
            bcf(gas.value),
            signed(gas.delta, 1),
            pct(gas.pct)
        ));
    }

    doc = doc
        .rule()
        .heading(2, "2. Leitura macro da semana")
        .blank()
        .code_block("text", summary)
        .rule()
        .heading(2, "3. Gráficos")
        .blank();

    for (i, chart) in CHARTS.iter().enumerate() {
        doc = doc
            .heading(3, format!("3.{} {}", i + 1, chart.markdown_title))
            .image(chart.alt, chart.file)
            .blank();
    }

    doc.line("---")
        .blank()
        .heading(2, "4. Notas técnicas")
        .blank()
        .bullet(SOURCE_NOTE)
        .bullet("Todos os valores são aproximados; podem existir revisões posteriores da EIA.")
        .bullet("Cálculos WoW e tendência são feitos automaticamente pelo pipeline Energy Reports.")
        .blank()
        .build()
}

/// One "Forecast & Alerts" list item
pub fn describe_alert(name: &str, stats: Option<&SeriesStats>, outlook: Option<&ChangeOutlook>) -> String {
    let Some(stats) = stats else {
        return format!("<li><b>{name}</b>: sem dados suficientes.</li>");
    };

    let mut text = format!(
        "<li><b>{name}</b>: Δ semanal {} ({}). ",
        signed_thousands(stats.delta, 0),
        pct(stats.pct)
    );

    if let Some(outlook) = outlook {
        text.push_str(&format!("z-score da variação semanal: {:+.2}. ", outlook.zscore));
        if outlook.is_outlier {
            text.push_str("<b>Movimento fora do padrão histórico (outlier estatístico).</b> ");
        }

        let forecast = outlook.forecast_4w;
        if forecast < 0.0 {
            text.push_str(&format!(
                "Tendência de curto prazo sugere queda agregada de {} unidades nas próximas 4 semanas.",
                thousands(forecast, 0)
            ));
        } else if forecast > 0.0 {
            text.push_str(&format!(
                "Tendência de curto prazo sugere alta agregada de {} unidades nas próximas 4 semanas.",
                thousands(forecast, 0)
            ));
        } else {
            text.push_str("Tendência de curto prazo praticamente neutra para as próximas 4 semanas.");
        }
    }

    text.push_str("</li>");
    text
}

fn table_row(name: &str, level: String, delta: String, pct_change: f64) -> String {
    format!(
        "<tr><td>{name}</td><td>{level}</td><td>{delta}</td><td>{}</td></tr>",
        pct(pct_change)
    )
}

/// Dark-theme HTML dashboard around the weekly `summary` text
pub fn html_dashboard(snapshot: &WeeklySnapshot, summary: &str) -> String {
    let mut doc = DocumentBuilder::new()
        .line("<!DOCTYPE html>")
        .line("<html lang='en'>")
        .line("<head>")
        .line("<meta charset='utf-8'/>")
        .line("<title>Energy Weekly Dashboard</title>")
        .line(STYLE)
        .line("</head>")
        .line("<body>")
        .line("<div class='container'>");

    // header
    doc = doc
        .line("<div class='card'>")
        .line("<h1>📊 Energy Weekly Dashboard<span class='badge'>Auto-generated</span></h1>");
    if let Some(date) = snapshot.reference_date() {
        doc = doc.line(format!("<p><b>Referência semanal:</b> {date}</p>"));
    }
    doc = doc
        .line(
            "<p>Resumo consolidado de estoques de petróleo (crude & products) e gas storage nos EUA, \
             com foco em variações semanais, tendência de curto prazo e contexto sazonal.</p>",
        )
        .line("</div>");

    // numbers
    doc = doc
        .line("<div class='card'>")
        .line("<h2>1. Visão rápida — números principais</h2>")
        .line("<table>")
        .line("<thead><tr><th>Série</th><th>Nível</th><th>Δ WoW</th><th>% WoW</th></tr></thead>")
        .line("<tbody>");
    if let Some(s) = &snapshot.crude {
        doc = doc.line(table_row(CRUDE, barrels(s.value), signed_thousands(s.delta, 0), s.pct));
    }
    if let Some(s) = &snapshot.products {
        doc = doc.line(table_row(PRODUCTS, barrels(s.value), signed_thousands(s.delta, 0), s.pct));
    }
    if let Some(s) = &snapshot.gas {
        doc = doc.line(table_row(GAS, bcf(s.value), signed(s.delta, 1), s.pct));
    }
    doc = doc.line("</tbody></table>").line("</div>");

    // summary, only angle brackets escaped
    doc = doc
        .line("<div class='card'>")
        .line("<h2>2. Leitura macro da semana</h2>")
        .line("<code>")
        .line(summary.replace('<', "&lt;").replace('>', "&gt;"))
        .line("</code>")
        .line("</div>");

    doc = doc
        .line("<div class='card'>")
        .line("<h2>3. Forecast & Alerts (ML light)</h2>")
        .line(
            "<p>Modelo simples baseado na distribuição histórica das variações semanais (z-score) \
             e regressão linear das últimas semanas para estimar a direção de curto prazo.</p>",
        )
        .line("<ul>")
        .line(describe_alert(CRUDE, snapshot.crude.as_ref(), snapshot.crude_outlook.as_ref()))
        .line(describe_alert(PRODUCTS, snapshot.products.as_ref(), snapshot.products_outlook.as_ref()))
        .line(describe_alert(GAS, snapshot.gas.as_ref(), snapshot.gas_outlook.as_ref()))
        .line("</ul>")
        .line("</div>");

    doc = doc.line("<div class='card'>").line("<h2>4. Gráficos</h2>");
    for (i, chart) in CHARTS.iter().enumerate() {
        doc = doc
            .line(format!("<h3>4.{} {}</h3>", i + 1, chart.html_title))
            .line(format!("<img src='{}' alt='{}'/>", chart.file, chart.alt));
    }
    doc = doc.line("</div>");

    doc.line("<div class='card'>")
        .line("<h3>5. Notas técnicas</h3>")
        .line("<ul>")
        .line(format!("<li>{SOURCE_NOTE}</li>"))
        .line("<li>Variações e tendências são calculadas automaticamente a partir das séries semanais.</li>")
        .line(
            "<li>Forecast & Alerts utiliza apenas métodos estatísticos simples; \
             não substitui modelos de previsão estruturais.</li>",
        )
        .line("</ul>")
        .line("</div>")
        .line("</div></body></html>")
        .build()
}

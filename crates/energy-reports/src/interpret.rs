//! Rule-based one-line readings of inventory moves

use crate::metrics::{SeriesStats, WindowChange};

/// Quick read of a week-over-week petroleum stock change (percent)
pub fn interpret_petroleum_quick(pct: f64) -> &'static str {
    if pct <= -1.0 {
        "Bullish — queda >1% WoW nos estoques"
    } else if pct >= 1.0 {
        "Bearish — aumento >1% WoW nos estoques"
    } else {
        "Estável — sem sinal claro"
    }
}

/// Quick read of gas storage, optionally against a historical average (Bcf)
pub fn interpret_gas_quick(storage: Option<f64>, delta: f64, hist_avg: Option<f64>) -> &'static str {
    let Some(storage) = storage else {
        return "Sem dados";
    };

    if hist_avg.is_some_and(|avg| storage < avg * 0.9) {
        "Risco de tightness — níveis abaixo da média histórica"
    } else if delta < -5.0 {
        "Atenção: saída semanal forte (-5 Bcf ou mais)"
    } else {
        "Normal"
    }
}

/// Weekly-summary read of a petroleum stock change (percent)
pub fn interpret_petroleum_weekly(pct: f64) -> &'static str {
    if pct <= -1.5 {
        "Bullish — forte queda semanal nos estoques"
    } else if pct <= -0.5 {
        "Levemente bullish — estoques recuando"
    } else if pct >= 1.5 {
        "Bearish — forte aumento semanal nos estoques"
    } else if pct >= 0.5 {
        "Levemente bearish — estoques subindo"
    } else {
        "Neutro — movimento semanal pequeno"
    }
}

/// Weekly-summary read of a gas storage change (Bcf)
pub fn interpret_gas_weekly(delta: f64) -> &'static str {
    if delta <= -50.0 {
        "Saída excepcional — risco de tightness elevado"
    } else if delta <= -10.0 {
        "Saída forte — suporte a preços de gás"
    } else if delta < 0.0 {
        "Saída moderada — ambiente ligeiramente bullish"
    } else if delta >= 50.0 {
        "Injeção excepcional — cenário de folga"
    } else if delta >= 10.0 {
        "Injeção forte — pressão de baixa no gás"
    } else {
        "Movimento moderado — sem grande desvio"
    }
}

const NEUTRAL_WEEK: &str = "Quadro semanal relativamente neutro, sem grandes desequilíbrios aparentes.";

/// One consolidated sentence about the week
pub fn macro_view(
    crude: Option<&SeriesStats>,
    products: Option<&SeriesStats>,
    gas: Option<&SeriesStats>,
    crude_4w: Option<&WindowChange>,
) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if let Some(crude) = crude {
        parts.push(if crude.pct <= -1.0 {
            "estoques de petróleo bruto em queda, sugerindo leve tightening na oferta"
        } else if crude.pct >= 1.0 {
            "estoques de petróleo bruto em alta, indicando algum alívio de oferta"
        } else {
            "estoques de petróleo bruto praticamente estáveis na semana"
        });
    }

    // products near zero add nothing
    if let Some(products) = products {
        if products.pct <= -0.5 {
            parts.push("estoques totais (crude + produtos) também recuando");
        } else if products.pct >= 0.5 {
            parts.push("estoques totais (crude + produtos) avançando");
        }
    }

    if let Some(gas) = gas {
        if gas.delta <= -10.0 {
            parts.push("no gás natural, a saída semanal do storage reforça um viés mais apertado");
        } else if gas.delta >= 10.0 {
            parts.push("no gás natural, a injeção de volumes aponta para ambiente mais folgado");
        }
    }

    if let Some(trend) = crude_4w {
        if trend.pct <= -3.0 {
            parts.push("na janela de 4 semanas, o crude segue em tendência de queda consistente");
        } else if trend.pct >= 3.0 {
            parts.push("na janela de 4 semanas, o crude mostra acúmulo relevante de estoques");
        }
    }

    if parts.is_empty() {
        return NEUTRAL_WEEK.to_string();
    }

    let joined = parts.join("; ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => NEUTRAL_WEEK.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stats(delta: f64, pct: f64) -> SeriesStats {
        SeriesStats {
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            value: Some(100.0),
            previous: None,
            delta,
            pct,
            label: String::new(),
            series_id: String::new(),
        }
    }

    #[test]
    fn test_petroleum_quick_bands() {
        assert_eq!(interpret_petroleum_quick(-1.0), "Bullish — queda >1% WoW nos estoques");
        assert_eq!(interpret_petroleum_quick(1.2), "Bearish — aumento >1% WoW nos estoques");
        assert_eq!(interpret_petroleum_quick(0.3), "Estável — sem sinal claro");
    }

    #[test]
    fn test_gas_quick() {
        assert_eq!(interpret_gas_quick(None, -50.0, None), "Sem dados");
        assert_eq!(
            interpret_gas_quick(Some(2500.0), 10.0, Some(3000.0)),
            "Risco de tightness — níveis abaixo da média histórica"
        );
        assert_eq!(
            interpret_gas_quick(Some(2950.0), -6.0, Some(3000.0)),
            "Atenção: saída semanal forte (-5 Bcf ou mais)"
        );
        assert_eq!(interpret_gas_quick(Some(2950.0), -5.0, None), "Normal");
    }

    #[test]
    fn test_weekly_bands() {
        assert_eq!(interpret_petroleum_weekly(-1.5), "Bullish — forte queda semanal nos estoques");
        assert_eq!(interpret_petroleum_weekly(-0.6), "Levemente bullish — estoques recuando");
        assert_eq!(interpret_petroleum_weekly(0.5), "Levemente bearish — estoques subindo");
        assert_eq!(interpret_petroleum_weekly(0.1), "Neutro — movimento semanal pequeno");

        assert_eq!(interpret_gas_weekly(-50.0), "Saída excepcional — risco de tightness elevado");
        assert_eq!(interpret_gas_weekly(-12.0), "Saída forte — suporte a preços de gás");
        assert_eq!(interpret_gas_weekly(-1.0), "Saída moderada — ambiente ligeiramente bullish");
        assert_eq!(interpret_gas_weekly(0.0), "Movimento moderado — sem grande desvio");
        assert_eq!(interpret_gas_weekly(10.0), "Injeção forte — pressão de baixa no gás");
        assert_eq!(interpret_gas_weekly(75.0), "Injeção excepcional — cenário de folga");
    }

    #[test]
    fn test_macro_view_joins_phrases() {
        let crude = stats(-5.0, -1.2);
        let products = stats(-3.0, -0.7);
        let gas = stats(-80.0, -2.5);
        let trend = WindowChange {
            base_date: NaiveDate::from_ymd_opt(2024, 12, 13).unwrap(),
            delta: -14.0,
            pct: -3.4,
        };

        let view = macro_view(Some(&crude), Some(&products), Some(&gas), Some(&trend));
        assert_eq!(
            view,
            "Estoques de petróleo bruto em queda, sugerindo leve tightening na oferta; \
             estoques totais (crude + produtos) também recuando; \
             no gás natural, a saída semanal do storage reforça um viés mais apertado; \
             na janela de 4 semanas, o crude segue em tendência de queda consistente."
        );
    }

    #[test]
    fn test_macro_view_neutral() {
        assert_eq!(macro_view(None, None, None, None), NEUTRAL_WEEK);

        let flat = stats(0.0, 0.1);
        assert_eq!(
            macro_view(None, Some(&flat), Some(&flat), None),
            NEUTRAL_WEEK
        );
        assert_eq!(
            macro_view(Some(&flat), None, None, None),
            "Estoques de petróleo bruto praticamente estáveis na semana."
        );
    }
}

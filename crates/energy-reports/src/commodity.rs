//! Commodity catalog
//!
//! Every daily job is parameterised by one [`CommodityProfile`]: where the
//! prices come from, how the report is titled, which prompt and topics the
//! narrative uses and which counter/sentinel keep it idempotent.

use crate::error::{ReportError, Result};
use crate::source::{SeriesRef, SourceChain};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commodities with a daily job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commodity {
    Oil,
    Gas,
    Coal,
    Uranium,
    JetFuel,
    Rbob,
    Ulsd,
    Lng,
}

/// FRED download behind the `fetch` job
#[derive(Debug, Clone, Copy)]
pub struct FetchSpec {
    pub series_id: &'static str,
    pub start_year: i32,
    pub env_override: Option<&'static str>,
    pub frequency: Option<&'static str>,
}

/// One priced leg of a daily report (oil has two)
#[derive(Debug, Clone, Copy)]
pub struct PriceLeg {
    /// Short name used in the oil context, e.g. `WTI`
    pub name: &'static str,
    /// Comma-separated `source:id` chain
    pub chain: &'static str,
}

/// Static description of a commodity's daily report
#[derive(Debug, Clone, Copy)]
pub struct CommodityProfile {
    pub slug: &'static str,
    /// Name inside the prompt, e.g. `Jet Fuel (Kerosene de Aviação)`
    pub report_name: &'static str,
    pub unit: &'static str,
    /// Lead of the first context line
    pub price_label: &'static str,
    pub legs: &'static [PriceLeg],
    pub daily_start_year: i32,
    pub daily_env_override: Option<&'static str>,
    pub fetch: FetchSpec,
    pub counter_key: &'static str,
    pub sentinel: &'static str,
    /// Title with `{date}` and `{n}` placeholders
    pub title: &'static str,
    pub system_prompt: &'static str,
    pub topics: &'static [&'static str],
    pub commentary: &'static [&'static str],
    pub temperature: f32,
    pub max_tokens: usize,
}

const EXECUTIVE: &str = "Interpretação Executiva (bullet points objetivos, até 5 linhas)";

static OIL: CommodityProfile = CommodityProfile {
    slug: "oil",
    report_name: "Petróleo (WTI + Brent)",
    unit: "USD/bbl",
    price_label: "Último preço spot",
    legs: &[
        PriceLeg { name: "WTI", chain: "alpha:WTI,fred:DCOILWTICO" },
        PriceLeg { name: "Brent", chain: "alpha:BRENT,fred:DCOILBRENTEU" },
    ],
    daily_start_year: 2020,
    daily_env_override: None,
    fetch: FetchSpec {
        series_id: "DCOILWTICO",
        start_year: 2000,
        env_override: Some("OIL_FRED_SERIES_ID"),
        frequency: Some("d"),
    },
    counter_key: "oil_daily",
    sentinel: "oil_daily",
    title: "🛢️ Petróleo — Relatório Diário (Brent & WTI) — {date} — Diário — Nº {n}",
    system_prompt: "Você é um analista sênior de energia. Responda em PT-BR, objetivo, direto e com análise macro.",
    topics: &[
        "Preços WTI e Brent",
        "Futuros, curva e spreads",
        "Estoques (EIA/API)",
        "Produção global (OPEC+, EUA, shale)",
        "Demanda global",
        "Geopolítica e riscos",
        "FX (DXY) e Treasuries",
        "Notas de pesquisa e instituições",
        "Interpretação executiva (bullet points)",
        "Conclusão (curto e médio prazo)",
    ],
    commentary: &[],
    temperature: 0.4,
    max_tokens: 1800,
};

static GAS: CommodityProfile = CommodityProfile {
    slug: "gas",
    report_name: "Natural Gas (Henry Hub)",
    unit: "USD/MMBtu",
    price_label: "Último preço spot Henry Hub",
    legs: &[PriceLeg {
        name: "Henry Hub",
        chain: "eia:NG.RNGWHHD.D,alpha:NATURAL_GAS,fred:DHHNGSP",
    }],
    daily_start_year: 2020,
    daily_env_override: Some("EIA_SERIES_ID"),
    fetch: FetchSpec {
        series_id: "DHHNGSP",
        start_year: 1997,
        env_override: Some("HENRY_HUB_FRED_SERIES_ID"),
        frequency: Some("d"),
    },
    counter_key: "diario_gas",
    sentinel: "gas_daily",
    title: "📊 Dados de Mercado — Natural Gas (Henry Hub) — {date} — Diário — Nº {n}",
    system_prompt: "Você é um analista sênior de energia (gás natural). Escreva em PT-BR, claro, objetivo, com interpretação executiva e dados resumidos.",
    topics: &[
        "Preço spot (Henry Hub)",
        "Front-month / curva de futuros",
        "Estoques (EIA)",
        "Produção (EUA / principais bacias)",
        "Demanda (Geração elétrica, residencial, industrial)",
        "Interligações / LNG exports (impacto em spreads)",
        "Clima / Sazonalidade (temperatura, grip)",
        "Notas de Research / institucionais",
        EXECUTIVE,
        "Conclusão (1 parágrafo: curto e médio prazo)",
    ],
    commentary: &[
        "- Estoques (EIA): ver weekly report (se EIA_API_KEY estiver disponível integrará automaticamente).",
        "- Produção (EUA/Marcellus/Powder River/Permian): tendência e rig counts (placeholder).",
        "- Demanda (geração elétrica, residen/al, industrial): sazonalidade importante (inverno/verão).",
        "- Geopolítica / climatologia (temperaturas, frio extremo, interrupções de fornecimento).",
        "- Curva de futuros: contango vs backwardation — risco de roll.",
    ],
    temperature: 0.35,
    max_tokens: 1600,
};

static COAL: CommodityProfile = CommodityProfile {
    slug: "coal",
    report_name: "Carvão (Austrália)",
    unit: "USD/t",
    price_label: "Último preço global de carvão (Austrália)",
    legs: &[PriceLeg { name: "Coal", chain: "fred:PCOALAUUSDM" }],
    daily_start_year: 1990,
    daily_env_override: Some("COAL_FRED_SERIES_ID"),
    fetch: FetchSpec {
        series_id: "PCOALAUUSDM",
        start_year: 1990,
        env_override: Some("COAL_FRED_SERIES_ID"),
        frequency: None,
    },
    counter_key: "diario_carvao",
    sentinel: "coal_daily",
    title: "🪨 Carvão — Relatório Diário — {date} — Nº {n}",
    system_prompt: "Você é um analista sênior de energia focado em carvão térmico. Escreva em PT-BR, claro, objetivo, com foco em preço, oferta, demanda asiática e riscos.",
    topics: &[
        "Preço global de carvão (Austrália / Newcastle)",
        "Spreads regionais (Newcastle, API2, Richards Bay)",
        "Oferta (Austrália, Indonésia, Rússia, África do Sul)",
        "Demanda (China, Índia, Japão, Coreia; geração térmica)",
        "Estoques em portos e usinas",
        "Fretes marítimos e logística (Capesize / Panamax)",
        "Política energética e transição (troca carvão/gás)",
        "Notas de Research / instituições",
        EXECUTIVE,
        "Conclusão (1 parágrafo: curto e médio prazo para carvão)",
    ],
    commentary: &[
        "- A série é mensal, refletindo o preço global de carvão australiano.",
        "- Fundamentos-chave: geração térmica na Ásia, produção dos grandes exportadores e custo de frete marítimo.",
        "- O preço do LNG influencia a troca gás/carvão na geração elétrica.",
    ],
    temperature: 0.35,
    max_tokens: 1600,
};

static URANIUM: CommodityProfile = CommodityProfile {
    slug: "uranium",
    report_name: "Uranium (U3O8)",
    unit: "USD/lb",
    price_label: "Último preço spot (U3O8)",
    legs: &[PriceLeg { name: "U3O8", chain: "fred:PURANUSDM" }],
    daily_start_year: 1990,
    daily_env_override: Some("URANIUM_FRED_SERIES_ID"),
    fetch: FetchSpec {
        series_id: "PURANUSDM",
        start_year: 1990,
        env_override: Some("URANIUM_FRED_SERIES_ID"),
        frequency: None,
    },
    counter_key: "diario_uranio",
    sentinel: "uranium_daily",
    title: "⚛️ Urânio U3O8 — Relatório Diário — {date} — Nº {n}",
    system_prompt: "Você é um analista sênior de energia focado em urânio e ciclo do combustível nuclear. Escreva em PT-BR, claro, objetivo, com interpretação executiva e foco em preço, oferta, demanda e riscos.",
    topics: &[
        "Preço spot de urânio (U3O8)",
        "Curva de preço / termos contratuais (spot vs longo prazo)",
        "Oferta (produção em mineradoras, capacidade de enriquecimento, estoques secundários)",
        "Demanda (usinas nucleares em operação, construção e planejadas)",
        "Estoques e contratos de utilities (segurança de suprimento, níveis de cobertura)",
        "Custos de produção e incentivo a novos projetos (CAPEX, OPEX, break-even)",
        "Geopolítica e riscos (sanções, restrições de exportação, instabilidade em países produtores)",
        "Transição energética e narrativa institucional (papel da energia nuclear na descarbonização)",
        EXECUTIVE,
        "Conclusão (1 parágrafo: curto e médio prazo para preço do U3O8)",
    ],
    commentary: &[
        "- A série é mensal, refletindo o preço global de urânio U3O8 (global spot).",
        "- Mercado de urânio é relativamente ilíquido, com contratos bilaterais, oferta concentrada e pouca transparência.",
        "- Fundamentos-chave: produção em mineradoras (Cazaquistão, Canadá, Austrália), capacidade de enriquecimento e demanda de usinas nucleares.",
    ],
    temperature: 0.35,
    max_tokens: 1600,
};

static JET_FUEL: CommodityProfile = CommodityProfile {
    slug: "jet-fuel",
    report_name: "Jet Fuel (Kerosene de Aviação)",
    unit: "USD/gal",
    price_label: "Último preço spot de Jet Fuel (proxy US Gulf)",
    legs: &[PriceLeg { name: "Jet Fuel", chain: "fred:DJFUELUSGULF" }],
    daily_start_year: 2003,
    daily_env_override: Some("JET_FUEL_FRED_SERIES_ID"),
    fetch: FetchSpec {
        series_id: "DJFUELUSGULF",
        start_year: 2003,
        env_override: Some("JET_FUEL_FRED_SERIES_ID"),
        frequency: None,
    },
    counter_key: "diario_jet_fuel",
    sentinel: "jet_fuel_daily",
    title: "✈️ Jet Fuel — Relatório Diário — {date} — Nº {n}",
    system_prompt: "Você é um analista sênior de energia focado em combustíveis de aviação (Jet Fuel). Escreva em PT-BR, claro, objetivo, com foco em preço, demanda de aviação, estoques, margens de refino e riscos.",
    topics: &[
        "Preço spot de Jet Fuel (região benchmark)",
        "Curva de futuros e spreads (Jet vs Brent/WTI, jet crack spread)",
        "Estoques de Jet Fuel e destilados médios (EIA / principais hubs)",
        "Demanda de aviação (voos domésticos, internacionais, carga aérea; tráfego RPK/ASK quando disponível)",
        "Capacidade e utilização de refinarias (foco em destilados médios e querosene de aviação)",
        "Fluxos internacionais e arbitragem (rotas EUA–Europa–Ásia, hubs logísticos)",
        "FX, custos de frete e tarifas aéreas (impactos em companhias aéreas e demanda)",
        "Notas de Research / instituições (bancos, IEA, OACI, companhias aéreas)",
        EXECUTIVE,
        "Conclusão (1 parágrafo: curto e médio prazo para Jet Fuel)",
    ],
    commentary: &[
        "- Jet Fuel (querosene de aviação) é um destilado médio, com demanda ligada a voos comerciais, carga aérea e tráfego doméstico/internacional.",
        "- Fundamentos-chave: capacidade de refino em destilados médios, utilização de refinarias, estoques de Jet nas principais regiões e fluxos internacionais.",
        "- Fatores de demanda: tráfego aéreo global (RPK, ASK), políticas de restrição de mobilidade, custos de passagens e fretes aéreos.",
        "- Spreads de Jet Fuel em relação a Brent/WTI (jet crack) são críticos para margens de companhias aéreas e refinarias.",
    ],
    temperature: 0.35,
    max_tokens: 1600,
};

static RBOB: CommodityProfile = CommodityProfile {
    slug: "rbob",
    report_name: "Gasolina RBOB",
    unit: "USD/gal",
    price_label: "Último preço spot de gasolina (proxy RBOB, Los Angeles)",
    legs: &[PriceLeg { name: "RBOB", chain: "fred:DRGASLA" }],
    daily_start_year: 2003,
    daily_env_override: Some("RBOB_FRED_SERIES_ID"),
    fetch: FetchSpec {
        series_id: "DRGASLA",
        start_year: 2003,
        env_override: Some("RBOB_FRED_SERIES_ID"),
        frequency: Some("d"),
    },
    counter_key: "diario_rbob",
    sentinel: "rbob_daily",
    title: "⛽ Gasolina RBOB — Relatório Diário — {date} — Nº {n}",
    system_prompt: "Você é um analista sênior de produtos refinados focado em gasolina (RBOB). Escreva em PT-BR, claro, objetivo, com foco em preço, crack spreads, estoques, demanda e riscos.",
    topics: &[
        "Preço spot de gasolina (RBOB / proxy regional)",
        "Curva de futuros e crack spread (RBOB vs WTI/Brent)",
        "Estoques de gasolina (EIA) e utilização de refinarias",
        "Demanda (driving season, consumo implícito, mobilidade)",
        "Produção/refino (paradas, manutenção, especificação verão/inverno)",
        "Fluxos regionais e comércio exterior (Costa Leste, Golfo, Costa Oeste)",
        "Política de combustíveis e mandatos de etanol (RINs)",
        "Notas de Research / instituições",
        EXECUTIVE,
        "Conclusão (1 parágrafo: curto e médio prazo para gasolina)",
    ],
    commentary: &[
        "- RBOB é a gasolina de referência nos futuros da NYMEX; a série spot de Los Angeles serve de proxy diário.",
        "- Fundamentos-chave: sazonalidade de consumo (driving season), estoques da EIA e utilização de refinarias.",
        "- O crack spread da gasolina em relação ao WTI/Brent sinaliza margens de refino.",
    ],
    temperature: 0.35,
    max_tokens: 1600,
};

static ULSD: CommodityProfile = CommodityProfile {
    slug: "ulsd",
    report_name: "ULSD / Heating Oil",
    unit: "USD/gal",
    price_label: "Último preço spot ULSD (proxy Heating Oil)",
    legs: &[PriceLeg { name: "ULSD", chain: "fred:DHOILUSGULF" }],
    daily_start_year: 2003,
    daily_env_override: Some("ULSD_FRED_SERIES_ID"),
    fetch: FetchSpec {
        series_id: "DDFUELUSGASDOWN",
        start_year: 2003,
        env_override: Some("ULSD_FRED_SERIES_ID"),
        frequency: Some("d"),
    },
    counter_key: "diario_ulsd",
    sentinel: "ulsd_daily",
    title: "📊 Dados de Mercado — ULSD / Heating Oil — {date} — Diário — Nº {n}",
    system_prompt: "Você é um analista sênior de produtos refinados (ULSD / Heating Oil). Escreva em PT-BR, claro, objetivo, com foco em preço, margens de refino, estoques, demanda e riscos. Respeite a estrutura pedida.",
    topics: &[
        "Preço spot ULSD / Heating Oil",
        "Curva de futuros e spreads (HO vs WTI/Brent, crack spreads)",
        "Estoques de destilados médios (EIA) e utilização de refinarias",
        "Demanda (transporte, aquecimento, uso industrial e marítimo)",
        "Produção/refino (paradas, gargalos regionais, manutenção)",
        "Fluxos internacionais e arbitragem (Europa, EUA, América Latina)",
        "FX, fretes e custos logísticos (impacto em spreads regionais)",
        "Notas de Research / instituições (visão de bancos, agências, casas de análise)",
        EXECUTIVE,
        "Conclusão (1 parágrafo: curto e médio prazo para ULSD / destilados)",
    ],
    commentary: &[
        "- ULSD/Heating Oil é um destilado médio, próximo de diesel, usado como proxy para margens de refino em transporte rodoviário e aquecimento.",
        "- Fundamentos-chave: capacidade de refino em destilados médios, demanda sazonal (aquecimento no inverno, transporte), estoques da EIA e spreads em relação ao WTI/Brent.",
        "- Curva de futuros de HO/ULSD e crack spreads influenciam decisões de hedge de refinarias e distribuidores.",
    ],
    temperature: 0.35,
    max_tokens: 1600,
};

static LNG: CommodityProfile = CommodityProfile {
    slug: "lng",
    report_name: "LNG Ásia (proxy JKM)",
    unit: "USD/MMBtu",
    price_label: "Último preço de LNG Ásia (proxy JKM)",
    legs: &[PriceLeg { name: "JKM", chain: "fred:PNGASJPUSDM" }],
    daily_start_year: 2000,
    daily_env_override: Some("JKM_FRED_SERIES_ID"),
    fetch: FetchSpec {
        series_id: "PNGASJPUSDM",
        start_year: 2000,
        env_override: Some("JKM_FRED_SERIES_ID"),
        frequency: None,
    },
    counter_key: "diario_lng",
    sentinel: "lng_daily",
    title: "🚢 LNG Ásia (JKM) — Relatório Diário — {date} — Nº {n}",
    system_prompt: "Você é um analista sênior de energia focado em gás natural liquefeito (LNG). Escreva em PT-BR, claro, objetivo, com foco em preço, fluxos globais, oferta, demanda e riscos.",
    topics: &[
        "Preço de LNG Ásia (proxy JKM)",
        "Spreads inter-regionais (JKM vs TTF vs Henry Hub)",
        "Estoques de gás na Ásia e na Europa",
        "Demanda (Japão, Coreia, China; geração elétrica e indústria)",
        "Oferta de LNG (EUA, Catar, Austrália; novos trens de liquefação)",
        "Fretes de navios metaneiros e rotas (Canal do Panamá, Suez)",
        "Clima e sazonalidade (inverno no hemisfério norte)",
        "Notas de Research / instituições",
        EXECUTIVE,
        "Conclusão (1 parágrafo: curto e médio prazo para LNG)",
    ],
    commentary: &[
        "- A série é mensal, refletindo o preço global de LNG na Ásia (proxy do JKM).",
        "- Fundamentos-chave: demanda asiática, competição com a Europa por cargas spot e capacidade de liquefação.",
        "- A arbitragem entre Henry Hub, TTF e JKM orienta o destino das cargas americanas.",
    ],
    temperature: 0.35,
    max_tokens: 1600,
};

impl Commodity {
    pub const ALL: [Commodity; 8] = [
        Commodity::Oil,
        Commodity::Gas,
        Commodity::Coal,
        Commodity::Uranium,
        Commodity::JetFuel,
        Commodity::Rbob,
        Commodity::Ulsd,
        Commodity::Lng,
    ];

    pub fn profile(self) -> &'static CommodityProfile {
        match self {
            Commodity::Oil => &OIL,
            Commodity::Gas => &GAS,
            Commodity::Coal => &COAL,
            Commodity::Uranium => &URANIUM,
            Commodity::JetFuel => &JET_FUEL,
            Commodity::Rbob => &RBOB,
            Commodity::Ulsd => &ULSD,
            Commodity::Lng => &LNG,
        }
    }

    pub fn slug(self) -> &'static str {
        self.profile().slug
    }

    /// Title for report number `n` dated `date` (already formatted)
    pub fn title(self, date: &str, n: u64) -> String {
        self.profile()
            .title
            .replace("{date}", date)
            .replace("{n}", &n.to_string())
    }

    /// Counter key for this commodity's reports
    pub fn counter_key(self) -> &'static str {
        self.profile().counter_key
    }

    /// Sentinel file name, e.g. `jet_fuel_daily.sent`
    pub fn sentinel_file(self) -> String {
        format!("{}.sent", self.profile().sentinel)
    }

    /// First day of the daily report's price history
    pub fn daily_start(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.profile().daily_start_year, 1, 1)
    }

    /// Price chains of the daily report
    ///
    /// `series_override` (CLI flag or the profile's environment variable) is
    /// either a full chain (`"fred:X,eia:Y"`) or a bare id replacing the id of
    /// the first source of the first leg.
    pub fn price_chains(self, series_override: Option<&str>) -> Result<Vec<(&'static str, SourceChain)>> {
        let profile = self.profile();
        let mut chains = profile
            .legs
            .iter()
            .map(|leg| SourceChain::parse(format!("{} {}", profile.slug, leg.name), leg.chain).map(|c| (leg.name, c)))
            .collect::<Result<Vec<_>>>()?;

        let Some(raw) = series_override.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(chains);
        };

        if let Some((_, first)) = chains.first_mut() {
            *first = if raw.contains(':') {
                SourceChain::parse(first.name().to_string(), raw)?
            } else {
                let mut refs = first.refs().to_vec();
                match refs.first_mut() {
                    Some(head) => head.id = raw.to_string(),
                    None => refs.push(SeriesRef::fred(raw)),
                }
                SourceChain::new(first.name().to_string(), refs)
            };
        }
        Ok(chains)
    }

    /// Series id for the FRED fetch job after the environment override
    pub fn fetch_series_id<F>(self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = self.profile().fetch;
        fetch
            .env_override
            .and_then(lookup)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| fetch.series_id.to_string())
    }

    pub fn fetch_start(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.profile().fetch.start_year, 1, 1)
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Commodity {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "oil" | "petroleo" | "wti" | "brent" => Ok(Commodity::Oil),
            "gas" | "natural-gas" | "henry-hub" => Ok(Commodity::Gas),
            "coal" | "carvao" => Ok(Commodity::Coal),
            "uranium" | "uranio" | "u3o8" => Ok(Commodity::Uranium),
            "jet-fuel" | "jet" | "jetfuel" => Ok(Commodity::JetFuel),
            "rbob" | "gasoline" => Ok(Commodity::Rbob),
            "ulsd" | "heating-oil" | "diesel" => Ok(Commodity::Ulsd),
            "lng" | "jkm" => Ok(Commodity::Lng),
            other => Err(ReportError::InvalidSeries(format!("unknown commodity '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SeriesSource;

    #[test]
    fn test_every_profile_has_ten_topics() {
        for commodity in Commodity::ALL {
            let profile = commodity.profile();
            assert_eq!(profile.topics.len(), 10, "{commodity}");
            assert!(!profile.legs.is_empty(), "{commodity}");
            assert!(commodity.price_chains(None).is_ok(), "{commodity}");
            assert_eq!(commodity.slug().parse::<Commodity>().unwrap(), commodity);
        }
    }

    #[test]
    fn test_titles() {
        assert_eq!(
            Commodity::JetFuel.title("14 de novembro de 2025", 42),
            "✈️ Jet Fuel — Relatório Diário — 14 de novembro de 2025 — Nº 42"
        );
        assert_eq!(
            Commodity::Gas.title("1 de março de 2025", 7),
            "📊 Dados de Mercado — Natural Gas (Henry Hub) — 1 de março de 2025 — Diário — Nº 7"
        );
    }

    #[test]
    fn test_keys_and_sentinels() {
        assert_eq!(Commodity::Uranium.counter_key(), "diario_uranio");
        assert_eq!(Commodity::Oil.counter_key(), "oil_daily");
        assert_eq!(Commodity::JetFuel.sentinel_file(), "jet_fuel_daily.sent");
        assert_eq!(Commodity::Ulsd.sentinel_file(), "ulsd_daily.sent");
    }

    #[test]
    fn test_oil_has_two_legs() {
        let chains = Commodity::Oil.price_chains(None).unwrap();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].0, "WTI");
        assert_eq!(chains[1].1.refs()[1], SeriesRef::fred("DCOILBRENTEU"));
    }

    #[test]
    fn test_series_override() {
        let chains = Commodity::Gas.price_chains(Some("NG.RNGC1.D")).unwrap();
        let refs = chains[0].1.refs();
        assert_eq!(refs[0], SeriesRef::eia("NG.RNGC1.D"));
        assert_eq!(refs.len(), 3);

        let chains = Commodity::JetFuel.price_chains(Some("alpha:JETS,fred:DJFUELUSGULF")).unwrap();
        assert_eq!(chains[0].1.refs()[0].source, SeriesSource::AlphaVantage);
    }

    #[test]
    fn test_fetch_series_override() {
        let lookup = |var: &str| (var == "COAL_FRED_SERIES_ID").then(|| "PCOALSAUSDM".to_string());
        assert_eq!(Commodity::Coal.fetch_series_id(lookup), "PCOALSAUSDM");
        assert_eq!(Commodity::Rbob.fetch_series_id(|_| None), "DRGASLA");
        assert_eq!(Commodity::Ulsd.fetch_series_id(|_| None), "DDFUELUSGASDOWN");
        assert_eq!(Commodity::Rbob.profile().fetch.frequency, Some("d"));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("jet_fuel".parse::<Commodity>().unwrap(), Commodity::JetFuel);
        assert_eq!("JKM".parse::<Commodity>().unwrap(), Commodity::Lng);
        assert!("cocoa".parse::<Commodity>().is_err());
    }
}

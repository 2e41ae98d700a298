use serde::{Deserialize, Serialize};

use super::super::domain::Level;
use super::PillarResult;

/// Tenure below which trajectory cannot be judged.
pub const MINIMUM_EVALUABLE_TENURE_YEARS: f64 = 0.5;

/// Share of pillars at Advanced or above that still qualifies as a lateral move.
const LATERAL_FRACTION: f64 = 0.6;

/// Global potential classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Potential {
    #[serde(rename = "High Potential")]
    HighPotential,
    #[serde(rename = "Promotable")]
    Promotable,
    #[serde(rename = "Lateral")]
    Lateral,
    #[serde(rename = "Static")]
    Static,
    #[serde(rename = "Not evaluable")]
    NotEvaluable,
}

impl Potential {
    pub const ALL: [Potential; 5] = [
        Potential::HighPotential,
        Potential::Promotable,
        Potential::Lateral,
        Potential::Static,
        Potential::NotEvaluable,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Potential::HighPotential => "High Potential",
            Potential::Promotable => "Promotable",
            Potential::Lateral => "Lateral",
            Potential::Static => "Static",
            Potential::NotEvaluable => "Not evaluable",
        }
    }

    /// 9-box potential axis.
    pub const fn band(self) -> Band {
        match self {
            Potential::Promotable | Potential::HighPotential => Band::High,
            Potential::Lateral => Band::Medium,
            Potential::Static | Potential::NotEvaluable => Band::Low,
        }
    }
}

/// One axis position on the 9-box grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Low, Band::Medium, Band::High];

    /// 9-box performance axis: `< 40` low, `40..=70` medium, `> 70` high.
    pub fn from_status_pct(status_pct: f64) -> Self {
        if status_pct < 40.0 {
            Band::Low
        } else if status_pct <= 70.0 {
            Band::Medium
        } else {
            Band::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Medium => "medium",
            Band::High => "high",
        }
    }
}

/// Cell coordinates on the talent grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NineBoxPlacement {
    pub performance: Band,
    pub potential: Band,
}

pub fn nine_box(status_pct: f64, potential: Potential) -> NineBoxPlacement {
    NineBoxPlacement {
        performance: Band::from_status_pct(status_pct),
        potential: potential.band(),
    }
}

pub(crate) fn classify_potential(
    pillar_results: &[PillarResult],
    sorted_levels: &[&Level],
    all_levels: &[Level],
    tenure_years: f64,
) -> Potential {
    if tenure_years < MINIMUM_EVALUABLE_TENURE_YEARS {
        return Potential::NotEvaluable;
    }

    let total_pillars = pillar_results.len();
    if total_pillars == 0 {
        return Potential::NotEvaluable;
    }

    // Templates are expected to define exactly four levels.
    let advanced_order = sorted_levels.get(2).map_or(3, |level| level.order);
    let expert_order = sorted_levels.get(3).map_or(4, |level| level.order);

    let mut advanced_or_above = 0usize;
    let mut expert_or_above = 0usize;
    for result in pillar_results {
        let Some(real_level_id) = result.real_level_id else {
            continue;
        };
        let Some(real_level) = all_levels.iter().find(|level| level.id == real_level_id) else {
            continue;
        };

        if real_level.order >= advanced_order {
            advanced_or_above += 1;
        }
        if real_level.order >= expert_order {
            expert_or_above += 1;
        }
    }

    let fraction_advanced = advanced_or_above as f64 / total_pillars as f64;
    let fraction_expert = expert_or_above as f64 / total_pillars as f64;

    if fraction_expert == 1.0 {
        Potential::HighPotential
    } else if fraction_advanced == 1.0 {
        Potential::Promotable
    } else if fraction_advanced >= LATERAL_FRACTION {
        Potential::Lateral
    } else {
        Potential::Static
    }
}

/// Mean of per-pillar means over every visited level, rounded to two decimals.
pub(crate) fn global_status_pct(pillar_results: &[PillarResult]) -> f64 {
    if pillar_results.is_empty() {
        return 0.0;
    }

    let total: f64 = pillar_results.iter().map(PillarResult::score).sum();
    round_to_hundredths(total / pillar_results.len() as f64)
}

/// Half-away-from-zero rounding at two decimals; inputs are never negative.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

use serde::{Deserialize, Serialize};

use super::scoring::{Band, NineBoxPlacement};

/// Admin-editable presentation of one talent-grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NineBoxCell {
    pub potential: Band,
    pub performance: Band,
    pub label: String,
    pub recommendation: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl NineBoxCell {
    pub fn placement(&self) -> NineBoxPlacement {
        NineBoxPlacement {
            performance: self.performance,
            potential: self.potential,
        }
    }
}

/// Labels, recommendations and colors for every (potential, performance) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NineBoxGrid {
    cells: Vec<NineBoxCell>,
}

impl NineBoxGrid {
    pub fn cells(&self) -> &[NineBoxCell] {
        &self.cells
    }

    pub fn cell(&self, placement: NineBoxPlacement) -> Option<&NineBoxCell> {
        self.cells
            .iter()
            .find(|cell| cell.placement() == placement)
    }

    /// Replaces the cell at the same coordinates, keeping exactly one cell per pair.
    pub fn upsert(&mut self, cell: NineBoxCell) {
        match self
            .cells
            .iter_mut()
            .find(|existing| existing.placement() == cell.placement())
        {
            Some(existing) => *existing = cell,
            None => self.cells.push(cell),
        }
    }
}

impl Default for NineBoxGrid {
    fn default() -> Self {
        let seed: [(Band, Band, &str, &str, &str); 9] = [
            (
                Band::High,
                Band::High,
                "Future leader",
                "Ready for promotion. Assign strategic projects.",
                "#22c55e",
            ),
            (
                Band::High,
                Band::Medium,
                "High potential",
                "Needs development. Mentoring plan with senior management.",
                "#86efac",
            ),
            (
                Band::High,
                Band::Low,
                "Enigma",
                "Investigate blockers. Possible mismatch between role and capability.",
                "#fbbf24",
            ),
            (
                Band::Medium,
                Band::High,
                "Key professional",
                "Retain and recognize. Enriching lateral move.",
                "#60a5fa",
            ),
            (
                Band::Medium,
                Band::Medium,
                "Solid contributor",
                "Targeted technical training. Set clear objectives.",
                "#93c5fd",
            ),
            (
                Band::Medium,
                Band::Low,
                "Inconsistent",
                "Close supervision. Improvement plan with measurable milestones.",
                "#fca5a5",
            ),
            (
                Band::Low,
                Band::High,
                "Technical expert",
                "Value as technical reference. Avoid management overload.",
                "#fbbf24",
            ),
            (
                Band::Low,
                Band::Medium,
                "Developing",
                "Training and follow-up. Review progress in 6 months.",
                "#f87171",
            ),
            (
                Band::Low,
                Band::Low,
                "Urgent action",
                "Immediate action plan. Consider relocation if no improvement.",
                "#ef4444",
            ),
        ];

        let cells = seed
            .into_iter()
            .map(
                |(potential, performance, label, recommendation, color)| NineBoxCell {
                    potential,
                    performance,
                    label: label.to_string(),
                    recommendation: recommendation.to_string(),
                    color: Some(color.to_string()),
                },
            )
            .collect();

        Self { cells }
    }
}

use super::super::domain::{AnswerValue, Level, Pillar};
use super::config::TemplateConfig;
use super::{AnswerInput, LevelScore, PillarResult};

/// Points awarded per answer; the bucket maximum is `count * MAX_ITEM_SCORE`.
pub const MAX_ITEM_SCORE: u32 = 5;

/// Numeric score of an answer. Unanswered items score like `NotMet`.
pub const fn answer_score(value: Option<AnswerValue>) -> u32 {
    match value {
        Some(AnswerValue::FullyMet) => MAX_ITEM_SCORE,
        Some(AnswerValue::PartiallyMet) => 2,
        Some(AnswerValue::NotMet) | None => 0,
    }
}

pub(crate) fn sorted_levels(levels: &[Level]) -> Vec<&Level> {
    let mut ordered: Vec<&Level> = levels.iter().collect();
    ordered.sort_by_key(|level| level.order);
    ordered
}

/// Walks levels bottom-up and stops at the first level that is empty or below threshold.
pub(crate) fn real_level_for_pillar(
    pillar: &Pillar,
    levels: &[&Level],
    answers: &[AnswerInput],
    tenure_years: f64,
    config: &TemplateConfig,
) -> PillarResult {
    let threshold = config.threshold_for(tenure_years);
    let mut real_level: Option<&Level> = None;
    let mut level_scores = Vec::new();

    for level in levels {
        let (count, sum) = answers
            .iter()
            .filter(|answer| answer.pillar_id == pillar.id && answer.level_id == level.id)
            .fold((0u32, 0u32), |(count, sum), answer| {
                (count + 1, sum + answer_score(answer.value))
            });

        if count == 0 {
            level_scores.push(LevelScore {
                level_id: level.id,
                level_order: level.order,
                percentage: 0.0,
            });
            break;
        }

        let max_possible = f64::from(count * MAX_ITEM_SCORE);
        let percentage = f64::from(sum) / max_possible * 100.0;
        level_scores.push(LevelScore {
            level_id: level.id,
            level_order: level.order,
            percentage,
        });

        if percentage >= threshold {
            real_level = Some(level);
        } else {
            break;
        }
    }

    PillarResult {
        pillar_id: pillar.id,
        pillar_name: pillar.name.clone(),
        real_level_id: real_level.map(|level| level.id),
        real_level_name: real_level.map(|level| level.name.clone()),
        expected_level: config.default_expected_level.clone(),
        level_scores,
    }
}

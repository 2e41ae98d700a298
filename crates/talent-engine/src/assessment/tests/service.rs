use super::common::*;
use crate::assessment::domain::{
    ActionPlanId, ActionPlanStatus, AnswerValue, AssessmentStatus, ItemId, LevelId,
    NewActionPlan, TemplateId,
};
use crate::assessment::ninebox::NineBoxCell;
use crate::assessment::repository::{AssessmentRepository, RepositoryError};
use crate::assessment::scoring::{Band, InputViolation, NineBoxPlacement, Potential};
use crate::assessment::AssessmentServiceError;

#[test]
fn create_opens_draft_with_unanswered_active_items() {
    let (service, repository) = build_service();

    let record = service
        .create(new_assessment("worker-1", 4.0))
        .expect("assessment created");

    assert_eq!(record.status, AssessmentStatus::Draft);
    assert!(record.id.0.starts_with("asm-"));
    assert_eq!(record.answers.len(), 16);
    assert!(!record.answers.contains_key(&INACTIVE_ITEM));
    assert!(record.answers.values().all(|answer| answer.value.is_none()));
    assert_eq!(record.answered_count(), 0);

    let stored = repository
        .fetch(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, record);
}

#[test]
fn create_rejects_unknown_template() {
    let (service, _) = build_service();
    let mut request = new_assessment("worker-1", 4.0);
    request.template_id = TemplateId(42);

    match service.create(request) {
        Err(AssessmentServiceError::TemplateNotFound(TemplateId(42))) => {}
        other => panic!("expected missing template, got {other:?}"),
    }
}

#[test]
fn create_rejects_negative_tenure() {
    let (service, repository) = build_service();

    match service.create(new_assessment("worker-1", -2.0)) {
        Err(AssessmentServiceError::Input(violations)) => {
            assert_eq!(violations.0, vec![InputViolation::InvalidTenure(-2.0)]);
        }
        other => panic!("expected input violation, got {other:?}"),
    }
    assert!(repository.list().expect("list succeeds").is_empty());
}

#[test]
fn first_answer_moves_draft_to_in_progress() {
    let (service, _) = build_service();
    let record = service
        .create(new_assessment("worker-1", 4.0))
        .expect("assessment created");
    let item = bucket_items(CONTRACTORS, 1)[0];

    let updated = service
        .record_answer(&record.id, item, AnswerValue::PartiallyMet)
        .expect("answer recorded");

    assert_eq!(updated.status, AssessmentStatus::InProgress);
    assert_eq!(
        updated.answers.get(&item).and_then(|answer| answer.value),
        Some(AnswerValue::PartiallyMet)
    );

    let updated = service
        .record_answer(&record.id, item, AnswerValue::FullyMet)
        .expect("answer replaced");
    assert_eq!(updated.answered_count(), 1);
    assert_eq!(
        updated.answers.get(&item).and_then(|answer| answer.value),
        Some(AnswerValue::FullyMet)
    );
}

#[test]
fn answers_must_belong_to_the_template() {
    let (service, _) = build_service();
    let record = service
        .create(new_assessment("worker-1", 4.0))
        .expect("assessment created");

    match service.record_answer(&record.id, ItemId(31337), AnswerValue::FullyMet) {
        Err(AssessmentServiceError::UnknownItem(ItemId(31337))) => {}
        other => panic!("expected unknown item, got {other:?}"),
    }
    let stored = service.get(&record.id).expect("record present");
    assert_eq!(stored.status, AssessmentStatus::Draft);
}

#[test]
fn partial_results_are_persisted_without_closing() {
    let (service, repository) = build_service();
    let record = service
        .create(new_assessment("worker-1", 5.0))
        .expect("assessment created");
    for level_order in 1..=2 {
        for item in bucket_items(CONTRACTORS, level_order) {
            service
                .record_answer(&record.id, item, AnswerValue::FullyMet)
                .expect("answer recorded");
        }
    }

    let result = service
        .compute_partial_results(&record.id)
        .expect("results computed");

    assert_eq!(result.pillar_results[0].pillar_id, CONTRACTORS);
    assert_eq!(result.pillar_results[0].real_level_id, Some(LevelId(20)));
    assert_eq!(result.pillar_results[1].real_level_id, None);

    let stored = repository
        .fetch(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, AssessmentStatus::InProgress);
    assert_eq!(stored.pillar_results.len(), 2);
    assert_eq!(
        stored.pillar_results[&CONTRACTORS].real_level_id,
        Some(LevelId(20))
    );
    assert_eq!(stored.global_potential, Some(result.global_potential));
    assert_eq!(stored.global_status_pct, Some(result.global_status_pct));
}

#[test]
fn recomputing_replaces_pillar_rows() {
    let (service, _) = build_service();
    let record = service
        .create(new_assessment("worker-1", 5.0))
        .expect("assessment created");

    service
        .compute_partial_results(&record.id)
        .expect("first computation");
    answer_all(&service, &record.id, AnswerValue::FullyMet);
    service
        .compute_partial_results(&record.id)
        .expect("second computation");

    let stored = service.get(&record.id).expect("record present");
    assert_eq!(stored.pillar_results.len(), 2);
    assert!(stored
        .pillar_results
        .values()
        .all(|row| row.real_level_id == Some(LevelId(40))));
    assert_eq!(stored.global_potential, Some(Potential::HighPotential));
}

#[test]
fn finalize_completes_assessment() {
    let (service, _) = build_service();
    let record = service
        .create(new_assessment("worker-1", 5.0))
        .expect("assessment created");
    answer_all(&service, &record.id, AnswerValue::FullyMet);

    let result = service.finalize(&record.id).expect("finalized");

    assert_eq!(result.global_potential, Potential::HighPotential);
    assert_eq!(result.global_status_pct, 100.0);
    assert_eq!(
        result.nine_box,
        NineBoxPlacement {
            performance: Band::High,
            potential: Band::High,
        }
    );
    let stored = service.get(&record.id).expect("record present");
    assert_eq!(stored.status, AssessmentStatus::Completed);
    assert_eq!(stored.summary_view().global_potential, Some("High Potential"));
}

#[test]
fn finalize_without_answers_is_static_with_zero_status() {
    let (service, _) = build_service();
    let record = service
        .create(new_assessment("worker-1", 2.0))
        .expect("assessment created");

    let result = service.finalize(&record.id).expect("finalized");

    assert_eq!(result.global_potential, Potential::Static);
    assert_eq!(result.global_status_pct, 0.0);
    assert!(result
        .pillar_results
        .iter()
        .all(|pillar| pillar.real_level_id.is_none()));
}

#[test]
fn delete_only_removes_open_assessments() {
    let (service, _) = build_service();
    let draft = service
        .create(new_assessment("worker-1", 5.0))
        .expect("assessment created");
    service.delete(&draft.id).expect("draft deleted");
    match service.get(&draft.id) {
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }

    let completed = completed_assessment(
        &service,
        "worker-2",
        date(2025, 4, 1),
        AnswerValue::FullyMet,
    );
    match service.delete(&completed.id) {
        Err(AssessmentServiceError::NotDeletable(AssessmentStatus::Completed)) => {}
        other => panic!("expected not deletable, got {other:?}"),
    }
    assert!(service.get(&completed.id).is_ok());
}

#[test]
fn observations_are_stored() {
    let (service, _) = build_service();
    let record = service
        .create(new_assessment("worker-1", 5.0))
        .expect("assessment created");

    service
        .save_observations(&record.id, "Strong field presence".to_string())
        .expect("observations saved");

    let stored = service.get(&record.id).expect("record present");
    assert_eq!(stored.observations.as_deref(), Some("Strong field presence"));
}

#[test]
fn action_plans_can_be_added_and_removed() {
    let (service, _) = build_service();
    let record = service
        .create(new_assessment("worker-1", 5.0))
        .expect("assessment created");

    let plan = service
        .add_action_plan(
            &record.id,
            NewActionPlan {
                pillar_id: Some(STRATEGY),
                action_kind: Some("Mentoring".to_string()),
                action: "Pair with plant manager for quarterly planning".to_string(),
                start_date: Some(date(2025, 4, 1)),
                follow_up_date: Some(date(2025, 7, 1)),
                notes: None,
            },
        )
        .expect("plan added");

    assert!(plan.id.0.starts_with("plan-"));
    assert_eq!(plan.status, ActionPlanStatus::Pending);
    assert_eq!(
        service
            .get(&record.id)
            .expect("record present")
            .action_plans
            .len(),
        1
    );

    match service.remove_action_plan(&record.id, &ActionPlanId("plan-missing".to_string())) {
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }

    service
        .remove_action_plan(&record.id, &plan.id)
        .expect("plan removed");
    assert!(service
        .get(&record.id)
        .expect("record present")
        .action_plans
        .is_empty());
}

#[test]
fn nine_box_cells_can_be_relabelled() {
    let (service, _) = build_service();
    let placement = NineBoxPlacement {
        performance: Band::Medium,
        potential: Band::High,
    };

    service
        .update_nine_box_cell(NineBoxCell {
            potential: Band::High,
            performance: Band::Medium,
            label: "Rising star".to_string(),
            recommendation: "Stretch assignment".to_string(),
            color: Some("#0ea5e9".to_string()),
        })
        .expect("cell updated");

    let grid = service.nine_box_grid().expect("grid available");
    assert_eq!(grid.cells().len(), 9);
    assert_eq!(
        grid.cell(placement).map(|cell| cell.label.as_str()),
        Some("Rising star")
    );
}

#[test]
fn get_propagates_not_found() {
    let (service, _) = build_service();

    match service.get(&crate::assessment::AssessmentId("asm-missing".to_string())) {
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn concurrent_answers_to_different_items_are_all_kept() {
    let (service, _) = build_service();
    let items: Vec<ItemId> = template().active_items().map(|item| item.id).collect();

    for _ in 0..50 {
        let record = service
            .create(new_assessment("worker-1", 5.0))
            .expect("assessment created");
        std::thread::scope(|scope| {
            for &item in &items {
                let service = &service;
                let id = &record.id;
                scope.spawn(move || {
                    service
                        .record_answer(id, item, AnswerValue::FullyMet)
                        .expect("answer recorded");
                });
            }
        });

        let stored = service.get(&record.id).expect("record present");
        assert_eq!(stored.answered_count(), items.len());
    }
}

#[test]
fn finalize_alongside_answers_keeps_every_answer() {
    let (service, _) = build_service();
    let items: Vec<ItemId> = template().active_items().map(|item| item.id).collect();
    let record = service
        .create(new_assessment("worker-1", 5.0))
        .expect("assessment created");

    std::thread::scope(|scope| {
        for &item in &items {
            let service = &service;
            let id = &record.id;
            scope.spawn(move || {
                service
                    .record_answer(id, item, AnswerValue::FullyMet)
                    .expect("answer recorded");
            });
        }
        scope.spawn(|| {
            service.finalize(&record.id).expect("finalized");
        });
        scope.spawn(|| {
            service
                .add_action_plan(
                    &record.id,
                    NewActionPlan {
                        pillar_id: None,
                        action_kind: None,
                        action: "Mentoring".to_string(),
                        start_date: None,
                        follow_up_date: None,
                        notes: None,
                    },
                )
                .expect("plan added");
        });
    });

    let stored = service.get(&record.id).expect("record present");
    assert_eq!(stored.answered_count(), items.len());
    assert_eq!(stored.status, AssessmentStatus::Completed);
    assert_eq!(stored.action_plans.len(), 1);
}

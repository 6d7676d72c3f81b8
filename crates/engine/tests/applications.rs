use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, Database, DatabaseConnection, EntityTrait};

use engine::{
    ApplicationListFilter, ApplicationSort, ApplicationStatus, ApplicationUpdate, AttachmentSlot,
    Engine, EngineError, EventKind, NewApplication, NewAttachment, ProgramUpsert, ReportFilter,
    SIGNATORY_MAYOR, SortDirection, SortKey, users,
};
use migration::MigratorTrait;

async fn seed_user(db: &DatabaseConnection, email: &str, role: &str) -> users::Model {
    users::Entity::insert(users::ActiveModel {
        email: ActiveValue::Set(email.to_string()),
        password: ActiveValue::Set("secret".to_string()),
        first_name: ActiveValue::Set("Test".to_string()),
        last_name: ActiveValue::Set(role.to_string()),
        role: ActiveValue::Set(role.to_string()),
        contact_number: ActiveValue::Set(Some("09171234567".to_string())),
        ..Default::default()
    })
    .exec_with_returning(db)
    .await
    .unwrap()
}

struct Fixture {
    engine: Engine,
    maria: users::Model,
    pedro: users::Model,
    staff: users::Model,
    admin: users::Model,
}

async fn fixture() -> Fixture {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let maria = seed_user(&db, "maria@example.com", "applicant").await;
    let pedro = seed_user(&db, "pedro@example.com", "applicant").await;
    let staff = seed_user(&db, "jun@example.com", "staff").await;
    let admin = seed_user(&db, "ana@example.com", "admin").await;

    let engine = Engine::builder().database(db).build().await.unwrap();
    Fixture {
        engine,
        maria,
        pedro,
        staff,
        admin,
    }
}

fn new_application(program: &str) -> NewApplication {
    NewApplication {
        first_name: "Maria".to_string(),
        middle_name: None,
        last_name: "Santos".to_string(),
        contact_number: "09171234567".to_string(),
        email: "maria@example.com".to_string(),
        house_no: "12".to_string(),
        barangay: "Poblacion".to_string(),
        city: "San Pablo".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
        sex: "F".to_string(),
        civil_status: "Single".to_string(),
        program: program.to_string(),
        assistance_type: "Financial".to_string(),
        date_of_incident: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        attachments: vec![
            NewAttachment {
                slot: AttachmentSlot::ValidId,
                path: "uploads/id.png".to_string(),
            },
            NewAttachment {
                slot: AttachmentSlot::Additional,
                path: "uploads/extra-1.png".to_string(),
            },
            NewAttachment {
                slot: AttachmentSlot::Additional,
                path: "uploads/extra-2.png".to_string(),
            },
        ],
    }
}

#[tokio::test]
async fn submit_creates_pending_record_with_ordered_attachments() {
    let fx = fixture().await;

    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();
    assert_eq!(app.status, ApplicationStatus::Pending);
    assert_eq!(app.user_id, fx.maria.id);
    assert_eq!(app.amount_minor, None);

    let detail = fx
        .engine
        .application_detail(&fx.maria, app.id)
        .await
        .unwrap();
    assert_eq!(detail.attachments.len(), 3);
    let additional: Vec<i32> = detail
        .attachments
        .iter()
        .filter(|a| a.slot == "additional")
        .map(|a| a.position)
        .collect();
    assert_eq!(additional, vec![1, 2]);
}

#[tokio::test]
async fn staff_cannot_submit_applications() {
    let fx = fixture().await;

    let err = fx
        .engine
        .submit_application(&fx.staff, new_application("Chemotherapy"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn closed_intake_refuses_submissions() {
    let fx = fixture().await;
    fx.engine
        .put_setting(&fx.admin, "accepting_applications", "false")
        .await
        .unwrap();

    let err = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn applicants_only_see_their_own_records() {
    let fx = fixture().await;
    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();

    let filter = ApplicationListFilter::default();
    let mine = fx
        .engine
        .list_applications(&fx.maria, &filter, 1, 50)
        .await
        .unwrap();
    assert_eq!(mine.items.len(), 1);

    let theirs = fx
        .engine
        .list_applications(&fx.pedro, &filter, 1, 50)
        .await
        .unwrap();
    assert!(theirs.items.is_empty());

    // A foreign detail read looks like a missing record, not a refusal.
    let err = fx
        .engine
        .application_detail(&fx.pedro, app.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let staff_view = fx
        .engine
        .list_applications(&fx.staff, &filter, 1, 50)
        .await
        .unwrap();
    assert_eq!(staff_view.items.len(), 1);
}

#[tokio::test]
async fn approve_records_amount_date_and_ledger_entry() {
    let fx = fixture().await;
    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();

    let event = fx
        .engine
        .approve(&fx.staff, app.id, 500_000)
        .await
        .unwrap();
    assert_eq!(event.kind, EventKind::Approved);
    assert_eq!(event.application.status, ApplicationStatus::Approved);
    assert_eq!(event.application.amount_minor, Some(500_000));
    assert!(event.application.approved_date.is_some());
    assert_eq!(event.recipients.len(), 1);
    assert_eq!(event.recipients[0].user_id, fx.maria.id);

    let ledger = fx.engine.budget_entries(&fx.staff).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].amount_minor, 500_000);
    assert_eq!(ledger[0].entry_kind, "release");
}

#[tokio::test]
async fn approve_requires_a_positive_amount() {
    let fx = fixture().await;
    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();

    let err = fx.engine.approve(&fx.staff, app.id, 0).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn reject_stores_remarks_and_notifies_the_applicant() {
    let fx = fixture().await;
    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();

    let event = fx
        .engine
        .reject(&fx.staff, app.id, "Missing ID")
        .await
        .unwrap();
    assert_eq!(event.kind, EventKind::Rejected);
    assert_eq!(event.application.status, ApplicationStatus::Rejected);
    assert_eq!(event.application.remarks.as_deref(), Some("Missing ID"));
    assert_eq!(event.recipients.len(), 1);
    assert_eq!(event.recipients[0].user_id, fx.maria.id);

    let err = fx.engine.reject(&fx.staff, app.id, "  ").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn settled_records_refuse_a_second_review() {
    let fx = fixture().await;
    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();

    fx.engine.approve(&fx.staff, app.id, 100).await.unwrap();

    let err = fx
        .engine
        .reject(&fx.admin, app.id, "changed my mind")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::StateConflict(_)));

    let err = fx.engine.approve(&fx.admin, app.id, 200).await.unwrap_err();
    assert!(matches!(err, EngineError::StateConflict(_)));
}

#[tokio::test]
async fn add_remark_is_idempotent_and_changes_no_status() {
    let fx = fixture().await;
    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();

    let first = fx
        .engine
        .add_remark(&fx.staff, app.id, "verify the ID")
        .await
        .unwrap();
    assert_eq!(first.status, ApplicationStatus::Pending);
    assert_eq!(first.remarks.as_deref(), Some("verify the ID"));

    let second = fx
        .engine
        .add_remark(&fx.staff, app.id, "verify the ID")
        .await
        .unwrap();
    // Same text twice leaves the record untouched.
    assert_eq!(second.updated_at, first.updated_at);
}

#[tokio::test]
async fn resubmit_is_owner_only_and_clears_review_fields() {
    let fx = fixture().await;
    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();
    fx.engine
        .reject(&fx.staff, app.id, "Missing ID")
        .await
        .unwrap();

    let err = fx
        .engine
        .resubmit(&fx.staff, app.id, ApplicationUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = fx
        .engine
        .resubmit(&fx.pedro, app.id, ApplicationUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let update = ApplicationUpdate {
        contact_number: Some("09998887777".to_string()),
        ..Default::default()
    };
    let event = fx.engine.resubmit(&fx.maria, app.id, update).await.unwrap();
    assert_eq!(event.kind, EventKind::Resubmitted);
    assert_eq!(event.application.status, ApplicationStatus::Pending);
    assert_eq!(event.application.remarks, None);
    assert_eq!(event.application.contact_number, "09998887777");
    // Resubmission addresses the reviewer set.
    let mut recipient_ids: Vec<i32> = event.recipients.iter().map(|r| r.user_id).collect();
    recipient_ids.sort_unstable();
    assert_eq!(recipient_ids, vec![fx.staff.id, fx.admin.id]);

    // Pending records cannot be resubmitted again.
    let err = fx
        .engine
        .resubmit(&fx.maria, app.id, ApplicationUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::StateConflict(_)));
}

#[tokio::test]
async fn list_filters_sort_and_paginate() {
    let fx = fixture().await;
    for program in ["Chemotherapy", "Burial Assistance", "Chemotherapy"] {
        fx.engine
            .submit_application(&fx.maria, new_application(program))
            .await
            .unwrap();
    }
    let target = fx
        .engine
        .list_applications(&fx.staff, &ApplicationListFilter::default(), 1, 50)
        .await
        .unwrap()
        .items
        .iter()
        .find(|a| a.program == "Burial Assistance")
        .map(|a| a.id)
        .unwrap();
    fx.engine.approve(&fx.staff, target, 250_000).await.unwrap();

    // Program match is case-insensitive.
    let filter = ApplicationListFilter {
        program: Some("chemotherapy".to_string()),
        ..Default::default()
    };
    let page = fx
        .engine
        .list_applications(&fx.staff, &filter, 1, 50)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);

    let filter = ApplicationListFilter {
        status: Some(ApplicationStatus::Approved),
        ..Default::default()
    };
    let page = fx
        .engine
        .list_applications(&fx.staff, &filter, 1, 50)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, target);

    let filter = ApplicationListFilter {
        search: Some("santos".to_string()),
        ..Default::default()
    };
    let page = fx
        .engine
        .list_applications(&fx.staff, &filter, 1, 50)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);

    // Two-per-page pagination with stable ascending id order.
    let filter = ApplicationListFilter {
        sort: Some(ApplicationSort {
            key: SortKey::SubmittedAt,
            direction: SortDirection::Asc,
        }),
        ..Default::default()
    };
    let first = fx
        .engine
        .list_applications(&fx.staff, &filter, 1, 2)
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.page_info.total_items, 3);
    assert_eq!(first.page_info.total_pages, 2);
    let second = fx
        .engine
        .list_applications(&fx.staff, &filter, 2, 2)
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(first.items.iter().all(|a| a.id < second.items[0].id));

    let err = fx
        .engine
        .list_applications(&fx.staff, &filter, 0, 2)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn date_range_bounds_are_inclusive_and_ordered() {
    let fx = fixture().await;
    fx.engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    let tomorrow = today.succ_opt().unwrap();
    let yesterday = today.pred_opt().unwrap();
    let range = |from, to| ApplicationListFilter {
        submitted_from: from,
        submitted_to: to,
        ..Default::default()
    };

    // A same-day range catches records submitted that day.
    let page = fx
        .engine
        .list_applications(&fx.staff, &range(Some(today), Some(today)), 1, 50)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);

    // Either bound alone excludes the record when it falls outside.
    let page = fx
        .engine
        .list_applications(&fx.staff, &range(Some(tomorrow), None), 1, 50)
        .await
        .unwrap();
    assert!(page.items.is_empty());
    let page = fx
        .engine
        .list_applications(&fx.staff, &range(None, Some(yesterday)), 1, 50)
        .await
        .unwrap();
    assert!(page.items.is_empty());

    // An inverted range is refused, not silently empty.
    let err = fx
        .engine
        .list_applications(&fx.staff, &range(Some(tomorrow), Some(today)), 1, 50)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn remarks_are_capped_at_one_thousand_characters() {
    let fx = fixture().await;
    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();

    let err = fx
        .engine
        .reject(&fx.staff, app.id, &"x".repeat(1001))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));

    // Exactly at the limit is still accepted.
    let event = fx
        .engine
        .reject(&fx.staff, app.id, &"x".repeat(1000))
        .await
        .unwrap();
    assert_eq!(
        event.application.remarks.map(|r| r.chars().count()),
        Some(1000)
    );
}

#[tokio::test]
async fn submissions_match_the_program_catalogue() {
    let fx = fixture().await;

    // Seeded catalogue: active entries in title order.
    let catalogue = fx.engine.list_programs().await.unwrap();
    assert!(catalogue.iter().any(|p| p.title == "Chemotherapy"));
    let titles: Vec<&str> = catalogue.iter().map(|p| p.title.as_str()).collect();
    let mut sorted = titles.clone();
    sorted.sort_unstable();
    assert_eq!(titles, sorted);

    // Matching folds case; the stored title is the canonical one.
    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("chemotherapy"))
        .await
        .unwrap();
    assert_eq!(app.program, "Chemotherapy");

    let err = fx
        .engine
        .submit_application(&fx.maria, new_application("Karaoke Rental"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn catalogue_upkeep_is_admin_only() {
    let fx = fixture().await;
    let entry = |is_active| ProgramUpsert {
        title: "Educational Assistance".to_string(),
        description: "School fees and supplies.".to_string(),
        requirements: vec!["Certificate of enrollment".to_string()],
        default_amount_minor: Some(200_000),
        is_active,
    };

    let err = fx
        .engine
        .upsert_program(&fx.staff, entry(true))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // A new active entry immediately accepts submissions.
    let model = fx.engine.upsert_program(&fx.admin, entry(true)).await.unwrap();
    assert_eq!(
        model.requirement_list(),
        vec!["Certificate of enrollment".to_string()]
    );
    fx.engine
        .submit_application(&fx.maria, new_application("Educational Assistance"))
        .await
        .unwrap();

    // Deactivating hides it from the catalogue and closes intake for it.
    fx.engine.upsert_program(&fx.admin, entry(false)).await.unwrap();
    let catalogue = fx.engine.list_programs().await.unwrap();
    assert!(!catalogue.iter().any(|p| p.title == "Educational Assistance"));
    let err = fx
        .engine
        .submit_application(&fx.maria, new_application("Educational Assistance"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn pending_queue_is_oldest_first_and_reviewer_only() {
    let fx = fixture().await;
    for program in ["Chemotherapy", "Burial Assistance"] {
        fx.engine
            .submit_application(&fx.maria, new_application(program))
            .await
            .unwrap();
    }

    let queue = fx
        .engine
        .pending_queue(&fx.staff, None, 1, 50)
        .await
        .unwrap();
    assert_eq!(queue.items.len(), 2);
    assert!(queue.items[0].id < queue.items[1].id);

    let err = fx
        .engine
        .pending_queue(&fx.maria, None, 1, 50)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn report_data_carries_filtered_and_global_totals() {
    let fx = fixture().await;
    for program in ["Chemotherapy", "Burial Assistance", "Chemotherapy"] {
        fx.engine
            .submit_application(&fx.maria, new_application(program))
            .await
            .unwrap();
    }
    let all = fx
        .engine
        .list_applications(&fx.staff, &ApplicationListFilter::default(), 1, 50)
        .await
        .unwrap();
    let chemo_id = all
        .items
        .iter()
        .find(|a| a.program == "Chemotherapy")
        .map(|a| a.id)
        .unwrap();
    fx.engine
        .approve(&fx.staff, chemo_id, 500_000)
        .await
        .unwrap();

    let filter = ReportFilter {
        status: Some(ApplicationStatus::Approved),
        program: Some("Chemotherapy".to_string()),
        ..Default::default()
    };
    let data = fx.engine.report_data(&fx.staff, &filter).await.unwrap();

    assert_eq!(data.rows.len(), 1);
    assert_eq!(data.rows[0].id, chemo_id);
    assert_eq!(data.rows[0].amount_minor, Some(500_000));
    assert!(data.rows[0].approved_date.is_some());

    assert_eq!(data.filtered_totals.total, 1);
    assert_eq!(data.filtered_totals.approved, 1);
    assert_eq!(data.global_totals.total, 3);
    assert_eq!(data.global_totals.pending, 2);
    assert_eq!(data.global_totals.approved, 1);

    let err = fx.engine.report_data(&fx.maria, &filter).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn signatories_fall_back_when_values_are_blank() {
    let fx = fixture().await;

    let seeded = fx.engine.signatories().await.unwrap();
    assert_eq!(seeded.mayor, "Hon. City Mayor");

    fx.engine
        .put_setting(&fx.admin, SIGNATORY_MAYOR, "Hon. Vilma Fuentes")
        .await
        .unwrap();
    let updated = fx.engine.signatories().await.unwrap();
    assert_eq!(updated.mayor, "Hon. Vilma Fuentes");

    // A blanked-out value falls back to the placeholder.
    fx.engine
        .put_setting(&fx.admin, SIGNATORY_MAYOR, "   ")
        .await
        .unwrap();
    let blanked = fx.engine.signatories().await.unwrap();
    assert_eq!(blanked.mayor, "Hon. City Mayor");

    let err = fx
        .engine
        .put_setting(&fx.staff, SIGNATORY_MAYOR, "x")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn announcement_is_none_until_set() {
    let fx = fixture().await;

    assert_eq!(fx.engine.system_announcement().await.unwrap(), None);

    fx.engine
        .put_setting(&fx.admin, "system_announcement", "Office closed on Friday")
        .await
        .unwrap();
    assert_eq!(
        fx.engine.system_announcement().await.unwrap().as_deref(),
        Some("Office closed on Friday")
    );
}

#[tokio::test]
async fn budget_ledger_is_reviewer_only_and_validates_amounts() {
    let fx = fixture().await;

    fx.engine
        .record_budget_entry(
            &fx.admin,
            engine::BudgetEntryKind::Allocation,
            10_000_000,
            Some("Q1 allocation"),
        )
        .await
        .unwrap();

    let err = fx
        .engine
        .record_budget_entry(&fx.admin, engine::BudgetEntryKind::Release, 0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));

    let err = fx
        .engine
        .record_budget_entry(&fx.maria, engine::BudgetEntryKind::Allocation, 100, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let ledger = fx.engine.budget_entries(&fx.admin).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].entry_kind, "allocation");
    assert_eq!(ledger[0].note.as_deref(), Some("Q1 allocation"));
}

#[tokio::test]
async fn notifications_are_scoped_and_marked_read_once() {
    let fx = fixture().await;
    let app = fx
        .engine
        .submit_application(&fx.maria, new_application("Chemotherapy"))
        .await
        .unwrap();
    fx.engine
        .notify(
            fx.maria.id,
            app.id,
            EventKind::Rejected,
            "Application Rejected",
            "Reason: Missing ID",
            "/applications/1",
        )
        .await
        .unwrap();

    let inbox = fx
        .engine
        .list_notifications(&fx.maria, true)
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);

    // Another user cannot read or acknowledge it.
    let foreign = fx
        .engine
        .list_notifications(&fx.pedro, false)
        .await
        .unwrap();
    assert!(foreign.is_empty());
    let err = fx
        .engine
        .mark_notification_read(&fx.pedro, inbox[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    fx.engine
        .mark_notification_read(&fx.maria, inbox[0].id)
        .await
        .unwrap();
    let unread = fx
        .engine
        .list_notifications(&fx.maria, true)
        .await
        .unwrap();
    assert!(unread.is_empty());
}

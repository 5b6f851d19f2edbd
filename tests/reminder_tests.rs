//! Reminder scan tests: schedule window and low-stock detection.

use chrono::{Duration, NaiveDate};
use sqlx::sqlite::SqlitePoolOptions;

use atelier_server::{
    config::{EmailConfig, RemindersConfig},
    models::{
        equipment::CreateEquipment,
        part::CreatePart,
        schedule::{CreateScheduleEntry, MaintenanceStatus, UpdateScheduleEntry},
    },
    repository::Repository,
    services::{email::EmailService, reminders::ReminderService},
};

async fn test_repository() -> Repository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    let repo = Repository::new(pool);
    repo.init_schema().await.expect("schema");
    repo
}

fn reminder_service(repo: &Repository) -> ReminderService {
    ReminderService::new(
        repo.clone(),
        RemindersConfig {
            low_stock_threshold: 5,
            interval_hours: 24,
            recipient: None,
        },
        EmailService::new(EmailConfig::default()),
    )
}

async fn seed_equipment(repo: &Repository) -> i64 {
    repo.equipment_create(&CreateEquipment {
        serial_number: "SN-001".to_string(),
        brand: "Haas".to_string(),
        model: "VF-2".to_string(),
        purchase_date: "2022-05-01".to_string(),
        sale_date: None,
        buyer_id: None,
        notes: None,
    })
    .await
    .expect("equipment")
    .id
}

async fn seed_schedule_entry(repo: &Repository, equipment_id: i64, due: NaiveDate) -> i64 {
    repo.schedules_create(&CreateScheduleEntry {
        equipment_id,
        due_date: due.format("%Y-%m-%d").to_string(),
        maintenance_type: "revision".to_string(),
        technician: Some("M. Duret".to_string()),
        notes: None,
    })
    .await
    .expect("schedule entry")
    .id
}

#[tokio::test]
async fn entry_due_in_three_days_is_included_until_completed() {
    // Scenario E
    let repo = test_repository().await;
    let service = reminder_service(&repo);
    let equipment_id = seed_equipment(&repo).await;

    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let entry_id = seed_schedule_entry(&repo, equipment_id, today + Duration::days(3)).await;

    let report = service.scan(today).await.expect("scan");
    assert_eq!(report.upcoming.len(), 1);
    assert_eq!(report.upcoming[0].id, entry_id);
    assert!(report.maintenance_notice().unwrap().contains("SN-001"));

    repo.schedules_update(
        entry_id,
        &UpdateScheduleEntry {
            due_date: None,
            maintenance_type: None,
            technician: None,
            status: Some(MaintenanceStatus::Completed),
            notes: None,
        },
    )
    .await
    .expect("complete");

    let report = service.scan(today).await.expect("rescan");
    assert!(report.upcoming.is_empty());
    assert!(report.maintenance_notice().is_none());
}

#[tokio::test]
async fn window_is_seven_days_inclusive() {
    let repo = test_repository().await;
    let service = reminder_service(&repo);
    let equipment_id = seed_equipment(&repo).await;

    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    seed_schedule_entry(&repo, equipment_id, today).await;
    seed_schedule_entry(&repo, equipment_id, today + Duration::days(7)).await;
    seed_schedule_entry(&repo, equipment_id, today + Duration::days(8)).await;
    seed_schedule_entry(&repo, equipment_id, today - Duration::days(1)).await;

    let report = service.scan(today).await.expect("scan");
    let due_dates: Vec<_> = report.upcoming.iter().map(|e| e.due_date).collect();
    assert_eq!(due_dates, vec![today, today + Duration::days(7)]);
}

#[tokio::test]
async fn low_stock_parts_appear_at_or_below_threshold() {
    let repo = test_repository().await;
    let service = reminder_service(&repo);

    for (name, reference, stock) in [
        ("Drive belt", "DB-8", 2),
        ("Air filter", "AF-2", 5),
        ("Coolant pump", "CP-3", 12),
    ] {
        repo.parts_create(&CreatePart {
            name: name.to_string(),
            reference: reference.to_string(),
            supplier: None,
            unit_price: 1.0,
            stock_quantity: stock,
            description: None,
        })
        .await
        .expect("part");
    }

    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let report = service.scan(today).await.expect("scan");

    let names: Vec<_> = report.low_stock.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Air filter", "Drive belt"]);

    let notice = report.low_stock_notice().unwrap();
    assert!(notice.contains("Drive belt"));
    assert!(!notice.contains("Coolant pump"));
}

#[tokio::test]
async fn scanning_twice_on_unchanged_data_is_idempotent() {
    let repo = test_repository().await;
    let service = reminder_service(&repo);
    let equipment_id = seed_equipment(&repo).await;

    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    seed_schedule_entry(&repo, equipment_id, today + Duration::days(2)).await;
    repo.parts_create(&CreatePart {
        name: "Drive belt".to_string(),
        reference: "DB-8".to_string(),
        supplier: None,
        unit_price: 1.0,
        stock_quantity: 1,
        description: None,
    })
    .await
    .expect("part");

    let first = service.scan(today).await.expect("first scan");
    let second = service.scan(today).await.expect("second scan");

    assert_eq!(first.maintenance_notice(), second.maintenance_notice());
    assert_eq!(first.low_stock_notice(), second.low_stock_notice());
}

#[tokio::test]
async fn empty_store_produces_no_notices() {
    let repo = test_repository().await;
    let service = reminder_service(&repo);

    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let report = service.scan(today).await.expect("scan");

    assert!(report.maintenance_notice().is_none());
    assert!(report.low_stock_notice().is_none());
}

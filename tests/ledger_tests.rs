//! Stock-ledger tests against an in-memory database.
//!
//! These exercise the invariant that a part's stock always equals its
//! initial quantity minus the quantities held by existing usage lines,
//! across create, edit and delete of interventions.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use atelier_server::{
    error::AppError,
    models::{
        equipment::CreateEquipment,
        intervention::{CreateIntervention, PartUsageRequest, UpdateIntervention},
        part::CreatePart,
        user::{PermissionSet, Role, UserClaims},
    },
    repository::Repository,
    services::interventions::InterventionsService,
};

async fn test_repository() -> Repository {
    // The ledger layer does its own referential checks and relies on the
    // engine NOT enforcing foreign keys (see Repository::init_schema). sqlx
    // turns `PRAGMA foreign_keys = ON` on by default, so disable it here to
    // match the documented runtime contract.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("sqlite url")
        .foreign_keys(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory database");
    let repo = Repository::new(pool);
    repo.init_schema().await.expect("schema");
    repo
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

async fn seed_part(repo: &Repository, reference: &str, stock: i64, unit_price: f64) -> i64 {
    repo.parts_create(&CreatePart {
        name: format!("Part {}", reference),
        reference: reference.to_string(),
        supplier: None,
        unit_price,
        stock_quantity: stock,
        description: None,
    })
    .await
    .expect("part")
    .id
}

fn usage(part_id: i64, quantity: i64) -> PartUsageRequest {
    PartUsageRequest { part_id, quantity }
}

fn create_request(
    equipment_id: i64,
    labor_cost: f64,
    part_usages: Vec<PartUsageRequest>,
) -> CreateIntervention {
    CreateIntervention {
        equipment_id,
        entry_date: "2024-03-01".to_string(),
        exit_date: None,
        repair_details: Some("spindle bearing replacement".to_string()),
        technician: Some("M. Duret".to_string()),
        labor_cost: Some(labor_cost),
        part_usages,
    }
}

fn update_request(labor_cost: f64, part_usages: Vec<PartUsageRequest>) -> UpdateIntervention {
    UpdateIntervention {
        entry_date: "2024-03-01".to_string(),
        exit_date: Some("2024-03-02".to_string()),
        repair_details: Some("spindle bearing replacement".to_string()),
        technician: Some("M. Duret".to_string()),
        labor_cost: Some(labor_cost),
        part_usages,
    }
}

#[tokio::test]
async fn create_debits_stock_and_totals_lines() {
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let details = repo
        .interventions_create(&create_request(equipment_id, 50.0, vec![usage(part_id, 3)]))
        .await
        .expect("create");

    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 7);
    assert_eq!(details.part_usages.len(), 1);
    assert_eq!(details.part_usages[0].quantity_used, 3);
    assert_eq!(details.part_usages[0].line_cost, 12.0);
    assert_eq!(details.total_cost, 62.0);
}

#[tokio::test]
async fn create_round_trips_through_fetch() {
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let created = repo
        .interventions_create(&create_request(equipment_id, 50.0, vec![usage(part_id, 2)]))
        .await
        .expect("create");
    let fetched = repo
        .interventions_get_details(created.id)
        .await
        .expect("fetch");

    assert_eq!(fetched.equipment_id, equipment_id);
    assert_eq!(fetched.serial_number, "SN-001");
    assert_eq!(fetched.entry_date.to_string(), "2024-03-01");
    assert_eq!(fetched.technician.as_deref(), Some("M. Duret"));
    assert_eq!(fetched.labor_cost, 50.0);
    assert_eq!(fetched.total_cost, 58.0);
    assert_eq!(fetched.part_usages.len(), created.part_usages.len());
}

#[tokio::test]
async fn edit_revalidates_against_restored_stock() {
    // Scenario B: stock 10, intervention uses 3 (stock 7); editing to 5
    // must leave 5, not 2.
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let created = repo
        .interventions_create(&create_request(equipment_id, 50.0, vec![usage(part_id, 3)]))
        .await
        .expect("create");

    let updated = repo
        .interventions_update(created.id, &update_request(50.0, vec![usage(part_id, 5)]))
        .await
        .expect("update");

    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 5);
    assert_eq!(updated.total_cost, 70.0);
}

#[tokio::test]
async fn edit_with_unchanged_usages_leaves_stock_unchanged() {
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let created = repo
        .interventions_create(&create_request(equipment_id, 50.0, vec![usage(part_id, 3)]))
        .await
        .expect("create");

    repo.interventions_update(created.id, &update_request(50.0, vec![usage(part_id, 3)]))
        .await
        .expect("update");

    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 7);
}

#[tokio::test]
async fn delete_restores_stock() {
    // Scenario C
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let created = repo
        .interventions_create(&create_request(equipment_id, 50.0, vec![usage(part_id, 3)]))
        .await
        .expect("create");
    repo.interventions_delete(created.id).await.expect("delete");

    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 10);
}

#[tokio::test]
async fn delete_then_recreate_is_not_double_restored() {
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let created = repo
        .interventions_create(&create_request(equipment_id, 50.0, vec![usage(part_id, 3)]))
        .await
        .expect("create");
    repo.interventions_delete(created.id).await.expect("delete");
    repo.interventions_create(&create_request(equipment_id, 50.0, vec![usage(part_id, 3)]))
        .await
        .expect("recreate");

    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 7);
}

#[tokio::test]
async fn over_requesting_rejects_whole_creation() {
    // Scenario D: 11 requested with 10 in stock
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let result = repo
        .interventions_create(&create_request(equipment_id, 50.0, vec![usage(part_id, 11)]))
        .await;

    assert!(matches!(result, Err(AppError::InsufficientStock(_))));
    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 10);
    assert!(repo.interventions_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_multi_part_creation_leaves_no_partial_state() {
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_a = seed_part(&repo, "BRG-6205", 5, 4.0).await;
    let part_b = seed_part(&repo, "SEAL-30", 0, 2.0).await;

    let result = repo
        .interventions_create(&create_request(
            equipment_id,
            50.0,
            vec![usage(part_a, 2), usage(part_b, 1)],
        ))
        .await;

    assert!(matches!(result, Err(AppError::InsufficientStock(_))));
    // The debit of part A must have been rolled back with the rest
    assert_eq!(repo.parts_get_by_id(part_a).await.unwrap().stock_quantity, 5);
    assert!(repo.interventions_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_edit_rolls_back_compensation() {
    // The subtlest case: a failing apply must also undo the compensation,
    // leaving stock and usage lines exactly as before the edit.
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let created = repo
        .interventions_create(&create_request(equipment_id, 50.0, vec![usage(part_id, 3)]))
        .await
        .expect("create");

    let result = repo
        .interventions_update(created.id, &update_request(50.0, vec![usage(part_id, 50)]))
        .await;

    assert!(matches!(result, Err(AppError::InsufficientStock(_))));
    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 7);

    let details = repo.interventions_get_details(created.id).await.unwrap();
    assert_eq!(details.part_usages.len(), 1);
    assert_eq!(details.part_usages[0].quantity_used, 3);
    assert_eq!(details.total_cost, 62.0);
}

#[tokio::test]
async fn ledger_invariant_holds_across_operations() {
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 20, 4.0).await;

    let first = repo
        .interventions_create(&create_request(equipment_id, 10.0, vec![usage(part_id, 4)]))
        .await
        .expect("first");
    let second = repo
        .interventions_create(&create_request(equipment_id, 10.0, vec![usage(part_id, 6)]))
        .await
        .expect("second");
    repo.interventions_update(first.id, &update_request(10.0, vec![usage(part_id, 2)]))
        .await
        .expect("edit");
    repo.interventions_delete(second.id).await.expect("delete");

    // initial 20 == stock + quantities still held by live usage lines
    let stock = repo.parts_get_by_id(part_id).await.unwrap().stock_quantity;
    let held: i64 = repo
        .interventions_get_details(first.id)
        .await
        .unwrap()
        .part_usages
        .iter()
        .map(|u| u.quantity_used)
        .sum();
    assert_eq!(stock + held, 20);
}

#[tokio::test]
async fn usage_of_deleted_part_fails_referentially() {
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let created = repo
        .interventions_create(&create_request(equipment_id, 50.0, vec![usage(part_id, 3)]))
        .await
        .expect("create");

    repo.parts_delete(part_id).await.expect("delete part");

    let delete_result = repo.interventions_delete(created.id).await;
    assert!(matches!(delete_result, Err(AppError::Referential(_))));

    let edit_result = repo
        .interventions_update(created.id, &update_request(50.0, vec![]))
        .await;
    assert!(matches!(edit_result, Err(AppError::Referential(_))));

    // The intervention and its line are still there, nothing was dropped
    let details = repo.interventions_get_details(created.id).await.unwrap();
    assert_eq!(details.part_usages.len(), 1);
}

#[tokio::test]
async fn zero_or_negative_quantities_are_rejected() {
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    for quantity in [0, -2] {
        let result = repo
            .interventions_create(&create_request(
                equipment_id,
                0.0,
                vec![usage(part_id, quantity)],
            ))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 10);
}

#[tokio::test]
async fn creation_for_unknown_equipment_fails_referentially() {
    let repo = test_repository().await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let result = repo
        .interventions_create(&create_request(999, 50.0, vec![usage(part_id, 1)]))
        .await;

    assert!(matches!(result, Err(AppError::Referential(_))));
    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 10);
}

#[tokio::test]
async fn direct_stock_adjustment_cannot_go_negative() {
    let repo = test_repository().await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let result = repo.parts_adjust_stock(part_id, -11).await;
    assert!(matches!(result, Err(AppError::InsufficientStock(_))));
    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 10);

    let part = repo.parts_adjust_stock(part_id, 5).await.expect("restock");
    assert_eq!(part.stock_quantity, 15);
}

#[tokio::test]
async fn duplicate_part_reference_conflicts() {
    let repo = test_repository().await;
    seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let result = repo
        .parts_create(&CreatePart {
            name: "Bearing".to_string(),
            reference: "BRG-6205".to_string(),
            supplier: None,
            unit_price: 3.5,
            stock_quantity: 1,
            description: None,
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn low_stock_listing_filters_and_orders_by_name() {
    let repo = test_repository().await;
    repo.parts_create(&CreatePart {
        name: "Wiper seal".to_string(),
        reference: "WS-1".to_string(),
        supplier: None,
        unit_price: 1.0,
        stock_quantity: 2,
        description: None,
    })
    .await
    .unwrap();
    repo.parts_create(&CreatePart {
        name: "Air filter".to_string(),
        reference: "AF-2".to_string(),
        supplier: None,
        unit_price: 1.0,
        stock_quantity: 5,
        description: None,
    })
    .await
    .unwrap();
    repo.parts_create(&CreatePart {
        name: "Coolant pump".to_string(),
        reference: "CP-3".to_string(),
        supplier: None,
        unit_price: 1.0,
        stock_quantity: 9,
        description: None,
    })
    .await
    .unwrap();

    let low = repo.parts_list_low_stock(5).await.unwrap();
    let names: Vec<_> = low.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Air filter", "Wiper seal"]);
}

#[tokio::test]
async fn missing_add_permission_blocks_creation_before_any_mutation() {
    let repo = test_repository().await;
    let equipment_id = seed_equipment(&repo).await;
    let part_id = seed_part(&repo, "BRG-6205", 10, 4.0).await;

    let service = InterventionsService::new(repo.clone());
    let claims = UserClaims {
        sub: "viewer".to_string(),
        user_id: 1,
        role: Role::User,
        permissions: PermissionSet::for_role(Role::User),
        exp: 4102444800,
        iat: 0,
    };

    let result = service
        .create(&claims, create_request(equipment_id, 50.0, vec![usage(part_id, 3)]))
        .await;

    assert!(matches!(result, Err(AppError::AccessDenied(_))));
    assert_eq!(repo.parts_get_by_id(part_id).await.unwrap().stock_quantity, 10);
    assert!(repo.interventions_list().await.unwrap().is_empty());
}

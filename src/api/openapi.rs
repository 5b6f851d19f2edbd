//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, equipment, health, interventions, parts, schedules, settings, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        version = "0.3.0",
        description = "Maintenance Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Atelier Maintenance", email = "dev@atelier-gmao.fr")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::change_password,
        auth::me,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::get_equipment_by_serial,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::list_equipment_interventions,
        // Parts
        parts::list_parts,
        parts::list_low_stock,
        parts::get_part,
        parts::create_part,
        parts::update_part,
        parts::delete_part,
        parts::adjust_stock,
        // Interventions
        interventions::list_interventions,
        interventions::get_intervention,
        interventions::create_intervention,
        interventions::update_intervention,
        interventions::delete_intervention,
        // Schedules
        schedules::list_schedules,
        schedules::list_upcoming,
        schedules::get_schedule,
        schedules::create_schedule,
        schedules::update_schedule,
        schedules::delete_schedule,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::update_permissions,
        users::reset_password,
        // Settings
        settings::get_settings,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::ChangePasswordRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Parts
            crate::models::part::Part,
            crate::models::part::CreatePart,
            crate::models::part::UpdatePart,
            crate::models::part::AdjustStock,
            // Interventions
            crate::models::intervention::Intervention,
            crate::models::intervention::InterventionDetails,
            crate::models::intervention::PartUsage,
            crate::models::intervention::PartUsageDetails,
            crate::models::intervention::PartUsageRequest,
            crate::models::intervention::CreateIntervention,
            crate::models::intervention::UpdateIntervention,
            // Schedules
            crate::models::schedule::MaintenanceStatus,
            crate::models::schedule::ScheduleEntry,
            crate::models::schedule::CreateScheduleEntry,
            crate::models::schedule::UpdateScheduleEntry,
            crate::models::schedule::UpcomingMaintenance,
            // Users
            crate::models::user::Role,
            crate::models::user::PermissionSet,
            crate::models::user::User,
            crate::models::user::UserDetails,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Settings
            settings::SettingsResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication"),
        (name = "equipment", description = "Equipment catalog"),
        (name = "parts", description = "Spare-parts inventory"),
        (name = "interventions", description = "Repair interventions"),
        (name = "schedules", description = "Preventive-maintenance schedules"),
        (name = "users", description = "User accounts and permissions"),
        (name = "settings", description = "Server settings")
    )
)]
pub struct ApiDoc;

/// Router serving the generated OpenAPI document and Swagger UI
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

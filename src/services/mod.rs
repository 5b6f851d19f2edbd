//! Business logic services

pub mod email;
pub mod equipment;
pub mod interventions;
pub mod parts;
pub mod reminders;
pub mod schedules;
pub mod users;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub parts: parts::PartsService,
    pub interventions: interventions::InterventionsService,
    pub schedules: schedules::SchedulesService,
    pub users: users::UsersService,
    pub reminders: reminders::ReminderService,
    pub email: email::EmailService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let email = email::EmailService::new(config.email.clone());
        Self {
            equipment: equipment::EquipmentService::new(repository.clone()),
            parts: parts::PartsService::new(
                repository.clone(),
                config.reminders.low_stock_threshold,
            ),
            interventions: interventions::InterventionsService::new(repository.clone()),
            schedules: schedules::SchedulesService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), config.auth.clone()),
            reminders: reminders::ReminderService::new(
                repository,
                config.reminders.clone(),
                email.clone(),
            ),
            email,
        }
    }
}

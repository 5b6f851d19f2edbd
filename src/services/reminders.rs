//! Periodic reminder scan over schedules and stock
//!
//! The scanner is purely observational: it reads the schedule store and the
//! parts inventory, aggregates what it finds into at most two notices and
//! pushes them outward (log, and email when a recipient is configured). Two
//! scans over unchanged data render identical notices.

use chrono::{Duration, NaiveDate, Utc};
use tokio::time::interval;

use crate::{
    config::RemindersConfig,
    error::AppResult,
    models::{part::Part, schedule::UpcomingMaintenance},
    repository::Repository,
    services::email::EmailService,
};

/// Days ahead covered by the maintenance window
const MAINTENANCE_WINDOW_DAYS: i64 = 7;

/// Result of one reminder scan
#[derive(Debug, Clone)]
pub struct ReminderReport {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub threshold: i64,
    pub upcoming: Vec<UpcomingMaintenance>,
    pub low_stock: Vec<Part>,
}

impl ReminderReport {
    /// Aggregated maintenance notice, `None` when nothing is due
    pub fn maintenance_notice(&self) -> Option<String> {
        if self.upcoming.is_empty() {
            return None;
        }
        let mut lines = vec![format!(
            "Preventive maintenance due between {} and {}:",
            self.window_start, self.window_end
        )];
        for entry in &self.upcoming {
            lines.push(format!(
                "- {} ({} {}): {} due {}",
                entry.serial_number, entry.brand, entry.model, entry.maintenance_type,
                entry.due_date
            ));
        }
        Some(lines.join("\n"))
    }

    /// Aggregated low-stock notice, `None` when every part is above the
    /// threshold
    pub fn low_stock_notice(&self) -> Option<String> {
        if self.low_stock.is_empty() {
            return None;
        }
        let mut lines = vec![format!(
            "Parts at or below the stock threshold of {}:",
            self.threshold
        )];
        for part in &self.low_stock {
            lines.push(format!(
                "- {} [{}]: {} left",
                part.name, part.reference, part.stock_quantity
            ));
        }
        Some(lines.join("\n"))
    }
}

#[derive(Clone)]
pub struct ReminderService {
    repository: Repository,
    config: RemindersConfig,
    email: EmailService,
}

impl ReminderService {
    pub fn new(repository: Repository, config: RemindersConfig, email: EmailService) -> Self {
        Self {
            repository,
            config,
            email,
        }
    }

    /// One read-only scan as of the given day
    pub async fn scan(&self, today: NaiveDate) -> AppResult<ReminderReport> {
        let window_end = today + Duration::days(MAINTENANCE_WINDOW_DAYS);
        let upcoming = self
            .repository
            .schedules_list_upcoming(today, window_end)
            .await?;
        let low_stock = self
            .repository
            .parts_list_low_stock(self.config.low_stock_threshold)
            .await?;

        Ok(ReminderReport {
            window_start: today,
            window_end,
            threshold: self.config.low_stock_threshold,
            upcoming,
            low_stock,
        })
    }

    /// Periodic loop; the first scan runs at startup, then once per
    /// configured interval until the host process shuts down
    pub async fn run(&self) {
        let period =
            std::time::Duration::from_secs(self.config.interval_hours.max(1) * 3600);
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                tracing::error!("Reminder scan failed: {}", e);
            }
        }
    }

    async fn tick(&self) -> AppResult<()> {
        let report = self.scan(Utc::now().date_naive()).await?;
        self.emit(&report).await;
        Ok(())
    }

    async fn emit(&self, report: &ReminderReport) {
        let notices = [
            ("Upcoming preventive maintenance", report.maintenance_notice()),
            ("Low spare-parts stock", report.low_stock_notice()),
        ];

        for (subject, notice) in notices {
            let Some(body) = notice else { continue };
            tracing::info!("{}", body);
            if let Some(ref recipient) = self.config.recipient {
                if let Err(e) = self.email.send_notice(recipient, subject, &body).await {
                    tracing::error!("Failed to email reminder notice: {}", e);
                }
            }
        }
    }
}

use chrono::{DateTime, Utc};
use remedy_core::AppError;
use remedy_domain::AuditFilter;
use serde::Deserialize;

/// Raw audit query string. Values are parsed by hand so bad input keeps the
/// standard error body.
#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub action: Option<String>,
    pub user: Option<String>,
    pub role: Option<String>,
    pub controller: Option<String>,
    pub limit: Option<String>,
}

impl AuditQuery {
    pub fn into_filter(self) -> Result<(AuditFilter, Option<usize>), AppError> {
        let limit = non_blank(self.limit)
            .map(|value| {
                value.parse::<usize>().map_err(|_| {
                    AppError::Validation(format!("invalid limit '{value}'"))
                })
            })
            .transpose()?;

        let filter = AuditFilter {
            start: parse_timestamp("start", self.start)?,
            end: parse_timestamp("end", self.end)?,
            action: non_blank(self.action),
            user: non_blank(self.user),
            role: non_blank(self.role),
            controller: non_blank(self.controller),
        };

        Ok((filter, limit))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_timestamp(name: &str, value: Option<String>) -> Result<Option<DateTime<Utc>>, AppError> {
    non_blank(value)
        .map(|value| {
            DateTime::parse_from_rfc3339(value.trim())
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|error| {
                    AppError::Validation(format!("invalid {name} timestamp '{value}': {error}"))
                })
        })
        .transpose()
}

//! # Publish Workflow
//!
//! ```text
//!   draft ──schedule──▶ scheduled ──check (due)──▶ live
//!     ▲                                             │
//!     └───────────────── save draft ◀───────────────┘
//!   draft/scheduled ──publish now──▶ live
//! ```
//!
//! Transitions take `now` explicitly so callers (and tests) control time.

use crate::{LayoutError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Scheduled,
    Live,
}

impl PublishStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Scheduled => "scheduled",
            PublishStatus::Live => "live",
        }
    }
}

/// Timestamps that fail to parse are read as absent
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|at| at.with_timezone(&Utc)))
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishWorkflow {
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Result of one scheduled-publish poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum PublishCheck {
    Promoted { published_at: DateTime<Utc> },
    NotScheduled,
    NotDueYet { scheduled_at: DateTime<Utc> },
    InvalidSchedule,
}

impl PublishCheck {
    pub fn promoted(&self) -> bool {
        matches!(self, PublishCheck::Promoted { .. })
    }
}

impl PublishWorkflow {
    pub fn is_live(&self) -> bool {
        self.status == PublishStatus::Live
    }

    /// Back to draft; the live snapshot is kept elsewhere for diffing
    pub fn mark_draft(&mut self, now: DateTime<Utc>) {
        self.status = PublishStatus::Draft;
        self.scheduled_at = None;
        self.updated_at = Some(now);
    }

    pub fn schedule(&mut self, at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<()> {
        let at = at.ok_or(LayoutError::MissingSchedule)?;
        self.status = PublishStatus::Scheduled;
        self.scheduled_at = Some(at);
        self.updated_at = Some(now);
        info!(scheduled_at = %at, "publish scheduled");
        Ok(())
    }

    pub fn publish(&mut self, now: DateTime<Utc>) {
        self.status = PublishStatus::Live;
        self.scheduled_at = None;
        self.published_at = Some(now);
        self.updated_at = Some(now);
    }

    /// Promote a due schedule to live; anything else is left alone
    pub fn check(&mut self, now: DateTime<Utc>) -> PublishCheck {
        if self.status != PublishStatus::Scheduled {
            return PublishCheck::NotScheduled;
        }
        let Some(scheduled_at) = self.scheduled_at else {
            return PublishCheck::InvalidSchedule;
        };
        if now < scheduled_at {
            return PublishCheck::NotDueYet { scheduled_at };
        }

        self.publish(now);
        info!(published_at = %now, "scheduled publish promoted to live");
        PublishCheck::Promoted { published_at: now }
    }
}

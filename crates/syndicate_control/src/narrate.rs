//! End-of-day content fan-out.
//!
//! One news request plus one briefing request per surviving member, all
//! spawned at once and all awaited. A failed, panicked or timed-out request
//! only costs its own member a fallback briefing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use syndicate_content::fallback::{fallback_briefing, fallback_news};
use syndicate_content::{
    briefing_or_fallback, news_report_or_fallback, CharacterSketch, ContentProvider,
    DailyBriefing, QUIET_CITY,
};
use syndicate_core::{CharacterId, DayOutcome, GameState};
use tokio::task::JoinError;

/// A member's share of the narration work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefingRequest {
    pub character: CharacterId,
    pub sketch: CharacterSketch,
    pub event_summary: String,
}

/// A resolved but not yet committed day.
#[derive(Debug, Clone)]
pub struct PendingDay {
    resolved: GameState,
    outcome: DayOutcome,
    requests: Vec<BriefingRequest>,
}

impl PendingDay {
    /// Bankrupt days get no briefings; nobody reports to a dead syndicate.
    pub(crate) fn new(resolved: GameState, outcome: DayOutcome) -> Self {
        let requests = if outcome.bankrupt {
            Vec::new()
        } else {
            resolved
                .active_members()
                .map(|member| BriefingRequest {
                    character: member.id.clone(),
                    sketch: CharacterSketch::from(member),
                    event_summary: outcome.event_summary_for(&member.name),
                })
                .collect()
        };
        Self {
            resolved,
            outcome,
            requests,
        }
    }

    pub fn day(&self) -> u32 {
        self.outcome.day
    }

    pub fn outcome(&self) -> &DayOutcome {
        &self.outcome
    }

    pub fn requests(&self) -> &[BriefingRequest] {
        &self.requests
    }

    pub(crate) fn into_parts(self) -> (GameState, DayOutcome) {
        (self.resolved, self.outcome)
    }
}

/// Provider output for one day, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayNarration {
    pub news: String,
    pub briefings: Vec<(CharacterId, DailyBriefing)>,
}

/// `None` when the call outlived its budget.
async fn bounded<T>(timeout: Option<Duration>, call: impl Future<Output = T>) -> Option<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call).await.ok(),
        None => Some(call.await),
    }
}

/// Provider errors are already replaced inside the task; this covers the
/// task itself timing out or panicking.
fn joined_or<T>(
    joined: Result<Option<T>, JoinError>,
    what: &str,
    subject: &str,
    fallback: impl FnOnce() -> T,
) -> T {
    match joined {
        Ok(Some(value)) => value,
        Ok(None) => {
            tracing::warn!(%subject, "{what} timed out, using fallback");
            fallback()
        }
        Err(e) => {
            tracing::warn!(%subject, error = %e, "{what} task aborted, using fallback");
            fallback()
        }
    }
}

/// Run the day's provider calls concurrently. Never fails.
pub async fn narrate_day(
    provider: Arc<dyn ContentProvider>,
    pending: &PendingDay,
    timeout: Option<Duration>,
) -> DayNarration {
    let events = pending.outcome.report_lines();

    let news_task = if events.is_empty() {
        None
    } else {
        let provider = Arc::clone(&provider);
        let events = events.clone();
        Some(tokio::spawn(async move {
            bounded(timeout, news_report_or_fallback(provider.as_ref(), &events)).await
        }))
    };

    let briefing_tasks: Vec<_> = pending
        .requests
        .iter()
        .map(|request| {
            let provider = Arc::clone(&provider);
            let sketch = request.sketch.clone();
            let summary = request.event_summary.clone();
            tokio::spawn(async move {
                bounded(timeout, briefing_or_fallback(provider.as_ref(), &sketch, &summary)).await
            })
        })
        .collect();

    let news = match news_task {
        None => QUIET_CITY.to_string(),
        Some(task) => {
            let day = pending.day().to_string();
            joined_or(task.await, "news generation", &day, || fallback_news(&events))
        }
    };

    let mut briefings = Vec::with_capacity(briefing_tasks.len());
    for (request, task) in pending.requests.iter().zip(briefing_tasks) {
        let name = &request.sketch.name;
        let briefing = joined_or(task.await, "briefing generation", name, || {
            fallback_briefing(name)
        });
        briefings.push((request.character.clone(), briefing));
    }

    DayNarration { news, briefings }
}

#![deny(warnings)]

//! Issue resolution against area publication schedules.
//!
//! Given an area's schedule and the issue a customer asked to start from,
//! these helpers pick the run of issues a campaign will actually appear
//! in. A past or withdrawn start is never honoured: resolution falls back
//! to the next issue not yet delivered, and an exhausted schedule yields
//! nothing so callers can offer a "contact us" path.

use adrate_core::{Area, CampaignConfig, IssueKey, ScheduleEntry};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Index of the first issue a campaign can run in.
///
/// The requested issue is used when it is scheduled and still upcoming on
/// `today`; otherwise the first upcoming entry. An entry is upcoming while
/// its delivery date (or the first of its month, when undated) is not
/// before `today`. `None` when the schedule has no such entry. Schedules
/// are expected in date order.
pub fn resolve_start_index(
    schedule: &[ScheduleEntry],
    requested: Option<IssueKey>,
    today: NaiveDate,
) -> Option<usize> {
    if let Some(req) = requested {
        match schedule.iter().position(|e| e.key == req) {
            Some(i) if schedule[i].is_upcoming(today) => return Some(i),
            _ => debug!(
                requested = %req,
                %today,
                "requested issue unavailable, using next scheduled issue"
            ),
        }
    }
    schedule.iter().position(|e| e.is_upcoming(today))
}

/// Up to `count` consecutive issues from the resolved start.
pub fn upcoming_issues(
    schedule: &[ScheduleEntry],
    requested: Option<IssueKey>,
    count: usize,
    today: NaiveDate,
) -> Vec<ScheduleEntry> {
    match resolve_start_index(schedule, requested, today) {
        Some(start) => schedule[start..].iter().take(count).cloned().collect(),
        None => Vec::new(),
    }
}

/// Whether the schedule holds enough future issues for the whole campaign.
pub fn covers_duration(
    schedule: &[ScheduleEntry],
    requested: Option<IssueKey>,
    issues: u32,
    today: NaiveDate,
) -> bool {
    let needed = issues as usize;
    upcoming_issues(schedule, requested, needed, today).len() == needed
}

/// The "month 7 onward" issue of a BOGOF area.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Continuation {
    pub key: IssueKey,
    /// Scheduled entry, when the calendar already reaches that far.
    pub entry: Option<ScheduleEntry>,
}

/// First-period issues for one area of a BOGOF booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AreaIssuePlan {
    /// Id of the advertising or leaflet area the issues belong to.
    pub area_id: String,
    /// Slots this area starts after the resolved start (0 or 1).
    pub offset: usize,
    pub issues: Vec<ScheduleEntry>,
    pub continuation: Option<Continuation>,
}

/// Continuation issue counted from an area's own start index.
///
/// Falls back to the start month plus the configured number of calendar
/// months when the schedule is not populated that far ahead.
pub fn continuation_issue(
    schedule: &[ScheduleEntry],
    start: usize,
    config: &CampaignConfig,
) -> Option<Continuation> {
    let first = schedule.get(start)?;
    let continuation = match schedule.get(start + config.bogof_continuation_offset) {
        Some(entry) => Continuation {
            key: entry.key,
            entry: Some(entry.clone()),
        },
        None => Continuation {
            key: first.key.add_months(config.bogof_continuation_months),
            entry: None,
        },
    };
    Some(continuation)
}

/// Lay out the first BOGOF period for each area in selection order.
///
/// Odd-indexed areas start one schedule slot after even-indexed ones, so
/// paired paid and free areas alternate issues.
pub fn bogof_issue_plan(
    areas: &[&Area],
    requested: Option<IssueKey>,
    today: NaiveDate,
    config: &CampaignConfig,
) -> Vec<AreaIssuePlan> {
    areas
        .iter()
        .enumerate()
        .map(|(i, area)| {
            let offset = i % 2;
            let schedule = area.schedule.as_slice();
            let start = resolve_start_index(schedule, requested, today)
                .map(|s| s + offset)
                .filter(|&s| s < schedule.len());
            match start {
                Some(s) => AreaIssuePlan {
                    area_id: area.id.to_string(),
                    offset,
                    issues: schedule[s..]
                        .iter()
                        .take(config.bogof_first_period_issues)
                        .cloned()
                        .collect(),
                    continuation: continuation_issue(schedule, s, config),
                },
                None => {
                    debug!(area = %area.id, "no future issues scheduled");
                    AreaIssuePlan {
                        area_id: area.id.to_string(),
                        offset,
                        issues: Vec::new(),
                        continuation: None,
                    }
                }
            }
        })
        .collect()
}

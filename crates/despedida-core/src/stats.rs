//! Statistics engine: pure functions over in-memory collections.
//!
//! Every function here is a data-in/data-out transformer with no store
//! access and no clock access -- `now` is always a parameter. Keyed counts
//! use `BTreeMap` and ties break on explicit rules, so identical inputs
//! always produce identical output regardless of input ordering.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Days, Duration, Utc};
use serde::Serialize;

use despedida_types::message::Message;
use despedida_types::session::Session;

/// How many authors the composite report keeps.
const TOP_AUTHOR_LIMIT: usize = 10;
/// Window of the "recent activity" section, in days.
const ACTIVITY_WINDOW_DAYS: u32 = 7;

/// Word and tip statistics over a message collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub total_messages: u64,
    pub total_words: u64,
    pub avg_words_per_message: u64,
    pub tip_counts: BTreeMap<String, u64>,
    pub unique_authors: u64,
}

/// Message count for one session within the breakdown listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBreakdown {
    pub session_id: String,
    pub session_name: String,
    pub message_count: u64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// One entry of the top-authors ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorCount {
    pub author: String,
    pub count: u64,
}

/// Headline numbers of the composite report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_sessions: u64,
    pub active_sessions: u64,
    pub total_messages: u64,
    pub recent_messages: u64,
    pub average_messages_per_session: u64,
    pub messages_per_day: f64,
    pub days_since_first: u64,
}

/// The trailing activity window: total plus per-day counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub last_7_days: u64,
    pub daily_breakdown: BTreeMap<String, u64>,
}

/// A calendar day with its message count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCount {
    pub date: String,
    pub count: u64,
}

/// First/last message timestamps and the busiest day of the window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub first_message: Option<DateTime<Utc>>,
    pub last_message: Option<DateTime<Utc>>,
    pub most_active_day: Option<DayCount>,
}

/// The composite report served by the admin stats endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub overview: Overview,
    pub text_analysis: TextStats,
    pub sessions_data: Vec<SessionBreakdown>,
    pub recent_activity: RecentActivity,
    pub top_authors: Vec<AuthorCount>,
    pub tip_distribution: BTreeMap<String, u64>,
    pub timeline: Timeline,
}

/// Word counts, tip distribution, and author cardinality.
///
/// Words are whitespace runs; the average rounds to the nearest integer and
/// an empty input yields all zeros.
pub fn text_stats(messages: &[Message]) -> TextStats {
    let total_messages = messages.len() as u64;
    let total_words: u64 = messages.iter().map(|m| count_words(&m.text)).sum();
    let avg_words_per_message = if total_messages > 0 {
        (total_words as f64 / total_messages as f64).round() as u64
    } else {
        0
    };

    let mut tip_counts: BTreeMap<String, u64> = BTreeMap::new();
    for message in messages {
        *tip_counts.entry(message.tip.clone()).or_insert(0) += 1;
    }

    let unique_authors = messages
        .iter()
        .map(|m| m.author.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;

    TextStats {
        total_messages,
        total_words,
        avg_words_per_message,
        tip_counts,
        unique_authors,
    }
}

fn count_words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Per-session message counts, sorted descending by count.
///
/// The sort is stable, so equal counts keep the input session order.
pub fn session_breakdown(sessions: &[Session], messages: &[Message]) -> Vec<SessionBreakdown> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for message in messages {
        *counts.entry(message.session_id.as_str()).or_insert(0) += 1;
    }

    let mut rows: Vec<SessionBreakdown> = sessions
        .iter()
        .map(|session| SessionBreakdown {
            session_id: session.id.clone(),
            session_name: session.name.clone(),
            message_count: counts.get(session.id.as_str()).copied().unwrap_or(0),
            active: session.active,
            created_at: session.created_at,
        })
        .collect();
    rows.sort_by(|a, b| b.message_count.cmp(&a.message_count));
    rows
}

/// The `limit` most prolific authors, count descending.
///
/// Ties break by first appearance in the input list.
pub fn top_authors(messages: &[Message], limit: usize) -> Vec<AuthorCount> {
    let mut counts: Vec<AuthorCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for message in messages {
        match index.get(message.author.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(message.author.as_str(), counts.len());
                counts.push(AuthorCount {
                    author: message.author.clone(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort: first-seen order breaks ties
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Message count per calendar day (UTC) over the trailing window, today
/// included. Every day of the window gets a key, zero-filled.
pub fn daily_activity(
    messages: &[Message],
    window_days: u32,
    now: DateTime<Utc>,
) -> BTreeMap<String, u64> {
    let today = now.date_naive();
    let mut days: BTreeMap<String, u64> = BTreeMap::new();
    for offset in 0..window_days {
        let date = today - Days::new(u64::from(offset));
        days.insert(date.format("%Y-%m-%d").to_string(), 0);
    }

    for message in messages {
        let key = message.created_at.date_naive().format("%Y-%m-%d").to_string();
        if let Some(count) = days.get_mut(&key) {
            *count += 1;
        }
    }

    days
}

/// Headline counts and rates for the report.
pub fn overview(sessions: &[Session], messages: &[Message], now: DateTime<Utc>) -> Overview {
    let total_sessions = sessions.len() as u64;
    let active_sessions = sessions.iter().filter(|s| s.active).count() as u64;
    let total_messages = messages.len() as u64;

    let week_ago = now - Duration::days(i64::from(ACTIVITY_WINDOW_DAYS));
    let recent_messages = messages
        .iter()
        .filter(|m| m.created_at > week_ago)
        .count() as u64;

    let average_messages_per_session = if active_sessions > 0 {
        (total_messages as f64 / active_sessions as f64).round() as u64
    } else {
        0
    };

    let first = messages.iter().map(|m| m.created_at).min();
    let (days_since_first, messages_per_day) = match first {
        Some(first) => {
            let days = days_between_ceil(first, now);
            let rate = if days > 0 {
                round_tenth(total_messages as f64 / days as f64)
            } else {
                0.0
            };
            (days, rate)
        }
        None => (0, 0.0),
    };

    Overview {
        total_sessions,
        active_sessions,
        total_messages,
        recent_messages,
        average_messages_per_session,
        messages_per_day,
        days_since_first,
    }
}

/// Elapsed days rounded up; a first message within the current day counts
/// as day one only once any time has passed.
fn days_between_ceil(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    let seconds = (to - from).num_seconds().max(0) as u64;
    seconds.div_ceil(86_400)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// First/last message timestamps and the busiest day of a daily breakdown.
///
/// Computed by min/max over the collection, not input position. On a tied
/// busiest day, the earliest date wins; an all-zero window has no busiest day.
pub fn timeline(messages: &[Message], daily: &BTreeMap<String, u64>) -> Timeline {
    let first_message = messages.iter().map(|m| m.created_at).min();
    let last_message = messages.iter().map(|m| m.created_at).max();

    let mut most_active_day: Option<DayCount> = None;
    for (date, &count) in daily {
        if count > 0 && most_active_day.as_ref().map_or(true, |best| count > best.count) {
            most_active_day = Some(DayCount {
                date: date.clone(),
                count,
            });
        }
    }

    Timeline {
        first_message,
        last_message,
        most_active_day,
    }
}

/// The full report: overview, text analysis, per-session breakdown, trailing
/// activity, top authors, tip distribution, and timeline. Recomputed from the
/// complete collections on every call.
pub fn stats_report(sessions: &[Session], messages: &[Message], now: DateTime<Utc>) -> StatsReport {
    let text_analysis = text_stats(messages);
    let daily_breakdown = daily_activity(messages, ACTIVITY_WINDOW_DAYS, now);
    let overview = overview(sessions, messages, now);
    let timeline = timeline(messages, &daily_breakdown);

    StatsReport {
        sessions_data: session_breakdown(sessions, messages),
        recent_activity: RecentActivity {
            last_7_days: overview.recent_messages,
            daily_breakdown,
        },
        top_authors: top_authors(messages, TOP_AUTHOR_LIMIT),
        tip_distribution: text_analysis.tip_counts.clone(),
        timeline,
        overview,
        text_analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use despedida_types::message::NO_TIP_LABEL;
    use uuid::Uuid;

    fn message(author: &str, text: &str, tip: &str, created_at: DateTime<Utc>) -> Message {
        Message {
            id: Uuid::now_v7(),
            session_id: "martin-isi".to_string(),
            author: author.to_string(),
            text: text.to_string(),
            tip: tip.to_string(),
            created_at,
        }
    }

    fn session(id: &str, active: bool, created_at: DateTime<Utc>) -> Session {
        Session {
            id: id.to_string(),
            name: id.to_uppercase(),
            active,
            created_at,
        }
    }

    #[test]
    fn test_text_stats_empty() {
        let stats = text_stats(&[]);
        assert_eq!(
            stats,
            TextStats {
                total_messages: 0,
                total_words: 0,
                avg_words_per_message: 0,
                tip_counts: BTreeMap::new(),
                unique_authors: 0,
            }
        );
    }

    #[test]
    fn test_text_stats_counts_words_and_tips() {
        let now = Utc::now();
        let messages = vec![
            message("Ana", "buen viaje   amigos", "20%", now),
            message("Ana", "suerte", NO_TIP_LABEL, now),
            message("Beto", "nos vemos pronto", "20%", now),
        ];

        let stats = text_stats(&messages);
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.total_words, 7);
        // 7 / 3 = 2.33 -> 2
        assert_eq!(stats.avg_words_per_message, 2);
        assert_eq!(stats.tip_counts.get("20%"), Some(&2));
        assert_eq!(stats.tip_counts.get(NO_TIP_LABEL), Some(&1));
        assert_eq!(stats.unique_authors, 2);
    }

    #[test]
    fn test_text_stats_reorder_invariant() {
        let now = Utc::now();
        let mut messages = vec![
            message("Ana", "uno", "15%", now),
            message("Beto", "dos tres", "20%", now),
            message("Carla", "cuatro cinco seis", NO_TIP_LABEL, now),
        ];

        let forward = text_stats(&messages);
        messages.reverse();
        let backward = text_stats(&messages);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_top_authors_ranking_and_ties() {
        let now = Utc::now();
        let messages = vec![
            message("A", "x", NO_TIP_LABEL, now),
            message("A", "x", NO_TIP_LABEL, now),
            message("B", "x", NO_TIP_LABEL, now),
        ];

        let ranked = top_authors(&messages, 10);
        assert_eq!(
            ranked,
            vec![
                AuthorCount {
                    author: "A".to_string(),
                    count: 2
                },
                AuthorCount {
                    author: "B".to_string(),
                    count: 1
                },
            ]
        );

        // Equal counts keep first-seen order
        let tied = vec![
            message("Zoe", "x", NO_TIP_LABEL, now),
            message("Ana", "x", NO_TIP_LABEL, now),
        ];
        let ranked = top_authors(&tied, 10);
        assert_eq!(ranked[0].author, "Zoe");
        assert_eq!(ranked[1].author, "Ana");
    }

    #[test]
    fn test_top_authors_respects_limit() {
        let now = Utc::now();
        let messages: Vec<Message> = (0..5)
            .map(|i| message(&format!("autor-{i}"), "x", NO_TIP_LABEL, now))
            .collect();
        assert_eq!(top_authors(&messages, 3).len(), 3);
    }

    #[test]
    fn test_daily_activity_zero_fills_window() {
        let now = Utc::now();
        let messages = vec![
            message("Ana", "hoy", NO_TIP_LABEL, now),
            message("Beto", "hoy también", NO_TIP_LABEL, now),
            // Outside the window entirely
            message("Caro", "antaño", NO_TIP_LABEL, now - Duration::days(30)),
        ];

        let daily = daily_activity(&messages, 7, now);
        assert_eq!(daily.len(), 7);

        let today_key = now.date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(daily.get(&today_key), Some(&2));
        let zero_days = daily.values().filter(|&&c| c == 0).count();
        assert_eq!(zero_days, 6);
    }

    #[test]
    fn test_session_breakdown_sorted_by_count() {
        let now = Utc::now();
        let sessions = vec![session("a", true, now), session("b", true, now)];
        let mut messages = vec![message("Ana", "x", NO_TIP_LABEL, now)];
        messages[0].session_id = "b".to_string();

        let rows = session_breakdown(&sessions, &messages);
        assert_eq!(rows[0].session_id, "b");
        assert_eq!(rows[0].message_count, 1);
        assert_eq!(rows[1].session_id, "a");
        assert_eq!(rows[1].message_count, 0);
    }

    #[test]
    fn test_overview_empty() {
        let now = Utc::now();
        let report = overview(&[], &[], now);
        assert_eq!(report.total_messages, 0);
        assert_eq!(report.days_since_first, 0);
        assert_eq!(report.messages_per_day, 0.0);
        assert_eq!(report.average_messages_per_session, 0);
    }

    #[test]
    fn test_overview_counts_and_rates() {
        let now = Utc::now();
        let sessions = vec![
            session("a", true, now),
            session("b", true, now),
            session("c", false, now),
        ];
        let messages = vec![
            message("Ana", "x", NO_TIP_LABEL, now - Duration::days(10)),
            message("Ana", "x", NO_TIP_LABEL, now - Duration::days(1)),
            message("Beto", "x", NO_TIP_LABEL, now),
        ];

        let report = overview(&sessions, &messages, now);
        assert_eq!(report.total_sessions, 3);
        assert_eq!(report.active_sessions, 2);
        assert_eq!(report.total_messages, 3);
        assert_eq!(report.recent_messages, 2);
        // 3 messages over 2 active sessions -> 2 after rounding
        assert_eq!(report.average_messages_per_session, 2);
        assert_eq!(report.days_since_first, 10);
        assert_eq!(report.messages_per_day, 0.3);
    }

    #[test]
    fn test_timeline_min_max_and_busiest_day() {
        let now = Utc::now();
        let oldest = now - Duration::days(2);
        // Deliberately unordered input
        let messages = vec![
            message("Ana", "x", NO_TIP_LABEL, now),
            message("Beto", "x", NO_TIP_LABEL, oldest),
            message("Caro", "x", NO_TIP_LABEL, now - Duration::days(1)),
            message("Dani", "x", NO_TIP_LABEL, now),
        ];

        let daily = daily_activity(&messages, 7, now);
        let line = timeline(&messages, &daily);
        assert_eq!(line.first_message, Some(oldest));
        assert_eq!(line.last_message, Some(now));
        let busiest = line.most_active_day.unwrap();
        assert_eq!(busiest.date, now.date_naive().format("%Y-%m-%d").to_string());
        assert_eq!(busiest.count, 2);
    }

    #[test]
    fn test_timeline_empty() {
        let daily = daily_activity(&[], 7, Utc::now());
        let line = timeline(&[], &daily);
        assert!(line.first_message.is_none());
        assert!(line.last_message.is_none());
        assert!(line.most_active_day.is_none());
    }

    #[test]
    fn test_stats_report_composes() {
        let now = Utc::now();
        let sessions = vec![session("martin-isi", true, now)];
        let messages = vec![
            message("Ana", "buen viaje", "20%", now),
            message("", "sin autor", NO_TIP_LABEL, now),
        ];

        let report = stats_report(&sessions, &messages, now);
        assert_eq!(report.overview.total_messages, 2);
        assert_eq!(report.recent_activity.last_7_days, 2);
        assert_eq!(report.recent_activity.daily_breakdown.len(), 7);
        assert_eq!(report.sessions_data.len(), 1);
        assert_eq!(report.top_authors.len(), 2);
        assert_eq!(report.tip_distribution, report.text_analysis.tip_counts);

        // camelCase wire format for the dashboard
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["overview"]["totalMessages"].is_u64());
        assert!(value["textAnalysis"]["avgWordsPerMessage"].is_u64());
        assert!(value["recentActivity"]["last7Days"].is_u64());
    }
}

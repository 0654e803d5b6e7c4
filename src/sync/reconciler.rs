//! Battle reconciliation.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::domain::{BattleResult, BrawlerUsage, NewBattle, PlayerId, PlayerTag};
use crate::fetch::ExternalBattle;
use crate::fetch::models::Participant;

/// Compact timestamp format used by the external API.
pub const BATTLE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.fZ";

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Records not seen before, in input order.
    pub new_battles: Vec<NewBattle>,
    /// Records whose battle time was already stored.
    pub skipped_existing: usize,
    /// Records repeating a battle time seen earlier in the same batch.
    pub skipped_duplicate: usize,
}

/// Converts external records into battles that are not stored yet.
///
/// `existing` holds the battle-time strings already stored for `tag`. The
/// pass is idempotent: feeding its own output back through `existing` yields
/// no new battles.
#[must_use]
pub fn reconcile(
    player_id: PlayerId,
    tag: &PlayerTag,
    existing: &HashSet<String>,
    records: &[ExternalBattle],
    now: DateTime<Utc>,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());

    for record in records {
        if existing.contains(&record.battle_time) {
            outcome.skipped_existing += 1;
            continue;
        }
        if !seen.insert(record.battle_time.as_str()) {
            outcome.skipped_duplicate += 1;
            continue;
        }
        outcome.new_battles.push(to_new_battle(player_id, tag, record, now));
    }
    outcome
}

fn to_new_battle(
    player_id: PlayerId,
    tag: &PlayerTag,
    record: &ExternalBattle,
    now: DateTime<Utc>,
) -> NewBattle {
    let details = &record.battle;
    let brawler = find_participant(record, tag)
        .and_then(Participant::primary_brawler)
        .map_or_else(BrawlerUsage::unknown, |b| BrawlerUsage {
            id: b.id,
            name: b.name.clone(),
            power: b.power,
            trophies: b.trophies,
        });

    let mode = non_empty(record.event.mode.as_deref())
        .or_else(|| non_empty(details.mode.as_deref()))
        .unwrap_or("unknown")
        .to_string();

    NewBattle {
        player_id,
        player_tag: tag.clone(),
        battle_time: record.battle_time.clone(),
        battle_date_time: parse_battle_time(&record.battle_time).unwrap_or(now),
        mode,
        map: non_empty(record.event.map.as_deref()).map(str::to_string),
        result: BattleResult::from_external(details.result.as_deref()),
        trophy_change: details.trophy_change,
        duration: details.duration,
        is_star_player: details
            .star_player
            .as_ref()
            .is_some_and(|star| tag.matches(&star.tag)),
        brawler,
    }
}

/// First participant, teams before the flat list, whose tag is `tag`.
#[must_use]
pub fn find_participant<'a>(record: &'a ExternalBattle, tag: &PlayerTag) -> Option<&'a Participant> {
    record.battle.participants().find(|p| tag.matches(&p.tag))
}

/// Parses the compact external timestamp, accepting RFC 3339 as well.
#[must_use]
pub fn parse_battle_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, BATTLE_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

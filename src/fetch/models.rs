//! Wire shapes of the external Brawl Stars API.
//!
//! Every struct defaults missing fields so that a sparse record (modes
//! without trophies, friendly games without a result, empty club objects)
//! still decodes. A record whose fields have the wrong JSON type fails on
//! its own and is dropped by the client without affecting its neighbours.

use serde::Deserialize;

use crate::domain::Club;

/// `GET /players/{tag}` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSnapshot {
    /// Player tag.
    pub tag: String,
    /// Display name.
    pub name: String,
    /// Current trophies.
    pub trophies: i32,
    /// Highest trophies.
    pub highest_trophies: i32,
    /// Experience level.
    pub exp_level: i32,
    /// Experience points.
    pub exp_points: i32,
    /// 3v3 victories.
    #[serde(rename = "3vs3Victories", alias = "threeVsThreeVictories")]
    pub three_vs_three_victories: i32,
    /// Solo showdown victories.
    pub solo_victories: i32,
    /// Duo showdown victories.
    pub duo_victories: i32,
    /// Club; the API sends `{}` for club-less players.
    pub club: Option<ClubRef>,
    /// Owned brawlers.
    pub brawlers: Vec<SnapshotBrawler>,
}

impl PlayerSnapshot {
    /// Club affiliation, ignoring the empty object sent for no club.
    #[must_use]
    pub fn club(&self) -> Option<Club> {
        self.club
            .as_ref()
            .filter(|club| !club.tag.is_empty())
            .map(|club| Club {
                tag: club.tag.clone(),
                name: club.name.clone(),
            })
    }
}

/// Club reference inside a player snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClubRef {
    /// Club tag.
    pub tag: String,
    /// Club name.
    pub name: String,
}

/// One owned brawler inside a player snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotBrawler {
    /// Catalog id.
    pub id: i32,
    /// Name.
    pub name: String,
    /// Power level.
    pub power: i32,
    /// Rank tier.
    pub rank: i32,
    /// Current trophies.
    pub trophies: i32,
    /// Highest trophies.
    pub highest_trophies: i32,
}

/// `GET /brawlers` item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrawlerRef {
    /// Catalog id.
    pub id: i32,
    /// Name.
    pub name: String,
}

/// Paged list envelope used by the list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Items<T> {
    /// Page items.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// One battle log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalBattle {
    /// Compact UTC timestamp, e.g. `20241114T123045.000Z`.
    pub battle_time: String,
    /// Event (mode and map).
    pub event: BattleEvent,
    /// Battle details.
    pub battle: BattleDetails,
}

/// Event block of a battle log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BattleEvent {
    /// Event id.
    pub id: Option<i64>,
    /// Game mode.
    pub mode: Option<String>,
    /// Map name.
    pub map: Option<String>,
}

/// Battle block of a battle log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BattleDetails {
    /// Game mode, repeated here for most modes.
    pub mode: Option<String>,
    /// `ranked`, `soloRanked`, `friendly`...
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// `victory`, `defeat`, `draw`; absent for showdown.
    pub result: Option<String>,
    /// Duration in seconds.
    pub duration: Option<i32>,
    /// Trophy delta.
    pub trophy_change: Option<i32>,
    /// Star player, when the mode has one.
    pub star_player: Option<Participant>,
    /// Team rosters (3v3, duo showdown).
    pub teams: Vec<Vec<Participant>>,
    /// Flat participant list (solo showdown, duels).
    pub players: Vec<Participant>,
}

impl BattleDetails {
    /// All participants in search order: team rosters first, in order, then
    /// the flat list.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.teams.iter().flatten().chain(self.players.iter())
    }
}

/// A participant in a battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Participant {
    /// Player tag.
    pub tag: String,
    /// Player name.
    pub name: String,
    /// Brawler used.
    pub brawler: Option<ParticipantBrawler>,
    /// Brawlers used, for duels.
    pub brawlers: Vec<ParticipantBrawler>,
}

impl Participant {
    /// The brawler this participant played; the first one for duels.
    #[must_use]
    pub fn primary_brawler(&self) -> Option<&ParticipantBrawler> {
        self.brawler.as_ref().or_else(|| self.brawlers.first())
    }
}

/// Brawler as reported inside a battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParticipantBrawler {
    /// Catalog id.
    pub id: i32,
    /// Name.
    pub name: String,
    /// Power level.
    pub power: i32,
    /// Brawler trophies.
    pub trophies: i32,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_decodes_api_field_names() {
        let json = serde_json::json!({
            "tag": "#2PP",
            "name": "Tester",
            "trophies": 30000,
            "highestTrophies": 31000,
            "expLevel": 200,
            "expPoints": 250000,
            "3vs3Victories": 9000,
            "soloVictories": 700,
            "duoVictories": 800,
            "club": {},
            "brawlers": [
                { "id": 16000000, "name": "SHELLY", "power": 11, "rank": 30,
                  "trophies": 1000, "highestTrophies": 1100, "gears": [] }
            ]
        });
        let Ok(snapshot) = serde_json::from_value::<PlayerSnapshot>(json) else {
            panic!("snapshot should decode");
        };
        assert_eq!(snapshot.three_vs_three_victories, 9000);
        assert_eq!(snapshot.highest_trophies, 31000);
        assert_eq!(snapshot.club(), None);
        assert_eq!(snapshot.brawlers.len(), 1);
    }

    #[test]
    fn participants_are_teams_then_players() {
        let details = BattleDetails {
            teams: vec![
                vec![Participant {
                    tag: "#A".to_string(),
                    ..Participant::default()
                }],
                vec![Participant {
                    tag: "#B".to_string(),
                    ..Participant::default()
                }],
            ],
            players: vec![Participant {
                tag: "#C".to_string(),
                ..Participant::default()
            }],
            ..BattleDetails::default()
        };
        let tags: Vec<&str> = details.participants().map(|p| p.tag.as_str()).collect();
        assert_eq!(tags, vec!["#A", "#B", "#C"]);
    }

    #[test]
    fn duel_participant_uses_first_brawler() {
        let json = serde_json::json!({
            "tag": "#A",
            "name": "A",
            "brawlers": [
                { "id": 1, "name": "FIRST", "power": 9, "trophies": 10 },
                { "id": 2, "name": "SECOND", "power": 9, "trophies": 10 }
            ]
        });
        let Ok(participant) = serde_json::from_value::<Participant>(json) else {
            panic!("participant should decode");
        };
        assert_eq!(participant.primary_brawler().map(|b| b.id), Some(1));
    }

    #[test]
    fn sparse_battle_decodes_with_defaults() {
        let json = serde_json::json!({ "battleTime": "20241114T123045.000Z" });
        let Ok(battle) = serde_json::from_value::<ExternalBattle>(json) else {
            panic!("sparse battle should decode");
        };
        assert!(battle.battle.result.is_none());
        assert!(battle.battle.teams.is_empty());
    }
}

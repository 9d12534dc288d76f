//! Read models for the roster panel and the city map.

use serde::{Deserialize, Serialize};

use crate::{Character, CharacterId, CharacterStatus, Constants, GameState, Phase, SectorId};

/// Header figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterStats {
    pub day: u32,
    pub cash: i64,
    pub global_alert: u32,
    pub active_members: u32,
    /// Mean over non-terminal members, 0 with nobody left.
    pub average_loyalty: u32,
    pub phase: Phase,
}

pub fn roster_stats(state: &GameState) -> RosterStats {
    let loyalties: Vec<u32> = state.active_members().map(|c| c.loyalty).collect();
    let average_loyalty = if loyalties.is_empty() {
        0
    } else {
        let sum: u32 = loyalties.iter().sum();
        (f64::from(sum) / loyalties.len() as f64).round() as u32
    };
    RosterStats {
        day: state.day,
        cash: state.cash,
        global_alert: state.global_alert.round() as u32,
        active_members: loyalties.len() as u32,
        average_loyalty,
        phase: state.phase,
    }
}

/// What the roster panel shows next to a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterStatus {
    Arrested,
    Executed,
    /// Joined today; orders start tomorrow.
    WaitingNew,
    OnMission,
    AwaitingReport,
}

impl RosterStatus {
    /// Only members awaiting their report can be opened for a briefing.
    pub fn selectable(self) -> bool {
        self == Self::AwaitingReport
    }
}

pub fn roster_status(member: &Character, day: u32) -> RosterStatus {
    match member.status {
        CharacterStatus::Arrested => RosterStatus::Arrested,
        CharacterStatus::Executed => RosterStatus::Executed,
        CharacterStatus::Recruited | CharacterStatus::Idle => {
            if member.recruited_on_day == day {
                RosterStatus::WaitingNew
            } else if member.action.is_some() {
                RosterStatus::OnMission
            } else {
                RosterStatus::AwaitingReport
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: CharacterId,
    pub name: String,
    pub personality: String,
    pub background: String,
    pub portrait: String,
    pub loyalty: u32,
    pub success_rate: u32,
    pub condition: u32,
    pub status: RosterStatus,
}

pub fn roster_entries(state: &GameState) -> Vec<RosterEntry> {
    state
        .roster
        .iter()
        .map(|c| RosterEntry {
            id: c.id.clone(),
            name: c.name.clone(),
            personality: c.personality.clone(),
            background: c.background.clone(),
            portrait: c.portrait.clone(),
            loyalty: c.loyalty,
            success_rate: c.success_rate,
            condition: c.condition,
            status: roster_status(c, state.day),
        })
        .collect()
}

/// Map colouring by sector alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertBand {
    Calm,
    Guarded,
    Elevated,
    High,
    Critical,
}

impl AlertBand {
    pub fn from_level(level: f64) -> Self {
        if level > 80.0 {
            Self::Critical
        } else if level > 60.0 {
            Self::High
        } else if level > 40.0 {
            Self::Elevated
        } else if level > 20.0 {
            Self::Guarded
        } else {
            Self::Calm
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorView {
    pub id: SectorId,
    pub name: String,
    pub alert: u32,
    pub band: AlertBand,
    /// Present only while the last scouting report is still fresh.
    pub scouted_info: Option<String>,
}

pub fn sector_views(state: &GameState, constants: &Constants) -> Vec<SectorView> {
    state
        .sectors
        .iter()
        .map(|sector| {
            let fresh = sector.last_scouted_day.is_some_and(|scouted| {
                state.day.saturating_sub(scouted) <= constants.scout_info_fresh_days
            });
            SectorView {
                id: sector.id,
                name: sector.name.clone(),
                alert: sector.alert_level.round() as u32,
                band: AlertBand::from_level(sector.alert_level),
                scouted_info: if fresh {
                    sector.scouted_info.clone()
                } else {
                    None
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_constants, base_state, make_character};
    use crate::Action;

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(AlertBand::from_level(0.0), AlertBand::Calm);
        assert_eq!(AlertBand::from_level(20.0), AlertBand::Calm);
        assert_eq!(AlertBand::from_level(20.5), AlertBand::Guarded);
        assert_eq!(AlertBand::from_level(60.0), AlertBand::Elevated);
        assert_eq!(AlertBand::from_level(80.0), AlertBand::High);
        assert_eq!(AlertBand::from_level(80.1), AlertBand::Critical);
    }

    #[test]
    fn roster_status_order_of_precedence() {
        let constants = base_constants();
        let mut member = make_character("t1", "Ada", &constants, 3);
        assert_eq!(roster_status(&member, 3), RosterStatus::WaitingNew);
        assert_eq!(roster_status(&member, 4), RosterStatus::AwaitingReport);
        assert!(roster_status(&member, 4).selectable());
        member.action = Some(Action::Rest);
        assert_eq!(roster_status(&member, 4), RosterStatus::OnMission);
        member.status = CharacterStatus::Arrested;
        assert_eq!(roster_status(&member, 4), RosterStatus::Arrested);
    }

    #[test]
    fn stats_ignore_terminal_members() {
        let constants = base_constants();
        let mut state = base_state(&constants);
        assert_eq!(roster_stats(&state).average_loyalty, 0);

        let mut ada = make_character("t1", "Ada", &constants, 1);
        ada.loyalty = 71;
        let mut bo = make_character("t2", "Bo", &constants, 1);
        bo.loyalty = 60;
        let mut cy = make_character("t3", "Cy", &constants, 1);
        cy.status = CharacterStatus::Arrested;
        cy.loyalty = 0;
        state.roster = vec![ada, bo, cy];

        let stats = roster_stats(&state);
        assert_eq!(stats.active_members, 2);
        assert_eq!(stats.average_loyalty, 66);
        assert_eq!(stats.global_alert, 10);
    }

    #[test]
    fn scouted_info_expires_after_a_day() {
        let constants = base_constants();
        let mut state = base_state(&constants);
        state.sectors[0].scouted_info = Some("Alert 12%, Est. Loot $2,000".to_string());
        state.sectors[0].last_scouted_day = Some(2);

        state.day = 3;
        assert!(sector_views(&state, &constants)[0].scouted_info.is_some());
        state.day = 4;
        assert!(sector_views(&state, &constants)[0].scouted_info.is_none());
    }
}

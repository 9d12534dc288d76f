use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::phase::{dismiss_report, require};
use crate::{
    Action, Character, CharacterId, CharacterStatus, Constants, GameState, NewsCategory, NewsItem,
    PendingOrder, Phase, Recruit, SectorId,
};

/// Player input, validated against the current phase before it touches state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Hire a generated member. The first hire is free.
    Recruit { id: CharacterId, recruit: Recruit },
    /// Close the recruitment screen without hiring.
    CancelRecruit,
    /// Give an order. Steal and Scout wait on the map for a target.
    AssignAction {
        character: CharacterId,
        action: Action,
    },
    SelectSector { sector: SectorId },
    CancelSectorSelection,
    DismissReport,
}

/// Validate and apply one command. On `Err` the state is untouched.
pub fn apply_command(
    state: &mut GameState,
    constants: &Constants,
    command: Command,
) -> Result<(), GameError> {
    match command {
        Command::Recruit { id, recruit } => handle_recruit(state, constants, id, recruit),
        Command::CancelRecruit => handle_cancel_recruit(state),
        Command::AssignAction { character, action } => {
            handle_assign_action(state, &character, action)
        }
        Command::SelectSector { sector } => handle_select_sector(state, sector),
        Command::CancelSectorSelection => {
            require(state, &[Phase::MapSelection], "cancelling the map")?;
            state.phase = state.phase.transition(Phase::Assignment)?;
            state.pending_order = None;
            Ok(())
        }
        Command::DismissReport => Ok(dismiss_report(state)?),
    }
}

/// What the next hire costs: nothing for the founding member.
pub fn recruitment_cost(state: &GameState, constants: &Constants) -> i64 {
    if state.roster.is_empty() {
        0
    } else {
        constants.recruitment_cost
    }
}

fn handle_recruit(
    state: &mut GameState,
    constants: &Constants,
    id: CharacterId,
    recruit: Recruit,
) -> Result<(), GameError> {
    require(state, &[Phase::Recruitment, Phase::Assignment], "recruiting")?;
    let cost = recruitment_cost(state, constants);
    if state.cash < cost {
        return Err(GameError::InsufficientFunds {
            needed: cost,
            available: state.cash,
        });
    }

    let message = format!("New member {} has joined.", recruit.name);
    state.roster.push(Character {
        id,
        name: recruit.name,
        personality: recruit.personality,
        background: recruit.background,
        portrait: recruit.portrait,
        loyalty: constants.initial_loyalty,
        success_rate: constants.initial_success_rate,
        condition: constants.initial_condition,
        dialogue: recruit.dialogue,
        opening_narration: None,
        status: CharacterStatus::Recruited,
        action: None,
        assigned_sector: None,
        recruited_on_day: state.day,
    });
    state.cash -= cost;
    state.news.insert(
        0,
        NewsItem {
            day: state.day,
            message,
            category: NewsCategory::System,
        },
    );

    if state.phase == Phase::Recruitment {
        state.phase = state.phase.transition(Phase::Assignment)?;
    }
    Ok(())
}

fn handle_cancel_recruit(state: &GameState) -> Result<(), GameError> {
    require(state, &[Phase::Recruitment, Phase::Assignment], "recruiting")?;
    if state.roster.is_empty() {
        return Err(GameError::FirstRecruitRequired);
    }
    Ok(())
}

fn handle_assign_action(
    state: &mut GameState,
    character_id: &CharacterId,
    action: Action,
) -> Result<(), GameError> {
    require(state, &[Phase::Assignment], "giving orders")?;
    let day = state.day;
    let Some(member) = state.character_mut(character_id) else {
        return Err(GameError::UnknownCharacter(character_id.clone()));
    };
    if !member.awaiting_orders(day) {
        return Err(GameError::NotEligible(character_id.clone()));
    }

    if action.needs_sector() {
        state.phase = state.phase.transition(Phase::MapSelection)?;
        state.pending_order = Some(PendingOrder {
            character: character_id.clone(),
            action,
        });
    } else {
        member.action = Some(action);
    }
    Ok(())
}

fn handle_select_sector(state: &mut GameState, sector: SectorId) -> Result<(), GameError> {
    require(state, &[Phase::MapSelection], "selecting a sector")?;
    if state.sector(sector).is_none() {
        return Err(GameError::UnknownSector(sector));
    }
    let Some(order) = state.pending_order.clone() else {
        return Err(GameError::NoPendingOrder);
    };
    let Some(member) = state.character_mut(&order.character) else {
        return Err(GameError::UnknownCharacter(order.character));
    };
    member.action = Some(order.action);
    member.assigned_sector = Some(sector);

    state.pending_order = None;
    state.phase = state.phase.transition(Phase::Assignment)?;
    Ok(())
}

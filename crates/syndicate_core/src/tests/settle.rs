use super::*;
use crate::phase::begin_end_day;

fn close_day(state: &mut GameState, rolls: ScriptedRolls) -> (DayOutcome, SettlementReport) {
    let constants = base_constants();
    begin_end_day(state).unwrap();
    let mut rolls = rolls;
    let outcome = resolve_day(state, &constants, &mut rolls);
    let report = settle_day(state, &outcome, "Quiet night.".to_string()).unwrap();
    (outcome, report)
}

#[test]
fn settle_clears_orders_and_advances() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada", "Bo"]);
    order(&mut state, "Ada", Action::Rest, None);
    order(&mut state, "Bo", Action::Scout, Some(1));

    let (_, report) = close_day(&mut state, ScriptedRolls::default());

    assert_eq!(state.day, 3);
    assert_eq!(state.phase, Phase::EndOfDay);
    for c in &state.roster {
        assert_eq!(c.action, None);
        assert_eq!(c.assigned_sector, None);
    }
    assert_eq!(report.day, 2);
    assert_eq!(report.expenses, 200);
    assert_eq!(report.net(), -200);
    assert_eq!(state.report.as_ref(), Some(&report));

    apply_command(&mut state, &constants, Command::DismissReport).unwrap();
    assert_eq!(state.phase, Phase::Assignment);
    assert!(state.report.is_none());
    assert_eq!(outstanding_orders(&state), 2);
}

#[test]
fn day_news_is_prepended_in_order() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada", "Bo"]);
    state.news.push(NewsItem {
        day: 1,
        message: "Old news".to_string(),
        category: NewsCategory::System,
    });
    order(&mut state, "Ada", Action::Rest, None);
    order(&mut state, "Bo", Action::Scout, Some(0));

    close_day(&mut state, ScriptedRolls::default());

    assert_eq!(state.news.len(), 3);
    assert!(state.news[0].message.starts_with("Ada rested"));
    assert!(state.news[1].message.starts_with("Bo scouted"));
    assert_eq!(state.news[2].message, "Old news");
}

#[test]
fn recruits_become_idle_after_their_first_night() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada"]);
    let mut fresh = make_character("thief_new", "Newt", &constants, state.day);
    fresh.status = CharacterStatus::Recruited;
    state.roster.push(fresh);
    order(&mut state, "Ada", Action::Rest, None);

    close_day(&mut state, ScriptedRolls::default());
    assert_eq!(state.roster[1].status, CharacterStatus::Idle);
    assert!(state.roster[1].awaiting_orders(state.day));
}

#[test]
fn arrested_members_lose_their_orders() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada"]);
    order(&mut state, "Ada", Action::Steal, Some(2));

    close_day(&mut state, ScriptedRolls::new([FAIL, PASS]));
    let ada = member(&state, "Ada");
    assert_eq!(ada.status, CharacterStatus::Arrested);
    assert_eq!(ada.action, None);
}

#[test]
fn bankruptcy_ends_the_game_without_a_new_day() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada"]);
    state.cash = 50;
    order(&mut state, "Ada", Action::Rest, None);

    let (outcome, report) = close_day(&mut state, ScriptedRolls::default());

    assert!(outcome.bankrupt);
    assert!(report.bankrupt);
    assert_eq!(state.phase, Phase::GameOver);
    assert_eq!(state.day, 2);
    assert_eq!(state.cash, -50);
    assert_eq!(member(&state, "Ada").condition, 100);
    assert!(!state.news.is_empty());
    assert!(apply_command(&mut state, &constants, Command::DismissReport).is_err());
}

#[test]
fn settle_requires_end_of_day() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada"]);
    let outcome = resolve_day(&mut state, &constants, &mut ScriptedRolls::default());
    assert!(settle_day(&mut state, &outcome, String::new()).is_err());
    assert_eq!(state.day, 2);
}

#[test]
fn event_summary_falls_back_to_a_quiet_day() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada", "Bo"]);
    order(&mut state, "Ada", Action::Rest, None);

    let outcome = resolve_day(&mut state, &constants, &mut ScriptedRolls::default());
    assert!(outcome.event_summary_for("Ada").starts_with("Ada rested"));
    assert_eq!(outcome.event_summary_for("Bo"), QUIET_DAY);
}

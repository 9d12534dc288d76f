use super::*;

#[test]
fn rest_adds_exactly_thirty_condition() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada"]);
    state.roster[0].condition = 40;
    order(&mut state, "Ada", Action::Rest, None);

    let outcome = resolve_day(&mut state, &constants, &mut ScriptedRolls::default());

    let ada = member(&state, "Ada");
    assert_eq!(ada.condition, 70);
    assert_eq!(ada.loyalty, 50);
    assert_eq!(ada.success_rate, 50);
    assert!(matches!(outcome.events[0], DayEvent::Rested { .. }));
}

#[test]
fn rest_caps_condition_at_one_hundred() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada"]);
    state.roster[0].condition = 85;
    order(&mut state, "Ada", Action::Rest, None);

    resolve_day(&mut state, &constants, &mut ScriptedRolls::default());
    assert_eq!(member(&state, "Ada").condition, 100);
}

#[test]
fn rest_draws_no_rolls() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada", "Bo"]);
    order(&mut state, "Ada", Action::Rest, None);
    order(&mut state, "Bo", Action::Rest, None);
    let mut rolls = ScriptedRolls::new([PASS]);

    resolve_day(&mut state, &constants, &mut rolls);
    assert_eq!(rolls.remaining(), 1);
}

#[test]
fn rest_news_line() {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada"]);
    order(&mut state, "Ada", Action::Rest, None);

    let outcome = resolve_day(&mut state, &constants, &mut ScriptedRolls::default());
    let news = outcome.news();
    assert_eq!(news.len(), 1);
    assert_eq!(
        news[0].message,
        "Ada rested and recovered their condition. (Condition +30)"
    );
    assert_eq!(news[0].category, NewsCategory::Neutral);
    assert_eq!(outcome.report_lines(), vec!["Ada took a rest.".to_string()]);
}

//! Session flows against scripted providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use syndicate_content::{
    ActionReaction, CharacterSketch, ContentError, ContentProvider, DailyBriefing,
    OfflineContentProvider, Profile, ProfileHints,
};
use syndicate_control::{narrate_day, AutoBoss, DayNarration, ControlError, OrderSource, Session};
use syndicate_core::test_fixtures::{base_constants, base_state, state_with_members, ScriptedRolls};
use syndicate_core::{Action, CharacterId, CharacterStatus, GameError, Phase, PhaseError, SectorId};

/// Failure modes a scripted provider can apply to one member's briefing.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Fault {
    Error,
    Panic,
    Hang,
}

/// Succeeds for everyone except `victim`, and counts briefing calls.
struct Scripted {
    victim: Option<(String, Fault)>,
    portrait_fails: bool,
    news_fails: bool,
    briefings: AtomicUsize,
}

impl Scripted {
    fn healthy() -> Self {
        Self {
            victim: None,
            portrait_fails: false,
            news_fails: false,
            briefings: AtomicUsize::new(0),
        }
    }

    fn failing_for(name: &str, fault: Fault) -> Self {
        Self {
            victim: Some((name.to_string(), fault)),
            ..Self::healthy()
        }
    }
}

#[async_trait]
impl ContentProvider for Scripted {
    async fn generate_profile(&self, hints: &ProfileHints) -> Result<Profile, ContentError> {
        Ok(Profile {
            name: if hints.name.is_empty() { "Vera".into() } else { hints.name.clone() },
            personality: "Sly".into(),
            background: "Ex-croupier".into(),
            dialogue: vec!["At your service.".into()],
        })
    }

    async fn generate_portrait(&self, profile: &Profile) -> Result<String, ContentError> {
        if self.portrait_fails {
            return Err(ContentError::Unavailable("no images today".into()));
        }
        Ok(format!("portrait://{}", profile.name))
    }

    async fn generate_briefing(
        &self,
        member: &CharacterSketch,
        event_summary: &str,
    ) -> Result<DailyBriefing, ContentError> {
        self.briefings.fetch_add(1, Ordering::SeqCst);
        if let Some((victim, fault)) = &self.victim {
            if *victim == member.name {
                match fault {
                    Fault::Error => return Err(ContentError::Malformed("garbage".into())),
                    Fault::Panic => panic!("provider blew up for {victim}"),
                    Fault::Hang => tokio::time::sleep(Duration::from_secs(3600)).await,
                }
            }
        }
        Ok(DailyBriefing {
            narration: format!("{} walked in smiling.", member.name),
            dialogue: vec![event_summary.to_string()],
        })
    }

    async fn generate_news_report(&self, events: &[String]) -> Result<String, ContentError> {
        if self.news_fails {
            return Err(ContentError::Api {
                status: 529,
                body: "overloaded".into(),
            });
        }
        Ok(format!("NEWS: {}", events.len()))
    }

    async fn generate_action_reaction(
        &self,
        _member: &CharacterSketch,
        _action: Action,
    ) -> Result<ActionReaction, ContentError> {
        Err(ContentError::Empty)
    }
}

fn id(name: &str) -> CharacterId {
    CharacterId(format!("thief_{}", name.to_lowercase()))
}

fn crew_session(names: &[&str]) -> Session {
    let constants = base_constants();
    let state = state_with_members(&constants, names);
    Session::new(state, constants)
}

fn rest_everyone(session: &mut Session, names: &[&str]) {
    for name in names {
        session.apply_order(&id(name), Action::Rest).unwrap();
    }
}

#[tokio::test]
async fn one_failed_briefing_does_not_touch_the_others() {
    let names = ["Ada", "Bo", "Cy"];
    for fault in [Fault::Error, Fault::Panic] {
        let mut session = crew_session(&names);
        rest_everyone(&mut session, &names);
        let provider = Arc::new(Scripted::failing_for("Bo", fault));

        let report = session
            .end_day(provider.clone(), &mut ScriptedRolls::default())
            .await
            .unwrap();

        assert_eq!(report.narration, "NEWS: 3");
        assert_eq!(provider.briefings.load(Ordering::SeqCst), 3);
        let state = session.state();
        let bo = state.character(&id("Bo")).unwrap();
        assert_eq!(bo.opening_narration.as_deref(), Some("Bo opened the office door and walked in."));
        for name in ["Ada", "Cy"] {
            let member = state.character(&id(name)).unwrap();
            assert_eq!(
                member.opening_narration.as_deref(),
                Some(format!("{name} walked in smiling.").as_str())
            );
            assert!(member.dialogue[0].starts_with(&format!("{name} rested")));
        }
    }
}

#[tokio::test(start_paused = true)]
async fn hung_briefing_times_out_into_a_fallback() {
    let names = ["Ada", "Bo"];
    let mut session = crew_session(&names).with_content_timeout(Some(Duration::from_secs(5)));
    rest_everyone(&mut session, &names);
    let provider = Arc::new(Scripted::failing_for("Ada", Fault::Hang));

    session
        .end_day(provider, &mut ScriptedRolls::default())
        .await
        .unwrap();

    let ada = session.state().character(&id("Ada")).unwrap();
    assert_eq!(ada.opening_narration.as_deref(), Some("Ada opened the office door and walked in."));
    let bo = session.state().character(&id("Bo")).unwrap();
    assert_eq!(bo.opening_narration.as_deref(), Some("Bo walked in smiling."));
}

#[tokio::test]
async fn commands_are_refused_while_the_day_is_narrated() {
    let names = ["Ada"];
    let mut session = crew_session(&names);
    rest_everyone(&mut session, &names);

    let pending = session.begin_day(&mut ScriptedRolls::default()).unwrap();
    assert_eq!(session.state().phase, Phase::EndOfDay);
    assert_eq!(session.state().day, 2);
    assert!(session.check_can_recruit().is_err());
    assert!(session.dismiss_report().is_err());

    let provider: Arc<dyn ContentProvider> = Arc::new(Scripted::healthy());
    let narration = narrate_day(provider, &pending, None).await;
    let report = session.commit_day(pending, narration).unwrap();

    assert_eq!(report.day, 2);
    assert_eq!(session.state().day, 3);
    session.dismiss_report().unwrap();
    assert_eq!(session.state().phase, Phase::Assignment);
}

#[tokio::test]
async fn briefing_is_consumed_once() {
    let names = ["Ada"];
    let mut session = crew_session(&names);
    rest_everyone(&mut session, &names);
    session
        .end_day(Arc::new(Scripted::healthy()), &mut ScriptedRolls::default())
        .await
        .unwrap();
    session.dismiss_report().unwrap();

    let first = session.open_briefing(&id("Ada")).unwrap();
    assert_eq!(first.narration, "Ada walked in smiling.");
    let second = session.open_briefing(&id("Ada")).unwrap();
    assert_eq!(second.narration, "Ada stood before you.");
    assert_eq!(first.dialogue, second.dialogue);
}

#[tokio::test]
async fn bankrupt_day_skips_briefings_and_ends_the_game() {
    let names = ["Ada", "Bo"];
    let mut session = crew_session(&names);
    rest_everyone(&mut session, &names);
    let pending = session.begin_day(&mut ScriptedRolls::default()).unwrap();
    assert_eq!(pending.requests().len(), 2);
    let narration = DayNarration {
        news: String::new(),
        briefings: Vec::new(),
    };
    session.commit_day(pending, narration).unwrap();
    session.dismiss_report().unwrap();

    // Drain the bank, then rest again.
    let mut state = session.into_state();
    state.cash = 100;
    let mut session = Session::new(state, base_constants());
    rest_everyone(&mut session, &names);
    let provider = Arc::new(Scripted::healthy());
    let report = session
        .end_day(provider.clone(), &mut ScriptedRolls::default())
        .await
        .unwrap();

    assert!(report.bankrupt);
    assert!(session.is_over());
    assert_eq!(provider.briefings.load(Ordering::SeqCst), 0);
    assert!(matches!(
        session.dismiss_report(),
        Err(ControlError::Game(GameError::Phase(PhaseError::GameOver)))
    ));
}

#[tokio::test]
async fn failed_news_falls_back_to_the_event_digest() {
    let names = ["Ada", "Bo"];
    let mut session = crew_session(&names);
    rest_everyone(&mut session, &names);
    let provider = Arc::new(Scripted {
        news_fails: true,
        ..Scripted::healthy()
    });

    let report = session
        .end_day(provider, &mut ScriptedRolls::default())
        .await
        .unwrap();

    assert_eq!(
        report.narration,
        "KNIGHTLY NEWS. Last night in brief: Ada took a rest. Bo took a rest."
    );
    let bo = session.state().character(&id("Bo")).unwrap();
    assert_eq!(bo.opening_narration.as_deref(), Some("Bo walked in smiling."));
}

#[tokio::test]
async fn quiet_night_uses_the_fixed_broadcast() {
    let constants = base_constants();
    let mut session = Session::new(base_state(&constants), constants);
    let report = session
        .end_day(Arc::new(Scripted::healthy()), &mut ScriptedRolls::default())
        .await
        .unwrap();
    assert_eq!(report.narration, "The city was quiet last night. Too quiet.");
}

#[tokio::test]
async fn recruitment_flow() {
    let constants = base_constants();
    let mut state = base_state(&constants);
    state.phase = Phase::Recruitment;
    let mut session = Session::new(state, constants);
    let provider = Scripted::healthy();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    assert!(matches!(
        session.cancel_recruit(),
        Err(ControlError::Game(GameError::FirstRecruitRequired))
    ));

    let candidate = session
        .draft_recruit(&provider, &ProfileHints::default())
        .await
        .unwrap();
    assert_eq!(candidate.portrait, "portrait://Vera");
    let vera = session.confirm_recruit(candidate, &mut rng).unwrap();
    assert!(vera.0.starts_with("thief_"));
    assert_eq!(session.state().phase, Phase::Assignment);
    assert_eq!(session.state().cash, 5_000);

    let candidate = session
        .draft_recruit(&provider, &ProfileHints { name: "Max".into(), ..ProfileHints::default() })
        .await
        .unwrap();
    session.confirm_recruit(candidate, &mut rng).unwrap();
    assert_eq!(session.state().cash, 4_500);
    assert_eq!(session.stats().active_members, 2);
    session.cancel_recruit().unwrap();
}

#[tokio::test]
async fn portrait_failure_abandons_the_draft() {
    let constants = base_constants();
    let session = Session::new(base_state(&constants), constants);
    let provider = Scripted {
        portrait_fails: true,
        ..Scripted::healthy()
    };
    let err = session
        .draft_recruit(&provider, &ProfileHints::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ControlError::Portrait(_)));
    assert!(session.state().roster.is_empty());
    assert_eq!(session.state().phase, Phase::Assignment);
}

#[tokio::test]
async fn broke_syndicate_cannot_draft() {
    let mut session = crew_session(&["Ada"]);
    let mut state = session.into_state();
    state.cash = 100;
    session = Session::new(state, base_constants());
    let err = session
        .draft_recruit(&OfflineContentProvider::new(), &ProfileHints::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ControlError::Game(GameError::InsufficientFunds { needed: 500, available: 100 })
    ));
}

#[tokio::test]
async fn orders_get_a_reaction_even_when_the_provider_fails() {
    let mut session = crew_session(&["Ada"]);
    let receipt = session
        .issue_order(&Scripted::healthy(), &id("Ada"), Action::Steal)
        .await
        .unwrap();
    assert!(receipt.awaiting_sector);
    assert_eq!(receipt.reaction.dialogue, "Leave it to me. I won't disappoint.");
    assert_eq!(session.state().phase, Phase::MapSelection);

    session.select_sector(SectorId(2)).unwrap();
    let ada = session.state().character(&id("Ada")).unwrap();
    assert_eq!(ada.assigned_sector, Some(SectorId(2)));
    assert!(session.can_end_day());
}

#[tokio::test]
async fn autoboss_plays_a_week_offline() {
    let names = ["Ada", "Bo", "Cy"];
    let mut session = crew_session(&names);
    let provider: Arc<dyn ContentProvider> = Arc::new(OfflineContentProvider::new());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for _ in 0..7 {
        if session.is_over() {
            break;
        }
        let orders = AutoBoss.next_orders(session.state(), session.constants());
        for order in &orders {
            session.give_order(order).unwrap();
        }
        assert!(session.can_end_day());
        session.end_day(Arc::clone(&provider), &mut rng).await.unwrap();
        if !session.is_over() {
            session.dismiss_report().unwrap();
        }
    }

    let state = session.state();
    assert!(state.day > 2);
    for member in &state.roster {
        assert!(member.action.is_none());
        if member.status != CharacterStatus::Idle {
            assert!(member.status.is_terminal());
        }
    }
}

#[tokio::test]
async fn generated_city_first_night() {
    let constants = base_constants();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let city = syndicate_world::build_initial_state(&constants, 9, &mut rng);
    let mut session = Session::new(city, constants);
    assert_eq!(session.state().phase, Phase::Recruitment);
    assert_eq!(session.state().sectors.len(), 16);

    let candidate = session
        .draft_recruit(&Scripted::healthy(), &ProfileHints::default())
        .await
        .unwrap();
    let vera = session.confirm_recruit(candidate, &mut rng).unwrap();
    assert_eq!(session.state().cash, 5_000);

    // Hired today: no orders until tomorrow, but the wage is due tonight.
    assert!(session.can_end_day());
    let provider: Arc<dyn ContentProvider> = Arc::new(Scripted::healthy());
    let report = session.end_day(provider, &mut rng).await.unwrap();
    assert_eq!(report.expenses, 100);
    session.dismiss_report().unwrap();

    assert_eq!(session.state().day, 2);
    assert_eq!(session.state().cash, 4_900);
    assert!(session.state().character(&vera).unwrap().awaiting_orders(2));
}

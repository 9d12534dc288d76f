//! Terminal front end: one command per line on stdin.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rand_chacha::ChaCha8Rng;
use syndicate_content::{ContentProvider, ProfileHints};
use syndicate_control::{Candidate, ControlError, Session};
use syndicate_core::views::RosterStatus;
use syndicate_core::{format_amount, recruitment_cost, Action, Phase, SectorId};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{print_report, print_status};

const HELP: &str = "\
commands:
  recruit [name]      draft a new member (hire / pass to decide)
  hire | pass         confirm or discard the drafted member
  roster              list members
  map                 list sectors
  talk <n>            hear member n's morning report
  order <n> <action>  rest | steal | scout | execute
  sector <letter>     pick the target for a pending steal/scout
  back                leave the map without choosing
  end                 end the day
  ok                  close the settlement report
  news                last ten headlines
  save                write the game to the save directory
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Recruit(String),
    Hire,
    Pass,
    Roster,
    Map,
    Talk(usize),
    Order(usize, Action),
    Sector(u32),
    Back,
    End,
    Dismiss,
    News,
    Save,
    Help,
    Quit,
}

fn parse_action(word: &str) -> Option<Action> {
    Action::ALL
        .into_iter()
        .find(|a| a.label().eq_ignore_ascii_case(word))
}

/// Sector letter (A..Z) to its id.
fn parse_sector(word: &str) -> Option<u32> {
    let mut chars = word.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !letter.is_ascii_uppercase() {
        return None;
    }
    Some(u32::from(letter) - u32::from('A'))
}

/// Members are numbered from 1 on screen.
fn parse_index(word: Option<&str>) -> Option<usize> {
    word?.parse::<usize>().ok()?.checked_sub(1)
}

fn parse_line(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let input = match words.next()?.to_ascii_lowercase().as_str() {
        "recruit" => Input::Recruit(words.collect::<Vec<_>>().join(" ")),
        "hire" => Input::Hire,
        "pass" => Input::Pass,
        "roster" => Input::Roster,
        "map" => Input::Map,
        "talk" => Input::Talk(parse_index(words.next())?),
        "order" => {
            let index = parse_index(words.next())?;
            Input::Order(index, parse_action(words.next()?)?)
        }
        "sector" => Input::Sector(parse_sector(words.next()?)?),
        "back" => Input::Back,
        "end" => Input::End,
        "ok" => Input::Dismiss,
        "news" => Input::News,
        "save" => Input::Save,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => return None,
    };
    Some(input)
}

fn status_label(status: RosterStatus) -> &'static str {
    match status {
        RosterStatus::Arrested => "arrested",
        RosterStatus::Executed => "executed",
        RosterStatus::WaitingNew => "new, starts tomorrow",
        RosterStatus::OnMission => "on a job",
        RosterStatus::AwaitingReport => "waiting for orders",
    }
}

fn print_roster(session: &Session) {
    for (i, entry) in session.roster().iter().enumerate() {
        println!(
            "{:>2}. {:<16} {:<12} {:<16} loyalty {:>3}  skill {:>3}  condition {:>3}  [{}]",
            i + 1,
            entry.name,
            entry.personality,
            entry.background,
            entry.loyalty,
            entry.success_rate,
            entry.condition,
            status_label(entry.status),
        );
    }
}

fn print_map(session: &Session) {
    for view in session.sector_views() {
        let intel = view.scouted_info.as_deref().unwrap_or("-");
        let band = format!("{:?}", view.band);
        println!("{:<10} alert {:>3}% {band:<9} {intel}", view.name, view.alert);
    }
}

fn print_error(e: &ControlError) {
    println!("! {e}");
}

pub(crate) async fn run(
    mut session: Session,
    mut rng: ChaCha8Rng,
    provider: Arc<dyn ContentProvider>,
    save_dir: &Path,
) -> Result<()> {
    println!("{HELP}");
    print_status(&session);
    if session.state().phase == Phase::Recruitment {
        println!("Your syndicate has no members. Start with `recruit`.");
    }

    let mut draft: Option<Candidate> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let Some(input) = parse_line(&line) else {
            if !line.trim().is_empty() {
                println!("? unknown command, try `help`");
            }
            continue;
        };

        match input {
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Roster => print_roster(&session),
            Input::Map => print_map(&session),
            Input::News => {
                for item in session.news().iter().take(10) {
                    println!("day {:>3} [{:?}] {}", item.day, item.category, item.message);
                }
            }
            Input::Recruit(name) => {
                let hints = ProfileHints {
                    name,
                    ..ProfileHints::default()
                };
                match session.draft_recruit(provider.as_ref(), &hints).await {
                    Ok(candidate) => {
                        let cost = recruitment_cost(session.state(), session.constants());
                        println!(
                            "{} ({}, {}) for ${}",
                            candidate.profile.name,
                            candidate.profile.personality,
                            candidate.profile.background,
                            format_amount(cost),
                        );
                        for line in &candidate.profile.dialogue {
                            println!("  \"{line}\"");
                        }
                        println!("hire or pass?");
                        draft = Some(candidate);
                    }
                    Err(e) => print_error(&e),
                }
            }
            Input::Hire => match draft.take() {
                Some(candidate) => match session.confirm_recruit(candidate, &mut rng) {
                    Ok(_) => print_status(&session),
                    Err(e) => print_error(&e),
                },
                None => println!("! nobody drafted, use `recruit` first"),
            },
            Input::Pass => {
                draft = None;
                if let Err(e) = session.cancel_recruit() {
                    print_error(&e);
                }
            }
            Input::Talk(index) => {
                let Some(id) = session.state().roster.get(index).map(|c| c.id.clone()) else {
                    println!("! no member #{}", index + 1);
                    continue;
                };
                match session.open_briefing(&id) {
                    Ok(briefing) => {
                        println!("{}", briefing.narration);
                        for line in &briefing.dialogue {
                            println!("  {}: \"{line}\"", briefing.name);
                        }
                    }
                    Err(e) => print_error(&e),
                }
            }
            Input::Order(index, action) => {
                let Some(id) = session.state().roster.get(index).map(|c| c.id.clone()) else {
                    println!("! no member #{}", index + 1);
                    continue;
                };
                match session.issue_order(provider.as_ref(), &id, action).await {
                    Ok(receipt) => {
                        println!("  \"{}\"", receipt.reaction.dialogue);
                        println!("{}", receipt.reaction.narration);
                        if receipt.awaiting_sector {
                            print_map(&session);
                            println!("pick a target with `sector <letter>` or `back`");
                        }
                    }
                    Err(e) => print_error(&e),
                }
            }
            Input::Sector(index) => match session.select_sector(SectorId(index)) {
                Ok(()) if session.can_end_day() => println!("Everyone has orders. `end` when ready."),
                Ok(()) => {}
                Err(e) => print_error(&e),
            },
            Input::Back => {
                if let Err(e) = session.cancel_sector_selection() {
                    print_error(&e);
                }
            }
            Input::End => match session.end_day(Arc::clone(&provider), &mut rng).await {
                Ok(report) => {
                    print_report(&report);
                    print_status(&session);
                }
                Err(e) => print_error(&e),
            },
            Input::Dismiss => match session.dismiss_report() {
                Ok(()) => print_status(&session),
                Err(e) => print_error(&e),
            },
            Input::Save => match syndicate_world::save_state(save_dir, session.state()) {
                Ok(path) => println!("saved to {}", path.display()),
                Err(e) => {
                    tracing::error!(error = %e, "save failed");
                    println!("! save failed: {e:#}");
                }
            },
        }
    }
    Ok(())
}

//! Gloomdelve - Entry Point
//!
//! Headless runner: builds a run from a seed, lets a simple autopilot play
//! it for a number of turns, then prints the floor and the message log.
//!
//! Usage: `gloomdelve [seed] [turns]`

use std::fs::OpenOptions;

use anyhow::{Context, Result};

use gloomdelve::data::DataManager;
use gloomdelve::entities::Position;
use gloomdelve::world::map::NEIGHBOURS;
use gloomdelve::{ActionError, ActionOutcome, GameSession};

const DEFAULT_TURNS: u64 = 200;

fn main() -> Result<()> {
    // Log to a file so the printed map stays readable
    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Ok(log_file) = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("gloomdelve.log")
    {
        logger.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    logger.init();

    log::info!("Starting Gloomdelve v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg.parse::<u64>().with_context(|| format!("invalid seed '{}'", arg))?,
        None => rand::random(),
    };
    let turns = match args.next() {
        Some(arg) => arg.parse::<u64>().with_context(|| format!("invalid turn count '{}'", arg))?,
        None => DEFAULT_TURNS,
    };

    let mut session = GameSession::new(seed, DataManager::new());
    run_autopilot(&mut session, turns);
    print_report(&session);

    log::info!("Gloomdelve shut down cleanly");
    Ok(())
}

/// Play until the turn budget runs out or the player dies
fn run_autopilot(session: &mut GameSession, turns: u64) {
    let mut wasted = 0;
    while session.turn() < turns && !session.is_game_over() {
        match autopilot_step(session) {
            Ok(outcome) => {
                wasted = 0;
                log::debug!("autopilot: {:?}", outcome);
            }
            Err(e) => {
                log::debug!("autopilot action refused: {}", e);
                wasted += 1;
                if wasted > 8 {
                    wasted = 0;
                    if let Err(e) = session.wait() {
                        log::warn!("autopilot stuck: {}", e);
                        break;
                    }
                }
            }
        }
    }
}

/// One decision: fight what is adjacent, shoot what is visible, otherwise
/// head for the stairs
fn autopilot_step(session: &mut GameSession) -> Result<ActionOutcome, ActionError> {
    let me = session.player().position;

    let adjacent = session
        .living_monsters()
        .find(|m| m.position.is_adjacent(&me))
        .map(|m| m.position);
    if let Some(target) = adjacent {
        return session.move_player(target.x - me.x, target.y - me.y);
    }

    let ranged = session.player().ranged;
    if ranged.active {
        return session.fire(None);
    }
    let map = session.map();
    let sees_monster = session
        .living_monsters()
        .any(|m| map.is_visible(m.position.x, m.position.y));
    if sees_monster && session.player().has_energy_for_shot() {
        if let Ok(outcome) = session.toggle_ranged_mode() {
            return Ok(outcome);
        }
    }

    if session.map().stairs_pos == Some(me) {
        return session.descend();
    }

    let goal = session.map().stairs_pos.unwrap_or(session.map().start_pos);
    match step_towards(session, me, goal) {
        Some((dx, dy)) => session.move_player(dx, dy),
        None => session.wait(),
    }
}

/// Neighbour offset that gets closest to `goal`, doors included
fn step_towards(session: &GameSession, from: Position, goal: Position) -> Option<(i32, i32)> {
    let map = session.map();
    NEIGHBOURS
        .iter()
        .copied()
        .filter(|(dx, dy)| {
            let next = from.offset(*dx, *dy);
            (map.is_walkable(next.x, next.y) || map.is_closed_door(next.x, next.y)) && !session.is_occupied(next)
        })
        .min_by_key(|(dx, dy)| from.offset(*dx, *dy).distance_squared(&goal))
}

fn print_report(session: &GameSession) {
    println!(
        "Seed {} | floor {} | turn {} | {:?}",
        session.seed(),
        session.floor(),
        session.turn(),
        session.state()
    );
    let player = session.player();
    println!(
        "{} - level {} - HP {}/{} - energy {} - codex {}",
        player.name,
        player.level(),
        player.health.current,
        player.health.max,
        player.ranged.energy,
        player.codex_points
    );
    println!();

    let mut rows: Vec<Vec<char>> = session.map().to_ascii().iter().map(|row| row.chars().collect()).collect();
    for monster in session.living_monsters() {
        if let Some(cell) = rows
            .get_mut(monster.position.y as usize)
            .and_then(|row| row.get_mut(monster.position.x as usize))
        {
            *cell = monster.glyph;
        }
    }
    if let Some(cell) = rows
        .get_mut(player.position.y as usize)
        .and_then(|row| row.get_mut(player.position.x as usize))
    {
        *cell = player.glyph;
    }
    for row in rows {
        println!("{}", row.into_iter().collect::<String>());
    }

    println!();
    for message in session.messages().iter().rev().take(20).rev() {
        println!("[{:>4}] {}", message.turn, message.text);
    }
}

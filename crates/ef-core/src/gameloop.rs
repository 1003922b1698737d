//! The simulation state and the turn scheduler.
//!
//! One scheduler pass is: grant energy to everyone, let every actor at or
//! over [`ENERGY_TO_ACT`] act (monsters with more banked energy than the
//! player go first), run the per-tick monster timers, run the world-event
//! sweep on every tenth tick, advance the clock. The loop exits mid-pass
//! whenever `flags.leaving` goes up; nothing is rolled back.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::action::cycle::player_turn;
use crate::action::{Command, CommandSource};
use crate::consts::ENERGY_TO_ACT;
use crate::monster::{Monster, MonsterArena, MonsterId};
use crate::player::status::{StatusDelta, StatusKind};
use crate::player::Player;
use crate::rng::GameRng;
use crate::world::clock::{ClosingStage, WorldClock};
use crate::world::flags::{Flags, RedrawFlags};
use crate::world::level::Level;
use crate::world::options::Options;
use crate::world::process::process_world;
use crate::world::save::{save_game, timestamp};

/// The whole simulation, passed explicitly to every scheduler and sweep
/// function. No global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub player: Player,
    pub monsters: MonsterArena,
    pub level: Level,
    pub clock: WorldClock,
    pub flags: Flags,
    pub options: Options,
    pub rng: GameRng,

    /// Last closing-time stage already announced.
    pub closing_seen: ClosingStage,
    /// Depth to enter once the current level is left (None: game over).
    pub pending_depth: Option<u32>,
    /// Command being repeated by `Activity::Repeating`.
    pub repeat_command: Option<Command>,
    /// Wall-clock time of the last save, carried in the save itself.
    pub saved_at: String,

    /// Accumulated display-refresh bits, drained by the UI.
    #[serde(skip)]
    pub redraw: RedrawFlags,
    /// Messages pending display.
    #[serde(skip)]
    pub messages: Vec<String>,
    /// Everything ever said, for the message-history window.
    #[serde(skip)]
    pub message_history: Vec<String>,
    /// Where saves go; None disables saving entirely (tests).
    #[serde(skip)]
    pub save_path: Option<PathBuf>,
}

impl SimulationState {
    /// A fresh game in the town, with a seeded RNG.
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            player: Player::new(name),
            monsters: MonsterArena::new(),
            level: Level::town(0),
            clock: WorldClock::new(),
            flags: Flags::default(),
            options: Options::default(),
            rng: GameRng::new(seed),
            closing_seen: ClosingStage::Open,
            pending_depth: None,
            repeat_command: None,
            saved_at: String::new(),
            redraw: RedrawFlags::empty(),
            messages: Vec::new(),
            message_history: Vec::new(),
            save_path: None,
        }
    }

    /// Queue a message for the UI.
    pub fn message(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.messages.push(msg.clone());
        self.message_history.push(msg);
    }

    /// Drain the pending messages (UI side).
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    /// Stop any multi-turn activity and raise the disturb signal.
    pub fn disturb(&mut self) {
        self.player.cancel_activity();
        self.player.searching = false;
        self.repeat_command = None;
        self.flags.disturb();
        self.redraw |= RedrawFlags::STATE;
    }

    fn notify_status(&mut self, kind: StatusKind, delta: StatusDelta) {
        if delta.started {
            if let Some(msg) = kind.start_message() {
                self.message(msg);
            }
        }
        if delta.ended {
            if let Some(msg) = kind.end_message() {
                self.message(msg);
            }
        }
        if delta.changed() {
            self.disturb();
            self.redraw |= match kind {
                StatusKind::Poisoned => RedrawFlags::POISON,
                StatusKind::Stunned => RedrawFlags::STUN,
                StatusKind::Cut => RedrawFlags::CUT,
                StatusKind::Fast | StatusKind::Slow => RedrawFlags::SPEED | RedrawFlags::STATUS,
                _ => RedrawFlags::STATUS,
            };
        }
    }

    /// Set a timed status, emitting the start/end notice exactly once.
    pub fn set_timed(&mut self, kind: StatusKind, value: i32) -> StatusDelta {
        let delta = self.player.statuses.set(kind, value);
        self.notify_status(kind, delta);
        delta
    }

    /// Extend a timed status.
    pub fn set_timed_add(&mut self, kind: StatusKind, by: i32) -> StatusDelta {
        let delta = self.player.statuses.add(kind, by);
        self.notify_status(kind, delta);
        delta
    }

    /// Reduce a timed status, emitting the end notice if it runs out.
    pub fn dec_timed(&mut self, kind: StatusKind, by: i32) -> StatusDelta {
        let delta = self.player.statuses.dec(kind, by);
        self.notify_status(kind, delta);
        delta
    }

    /// Damage the player. Death sets `leaving` and ends the run.
    pub fn take_hit(&mut self, dam: i32, what: &str) {
        if dam <= 0 || self.player.is_dead {
            return;
        }
        self.player.chp -= dam;
        self.redraw |= RedrawFlags::HP;
        self.disturb();
        if self.player.chp < 0 {
            self.player.is_dead = true;
            self.flags.leaving = true;
            self.pending_depth = None;
            self.message(format!("You die from {}.", what));
        }
    }

    /// Ask the arena for a slot. Failure is silent outside wizard mode.
    pub fn spawn_monster(&mut self, monster: Monster) -> Option<MonsterId> {
        let id = self.monsters.insert(monster);
        if id.is_none() && self.options.wizard {
            self.message("(wizard) monster allocation failed: arena full");
        }
        id
    }

    /// Move the player onto a new level.
    ///
    /// Energy fairness rule: the player's energy is set to the action
    /// threshold and raised to the highest monster energy present, so the
    /// player never loses the first action on arrival.
    pub fn enter_level(&mut self, level: Level) {
        self.level = level;
        self.flags.leaving = false;
        let max_monster = self
            .monsters
            .iter()
            .map(|(_, m)| m.energy)
            .max()
            .unwrap_or(0);
        self.player.energy = ENERGY_TO_ACT.max(max_monster);
        self.redraw |= RedrawFlags::MAP;
    }
}

/// Drives the scheduler against one command source.
pub struct GameLoop<I: CommandSource> {
    pub state: SimulationState,
    pub input: I,
}

impl<I: CommandSource> GameLoop<I> {
    pub fn new(state: SimulationState, input: I) -> Self {
        Self { state, input }
    }

    /// Run scheduler passes until the current level is left.
    pub fn run_level(&mut self) {
        while !self.state.flags.leaving {
            self.grant_energy();
            self.actors_act();
            if self.state.flags.leaving {
                break;
            }
            self.monster_timers();
            if self.state.clock.is_sweep_turn() {
                process_world(&mut self.state);
            }
            self.handle_save_request();
            self.state.clock.advance();
        }
    }

    /// Run until the player quits or dies, following level transitions.
    pub fn run(&mut self) {
        loop {
            self.run_level();
            if self.state.flags.quitting || self.state.player.is_dead {
                break;
            }
            match self.state.pending_depth.take() {
                Some(0) => {
                    let level = Level::town(self.state.clock.turn());
                    self.state.monsters = MonsterArena::new();
                    self.state.enter_level(level);
                }
                Some(depth) => {
                    let danger = self.state.rng.randint1(9) as u8;
                    let level = Level::cave(depth, self.state.clock.turn(), danger);
                    self.state.monsters = MonsterArena::new();
                    self.state.enter_level(level);
                }
                None => break,
            }
        }
        if self.state.flags.save_requested || self.state.flags.forced_quit {
            self.handle_save_request();
        }
    }

    fn grant_energy(&mut self) {
        self.state.player.energy += self.state.player.energy_gain();
        let ids = self.state.monsters.ids();
        for id in ids {
            if let Some(m) = self.state.monsters.get_mut(id) {
                m.energy += m.energy_gain();
            }
        }
    }

    /// Let everyone over the threshold act. Monsters with strictly more
    /// banked energy than the player go first, highest energy first.
    fn actors_act(&mut self) {
        while self.state.player.energy >= ENERGY_TO_ACT && !self.state.flags.leaving {
            for id in self.state.monsters.ids_above_energy(self.state.player.energy) {
                self.monster_turn(id);
                if self.state.flags.leaving {
                    return;
                }
            }
            player_turn(&mut self.state, &mut self.input);
            self.state.player.energy -= self.state.player.energy_use;
            self.state.player.energy_use = 0;
        }
        // Monsters faster than a below-threshold player still spend their
        // banked actions before the tick completes.
        loop {
            let ids = self.state.monsters.ids_above_energy(ENERGY_TO_ACT - 1);
            if ids.is_empty() {
                return;
            }
            for id in ids {
                self.monster_turn(id);
                if self.state.flags.leaving {
                    return;
                }
            }
        }
    }

    fn monster_turn(&mut self, id: MonsterId) {
        let Some(monster) = self.state.monsters.get_mut(id) else {
            return;
        };
        monster.energy -= ENERGY_TO_ACT;

        if !monster.can_act() {
            return;
        }
        if monster.stunned > 0 && self.state.rng.percent(50) {
            return;
        }

        let mpos = monster.pos;
        let ppos = self.state.player.pos;
        let afraid = monster.afraid > 0;
        let confused = monster.confused > 0;
        let sides = monster.damage_sides;
        let name = monster.name.clone();

        if afraid {
            // Flee: step directly away.
            let dx = (mpos.x - ppos.x).signum();
            let dy = (mpos.y - ppos.y).signum();
            if let Some(m) = self.state.monsters.get_mut(id) {
                m.pos.x += dx;
                m.pos.y += dy;
            }
            return;
        }

        if confused {
            let dx = self.state.rng.randint0(3) - 1;
            let dy = self.state.rng.randint0(3) - 1;
            if let Some(m) = self.state.monsters.get_mut(id) {
                m.pos.x += dx;
                m.pos.y += dy;
            }
            return;
        }

        if mpos.distance(ppos) <= 1 {
            let dam = self.state.rng.randint1(sides);
            self.state.message(format!("The {} hits you!", name));
            self.state.take_hit(dam, format!("a {}", name).as_str());
        } else {
            let dx = (ppos.x - mpos.x).signum();
            let dy = (ppos.y - mpos.y).signum();
            if let Some(m) = self.state.monsters.get_mut(id) {
                m.pos.x += dx;
                m.pos.y += dy;
            }
            if self.state.options.disturb_near && mpos.distance(ppos) <= 5 {
                self.state.disturb();
            }
        }
    }

    /// Per-tick monster timed counters (the sweep only handles the player).
    fn monster_timers(&mut self) {
        let ppos = self.state.player.pos;
        for id in self.state.monsters.ids() {
            if let Some(m) = self.state.monsters.get_mut(id) {
                if m.sleep > 0 && m.pos.distance(ppos) <= 10 {
                    m.sleep = (m.sleep - 1).max(0);
                }
                m.stunned = (m.stunned - 1).max(0);
                m.confused = (m.confused - 1).max(0);
                m.afraid = (m.afraid - 1).max(0);
            }
        }
    }

    fn handle_save_request(&mut self) {
        if !self.state.flags.save_requested {
            return;
        }
        self.state.flags.save_requested = false;
        let Some(path) = self.state.save_path.clone() else {
            return;
        };
        self.state.saved_at = timestamp();
        if let Err(err) = save_game(&self.state, &path) {
            self.state.message(format!("Save failed: {}", err));
        }
        if self.state.flags.forced_quit {
            self.state.flags.quitting = true;
            self.state.flags.leaving = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ScriptedInput;
    use crate::consts::NORMAL_SPEED;
    use crate::world::level::Pos;

    fn quiet_loop(commands: Vec<Command>) -> GameLoop<ScriptedInput> {
        let state = SimulationState::new("tester", 1);
        GameLoop::new(state, ScriptedInput::new(commands))
    }

    #[test]
    fn energy_accumulates_to_threshold_in_five_ticks() {
        let mut state = SimulationState::new("tester", 1);
        state.player.base_speed = NORMAL_SPEED + 10;
        state.player.energy = 0;
        for _ in 0..5 {
            state.player.energy += state.player.energy_gain();
        }
        assert_eq!(state.player.energy, 100);
    }

    #[test]
    fn entry_energy_matches_fastest_monster() {
        let mut state = SimulationState::new("tester", 1);
        let mut m = Monster::new("wight", Pos::new(5, 5));
        m.energy = 160;
        state.spawn_monster(m);
        state.enter_level(Level::cave(3, 0, 1));
        assert_eq!(state.player.energy, 160);

        state.monsters = MonsterArena::new();
        state.enter_level(Level::cave(4, 0, 1));
        assert_eq!(state.player.energy, ENERGY_TO_ACT);
    }

    #[test]
    fn quit_command_exits_the_level_loop() {
        let mut game = quiet_loop(vec![Command::Quit]);
        game.run_level();
        assert!(game.state.flags.quitting);
    }

    #[test]
    fn death_sets_leaving() {
        let mut state = SimulationState::new("tester", 1);
        state.player.chp = 2;
        state.take_hit(5, "testing");
        assert!(state.player.is_dead);
        assert!(state.flags.leaving);
    }

    #[test]
    fn requested_save_is_stamped_and_written() {
        let dir = std::env::temp_dir().join("ef-loop-save-test");
        let path = dir.join("stamped.sav");

        let mut game = quiet_loop(vec![Command::Save, Command::Quit]);
        game.state.save_path = Some(path.clone());
        game.run();

        let loaded = crate::world::save::load_game(&path).unwrap();
        assert!(!loaded.saved_at.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn status_notices_fire_once() {
        let mut state = SimulationState::new("tester", 1);
        state.set_timed(StatusKind::Afraid, 5);
        state.set_timed(StatusKind::Afraid, 3);
        state.dec_timed(StatusKind::Afraid, 10);
        state.dec_timed(StatusKind::Afraid, 1);
        let history = state.message_history.join("\n");
        assert_eq!(history.matches("You are terrified!").count(), 1);
        assert_eq!(history.matches("You feel bolder now.").count(), 1);
    }
}

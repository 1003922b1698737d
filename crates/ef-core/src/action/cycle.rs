//! One player turn.
//!
//! Order per invocation: resolve interrupts (rest-termination conditions,
//! keypress polls, the disturb signal), force the pack back under capacity,
//! then execute exactly one energy-consuming command. Commands that cannot
//! resolve cost nothing and the dispatcher re-polls immediately.

use crate::consts::{ENERGY_TO_ACT, INVEN_PACK, MIN_ENERGY_USE, REST_POLL_INTERVAL};
use crate::gameloop::SimulationState;
use crate::magic::cast::cast_spell;
use crate::object::{ObjectFlags, ObjectKind};
use crate::player::status::StatusKind;
use crate::player::{Activity, RestMode};
use crate::world::flags::RedrawFlags;
use crate::world::level::Pos;

use super::{ActionOutcome, Command, CommandSource};

/// Resolve one player turn and set `player.energy_use`.
pub fn player_turn<I: CommandSource>(state: &mut SimulationState, input: &mut I) {
    state.player.energy_use = 0;

    // Paralysis and knockout consume the turn outright.
    if state.player.statuses.has(StatusKind::Paralyzed) {
        state.player.energy_use = ENERGY_TO_ACT;
        return;
    }

    resolve_interrupts(state, input);
    handle_pack_overflow(state);

    loop {
        if state.flags.leaving || state.flags.quitting {
            return;
        }
        let command = match auto_command(state) {
            Some(cmd) => cmd,
            None => input.next_command(state),
        };
        match dispatch(state, command) {
            ActionOutcome::Energy(cost) => {
                state.player.energy_use = cost.max(MIN_ENERGY_USE);
                return;
            }
            ActionOutcome::Free => continue,
        }
    }
}

/// Check every condition that ends a multi-turn activity. Runs before any
/// action is consumed, so a rest that has served its purpose ends on the
/// tick it completes rather than one tick later.
fn resolve_interrupts<I: CommandSource>(state: &mut SimulationState, input: &mut I) {
    if state.flags.take_disturb() {
        state.player.cancel_activity();
        state.repeat_command = None;
        return;
    }

    let done = match state.player.activity {
        Activity::Idle => false,
        Activity::Resting(RestMode::Turns(n)) => n <= 0,
        Activity::Resting(RestMode::UntilHealed) => state.player.fully_healed(),
        Activity::Resting(RestMode::UntilRested) => {
            state.player.fully_healed() && !state.player.statuses.any_affliction()
        }
        Activity::Resting(RestMode::UntilDaybreak) => state
            .player
            .rest_phase
            .is_some_and(|phase| phase != state.clock.day_phase()),
        Activity::Running(_) | Activity::Repeating(_) => false,
    };
    if done {
        state.player.cancel_activity();
        state.redraw |= RedrawFlags::STATE;
        return;
    }

    // Keypress polling, non-blocking. A counted rest is protected from
    // interruption on the coarse poll boundary; running and repeats poll
    // every turn.
    let poll = match state.player.activity {
        Activity::Idle => false,
        Activity::Resting(RestMode::Turns(_)) => {
            state.player.rest_turns % REST_POLL_INTERVAL != 0
        }
        Activity::Resting(_) => true,
        Activity::Running(_) | Activity::Repeating(_) => true,
    };
    if poll && input.poll_interrupt() {
        state.player.cancel_activity();
        state.repeat_command = None;
        state.message("You stop what you are doing.");
        state.redraw |= RedrawFlags::STATE;
    }
}

/// Force-drop from the overflow slots until the pack fits.
///
/// Never hands control to the dispatcher while a non-sticky item sits past
/// capacity; sticky items are skipped and may legitimately remain.
fn handle_pack_overflow(state: &mut SimulationState) {
    while state.player.pack_overflowing() {
        let slot = state.player.inventory[INVEN_PACK..]
            .iter()
            .position(|o| o.droppable())
            .map(|i| i + INVEN_PACK);
        let Some(slot) = slot else {
            // Everything past capacity is sticky.
            return;
        };
        let obj = state.player.inventory.remove(slot);
        state.message(format!("Your pack overflows! You drop your {}.", obj.name));
        let pos = state.player.pos;
        state.level.drop_near(obj, pos, &mut state.rng);
        state.redraw |= RedrawFlags::INVEN;
        state.disturb();
    }
}

/// The command an ongoing activity supplies instead of the input source.
fn auto_command(state: &mut SimulationState) -> Option<Command> {
    match state.player.activity {
        Activity::Idle => None,
        Activity::Resting(_) => Some(Command::Stay),
        Activity::Running(dir) => Some(Command::Move(dir)),
        Activity::Repeating(n) => {
            if n == 0 {
                state.player.cancel_activity();
                state.repeat_command = None;
                return None;
            }
            state.player.activity = Activity::Repeating(n - 1);
            state.repeat_command.clone()
        }
    }
}

/// Consume one unit from a stack, removing the slot when it empties.
fn remove_one(state: &mut SimulationState, slot: usize) {
    let obj = &mut state.player.inventory[slot];
    if obj.number > 1 {
        obj.number -= 1;
    } else {
        state.player.inventory.remove(slot);
    }
}

/// Execute one command. `Free` means nothing happened and no energy is due.
fn dispatch(state: &mut SimulationState, command: Command) -> ActionOutcome {
    match command {
        Command::Move(dir) => {
            let (dx, dy) = dir.delta();
            let dest = Pos::new(state.player.pos.x + dx, state.player.pos.y + dy);
            let blocker = state
                .monsters
                .iter()
                .find(|(_, m)| m.pos == dest)
                .map(|(id, _)| id);
            if let Some(id) = blocker {
                return dispatch(state, Command::Attack(id));
            }
            state.player.pos = dest;
            state.redraw |= RedrawFlags::MAP;
            ActionOutcome::Energy(ENERGY_TO_ACT)
        }
        Command::Run(dir) => {
            state.player.activity = Activity::Running(dir);
            dispatch(state, Command::Move(dir))
        }
        Command::Stay => {
            if state.player.activity.is_resting() {
                state.player.rest_turns += 1;
                if let Activity::Resting(RestMode::Turns(n)) = state.player.activity {
                    state.player.activity = Activity::Resting(RestMode::Turns(n - 1));
                }
            }
            ActionOutcome::Energy(ENERGY_TO_ACT)
        }
        Command::Search => ActionOutcome::Energy(ENERGY_TO_ACT),
        Command::ToggleSearchMode => {
            state.player.searching = !state.player.searching;
            state.redraw |= RedrawFlags::STATE;
            ActionOutcome::Free
        }
        Command::Rest(mode) => {
            if let RestMode::Turns(n) = mode {
                if n <= 0 {
                    state.message("Rest for how long?");
                    return ActionOutcome::Free;
                }
            }
            state.player.activity = Activity::Resting(mode);
            state.player.rest_turns = 1;
            state.player.rest_phase = if matches!(mode, RestMode::UntilDaybreak) {
                Some(state.clock.day_phase())
            } else {
                None
            };
            if let Activity::Resting(RestMode::Turns(n)) = state.player.activity {
                state.player.activity = Activity::Resting(RestMode::Turns(n - 1));
            }
            state.redraw |= RedrawFlags::STATE;
            ActionOutcome::Energy(ENERGY_TO_ACT)
        }
        Command::Repeat { command, count } => {
            if count == 0 {
                return ActionOutcome::Free;
            }
            state.player.activity = Activity::Repeating(count - 1);
            state.repeat_command = Some((*command).clone());
            dispatch(state, *command)
        }
        Command::Attack(id) => {
            let Some(monster) = state.monsters.get(id) else {
                state.message("There is nothing there to attack.");
                return ActionOutcome::Free;
            };
            if monster.pos.distance(state.player.pos) > 1 {
                state.message("It is too far away.");
                return ActionOutcome::Free;
            }
            let name = monster.name.clone();
            let dam = state.rng.damroll(1, 8) + state.player.level / 5;
            if let Some(m) = state.monsters.get_mut(id) {
                m.hp -= dam;
                m.sleep = 0;
                if m.hp < 0 {
                    state.monsters.remove(id);
                    state.message(format!("You have slain the {}!", name));
                    state.player.exp += 1;
                } else {
                    state.message(format!("You hit the {}.", name));
                }
            }
            ActionOutcome::Energy(ENERGY_TO_ACT)
        }
        Command::Cast { spell, target } => {
            if state.player.statuses.has(StatusKind::Confused) {
                state.message("You are too confused!");
                return ActionOutcome::Free;
            }
            cast_spell(state, spell, target);
            if state.player.energy_use == 0 {
                return ActionOutcome::Free;
            }
            ActionOutcome::Energy(state.player.energy_use)
        }
        Command::Eat(slot) => {
            let Some(obj) = state.player.inventory.get(slot) else {
                state.message("You have nothing like that to eat.");
                return ActionOutcome::Free;
            };
            if obj.kind != ObjectKind::Food {
                state.message("You can't eat that!");
                return ActionOutcome::Free;
            }
            let nutrition = obj.pval.max(2_500);
            remove_one(state, slot);
            state.player.feed(nutrition);
            state.message("That tastes good.");
            state.redraw |= RedrawFlags::FOOD | RedrawFlags::INVEN;
            ActionOutcome::Energy(ENERGY_TO_ACT)
        }
        Command::Drop(slot) => {
            let Some(obj) = state.player.inventory.get(slot) else {
                state.message("You have nothing like that to drop.");
                return ActionOutcome::Free;
            };
            if !obj.droppable() {
                state.message("It seems to be stuck to your hand!");
                return ActionOutcome::Free;
            }
            let obj = state.player.inventory.remove(slot);
            state.message(format!("You drop your {}.", obj.name));
            let pos = state.player.pos;
            state.level.drop_near(obj, pos, &mut state.rng);
            state.redraw |= RedrawFlags::INVEN;
            ActionOutcome::Energy(MIN_ENERGY_USE)
        }
        Command::PickUp => {
            let here = state.player.pos;
            let Some(idx) = state.level.floor.iter().position(|f| f.pos == here) else {
                state.message("There is nothing here to pick up.");
                return ActionOutcome::Free;
            };
            let obj = state.level.floor.remove(idx).obj;
            state.message(format!("You have the {}.", obj.name));
            state.player.inventory.push(obj);
            state.redraw |= RedrawFlags::INVEN;
            ActionOutcome::Energy(ENERGY_TO_ACT)
        }
        Command::Activate(slot) => {
            let Some(obj) = state.player.equipment.get_mut(slot) else {
                state.message("You have nothing like that to activate.");
                return ActionOutcome::Free;
            };
            if !obj.flags.contains(ObjectFlags::ACTIVATABLE) {
                state.message("That item cannot be activated.");
                return ActionOutcome::Free;
            }
            if obj.timeout > 0 {
                state.message("It whines, glows and fades...");
                return ActionOutcome::Free;
            }
            obj.timeout = obj.recharge_time.max(20);
            let name = obj.name.clone();
            state.message(format!("Your {} glows brightly!", name));
            state.redraw |= RedrawFlags::EQUIP;
            ActionOutcome::Energy(ENERGY_TO_ACT)
        }
        Command::ZapRod(slot) => {
            let Some(obj) = state.player.inventory.get_mut(slot) else {
                state.message("You have no rod like that.");
                return ActionOutcome::Free;
            };
            if obj.kind != ObjectKind::Rod {
                state.message("That is not a rod.");
                return ActionOutcome::Free;
            }
            // A stack unit is free when its share of the timeout pool is.
            let charging = if obj.recharge_time > 0 {
                (obj.timeout + obj.recharge_time - 1) / obj.recharge_time
            } else {
                0
            };
            if charging >= obj.number as i32 {
                state.message("The rod is still charging.");
                return ActionOutcome::Free;
            }
            obj.timeout += obj.recharge_time;
            let name = obj.name.clone();
            state.message(format!("The {} pulses with power.", name));
            state.redraw |= RedrawFlags::INVEN;
            ActionOutcome::Energy(ENERGY_TO_ACT)
        }
        Command::TakeStairs => {
            state.flags.leaving = true;
            state.pending_depth = Some(state.level.depth + 1);
            state.player.recall_depth = state.player.recall_depth.max(state.level.depth + 1);
            state.message("You enter a maze of down staircases.");
            ActionOutcome::Energy(ENERGY_TO_ACT)
        }
        Command::Save => {
            state.flags.save_requested = true;
            state.message("Saving game...");
            ActionOutcome::Free
        }
        Command::Quit => {
            state.flags.quitting = true;
            state.flags.leaving = true;
            ActionOutcome::Free
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ScriptedInput;
    use crate::object::Object;

    fn state() -> SimulationState {
        SimulationState::new("tester", 7)
    }

    #[test]
    fn rest_until_healed_clears_without_consuming_an_action() {
        let mut state = state();
        state.player.activity = Activity::Resting(RestMode::UntilHealed);
        // Already at full HP/SP: the rest must end before any command runs.
        let mut input = ScriptedInput::new(vec![Command::Quit]);
        player_turn(&mut state, &mut input);
        assert!(state.player.activity.is_idle());
        assert_eq!(state.player.energy_use, 0);
    }

    #[test]
    fn rest_continues_while_wounded() {
        let mut state = state();
        state.player.chp = 5;
        state.player.activity = Activity::Resting(RestMode::UntilHealed);
        let mut input = ScriptedInput::new(vec![]);
        player_turn(&mut state, &mut input);
        assert!(state.player.activity.is_resting());
        assert_eq!(state.player.energy_use, ENERGY_TO_ACT);
    }

    #[test]
    fn daybreak_rest_ends_once_the_phase_changes() {
        let mut state = state();
        // A few ticks before dusk; the player's actions will not land on
        // the exact boundary tick.
        state.clock = crate::world::clock::WorldClock::from_turn(49_997);
        let mut input = ScriptedInput::new(vec![Command::Rest(RestMode::UntilDaybreak)]);
        player_turn(&mut state, &mut input);
        assert!(state.player.activity.is_resting());

        // The next action lands well past the boundary.
        state.clock = crate::world::clock::WorldClock::from_turn(50_007);
        player_turn(&mut state, &mut input);
        assert!(state.player.activity.is_idle());
        assert_eq!(state.player.energy_use, 0);
    }

    #[test]
    fn until_rested_waits_for_afflictions() {
        let mut state = state();
        state.player.activity = Activity::Resting(RestMode::UntilRested);
        state.player.statuses.set(StatusKind::Poisoned, 5);
        let mut input = ScriptedInput::new(vec![]);
        player_turn(&mut state, &mut input);
        assert!(state.player.activity.is_resting());
    }

    #[test]
    fn pack_overflow_converges() {
        let mut state = state();
        for _ in 0..INVEN_PACK + 4 {
            state.player.inventory.push(Object::new(ObjectKind::Potion));
        }
        let mut input = ScriptedInput::new(vec![Command::Quit]);
        player_turn(&mut state, &mut input);
        assert_eq!(state.player.inventory.len(), INVEN_PACK);
        assert_eq!(state.level.floor.len(), 4);
    }

    #[test]
    fn sticky_overflow_items_stay_put() {
        let mut state = state();
        for _ in 0..INVEN_PACK {
            state.player.inventory.push(Object::new(ObjectKind::Potion));
        }
        state
            .player
            .inventory
            .push(Object::new(ObjectKind::Weapon).with_flags(ObjectFlags::STICKY));
        let mut input = ScriptedInput::new(vec![Command::Quit]);
        player_turn(&mut state, &mut input);
        assert_eq!(state.player.inventory.len(), INVEN_PACK + 1);
        assert!(state.level.floor.is_empty());
    }

    #[test]
    fn illegal_command_is_a_free_turn() {
        let mut state = state();
        let mut input = ScriptedInput::new(vec![Command::Eat(0), Command::Stay]);
        player_turn(&mut state, &mut input);
        // The failed eat cost nothing; the Stay that followed was charged.
        assert_eq!(state.player.energy_use, ENERGY_TO_ACT);
    }

    #[test]
    fn drop_costs_half_an_action() {
        let mut state = state();
        state.player.inventory.push(Object::new(ObjectKind::Potion));
        let mut input = ScriptedInput::new(vec![Command::Drop(0)]);
        player_turn(&mut state, &mut input);
        assert_eq!(state.player.energy_use, MIN_ENERGY_USE);
    }

    #[test]
    fn keypress_interrupts_running() {
        let mut state = state();
        state.player.activity = Activity::Running(crate::action::Direction::East);
        let mut input = ScriptedInput::new(vec![Command::Quit]);
        input.key_waiting = true;
        player_turn(&mut state, &mut input);
        assert!(state.player.activity.is_idle());
    }

    #[test]
    fn paralysis_consumes_the_turn() {
        let mut state = state();
        state.player.statuses.set(StatusKind::Paralyzed, 3);
        let mut input = ScriptedInput::new(vec![]);
        player_turn(&mut state, &mut input);
        assert_eq!(state.player.energy_use, ENERGY_TO_ACT);
    }

    #[test]
    fn repeat_executes_and_counts_down() {
        let mut state = state();
        let mut input = ScriptedInput::new(vec![Command::Repeat {
            command: Box::new(Command::Search),
            count: 3,
        }]);
        player_turn(&mut state, &mut input);
        assert_eq!(state.player.activity, Activity::Repeating(2));
        // Subsequent turns feed from the stored command, not the input.
        player_turn(&mut state, &mut input);
        assert_eq!(state.player.activity, Activity::Repeating(1));
    }
}

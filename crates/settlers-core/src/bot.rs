//! Random AI for non-human seats.
//!
//! The bot knows no strategy: it picks uniformly among the engine's legal
//! actions using the engine's own random source, so seeded games replay
//! exactly.

use crate::actions::GameAction;
use crate::board::PlayerId;
use crate::game::{GameEngine, RuleError};
use crate::random::RandomSource;
use tracing::debug;

/// Actions a bot may take in one main-phase turn before it is made to end it
pub const MAX_ACTIONS_PER_TURN: usize = 50;

/// Pick one action uniformly at random
pub fn choose_action<R: RandomSource>(actions: &[GameAction], random: &mut R) -> Option<GameAction> {
    if actions.is_empty() {
        return None;
    }
    Some(actions[random.pick_index(actions.len())])
}

impl<R: RandomSource> GameEngine<R> {
    /// A random legal action for the current player
    pub fn suggest_action(&mut self) -> Option<GameAction> {
        let actions = self.legal_actions();
        choose_action(&actions, &mut self.random)
    }

    /// Play out the player's turn with random legal actions.
    ///
    /// During setup this places one settlement and its road. In the main
    /// phase it rolls, then keeps acting until it picks `EndTurn`, the game
    /// ends, or it hits [`MAX_ACTIONS_PER_TURN`]. Returns the actions taken.
    pub fn run_auto_turn(&mut self, player: PlayerId) -> Result<Vec<GameAction>, RuleError> {
        self.ensure_turn(player)?;

        let mut taken = Vec::new();
        while !self.is_finished() && self.state.current_player == player {
            let in_setup = self.state.is_setup();

            let mut actions = self.legal_actions();
            if taken.len() >= MAX_ACTIONS_PER_TURN && actions.contains(&GameAction::EndTurn) {
                actions = vec![GameAction::EndTurn];
            }

            let Some(action) = choose_action(&actions, &mut self.random) else {
                break;
            };
            self.apply(action)?;
            taken.push(action);

            // The snake turnaround gives the same seat two setup turns in a row
            let setup_turn_done = in_setup && matches!(action, GameAction::PlaceRoad(..));
            if action == GameAction::EndTurn || setup_turn_done {
                break;
            }
        }

        debug!(player, actions = taken.len(), "auto turn finished");
        Ok(taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use crate::game::TurnPhase;
    use crate::random::ScriptedRandom;
    use pretty_assertions::assert_eq;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Bot {i}")).collect()
    }

    #[test]
    fn test_choose_from_empty() {
        let mut random = ScriptedRandom::default();
        assert_eq!(choose_action(&[], &mut random), None);
    }

    #[test]
    fn test_choose_uses_pick() {
        let mut random = ScriptedRandom::default().and_picks([1]);
        let actions = [GameAction::EndTurn, GameAction::RollDice];
        assert_eq!(choose_action(&actions, &mut random), Some(GameAction::RollDice));
    }

    #[test]
    fn test_suggestion_is_legal() {
        let mut game = GameEngine::seeded(names(3), 11).unwrap();
        let action = game.suggest_action().unwrap();
        assert!(game.legal_actions().contains(&action));
    }

    #[test]
    fn test_auto_turn_in_setup_places_settlement_and_road() {
        let mut game = GameEngine::seeded(names(3), 5).unwrap();
        let taken = game.run_auto_turn(0).unwrap();

        assert_eq!(taken.len(), 2);
        assert!(matches!(taken[0], GameAction::PlaceSettlement(_)));
        assert!(matches!(taken[1], GameAction::PlaceRoad(..)));
        assert_eq!(game.current_player(), 1);
    }

    #[test]
    fn test_auto_turn_rejects_other_seat() {
        let mut game = GameEngine::seeded(names(2), 5).unwrap();
        assert_eq!(game.run_auto_turn(1), Err(RuleError::NotYourTurn));
    }

    #[test]
    fn test_auto_setup_then_main_turn() {
        let mut game = GameEngine::seeded(names(4), 21).unwrap();

        // Snake order: 0 1 2 3 3 2 1 0
        let mut order = Vec::new();
        while game.get_game_state().is_setup() {
            let player = game.current_player();
            order.push(player);
            game.run_auto_turn(player).unwrap();
        }
        assert_eq!(order, vec![0, 1, 2, 3, 3, 2, 1, 0]);
        assert_eq!(game.phase(), TurnPhase::PreRoll);

        let taken = game.run_auto_turn(0).unwrap();
        assert!(matches!(
            taken.first(),
            Some(GameAction::RollDice) | Some(GameAction::PlayDevelopmentCard(_))
        ));
        assert_eq!(taken.last(), Some(&GameAction::EndTurn));
        assert_eq!(game.current_player(), 1);
        assert!(game.is_bank_conserved());
    }

    #[test]
    fn test_auto_turn_is_reproducible() {
        let play = |seed| {
            let mut game = GameEngine::seeded(names(2), seed).unwrap();
            let mut log = Vec::new();
            for _ in 0..12 {
                let player = game.current_player();
                log.extend(game.run_auto_turn(player).unwrap());
            }
            log
        };
        assert_eq!(play(99), play(99));
    }

    #[test]
    fn test_auto_turn_with_scripted_random() {
        let random = ScriptedRandom::default();
        let mut game = GameEngine::with_random(names(2), RuleConfig::default(), random).unwrap();
        for _ in 0..4 {
            let player = game.current_player();
            game.run_auto_turn(player).unwrap();
        }
        assert_eq!(game.phase(), TurnPhase::PreRoll);
        assert_eq!(game.board().roads().len(), 4);
    }
}

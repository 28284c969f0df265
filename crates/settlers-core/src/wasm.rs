//! WebAssembly bindings for the rules engine.
//!
//! This module exposes the command/query facade to a JavaScript presentation
//! layer through wasm-bindgen. Structured values cross the boundary as JSON.

use wasm_bindgen::prelude::*;

use crate::actions::GameAction;
use crate::game::GameEngine;
use crate::hex::HexCoord;
use crate::intent::BuildKind;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    engine: GameEngine,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game from a JSON array of player names
    #[wasm_bindgen(constructor)]
    pub fn new(player_names_json: &str) -> Result<WasmGame, JsValue> {
        let player_names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid player names: {}", e)))?;

        Ok(WasmGame {
            engine: GameEngine::new(player_names).map_err(to_js_error)?,
        })
    }

    /// Whole-game snapshot as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        to_json(&self.engine.snapshot(), "{}")
    }

    /// Get the current player ID
    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> u8 {
        self.engine.current_player()
    }

    /// Get the current phase as JSON
    #[wasm_bindgen(js_name = getPhase)]
    pub fn get_phase(&self) -> String {
        to_json(&self.engine.phase(), "\"Unknown\"")
    }

    /// Tile at an axial coordinate as JSON, or `null`
    #[wasm_bindgen(js_name = getTileAt)]
    pub fn get_tile_at(&self, q: i32, r: i32) -> String {
        to_json(&self.engine.get_tile_at(HexCoord::new(q, r)), "null")
    }

    /// Bank counts as JSON
    #[wasm_bindgen(js_name = getBankCounts)]
    pub fn get_bank_counts(&self) -> String {
        to_json(&self.engine.get_bank_counts(), "{}")
    }

    /// Get legal actions for the current player as JSON array
    #[wasm_bindgen(js_name = getLegalActions)]
    pub fn get_legal_actions(&self) -> String {
        to_json(&self.engine.legal_actions(), "[]")
    }

    /// Vertices where the player can settle, as JSON array
    #[wasm_bindgen(js_name = getValidSettlementSpots)]
    pub fn get_valid_settlement_spots(&self, player: u8) -> String {
        to_json(&self.engine.get_valid_settlement_spots(player), "[]")
    }

    /// Settlements the player can upgrade, as JSON array
    #[wasm_bindgen(js_name = getValidCitySpots)]
    pub fn get_valid_city_spots(&self, player: u8) -> String {
        to_json(&self.engine.get_valid_city_spots(player), "[]")
    }

    /// Legal roads as JSON array, optionally only from one vertex
    #[wasm_bindgen(js_name = getValidRoadSpots)]
    pub fn get_valid_road_spots(&self, player: u8, from: Option<usize>) -> String {
        to_json(&self.engine.get_valid_road_spots(player, from), "[]")
    }

    /// Apply an action from JSON for the current player
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, action_json: &str) -> Result<(), JsValue> {
        let action: GameAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;
        self.engine.apply(action).map_err(to_js_error)
    }

    /// Roll for the current player; returns both dice
    #[wasm_bindgen(js_name = rollDice)]
    pub fn roll_dice(&mut self) -> Result<Vec<u8>, JsValue> {
        let (a, b) = self.engine.roll_dice().map_err(to_js_error)?;
        Ok(vec![a, b])
    }

    #[wasm_bindgen(js_name = placeSettlement)]
    pub fn place_settlement(&mut self, player: u8, vertex: usize) -> bool {
        self.engine.place_settlement(player, vertex).is_ok()
    }

    #[wasm_bindgen(js_name = placeCity)]
    pub fn place_city(&mut self, player: u8, vertex: usize) -> bool {
        self.engine.place_city(player, vertex).is_ok()
    }

    #[wasm_bindgen(js_name = placeRoad)]
    pub fn place_road(&mut self, player: u8, v1: usize, v2: usize) -> bool {
        self.engine.place_road(player, v1, v2).is_ok()
    }

    #[wasm_bindgen(js_name = endTurn)]
    pub fn end_turn(&mut self) -> bool {
        self.engine.end_turn().is_ok()
    }

    /// Toggle a build intent: "Settlement", "City" or "Road"
    #[wasm_bindgen(js_name = selectAction)]
    pub fn select_action(&mut self, kind: &str) -> Result<bool, JsValue> {
        let kind = match kind {
            "Settlement" => BuildKind::Settlement,
            "City" => BuildKind::City,
            "Road" => BuildKind::Road,
            other => return Err(JsValue::from_str(&format!("Unknown build kind: {}", other))),
        };
        Ok(self.engine.select_action(kind))
    }

    /// Route a vertex click; returns the outcome as JSON
    #[wasm_bindgen(js_name = clickVertex)]
    pub fn click_vertex(&mut self, vertex: usize) -> Result<String, JsValue> {
        let outcome = self.engine.click_vertex(vertex).map_err(to_js_error)?;
        Ok(to_json(&outcome, "null"))
    }

    /// Let the random AI play the player's turn; returns its actions as JSON
    #[wasm_bindgen(js_name = runAutoTurn)]
    pub fn run_auto_turn(&mut self, player: u8) -> Result<String, JsValue> {
        let actions = self.engine.run_auto_turn(player).map_err(to_js_error)?;
        Ok(to_json(&actions, "[]"))
    }

    /// Events since the last call, as JSON array
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> String {
        to_json(&self.engine.drain_events(), "[]")
    }

    /// Get victory points for a player
    #[wasm_bindgen(js_name = getVictoryPoints)]
    pub fn get_victory_points(&self, player: u8) -> u32 {
        self.engine.victory_points(player)
    }

    #[wasm_bindgen(js_name = getLongestRoad)]
    pub fn get_longest_road(&self, player: u8) -> u32 {
        self.engine.get_player_longest_road(player)
    }

    /// Check if the game is finished
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    /// Get the winner (if game is finished)
    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<u8> {
        self.engine.winner()
    }
}

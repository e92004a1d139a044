//! JavaScript bindings. Diffs and tables cross the boundary as plain JS
//! objects; rules-level no-ops come back as `null`.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::ai::HeuristicSelector;
use crate::game::GameInstance;
use crate::types::{Coord, GameConfig, LegalMoves, Path, Position, Side};

#[wasm_bindgen]
pub struct WasmGame {
    inner: GameInstance,
}

#[derive(Serialize)]
struct LegalMoveEntry<'a> {
    dest: Coord,
    paths: &'a [Path],
}

#[wasm_bindgen]
impl WasmGame {
    /// Accepts a partial `GameConfig` object, or nothing for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmGame, JsValue> {
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let inner = GameInstance::new(config, Box::new(HeuristicSelector)).map_err(js_err)?;
        Ok(WasmGame { inner })
    }

    #[wasm_bindgen(js_name = playManAt)]
    pub fn play_man_at(&mut self, x: i32, y: i32) -> Result<JsValue, JsValue> {
        let diff = self.inner.play_man_at(Coord::new(x, y)).map_err(js_err)?;
        to_js(&diff)
    }

    #[wasm_bindgen(js_name = toggleMan)]
    pub fn toggle_man(&mut self, x: i32, y: i32) -> Result<JsValue, JsValue> {
        let diff = self.inner.toggle_man(Coord::new(x, y)).map_err(js_err)?;
        to_js(&diff)
    }

    #[wasm_bindgen(js_name = stageMove)]
    pub fn stage_move(&mut self, x: i32, y: i32) -> Result<JsValue, JsValue> {
        let diff = self.inner.stage_move(Coord::new(x, y)).map_err(js_err)?;
        to_js(&diff)
    }

    /// `path` is one of the candidate paths of a conflict: `[{x, y}, ...]`.
    #[wasm_bindgen(js_name = stagePath)]
    pub fn stage_path(&mut self, x: i32, y: i32, path: JsValue) -> Result<JsValue, JsValue> {
        let path: Path = serde_wasm_bindgen::from_value(path)?;
        let diff = self
            .inner
            .stage_path(Coord::new(x, y), &path)
            .map_err(js_err)?;
        to_js(&diff)
    }

    #[wasm_bindgen(js_name = stagePlacement)]
    pub fn stage_placement(&mut self, x: i32, y: i32) -> Result<JsValue, JsValue> {
        let diff = self.inner.stage_placement(Coord::new(x, y)).map_err(js_err)?;
        to_js(&diff)
    }

    pub fn confirm(&mut self) -> Result<JsValue, JsValue> {
        let diff = self.inner.confirm().map_err(js_err)?;
        to_js(&diff)
    }

    pub fn cancel(&mut self) {
        self.inner.reset_speculation();
    }

    #[wasm_bindgen(js_name = doAiMove)]
    pub fn do_ai_move(&mut self) -> Result<JsValue, JsValue> {
        let diff = self.inner.do_ai_move().map_err(js_err)?;
        to_js(&diff)
    }

    /// Committed legal moves as `[{dest, paths}]`.
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsValue> {
        legal_moves_to_js(self.inner.board().legal_moves())
    }

    /// Legal moves from the staged ball position.
    #[wasm_bindgen(js_name = speculativeLegalMoves)]
    pub fn speculative_legal_moves(&self) -> Result<JsValue, JsValue> {
        legal_moves_to_js(self.inner.speculation().legal_moves())
    }

    /// Returns "top", "bottom" or "none".
    #[wasm_bindgen(js_name = checkForWin)]
    pub fn check_for_win(&self) -> String {
        match self.inner.board().check_for_win() {
            Some(Side::Top) => "top".to_string(),
            Some(Side::Bottom) => "bottom".to_string(),
            None => "none".to_string(),
        }
    }

    #[wasm_bindgen(js_name = currentPlayer)]
    pub fn current_player(&self) -> String {
        match self.inner.current_player {
            Side::Top => "top".to_string(),
            Side::Bottom => "bottom".to_string(),
        }
    }

    #[wasm_bindgen(js_name = savePosition)]
    pub fn save_position(&self) -> Vec<u8> {
        self.inner.to_position().to_bytes()
    }

    #[wasm_bindgen(js_name = loadPosition)]
    pub fn load_position(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let position = Position::from_bytes(bytes).map_err(js_err)?;
        self.inner.load_position(&position).map_err(js_err)
    }

    #[wasm_bindgen(js_name = asAscii)]
    pub fn as_ascii(&self, speculative: bool) -> String {
        self.inner.as_ascii(speculative)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

fn legal_moves_to_js(legal: &LegalMoves) -> Result<JsValue, JsValue> {
    let entries: Vec<LegalMoveEntry<'_>> = legal
        .iter()
        .map(|(&dest, paths)| LegalMoveEntry { dest, paths })
        .collect();
    to_js(&entries)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_missing_as_null(true);
    Ok(value.serialize(&serializer)?)
}

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

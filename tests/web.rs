#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Reflect};
use phutball::wasm::WasmGame;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn field(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn wasm_ready_returns_true() {
    assert!(phutball::wasm_ready());
}

#[wasm_bindgen_test]
fn placing_then_jumping_round_trips_through_js() {
    let mut game = WasmGame::new(JsValue::UNDEFINED).unwrap();

    let placed = game.play_man_at(7, 10).unwrap();
    assert!(!placed.is_null());
    assert!(game.play_man_at(7, 10).unwrap().is_null());

    let legal = Array::from(&game.legal_moves().unwrap());
    assert_eq!(legal.length(), 1);
    let dest = field(&legal.get(0), "dest");
    assert_eq!(field(&dest, "y").as_f64(), Some(11.0));

    assert!(!game.stage_move(7, 11).unwrap().is_null());
    let diff = game.confirm().unwrap();
    let instructions = Array::from(&field(&diff, "instructions"));
    assert_eq!(instructions.length(), 4);
    assert_eq!(
        field(&instructions.get(0), "kind").as_string().as_deref(),
        Some("ball_moved_to")
    );
    assert_eq!(game.check_for_win(), "none");
}

#[wasm_bindgen_test]
fn saved_position_loads_into_a_fresh_game() {
    let mut game = WasmGame::new(JsValue::UNDEFINED).unwrap();
    game.play_man_at(6, 9).unwrap();
    let bytes = game.save_position();

    let mut other = WasmGame::new(JsValue::UNDEFINED).unwrap();
    other.load_position(&bytes).unwrap();

    assert_eq!(other.as_ascii(false), game.as_ascii(false));
    assert!(other.load_position(&bytes[..10]).is_err());
}

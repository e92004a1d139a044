use tracing::{debug, instrument};

use crate::board::BoardState;
use crate::speculation::{Speculation, preferred_path};
use crate::types::{Coord, Diff, GameConfig, Position, Side};

/// A turn chosen by a computer player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiMove {
    /// Jump the ball to this destination.
    Move(Coord),
    /// Place a stone here.
    Play(Coord),
}

pub trait MoveSelector: Send + Sync {
    fn select_move(&self, board: &BoardState, side: Side) -> Option<AiMove>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSelector;

impl MoveSelector for FirstLegalMoveSelector {
    fn select_move(&self, board: &BoardState, _side: Side) -> Option<AiMove> {
        board.legal_moves().keys().next().copied().map(AiMove::Move)
    }
}

pub struct GameInstance {
    board: BoardState,
    speculation: Speculation,
    pub current_player: Side,
    pub winner: Option<Side>,
    config: GameConfig,
    selector: Box<dyn MoveSelector>,
}

impl GameInstance {
    pub fn new(config: GameConfig, selector: Box<dyn MoveSelector>) -> Result<Self, String> {
        config.validate()?;
        let board = BoardState::new(config.shape, config.start, config.max_depth);
        let speculation = Speculation::from_board(&board);
        Ok(Self {
            board,
            speculation,
            current_player: Side::Top,
            winner: None,
            config,
            selector,
        })
    }

    pub fn new_with_default_selector(config: GameConfig) -> Result<Self, String> {
        Self::new(config, Box::new(FirstLegalMoveSelector))
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn speculation(&self) -> &Speculation {
        &self.speculation
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Places a stone as a whole turn.
    pub fn play_man_at(&mut self, coord: Coord) -> Result<Option<Diff>, String> {
        self.ensure_running()?;
        if !self.board.shape().contains(coord) {
            return Ok(None);
        }
        let Some(diff) = self.board.add_man(coord) else {
            return Ok(None);
        };

        self.board.update_legal_moves();
        self.speculation.reset(&self.board);
        self.end_turn();
        Ok(Some(diff))
    }

    /// Position-editor toggle. Does not use up a turn.
    pub fn toggle_man(&mut self, coord: Coord) -> Result<Option<Diff>, String> {
        self.ensure_running()?;
        if !self.board.shape().contains(coord) {
            return Ok(None);
        }
        let diff = self.board.toggle_man(coord);
        self.speculation.reset(&self.board);
        Ok(diff)
    }

    pub fn stage_move(&mut self, dest: Coord) -> Result<Option<Diff>, String> {
        self.ensure_running()?;
        self.drop_staged_stones();
        Ok(self.speculation.stage_move(dest))
    }

    /// Resolves a conflict by naming the path to take.
    pub fn stage_path(&mut self, dest: Coord, path: &[Coord]) -> Result<Option<Diff>, String> {
        self.ensure_running()?;
        self.drop_staged_stones();
        Ok(self.speculation.stage_path(dest, path))
    }

    /// Stages a single stone, replacing whatever was staged before.
    pub fn stage_placement(&mut self, coord: Coord) -> Result<Option<Diff>, String> {
        self.ensure_running()?;
        if !self.board.shape().contains(coord) {
            return Ok(None);
        }
        self.speculation.reset(&self.board);
        Ok(self.speculation.stage_placement(coord))
    }

    /// Abandons the staged move.
    pub fn reset_speculation(&mut self) {
        self.speculation.reset(&self.board);
    }

    /// Commits the staged move, checks for a win and passes the turn.
    #[instrument(level = "debug", skip(self), fields(side = ?self.current_player))]
    pub fn confirm(&mut self) -> Result<Option<Diff>, String> {
        self.ensure_running()?;
        let Some(diff) = self.speculation.confirm(&mut self.board) else {
            return Ok(None);
        };

        debug!(ball = ?self.board.ball(), stones = self.board.stones().len(), "move committed");
        self.winner = self.board.check_for_win();
        if let Some(winner) = self.winner {
            debug!(?winner, "ball reached a goal");
        }
        self.end_turn();
        Ok(Some(diff))
    }

    /// Lets the selector play a full turn for the side to move, through the
    /// same staging calls a human would make.
    #[instrument(level = "debug", skip(self), fields(side = ?self.current_player))]
    pub fn do_ai_move(&mut self) -> Result<Option<Diff>, String> {
        self.ensure_running()?;
        self.speculation.reset(&self.board);

        let choice = self
            .selector
            .select_move(&self.board, self.current_player)
            .ok_or_else(|| "AI could not select a move".to_string())?;
        debug!(?choice, "AI selected a move");

        let staged = match choice {
            AiMove::Move(dest) => {
                let paths = self
                    .board
                    .legal_moves()
                    .get(&dest)
                    .ok_or_else(|| "AI selected an illegal move".to_string())?;
                // An ambiguous destination is taken along its first path.
                let path = preferred_path(paths)
                    .or_else(|| paths.first())
                    .cloned()
                    .ok_or_else(|| "AI selected an illegal move".to_string())?;
                self.speculation.stage_path(dest, &path)
            }
            AiMove::Play(coord) => {
                if !self.board.shape().contains(coord) {
                    return Err("AI selected an out-of-range move".to_string());
                }
                self.speculation.stage_placement(coord)
            }
        };
        if staged.is_none() {
            return Err("AI selected an illegal move".to_string());
        }

        self.confirm()
    }

    /// Clears the board and starts a new game.
    pub fn reset(&mut self) {
        self.board.reset(self.config.start);
        self.speculation.reset(&self.board);
        self.current_player = Side::Top;
        self.winner = None;
        debug!(start = ?self.config.start, "game reset");
    }

    pub fn to_position(&self) -> Position {
        self.board.to_position()
    }

    /// Replaces the board with a saved position. Top moves next.
    pub fn load_position(&mut self, position: &Position) -> Result<(), String> {
        let config = GameConfig {
            shape: position.shape,
            start: position.shape.center(),
            max_depth: self.config.max_depth,
        };
        config.validate()?;
        let board = BoardState::from_position(position, config.max_depth)?;

        self.config = config;
        self.board = board;
        self.speculation.reset(&self.board);
        self.current_player = Side::Top;
        self.winner = self.board.check_for_win();
        debug!(stones = position.stones.len(), "position loaded");
        Ok(())
    }

    pub fn as_ascii(&self, speculative: bool) -> String {
        if speculative {
            self.speculation.as_ascii()
        } else {
            self.board.as_ascii()
        }
    }

    fn ensure_running(&self) -> Result<(), String> {
        if self.is_game_over() {
            return Err("game is already over".to_string());
        }
        Ok(())
    }

    fn drop_staged_stones(&mut self) {
        if self.speculation.has_staged_stones(&self.board) {
            self.speculation.reset(&self.board);
        }
    }

    fn end_turn(&mut self) {
        self.current_player = self.current_player.opponent();
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: BoardState, current_player: Side) {
        self.board = board;
        self.speculation.reset(&self.board);
        self.current_player = current_player;
        self.winner = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::DEFAULT_MAX_DEPTH;
    use crate::types::{Instruction, Shape};

    struct FixedMoveSelector {
        mv: AiMove,
    }

    impl MoveSelector for FixedMoveSelector {
        fn select_move(&self, _board: &BoardState, _side: Side) -> Option<AiMove> {
            Some(self.mv)
        }
    }

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn board_with(ball: Coord, stones: &[(i32, i32)]) -> BoardState {
        let position = Position {
            shape: Shape::new(15, 19),
            ball,
            stones: stones.iter().map(|&xy| Coord::from(xy)).collect(),
        };
        BoardState::from_position(&position, DEFAULT_MAX_DEPTH).unwrap()
    }

    fn game() -> GameInstance {
        GameInstance::new_with_default_selector(GameConfig::default()).unwrap()
    }

    #[test]
    fn initial_state_is_correct() {
        let game = game();

        assert_eq!(game.current_player, Side::Top);
        assert_eq!(game.board().ball(), c(7, 9));
        assert!(game.board().stones().is_empty());
        assert!(game.speculation().is_idle());
        assert!(!game.is_game_over());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            shape: Shape::new(0, 19),
            ..GameConfig::default()
        };

        assert!(GameInstance::new_with_default_selector(config).is_err());
    }

    #[test]
    fn play_man_at_switches_turn_and_refreshes_moves() {
        let mut game = game();

        let diff = game.play_man_at(c(7, 10)).unwrap();

        assert!(diff.is_some());
        assert_eq!(game.current_player, Side::Bottom);
        assert!(game.board().legal_moves().contains_key(&c(7, 11)));
        assert!(game.speculation().legal_moves().contains_key(&c(7, 11)));
    }

    #[test]
    fn play_man_at_rejects_ball_occupied_and_off_grid_cells() {
        let mut game = game();
        game.play_man_at(c(7, 10)).unwrap();

        assert_eq!(game.play_man_at(c(7, 9)).unwrap(), None);
        assert_eq!(game.play_man_at(c(7, 10)).unwrap(), None);
        assert_eq!(game.play_man_at(c(-1, 3)).unwrap(), None);
        assert_eq!(game.current_player, Side::Bottom);
    }

    #[test]
    fn toggle_man_keeps_the_turn() {
        let mut game = game();

        game.toggle_man(c(6, 9)).unwrap();
        assert_eq!(game.current_player, Side::Top);
        assert!(game.board().legal_moves().contains_key(&c(5, 9)));

        game.toggle_man(c(6, 9)).unwrap();
        assert!(game.board().stones().is_empty());
    }

    #[test]
    fn confirmed_jump_into_goal_ends_the_game() {
        let mut game = game();
        game.set_board_for_test(board_with(c(7, 14), &[(7, 15), (7, 16)]), Side::Top);

        game.stage_move(c(7, 17)).unwrap().unwrap();
        assert!(game.winner.is_none());
        let diff = game.confirm().unwrap().unwrap();

        let moved = Instruction::BallMovedTo { coord: c(7, 17) };
        assert!(diff.instructions.contains(&moved));
        assert_eq!(game.winner, Some(Side::Top));
        assert!(game.is_game_over());
        let err = game.play_man_at(c(1, 5)).unwrap_err();
        assert_eq!(err, "game is already over");

        game.reset();
        assert!(!game.is_game_over());
        assert_eq!(game.board().ball(), c(7, 9));
    }

    #[test]
    fn cancel_discards_staged_jumps() {
        let mut game = game();
        game.set_board_for_test(board_with(c(7, 9), &[(7, 10)]), Side::Top);

        game.stage_move(c(7, 11)).unwrap().unwrap();
        game.reset_speculation();

        assert_eq!(game.confirm().unwrap(), None);
        assert_eq!(game.board().ball(), c(7, 9));
        assert_eq!(game.current_player, Side::Top);
    }

    #[test]
    fn staging_a_jump_drops_a_staged_stone() {
        let mut game = game();
        game.set_board_for_test(board_with(c(7, 9), &[(7, 10)]), Side::Top);

        game.stage_placement(c(2, 2)).unwrap().unwrap();
        game.stage_move(c(7, 11)).unwrap().unwrap();
        let diff = game.confirm().unwrap().unwrap();

        assert!(diff.instructions.contains(&Instruction::ClearTransient));
        assert!(!game.board().stones().contains(&c(2, 2)));
    }

    #[test]
    fn ai_jump_is_confirmed_through_staging() {
        let mut game = GameInstance::new(
            GameConfig::default(),
            Box::new(FixedMoveSelector {
                mv: AiMove::Move(c(7, 11)),
            }),
        )
        .unwrap();
        game.set_board_for_test(board_with(c(7, 9), &[(7, 10)]), Side::Bottom);

        let diff = game.do_ai_move().unwrap().unwrap();

        let removed = Instruction::Removed {
            coords: vec![c(7, 10)],
        };
        assert!(diff.instructions.contains(&removed));
        assert_eq!(game.board().ball(), c(7, 11));
        assert_eq!(game.current_player, Side::Top);
    }

    #[test]
    fn ai_takes_first_path_of_an_ambiguous_destination() {
        let mut game = GameInstance::new(
            GameConfig::default(),
            Box::new(FixedMoveSelector {
                mv: AiMove::Move(c(7, 7)),
            }),
        )
        .unwrap();
        let board = board_with(c(5, 5), &[(6, 5), (7, 6), (5, 6), (6, 7)]);
        let first = board.legal_moves()[&c(7, 7)][0].clone();
        game.set_board_for_test(board, Side::Bottom);

        let diff = game.do_ai_move().unwrap().unwrap();

        let trail_start = diff.instructions.iter().find_map(|ins| match ins {
            Instruction::MoveTrail { segments } => Some(segments[1].from),
            _ => None,
        });
        assert_eq!(trail_start, Some(first[1]));
        assert_eq!(game.board().stones().len(), 2);
    }

    #[test]
    fn ai_illegal_choices_are_rejected() {
        let mut game = GameInstance::new(
            GameConfig::default(),
            Box::new(FixedMoveSelector {
                mv: AiMove::Move(c(0, 0)),
            }),
        )
        .unwrap();
        assert!(game.do_ai_move().unwrap_err().contains("illegal"));

        let mut game = GameInstance::new(
            GameConfig::default(),
            Box::new(FixedMoveSelector {
                mv: AiMove::Play(c(7, 9)),
            }),
        )
        .unwrap();
        assert!(game.do_ai_move().unwrap_err().contains("illegal"));
        assert!(game.board().stones().is_empty());
    }

    #[test]
    fn default_selector_without_moves_reports_error() {
        let mut game = game();

        assert_eq!(game.do_ai_move().unwrap_err(), "AI could not select a move");
    }

    #[test]
    fn load_position_replaces_board_and_shape() {
        let mut game = game();
        let position = Position {
            shape: Shape::new(9, 11),
            ball: c(4, 5),
            stones: vec![c(4, 6)],
        };

        game.load_position(&position).unwrap();

        assert_eq!(game.to_position(), position);
        assert_eq!(game.config().shape, Shape::new(9, 11));
        assert!(game.speculation().legal_moves().contains_key(&c(4, 7)));
        assert_eq!(game.as_ascii(false).lines().count(), 11);
    }

    #[test]
    fn load_position_rejects_out_of_range_input_and_keeps_the_game() {
        let mut game = game();
        game.play_man_at(c(7, 10)).unwrap();
        let before = game.to_position();

        let far_ball = Position {
            shape: Shape::new(15, 19),
            ball: c(i32::MAX, 9),
            stones: vec![c(i32::MAX - 1, 9)],
        };
        let huge = Position {
            shape: Shape::new(i32::MAX, 3),
            ball: c(1, 1),
            stones: Vec::new(),
        };

        assert!(game.load_position(&far_ball).is_err());
        assert!(game.load_position(&huge).is_err());
        assert_eq!(game.to_position(), before);
        assert_eq!(game.config().shape, Shape::new(15, 19));
        assert_eq!(game.as_ascii(false).lines().count(), 19);
    }

    #[test]
    fn speculative_ascii_shows_staged_ball() {
        let mut game = game();
        game.set_board_for_test(board_with(c(7, 9), &[(7, 10)]), Side::Top);

        game.stage_move(c(7, 11)).unwrap();

        let staged = game.as_ascii(true);
        let real = game.as_ascii(false);
        // Row y = 11 is the eighth line from the top of a 19-row board.
        assert_eq!(staged.lines().nth(7).unwrap().chars().nth(7), Some('O'));
        assert_eq!(real.lines().nth(7).unwrap().chars().nth(7), Some('@'));
    }
}

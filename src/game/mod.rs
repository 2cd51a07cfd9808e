//! Tic-tac-toe: win detection and the move acceptance state machine.

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Player {
    X,
    O,
}

pub type Board = [Option<Player>; 9];

/// Rows, then columns, then diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Win {
    pub winner: Player,
    pub line: [usize; 3],
}

/// First completed line in [`LINES`] order, if any.
pub fn calculate_winner(board: &Board) -> Option<Win> {
    LINES.iter().find_map(|&[a, b, c]| match board[a] {
        Some(p) if board[b] == Some(p) && board[c] == Some(p) => Some(Win {
            winner: p,
            line: [a, b, c],
        }),
        _ => None,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress { next: Player },
    Won(Win),
    Drawn,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress { .. })
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::InProgress { next } => write!(f, "Turn: {next}"),
            GameStatus::Won(win) => write!(f, "Winner: {}", win.winner),
            GameStatus::Drawn => write!(f, "It's a draw"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    board: Board,
    x_is_next: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self {
            board: [None; 9],
            x_is_next: true,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn next_player(&self) -> Player {
        if self.x_is_next {
            Player::X
        } else {
            Player::O
        }
    }

    pub fn status(&self) -> GameStatus {
        if let Some(win) = calculate_winner(&self.board) {
            GameStatus::Won(win)
        } else if self.board.iter().all(Option::is_some) {
            GameStatus::Drawn
        } else {
            GameStatus::InProgress {
                next: self.next_player(),
            }
        }
    }

    pub fn winning_line(&self) -> Option<[usize; 3]> {
        calculate_winner(&self.board).map(|w| w.line)
    }

    pub fn status_text(&self) -> String {
        self.status().to_string()
    }

    /// Place the active player's mark at `index`.
    ///
    /// Returns `false` (board unchanged) when the game is over, the cell is taken,
    /// or `index` is off the board.
    pub fn play(&mut self, index: usize) -> bool {
        if self.status().is_over() {
            return false;
        }
        match self.board.get(index) {
            Some(None) => {}
            _ => return false,
        }
        self.board[index] = Some(self.next_player());
        self.x_is_next = !self.x_is_next;
        true
    }

    /// Hand the turn to the other player without placing a mark.
    pub fn toggle_turn(&mut self) {
        self.x_is_next = !self.x_is_next;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

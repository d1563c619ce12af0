use maze_core::Direction;

/// Prompt shown in solo games
pub const SOLO_PROMPT: &str = "Move (WASD/solve/next/save/load/q): ";

/// Prompt shown on the human's turn in competitive games
pub const COMPETITIVE_PROMPT: &str = "Your turn (WASD/save/load/q): ";

/// A player request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    /// Show the full path to the exit
    Solve,
    /// Show the next few steps
    Next,
    Save,
    Load,
    Quit,
}

impl std::str::FromStr for Command {
    type Err = String;

    /// Whole words first; otherwise the first character decides the move
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        match input.as_str() {
            "q" | "quit" => Ok(Command::Quit),
            "solve" => Ok(Command::Solve),
            "next" => Ok(Command::Next),
            "save" => Ok(Command::Save),
            "load" => Ok(Command::Load),
            other => other
                .chars()
                .next()
                .and_then(Direction::from_symbol)
                .map(Command::Move)
                .ok_or_else(|| format!("Unknown command: '{}'", s.trim())),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Move(direction) => write!(f, "{}", direction.symbol()),
            Command::Solve => write!(f, "solve"),
            Command::Next => write!(f, "next"),
            Command::Save => write!(f, "save"),
            Command::Load => write!(f, "load"),
            Command::Quit => write!(f, "q"),
        }
    }
}

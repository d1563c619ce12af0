use maze_core::MazeError;
use thiserror::Error;

/// Failures surfaced by the game host
#[derive(Error, Debug)]
pub enum GameError {
    #[error("maze error: {0}")]
    Maze(#[from] MazeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid save data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt save: {0}")]
    CorruptSave(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

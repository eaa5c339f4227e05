//! Error types
//!
//! Rejected player actions and data loading failures. Misses, evasions and
//! blocked shots are ordinary combat outcomes and never show up here.

use thiserror::Error;

use crate::entities::Position;
use crate::progression::SkillId;

/// Why a player action was refused. A refused action never mutates state
/// and never consumes a turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("the game is over")]
    GameOver,
    #[error("cannot move into ({}, {})", .0.x, .0.y)]
    Blocked(Position),
    #[error("no valid target at ({}, {})", .0.x, .0.y)]
    InvalidTarget(Position),
    #[error("target is out of range ({distance} > {range})")]
    OutOfRange { distance: i32, range: i32 },
    #[error("this action needs a target")]
    MissingTarget,
    #[error("no target in range")]
    NoTargetInRange,
    #[error("not enough energy ({available} < {required})")]
    InsufficientEnergy { available: i32, required: i32 },
    #[error("ranged mode is not active")]
    RangedModeInactive,
    #[error("{skill:?} is on cooldown for {turns} more turn(s)")]
    OnCooldown { skill: SkillId, turns: u32 },
    #[error("skill slot {0} is empty")]
    EmptySlot(u8),
    #[error("skill slot {0} does not exist")]
    InvalidSlot(u8),
    #[error("{0:?} has no registered effect")]
    UnknownSkill(SkillId),
    #[error("{0:?} is already learned")]
    AlreadyLearned(SkillId),
    #[error("{0:?} has not been learned")]
    NotLearned(SkillId),
    #[error("not enough codex points ({available} < {required})")]
    InsufficientCodexPoints { available: u32, required: u32 },
    #[error("there are no stairs here")]
    NoStairs,
    #[error("{0}")]
    Refused(&'static str),
}

/// Failures while reading external data files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize {file}: {source}")]
    Serialize {
        file: String,
        #[source]
        source: ron::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_messages() {
        let err = ActionError::OutOfRange { distance: 7, range: 4 };
        assert_eq!(err.to_string(), "target is out of range (7 > 4)");

        let err = ActionError::Blocked(Position::new(3, 9));
        assert_eq!(err.to_string(), "cannot move into (3, 9)");
    }
}

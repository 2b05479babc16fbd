use crate::models::matches::{
    CommitOutcome, Match, MatchCommit, MatchFields, PlayerInfo, Side, clamp_score,
    normalize_match_type,
};
use crate::models::media::CameraStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An independently editable part of the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    MatchType,
    MatchScore,
    PlayerA,
    PlayerB,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::MatchType,
        Region::MatchScore,
        Region::PlayerA,
        Region::PlayerB,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Region::MatchType => "match_type",
            Region::MatchScore => "match_score",
            Region::PlayerA => "player_a",
            Region::PlayerB => "player_b",
        }
    }

    pub const fn player(side: Side) -> Self {
        match side {
            Side::A => Region::PlayerA,
            Side::B => Region::PlayerB,
        }
    }

    pub const fn side(&self) -> Option<Side> {
        match self {
            Region::PlayerA => Some(Side::A),
            Region::PlayerB => Some(Side::B),
            Region::MatchType | Region::MatchScore => None,
        }
    }

    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Fields a save of this region writes.
    pub const fn fields(&self) -> MatchFields {
        match self {
            Region::MatchType => MatchFields::MatchType,
            Region::MatchScore => MatchFields::MatchScore,
            Region::PlayerA => MatchFields::PlayerAInfo,
            Region::PlayerB => MatchFields::PlayerBInfo,
        }
    }

    /// Single-line text regions react to Enter/Escape.
    pub const fn is_text(&self) -> bool {
        !matches!(self, Region::MatchScore)
    }

    pub fn capture(&self, m: &Match) -> Draft {
        match self {
            Region::MatchType => Draft::MatchType {
                match_type: m.match_type.clone(),
            },
            Region::MatchScore => Draft::MatchScore {
                score_a: m.match_score_a,
                score_b: m.match_score_b,
            },
            Region::PlayerA => Draft::Player(m.player_a.clone()),
            Region::PlayerB => Draft::Player(m.player_b.clone()),
        }
    }

    pub fn accepts(&self, draft: &Draft) -> bool {
        matches!(
            (self, draft),
            (Region::MatchType, Draft::MatchType { .. })
                | (Region::MatchScore, Draft::MatchScore { .. })
                | (Region::PlayerA | Region::PlayerB, Draft::Player(_))
        )
    }
}

/// Staged, uncommitted values of one region.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Draft {
    MatchType { match_type: String },
    MatchScore { score_a: u32, score_b: u32 },
    Player(PlayerInfo),
}

impl Draft {
    pub fn step_score(&mut self, side: Side, delta: i64) -> bool {
        let Draft::MatchScore { score_a, score_b } = self else {
            return false;
        };
        match side {
            Side::A => *score_a = clamp_score(*score_a, delta),
            Side::B => *score_b = clamp_score(*score_b, delta),
        }
        true
    }

    /// The commit a save produces, or `None` when the draft is discarded.
    ///
    /// `original` is the draft captured when editing began. Player fields
    /// left blank keep their value from it.
    pub fn into_commit(self, region: Region, original: &Draft) -> Option<MatchCommit> {
        match (region, self) {
            (Region::MatchType, Draft::MatchType { match_type }) => Some(MatchCommit::MatchType {
                match_type: normalize_match_type(&match_type),
            }),
            (Region::MatchScore, Draft::MatchScore { score_a, score_b }) => {
                Some(MatchCommit::MatchScore { score_a, score_b })
            }
            (region, Draft::Player(info)) if !info.is_blank() => {
                let side = region.side()?;
                let info = match original {
                    Draft::Player(before) => info.filled_from(before),
                    _ => info,
                };
                Some(MatchCommit::PlayerInfo { side, info })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum EditKey {
    Enter,
    Escape,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchTypeView {
    pub editing: bool,
    pub match_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchScoreView {
    pub editing: bool,
    pub score_a: u32,
    pub score_b: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub editing: bool,
    #[serde(flatten)]
    pub info: PlayerInfo,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CameraView {
    #[serde(flatten)]
    pub status: CameraStatus,
    pub message: Option<&'static str>,
    pub remediation: Option<&'static [&'static str]>,
}

impl From<CameraStatus> for CameraView {
    fn from(status: CameraStatus) -> Self {
        let failure = match status {
            CameraStatus::Failed { failure } => Some(failure),
            _ => None,
        };
        Self {
            status,
            message: failure.map(|f| f.message()),
            remediation: failure.and_then(|f| f.remediation()),
        }
    }
}

/// What the overlay shows. Regions under edit show their draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayView {
    pub match_id: Uuid,
    pub match_type: MatchTypeView,
    pub match_score: MatchScoreView,
    pub player_a: PlayerView,
    pub player_b: PlayerView,
    /// `None` when no camera is attached.
    pub camera: Option<CameraView>,
}

#[derive(Debug, Deserialize)]
pub struct DeltaArgs {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct KeyArgs {
    pub key: EditKey,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    /// `None` when nothing was committed.
    pub outcome: Option<CommitOutcome>,
    pub overlay: OverlayView,
}

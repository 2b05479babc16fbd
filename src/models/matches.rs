use crate::entities::matches::Match as MatchEntity;
use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_MATCH_TYPE: &str = "APA 8-Ball";
pub const MATCH_TYPE_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Side::A => "a",
            Side::B => "b",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlayerInfo {
    pub name: String,
    pub team: String,
    pub skill: String,
}

impl PlayerInfo {
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.team.trim().is_empty() && self.skill.trim().is_empty()
    }

    /// Trims every field. Fields left blank take the value from `fallback`.
    pub fn filled_from(self, fallback: &PlayerInfo) -> Self {
        fn pick(value: String, fallback: &str) -> String {
            match value.trim() {
                "" => fallback.to_owned(),
                trimmed => trimmed.to_owned(),
            }
        }
        Self {
            name: pick(self.name, &fallback.name),
            team: pick(self.team, &fallback.team),
            skill: pick(self.skill, &fallback.skill),
        }
    }

    fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_owned(),
            team: self.team.trim().to_owned(),
            skill: self.skill.trim().to_owned(),
        }
    }
}

bitflags! {
    /// Individually addressable fields of a [`Match`].
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
    pub struct MatchFields: u16 {
        const MatchType = 1 << 0;
        const PlayerAName = 1 << 1;
        const PlayerATeam = 1 << 2;
        const PlayerASkill = 1 << 3;
        const PlayerAScore = 1 << 4;
        const PlayerBName = 1 << 5;
        const PlayerBTeam = 1 << 6;
        const PlayerBSkill = 1 << 7;
        const PlayerBScore = 1 << 8;
        const MatchScoreA = 1 << 9;
        const MatchScoreB = 1 << 10;

        const MatchScore = Self::MatchScoreA.bits() | Self::MatchScoreB.bits();
        const PlayerAInfo = Self::PlayerAName.bits() | Self::PlayerATeam.bits() | Self::PlayerASkill.bits();
        const PlayerBInfo = Self::PlayerBName.bits() | Self::PlayerBTeam.bits() | Self::PlayerBSkill.bits();
    }
}

impl MatchFields {
    pub const fn player_info(side: Side) -> Self {
        match side {
            Side::A => Self::PlayerAInfo,
            Side::B => Self::PlayerBInfo,
        }
    }

    pub const fn player_score(side: Side) -> Self {
        match side {
            Side::A => Self::PlayerAScore,
            Side::B => Self::PlayerBScore,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Match {
    pub id: Uuid,
    pub match_type: String,
    pub player_a: PlayerInfo,
    pub player_a_score: u32,
    pub player_b: PlayerInfo,
    pub player_b_score: u32,
    pub match_score_a: u32,
    pub match_score_b: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// A fresh match with placeholder players, used when no stored match exists.
    pub fn with_defaults(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            match_type: DEFAULT_MATCH_TYPE.to_owned(),
            player_a: PlayerInfo {
                name: "Player A".to_owned(),
                team: "Team A".to_owned(),
                skill: "SL6 (50)".to_owned(),
            },
            player_a_score: 0,
            player_b: PlayerInfo {
                name: "Player B".to_owned(),
                team: "Team B".to_owned(),
                skill: "SL6 (50)".to_owned(),
            },
            player_b_score: 0,
            match_score_a: 0,
            match_score_b: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn player(&self, side: Side) -> &PlayerInfo {
        match side {
            Side::A => &self.player_a,
            Side::B => &self.player_b,
        }
    }

    pub fn player_score(&self, side: Side) -> u32 {
        match side {
            Side::A => self.player_a_score,
            Side::B => self.player_b_score,
        }
    }

    pub fn match_score(&self) -> (u32, u32) {
        (self.match_score_a, self.match_score_b)
    }

    /// Copies the fields in `fields` from `other`. Identity and timestamps are untouched.
    pub fn copy_fields(&mut self, other: &Match, fields: MatchFields) {
        if fields.contains(MatchFields::MatchType) {
            self.match_type.clone_from(&other.match_type);
        }
        if fields.contains(MatchFields::PlayerAName) {
            self.player_a.name.clone_from(&other.player_a.name);
        }
        if fields.contains(MatchFields::PlayerATeam) {
            self.player_a.team.clone_from(&other.player_a.team);
        }
        if fields.contains(MatchFields::PlayerASkill) {
            self.player_a.skill.clone_from(&other.player_a.skill);
        }
        if fields.contains(MatchFields::PlayerAScore) {
            self.player_a_score = other.player_a_score;
        }
        if fields.contains(MatchFields::PlayerBName) {
            self.player_b.name.clone_from(&other.player_b.name);
        }
        if fields.contains(MatchFields::PlayerBTeam) {
            self.player_b.team.clone_from(&other.player_b.team);
        }
        if fields.contains(MatchFields::PlayerBSkill) {
            self.player_b.skill.clone_from(&other.player_b.skill);
        }
        if fields.contains(MatchFields::PlayerBScore) {
            self.player_b_score = other.player_b_score;
        }
        if fields.contains(MatchFields::MatchScoreA) {
            self.match_score_a = other.match_score_a;
        }
        if fields.contains(MatchFields::MatchScoreB) {
            self.match_score_b = other.match_score_b;
        }
    }
}

/// A named partial update of a [`Match`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchCommit {
    MatchType { match_type: String },
    MatchScore { score_a: u32, score_b: u32 },
    PlayerInfo { side: Side, info: PlayerInfo },
    PlayerScore { side: Side, score: u32 },
}

impl MatchCommit {
    pub fn fields(&self) -> MatchFields {
        match self {
            MatchCommit::MatchType { .. } => MatchFields::MatchType,
            MatchCommit::MatchScore { .. } => MatchFields::MatchScore,
            MatchCommit::PlayerInfo { side, .. } => MatchFields::player_info(*side),
            MatchCommit::PlayerScore { side, .. } => MatchFields::player_score(*side),
        }
    }

    /// Corrects invalid values instead of rejecting them.
    pub fn validated(self) -> Self {
        match self {
            MatchCommit::MatchType { match_type } => MatchCommit::MatchType {
                match_type: normalize_match_type(&match_type),
            },
            MatchCommit::PlayerInfo { side, info } => MatchCommit::PlayerInfo {
                side,
                info: info.trimmed(),
            },
            commit => commit,
        }
    }

    pub fn apply_to(&self, m: &mut Match) {
        match self {
            MatchCommit::MatchType { match_type } => m.match_type.clone_from(match_type),
            MatchCommit::MatchScore { score_a, score_b } => {
                m.match_score_a = *score_a;
                m.match_score_b = *score_b;
            }
            MatchCommit::PlayerInfo { side, info } => match side {
                Side::A => m.player_a.clone_from(info),
                Side::B => m.player_b.clone_from(info),
            },
            MatchCommit::PlayerScore { side, score } => match side {
                Side::A => m.player_a_score = *score,
                Side::B => m.player_b_score = *score,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    Persisted,
    /// No store is wired up; the mirror is the only copy.
    LocalOnly,
    /// Persistence failed. The optimistic local value is kept.
    Failed,
}

impl CommitOutcome {
    pub fn is_ok(&self) -> bool {
        !matches!(self, CommitOutcome::Failed)
    }
}

pub fn normalize_match_type(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return DEFAULT_MATCH_TYPE.to_owned();
    }
    trimmed.chars().take(MATCH_TYPE_MAX_LENGTH).collect()
}

/// `max(0, score + delta)`, saturating at `u32::MAX`.
pub fn clamp_score(score: u32, delta: i64) -> u32 {
    let adjusted = i64::from(score).saturating_add(delta);
    adjusted.clamp(0, i64::from(u32::MAX)) as u32
}

impl From<Match> for MatchEntity {
    fn from(value: Match) -> Self {
        Self {
            id: value.id.to_string(),
            match_type: value.match_type,
            player_a_name: value.player_a.name,
            player_a_team: value.player_a.team,
            player_a_skill: value.player_a.skill,
            player_a_score: value.player_a_score,
            player_b_name: value.player_b.name,
            player_b_team: value.player_b.team,
            player_b_skill: value.player_b.skill,
            player_b_score: value.player_b_score,
            match_score_a: value.match_score_a,
            match_score_b: value.match_score_b,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl TryFrom<MatchEntity> for Match {
    type Error = uuid::Error;

    fn try_from(value: MatchEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&value.id)?,
            match_type: value.match_type,
            player_a: PlayerInfo {
                name: value.player_a_name,
                team: value.player_a_team,
                skill: value.player_a_skill,
            },
            player_a_score: value.player_a_score,
            player_b: PlayerInfo {
                name: value.player_b_name,
                team: value.player_b_team,
                skill: value.player_b_skill,
            },
            player_b_score: value.player_b_score,
            match_score_a: value.match_score_a,
            match_score_b: value.match_score_b,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

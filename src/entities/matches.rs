use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct Match {
    pub id: String,
    pub match_type: String,
    pub player_a_name: String,
    pub player_a_team: String,
    pub player_a_skill: String,
    pub player_a_score: u32,
    pub player_b_name: String,
    pub player_b_team: String,
    pub player_b_skill: String,
    pub player_b_score: u32,
    pub match_score_a: u32,
    pub match_score_b: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

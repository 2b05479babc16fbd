use crate::common::context::Context;
use crate::entities::matches::Match;
use crate::models::matches::{MatchCommit, Side};
use uuid::Uuid;

const TABLE_NAME: &str = "matches";
const READ_FIELDS: &str = r#"
id, match_type,
player_a_name, player_a_team, player_a_skill, player_a_score,
player_b_name, player_b_team, player_b_skill, player_b_score,
match_score_a, match_score_b, created_at, updated_at"#;

pub async fn create<C: Context>(ctx: &C, new_match: &Match) -> sqlx::Result<Match> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (id, match_type, player_a_name, player_a_team, player_a_skill, player_a_score,",
        " player_b_name, player_b_team, player_b_skill, player_b_score,",
        " match_score_a, match_score_b) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    );
    sqlx::query(QUERY)
        .bind(&new_match.id)
        .bind(&new_match.match_type)
        .bind(&new_match.player_a_name)
        .bind(&new_match.player_a_team)
        .bind(&new_match.player_a_skill)
        .bind(new_match.player_a_score)
        .bind(&new_match.player_b_name)
        .bind(&new_match.player_b_team)
        .bind(&new_match.player_b_skill)
        .bind(new_match.player_b_score)
        .bind(new_match.match_score_a)
        .bind(new_match.match_score_b)
        .execute(ctx.db())
        .await?;

    // timestamps are assigned by the database
    fetch_one(ctx, &new_match.id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn fetch_one<C: Context>(ctx: &C, match_id: &str) -> sqlx::Result<Option<Match>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(match_id)
        .fetch_optional(ctx.db())
        .await
}

/// Writes only the columns owned by `commit`. Returns whether a row matched.
pub async fn update<C: Context>(ctx: &C, match_id: Uuid, commit: &MatchCommit) -> sqlx::Result<bool> {
    let match_id = match_id.to_string();
    let query = match commit {
        MatchCommit::MatchType { match_type } => sqlx::query(UPDATE_MATCH_TYPE).bind(match_type),
        MatchCommit::MatchScore { score_a, score_b } => sqlx::query(UPDATE_MATCH_SCORE)
            .bind(*score_a)
            .bind(*score_b),
        MatchCommit::PlayerInfo { side, info } => sqlx::query(update_player_info_query(*side))
            .bind(&info.name)
            .bind(&info.team)
            .bind(&info.skill),
        MatchCommit::PlayerScore { side, score } => {
            sqlx::query(update_player_score_query(*side)).bind(*score)
        }
    };
    let result = query.bind(match_id).execute(ctx.db()).await?;
    Ok(result.rows_affected() > 0)
}

// queries

const UPDATE_MATCH_TYPE: &str = const_str::concat!(
    "UPDATE ",
    TABLE_NAME,
    " SET match_type = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
);

const UPDATE_MATCH_SCORE: &str = const_str::concat!(
    "UPDATE ",
    TABLE_NAME,
    " SET match_score_a = ?, match_score_b = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
);

const fn update_player_info_query(side: Side) -> &'static str {
    match side {
        Side::A => const_str::concat!(
            "UPDATE ",
            TABLE_NAME,
            " SET player_a_name = ?, player_a_team = ?, player_a_skill = ?,",
            " updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        ),
        Side::B => const_str::concat!(
            "UPDATE ",
            TABLE_NAME,
            " SET player_b_name = ?, player_b_team = ?, player_b_skill = ?,",
            " updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        ),
    }
}

const fn update_player_score_query(side: Side) -> &'static str {
    match side {
        Side::A => const_str::concat!(
            "UPDATE ",
            TABLE_NAME,
            " SET player_a_score = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        ),
        Side::B => const_str::concat!(
            "UPDATE ",
            TABLE_NAME,
            " SET player_b_score = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        ),
    }
}

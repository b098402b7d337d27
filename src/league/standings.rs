use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::league::aggregate::UserAggregate;

/// One user's row before positions are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub user_id: Uuid,
    pub username: String,
    pub stats: UserAggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStanding {
    pub position: i32,
    pub user_id: Uuid,
    pub username: String,
    #[serde(flatten)]
    pub stats: UserAggregate,
}

/// Ranking order: more points first, then more perfect predictions, then more
/// correct results. Rows equal on all three keys share a position.
pub fn compare_standings(a: &UserAggregate, b: &UserAggregate) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.correct_scores.cmp(&a.correct_scores))
        .then_with(|| b.correct_results.cmp(&a.correct_results))
}

fn same_rank(a: &UserAggregate, b: &UserAggregate) -> bool {
    compare_standings(a, b) == Ordering::Equal
}

/// Sort rows into leaderboard order and assign competition-style positions (1, 2, 2, 4).
///
/// Users without a scored prediction go to the bottom and share the position
/// right after the last ranked user. Exact ties are listed by username, which
/// does not influence the position.
pub fn rank_standings(mut rows: Vec<StandingRow>) -> Vec<RankedStanding> {
    rows.sort_by(|a, b| {
        b.stats
            .has_predictions()
            .cmp(&a.stats.has_predictions())
            .then_with(|| compare_standings(&a.stats, &b.stats))
            .then_with(|| a.username.cmp(&b.username))
    });

    let ranked_count = rows.iter().filter(|r| r.stats.has_predictions()).count() as i32;
    let mut ranked: Vec<RankedStanding> = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let position = if !row.stats.has_predictions() {
            ranked_count + 1
        } else {
            match ranked.last() {
                Some(previous) if same_rank(&previous.stats, &row.stats) => previous.position,
                _ => index as i32 + 1,
            }
        };

        ranked.push(RankedStanding {
            position,
            user_id: row.user_id,
            username: row.username,
            stats: row.stats,
        });
    }

    ranked
}

use serde::{Deserialize, Serialize};

use crate::league::scoring::{CORRECT_RESULT_POINTS, PERFECT_SCORE_POINTS};

/// Season aggregate for one user, derived entirely from their scored predictions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAggregate {
    pub total_points: i32,
    pub correct_scores: i32,
    pub correct_results: i32,
    pub predictions_made: i32,
    pub current_streak: i32,
    pub best_streak: i32,
    pub avg_points_per_game: f64,
}

impl UserAggregate {
    /// Recompute the aggregate from scratch.
    ///
    /// `points` must hold the points of every scored prediction, oldest fixture first.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let mut aggregate = UserAggregate::default();
        let mut run = 0;

        for p in points {
            aggregate.total_points += p;
            aggregate.predictions_made += 1;
            match p {
                PERFECT_SCORE_POINTS => aggregate.correct_scores += 1,
                CORRECT_RESULT_POINTS => aggregate.correct_results += 1,
                _ => {}
            }

            if p > 0 {
                run += 1;
                aggregate.best_streak = aggregate.best_streak.max(run);
            } else {
                run = 0;
            }
        }

        // The run still open after the newest prediction is the current streak
        aggregate.current_streak = run;
        aggregate.avg_points_per_game = if aggregate.predictions_made > 0 {
            aggregate.total_points as f64 / aggregate.predictions_made as f64
        } else {
            0.0
        };

        aggregate
    }

    pub fn has_predictions(&self) -> bool {
        self.predictions_made > 0
    }
}

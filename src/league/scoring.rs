use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Points for predicting the exact final score.
pub const PERFECT_SCORE_POINTS: i32 = 3;
/// Points for predicting the right outcome with the wrong score.
pub const CORRECT_RESULT_POINTS: i32 = 1;

/// A home/away scoreline, used both for predictions and final results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: i32,
    pub away: i32,
}

impl Scoreline {
    pub fn new(home: i32, away: i32) -> Self {
        Self { home, away }
    }

    pub fn outcome(&self) -> MatchOutcome {
        match self.home.cmp(&self.away) {
            Ordering::Greater => MatchOutcome::HomeWin,
            Ordering::Less => MatchOutcome::AwayWin,
            Ordering::Equal => MatchOutcome::Draw,
        }
    }
}

impl fmt::Display for Scoreline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    HomeWin,
    Draw,
    AwayWin,
}

/// How a single prediction fared against the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointsOutcome {
    Perfect,
    CorrectResult,
    Miss,
}

impl PointsOutcome {
    pub fn points(&self) -> i32 {
        match self {
            PointsOutcome::Perfect => PERFECT_SCORE_POINTS,
            PointsOutcome::CorrectResult => CORRECT_RESULT_POINTS,
            PointsOutcome::Miss => 0,
        }
    }

    /// Classify stored points. Anything that is not 3 or 1 counts as a miss.
    pub fn from_points(points: i32) -> Self {
        match points {
            PERFECT_SCORE_POINTS => PointsOutcome::Perfect,
            CORRECT_RESULT_POINTS => PointsOutcome::CorrectResult,
            _ => PointsOutcome::Miss,
        }
    }

    /// Letter shown in a user's recent form: W (3), D (1), L (0).
    pub fn form_letter(&self) -> char {
        match self {
            PointsOutcome::Perfect => 'W',
            PointsOutcome::CorrectResult => 'D',
            PointsOutcome::Miss => 'L',
        }
    }
}

pub fn evaluate_prediction(predicted: Scoreline, actual: Scoreline) -> PointsOutcome {
    if predicted == actual {
        PointsOutcome::Perfect
    } else if predicted.outcome() == actual.outcome() {
        PointsOutcome::CorrectResult
    } else {
        PointsOutcome::Miss
    }
}

/// Points awarded for `predicted` once the fixture finished as `actual`.
pub fn calculate_points(predicted: Scoreline, actual: Scoreline) -> i32 {
    evaluate_prediction(predicted, actual).points()
}

/// Build a form string (newest first) from points ordered newest first.
pub fn form_string(recent_points: &[i32]) -> String {
    recent_points
        .iter()
        .map(|p| PointsOutcome::from_points(*p).form_letter())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_score_earns_three_points() {
        assert_eq!(calculate_points(Scoreline::new(2, 1), Scoreline::new(2, 1)), 3);
        assert_eq!(calculate_points(Scoreline::new(0, 0), Scoreline::new(0, 0)), 3);
    }

    #[test]
    fn same_outcome_earns_one_point() {
        assert_eq!(calculate_points(Scoreline::new(3, 2), Scoreline::new(2, 1)), 1);
        assert_eq!(calculate_points(Scoreline::new(1, 1), Scoreline::new(2, 2)), 1);
        assert_eq!(calculate_points(Scoreline::new(0, 4), Scoreline::new(1, 2)), 1);
    }

    #[test]
    fn wrong_outcome_earns_nothing() {
        assert_eq!(calculate_points(Scoreline::new(1, 1), Scoreline::new(2, 1)), 0);
        assert_eq!(calculate_points(Scoreline::new(0, 1), Scoreline::new(1, 0)), 0);
        assert_eq!(calculate_points(Scoreline::new(2, 0), Scoreline::new(0, 0)), 0);
    }

    #[test]
    fn form_letters_follow_points() {
        assert_eq!(form_string(&[3, 1, 0, 0, 3]), "WDLLW");
        assert_eq!(form_string(&[]), "");
    }

    #[test]
    fn scoreline_displays_as_home_dash_away() {
        assert_eq!(Scoreline::new(2, 1).to_string(), "2-1");
    }

    proptest! {
        #[test]
        fn points_are_zero_one_or_three(h in 0..=20i32, a in 0..=20i32, fh in 0..=20i32, fa in 0..=20i32) {
            let points = calculate_points(Scoreline::new(h, a), Scoreline::new(fh, fa));
            prop_assert!(points == 0 || points == 1 || points == 3);
            prop_assert_eq!(points == 3, h == fh && a == fa);
        }

        #[test]
        fn one_point_means_same_outcome_but_different_score(h in 0..=20i32, a in 0..=20i32, fh in 0..=20i32, fa in 0..=20i32) {
            let predicted = Scoreline::new(h, a);
            let actual = Scoreline::new(fh, fa);
            if calculate_points(predicted, actual) == 1 {
                prop_assert_eq!(predicted.outcome(), actual.outcome());
                prop_assert_ne!(predicted, actual);
            }
        }
    }
}

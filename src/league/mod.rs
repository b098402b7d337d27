//! Pure rules of the prediction game, from scoring and ranking to the
//! prediction deadline and season rollover. Nothing in here touches the database.

pub mod aggregate;
pub mod deadline;
pub mod invite;
pub mod schedule;
pub mod scoring;
pub mod standings;

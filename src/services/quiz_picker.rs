use rand::seq::SliceRandom;

use crate::models::Question;

/// Picks one question at random that has not been played yet.
///
/// Shuffles the candidate pool, then takes the first question whose id
/// is not in `previous`. Returns None once the pool is exhausted.
pub fn pick_question(mut pool: Vec<Question>, previous: &[i64]) -> Option<Question> {
    let mut rng = rand::thread_rng();
    pool.shuffle(&mut rng);
    pool.into_iter().find(|q| !previous.contains(&q.id))
}

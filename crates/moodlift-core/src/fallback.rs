//! Static fallback meme table.
//!
//! Used when no external media source produces a URL. Populated at startup,
//! never mutated; the `neutral` entry is the catch-all for any label absent
//! from the table, so resolution can never come up empty.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use rand::Rng;

use crate::emotion::{DEFAULT_EMOTION, EmotionLabel};

static BUILTIN_POOLS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        (
            "angry",
            vec![
                "https://media.giphy.com/media/11tTNkNy1SdXGg/giphy.gif", // Office rage
                "https://media.giphy.com/media/l1J9u3TZfpmeDLkD6/giphy.gif", // Samuel L Jackson
                "https://media.giphy.com/media/3o9bJX4O9ShW1L32eY/giphy.gif", // Panda rage
                "https://media.giphy.com/media/11tTNkNy1SdXGg/giphy.gif", // Duplicate for weight
                "https://media.giphy.com/media/WoF3yfYupTt8mHc7va/giphy.gif", // Arthur fist
            ],
        ),
        (
            "sad",
            vec![
                "https://media.giphy.com/media/OPU6wzx8JrHna/giphy.gif", // Crying cat
                "https://media.giphy.com/media/d2lcHJTG5Tscg/giphy.gif", // Crying Dawson
                "https://media.giphy.com/media/7SF5scGB2AFrgsXP63/giphy.gif", // Sad Pikachu
                "https://media.giphy.com/media/ISOckXUybVfQ4/giphy.gif", // Rain cloud
            ],
        ),
        (
            "happy",
            vec![
                "https://media.giphy.com/media/3oEjI6SIIHBdRxXI40/giphy.gif", // Happy cat
                "https://media.giphy.com/media/chzz1FQgqhszAEiyNd/giphy.gif", // Dog smile
                "https://media.giphy.com/media/xT5LMHxhOfscxPfIfm/giphy.gif", // Minions
            ],
        ),
        (
            "fear",
            vec![
                "https://media.giphy.com/media/14ut8PhnIwzros/giphy.gif", // Scared cat
                "https://media.giphy.com/media/bEVKYB487Lqxy/giphy.gif", // Clint Eastwood
            ],
        ),
        (
            DEFAULT_EMOTION,
            vec![
                "https://media.giphy.com/media/l3q2K5jinAlChoCLS/giphy.gif", // Confused math
                "https://media.giphy.com/media/hzrvwvnb9BsYXfq7u2/giphy.gif", // Waiting
            ],
        ),
    ])
});

/// Read-only mapping from emotion tag to a non-empty pool of media URLs.
#[derive(Debug, Clone)]
pub struct FallbackTable {
    pools: HashMap<&'static str, Vec<&'static str>>,
}

impl FallbackTable {
    /// Builds a table from explicit pools. The `neutral` entry must be
    /// present and non-empty; it is the guarantee that resolution cannot
    /// terminally fail.
    pub fn from_pools(pools: HashMap<&'static str, Vec<&'static str>>) -> Self {
        debug_assert!(
            pools.get(DEFAULT_EMOTION).is_some_and(|p| !p.is_empty()),
            "fallback table requires a non-empty default entry"
        );
        Self { pools }
    }

    /// The pool for `emotion`, or the default pool when the label is absent.
    pub fn pool(&self, emotion: &EmotionLabel) -> &[&'static str] {
        self.pools
            .get(emotion.as_str())
            .or_else(|| self.pools.get(DEFAULT_EMOTION))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Picks one URL uniformly at random from the pool for `emotion`.
    pub fn pick<R: Rng + ?Sized>(&self, emotion: &EmotionLabel, rng: &mut R) -> &'static str {
        let pool = self.pool(emotion);
        pool[rng.gen_range(0..pool.len())]
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::from_pools(BUILTIN_POOLS.clone())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_known_labels_have_pools() {
        let table = FallbackTable::default();
        for tag in ["angry", "sad", "happy", "fear", "neutral"] {
            assert!(
                !table.pool(&EmotionLabel::new(tag)).is_empty(),
                "pool for {tag} must be non-empty"
            );
        }
    }

    #[test]
    fn test_unknown_label_uses_default_pool() {
        let table = FallbackTable::default();
        let unknown = table.pool(&EmotionLabel::new("perplexed"));
        let neutral = table.pool(&EmotionLabel::neutral());
        assert_eq!(unknown, neutral);
    }

    #[test]
    fn test_pick_is_deterministic_under_seed() {
        let table = FallbackTable::default();
        let sad = EmotionLabel::new("sad");
        let a = table.pick(&sad, &mut StdRng::seed_from_u64(7));
        let b = table.pick(&sad, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(table.pool(&sad).contains(&a));
    }

    #[test]
    fn test_pick_stays_in_pool() {
        let table = FallbackTable::default();
        let angry = EmotionLabel::new("angry");
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..32 {
            let url = table.pick(&angry, &mut rng);
            assert!(table.pool(&angry).contains(&url));
        }
    }
}

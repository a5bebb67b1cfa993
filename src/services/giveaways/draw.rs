use rand::seq::SliceRandom;
use rand::Rng;

/// Pick `count` distinct winners uniformly, or everyone if there are fewer entries
pub fn draw_winners<R: Rng + ?Sized>(entries: &[u64], count: usize, rng: &mut R) -> Vec<u64> {
    entries.choose_multiple(rng, count).copied().collect()
}

/// Pick one replacement winner, preferring entrants who have not won yet
pub fn reroll_winner<R: Rng + ?Sized>(entries: &[u64], previous: &[u64], rng: &mut R) -> Option<u64> {
    let fresh: Vec<u64> = entries
        .iter()
        .copied()
        .filter(|id| !previous.contains(id))
        .collect();

    if fresh.is_empty() {
        entries.choose(rng).copied()
    } else {
        fresh.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_draw_is_distinct_and_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let entries: Vec<u64> = (1..=20).collect();

        let winners = draw_winners(&entries, 5, &mut rng);
        assert_eq!(winners.len(), 5);
        assert_eq!(winners.iter().collect::<HashSet<_>>().len(), 5);
        assert!(winners.iter().all(|w| entries.contains(w)));
    }

    #[test]
    fn test_draw_with_fewer_entries_than_winners() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut winners = draw_winners(&[3, 1, 2], 10, &mut rng);
        winners.sort();
        assert_eq!(winners, vec![1, 2, 3]);
        assert!(draw_winners(&[], 3, &mut rng).is_empty());
    }

    #[test]
    fn test_reroll_prefers_new_winner() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            assert_eq!(reroll_winner(&[1, 2], &[1], &mut rng), Some(2));
        }
        // Everyone already won: anyone may be picked again
        assert!(reroll_winner(&[1], &[1], &mut rng).is_some());
        assert_eq!(reroll_winner(&[], &[], &mut rng), None);
    }
}

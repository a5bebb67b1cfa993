//! Best-of-N coinflip between two members.

use rand::Rng;
use serenity::all::{CreateEmbed, UserId};

use crate::constants::embeds::{self, PRIMARY_COLOR, SUCCESS_COLOR};
use crate::utils::formatting::mention_user;

pub const MAX_FLIPS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// One player in a match
#[derive(Debug, Clone)]
pub struct Player {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CoinflipMatch {
    pub first: Player,
    pub second: Player,
    total: u32,
    first_wins: u32,
    second_wins: u32,
}

impl CoinflipMatch {
    pub fn new(first: Player, second: Player, flips: u32) -> Result<Self, String> {
        if flips < 1 {
            return Err("Number of flips must be at least 1!".to_string());
        }
        if flips > MAX_FLIPS {
            return Err(format!("Maximum {} flips allowed!", MAX_FLIPS));
        }

        Ok(Self {
            first,
            second,
            total: flips,
            first_wins: 0,
            second_wins: 0,
        })
    }

    /// Flip once. Returns None once every flip has been made
    pub fn flip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Side> {
        if self.is_finished() {
            return None;
        }

        let side = if rng.gen_bool(0.5) { Side::First } else { Side::Second };
        match side {
            Side::First => self.first_wins += 1,
            Side::Second => self.second_wins += 1,
        }
        Some(side)
    }

    pub fn flips_done(&self) -> u32 {
        self.first_wins + self.second_wins
    }

    pub fn remaining(&self) -> u32 {
        self.total - self.flips_done()
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    pub fn score(&self) -> (u32, u32) {
        (self.first_wins, self.second_wins)
    }

    /// Leader after all flips, None for a tie
    pub fn winner(&self) -> Option<&Player> {
        match self.first_wins.cmp(&self.second_wins) {
            std::cmp::Ordering::Greater => Some(&self.first),
            std::cmp::Ordering::Less => Some(&self.second),
            std::cmp::Ordering::Equal => None,
        }
    }

    fn player(&self, side: Side) -> &Player {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    fn versus(&self) -> String {
        format!("{} vs {}", mention_user(self.first.id), mention_user(self.second.id))
    }

    /// Embed shown while flipping
    pub fn progress_embed(&self, last: Option<Side>) -> CreateEmbed {
        let mut description = self.versus();
        if let Some(side) = last {
            description.push_str(&format!(
                "\n\n**Flip #{}**: {} wins!",
                self.flips_done(),
                mention_user(self.player(side).id)
            ));
        }

        embeds::gold_embed()
            .title("🪙 Coinflip Battle!")
            .description(description)
            .field(&self.first.name, self.first_wins.to_string(), true)
            .field(&self.second.name, self.second_wins.to_string(), true)
            .field("Flips Remaining", self.remaining().to_string(), false)
    }

    pub fn result_embed(&self) -> CreateEmbed {
        let embed = CreateEmbed::new()
            .title("🏆 Coinflip Results!")
            .description(self.versus())
            .field(&self.first.name, format!("**{}** wins", self.first_wins), true)
            .field(&self.second.name, format!("**{}** wins", self.second_wins), true);

        match self.winner() {
            Some(player) => embed
                .color(SUCCESS_COLOR)
                .field("Winner", format!("🎉 {}", mention_user(player.id)), false),
            None => embed.color(PRIMARY_COLOR).field("Result", "🤝 It's a tie!", false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn players() -> (Player, Player) {
        (
            Player { id: UserId::new(1), name: "ana".to_string() },
            Player { id: UserId::new(2), name: "ben".to_string() },
        )
    }

    #[test]
    fn test_flip_count_bounds() {
        let (a, b) = players();
        assert!(CoinflipMatch::new(a.clone(), b.clone(), 0).is_err());
        assert!(CoinflipMatch::new(a.clone(), b.clone(), 101).is_err());
        assert!(CoinflipMatch::new(a, b, 100).is_ok());
    }

    #[test]
    fn test_match_runs_to_completion() {
        let (a, b) = players();
        let mut game = CoinflipMatch::new(a, b, 9).expect("valid");
        let mut rng = StdRng::seed_from_u64(3);

        let mut flips = 0;
        while game.flip(&mut rng).is_some() {
            flips += 1;
        }

        assert_eq!(flips, 9);
        assert!(game.is_finished());
        let (x, y) = game.score();
        assert_eq!(x + y, 9);
        // An odd number of flips always has a winner
        assert!(game.winner().is_some());
        assert!(game.flip(&mut rng).is_none());
    }

    #[test]
    fn test_tie_has_no_winner() {
        let (a, b) = players();
        let mut game = CoinflipMatch::new(a, b, 2).expect("valid");
        game.first_wins = 1;
        game.second_wins = 1;
        assert!(game.winner().is_none());
    }
}

use chrono::{DateTime, Utc};
use serenity::all::Colour;

use crate::constants::embeds::{PRIMARY_COLOR, SUCCESS_COLOR, WARNING_COLOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, poise::ChoiceParameter)]
#[sqlx(type_name = "ticket_kind", rename_all = "lowercase")]
pub enum TicketKind {
    Partnership,
    Middleman,
    Support,
}

impl TicketKind {
    pub const ALL: [TicketKind; 3] = [
        TicketKind::Partnership,
        TicketKind::Middleman,
        TicketKind::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketKind::Partnership => "partnership",
            TicketKind::Middleman => "middleman",
            TicketKind::Support => "support",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketKind::Partnership => "Partnership",
            TicketKind::Middleman => "Middleman",
            TicketKind::Support => "Support",
        }
    }

    pub fn emoji(&self) -> char {
        match self {
            TicketKind::Partnership => '🤝',
            TicketKind::Middleman => '⚖',
            TicketKind::Support => '🎫',
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TicketKind::Partnership => "Partnership opportunities and collaborations",
            TicketKind::Middleman => "Secure trading with a trusted middleman",
            TicketKind::Support => "General help and questions",
        }
    }

    pub fn color(&self) -> Colour {
        match self {
            TicketKind::Partnership => PRIMARY_COLOR,
            TicketKind::Middleman => WARNING_COLOR,
            TicketKind::Support => SUCCESS_COLOR,
        }
    }
}

/// Middleman tiers, chosen by the value of the trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, poise::ChoiceParameter)]
#[sqlx(type_name = "mm_tier", rename_all = "lowercase")]
pub enum MmTier {
    Trial,
    Middleman,
    Pro,
    Head,
    Owner,
}

impl MmTier {
    pub const ALL: [MmTier; 5] = [
        MmTier::Trial,
        MmTier::Middleman,
        MmTier::Pro,
        MmTier::Head,
        MmTier::Owner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MmTier::Trial => "trial",
            MmTier::Middleman => "middleman",
            MmTier::Pro => "pro",
            MmTier::Head => "head",
            MmTier::Owner => "owner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            MmTier::Trial => "Trial Middleman",
            MmTier::Middleman => "Middleman",
            MmTier::Pro => "Pro Middleman",
            MmTier::Head => "Head Middleman",
            MmTier::Owner => "Owner",
        }
    }

    pub fn range(&self) -> &'static str {
        match self {
            MmTier::Trial => "Up to 100m/s",
            MmTier::Middleman => "100m/s - 250m/s",
            MmTier::Pro => "250m/s - 500m/s",
            MmTier::Head => "500m/s+",
            MmTier::Owner => "500m/s+ (fee required)",
        }
    }

    pub fn emoji(&self) -> char {
        match self {
            MmTier::Trial => '🆕',
            MmTier::Middleman => '⚖',
            MmTier::Pro => '⭐',
            MmTier::Head => '👑',
            MmTier::Owner => '💎',
        }
    }
}

/// Free-text trade fields collected for middleman tickets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeDetails {
    pub trader: String,
    pub giving: String,
    pub receiving: String,
    pub both_join: String,
    pub tip: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Ticket {
    pub channel_id: i64,
    pub guild_id: i64,
    pub owner_id: i64,
    pub kind: TicketKind,
    pub tier: Option<MmTier>,
    pub trader: Option<String>,
    pub giving: Option<String>,
    pub receiving: Option<String>,
    pub both_join: Option<String>,
    pub tip: Option<String>,
    pub claimed_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_claimed(&self) -> bool {
        self.claimed_by.is_some()
    }

    /// Trade details, if this ticket was opened through the middleman form
    pub fn trade(&self) -> Option<TradeDetails> {
        Some(TradeDetails {
            trader: self.trader.clone()?,
            giving: self.giving.clone()?,
            receiving: self.receiving.clone()?,
            both_join: self.both_join.clone().unwrap_or_default(),
            tip: self.tip.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(TicketKind::parse("Support"), Some(TicketKind::Support));
        assert_eq!(TicketKind::parse(" middleman "), Some(TicketKind::Middleman));
        assert_eq!(TicketKind::parse("billing"), None);
    }

    #[test]
    fn test_tier_parse_roundtrips_names() {
        for tier in MmTier::ALL {
            assert_eq!(MmTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(MmTier::parse("legend"), None);
    }
}

//! Ticket state rules and channel naming, free of any Discord calls.

use thiserror::Error;

use crate::constants::tickets::{CLAIMED_SUFFIX, MAX_CHANNEL_NAME_LEN, TICKET_PREFIX};
use crate::db::models::{Ticket, TicketKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    Open,
    Claimed { by: u64 },
}

impl TicketState {
    pub fn of(ticket: &Ticket) -> Self {
        match ticket.claimed_by {
            Some(by) => TicketState::Claimed { by: by as u64 },
            None => TicketState::Open,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("This ticket is already claimed by <@{by}>")]
    AlreadyClaimed { by: u64 },

    #[error("This ticket is not claimed")]
    NotClaimed,

    #[error("Only the claimer or an administrator can unclaim this ticket")]
    NotClaimer,

    #[error("Only middlemen or administrators can claim middleman tickets")]
    NotMiddleman,

    #[error("Only ticket staff can do that")]
    NotStaff,

    #[error("This command only works in middleman tickets")]
    NotMiddlemanTicket,

    #[error("No proof channel is configured. Set one with `config proof-channel`")]
    NoProofChannel,

    #[error("Invalid ticket name: {0}")]
    InvalidName(String),
}

/// Who is trying to claim and what they hold
#[derive(Debug, Clone, Copy)]
pub struct ClaimActor {
    pub is_admin: bool,
    pub is_staff: bool,
    pub holds_middleman_role: bool,
}

pub fn check_claim(ticket: &Ticket, actor: ClaimActor) -> Result<(), TicketError> {
    if let TicketState::Claimed { by } = TicketState::of(ticket) {
        return Err(TicketError::AlreadyClaimed { by });
    }

    if ticket.kind == TicketKind::Middleman {
        if !(actor.is_admin || actor.holds_middleman_role) {
            return Err(TicketError::NotMiddleman);
        }
    } else if !(actor.is_admin || actor.is_staff) {
        return Err(TicketError::NotStaff);
    }

    Ok(())
}

/// Returns the current claimer if `actor_id` may release the ticket
pub fn check_unclaim(ticket: &Ticket, actor_id: u64, is_admin: bool) -> Result<u64, TicketError> {
    match TicketState::of(ticket) {
        TicketState::Open => Err(TicketError::NotClaimed),
        TicketState::Claimed { by } if by == actor_id || is_admin => Ok(by),
        TicketState::Claimed { .. } => Err(TicketError::NotClaimer),
    }
}

pub fn is_ticket_channel(name: &str) -> bool {
    name.starts_with(TICKET_PREFIX)
}

/// `ticket-{username}-{kind}`, reduced to characters Discord keeps in channel names
pub fn channel_name(username: &str, kind: TicketKind) -> String {
    let user = slug(username);
    let user = if user.is_empty() { "user".to_string() } else { user };
    clamp(format!("{}{}-{}", TICKET_PREFIX, user, kind.as_str()))
}

pub fn claimed_name(name: &str) -> String {
    if name.ends_with(CLAIMED_SUFFIX) {
        name.to_string()
    } else {
        let room = MAX_CHANNEL_NAME_LEN - CLAIMED_SUFFIX.len();
        let base: String = name.chars().take(room).collect();
        format!("{}{}", base, CLAIMED_SUFFIX)
    }
}

pub fn unclaimed_name(name: &str) -> String {
    name.strip_suffix(CLAIMED_SUFFIX).unwrap_or(name).to_string()
}

/// Normalize a requested name: lowercase, spaces to dashes, always `ticket-` prefixed
pub fn renamed(input: &str) -> Result<String, TicketError> {
    let name = input.trim().to_lowercase().replace(' ', "-");
    let name = name.strip_prefix(TICKET_PREFIX).unwrap_or(&name);
    let name = slug(name);

    if name.is_empty() {
        return Err(TicketError::InvalidName("name cannot be empty".to_string()));
    }

    Ok(clamp(format!("{}{}", TICKET_PREFIX, name)))
}

/// The part after `ticket-`, shown as the ticket number in proof embeds
pub fn ticket_label(name: &str) -> &str {
    let name = name.strip_prefix(TICKET_PREFIX).unwrap_or(name);
    name.strip_suffix(CLAIMED_SUFFIX).unwrap_or(name)
}

fn slug(s: &str) -> String {
    let mapped: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '-' })
        .collect();

    mapped
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn clamp(name: String) -> String {
    if name.chars().count() <= MAX_CHANNEL_NAME_LEN {
        name
    } else {
        name.chars().take(MAX_CHANNEL_NAME_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn ticket(kind: TicketKind, claimed_by: Option<i64>) -> Ticket {
        Ticket {
            channel_id: 10,
            guild_id: 1,
            owner_id: 5,
            kind,
            tier: None,
            trader: None,
            giving: None,
            receiving: None,
            both_join: None,
            tip: None,
            claimed_by,
            created_at: Utc::now(),
        }
    }

    const STAFF: ClaimActor = ClaimActor { is_admin: false, is_staff: true, holds_middleman_role: false };
    const MIDDLEMAN: ClaimActor = ClaimActor { is_admin: false, is_staff: false, holds_middleman_role: true };
    const ADMIN: ClaimActor = ClaimActor { is_admin: true, is_staff: false, holds_middleman_role: false };

    #[test]
    fn test_claim_requires_open_ticket() {
        let claimed = ticket(TicketKind::Support, Some(7));
        assert_eq!(check_claim(&claimed, ADMIN), Err(TicketError::AlreadyClaimed { by: 7 }));
        assert!(check_claim(&ticket(TicketKind::Support, None), STAFF).is_ok());
    }

    #[test]
    fn test_middleman_claim_needs_tier_role() {
        let mm = ticket(TicketKind::Middleman, None);
        assert_eq!(check_claim(&mm, STAFF), Err(TicketError::NotMiddleman));
        assert!(check_claim(&mm, MIDDLEMAN).is_ok());
        assert!(check_claim(&mm, ADMIN).is_ok());
    }

    #[test]
    fn test_unclaim_rules() {
        let open = ticket(TicketKind::Support, None);
        assert_eq!(check_unclaim(&open, 7, true), Err(TicketError::NotClaimed));

        let claimed = ticket(TicketKind::Support, Some(7));
        assert_eq!(check_unclaim(&claimed, 7, false), Ok(7));
        assert_eq!(check_unclaim(&claimed, 8, false), Err(TicketError::NotClaimer));
        assert_eq!(check_unclaim(&claimed, 8, true), Ok(7));
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(channel_name("Bob.Smith", TicketKind::Support), "ticket-bob-smith-support");
        assert_eq!(channel_name("!!!", TicketKind::Partnership), "ticket-user-partnership");
        assert!(is_ticket_channel(&channel_name("x", TicketKind::Middleman)));
    }

    #[test]
    fn test_claim_suffix_round_trip() {
        let name = "ticket-bob-support";
        let claimed = claimed_name(name);
        assert_eq!(claimed, "ticket-bob-support-claimed");
        assert_eq!(claimed_name(&claimed), claimed);
        assert_eq!(unclaimed_name(&claimed), name);
    }

    #[test]
    fn test_rename() {
        assert_eq!(renamed("Big Trade").as_deref(), Ok("ticket-big-trade"));
        assert_eq!(renamed("ticket-done").as_deref(), Ok("ticket-done"));
        assert!(renamed("   ").is_err());
    }

    #[test]
    fn test_only_prefixed_channels_are_tickets() {
        assert!(is_ticket_channel("ticket-bob-support"));
        assert!(!is_ticket_channel("general"));
        assert!(!is_ticket_channel("old-ticket-bob"));
        for requested in ["Big Trade", "ticket-done", "x"] {
            assert!(is_ticket_channel(&renamed(requested).unwrap_or_default()));
        }
        assert!(is_ticket_channel(&claimed_name("ticket-bob-support")));
    }

    #[test]
    fn test_ticket_label() {
        assert_eq!(ticket_label("ticket-bob-middleman-claimed"), "bob-middleman");
    }
}

//! Who may moderate whom.

/// Everything needed to decide whether a moderation action is allowed
#[derive(Debug, Clone, Copy)]
pub struct ActionCheck {
    pub actor_id: u64,
    pub target_id: u64,
    pub bot_owner_id: Option<u64>,
    pub guild_owner_id: u64,
    pub actor_top_role: u16,
    pub target_top_role: u16,
    pub bot_top_role: u16,
}

pub fn can_act_on(check: &ActionCheck) -> Result<(), String> {
    if check.actor_id == check.target_id {
        return Err("You can't do that to yourself".to_string());
    }

    if check.bot_owner_id == Some(check.actor_id) {
        return Ok(());
    }

    if check.bot_owner_id == Some(check.target_id) {
        return Err("You can't touch the bot owner".to_string());
    }

    if check.target_id == check.guild_owner_id {
        return Err("You can't do that to the server owner".to_string());
    }

    if check.actor_id != check.guild_owner_id && check.actor_top_role <= check.target_top_role {
        return Err("Their top role is higher than or equal to yours".to_string());
    }

    if check.bot_top_role <= check.target_top_role {
        return Err("Their top role is too high for me to act on".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check() -> ActionCheck {
        ActionCheck {
            actor_id: 1,
            target_id: 2,
            bot_owner_id: Some(99),
            guild_owner_id: 50,
            actor_top_role: 10,
            target_top_role: 5,
            bot_top_role: 20,
        }
    }

    #[test]
    fn test_allowed_when_above_target() {
        assert!(can_act_on(&check()).is_ok());
    }

    #[test]
    fn test_no_self_action() {
        let c = ActionCheck { target_id: 1, ..check() };
        assert!(can_act_on(&c).is_err());
    }

    #[test]
    fn test_owner_bypasses_hierarchy() {
        let c = ActionCheck { actor_id: 99, actor_top_role: 0, ..check() };
        assert!(can_act_on(&c).is_ok());
    }

    #[test]
    fn test_protected_targets() {
        let c = ActionCheck { target_id: 99, ..check() };
        assert!(can_act_on(&c).is_err());

        let c = ActionCheck { target_id: 50, ..check() };
        assert!(can_act_on(&c).is_err());
    }

    #[test]
    fn test_role_hierarchy() {
        let c = ActionCheck { target_top_role: 10, ..check() };
        assert_eq!(
            can_act_on(&c),
            Err("Their top role is higher than or equal to yours".to_string())
        );

        let c = ActionCheck { actor_top_role: 30, target_top_role: 25, ..check() };
        assert_eq!(
            can_act_on(&c),
            Err("Their top role is too high for me to act on".to_string())
        );
    }

    #[test]
    fn test_guild_owner_outranks_everyone() {
        let c = ActionCheck { actor_id: 50, actor_top_role: 0, ..check() };
        assert!(can_act_on(&c).is_ok());
    }
}

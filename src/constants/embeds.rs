use serenity::all::{Colour, CreateEmbed, Timestamp};

// ============================================================================
// Color Palette
// ============================================================================

/// Primary brand color - Blurple
pub const PRIMARY_COLOR: Colour = Colour::new(0x5865F2);

/// Success color - Green
pub const SUCCESS_COLOR: Colour = Colour::new(0x57F287);

/// Error color - Red
pub const ERROR_COLOR: Colour = Colour::new(0xED4245);

/// Warning color - Yellow
pub const WARNING_COLOR: Colour = Colour::new(0xFEE75C);

/// Alert color - Orange, used for security events that are not yet actions
pub const ALERT_COLOR: Colour = Colour::new(0xE67E22);

/// Gold, used for giveaways and coinflips
pub const GOLD_COLOR: Colour = Colour::new(0xF1C40F);

// ============================================================================
// Text Formatting
// ============================================================================

/// Section divider (thin line)
pub const DIVIDER: &str = "───────────────────────";

/// Bullet point character
pub const BULLET: &str = "•";

// ============================================================================
// Embed Builders
// ============================================================================

/// Create a standard/primary embed
pub fn standard_embed() -> CreateEmbed {
    CreateEmbed::new().color(PRIMARY_COLOR)
}

/// Create a success embed
pub fn success_embed() -> CreateEmbed {
    CreateEmbed::new().color(SUCCESS_COLOR)
}

/// Create an error embed
pub fn error_embed() -> CreateEmbed {
    CreateEmbed::new().color(ERROR_COLOR)
}

/// Create a warning embed
pub fn warning_embed() -> CreateEmbed {
    CreateEmbed::new().color(WARNING_COLOR)
}

/// Create a gold embed
pub fn gold_embed() -> CreateEmbed {
    CreateEmbed::new().color(GOLD_COLOR)
}

/// Create an embed stamped with the current time
pub fn timestamped(embed: CreateEmbed) -> CreateEmbed {
    embed.timestamp(Timestamp::now())
}

// ============================================================================
// Text Helpers
// ============================================================================

/// Format a list of items with bullet points
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("{} {}", BULLET, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a section with a header and content
pub fn section(header: &str, content: &str) -> String {
    format!("**{}**\n{}", header, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_list() {
        assert_eq!(bullet_list(&["a", "b"]), "• a\n• b");
        assert_eq!(bullet_list::<&str>(&[]), "");
    }
}

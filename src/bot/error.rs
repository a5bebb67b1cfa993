use thiserror::Error;

use crate::services::giveaways::GiveawayError;
use crate::services::tickets::TicketError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("Giveaway store error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("This is not a ticket channel")]
    NotATicket,

    #[error("{0}")]
    Ticket(#[from] TicketError),

    #[error("{0}")]
    Giveaway(#[from] GiveawayError),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }

    pub fn denied<S: Into<String>>(msg: S) -> Self {
        Error::PermissionDenied(msg.into())
    }

    /// Message shown to the user who triggered the error
    pub fn user_message(&self) -> String {
        match self {
            Error::PermissionDenied(reason) => format!("You don't have permission to do that: {}", reason),
            Error::Database(_) | Error::Io(_) | Error::Json(_) => {
                "Something went wrong on our side. Try again in a moment.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_internals() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert!(!err.user_message().contains("disk"));

        let err = Error::denied("staff only");
        assert!(err.user_message().contains("staff only"));

        assert_eq!(Error::NotATicket.user_message(), "This is not a ticket channel");
    }
}

// Framework error hook: domain errors become an ephemeral reply to the user.

use crate::core::roster::RosterError;
use crate::core::wizard::WizardError;
use crate::discord::{Data, Error};

const GENERIC_FAILURE: &str = "Something went wrong while saving. Please try again later.";

/// Text shown to the user for a failed command. Storage failures are not
/// shown verbatim.
pub fn user_message(error: &Error) -> String {
    let roster = error.downcast_ref::<RosterError>().or_else(|| {
        match error.downcast_ref::<WizardError>() {
            Some(WizardError::Roster(inner)) => Some(inner),
            _ => None,
        }
    });
    match roster {
        Some(RosterError::Store(_)) => GENERIC_FAILURE.to_string(),
        _ => error.to_string(),
    }
}

fn is_internal(error: &Error) -> bool {
    user_message(error) == GENERIC_FAILURE
        || !(error.is::<RosterError>() || error.is::<WizardError>())
}

pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command = ctx.command().name.clone();
            if is_internal(&error) {
                tracing::error!(command = %command, error = %error, "Command failed");
            } else {
                tracing::info!(command = %command, error = %error, "Command rejected");
            }

            let reply = poise::CreateReply::default()
                .content(user_message(&error))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::warn!(command = %command, error = %e, "Failed to send error reply");
            }
        }
        // A check that returned `false` has already replied with the denial.
        poise::FrameworkError::CommandCheckFailed { error: None, .. } => {}
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!(error = %e, "Error while handling framework error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::roster::StoreError;

    #[test]
    fn test_domain_errors_are_shown_as_is() {
        let error: Error = Box::new(RosterError::AlreadyApplied);
        assert_eq!(user_message(&error), "You have already applied to this team.");
        assert!(!is_internal(&error));

        let error: Error = Box::new(WizardError::NoSession);
        assert_eq!(
            user_message(&error),
            "This selection has expired. Please start again."
        );
    }

    #[test]
    fn test_storage_errors_are_masked() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: Error = Box::new(RosterError::Store(StoreError::Io(io)));
        assert_eq!(user_message(&error), GENERIC_FAILURE);
        assert!(is_internal(&error));
    }
}

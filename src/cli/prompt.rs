use crate::{Action, Confirm, Confirmation, ResourceRecord};
use inquire::InquireError;

/// Asks on the terminal. Anything but an explicit yes declines, except Ctrl-C,
/// which the raw-mode prompt captures and reports as an interrupt.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, action: &Action, targets: &[ResourceRecord]) -> Confirmation {
        eprintln!("The following guests will be affected by {action}:");
        for (idx, record) in targets.iter().enumerate() {
            eprintln!(
                "{}. {}: {} on {}",
                idx + 1,
                record.label(),
                record.name.as_deref().unwrap_or("-"),
                record.node
            );
        }

        let answer = inquire::Confirm::new(&format!("{action} {} guest(s)?", targets.len()))
            .with_default(false)
            .with_help_message("this cannot be undone")
            .prompt();
        confirmation(answer)
    }
}

fn confirmation(answer: Result<bool, InquireError>) -> Confirmation {
    match answer {
        Ok(true) => Confirmation::Confirmed,
        Err(InquireError::OperationInterrupted) => Confirmation::Interrupted,
        Ok(false) | Err(_) => Confirmation::Declined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_answers() {
        assert_eq!(confirmation(Ok(true)), Confirmation::Confirmed);
        assert_eq!(confirmation(Ok(false)), Confirmation::Declined);
        assert_eq!(
            confirmation(Err(InquireError::OperationCanceled)),
            Confirmation::Declined
        );
        assert_eq!(
            confirmation(Err(InquireError::NotTTY)),
            Confirmation::Declined
        );
        assert_eq!(
            confirmation(Err(InquireError::OperationInterrupted)),
            Confirmation::Interrupted
        );
    }
}

//! Command structs

use teloxide::utils::command::BotCommands;

/// Slash commands shown in the Telegram command menu.
///
/// Parsing happens in the conversation layer; this enum only describes the
/// commands to Telegram.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Expense tracking commands:")]
pub enum MenuCommands {
    #[command(description = "Show the main menu.")]
    Start,
    #[command(description = "Show what the bot can do.")]
    Help,
    #[command(description = "Add a new expense.")]
    Add,
    #[command(description = "Totals of the last days by category.")]
    Stats,
    #[command(description = "Your latest entries.")]
    History,
    #[command(description = "Edit a recent entry.")]
    Edit,
    #[command(description = "Delete a recent entry.")]
    Delete,
    #[command(description = "Download your expenses.")]
    Export,
    #[command(description = "Stop the current step.")]
    Cancel,
}

#[cfg(test)]
mod tests {
    use conversation::{Command, Event};

    use super::*;

    #[test]
    fn every_registered_command_is_understood() {
        for command in MenuCommands::bot_commands() {
            let event = Event::from_text(&format!("/{}", command.command.trim_start_matches('/')));
            assert!(
                matches!(event, Event::Menu(_) | Event::Cancel),
                "/{} is not routed",
                command.command
            );
        }
        assert_eq!(Event::from_text("/export"), Event::Menu(Command::Export));
    }
}

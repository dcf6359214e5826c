use conversation::{CANCEL_LABEL, Choice, Command, Event, Keyboard};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

pub(crate) fn render_reply_keyboard(keyboard: Keyboard) -> KeyboardMarkup {
    match keyboard {
        Keyboard::Menu => render_main_menu(),
        Keyboard::Cancel => {
            KeyboardMarkup::new(vec![vec![KeyboardButton::new(CANCEL_LABEL)]]).resize_keyboard()
        }
    }
}

/// Main menu, two buttons per row.
pub(crate) fn render_main_menu() -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = Command::MENU
        .chunks(2)
        .map(|row| {
            row.iter()
                .map(|command| KeyboardButton::new(command.label()))
                .collect()
        })
        .collect();
    KeyboardMarkup::new(rows).resize_keyboard()
}

/// Lays choices out `columns` per row; the cancel choice gets its own last row.
pub(crate) fn render_choices(choices: &[Choice], columns: usize) -> InlineKeyboardMarkup {
    let cancel_token = Event::Cancel.payload();
    let (cancel, options): (Vec<&Choice>, Vec<&Choice>) = choices
        .iter()
        .partition(|choice| Some(&choice.token) == cancel_token.as_ref());

    let mut rows: Vec<Vec<InlineKeyboardButton>> = options
        .chunks(columns.max(1))
        .map(|row| row.iter().map(|choice| button(choice)).collect())
        .collect();
    if !cancel.is_empty() {
        rows.push(cancel.into_iter().map(button).collect());
    }
    InlineKeyboardMarkup::new(rows)
}

fn button(choice: &Choice) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(choice.label.clone(), choice.token.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(label: &str, token: &str) -> Choice {
        Choice {
            label: label.to_string(),
            token: token.to_string(),
        }
    }

    #[test]
    fn choices_fill_rows_and_cancel_goes_last() {
        let choices = vec![
            choice("🍔 Food", "cat:food"),
            choice("🏠 Housing", "cat:housing"),
            choice("🚗 Transport", "cat:transport"),
            choice(CANCEL_LABEL, "cancel"),
        ];
        let markup = render_choices(&choices, 2);
        let rows: Vec<usize> = markup.inline_keyboard.iter().map(Vec::len).collect();
        assert_eq!(rows, vec![2, 1, 1]);
        assert_eq!(markup.inline_keyboard[2][0].text, CANCEL_LABEL);
    }

    #[test]
    fn main_menu_has_every_menu_command() {
        let markup = render_main_menu();
        let labels: Vec<&str> = markup
            .keyboard
            .iter()
            .flatten()
            .map(|button| button.text.as_str())
            .collect();
        assert_eq!(labels.len(), Command::MENU.len());
        assert_eq!(labels[0], Command::Add.label());
    }
}

use chrono_tz::Tz;
use engine::{Amount, Category, CategoryTotal, EditField, Expense};

use crate::{
    event::{CANCEL_LABEL, Event, RecordAction},
    export::{ExportError, ExportFormat, format_timestamp},
    machine::ValidationError,
    reply::{Choice, Reply},
};

const RECORD_LABEL_CHARS: usize = 24;

pub(crate) fn render_welcome(stats_window_days: i64) -> Reply {
    Reply::with_menu(format!(
        "👋 Hi! I keep track of your expenses.\n\n\
         ➕ Add expense: record a new expense\n\
         📊 Statistics: totals for the last {stats_window_days} days\n\
         📝 History: your latest entries\n\
         ✏️ Edit / 🗑 Delete: fix or remove a recent entry\n\
         📥 Export: download everything as Excel, PDF or CSV\n\n\
         Send /cancel at any time to stop the current step."
    ))
}

pub(crate) fn render_menu_hint() -> Reply {
    Reply::with_menu("Choose an action from the menu below 👇")
}

pub(crate) fn render_amount_prompt() -> Reply {
    Reply::with_cancel("💰 Enter the amount (e.g. 1500 or 99.90):")
}

pub(crate) fn render_category_prompt(text: &str) -> Reply {
    let mut choices: Vec<Choice> = Category::ALL
        .iter()
        .filter_map(|category| {
            Choice::for_event(category.label(), &Event::CategorySelected(*category))
        })
        .collect();
    choices.extend(cancel_choice());
    Reply::choices(text, choices, 2)
}

pub(crate) fn render_description_prompt() -> Reply {
    Reply::with_cancel("📝 Enter a description:")
}

pub(crate) fn render_record_picker(
    text: &str,
    expenses: &[Expense],
    action: RecordAction,
    timezone: Tz,
) -> Reply {
    let mut choices: Vec<Choice> = expenses
        .iter()
        .filter_map(|expense| {
            Choice::for_event(
                record_label(expense, timezone),
                &Event::RecordSelected {
                    id: expense.id,
                    action,
                },
            )
        })
        .collect();
    choices.extend(cancel_choice());
    Reply::choices(text, choices, 1)
}

pub(crate) fn render_field_picker(expense: &Expense, timezone: Tz) -> Reply {
    let mut choices: Vec<Choice> = EditField::ALL
        .iter()
        .filter_map(|field| {
            Choice::for_event(field_label(*field), &Event::FieldSelected(*field))
        })
        .collect();
    choices.extend(cancel_choice());
    Reply::choices(
        format!(
            "✏️ Editing:\n{}\n\nWhat do you want to change?",
            summary(expense, timezone)
        ),
        choices,
        1,
    )
}

pub(crate) fn render_value_prompt(field: EditField) -> Reply {
    match field {
        EditField::Amount => Reply::with_cancel("💰 Enter the new amount:"),
        EditField::Category => render_category_prompt("📂 Choose the new category:"),
        EditField::Description => Reply::with_cancel("📝 Enter the new description:"),
    }
}

pub(crate) fn render_format_picker() -> Reply {
    let mut choices: Vec<Choice> = ExportFormat::ALL
        .iter()
        .filter_map(|format| Choice::for_event(format.label(), &Event::FormatSelected(*format)))
        .collect();
    choices.extend(cancel_choice());
    Reply::choices("📥 Choose the export format:", choices, 1)
}

pub(crate) fn render_validation(reason: &ValidationError) -> Reply {
    let text = match reason {
        ValidationError::Amount(detail) => {
            format!("❌ That is not a valid amount ({detail}). Use digits, e.g. 1500 or 99.90.")
        }
        other => format!("❌ Please {other}."),
    };
    Reply::text(text)
}

pub(crate) fn render_added(expense: &Expense, timezone: Tz) -> Reply {
    Reply::with_menu(format!("✅ Expense added!\n\n{}", summary(expense, timezone)))
}

pub(crate) fn render_updated(expense: &Expense, field: EditField, timezone: Tz) -> Reply {
    Reply::with_menu(format!(
        "✅ {} updated!\n\n{}",
        field.name(),
        summary(expense, timezone)
    ))
}

pub(crate) fn render_deleted(expense: &Expense, timezone: Tz) -> Reply {
    Reply::with_menu(format!(
        "🗑 Entry deleted:\n\n{}",
        summary(expense, timezone)
    ))
}

pub(crate) fn render_cancelled() -> Reply {
    Reply::with_menu("❌ Cancelled.")
}

pub(crate) fn render_nothing_to_cancel() -> Reply {
    Reply::with_menu("There is nothing to cancel.")
}

pub(crate) fn render_no_entries() -> Reply {
    Reply::with_menu("📭 You have no entries yet.")
}

pub(crate) fn render_stale_selection() -> Reply {
    Reply::with_menu("⌛ This selection is no longer active.")
}

pub(crate) fn render_not_found() -> Reply {
    Reply::with_menu("❌ Entry not found.")
}

pub(crate) fn render_store_failure() -> Reply {
    Reply::with_menu("⚠️ Something went wrong. Please try again later.")
}

/// Overall total of the per-category sums, `None` on overflow.
pub(crate) fn stats_total(totals: &[CategoryTotal]) -> Option<Amount> {
    totals
        .iter()
        .try_fold(Amount::ZERO, |acc, line| acc.checked_add(line.total))
}

pub(crate) fn render_stats(totals: &[CategoryTotal], total: Amount, window_days: i64) -> Reply {
    if totals.is_empty() {
        return Reply::with_menu(format!(
            "📊 No expenses in the last {window_days} days."
        ));
    }

    let mut text = format!(
        "📊 Statistics for the last {window_days} days\n\n💰 Total: {}\n",
        total.grouped()
    );
    for line in totals {
        text.push_str(&format!(
            "\n{} {}: {} ({:.1}%)",
            line.category.emoji(),
            line.category.name(),
            line.total.grouped(),
            line.total.percent_of(total)
        ));
    }
    Reply::with_menu(text)
}

pub(crate) fn render_history(expenses: &[Expense], timezone: Tz) -> Reply {
    let mut text = format!("📝 Your last {} entries:\n", expenses.len());
    for expense in expenses {
        text.push('\n');
        text.push_str(&summary(expense, timezone));
        text.push('\n');
    }
    Reply::with_menu(text.trim_end().to_string())
}

pub(crate) fn render_export_file(bytes: Vec<u8>, filename: String) -> Reply {
    Reply::File {
        bytes,
        filename,
        caption: "📊 Your expense report".to_string(),
    }
}

pub(crate) fn render_export_error(err: &ExportError) -> Reply {
    match err {
        ExportError::NoData => Reply::with_menu("📭 There is no data to export."),
        ExportError::Timeout(_) => {
            Reply::with_menu("⌛ The export took too long. Please try again later.")
        }
        ExportError::Formatter(_) | ExportError::Store(_) => {
            Reply::with_menu("⚠️ The export failed. Please try again later.")
        }
    }
}

fn summary(expense: &Expense, timezone: Tz) -> String {
    let mut text = format!(
        "📅 {}\n{}: {}",
        format_timestamp(expense.created_at, timezone),
        expense.category.label(),
        expense.amount.grouped()
    );
    if !expense.description.is_empty() {
        text.push_str(&format!("\n📝 {}", expense.description));
    }
    text
}

fn record_label(expense: &Expense, timezone: Tz) -> String {
    let date = expense.created_at.with_timezone(&timezone).format("%d.%m");
    let mut label = format!(
        "{date} {} {}",
        expense.category.emoji(),
        expense.amount.grouped()
    );
    if !expense.description.is_empty() {
        label.push(' ');
        if expense.description.chars().count() > RECORD_LABEL_CHARS {
            label.extend(expense.description.chars().take(RECORD_LABEL_CHARS - 1));
            label.push('…');
        } else {
            label.push_str(&expense.description);
        }
    }
    label
}

fn field_label(field: EditField) -> &'static str {
    match field {
        EditField::Amount => "💰 Amount",
        EditField::Category => "📂 Category",
        EditField::Description => "📝 Description",
    }
}

fn cancel_choice() -> Option<Choice> {
    Choice::for_event(CANCEL_LABEL, &Event::Cancel)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn expense(description: &str) -> Expense {
        Expense {
            id: 7,
            owner_id: 1,
            amount: Amount::new(150_000),
            category: Category::Food,
            description: description.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 12, 5, 0).unwrap(),
        }
    }

    #[test]
    fn category_picker_lists_every_category_then_cancel() {
        let Reply::Choices {
            choices, columns, ..
        } = render_category_prompt("pick")
        else {
            panic!("expected choices");
        };
        assert_eq!(columns, 2);
        assert_eq!(choices.len(), Category::ALL.len() + 1);
        assert_eq!(choices[0].label, "🍔 Food");
        assert_eq!(choices[0].token, "cat:food");
        assert_eq!(choices.last().map(|c| c.token.as_str()), Some("cancel"));
    }

    #[test]
    fn record_labels_are_short() {
        let label = record_label(&expense("A very long description for a lunch"), Tz::UTC);
        assert_eq!(label, "14.03 🍔 1,500.00 A very long description…");
        assert_eq!(record_label(&expense(""), Tz::UTC), "14.03 🍔 1,500.00");
    }

    #[test]
    fn stats_show_share_of_total() {
        let totals = [
            CategoryTotal {
                category: Category::Housing,
                total: Amount::new(7_500),
            },
            CategoryTotal {
                category: Category::Food,
                total: Amount::new(2_500),
            },
        ];
        let total = stats_total(&totals).unwrap();
        assert_eq!(total, Amount::new(10_000));
        let reply = render_stats(&totals, total, 30);
        assert!(reply.body().contains("💰 Total: 100.00"));
        assert!(reply.body().contains("🏠 Housing: 75.00 (75.0%)"));
        assert!(reply.body().contains("🍔 Food: 25.00 (25.0%)"));
    }

    #[test]
    fn stats_total_detects_overflow() {
        let totals = [
            CategoryTotal {
                category: Category::Food,
                total: Amount::new(i64::MAX),
            },
            CategoryTotal {
                category: Category::Housing,
                total: Amount::new(1),
            },
        ];
        assert_eq!(stats_total(&totals), None);
        assert_eq!(stats_total(&[]), Some(Amount::ZERO));
    }

    #[test]
    fn summary_skips_empty_description() {
        assert_eq!(
            summary(&expense(""), Tz::UTC),
            "📅 14.03.2026 12:05\n🍔 Food: 1,500.00"
        );
        assert!(summary(&expense("Lunch"), Tz::UTC).ends_with("\n📝 Lunch"));
    }
}

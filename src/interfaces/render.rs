use crate::application::reply::Reply;
use crate::domain::event::Selection;
use crate::domain::profile::{Expense, ProfileSummary};
use crate::interfaces::channel::{ReplyAction, ReplyDirective};

const CURRENCY: &str = "₽";
const LIST_DATE_FORMAT: &str = "%d.%m.%Y";
const DETAIL_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";
const BIRTHDAY_HINT: &str = "DD-MM-YY (for example, 01-01-90)";

/// Chooses wording and buttons for a reply.
pub fn render(reply: &Reply) -> ReplyDirective {
    match reply {
        Reply::NamePrompt => ReplyDirective::text("Hi! Let's get acquainted. What's your name?"),
        Reply::BlankName => ReplyDirective::text("Please tell me your name."),
        Reply::BirthdayPrompt => ReplyDirective::text(format!(
            "Great! Now enter your birthday as {BIRTHDAY_HINT}."
        )),
        Reply::InvalidBirthday => ReplyDirective::text(format!(
            "Wrong date format. Please enter your birthday as {BIRTHDAY_HINT}."
        )),
        Reply::Profile(summary) => profile(summary, None),
        Reply::ExpenseNamePrompt => ReplyDirective::text("What did you buy?"),
        Reply::BlankExpenseName => ReplyDirective::text("Please enter what you bought."),
        Reply::ExpenseAmountPrompt => {
            ReplyDirective::text("How much did it cost? (Enter a number)")
        }
        Reply::IncomeAmountPrompt => ReplyDirective::text("How much did you receive?"),
        Reply::InvalidAmount => ReplyDirective::text(
            "Please enter a valid amount: a positive number such as 150 or 12.50.",
        ),
        Reply::ExpenseAdded(summary) => profile(summary, Some("Expense added!")),
        Reply::IncomeAdded(summary) => profile(summary, Some("Income added!")),
        Reply::Expenses(expenses) => expense_list(expenses),
        Reply::ExpenseDetail(expense) => ReplyDirective::text(format!(
            "Purchase: {}\nAmount: {} {CURRENCY}\nDate: {}",
            expense.name,
            expense.amount,
            expense.timestamp.format(DETAIL_DATE_FORMAT)
        ))
        .with_actions(vec![back(Selection::ViewExpenses)]),
        Reply::About => ReplyDirective::text(format!(
            "About:\nThis bot helps you keep track of your expenses and incomes.\n\nVersion: {}",
            env!("CARGO_PKG_VERSION")
        ))
        .with_actions(vec![back(Selection::BackToProfile)]),
        Reply::ExpenseNotFound => ReplyDirective::text("Error: expense not found.")
            .with_actions(vec![back(Selection::ViewExpenses)]),
        Reply::RestartRequired => {
            ReplyDirective::text("Something went wrong. Please start again with /start")
        }
        Reply::RetryLater => {
            ReplyDirective::text("Your last action could not be saved. Please try again.")
        }
    }
}

fn profile(summary: &ProfileSummary, headline: Option<&str>) -> ReplyDirective {
    let days = summary
        .days_to_birthday
        .map_or_else(|| "unknown".to_string(), |d| d.to_string());
    let body = format!(
        "{}\nBalance: {} {CURRENCY}\nSpent this month: {} {CURRENCY}\nDays to birthday: {days}",
        summary.name, summary.balance, summary.monthly_spend
    );
    let text = match headline {
        Some(headline) => format!("{headline}\n\n{body}"),
        None => body,
    };

    ReplyDirective::text(text).with_actions(vec![
        action("Add expense", Selection::AddExpense),
        action("Add income", Selection::AddIncome),
        action("View all expenses", Selection::ViewExpenses),
        action("About", Selection::About),
    ])
}

fn expense_list(expenses: &[Expense]) -> ReplyDirective {
    if expenses.is_empty() {
        return ReplyDirective::text("You have no expenses yet.")
            .with_actions(vec![back(Selection::BackToProfile)]);
    }

    let mut actions: Vec<ReplyAction> = expenses
        .iter()
        .map(|e| {
            let label = format!(
                "{} - {} {CURRENCY} ({})",
                e.name,
                e.amount,
                e.timestamp.format(LIST_DATE_FORMAT)
            );
            action(label, Selection::ExpenseDetail(e.id))
        })
        .collect();
    actions.push(back(Selection::BackToProfile));

    ReplyDirective::text("Your expenses:").with_actions(actions)
}

fn action(label: impl Into<String>, selection: Selection) -> ReplyAction {
    ReplyAction::new(label, selection.code())
}

fn back(selection: Selection) -> ReplyAction {
    action("Back", selection)
}

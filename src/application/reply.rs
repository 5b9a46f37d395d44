use crate::domain::profile::{Expense, ProfileSummary};

/// What the conversation wants to tell the user, before any wording or
/// button layout is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    NamePrompt,
    BlankName,
    BirthdayPrompt,
    InvalidBirthday,
    Profile(ProfileSummary),
    ExpenseNamePrompt,
    BlankExpenseName,
    ExpenseAmountPrompt,
    IncomeAmountPrompt,
    InvalidAmount,
    ExpenseAdded(ProfileSummary),
    IncomeAdded(ProfileSummary),
    /// All expenses, oldest first.
    Expenses(Vec<Expense>),
    ExpenseDetail(Expense),
    About,
    ExpenseNotFound,
    RestartRequired,
    RetryLater,
}

impl Reply {
    /// Replies that ask the user to correct their last input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Reply::BlankName
                | Reply::InvalidBirthday
                | Reply::BlankExpenseName
                | Reply::InvalidAmount
        )
    }
}

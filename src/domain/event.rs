/// The fixed vocabulary of button selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    AddExpense,
    AddIncome,
    ViewExpenses,
    About,
    BackToProfile,
    /// Details of the expense with this stable id.
    ExpenseDetail(u64),
}

const EXPENSE_PREFIX: &str = "expense_";

impl Selection {
    /// Parses a selection code such as `add_expense` or `expense_3`.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "add_expense" => Some(Selection::AddExpense),
            "add_income" => Some(Selection::AddIncome),
            "view_expenses" => Some(Selection::ViewExpenses),
            "about" => Some(Selection::About),
            "back_to_profile" => Some(Selection::BackToProfile),
            other => other
                .strip_prefix(EXPENSE_PREFIX)
                .and_then(|id| id.parse().ok())
                .map(Selection::ExpenseDetail),
        }
    }

    pub fn code(&self) -> String {
        match self {
            Selection::AddExpense => "add_expense".to_string(),
            Selection::AddIncome => "add_income".to_string(),
            Selection::ViewExpenses => "view_expenses".to_string(),
            Selection::About => "about".to_string(),
            Selection::BackToProfile => "back_to_profile".to_string(),
            Selection::ExpenseDetail(id) => format!("{EXPENSE_PREFIX}{id}"),
        }
    }
}

/// What the user did, independent of how the channel delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Start,
    /// A slash command other than start. Always ignored.
    Command(String),
    Text(String),
    Selection(Selection),
}

/// One inbound event for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub user_id: String,
    pub kind: EventKind,
}

impl Event {
    pub fn new(user_id: impl Into<String>, kind: EventKind) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
        }
    }

    pub fn start(user_id: impl Into<String>) -> Self {
        Self::new(user_id, EventKind::Start)
    }

    pub fn text(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(user_id, EventKind::Text(text.into()))
    }

    pub fn select(user_id: impl Into<String>, selection: Selection) -> Self {
        Self::new(user_id, EventKind::Selection(selection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_codes() {
        assert_eq!(Selection::parse("add_expense"), Some(Selection::AddExpense));
        assert_eq!(Selection::parse("add_income"), Some(Selection::AddIncome));
        assert_eq!(Selection::parse("view_expenses"), Some(Selection::ViewExpenses));
        assert_eq!(Selection::parse("about"), Some(Selection::About));
        assert_eq!(
            Selection::parse("back_to_profile"),
            Some(Selection::BackToProfile)
        );
    }

    #[test]
    fn test_parse_expense_detail() {
        assert_eq!(
            Selection::parse("expense_12"),
            Some(Selection::ExpenseDetail(12))
        );
        assert_eq!(Selection::parse("expense_"), None);
        assert_eq!(Selection::parse("expense_-1"), None);
        assert_eq!(Selection::parse("expense_x"), None);
        assert_eq!(Selection::parse("delete_everything"), None);
    }

    #[test]
    fn test_code_matches_parse() {
        let selection = Selection::ExpenseDetail(7);
        assert_eq!(selection.code(), "expense_7");
        assert_eq!(Selection::parse(&selection.code()), Some(selection));
    }
}

/// Where a user currently is in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingName,
    AwaitingBirthday,
    AwaitingExpenseName,
    AwaitingExpenseAmount,
    AwaitingIncomeAmount,
}

/// Values entered so far in an unfinished flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scratch {
    pub name: Option<String>,
    pub expense_name: Option<String>,
}

/// Ephemeral per-user conversation state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub state: ConversationState,
    pub scratch: Scratch,
}

impl Session {
    /// Moves to `state` with empty scratch.
    pub fn restart(&mut self, state: ConversationState) {
        self.state = state;
        self.scratch = Scratch::default();
    }

    /// Back to `Idle` with empty scratch, as after a completed flow.
    pub fn reset(&mut self) {
        self.restart(ConversationState::Idle);
    }
}

use crate::application::reply::Reply;
use crate::domain::calendar::Birthday;
use crate::domain::event::{Event, EventKind, Selection};
use crate::domain::money::Amount;
use crate::domain::ports::{Clock, LedgerStoreBox};
use crate::domain::profile::Profile;
use crate::domain::session::{ConversationState, Session};
use crate::error::{LedgerError, Result};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::in_memory::InMemorySessionStore;
use std::sync::Arc;

/// The per-user conversation state machine.
///
/// `ConversationEngine` interprets each inbound event against the user's
/// session and profile. Events for one user are serialized by holding that
/// user's session lock for the whole transition. The transition runs on a
/// copy of the session that is only committed once every ledger write it made
/// has been persisted, so a failed write never advances the conversation.
pub struct ConversationEngine {
    store: LedgerStoreBox,
    sessions: InMemorySessionStore,
    clock: Arc<dyn Clock>,
}

impl ConversationEngine {
    /// Creates an engine over `store` that reads wall-clock time.
    pub fn new(store: LedgerStoreBox) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: LedgerStoreBox, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            sessions: InMemorySessionStore::new(),
            clock,
        }
    }

    /// Applies one event and returns the reply for the user, if any.
    ///
    /// Validation problems are answered with a re-prompt and are not errors.
    /// `MissingProfile`, `ExpenseNotFound` and persistence failures are
    /// returned as errors; in every error case the session is left as it was.
    pub async fn handle(&self, event: Event) -> Result<Option<Reply>> {
        let Event { user_id, kind } = event;
        let mut guard = self.sessions.lock(&user_id).await;
        let mut session = guard.clone();

        let outcome = self.transition(&user_id, &mut session, kind).await;

        if outcome.is_ok() {
            if session.state != guard.state {
                tracing::debug!(%user_id, from = ?guard.state, to = ?session.state, "transition");
            }
            *guard = session;
        }
        self.sessions.release(&user_id, guard).await;
        outcome
    }

    /// A copy of the user's current session.
    pub async fn session(&self, user_id: &str) -> Session {
        self.sessions.snapshot(user_id).await
    }

    pub async fn profile(&self, user_id: &str) -> Result<Option<Profile>> {
        self.store.get(user_id).await
    }

    pub async fn profiles(&self) -> Result<Vec<(String, Profile)>> {
        self.store.get_all().await
    }

    async fn transition(
        &self,
        user_id: &str,
        session: &mut Session,
        kind: EventKind,
    ) -> Result<Option<Reply>> {
        match kind {
            EventKind::Start => self.on_start(user_id, session).await.map(Some),
            EventKind::Command(command) => {
                tracing::debug!(%user_id, %command, "ignoring command");
                Ok(None)
            }
            EventKind::Text(text) => self.on_text(user_id, session, &text).await,
            EventKind::Selection(selection) => self
                .on_selection(user_id, session, selection)
                .await
                .map(Some),
        }
    }

    async fn on_start(&self, user_id: &str, session: &mut Session) -> Result<Reply> {
        match self.store.get(user_id).await? {
            Some(profile) => {
                session.reset();
                Ok(Reply::Profile(profile.summary(self.clock.now())))
            }
            None => {
                session.restart(ConversationState::AwaitingName);
                Ok(Reply::NamePrompt)
            }
        }
    }

    async fn on_text(
        &self,
        user_id: &str,
        session: &mut Session,
        text: &str,
    ) -> Result<Option<Reply>> {
        let reply = match session.state {
            ConversationState::Idle => {
                tracing::debug!(%user_id, "ignoring text outside of a flow");
                return Ok(None);
            }
            ConversationState::AwaitingName => {
                let name = text.trim();
                if name.is_empty() {
                    Reply::BlankName
                } else {
                    session.scratch.name = Some(name.to_string());
                    session.state = ConversationState::AwaitingBirthday;
                    Reply::BirthdayPrompt
                }
            }
            ConversationState::AwaitingBirthday => match Birthday::parse(text) {
                Ok(birthday) => self.complete_onboarding(user_id, session, birthday).await?,
                Err(_) => Reply::InvalidBirthday,
            },
            ConversationState::AwaitingExpenseName => {
                let name = text.trim();
                if name.is_empty() {
                    Reply::BlankExpenseName
                } else {
                    session.scratch.expense_name = Some(name.to_string());
                    session.state = ConversationState::AwaitingExpenseAmount;
                    Reply::ExpenseAmountPrompt
                }
            }
            ConversationState::AwaitingExpenseAmount => match Amount::parse(text) {
                Ok(amount) => self.complete_expense(user_id, session, amount).await?,
                Err(_) => Reply::InvalidAmount,
            },
            ConversationState::AwaitingIncomeAmount => match Amount::parse(text) {
                Ok(amount) => self.complete_income(user_id, session, amount).await?,
                Err(_) => Reply::InvalidAmount,
            },
        };

        if reply.is_validation_error() {
            tracing::debug!(%user_id, state = ?session.state, "re-prompting after invalid input");
        }
        Ok(Some(reply))
    }

    async fn complete_onboarding(
        &self,
        user_id: &str,
        session: &mut Session,
        birthday: Birthday,
    ) -> Result<Reply> {
        let now = self.clock.now();

        // A profile is never recreated, so its name and birthday stay as first entered.
        if let Some(existing) = self.store.get(user_id).await? {
            tracing::warn!(%user_id, "profile already exists, leaving onboarding");
            session.reset();
            return Ok(Reply::Profile(existing.summary(now)));
        }

        let Some(name) = session.scratch.name.clone() else {
            session.restart(ConversationState::AwaitingName);
            return Ok(Reply::NamePrompt);
        };

        let profile = Profile::new(name, birthday, now);
        let summary = profile.summary(now);
        self.store.upsert(user_id, profile).await?;
        tracing::info!(%user_id, "profile created");

        session.reset();
        Ok(Reply::Profile(summary))
    }

    async fn complete_expense(
        &self,
        user_id: &str,
        session: &mut Session,
        amount: Amount,
    ) -> Result<Reply> {
        let mut profile = self.require_profile(user_id).await?;
        let Some(name) = session.scratch.expense_name.clone() else {
            session.restart(ConversationState::AwaitingExpenseName);
            return Ok(Reply::ExpenseNamePrompt);
        };

        let now = self.clock.now();
        let id = match profile.record_expense(name, amount, now) {
            Ok(expense) => expense.id,
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "expense rejected");
                return Ok(Reply::InvalidAmount);
            }
        };
        let summary = profile.summary(now);
        self.store.upsert(user_id, profile).await?;
        tracing::info!(%user_id, expense_id = id, %amount, "expense recorded");

        session.reset();
        Ok(Reply::ExpenseAdded(summary))
    }

    async fn complete_income(
        &self,
        user_id: &str,
        session: &mut Session,
        amount: Amount,
    ) -> Result<Reply> {
        let mut profile = self.require_profile(user_id).await?;

        let now = self.clock.now();
        let id = match profile.record_income(amount, now) {
            Ok(income) => income.id,
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "income rejected");
                return Ok(Reply::InvalidAmount);
            }
        };
        let summary = profile.summary(now);
        self.store.upsert(user_id, profile).await?;
        tracing::info!(%user_id, income_id = id, %amount, "income recorded");

        session.reset();
        Ok(Reply::IncomeAdded(summary))
    }

    async fn on_selection(
        &self,
        user_id: &str,
        session: &mut Session,
        selection: Selection,
    ) -> Result<Reply> {
        let profile = self.require_profile(user_id).await?;

        match selection {
            Selection::AddExpense => {
                session.restart(ConversationState::AwaitingExpenseName);
                Ok(Reply::ExpenseNamePrompt)
            }
            Selection::AddIncome => {
                session.restart(ConversationState::AwaitingIncomeAmount);
                Ok(Reply::IncomeAmountPrompt)
            }
            Selection::ViewExpenses => Ok(Reply::Expenses(profile.expenses().to_vec())),
            Selection::About => Ok(Reply::About),
            Selection::BackToProfile => Ok(Reply::Profile(profile.summary(self.clock.now()))),
            Selection::ExpenseDetail(id) => profile
                .expense(id)
                .cloned()
                .map(Reply::ExpenseDetail)
                .ok_or(LedgerError::ExpenseNotFound(id)),
        }
    }

    async fn require_profile(&self, user_id: &str) -> Result<Profile> {
        self.store
            .get(user_id)
            .await?
            .ok_or_else(|| LedgerError::MissingProfile(user_id.to_string()))
    }
}

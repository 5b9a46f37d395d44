use super::calendar::{Birthday, timestamp};
use super::money::{Amount, Balance};
use crate::error::{LedgerError, Result};
use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One recorded purchase.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Expense {
    /// Stable identifier, unique within the owning profile's expenses.
    pub id: u64,
    pub name: String,
    pub amount: Amount,
    #[serde(rename = "date", with = "timestamp")]
    pub timestamp: NaiveDateTime,
}

/// One recorded incoming payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Income {
    /// Stable identifier, unique within the owning profile's incomes.
    pub id: u64,
    pub amount: Amount,
    #[serde(rename = "date", with = "timestamp")]
    pub timestamp: NaiveDateTime,
}

/// The persisted financial record of one onboarded user.
///
/// `balance` is kept equal to the sum of incomes minus the sum of expenses;
/// the only ways to change it are [`Profile::record_expense`] and
/// [`Profile::record_income`]. Both sequences are append-only.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Profile {
    pub name: String,
    pub birthday: Birthday,
    balance: Balance,
    #[serde(default)]
    expenses: Vec<Expense>,
    #[serde(default)]
    incomes: Vec<Income>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

/// The figures shown on a profile summary, derived at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub name: String,
    pub balance: Balance,
    pub monthly_spend: Balance,
    /// `None` when the stored birthday cannot be read.
    pub days_to_birthday: Option<i64>,
}

impl Profile {
    pub fn new(name: String, birthday: Birthday, created_at: NaiveDateTime) -> Self {
        Self {
            name,
            birthday,
            balance: Balance::ZERO,
            expenses: Vec::new(),
            incomes: Vec::new(),
            created_at,
        }
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// Expenses, oldest first.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Incomes, oldest first.
    pub fn incomes(&self) -> &[Income] {
        &self.incomes
    }

    /// Appends an expense and lowers the balance by its amount.
    ///
    /// Fails with `BalanceOverflow`, leaving the profile untouched, if the
    /// new balance would not fit.
    pub fn record_expense(
        &mut self,
        name: String,
        amount: Amount,
        at: NaiveDateTime,
    ) -> Result<&Expense> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(amount.to_string()))?;
        let id = self.expenses.last().map_or(1, |e| e.id + 1);
        self.expenses.push(Expense {
            id,
            name,
            amount,
            timestamp: at,
        });
        Ok(&self.expenses[self.expenses.len() - 1])
    }

    /// Appends an income and raises the balance by its amount.
    pub fn record_income(&mut self, amount: Amount, at: NaiveDateTime) -> Result<&Income> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(amount.to_string()))?;
        let id = self.incomes.last().map_or(1, |i| i.id + 1);
        self.incomes.push(Income {
            id,
            amount,
            timestamp: at,
        });
        Ok(&self.incomes[self.incomes.len() - 1])
    }

    pub fn expense(&self, id: u64) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// Total spent in the calendar month (and year) containing `now`.
    pub fn monthly_spend(&self, now: NaiveDateTime) -> Balance {
        let total = self
            .expenses
            .iter()
            .filter(|e| e.timestamp.year() == now.year() && e.timestamp.month() == now.month())
            .fold(Decimal::ZERO, |total, e| total.saturating_add(e.amount.value()));
        Balance::new(total)
    }

    pub fn days_to_birthday(&self, now: NaiveDateTime) -> Option<i64> {
        self.birthday.days_until(now)
    }

    pub fn summary(&self, now: NaiveDateTime) -> ProfileSummary {
        ProfileSummary {
            name: self.name.clone(),
            balance: self.balance,
            monthly_spend: self.monthly_spend(now),
            days_to_birthday: self.days_to_birthday(now),
        }
    }

    /// Recomputes the balance from the two sequences and compares.
    pub fn is_consistent(&self) -> bool {
        let expected = self
            .incomes
            .iter()
            .try_fold(Balance::ZERO, |b, i| b.checked_add(i.amount))
            .and_then(|b| {
                self.expenses
                    .iter()
                    .try_fold(b, |b, e| b.checked_sub(e.amount))
            });
        expected == Some(self.balance)
    }
}

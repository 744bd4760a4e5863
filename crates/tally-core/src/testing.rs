//! In-memory fakes of the storage, credential, and provider traits.

use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use tally_types::chat::{ChatTurn, MemorySummary, TurnRole};
use tally_types::error::{AuthError, RepositoryError};
use tally_types::expense::{Category, Expense, ExpenseId, ExpenseQuery, ExpenseSort};
use tally_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};
use tally_types::user::{User, UserId, UserProfile};

use crate::chat::store::ConversationStore;
use crate::llm::provider::LlmProvider;
use crate::repository::expense::ExpenseRepository;
use crate::repository::user::UserRepository;
use crate::service::credentials::CredentialHasher;

/// Build a bare expense for aggregation tests.
pub fn expense_on(amount: &str, category: Option<&str>, date: NaiveDate) -> Expense {
    let now = Utc::now();
    Expense {
        id: ExpenseId::new(),
        user_id: UserId::new(),
        title: "Test".to_string(),
        amount: Decimal::from_str(amount).unwrap(),
        category: category.map(String::from),
        date,
        notes: None,
        recurring: false,
        created_at: now,
        updated_at: now,
    }
}

// --- Conversation store ---

#[derive(Default)]
struct ConversationState {
    next_seq: i64,
    turns: Vec<ChatTurn>,
    summaries: HashMap<UserId, MemorySummary>,
}

#[derive(Clone, Default)]
pub struct InMemoryConversationStore {
    state: Arc<Mutex<ConversationState>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryConversationStore {
    /// Make every append fail with a query error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl ConversationStore for InMemoryConversationStore {
    async fn append(
        &self,
        user_id: &UserId,
        role: TurnRole,
        content: &str,
    ) -> Result<ChatTurn, RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        state.next_seq += 1;
        let turn = ChatTurn {
            seq: state.next_seq,
            user_id: *user_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        state.turns.push(turn.clone());
        Ok(turn)
    }

    async fn recent(&self, user_id: &UserId, limit: usize) -> Result<Vec<ChatTurn>, RepositoryError> {
        let all = self.all_ordered(user_id).await?;
        let skip = all.len().saturating_sub(limit);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn count(&self, user_id: &UserId) -> Result<usize, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.turns.iter().filter(|t| &t.user_id == user_id).count())
    }

    async fn all_ordered(&self, user_id: &UserId) -> Result<Vec<ChatTurn>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .turns
            .iter()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn purge(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.turns.len();
        state.turns.retain(|t| &t.user_id != user_id);
        Ok((before - state.turns.len()) as u64)
    }

    async fn get_summary(&self, user_id: &UserId) -> Result<Option<MemorySummary>, RepositoryError> {
        Ok(self.state.lock().unwrap().summaries.get(user_id).cloned())
    }

    async fn put_summary(&self, user_id: &UserId, summary: &str) -> Result<(), RepositoryError> {
        if summary.trim().is_empty() {
            return Ok(());
        }
        self.state.lock().unwrap().summaries.insert(
            *user_id,
            MemorySummary {
                user_id: *user_id,
                summary: summary.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn clear_summary(&self, user_id: &UserId) -> Result<(), RepositoryError> {
        self.state.lock().unwrap().summaries.remove(user_id);
        Ok(())
    }
}

// --- Expense repository ---

#[derive(Default)]
struct ExpenseState {
    expenses: Vec<Expense>,
    categories: Vec<Category>,
}

#[derive(Clone, Default)]
pub struct InMemoryExpenseRepository {
    state: Arc<Mutex<ExpenseState>>,
}

impl InMemoryExpenseRepository {
    pub fn with_default_categories() -> Self {
        let repo = Self::default();
        let mut state = repo.state.lock().unwrap();
        for (i, name) in ["Food", "Travel", "Shopping", "Bills", "Other"].iter().enumerate() {
            state.categories.push(Category {
                id: i as i64 + 1,
                name: name.to_string(),
            });
        }
        drop(state);
        repo
    }

    /// Insert an expense dated 2024-03-14 directly.
    pub fn seed(&self, user_id: &UserId, title: &str, amount: &str, category: Option<&str>) {
        let mut expense = expense_on(amount, category, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        expense.user_id = *user_id;
        expense.title = title.to_string();
        self.state.lock().unwrap().expenses.push(expense);
    }
}

impl ExpenseRepository for InMemoryExpenseRepository {
    async fn create(&self, expense: &Expense) -> Result<Expense, RepositoryError> {
        self.state.lock().unwrap().expenses.push(expense.clone());
        Ok(expense.clone())
    }

    async fn get(&self, user_id: &UserId, id: &ExpenseId) -> Result<Option<Expense>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .expenses
            .iter()
            .find(|e| &e.id == id && &e.user_id == user_id)
            .cloned())
    }

    async fn update(&self, expense: &Expense) -> Result<Expense, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .expenses
            .iter_mut()
            .find(|e| e.id == expense.id && e.user_id == expense.user_id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = expense.clone();
        Ok(expense.clone())
    }

    async fn delete(&self, user_id: &UserId, id: &ExpenseId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.expenses.len();
        state.expenses.retain(|e| !(&e.id == id && &e.user_id == user_id));
        if state.expenses.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, user_id: &UserId, query: &ExpenseQuery) -> Result<Vec<Expense>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let search = query.search.as_ref().map(|s| s.to_lowercase());
        let mut out: Vec<Expense> = state
            .expenses
            .iter()
            .filter(|e| &e.user_id == user_id)
            .filter(|e| match (&query.category, &e.category) {
                (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter(|e| query.start.is_none_or(|start| e.date >= start))
            .filter(|e| query.end.is_none_or(|end| e.date <= end))
            .filter(|e| {
                search
                    .as_ref()
                    .is_none_or(|s| e.title.to_lowercase().contains(s.as_str()))
            })
            .cloned()
            .collect();
        match query.sort {
            ExpenseSort::Newest => out.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at))),
            ExpenseSort::Oldest => out.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at))),
            ExpenseSort::High => out.sort_by(|a, b| b.amount.cmp(&a.amount)),
            ExpenseSort::Low => out.sort_by(|a, b| a.amount.cmp(&b.amount)),
        }
        Ok(out)
    }

    async fn total_for_category(&self, user_id: &UserId, category: &str) -> Result<Decimal, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .expenses
            .iter()
            .filter(|e| &e.user_id == user_id)
            .filter(|e| e.category.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(category)))
            .map(|e| e.amount)
            .sum())
    }

    async fn list_recurring(&self) -> Result<Vec<Expense>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.expenses.iter().filter(|e| e.recurring).cloned().collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories = self.state.lock().unwrap().categories.clone();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn ensure_categories(&self, names: &[String]) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        for name in names {
            if !state.categories.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
                let id = state.categories.len() as i64 + 1;
                state.categories.push(Category { id, name: name.clone() });
            }
        }
        Ok(())
    }
}

// --- User repository ---

#[derive(Default)]
struct UserState {
    users: Vec<User>,
    profiles: HashMap<UserId, UserProfile>,
    keys: HashMap<String, UserId>,
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<Mutex<UserState>>,
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User, profile: &UserProfile) -> Result<User, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.username.eq_ignore_ascii_case(&user.username)) {
            return Err(RepositoryError::Conflict(user.username.clone()));
        }
        state.users.push(user.clone());
        state.profiles.insert(user.id, profile.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.state.lock().unwrap().users.iter().find(|u| &u.id == id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.state.lock().unwrap().profiles.get(user_id).cloned())
    }

    async fn update_profile(&self, profile: &UserProfile) -> Result<UserProfile, RepositoryError> {
        self.state
            .lock()
            .unwrap()
            .profiles
            .insert(profile.user_id, profile.clone());
        Ok(profile.clone())
    }

    async fn store_api_key(&self, user_id: &UserId, key_hash: &str, _name: &str) -> Result<(), RepositoryError> {
        self.state.lock().unwrap().keys.insert(key_hash.to_string(), *user_id);
        Ok(())
    }

    async fn find_api_key(&self, key_hash: &str) -> Result<Option<UserId>, RepositoryError> {
        Ok(self.state.lock().unwrap().keys.get(key_hash).copied())
    }

    async fn touch_api_key(&self, _key_hash: &str) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn revoke_api_key(&self, key_hash: &str) -> Result<bool, RepositoryError> {
        Ok(self.state.lock().unwrap().keys.remove(key_hash).is_some())
    }
}

// --- Credentials ---

#[derive(Default)]
pub struct FakeCredentials {
    counter: AtomicUsize,
}

impl CredentialHasher for FakeCredentials {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        hash == format!("hashed:{password}")
    }

    fn generate_api_key(&self) -> String {
        format!("key-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }

    fn hash_api_key(&self, key: &str) -> String {
        format!("digest:{key}")
    }
}

// --- Completion provider ---

/// Prompts seen by a [`ScriptedProvider`], shared with the test.
#[derive(Clone, Default)]
pub struct CallLog {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompt(&self, index: usize) -> Option<String> {
        self.prompts.lock().unwrap().get(index).cloned()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

/// Provider that replays scripted replies. `None` entries fail the call.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Option<String>>>,
    then: Option<String>,
    log: CallLog,
}

impl ScriptedProvider {
    fn build(script: Vec<Option<String>>, then: Option<String>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            then,
            log: CallLog::default(),
        }
    }

    /// Always answer with `text`.
    pub fn replying(text: &str) -> Self {
        Self::build(vec![], Some(text.to_string()))
    }

    /// Answer with each entry in turn, then fail.
    pub fn sequence<const N: usize>(texts: [&str; N]) -> Self {
        Self::build(texts.iter().map(|t| Some(t.to_string())).collect(), None)
    }

    /// Fail once, then always answer with `text`.
    pub fn sequence_with_failure_first(text: &str) -> Self {
        Self::build(vec![None], Some(text.to_string()))
    }

    /// Always fail.
    pub fn failing() -> Self {
        Self::build(vec![], None)
    }

    pub fn calls(&self) -> CallLog {
        self.log.clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.log.prompts.lock().unwrap().push(prompt);

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.then.clone());
        match next {
            Some(content) => Ok(CompletionResponse {
                content,
                model: request.model.clone(),
                usage: Usage::default(),
            }),
            None => Err(LlmError::Provider {
                message: "scripted failure".to_string(),
            }),
        }
    }
}

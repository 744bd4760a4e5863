//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/hasher/store traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use tally_core::chat::memory::{MemoryManager, MemorySettings};
use tally_core::chat::spend::SpendQueryStrategy;
use tally_core::chat::strategy::BoxAnswerStrategy;
use tally_core::llm::box_provider::BoxLlmProvider;
use tally_core::service::expense::ExpenseService;
use tally_core::service::user::UserService;
use tally_infra::config::{load_global_config, resolve_api_key, resolve_data_dir};
use tally_infra::crypto::credentials::Argon2Credentials;
use tally_infra::llm::create_provider;
use tally_infra::sqlite::conversation::SqliteConversationStore;
use tally_infra::sqlite::expense::SqliteExpenseRepository;
use tally_infra::sqlite::pool::{DatabasePool, database_url};
use tally_infra::sqlite::user::SqliteUserRepository;
use tally_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteUserService = UserService<SqliteUserRepository, Argon2Credentials>;

pub type ConcreteExpenseService = ExpenseService<SqliteExpenseRepository>;

pub type ConcreteMemoryManager = MemoryManager<SqliteConversationStore>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<ConcreteUserService>,
    pub expense_service: Arc<ConcreteExpenseService>,
    pub memory: Arc<ConcreteMemoryManager>,
    pub provider: Arc<BoxLlmProvider>,
    pub config: Arc<GlobalConfig>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: read config, connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let provider = create_provider(&config.llm, resolve_api_key(&config.llm))?;

        Self::build(data_dir, config, provider).await
    }

    /// Wire services against the database in `data_dir` with the given provider.
    pub async fn build(
        data_dir: PathBuf,
        config: GlobalConfig,
        provider: BoxLlmProvider,
    ) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let user_service = UserService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2Credentials::new(),
        );

        let expense_repo = SqliteExpenseRepository::new(db_pool.clone());
        let expense_service = ExpenseService::new(expense_repo.clone());
        expense_service.seed_categories(&config.categories).await?;

        // Deterministic answers are tried in order before the completion call.
        let strategies = vec![BoxAnswerStrategy::new(SpendQueryStrategy::new(expense_repo))];

        let settings = MemorySettings {
            recent_window: config.memory.recent_window,
            compression_threshold: config.memory.compression_threshold,
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
        };
        let provider = Arc::new(provider);
        let memory = MemoryManager::new(
            SqliteConversationStore::new(db_pool.clone()),
            Arc::clone(&provider),
            strategies,
            settings,
        );

        Ok(Self {
            user_service: Arc::new(user_service),
            expense_service: Arc::new(expense_service),
            memory: Arc::new(memory),
            provider,
            config: Arc::new(config),
            db_pool,
        })
    }
}

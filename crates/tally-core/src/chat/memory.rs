//! MemoryManager: one chat exchange from user message to stored reply.
//!
//! The lifecycle of a user's memory is: turns accumulate, and once their
//! count exceeds the compression threshold the whole log is folded into the
//! rolling summary and purged. Reset wipes both.

use std::sync::Arc;

use tally_types::chat::{
    ChatTurn, DEFAULT_COMPRESSION_THRESHOLD, DEFAULT_RECENT_LIMIT, MemorySummary, TurnRole,
};
use tally_types::error::ChatError;
use tally_types::llm::{CompletionRequest, Message};
use tally_types::user::UserId;
use tracing::{info, warn};

use super::compressor::MemoryCompressor;
use super::policy::decide;
use super::prompt::build_chat_prompt;
use super::store::ConversationStore;
use super::strategy::{AnswerContext, BoxAnswerStrategy, first_answer};
use crate::llm::box_provider::BoxLlmProvider;

pub const EMPTY_MESSAGE_REPLY: &str = "⚠️ Please type something.";
pub const NO_RESPONSE_REPLY: &str = "⚠️ No response from AI.";
pub const MEMORY_CLEARED_MSG: &str = "🧹 Memory cleared successfully!";

/// Tunables for the memory manager.
#[derive(Debug, Clone)]
pub struct MemorySettings {
    /// Turns preceding the new message included in the prompt.
    pub recent_window: usize,
    pub compression_threshold: usize,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            recent_window: DEFAULT_RECENT_LIMIT,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
            model: "gemini-1.5-flash".to_string(),
            max_tokens: 1024,
        }
    }
}

/// Point-in-time view of a user's memory.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    pub summary: Option<MemorySummary>,
    pub turn_count: usize,
    pub recent: Vec<ChatTurn>,
}

/// Drives the chat memory lifecycle for every user.
///
/// Generic over `ConversationStore` so tests can run against an in-memory
/// store. Same-user exchanges are not serialized.
pub struct MemoryManager<S: ConversationStore> {
    store: S,
    provider: Arc<BoxLlmProvider>,
    strategies: Vec<BoxAnswerStrategy>,
    settings: MemorySettings,
}

impl<S: ConversationStore> MemoryManager<S> {
    pub fn new(
        store: S,
        provider: Arc<BoxLlmProvider>,
        strategies: Vec<BoxAnswerStrategy>,
        settings: MemorySettings,
    ) -> Self {
        Self {
            store,
            provider,
            strategies,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &MemorySettings {
        &self.settings
    }

    /// Chat boundary: always produces a reply.
    ///
    /// Blank input is rejected without touching the store. Any failure inside
    /// the exchange becomes an `⚠️ Error: ...` reply; the user turn that was
    /// already written stays, and no assistant turn is written.
    pub async fn respond(&self, user_id: &UserId, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            return EMPTY_MESSAGE_REPLY.to_string();
        }

        match self.on_new_user_message(user_id, text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "chat exchange failed");
                format!("⚠️ Error: {e}")
            }
        }
    }

    /// Run one exchange: store the message, compress if due, answer, store
    /// the reply.
    #[tracing::instrument(name = "chat_exchange", skip(self, user_id, text), fields(user_id = %user_id))]
    pub async fn on_new_user_message(
        &self,
        user_id: &UserId,
        text: &str,
    ) -> Result<String, ChatError> {
        let appended = self.store.append(user_id, TurnRole::User, text).await?;

        self.compress_if_needed(user_id).await?;

        let ctx = AnswerContext {
            user_id,
            message: text,
        };
        let reply = match first_answer(&self.strategies, &ctx).await? {
            Some((strategy, reply)) => {
                info!(strategy = %strategy, "answered without completion service");
                reply
            }
            None => self.complete_with_memory(user_id, &appended, text).await?,
        };

        self.store
            .append(user_id, TurnRole::Assistant, &reply)
            .await?;
        Ok(reply)
    }

    /// Ask the completion service for a reply given the summary and window.
    ///
    /// The window holds the `recent_window` turns *preceding* the new
    /// message, which is appended once at the end of the prompt. This
    /// diverges from reading the window after the append, where the new
    /// message takes one of the window slots and shows up twice.
    async fn complete_with_memory(
        &self,
        user_id: &UserId,
        appended: &ChatTurn,
        text: &str,
    ) -> Result<String, ChatError> {
        let summary = self.store.get_summary(user_id).await?;

        // One extra turn so the window still holds `recent_window` entries
        // once the just-appended message is dropped from it.
        let mut window = self
            .store
            .recent(user_id, self.settings.recent_window + 1)
            .await?;
        window.retain(|t| t.seq != appended.seq);
        if window.len() > self.settings.recent_window {
            window.drain(..window.len() - self.settings.recent_window);
        }

        let prompt = build_chat_prompt(
            summary.as_ref().map(|s| s.summary.as_str()),
            &window,
            text,
        );
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![Message::user(prompt)],
            system: None,
            max_tokens: self.settings.max_tokens,
            temperature: None,
        };

        let response = self.provider.complete(&request).await?;
        if response.content.trim().is_empty() {
            return Ok(NO_RESPONSE_REPLY.to_string());
        }
        Ok(response.content)
    }

    /// Compress if the stored turn count is above the threshold.
    ///
    /// Returns whether compression ran.
    pub async fn compress_if_needed(&self, user_id: &UserId) -> Result<bool, ChatError> {
        let count = self.store.count(user_id).await?;
        if !decide(count, self.settings.compression_threshold).compress {
            return Ok(false);
        }
        self.compress(user_id).await?;
        Ok(true)
    }

    /// Fold the whole turn log into the summary, then purge it.
    ///
    /// The purge happens even when the completion call fails or returns
    /// nothing, so history can be lost in that case.
    #[tracing::instrument(name = "compress_memory", skip(self, user_id), fields(user_id = %user_id))]
    pub async fn compress(&self, user_id: &UserId) -> Result<(), ChatError> {
        let turns = self.store.all_ordered(user_id).await?;

        match MemoryCompressor::summarize(
            &self.provider,
            &turns,
            &self.settings.model,
            self.settings.max_tokens,
        )
        .await
        {
            Ok(summary) if !summary.is_empty() => {
                self.store.put_summary(user_id, &summary).await?;
            }
            Ok(_) => {
                warn!("compression produced an empty summary; keeping the previous one");
            }
            Err(e) => {
                warn!(error = %e, "compression call failed; history will still be purged");
            }
        }

        let removed = self.store.purge(user_id).await?;
        info!(removed, "chat history compressed");
        Ok(())
    }

    /// Forget everything: turns and summary. Idempotent.
    #[tracing::instrument(name = "reset_memory", skip(self, user_id), fields(user_id = %user_id))]
    pub async fn reset_memory(&self, user_id: &UserId) -> Result<(), ChatError> {
        let removed = self.store.purge(user_id).await?;
        self.store.clear_summary(user_id).await?;
        info!(removed, "chat memory reset");
        Ok(())
    }

    /// Summary, turn count, and the latest window for inspection.
    pub async fn snapshot(&self, user_id: &UserId) -> Result<MemorySnapshot, ChatError> {
        Ok(MemorySnapshot {
            summary: self.store.get_summary(user_id).await?,
            turn_count: self.store.count(user_id).await?,
            recent: self
                .store
                .recent(user_id, self.settings.recent_window)
                .await?,
        })
    }
}

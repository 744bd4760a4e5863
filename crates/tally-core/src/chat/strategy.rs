//! Deterministic answer strategies.
//!
//! Strategies are tried in order before the completion service. The first
//! one that returns `Some(reply)` wins; the fallback prompt is only built
//! when every strategy declines.
//!
//! Follows the same blanket-impl pattern as `BoxLlmProvider`.

use std::future::Future;
use std::pin::Pin;

use tally_types::error::ChatError;
use tally_types::user::UserId;

/// What a strategy gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct AnswerContext<'a> {
    pub user_id: &'a UserId,
    pub message: &'a str,
}

/// A rule that can answer some messages without the completion service.
pub trait AnswerStrategy: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Return `Some(reply)` to answer, `None` to pass.
    fn try_answer(
        &self,
        ctx: &AnswerContext<'_>,
    ) -> impl Future<Output = Result<Option<String>, ChatError>> + Send;
}

/// Object-safe version of [`AnswerStrategy`] with boxed futures.
pub trait AnswerStrategyDyn: Send + Sync {
    fn name(&self) -> &str;

    fn try_answer_boxed<'a>(
        &'a self,
        ctx: &'a AnswerContext<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, ChatError>> + Send + 'a>>;
}

impl<T: AnswerStrategy> AnswerStrategyDyn for T {
    fn name(&self) -> &str {
        AnswerStrategy::name(self)
    }

    fn try_answer_boxed<'a>(
        &'a self,
        ctx: &'a AnswerContext<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, ChatError>> + Send + 'a>> {
        Box::pin(self.try_answer(ctx))
    }
}

/// Type-erased answer strategy, so heterogeneous strategies share one chain.
pub struct BoxAnswerStrategy {
    inner: Box<dyn AnswerStrategyDyn + Send + Sync>,
}

impl BoxAnswerStrategy {
    pub fn new<T: AnswerStrategy + 'static>(strategy: T) -> Self {
        Self {
            inner: Box::new(strategy),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn try_answer(&self, ctx: &AnswerContext<'_>) -> Result<Option<String>, ChatError> {
        self.inner.try_answer_boxed(ctx).await
    }
}

/// Run the chain in order and return the first answer along with who gave it.
pub async fn first_answer(
    strategies: &[BoxAnswerStrategy],
    ctx: &AnswerContext<'_>,
) -> Result<Option<(String, String)>, ChatError> {
    for strategy in strategies {
        if let Some(reply) = strategy.try_answer(ctx).await? {
            return Ok(Some((strategy.name().to_string(), reply)));
        }
    }
    Ok(None)
}

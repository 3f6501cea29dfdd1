//! LLM executor (§4.8): health-filters providers, dispatches concurrent
//! calls under a semaphore with per-call retries/timeouts, and enforces
//! the cost budget.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::errors::Error;
use crate::providers::{Provider, ProviderResult, ProviderStatus};

/// Issues concurrent health checks with a shared deadline and returns
/// the providers that responded healthy, plus every raw result (used to
/// feed the reliability tracker even for unhealthy providers).
pub async fn filter_healthy_providers(
    providers: Vec<Provider>,
    timeout: Duration,
) -> (Vec<Provider>, Vec<(String, bool)>) {
    let mut checks = Vec::new();
    for provider in &providers {
        let name = provider.name().to_string();
        let provider = provider.clone();
        checks.push(async move {
            let healthy = provider.health_check(timeout).await;
            (name, healthy)
        });
    }
    let results: Vec<(String, bool)> = futures_join_all(checks).await;

    let healthy_names: std::collections::HashSet<String> = results
        .iter()
        .filter(|(_, ok)| *ok)
        .map(|(name, _)| name.clone())
        .collect();

    let healthy = providers
        .into_iter()
        .filter(|p| healthy_names.contains(p.name()))
        .collect();

    (healthy, results)
}

/// A tiny `join_all` so this module doesn't need to pull in the
/// `futures` crate solely for one combinator; tokio's join set gives the
/// same effect with bounded dependencies.
async fn futures_join_all<F, T>(tasks: Vec<F>) -> Vec<T>
where
    F: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let mut set = tokio::task::JoinSet::new();
    for task in tasks {
        set.spawn(task);
    }
    let mut out = Vec::new();
    while let Some(res) = set.join_next().await {
        if let Ok(value) = res {
            out.push(value);
        }
    }
    out
}

/// Tracks cumulative spend across a run; mutated under a mutex so the
/// budget check is an atomic read-modify-write.
pub struct CostTracker {
    state: std::sync::Mutex<f64>,
    cap: Option<f64>,
}

impl CostTracker {
    pub fn new(cap: Option<f64>) -> Self {
        Self {
            state: std::sync::Mutex::new(0.0),
            cap,
        }
    }

    pub fn total(&self) -> f64 {
        *self.state.lock().expect("cost tracker poisoned")
    }

    /// Records `amount`, raising `Error::Budget` *before* the write is
    /// committed if doing so would cross the cap. The findings already
    /// produced by the call that triggered this stay with the caller —
    /// only further dispatch stops.
    pub fn record(&self, amount: f64) -> Result<(), Error> {
        let Some(cap) = self.cap else {
            *self.state.lock().expect("cost tracker poisoned") += amount;
            return Ok(());
        };
        let mut total = self.state.lock().expect("cost tracker poisoned");
        if *total + amount > cap {
            return Err(Error::Budget {
                spent: *total + amount,
                cap,
            });
        }
        *total += amount;
        Ok(())
    }
}

pub struct ExecutorConfig {
    pub provider_max_parallel: usize,
    pub run_timeout: Duration,
    pub provider_retries: u32,
    pub price_per_1k_tokens: HashMap<String, f64>,
}

/// Dispatches `prompt` to every provider in `healthy`, bounded by a
/// semaphore of width `provider_max_parallel`. Rate-limited calls are
/// retried up to `provider_retries - 1` more times with exponential
/// backoff capped at 30s; `error`/`timeout` results are not retried.
/// Every completion (successful or not) is returned.
pub async fn execute(
    healthy: Vec<Provider>,
    prompt: String,
    config: &ExecutorConfig,
    cost_tracker: &CostTracker,
) -> (Vec<ProviderResult>, Option<Error>) {
    let semaphore = Arc::new(Semaphore::new(config.provider_max_parallel.max(1)));
    let mut set = tokio::task::JoinSet::new();

    for provider in healthy {
        let semaphore = semaphore.clone();
        let prompt = prompt.clone();
        let deadline = config.run_timeout;
        let retries = config.provider_retries;
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            call_with_retries(&provider, &prompt, deadline, retries).await
        });
    }

    let mut results = Vec::new();
    let mut budget_error = None;
    while let Some(joined) = set.join_next().await {
        let Ok(result) = joined else { continue };
        if result.status == ProviderStatus::Success {
            let tokens = result
                .result
                .as_ref()
                .and_then(|r| r.usage_tokens)
                .unwrap_or(0);
            let price = config
                .price_per_1k_tokens
                .get(&result.name)
                .copied()
                .unwrap_or(0.0);
            let cost = (tokens as f64 / 1000.0) * price;
            if budget_error.is_none() {
                if let Err(e) = cost_tracker.record(cost) {
                    budget_error = Some(e);
                }
            }
        }
        results.push(result);
    }

    (results, budget_error)
}

async fn call_with_retries(
    provider: &Provider,
    prompt: &str,
    deadline: Duration,
    retries: u32,
) -> ProviderResult {
    let mut attempt = 0;
    let mut backoff = Duration::from_secs(1);
    loop {
        let result = provider.review(prompt, deadline).await;
        if result.status != ProviderStatus::RateLimited || attempt + 1 >= retries.max(1) {
            return result;
        }
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(Duration::from_secs(30));
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockProviderConfig;

    #[tokio::test]
    async fn filter_healthy_providers_drops_unhealthy_ones() {
        let providers = vec![
            Provider::Mock(MockProviderConfig { name: "ok".into(), canned_response: "x".into(), healthy: true }),
            Provider::Mock(MockProviderConfig { name: "bad".into(), canned_response: "x".into(), healthy: false }),
        ];
        let (healthy, all) = filter_healthy_providers(providers, Duration::from_secs(1)).await;
        assert_eq!(healthy.len(), 1);
        assert_eq!(healthy[0].name(), "ok");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn cost_tracker_rejects_crossing_the_cap() {
        let tracker = CostTracker::new(Some(0.01));
        assert!(tracker.record(0.005).is_ok());
        assert!(tracker.record(0.015).is_err());
        // the call that triggered the cap is not silently dropped by the
        // tracker itself — the executor still keeps its findings.
        assert!((tracker.total() - 0.005).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn execute_returns_every_completion_even_when_one_errors() {
        let providers = vec![
            Provider::Mock(MockProviderConfig { name: "ok".into(), canned_response: "x".into(), healthy: true }),
            Provider::Mock(MockProviderConfig { name: "bad".into(), canned_response: String::new(), healthy: false }),
        ];
        let config = ExecutorConfig {
            provider_max_parallel: 2,
            run_timeout: Duration::from_secs(1),
            provider_retries: 1,
            price_per_1k_tokens: HashMap::new(),
        };
        let tracker = CostTracker::new(None);
        let (results, budget_error) = execute(providers, "prompt".into(), &config, &tracker).await;
        assert_eq!(results.len(), 2);
        assert!(budget_error.is_none());
    }
}

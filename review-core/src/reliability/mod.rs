//! Reliability tracker (§4.7): per-provider rolling outcome window,
//! success rate, latency EWMA, circuit breaker, and ranking.
//!
//! Grounded on `ai-llm-service::health_service::HealthStatus` — a
//! serializable, never-erroring snapshot per provider — generalized into
//! a stateful tracker with a rolling window and a circuit-breaker state
//! machine, which the teacher's health service does not itself need
//! since it only does point-in-time probes.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

const WINDOW_SIZE: usize = 20;
const OPEN_AFTER_CONSECUTIVE_FAILURES: usize = 5;

#[derive(Debug, Clone)]
pub struct Outcome {
    pub success: bool,
    pub latency_ms: u64,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct ProviderState {
    outcomes: VecDeque<Outcome>,
    consecutive_failures: usize,
    circuit: CircuitState,
    opened_at: Option<Instant>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            outcomes: VecDeque::with_capacity(WINDOW_SIZE),
            consecutive_failures: 0,
            circuit: CircuitState::Closed,
            opened_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRanking {
    pub name: String,
    pub success_rate: f64,
    pub avg_latency_ms: f64,
    pub score: f64,
}

/// Per-provider rolling reliability state, owned exclusively by the
/// orchestrator for the duration of a run and updated under a
/// per-provider lock.
pub struct ReliabilityTracker {
    providers: Mutex<HashMap<String, ProviderState>>,
    cooldown: Duration,
}

impl ReliabilityTracker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            providers: Mutex::new(HashMap::new()),
            cooldown,
        }
    }

    /// Records one outcome for `provider`, advancing the circuit-breaker
    /// state machine: `closed -> open` after 5 consecutive failures,
    /// `open -> half-open` after the cooldown elapses (checked lazily on
    /// the next `is_circuit_open`/`record` call), `half-open -> closed`
    /// on success or back to `open` on failure.
    pub fn record(&self, provider: &str, outcome: Outcome) {
        let mut providers = self.providers.lock().expect("reliability tracker poisoned");
        let state = providers.entry(provider.to_string()).or_default();

        if state.outcomes.len() == WINDOW_SIZE {
            state.outcomes.pop_front();
        }
        let success = outcome.success;
        state.outcomes.push_back(outcome);

        if success {
            state.consecutive_failures = 0;
            state.circuit = CircuitState::Closed;
            state.opened_at = None;
        } else {
            state.consecutive_failures += 1;
            if state.circuit == CircuitState::HalfOpen
                || state.consecutive_failures >= OPEN_AFTER_CONSECUTIVE_FAILURES
            {
                state.circuit = CircuitState::Open;
                state.opened_at = Some(Instant::now());
            }
        }
    }

    /// Gate checked before every call. Transitions `open -> half-open`
    /// once the cooldown has elapsed, returning `false` (not open) so the
    /// caller may make a single probing call.
    pub fn is_circuit_open(&self, provider: &str) -> bool {
        let mut providers = self.providers.lock().expect("reliability tracker poisoned");
        let state = providers.entry(provider.to_string()).or_default();
        if state.circuit == CircuitState::Open {
            if let Some(opened_at) = state.opened_at {
                if opened_at.elapsed() >= self.cooldown {
                    state.circuit = CircuitState::HalfOpen;
                    return false;
                }
            }
            return true;
        }
        false
    }

    pub fn success_rate(&self, provider: &str) -> f64 {
        let providers = self.providers.lock().expect("reliability tracker poisoned");
        match providers.get(provider) {
            Some(state) if !state.outcomes.is_empty() => {
                let successes = state.outcomes.iter().filter(|o| o.success).count();
                successes as f64 / state.outcomes.len() as f64
            }
            _ => 1.0,
        }
    }

    pub fn avg_latency_ms(&self, provider: &str) -> f64 {
        let providers = self.providers.lock().expect("reliability tracker poisoned");
        match providers.get(provider) {
            Some(state) if !state.outcomes.is_empty() => {
                let total: u64 = state.outcomes.iter().map(|o| o.latency_ms).sum();
                total as f64 / state.outcomes.len() as f64
            }
            _ => 0.0,
        }
    }

    /// `score = 0.7 * successRate + 0.3 * (1 - normalizedLatency)`,
    /// sorted descending.
    pub fn rank_providers(&self, names: &[String]) -> Vec<ProviderRanking> {
        let max_latency = names
            .iter()
            .map(|n| self.avg_latency_ms(n))
            .fold(0.0_f64, f64::max)
            .max(1.0);

        let mut rankings: Vec<ProviderRanking> = names
            .iter()
            .map(|name| {
                let success_rate = self.success_rate(name);
                let avg_latency_ms = self.avg_latency_ms(name);
                let normalized_latency = avg_latency_ms / max_latency;
                let score = 0.7 * success_rate + 0.3 * (1.0 - normalized_latency);
                ProviderRanking {
                    name: name.clone(),
                    success_rate,
                    avg_latency_ms,
                    score,
                }
            })
            .collect();

        rankings.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        rankings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_opens_after_five_consecutive_failures() {
        let tracker = ReliabilityTracker::new(Duration::from_millis(50));
        for _ in 0..5 {
            tracker.record(
                "p1",
                Outcome {
                    success: false,
                    latency_ms: 10,
                    error_message: Some("boom".into()),
                },
            );
        }
        assert!(tracker.is_circuit_open("p1"));
    }

    #[test]
    fn circuit_half_opens_after_cooldown_then_closes_on_success() {
        let tracker = ReliabilityTracker::new(Duration::from_millis(1));
        for _ in 0..5 {
            tracker.record(
                "p1",
                Outcome {
                    success: false,
                    latency_ms: 10,
                    error_message: None,
                },
            );
        }
        std::thread::sleep(Duration::from_millis(5));
        assert!(!tracker.is_circuit_open("p1"));
        tracker.record(
            "p1",
            Outcome {
                success: true,
                latency_ms: 10,
                error_message: None,
            },
        );
        assert!(!tracker.is_circuit_open("p1"));
    }

    #[test]
    fn rank_providers_prefers_higher_success_rate() {
        let tracker = ReliabilityTracker::new(Duration::from_secs(30));
        tracker.record("good", Outcome { success: true, latency_ms: 100, error_message: None });
        tracker.record("bad", Outcome { success: false, latency_ms: 100, error_message: None });
        let ranking = tracker.rank_providers(&["good".to_string(), "bad".to_string()]);
        assert_eq!(ranking[0].name, "good");
    }
}

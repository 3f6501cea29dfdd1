//! LLM execution (§4.8): concurrent provider dispatch gated by health and
//! budget.

pub mod executor;

//! Intensity classification (§4.9 step 3): matches a file path against
//! ordered glob patterns, highest-priority match wins.

use crate::config::{Intensity, ReviewConfig};

fn glob_like_match(pattern: &str, path: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix("/*") {
        return path.starts_with(prefix);
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return path.ends_with(suffix);
    }
    path == pattern
}

/// The first matching rule in `config.path_intensity_patterns` wins;
/// otherwise `path_default_intensity`.
pub fn classify(path: &str, config: &ReviewConfig) -> Intensity {
    if !config.path_based_intensity {
        return config.path_default_intensity;
    }
    for rule in &config.path_intensity_patterns {
        if glob_like_match(&rule.pattern, path) {
            return rule.intensity;
        }
    }
    config.path_default_intensity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathIntensityRule;

    #[test]
    fn first_matching_rule_wins() {
        let mut cfg = ReviewConfig::default();
        cfg.path_based_intensity = true;
        cfg.path_intensity_patterns = vec![
            PathIntensityRule { pattern: "src/auth/*".into(), intensity: Intensity::Thorough },
            PathIntensityRule { pattern: "*.rs".into(), intensity: Intensity::Light },
        ];
        assert_eq!(classify("src/auth/login.rs", &cfg), Intensity::Thorough);
    }

    #[test]
    fn falls_back_to_default_intensity() {
        let mut cfg = ReviewConfig::default();
        cfg.path_based_intensity = true;
        cfg.path_default_intensity = Intensity::Standard;
        assert_eq!(classify("README.md", &cfg), Intensity::Standard);
    }
}

use super::{types::Config, ConfigError};

fn check_unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validate configuration
/// Currently validates:
/// - Thresholds and the duration weight lie in [0, 1]
/// - Early stop threshold is not below the match threshold
/// - Component weights are non-negative and not all zero
/// - At least one query per search
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let matcher = &config.matcher;
    check_unit_interval("matcher.match_threshold", matcher.match_threshold)?;
    check_unit_interval("matcher.duration_weight", matcher.duration_weight)?;
    check_unit_interval("matcher.artist_pair_floor", matcher.artist_pair_floor)?;
    check_unit_interval(
        "searcher.early_stop_threshold",
        config.searcher.early_stop_threshold,
    )?;

    for (name, weight) in [
        ("matcher.name_weight", matcher.name_weight),
        ("matcher.artist_weight", matcher.artist_weight),
        ("matcher.album_weight", matcher.album_weight),
    ] {
        if weight < 0.0 || weight.is_nan() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be negative",
                name
            )));
        }
    }
    if matcher.name_weight == 0.0 {
        return Err(ConfigError::ValidationError(
            "matcher.name_weight cannot be 0".to_string(),
        ));
    }

    if config.searcher.early_stop_threshold < matcher.match_threshold {
        return Err(ConfigError::ValidationError(
            "searcher.early_stop_threshold cannot be below matcher.match_threshold".to_string(),
        ));
    }

    // Searcher validation
    if config.searcher.max_queries == 0 {
        return Err(ConfigError::ValidationError(
            "searcher.max_queries cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatcherConfig;
    use crate::searcher::SearcherConfig;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_threshold_out_of_range_fails() {
        let config = Config {
            matcher: MatcherConfig {
                match_threshold: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_early_stop_below_match_fails() {
        let config = Config {
            searcher: SearcherConfig {
                early_stop_threshold: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_negative_weight_fails() {
        let config = Config {
            matcher: MatcherConfig {
                album_weight: -0.1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_queries_fails() {
        let config = Config {
            searcher: SearcherConfig {
                max_queries: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_queries"));
    }
}

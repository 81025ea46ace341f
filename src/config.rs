use crate::errors::{AnalysisError, AnalysisResult};
use crate::profit::{CostBenefitMatrix, SweepStrategy};
use std::path::PathBuf;

/// Request body bytes allowed per observation. A label plus a full-precision
/// probability is ~22 bytes; the rest leaves room for short feature rows.
const BODY_BYTES_PER_OBSERVATION: usize = 256;
const BODY_BASE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Used when a request does not carry its own matrix.
    pub cost_benefit: CostBenefitMatrix,
    pub sweep_strategy: SweepStrategy,
    pub data_dir: PathBuf,
    pub server_port: u16,
    /// Optional batch file evaluated once at startup.
    pub eval_input: Option<PathBuf>,
    pub max_observations: usize,
    /// Tighter cap for the quadratic exact sweep.
    pub max_exact_observations: usize,
}

impl AppConfig {
    pub fn from_env() -> AnalysisResult<Self> {
        dotenvy::dotenv().ok();

        let cost_benefit = match std::env::var("COST_BENEFIT") {
            Ok(raw) => CostBenefitMatrix::parse(&raw)
                .map_err(|e| AnalysisError::Config(format!("COST_BENEFIT: {e}")))?,
            Err(_) => CostBenefitMatrix::churn_default(),
        };

        let sweep_strategy = env_var_or("SWEEP_STRATEGY", "cumulative")
            .parse::<SweepStrategy>()
            .map_err(|e| AnalysisError::Config(format!("SWEEP_STRATEGY: {e}")))?;

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| AnalysisError::Config(format!("SERVER_PORT: {e}")))?;

        let max_observations = positive_limit("MAX_OBSERVATIONS", "200000")?;
        let max_exact_observations = positive_limit("MAX_EXACT_OBSERVATIONS", "20000")?;

        Ok(Self {
            cost_benefit,
            sweep_strategy,
            data_dir: PathBuf::from(env_var_or("DATA_DIR", "data")),
            server_port,
            eval_input: std::env::var("EVAL_INPUT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            max_observations,
            max_exact_observations,
        })
    }

    /// Per-model observation limit for a sweep strategy.
    pub fn observation_limit(&self, strategy: SweepStrategy) -> usize {
        match strategy {
            SweepStrategy::Exact => self.max_observations.min(self.max_exact_observations),
            SweepStrategy::Cumulative => self.max_observations,
        }
    }

    /// HTTP body limit large enough for any input within `max_observations`.
    pub fn body_limit_bytes(&self) -> usize {
        self.max_observations
            .saturating_mul(BODY_BYTES_PER_OBSERVATION)
            .saturating_add(BODY_BASE_BYTES)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cost_benefit: CostBenefitMatrix::churn_default(),
            sweep_strategy: SweepStrategy::default(),
            data_dir: PathBuf::from("data"),
            server_port: 3001,
            eval_input: None,
            max_observations: 200_000,
            max_exact_observations: 20_000,
        }
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn positive_limit(key: &str, default: &str) -> AnalysisResult<usize> {
    let value = env_var_or(key, default)
        .parse::<usize>()
        .map_err(|e| AnalysisError::Config(format!("{key}: {e}")))?;
    if value == 0 {
        return Err(AnalysisError::Config(format!("{key} must be positive")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const VARS: [&str; 7] = [
        "COST_BENEFIT",
        "SWEEP_STRATEGY",
        "DATA_DIR",
        "SERVER_PORT",
        "EVAL_INPUT",
        "MAX_OBSERVATIONS",
        "MAX_EXACT_OBSERVATIONS",
    ];

    // The process environment is shared by every test thread.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn from_env_with(vars: &[(&str, &str)]) -> AnalysisResult<AppConfig> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for key in VARS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let result = AppConfig::from_env();
        for key in VARS {
            std::env::remove_var(key);
        }
        result
    }

    fn assert_config_error(vars: &[(&str, &str)], name: &str) {
        match from_env_with(vars) {
            Err(AnalysisError::Config(msg)) => {
                assert!(msg.contains(name), "error {msg:?} does not name {name}")
            }
            other => panic!("expected config error for {name}, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.cost_benefit.as_array(), [[80.0, -20.0], [-100.0, 0.0]]);
        assert_eq!(cfg.sweep_strategy, SweepStrategy::Cumulative);
        assert!(cfg.eval_input.is_none());
    }

    #[test]
    fn test_from_env_defaults() {
        let cfg = from_env_with(&[]).unwrap();
        assert_eq!(cfg.cost_benefit.as_array(), [[80.0, -20.0], [-100.0, 0.0]]);
        assert_eq!(cfg.sweep_strategy, SweepStrategy::Cumulative);
        assert_eq!(cfg.server_port, 3001);
        assert_eq!(cfg.max_observations, 200_000);
        assert_eq!(cfg.max_exact_observations, 20_000);
        assert!(cfg.eval_input.is_none());
    }

    #[test]
    fn test_from_env_overrides() {
        let cfg = from_env_with(&[
            ("COST_BENEFIT", "10, -10, -5, 0"),
            ("SWEEP_STRATEGY", "Exact"),
            ("SERVER_PORT", "8080"),
            ("EVAL_INPUT", "demos/churn_batch.json"),
            ("MAX_OBSERVATIONS", "500"),
        ])
        .unwrap();
        assert_eq!(cfg.cost_benefit.as_array(), [[10.0, -10.0], [-5.0, 0.0]]);
        assert_eq!(cfg.sweep_strategy, SweepStrategy::Exact);
        assert_eq!(cfg.server_port, 8080);
        assert_eq!(cfg.eval_input, Some(PathBuf::from("demos/churn_batch.json")));
        assert_eq!(cfg.max_observations, 500);
    }

    #[test]
    fn test_from_env_rejects_bad_values() {
        assert_config_error(&[("COST_BENEFIT", "1,2,3")], "COST_BENEFIT");
        assert_config_error(&[("SWEEP_STRATEGY", "fast")], "SWEEP_STRATEGY");
        assert_config_error(&[("SERVER_PORT", "x")], "SERVER_PORT");
        assert_config_error(&[("MAX_OBSERVATIONS", "0")], "MAX_OBSERVATIONS");
        assert_config_error(&[("MAX_OBSERVATIONS", "lots")], "MAX_OBSERVATIONS");
        assert_config_error(&[("MAX_EXACT_OBSERVATIONS", "0")], "MAX_EXACT_OBSERVATIONS");
    }

    #[test]
    fn test_exact_sweep_has_tighter_limit() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.observation_limit(SweepStrategy::Cumulative), 200_000);
        assert_eq!(cfg.observation_limit(SweepStrategy::Exact), 20_000);

        let small = AppConfig { max_observations: 100, ..AppConfig::default() };
        assert_eq!(small.observation_limit(SweepStrategy::Exact), 100);
    }

    #[test]
    fn test_body_limit_covers_observation_limit() {
        let cfg = AppConfig::default();
        // 200k observations of label + full-precision probability need ~4.4 MB.
        assert!(cfg.body_limit_bytes() > 200_000 * 22, "got {}", cfg.body_limit_bytes());
        let huge = AppConfig { max_observations: usize::MAX, ..AppConfig::default() };
        assert_eq!(huge.body_limit_bytes(), usize::MAX);
    }
}

use crate::analysis::EvaluationReport;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::profit::{CostBenefitMatrix, SweepStrategy};
use portable_atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

// ── Batch summaries (published on the watch channel) ──

#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelSummary {
    pub model: String,
    pub run_id: Option<String>,
    pub best_threshold: Option<f64>,
    pub best_profit: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BatchSummary {
    pub batch_id: Option<String>,
    pub evaluated_at: Option<String>,
    pub strategy: Option<SweepStrategy>,
    pub cost_benefit: Option<CostBenefitMatrix>,
    pub models: Vec<ModelSummary>,
}

// ── DB Commands (sent to writer task via bounded channel) ──

#[derive(Debug)]
pub enum DbCommand {
    InsertRun {
        id: String,
        batch_id: String,
        created_at: String,
        report: Box<EvaluationReport>,
    },
}

// ── Performance Counters (lock-free) ──

#[derive(Debug, Default)]
pub struct Counters {
    pub evaluations_run: AtomicU64,
    pub observations_scored: AtomicU64,
    pub inputs_rejected: AtomicU64,
    pub runs_persisted: AtomicU64,
}

// ── Shared App State ──

pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub db_tx: mpsc::Sender<DbCommand>,
    pub latest_tx: watch::Sender<BatchSummary>,
    pub latest_rx: watch::Receiver<BatchSummary>,
    pub counters: Arc<Counters>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool, db_tx: mpsc::Sender<DbCommand>) -> Arc<Self> {
        let (latest_tx, latest_rx) = watch::channel(BatchSummary::default());
        Arc::new(Self {
            config,
            db,
            db_tx,
            latest_tx,
            latest_rx,
            counters: Arc::new(Counters::default()),
        })
    }

    pub fn publish(&self, summary: BatchSummary) {
        // send_replace never fails, even with no receivers left
        self.latest_tx.send_replace(summary);
    }
}

use crate::errors::{AnalysisError, AnalysisResult};
use crate::state::{Counters, DbCommand};
use portable_atomic::Ordering;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub type DbPool = Arc<Mutex<Connection>>;

const SCHEMA: &str = include_str!("../migrations/001_init.sql");

pub fn init_db(data_dir: &Path) -> AnalysisResult<DbPool> {
    std::fs::create_dir_all(data_dir).map_err(|e| AnalysisError::Database(format!("create dir: {e}")))?;
    let db_path = data_dir.join("churn_profit.db");
    let conn = Connection::open(&db_path)?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;")?;
    conn.execute_batch(SCHEMA)?;

    tracing::info!("database initialized at {}", db_path.display());
    Ok(Arc::new(Mutex::new(conn)))
}

#[cfg(test)]
pub fn init_memory_db() -> AnalysisResult<DbPool> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Dedicated DB writer task. Reads commands from bounded channel, executes SQL.
/// This is the ONLY task that writes to the database connection.
pub async fn run_db_writer(db: DbPool, mut rx: mpsc::Receiver<DbCommand>, counters: Arc<Counters>) {
    tracing::info!("db writer task started");

    while let Some(cmd) = rx.recv().await {
        match execute_command(&db, cmd) {
            Ok(()) => {
                counters.runs_persisted.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => tracing::error!("db write error: {e}"),
        }
    }

    tracing::info!("db writer task shutting down");
}

fn execute_command(db: &DbPool, cmd: DbCommand) -> AnalysisResult<()> {
    let mut conn = db.lock().map_err(|e| AnalysisError::Database(format!("lock poisoned: {e}")))?;

    match cmd {
        DbCommand::InsertRun { id, batch_id, created_at, report } => {
            let cost_benefit = serde_json::to_string(&report.cost_benefit)?;
            let curve_json = serde_json::to_string(&serde_json::json!({
                "thresholds": report.curve.thresholds,
                "profits": report.curve.profits,
                "percent_instances": report.plot.percent_instances,
            }))?;
            let cm = report.confusion;

            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO evaluation_runs (id, batch_id, created_at, model_name, observations, positives, strategy, cost_benefit, best_threshold, best_profit, tp, fp, fn_count, tn, predicted_positive, input_digest)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                rusqlite::params![
                    id,
                    batch_id,
                    created_at,
                    report.model,
                    report.observations as i64,
                    report.positives as i64,
                    report.strategy.to_string(),
                    cost_benefit,
                    report.best_threshold,
                    report.best_profit,
                    cm.tp as i64,
                    cm.fp as i64,
                    cm.fn_ as i64,
                    cm.tn as i64,
                    report.predicted_positive as i64,
                    report.input_digest,
                ],
            )?;
            tx.execute(
                "INSERT INTO run_curves (run_id, curve_json) VALUES (?1, ?2)",
                rusqlite::params![id, curve_json],
            )?;
            tx.commit()?;
        }
    }
    Ok(())
}

// ── Query helpers (for server REST reads -- these DO lock, but only from cold path) ──

const RUN_COLUMNS: &str = "id, batch_id, created_at, model_name, observations, positives, strategy, cost_benefit, best_threshold, best_profit, tp, fp, fn_count, tn, predicted_positive, input_digest";

fn map_run_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRow> {
    let cost_benefit: String = row.get(7)?;
    Ok(RunRow {
        id: row.get(0)?,
        batch_id: row.get(1)?,
        created_at: row.get(2)?,
        model_name: row.get(3)?,
        observations: row.get(4)?,
        positives: row.get(5)?,
        strategy: row.get(6)?,
        cost_benefit: serde_json::from_str(&cost_benefit).unwrap_or(serde_json::Value::Null),
        best_threshold: row.get(8)?,
        best_profit: row.get(9)?,
        tp: row.get(10)?,
        fp: row.get(11)?,
        fn_count: row.get(12)?,
        tn: row.get(13)?,
        predicted_positive: row.get(14)?,
        input_digest: row.get(15)?,
    })
}

pub fn get_recent_runs(db: &DbPool, model_name: Option<&str>, limit: usize) -> AnalysisResult<Vec<RunRow>> {
    let conn = db.lock().map_err(|e| AnalysisError::Database(format!("lock: {e}")))?;
    let (sql, params): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match model_name {
        Some(name) => (
            format!("SELECT {RUN_COLUMNS} FROM evaluation_runs WHERE model_name = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2"),
            vec![Box::new(name.to_string()), Box::new(limit as i64)],
        ),
        None => (
            format!("SELECT {RUN_COLUMNS} FROM evaluation_runs ORDER BY created_at DESC, rowid DESC LIMIT ?1"),
            vec![Box::new(limit as i64)],
        ),
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), map_run_row)?;
    let runs = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(runs)
}

pub fn get_run(db: &DbPool, run_id: &str) -> AnalysisResult<Option<RunRow>> {
    let conn = db.lock().map_err(|e| AnalysisError::Database(format!("lock: {e}")))?;
    let mut stmt = conn.prepare(&format!("SELECT {RUN_COLUMNS} FROM evaluation_runs WHERE id = ?1"))?;
    let mut rows = stmt.query_map(rusqlite::params![run_id], map_run_row)?;
    let run = rows.next().transpose()?;
    Ok(run)
}

pub fn get_run_curve(db: &DbPool, run_id: &str) -> AnalysisResult<Option<serde_json::Value>> {
    let conn = db.lock().map_err(|e| AnalysisError::Database(format!("lock: {e}")))?;
    let mut stmt = conn.prepare("SELECT curve_json FROM run_curves WHERE run_id = ?1")?;
    let mut rows = stmt.query_map(rusqlite::params![run_id], |row| row.get::<_, String>(0))?;
    let raw = rows.next().transpose()?;
    match raw {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

// ── Row types ──

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunRow {
    pub id: String,
    pub batch_id: String,
    pub created_at: String,
    pub model_name: String,
    pub observations: i64,
    pub positives: i64,
    pub strategy: String,
    pub cost_benefit: serde_json::Value,
    pub best_threshold: f64,
    pub best_profit: f64,
    pub tp: i64,
    pub fp: i64,
    pub fn_count: i64,
    pub tn: i64,
    pub predicted_positive: i64,
    pub input_digest: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::evaluate;
    use crate::profit::{CostBenefitMatrix, SweepStrategy};

    fn insert_scenario(db: &DbPool, id: &str, model: &str) {
        let cb = CostBenefitMatrix::from_cells(10.0, -10.0, -5.0, 0.0).unwrap();
        let report = evaluate(model, &cb, &[0.9, 0.6, 0.4, 0.1], &[1, 1, 0, 0], SweepStrategy::Exact).unwrap();
        execute_command(
            db,
            DbCommand::InsertRun {
                id: id.into(),
                batch_id: "batch-1".into(),
                created_at: "2026-01-01T00:00:00+00:00".into(),
                report: Box::new(report),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_insert_and_read_back() {
        let db = init_memory_db().unwrap();
        insert_scenario(&db, "run-a", "rf");
        insert_scenario(&db, "run-b", "lr");

        let all = get_recent_runs(&db, None, 10).unwrap();
        assert_eq!(all.len(), 2);

        let rf = get_recent_runs(&db, Some("rf"), 10).unwrap();
        assert_eq!(rf.len(), 1);
        let run = &rf[0];
        assert_eq!(run.id, "run-a");
        assert_eq!(run.best_threshold, 0.4);
        assert_eq!((run.tp, run.fp, run.fn_count, run.tn), (2, 0, 0, 2));
        assert_eq!(run.strategy, "exact");
        assert_eq!(run.cost_benefit, serde_json::json!([[10.0, -10.0], [-5.0, 0.0]]));

        assert!(get_run(&db, "run-b").unwrap().is_some());
        assert!(get_run(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn test_curve_round_trip() {
        let db = init_memory_db().unwrap();
        insert_scenario(&db, "run-a", "rf");
        let curve = get_run_curve(&db, "run-a").unwrap().unwrap();
        assert_eq!(curve["thresholds"], serde_json::json!([0.9, 0.6, 0.4, 0.1]));
        assert_eq!(curve["percent_instances"].as_array().unwrap().len(), 4);
        assert!(get_run_curve(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn test_limit_respected() {
        let db = init_memory_db().unwrap();
        for i in 0..5 {
            insert_scenario(&db, &format!("run-{i}"), "rf");
        }
        assert_eq!(get_recent_runs(&db, None, 3).unwrap().len(), 3);
    }

    #[test]
    fn test_undecodable_row_is_an_error() {
        let db = init_memory_db().unwrap();
        insert_scenario(&db, "run-a", "rf");
        insert_scenario(&db, "run-b", "rf");
        db.lock()
            .unwrap()
            .execute("UPDATE evaluation_runs SET observations = 'many' WHERE id = 'run-b'", [])
            .unwrap();

        let err = get_recent_runs(&db, None, 10).unwrap_err();
        assert!(matches!(err, AnalysisError::Database(_)), "got {err}");
    }
}

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sql_repository::prelude::*;

/// Executor that records every call instead of talking to a database.
#[derive(Clone, Default)]
struct RecordingExecutor {
    calls: Arc<Mutex<Vec<String>>>,
    fail_exec: bool,
    fail_rollback: bool,
    outcome: DmlOutcome,
}

impl RecordingExecutor {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

struct RecordingTx {
    exec: RecordingExecutor,
}

#[async_trait]
impl DatabaseExecutor for RecordingExecutor {
    type Tx = RecordingTx;

    async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlRepositoryError> {
        self.record(format!("select {query} {params:?}"));
        let mut rs = ResultSet::with_capacity(vec!["n".into()], 2);
        rs.add_row_values(vec![RowValues::Int64(1)]);
        rs.add_row_values(vec![RowValues::Text("two".into())]);
        Ok(rs)
    }

    async fn begin_transaction(&self) -> Result<RecordingTx, SqlRepositoryError> {
        self.record("begin");
        Ok(RecordingTx { exec: self.clone() })
    }
}

#[async_trait]
impl TransactionExecutor for RecordingTx {
    async fn execute_dml(
        &mut self,
        query: &str,
        _params: &[RowValues],
    ) -> Result<DmlOutcome, SqlRepositoryError> {
        self.exec.record(format!("exec {query}"));
        if self.exec.fail_exec {
            return Err(SqlRepositoryError::Other("constraint violated".into()));
        }
        Ok(self.exec.outcome)
    }

    async fn commit(self) -> Result<(), SqlRepositoryError> {
        self.exec.record("commit");
        Ok(())
    }

    async fn rollback(self) -> Result<(), SqlRepositoryError> {
        self.exec.record("rollback");
        if self.exec.fail_rollback {
            return Err(SqlRepositoryError::Other("connection lost".into()));
        }
        Ok(())
    }
}

#[tokio::test]
async fn successful_execute_commits() -> Result<(), SqlRepositoryError> {
    let exec = RecordingExecutor {
        outcome: DmlOutcome {
            rows_affected: Some(3),
            last_insert_id: None,
        },
        ..RecordingExecutor::default()
    };
    let repo = Repository::new(exec.clone());

    let outcome = repo.execute("delete from t", &[]).await?;

    assert_eq!(exec.calls(), vec!["begin", "exec delete from t", "commit"]);
    assert_eq!(outcome.rows_affected, 3);
    assert_eq!(outcome.last_insert_id, ExecutionOutcome::UNKNOWN);
    Ok(())
}

#[tokio::test]
async fn failed_exec_rolls_back_and_never_commits() {
    let exec = RecordingExecutor {
        fail_exec: true,
        ..RecordingExecutor::default()
    };
    let repo = Repository::new(exec.clone());

    let err = repo.execute("insert into t values (1)", &[]).await;

    assert!(matches!(
        err,
        Err(SqlRepositoryError::ExecutionError(ref msg)) if msg.contains("constraint violated")
    ));
    assert_eq!(
        exec.calls(),
        vec!["begin", "exec insert into t values (1)", "rollback"]
    );
}

#[tokio::test]
async fn rollback_failure_keeps_the_exec_error() {
    let exec = RecordingExecutor {
        fail_exec: true,
        fail_rollback: true,
        ..RecordingExecutor::default()
    };
    let repo = Repository::new(exec.clone());

    let err = repo.execute("insert into t values (1)", &[]).await;

    match err {
        Err(SqlRepositoryError::ExecutionError(msg)) => {
            assert!(msg.contains("constraint violated"));
            assert!(!msg.contains("connection lost"));
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(!exec.calls().iter().any(|c| c == "commit"));
}

#[tokio::test]
async fn named_execute_expands_before_begin() -> Result<(), SqlRepositoryError> {
    let exec = RecordingExecutor::default();
    let repo = Repository::new(exec.clone());

    repo.execute_named(
        "delete from t where id in (:ids) and owner = :owner",
        &NamedParams::new().bind("ids", vec![4_i64, 5]).bind("owner", "me"),
    )
    .await?;

    assert_eq!(
        exec.calls()[1],
        "exec delete from t where id in ($1, $2) and owner = $3"
    );

    let bad = repo
        .execute_named("delete from t where id = :id", &NamedParams::new())
        .await;
    assert!(matches!(bad, Err(SqlRepositoryError::UnresolvedParameter { .. })));
    assert_eq!(exec.calls().len(), 3);
    Ok(())
}

#[tokio::test]
async fn first_mapping_error_aborts_without_partial_results() {
    let repo = Repository::new(RecordingExecutor::default());
    let mut mapped = 0;

    let result = repo
        .map_rows("select n", &[], |r| {
            let n = r.int64("n");
            r.err()?;
            mapped += 1;
            Ok(n)
        })
        .await;

    assert!(matches!(result, Err(SqlRepositoryError::ColumnRead(_))));
    assert_eq!(mapped, 1);
}

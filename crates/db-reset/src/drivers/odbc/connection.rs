//! ODBC connection implementation, used for Oracle.
//!
//! ODBC handles are blocking and not `Send`, so the session lives on a
//! dedicated worker thread. Requests travel over a tokio channel and each one
//! carries a oneshot sender for its reply.
//!
//! **Requirements:**
//! - The `oracle` feature must be enabled
//! - An ODBC driver manager (unixODBC on Linux/macOS) and the Oracle ODBC
//!   driver must be installed

use std::thread;

use async_trait::async_trait;
use odbc_api::{buffers::TextRowSet, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::core::traits::Connection;
use crate::error::{DriverError, ResetError, Result};

/// Rows fetched per round trip while enumerating.
const FETCH_BATCH_ROWS: usize = 100;

/// Upper bound for a single text value (Oracle names are at most 128 bytes).
const MAX_TEXT_LEN: usize = 4096;

type Reply<T> = oneshot::Sender<std::result::Result<T, DriverError>>;

enum Request {
    Query(String, Reply<Vec<String>>),
    Execute(String, Reply<()>),
    Release(Reply<()>),
}

/// Session opened through the ODBC driver manager.
pub struct OdbcConnection {
    requests: Option<mpsc::Sender<Request>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl OdbcConnection {
    /// Open a session from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the ODBC environment cannot be created, the
    /// connection string is missing or the driver refuses the connection.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let connection_string = config.odbc_connection_string.clone().ok_or_else(|| {
            ResetError::Config("connection.odbc_connection_string is required".into())
        })?;

        let (requests, mut inbox) = mpsc::channel::<Request>(1);
        let (ready_tx, ready_rx) = oneshot::channel::<std::result::Result<(), String>>();

        let worker = thread::Builder::new()
            .name("db-reset-odbc".to_string())
            .spawn(move || {
                let env = match Environment::new() {
                    Ok(env) => env,
                    Err(e) => {
                        let _ = ready_tx.send(Err(format!(
                            "Failed to create ODBC environment: {}. \
                             Make sure an ODBC driver manager and the Oracle ODBC driver are installed.",
                            e
                        )));
                        return;
                    }
                };
                let conn = match env
                    .connect_with_connection_string(&connection_string, ConnectionOptions::default())
                {
                    Ok(conn) => conn,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                while let Some(request) = inbox.blocking_recv() {
                    match request {
                        Request::Query(sql, reply) => {
                            let _ = reply.send(query_column(&conn, &sql));
                        }
                        Request::Execute(sql, reply) => {
                            let result = conn
                                .execute(&sql, ())
                                .map(|_| ())
                                .map_err(DriverError::from);
                            let _ = reply.send(result);
                        }
                        Request::Release(reply) => {
                            drop(conn);
                            let _ = reply.send(Ok(()));
                            return;
                        }
                    }
                }
            })
            .map_err(|e| ResetError::connection(e, "spawning ODBC worker thread"))?;

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(message)) => {
                join_worker(worker).await;
                return Err(ResetError::connection(message, "connecting via ODBC"));
            }
            Err(_) => {
                join_worker(worker).await;
                return Err(ResetError::connection(
                    "ODBC worker exited before connecting",
                    "connecting via ODBC",
                ));
            }
        }

        info!("Connected via ODBC");

        Ok(Self {
            requests: Some(requests),
            worker: Some(worker),
        })
    }

    async fn call<T>(
        &mut self,
        build: impl FnOnce(Reply<T>) -> Request,
    ) -> std::result::Result<T, DriverError> {
        let requests = self
            .requests
            .as_ref()
            .ok_or_else(|| DriverError::other("ODBC connection already released"))?;
        let (tx, rx) = oneshot::channel();
        requests
            .send(build(tx))
            .await
            .map_err(|_| DriverError::other("ODBC worker thread has stopped"))?;
        rx.await
            .map_err(|_| DriverError::other("ODBC worker thread dropped the request"))?
    }
}

/// Wait for the worker thread off the runtime. Returns `false` if it panicked.
async fn join_worker(worker: thread::JoinHandle<()>) -> bool {
    matches!(
        tokio::task::spawn_blocking(move || worker.join()).await,
        Ok(Ok(()))
    )
}

/// Run a query and collect the first column; the cursor is closed when the
/// bound row set goes out of scope.
fn query_column(
    conn: &odbc_api::Connection<'_>,
    sql: &str,
) -> std::result::Result<Vec<String>, DriverError> {
    let mut values = Vec::new();

    if let Some(mut cursor) = conn.execute(sql, ())? {
        if cursor.num_result_cols()? == 0 {
            return Ok(values);
        }

        let mut buffers = TextRowSet::for_cursor(FETCH_BATCH_ROWS, &mut cursor, Some(MAX_TEXT_LEN))?;
        let mut row_cursor = cursor.bind_buffer(&mut buffers)?;

        while let Some(batch) = row_cursor.fetch()? {
            for row in 0..batch.num_rows() {
                if let Some(bytes) = batch.at(0, row) {
                    values.push(String::from_utf8_lossy(bytes).into_owned());
                }
            }
        }
    }

    Ok(values)
}

#[async_trait]
impl Connection for OdbcConnection {
    async fn query_column(&mut self, sql: &str) -> std::result::Result<Vec<String>, DriverError> {
        let sql = sql.to_string();
        self.call(move |reply| Request::Query(sql, reply)).await
    }

    async fn execute(&mut self, sql: &str) -> std::result::Result<(), DriverError> {
        let sql = sql.to_string();
        self.call(move |reply| Request::Execute(sql, reply)).await
    }

    async fn release(&mut self) -> std::result::Result<(), DriverError> {
        let result = self.call(Request::Release).await;
        self.requests = None;
        if let Some(worker) = self.worker.take() {
            if !join_worker(worker).await {
                debug!("ODBC worker thread panicked during release");
            }
        }
        result
    }

    fn driver_name(&self) -> &str {
        "odbc"
    }

    async fn ping(&mut self) -> std::result::Result<(), DriverError> {
        // Oracle has no FROM-less SELECT
        self.query_column("SELECT 1 FROM dual").await.map(|_| ())
    }
}

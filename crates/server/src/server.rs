use axum::{
    Router,
    routing::{get, post},
};

use std::{future::Future, sync::Arc};

use crate::{ServerError, categories, expenses, transfer};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

impl ServerState {
    /// Runs an engine operation on its own task and waits for it.
    ///
    /// A client that disconnects drops the handler future, not the spawned
    /// task, so a started transaction always commits or rolls back as a unit.
    pub(crate) async fn detached<F, Fut, T>(&self, op: F) -> Result<T, ServerError>
    where
        F: FnOnce(Arc<Engine>) -> Fut,
        Fut: Future<Output = Result<T, EngineError>> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::spawn(op(self.engine.clone()));
        match task.await {
            Ok(result) => result.map_err(ServerError::from),
            Err(err) => Err(ServerError::Internal(format!("engine task failed: {err}"))),
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// The full HTTP surface, without a listener.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/categories", post(categories::create).get(categories::list))
        .route("/categories/verify", get(categories::verify))
        .route(
            "/categories/transfer/{from}/{to}",
            post(transfer::transfer),
        )
        .route(
            "/categories/{id}",
            get(categories::get)
                .patch(categories::update)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/expenses", post(expenses::create).get(expenses::list))
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .patch(expenses::update)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .with_state(state)
}

pub async fn run(engine: Engine, bind: &str) {
    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {bind}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

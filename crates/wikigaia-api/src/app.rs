//! Application builder: wires services, worker, realtime engine, and the
//! router into a running server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use wikigaia_auth::JwtDecoder;
use wikigaia_core::config::AppConfig;
use wikigaia_core::error::AppError;
use wikigaia_core::traits::{EventPublisher, NoopPublisher};
use wikigaia_database::Stores;
use wikigaia_realtime::RealtimeEngine;
use wikigaia_service::{
    LogNotificationSink, MaintenanceService, MilestoneDetector, MilestoneService,
    NotificationDispatcher, NotificationService, ProblemService, UserService, VoteService,
    WorkflowStatusUpdater,
};
use wikigaia_worker::jobs::{
    BroadcastTaskHandler, MaintenanceTaskHandler, MilestoneTaskHandler, WorkflowTaskHandler,
};
use wikigaia_worker::{CronScheduler, TaskExecutor, TaskQueue, WorkerRunner};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Everything the server runs, before any task is spawned.
#[derive(Debug)]
pub struct AppComponents {
    /// Handler state.
    pub state: AppState,
    /// Queue feeding the worker; `None` when the worker is disabled.
    pub queue: Option<TaskQueue>,
    /// The worker loop; `None` when the worker is disabled.
    pub runner: Option<WorkerRunner>,
}

/// Build services, the realtime engine, and the worker over `stores`.
pub fn build_components(config: AppConfig, stores: Stores) -> AppComponents {
    let users = UserService::new(stores.users.clone());
    let realtime = RealtimeEngine::new(stores.problems.clone(), config.realtime.clone());

    let detector = MilestoneDetector::new(&config.milestones);
    let dispatcher = Arc::new(NotificationDispatcher::new(
        stores.problems.clone(),
        stores.milestones.clone(),
        stores.notifications.clone(),
        stores.users.clone(),
        Arc::new(LogNotificationSink),
        detector.max_threshold(),
    )
    .with_claim_lease(chrono::Duration::minutes(i64::from(
        config.worker.unsent_milestone_grace_minutes,
    ))));
    let milestone_service =
        MilestoneService::new(detector, dispatcher, stores.milestones.clone());

    let (publisher, queue, runner) = if config.worker.enabled {
        let (queue, receiver) = TaskQueue::new(config.worker.queue_capacity);
        let executor = TaskExecutor::new()
            .with_handler(Arc::new(MilestoneTaskHandler::new(
                milestone_service.clone(),
            )))
            .with_handler(Arc::new(WorkflowTaskHandler::new(
                WorkflowStatusUpdater::new(stores.problems.clone(), &config.workflow),
            )))
            .with_handler(Arc::new(BroadcastTaskHandler::new(
                realtime.broadcaster.clone(),
            )))
            .with_handler(Arc::new(MaintenanceTaskHandler::new(
                MaintenanceService::new(
                    stores.problems.clone(),
                    stores.milestones.clone(),
                    stores.notifications.clone(),
                ),
                &config.worker,
            )));
        let runner = WorkerRunner::new(receiver, Arc::new(executor), config.worker.concurrency)
            .with_drain_timeout(Duration::from_secs(config.server.shutdown_grace_seconds));
        let publisher: Arc<dyn EventPublisher> = Arc::new(queue.clone());
        (publisher, Some(queue), Some(runner))
    } else {
        tracing::warn!("Worker disabled; vote side effects will not run");
        let publisher: Arc<dyn EventPublisher> = Arc::new(NoopPublisher);
        (publisher, None, None)
    };

    let state = AppState {
        jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
        problem_service: Arc::new(ProblemService::new(stores.problems.clone(), users.clone())),
        vote_service: Arc::new(VoteService::new(
            stores.problems.clone(),
            stores.votes.clone(),
            users,
            publisher,
        )),
        milestone_service: Arc::new(milestone_service),
        notification_service: Arc::new(NotificationService::new(stores.notifications.clone())),
        realtime,
        stores,
        config: Arc::new(config),
        started_at: Instant::now(),
    };

    AppComponents {
        state,
        queue,
        runner,
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    let body_limit = state.config.server.body_limit_bytes;

    build_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
}

/// Runs the WikiGaia server until Ctrl-C or SIGTERM.
pub async fn run_server(config: AppConfig, stores: Stores) -> Result<(), AppError> {
    tracing::info!(backend = stores.backend_name(), "Starting WikiGaia server");

    let worker_config = config.worker.clone();
    let addr = config.server.bind_address();
    let components = build_components(config, stores);
    let state = components.state;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    state.realtime.start(shutdown_rx.clone()).await;

    let worker_handle = components
        .runner
        .map(|runner| tokio::spawn(runner.run(shutdown_rx.clone())));

    let mut scheduler = match &components.queue {
        Some(queue) => {
            let scheduler = CronScheduler::new(queue.clone()).await?;
            scheduler.register_default_tasks(&worker_config).await?;
            scheduler.start().await?;
            Some(scheduler)
        }
        None => None,
    };

    let app = build_app(state.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(%addr, "WikiGaia server listening");

    let broadcaster = state.realtime.broadcaster.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            // Open streams would otherwise hold the server open.
            broadcaster.close_all();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler shutdown failed");
        }
    }
    if let Some(handle) = worker_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Worker task panicked");
        }
    }
    state.realtime.shutdown().await;
    state.stores.close().await;

    tracing::info!("WikiGaia server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use kube::runtime::events::{Recorder, Reporter};
use kube::Client;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

use quorumdb_operator::constants::{
    DEFAULT_DATABASE_ENDPOINT, HEALTH_SERVER_BIND_ADDRESS, HEALTH_SERVER_PORT,
    TOKIO_WORKER_THREADS,
};
use quorumdb_operator::coordination::HttpCoordinationStore;
use quorumdb_operator::leader::LeaseLockElection;
use quorumdb_operator::maintenance::ClusterAdminClient;
use quorumdb_operator::metrics::export_metrics;
use quorumdb_operator::operator::{Config, Dependencies, Operator};
use quorumdb_operator::probes::{LivenessProbe, ReadyProbe};

/// QuorumDB database cluster operator for Kubernetes
#[derive(Debug, Parser)]
#[command(name = "quorumdb-operator", version, about)]
struct Args {
    /// Unique id of this operator instance
    #[arg(long, env = "OPERATOR_ID", default_value = "quorumdb-operator")]
    id: String,

    /// Namespace the operator runs in
    #[arg(long, env = "POD_NAMESPACE", default_value = "default")]
    namespace: String,

    /// Name of the pod running this instance
    #[arg(long, env = "POD_NAME")]
    pod_name: Option<String>,

    /// Service account the operator runs under
    #[arg(long, env = "OPERATOR_SERVICE_ACCOUNT", default_value = "default")]
    service_account: String,

    /// Default database server image
    #[arg(long, env = "DATABASE_IMAGE", default_value = "quorumdb/quorumdb:latest")]
    database_image: String,

    /// Endpoint of the database cluster (coordination store and admin API)
    #[arg(long, env = "DATABASE_ENDPOINT", default_value = DEFAULT_DATABASE_ENDPOINT)]
    database_endpoint: String,

    /// Reconcile QuorumCluster resources
    #[arg(long, env = "ENABLE_CLUSTER", default_value_t = true, action = clap::ArgAction::Set)]
    enable_cluster: bool,

    /// Reconcile QuorumReplication resources
    #[arg(long, env = "ENABLE_REPLICATION", default_value_t = true, action = clap::ArgAction::Set)]
    enable_replication: bool,

    /// Reconcile QuorumLocalStorage resources
    #[arg(long, env = "ENABLE_STORAGE", default_value_t = true, action = clap::ArgAction::Set)]
    enable_storage: bool,

    /// Run the database-admin maintenance observer
    #[arg(long, env = "ENABLE_DATABASE_ADMIN", default_value_t = true, action = clap::ArgAction::Set)]
    enable_database_admin: bool,

    /// Allow chaos experiments against managed clusters
    #[arg(long, env = "ALLOW_CHAOS", default_value_t = false, action = clap::ArgAction::Set)]
    allow_chaos: bool,

    /// Port of the health and metrics HTTP server
    #[arg(long, env = "HEALTH_PORT", default_value_t = HEALTH_SERVER_PORT)]
    health_port: u16,
}

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("quorumdb-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Initialize logging.
    //
    // Respects RUST_LOG for the filter and RUST_LOG_FORMAT for the output
    // format. Example: RUST_LOG=debug RUST_LOG_FORMAT=json quorumdb-operator
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let args = Args::parse();
    info!("Starting QuorumDB Operator");

    let pod_name = args.pod_name.clone().unwrap_or_else(|| {
        std::env::var("HOSTNAME").unwrap_or_else(|_| args.id.clone())
    });

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    let config = Config {
        id: args.id.clone(),
        namespace: args.namespace.clone(),
        pod_name: pod_name.clone(),
        service_account: args.service_account.clone(),
        database_image: args.database_image.clone(),
        enable_cluster: args.enable_cluster,
        enable_replication: args.enable_replication,
        enable_storage: args.enable_storage,
        enable_database_admin: args.enable_database_admin,
        allow_chaos: args.allow_chaos,
    };

    let liveness_probe = Arc::new(LivenessProbe::new());
    let cluster_probe = Arc::new(ReadyProbe::new());
    let replication_probe = Arc::new(ReadyProbe::new());
    let storage_probe = Arc::new(ReadyProbe::new());
    let database_admin_probe = Arc::new(ReadyProbe::new());

    let deps = Dependencies {
        client: client.clone(),
        store: Arc::new(HttpCoordinationStore::new(args.database_endpoint.clone())),
        admin: Arc::new(ClusterAdminClient::new(args.database_endpoint.clone())),
        elector: Arc::new(LeaseLockElection::new(
            client.clone(),
            args.namespace.clone(),
            pod_name.clone(),
        )),
        recorder: Recorder::new(
            client.clone(),
            Reporter {
                controller: args.id.clone(),
                instance: Some(pod_name),
            },
        ),
        liveness_probe: liveness_probe.clone(),
        cluster_probe: cluster_probe.clone(),
        replication_probe: replication_probe.clone(),
        storage_probe: storage_probe.clone(),
        database_admin_probe: database_admin_probe.clone(),
    };

    // Aggregate only the enabled domains into /readyz.
    let mut ready_probes: Vec<(&'static str, Arc<ReadyProbe>)> = Vec::new();
    if config.enable_cluster {
        ready_probes.push(("cluster", cluster_probe));
    }
    if config.enable_replication {
        ready_probes.push(("replication", replication_probe));
    }
    if config.enable_storage {
        ready_probes.push(("storage", storage_probe));
    }
    if config.enable_database_admin {
        ready_probes.push(("database-admin", database_admin_probe));
    }

    serve_health(args.health_port, liveness_probe, ready_probes).await?;

    // Process-wide stop signal, flipped once on SIGTERM or Ctrl-C.
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        let _ = stop_tx.send(true);
    });

    let operator = Operator::new(config, deps);
    operator.run(stop_rx).await;

    Ok(())
}

/// Wait for SIGTERM (Kubernetes) or Ctrl-C (interactive).
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                futures::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = futures::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

/// Shared state of the health and metrics server.
#[derive(Clone)]
struct HealthState {
    liveness: Arc<LivenessProbe>,
    ready: Vec<(&'static str, Arc<ReadyProbe>)>,
}

/// Start the health and metrics HTTP server in the background.
async fn serve_health(
    port: u16,
    liveness: Arc<LivenessProbe>,
    ready: Vec<(&'static str, Arc<ReadyProbe>)>,
) -> Result<()> {
    let state = HealthState { liveness, ready };
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    let addr = format!("{HEALTH_SERVER_BIND_ADDRESS}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "health and metrics server listening");

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!(error = %err, "health server failed");
        }
    });

    Ok(())
}

async fn healthz(State(state): State<HealthState>) -> (StatusCode, &'static str) {
    if state.liveness.is_healthy() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    }
}

async fn readyz(State(state): State<HealthState>) -> (StatusCode, String) {
    let stale: Vec<&str> = state
        .ready
        .iter()
        .filter(|(_, probe)| !probe.is_ready())
        .map(|(domain, _)| *domain)
        .collect();

    if stale.is_empty() {
        (StatusCode::OK, "ok".to_string())
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("not ready: {}", stale.join(", ")),
        )
    }
}

async fn metrics_handler() -> String {
    export_metrics()
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;

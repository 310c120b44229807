// SurfsUp
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Read-only REST service that exposes climate measurements taken by weather stations.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::info;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

pub mod db;
use db::Db;
mod driver;
pub use driver::{DEFAULT_LAST_YEAR_START, DEFAULT_MOST_ACTIVE_STATION, DatasetFacts, FactsSource};
use driver::Driver;
pub mod env;
pub mod model;
mod rest;
use rest::app;

/// Waits until the process is asked to terminate.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C; shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM; shutting down");
        },
    }
}

/// Resolves the dataset facts and serves the application on `bind_addr` until a shutdown
/// signal arrives.
async fn run(
    bind_addr: SocketAddr,
    db: Arc<dyn Db + Send + Sync>,
    facts: FactsSource,
) -> Result<(), Box<dyn Error>> {
    let facts = facts.resolve(db.as_ref()).await?;
    let driver = Driver::new(db, facts);
    let app = app(driver);

    let listener = TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Instantiates all resources to serve the application on `bind_addr` with the given `db`.
///
/// The database is closed before returning, whether the server terminated cleanly or not.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    facts: FactsSource,
) -> Result<(), Box<dyn Error>> {
    let result = run(bind_addr.into(), db.clone(), facts).await;
    db.close().await;
    info!("Server stopped");
    result
}

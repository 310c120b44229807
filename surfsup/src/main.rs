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

//! Entry point to the SurfsUp service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use std::net::Ipv4Addr;
use std::sync::Arc;
use surfsup::FactsSource;
use surfsup::db::Db;
#[cfg(feature = "postgres")]
use surfsup::db::postgres::{PostgresDb, PostgresOptions};
#[cfg(feature = "sqlite")]
use surfsup::db::sqlite::{SqliteDb, SqliteOptions};
use surfsup::env::get_optional_var;
use surfsup::serve;

/// Port to listen on when none is configured.
const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() {
    env_logger::init();

    let port = get_optional_var::<u16>("SURFSUP", "PORT").unwrap().unwrap_or(DEFAULT_PORT);
    let addr = (Ipv4Addr::LOCALHOST, port);

    let backend =
        get_optional_var::<String>("SURFSUP", "DB_BACKEND").unwrap().unwrap_or("sqlite".to_owned());
    let db: Arc<dyn Db + Send + Sync> = match backend.as_str() {
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let db_opts = SqliteOptions::from_env("SQLITE_PROD").unwrap();
            Arc::new(SqliteDb::connect(db_opts).await.unwrap())
        }
        #[cfg(feature = "postgres")]
        "postgres" => {
            let db_opts = PostgresOptions::from_env("PGSQL_PROD").unwrap();
            Arc::new(PostgresDb::connect(db_opts).unwrap())
        }
        other => panic!("Unsupported SURFSUP_DB_BACKEND value {}", other),
    };

    let facts = FactsSource::from_env("SURFSUP").unwrap();

    serve(addr, db, facts).await.unwrap()
}

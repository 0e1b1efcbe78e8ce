//! Builders for the store state injected into the HTTP application.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;

use blogstore::inbound::http::state::AppState;
use blogstore::outbound::persistence::{DbPool, DieselPostStore, DieselUserStore};

/// Wire the Diesel stores over a shared pool.
fn diesel_state(pool: DbPool, clock: Arc<dyn Clock>) -> AppState {
    AppState::new(
        Arc::new(DieselUserStore::new(pool.clone(), clock)),
        Arc::new(DieselPostStore::new(pool)),
    )
}

/// Build the application state, using real stores when a pool is configured
/// and the fixture stores otherwise.
pub(super) fn build_app_state(
    db_pool: Option<DbPool>,
    clock: Arc<dyn Clock>,
) -> web::Data<AppState> {
    let state = match db_pool {
        Some(pool) => diesel_state(pool, clock),
        None => AppState::fixtures(),
    };
    web::Data::new(state)
}

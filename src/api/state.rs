use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    services::{model::Model, providers::PosterProvider},
    storage::ModelStore,
};

/// Shared application state
///
/// The model sits behind `RwLock<Arc<_>>`: readers clone the `Arc` and drop
/// the lock immediately, so a reload never waits on a running query.
#[derive(Clone)]
pub struct AppState {
    pub(super) model: Arc<RwLock<Arc<Model>>>,
    store: ModelStore,
    pub posters: Arc<dyn PosterProvider>,
}

impl AppState {
    pub fn new(model: Model, store: ModelStore, posters: Arc<dyn PosterProvider>) -> Self {
        Self {
            model: Arc::new(RwLock::new(Arc::new(model))),
            store,
            posters,
        }
    }

    /// Snapshot of the model currently being served
    pub async fn current_model(&self) -> Arc<Model> {
        Arc::clone(&*self.model.read().await)
    }

    /// Loads the model from the store and swaps it in.
    ///
    /// On failure the current model keeps serving.
    pub async fn reload(&self) -> AppResult<usize> {
        let store = self.store.clone();
        let loaded = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| AppError::Internal(format!("model reload task failed: {}", e)))??;

        let movies = loaded.len();
        *self.model.write().await = Arc::new(loaded);
        tracing::info!(movies, dir = %self.store.dir().display(), "Model reloaded");
        Ok(movies)
    }
}

use std::sync::Arc;

use crate::store::QuoteStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuoteStore>,
    /// Recompute derived quote fields server-side before storing.
    pub verify_derived_fields: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn QuoteStore>) -> Self {
        Self { store, verify_derived_fields: false }
    }
}

pub mod common;
pub mod conversions;
pub mod quote_prices;

use crate::{
    db::DbPool,
    events::EventSender,
    services::{
        conversions::{ConversionService, EventMethodCopier, MethodCopier},
        quote_prices::QuotePriceService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub conversions: Arc<ConversionService>,
    pub quote_prices: Arc<QuotePriceService>,
}

impl AppServices {
    /// Builds the services with method copies published as events.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, default_currency: &str) -> Self {
        let method_copier: Arc<dyn MethodCopier> =
            Arc::new(EventMethodCopier::new(event_sender.clone()));
        Self::with_method_copier(db_pool, event_sender, method_copier, default_currency)
    }

    pub fn with_method_copier(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        method_copier: Arc<dyn MethodCopier>,
        default_currency: &str,
    ) -> Self {
        Self {
            conversions: Arc::new(ConversionService::new(
                db_pool.clone(),
                event_sender.clone(),
                method_copier,
                default_currency,
            )),
            quote_prices: Arc::new(QuotePriceService::new(db_pool, event_sender)),
        }
    }
}

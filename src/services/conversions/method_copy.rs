use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Copy of an item's master method onto a freshly created quote line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCopyRequest {
    pub item_id: Uuid,
    pub quote_line_id: Uuid,
    pub company_id: Uuid,
    pub user_id: String,
}

/// Copies manufacturing methods between items and quote lines.
#[async_trait]
pub trait MethodCopier: Send + Sync {
    async fn copy_item_method_to_quote_line(
        &self,
        request: MethodCopyRequest,
    ) -> Result<(), ServiceError>;
}

/// Hands copy requests to the method service through the event channel.
///
/// This copier does not write any method rows itself. The external method
/// service consumes `QuoteLineMethodCopyRequested` and fills
/// `quote_make_method`, `quote_material` and `quote_operation` for the line.
/// Until it does, the line is priced from its own unit cost. Deployments
/// without that service should install a [`MethodCopier`] that copies
/// directly.
#[derive(Clone)]
pub struct EventMethodCopier {
    event_sender: Arc<EventSender>,
}

impl EventMethodCopier {
    pub fn new(event_sender: Arc<EventSender>) -> Self {
        Self { event_sender }
    }
}

#[async_trait]
impl MethodCopier for EventMethodCopier {
    async fn copy_item_method_to_quote_line(
        &self,
        request: MethodCopyRequest,
    ) -> Result<(), ServiceError> {
        self.event_sender
            .send(Event::QuoteLineMethodCopyRequested {
                item_id: request.item_id,
                quote_line_id: request.quote_line_id,
                company_id: request.company_id,
                user_id: request.user_id,
            })
            .await
            .map_err(ServiceError::EventError)
    }
}

/// Runs every copy on its own task. Failures are logged and dropped.
pub fn spawn_method_copies(copier: Arc<dyn MethodCopier>, requests: Vec<MethodCopyRequest>) {
    for request in requests {
        let copier = copier.clone();
        tokio::spawn(async move {
            let quote_line_id = request.quote_line_id;
            match copier.copy_item_method_to_quote_line(request).await {
                Ok(()) => {
                    debug!(%quote_line_id, "Method copied to quote line");
                }
                Err(e) => {
                    counter!("quoteflow_conversions.method_copy_failed", 1);
                    warn!(%quote_line_id, error = %e, "Failed to copy method to quote line");
                }
            }
        });
    }
}

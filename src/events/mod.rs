use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with the receiving end of a bounded channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Domain events published after a transaction commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    QuoteCreated {
        quote_id: Uuid,
        sales_rfq_id: Uuid,
        company_id: Uuid,
    },
    SalesOrderCreated {
        sales_order_id: Uuid,
        quote_id: Uuid,
        company_id: Uuid,
        line_count: usize,
        partial: bool,
    },
    /// Ask the method service to copy an item's master method onto a quote line.
    QuoteLineMethodCopyRequested {
        item_id: Uuid,
        quote_line_id: Uuid,
        company_id: Uuid,
        user_id: String,
    },
    QuoteLinePriceUpdated {
        quote_line_id: Uuid,
        quantity: Decimal,
    },
    QuoteLinePricesRecalculated {
        quote_line_id: Uuid,
        markup: Decimal,
        tiers: usize,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::QuoteCreated { .. } => "quote_created",
            Event::SalesOrderCreated { .. } => "sales_order_created",
            Event::QuoteLineMethodCopyRequested { .. } => "quote_line_method_copy_requested",
            Event::QuoteLinePriceUpdated { .. } => "quote_line_price_updated",
            Event::QuoteLinePricesRecalculated { .. } => "quote_line_prices_recalculated",
        }
    }
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        counter!("quoteflow_events.processed", 1, "event" => event.name());

        match &event {
            Event::QuoteCreated {
                quote_id,
                sales_rfq_id,
                ..
            } => {
                info!(%quote_id, %sales_rfq_id, "Quote created from sales RFQ");
            }
            Event::SalesOrderCreated {
                sales_order_id,
                quote_id,
                line_count,
                partial,
                ..
            } => {
                info!(
                    %sales_order_id,
                    %quote_id,
                    line_count,
                    partial,
                    "Sales order created from quote"
                );
            }
            Event::QuoteLineMethodCopyRequested {
                item_id,
                quote_line_id,
                ..
            } => {
                // The method service consumes this and writes the line's method rows.
                info!(%item_id, %quote_line_id, "Method copy requested for quote line");
            }
            other => debug!(event = other.name(), "Event received: {:?}", other),
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (sender, mut rx) = EventSender::channel(4);
        let quote_id = Uuid::new_v4();
        sender
            .send(Event::QuoteCreated {
                quote_id,
                sales_rfq_id: Uuid::new_v4(),
                company_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.name(), "quote_created");
        assert!(matches!(received, Event::QuoteCreated { quote_id: id, .. } if id == quote_id));
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (sender, rx) = EventSender::channel(1);
        drop(rx);
        let result = sender
            .send(Event::QuoteLinePriceUpdated {
                quote_line_id: Uuid::new_v4(),
                quantity: Decimal::ONE,
            })
            .await;
        assert!(result.is_err());
    }
}

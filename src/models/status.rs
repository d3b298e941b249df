use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of an inbound sales RFQ.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum SalesRfqStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Ready for Quote")]
    #[serde(rename = "Ready for Quote")]
    #[strum(serialize = "Ready for Quote")]
    ReadyForQuote,
    #[sea_orm(string_value = "Quoted")]
    Quoted,
    #[sea_orm(string_value = "Closed")]
    Closed,
}

/// Lifecycle of a quote.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum QuoteStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Sent")]
    Sent,
    #[sea_orm(string_value = "Ordered")]
    Ordered,
    #[sea_orm(string_value = "Partial")]
    Partial,
    #[sea_orm(string_value = "Lost")]
    Lost,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
    #[sea_orm(string_value = "Expired")]
    Expired,
}

impl QuoteStatus {
    /// Statuses from which a quote may still be turned into a sales order.
    pub const CONVERTIBLE: [QuoteStatus; 2] = [QuoteStatus::Draft, QuoteStatus::Sent];

    pub fn is_convertible(self) -> bool {
        Self::CONVERTIBLE.contains(&self)
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum SalesOrderStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Needs Approval")]
    #[serde(rename = "Needs Approval")]
    #[strum(serialize = "Needs Approval")]
    NeedsApproval,
    #[sea_orm(string_value = "Confirmed")]
    Confirmed,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfq_status_uses_display_names() {
        assert_eq!(SalesRfqStatus::ReadyForQuote.to_string(), "Ready for Quote");
        assert_eq!(
            serde_json::to_string(&SalesRfqStatus::ReadyForQuote).unwrap(),
            "\"Ready for Quote\""
        );
    }

    #[test]
    fn only_draft_and_sent_quotes_convert() {
        assert!(QuoteStatus::Draft.is_convertible());
        assert!(QuoteStatus::Sent.is_convertible());
        assert!(!QuoteStatus::Ordered.is_convertible());
        assert!(!QuoteStatus::Partial.is_convertible());
        assert!(!QuoteStatus::Lost.is_convertible());
    }
}

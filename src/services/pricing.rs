//! Quantity-tier price tables built on top of a compiled [`CostModel`].
//!
//! Discounts and markups are fractions: `0.1` is ten percent. Every ratio is
//! computed with checked division, and a tier whose ratio is undefined (zero
//! quantity, zero cost, zero price) reports `None` instead of a value.

use crate::services::cost_effects::{CostBreakdown, CostModel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Price settings persisted for one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredPrice {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub lead_time: i32,
}

/// A named charge added on top of the line total, with one amount per tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalCharge {
    #[serde(default)]
    pub description: String,
    /// Keyed by the tier quantity as written, e.g. `"100"`.
    #[serde(default)]
    pub amounts: BTreeMap<String, Decimal>,
}

impl AdditionalCharge {
    /// Amount charged at `quantity`; tiers without an entry charge nothing.
    pub fn amount_for(&self, quantity: Decimal) -> Decimal {
        self.amounts
            .iter()
            .find(|(key, _)| key.trim().parse::<Decimal>().ok() == Some(quantity))
            .map(|(_, amount)| *amount)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Charges of a quote line keyed by charge id.
pub type AdditionalCharges = BTreeMap<String, AdditionalCharge>;

/// Sum of every charge at `quantity`, or `None` on overflow.
pub fn total_additional_charges(charges: &AdditionalCharges, quantity: Decimal) -> Option<Decimal> {
    charges
        .values()
        .try_fold(Decimal::ZERO, |total, charge| {
            total.checked_add(charge.amount_for(quantity))
        })
}

/// One row of a quote line's price table. Derived amounts that overflow are
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    pub quantity: Decimal,
    pub costs: Option<CostBreakdown>,
    pub unit_cost: Option<Decimal>,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub net_unit_price: Option<Decimal>,
    pub lead_time: i32,
    pub additional_charges: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub markup_percent: Option<Decimal>,
    pub profit_percent: Option<Decimal>,
    pub total_profit: Option<Decimal>,
}

/// Unit price to store for a tier after a markup recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierPrice {
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Cost per unit at `quantity`, or `None` when `quantity` is zero.
pub fn unit_cost(costs: &CostBreakdown, quantity: Decimal) -> Option<Decimal> {
    costs.total_cost()?.checked_div(quantity)
}

pub fn net_unit_price(unit_price: Decimal, discount_percent: Decimal) -> Option<Decimal> {
    Decimal::ONE
        .checked_sub(discount_percent)
        .and_then(|share| unit_price.checked_mul(share))
}

/// Builds the price table for `quantities`. Tiers without a stored price are
/// shown at a zero unit price.
pub fn price_table(
    quantities: &[Decimal],
    model: &CostModel,
    stored_prices: &[StoredPrice],
    charges: &AdditionalCharges,
) -> Vec<PriceRow> {
    quantities
        .iter()
        .map(|&quantity| {
            let stored = stored_prices.iter().find(|p| p.quantity == quantity);
            price_row(quantity, model.costs(quantity), stored, charges)
        })
        .collect()
}

fn price_row(
    quantity: Decimal,
    costs: Option<CostBreakdown>,
    stored: Option<&StoredPrice>,
    charges: &AdditionalCharges,
) -> PriceRow {
    let (unit_price, discount_percent, lead_time) = stored
        .map(|p| (p.unit_price, p.discount_percent, p.lead_time))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO, 0));

    let unit_cost = costs.as_ref().and_then(|c| unit_cost(c, quantity));
    let net_unit_price = net_unit_price(unit_price, discount_percent);
    let additional_charges = total_additional_charges(charges, quantity);
    let margin = net_unit_price
        .zip(unit_cost)
        .and_then(|(net, cost)| net.checked_sub(cost));
    let total_price = net_unit_price
        .and_then(|net| net.checked_mul(quantity))
        .zip(additional_charges)
        .and_then(|(lines, extra)| lines.checked_add(extra));

    PriceRow {
        quantity,
        costs,
        unit_cost,
        unit_price,
        discount_percent,
        net_unit_price,
        lead_time,
        additional_charges,
        total_price,
        markup_percent: margin.zip(unit_cost).and_then(|(m, cost)| m.checked_div(cost)),
        profit_percent: margin
            .zip(net_unit_price)
            .and_then(|(m, net)| m.checked_div(net)),
        total_profit: margin.and_then(|m| m.checked_mul(quantity)),
    }
}

/// Unit prices derived from cost with one markup applied to every tier.
/// Tiers whose unit cost or price is undefined are skipped.
pub fn recalculate(quantities: &[Decimal], model: &CostModel, markup: Decimal) -> Vec<TierPrice> {
    let factor = Decimal::ONE.checked_add(markup);
    quantities
        .iter()
        .filter_map(|&quantity| {
            let cost = unit_cost(&model.costs(quantity)?, quantity)?;
            let unit_price = cost.checked_mul(factor?)?.normalize();
            Some(TierPrice {
                quantity,
                unit_price,
            })
        })
        .collect()
}

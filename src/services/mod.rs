pub mod conversions;
pub mod cost_effects;
pub mod method_tree;
pub mod pricing;
pub mod quote_prices;
pub mod sequences;

//! Compiles a quote line's method tree into quantity-parameterized cost effects.
//!
//! Compilation walks the tree once and produces a flat list of [`Effect`]s.
//! Evaluating a quantity tier is then a single pass over that list, so a line
//! priced at several tiers never re-walks its tree.

use crate::models::{ItemType, MethodType, OperationType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// One node of a method tree: the line itself at the root, materials below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodNode {
    pub id: Uuid,
    /// Make method owned by this node, when it is made in-house.
    #[serde(default)]
    pub make_method_id: Option<Uuid>,
    pub method_type: MethodType,
    pub item_type: ItemType,
    /// Quantity per one unit of the parent.
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_cost: Decimal,
    #[serde(default)]
    pub children: Vec<MethodNode>,
}

/// A routing step attached to a make method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInput {
    pub make_method_id: Uuid,
    pub operation_type: OperationType,
    #[serde(default)]
    pub setup_hours: Decimal,
    #[serde(default)]
    pub production_standard: Decimal,
    #[serde(default)]
    pub standard_factor: String,
    #[serde(default)]
    pub labor_rate: Decimal,
    #[serde(default)]
    pub overhead_rate: Decimal,
    /// Set for quoted (outside) rates; replaces the labor and overhead pair.
    #[serde(default)]
    pub quoting_rate: Option<Decimal>,
    #[serde(default)]
    pub operation_minimum_cost: Decimal,
    #[serde(default)]
    pub operation_unit_cost: Decimal,
}

/// Unit in which a production standard is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display, strum::EnumIter)]
pub enum StandardFactor {
    #[strum(serialize = "Hours/Piece")]
    HoursPerPiece,
    #[strum(serialize = "Hours/100 Pieces")]
    HoursPer100Pieces,
    #[strum(serialize = "Hours/1000 Pieces")]
    HoursPer1000Pieces,
    #[strum(serialize = "Minutes/Piece")]
    MinutesPerPiece,
    #[strum(serialize = "Minutes/100 Pieces")]
    MinutesPer100Pieces,
    #[strum(serialize = "Minutes/1000 Pieces")]
    MinutesPer1000Pieces,
    #[strum(serialize = "Pieces/Hour")]
    PiecesPerHour,
    #[strum(serialize = "Pieces/Minute")]
    PiecesPerMinute,
    #[strum(serialize = "Seconds/Piece")]
    SecondsPerPiece,
    #[strum(serialize = "Total Hours")]
    TotalHours,
    #[strum(serialize = "Total Minutes")]
    TotalMinutes,
}

impl StandardFactor {
    /// Normalizes a production standard to hours per unit produced.
    /// Rates of zero pieces per period have no defined time and yield `None`.
    pub fn hours_per_unit(self, standard: Decimal) -> Option<Decimal> {
        let sixty = Decimal::from(60);
        match self {
            StandardFactor::HoursPerPiece | StandardFactor::TotalHours => Some(standard),
            StandardFactor::HoursPer100Pieces => Some(standard / Decimal::ONE_HUNDRED),
            StandardFactor::HoursPer1000Pieces => Some(standard / Decimal::ONE_THOUSAND),
            StandardFactor::MinutesPerPiece | StandardFactor::TotalMinutes => Some(standard / sixty),
            StandardFactor::MinutesPer100Pieces => Some(standard / Decimal::from(6_000)),
            StandardFactor::MinutesPer1000Pieces => Some(standard / Decimal::from(60_000)),
            StandardFactor::PiecesPerHour => Decimal::ONE.checked_div(standard),
            StandardFactor::PiecesPerMinute => Decimal::ONE.checked_div(standard * sixty),
            StandardFactor::SecondsPerPiece => Some(standard / Decimal::from(3_600)),
        }
    }
}

/// Bucket a cost effect contributes to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
pub enum CostCategory {
    MaterialCost,
    PartCost,
    ToolCost,
    FixtureCost,
    ConsumableCost,
    ServiceCost,
    LaborCost,
    OverheadCost,
    OutsideCost,
    SetupHours,
    ProductionHours,
}

impl From<ItemType> for CostCategory {
    fn from(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Material => CostCategory::MaterialCost,
            ItemType::Part => CostCategory::PartCost,
            ItemType::Tool => CostCategory::ToolCost,
            ItemType::Fixture => CostCategory::FixtureCost,
            ItemType::Consumable => CostCategory::ConsumableCost,
            ItemType::Service => CostCategory::ServiceCost,
        }
    }
}

/// How an effect depends on the ordered quantity `q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum EffectKind {
    /// Independent of `q`.
    Fixed { amount: Decimal },
    /// `coefficient × q`
    PerUnit { coefficient: Decimal },
    /// `max(coefficient × q, minimum)`
    PerUnitWithMinimum { coefficient: Decimal, minimum: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub category: CostCategory,
    #[serde(flatten)]
    pub kind: EffectKind,
}

impl Effect {
    fn new(category: CostCategory, kind: EffectKind) -> Self {
        Self { category, kind }
    }

    /// Value at `quantity`, or `None` when it does not fit in a `Decimal`.
    pub fn evaluate(&self, quantity: Decimal) -> Option<Decimal> {
        match self.kind {
            EffectKind::Fixed { amount } => Some(amount),
            EffectKind::PerUnit { coefficient } => coefficient.checked_mul(quantity),
            EffectKind::PerUnitWithMinimum {
                coefficient,
                minimum,
            } => coefficient
                .checked_mul(quantity)
                .map(|value| value.max(minimum)),
        }
    }

    pub fn is_quantity_independent(&self) -> bool {
        matches!(self.kind, EffectKind::Fixed { .. })
    }
}

/// Costs of one quantity tier, by category. Hours are totals for the tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub material_cost: Decimal,
    pub part_cost: Decimal,
    pub tool_cost: Decimal,
    pub fixture_cost: Decimal,
    pub consumable_cost: Decimal,
    pub service_cost: Decimal,
    pub labor_cost: Decimal,
    pub overhead_cost: Decimal,
    pub outside_cost: Decimal,
    pub setup_hours: Decimal,
    pub production_hours: Decimal,
}

impl CostBreakdown {
    pub fn get(&self, category: CostCategory) -> Decimal {
        match category {
            CostCategory::MaterialCost => self.material_cost,
            CostCategory::PartCost => self.part_cost,
            CostCategory::ToolCost => self.tool_cost,
            CostCategory::FixtureCost => self.fixture_cost,
            CostCategory::ConsumableCost => self.consumable_cost,
            CostCategory::ServiceCost => self.service_cost,
            CostCategory::LaborCost => self.labor_cost,
            CostCategory::OverheadCost => self.overhead_cost,
            CostCategory::OutsideCost => self.outside_cost,
            CostCategory::SetupHours => self.setup_hours,
            CostCategory::ProductionHours => self.production_hours,
        }
    }

    fn slot(&mut self, category: CostCategory) -> &mut Decimal {
        match category {
            CostCategory::MaterialCost => &mut self.material_cost,
            CostCategory::PartCost => &mut self.part_cost,
            CostCategory::ToolCost => &mut self.tool_cost,
            CostCategory::FixtureCost => &mut self.fixture_cost,
            CostCategory::ConsumableCost => &mut self.consumable_cost,
            CostCategory::ServiceCost => &mut self.service_cost,
            CostCategory::LaborCost => &mut self.labor_cost,
            CostCategory::OverheadCost => &mut self.overhead_cost,
            CostCategory::OutsideCost => &mut self.outside_cost,
            CostCategory::SetupHours => &mut self.setup_hours,
            CostCategory::ProductionHours => &mut self.production_hours,
        }
    }

    /// Sum of every money category. Hours are excluded. `None` on overflow.
    pub fn total_cost(&self) -> Option<Decimal> {
        [
            self.material_cost,
            self.part_cost,
            self.tool_cost,
            self.fixture_cost,
            self.consumable_cost,
            self.service_cost,
            self.labor_cost,
            self.overhead_cost,
            self.outside_cost,
        ]
        .into_iter()
        .try_fold(Decimal::ZERO, |total, cost| total.checked_add(cost))
    }
}

/// Compiled, immutable cost model of a quote line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    effects: Vec<Effect>,
    /// Set when compiling the tree overflowed; such a model has no costs.
    #[serde(default)]
    overflowed: bool,
}

impl CostModel {
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Costs at `quantity`. `None` when a category or the total overflows.
    pub fn costs(&self, quantity: Decimal) -> Option<CostBreakdown> {
        if self.overflowed {
            return None;
        }
        let mut breakdown = CostBreakdown::default();
        for effect in &self.effects {
            let slot = breakdown.slot(effect.category);
            *slot = slot.checked_add(effect.evaluate(quantity)?)?;
        }
        breakdown.total_cost()?;
        Some(breakdown)
    }
}

/// A method node annotated with its effective quantity and operations.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplodedNode<'a> {
    pub node: &'a MethodNode,
    /// Quantity per one unit of the quote line; `None` when the product of
    /// the quantities above it overflows.
    pub effective_quantity: Option<Decimal>,
    pub operations: Vec<&'a OperationInput>,
    pub children: Vec<ExplodedNode<'a>>,
}

/// Annotates `node` and its descendants without touching the input tree.
pub fn explode<'a>(
    node: &'a MethodNode,
    parent_quantity: Decimal,
    operations: &'a [OperationInput],
) -> ExplodedNode<'a> {
    let mut by_method: HashMap<Uuid, Vec<&'a OperationInput>> = HashMap::new();
    for operation in operations {
        by_method
            .entry(operation.make_method_id)
            .or_default()
            .push(operation);
    }
    explode_with(node, Some(parent_quantity), &by_method)
}

fn explode_with<'a>(
    node: &'a MethodNode,
    parent_quantity: Option<Decimal>,
    by_method: &HashMap<Uuid, Vec<&'a OperationInput>>,
) -> ExplodedNode<'a> {
    let effective_quantity = parent_quantity.and_then(|q| node.quantity.checked_mul(q));
    ExplodedNode {
        node,
        effective_quantity,
        operations: node
            .make_method_id
            .and_then(|id| by_method.get(&id).cloned())
            .unwrap_or_default(),
        children: node
            .children
            .iter()
            .map(|child| explode_with(child, effective_quantity, by_method))
            .collect(),
    }
}

/// Builds the cost model for a line. Without a tree the line is costed as a
/// single material at `fallback_unit_cost` per unit.
pub fn compile_cost_effects(
    tree: Option<&MethodNode>,
    operations: &[OperationInput],
    fallback_unit_cost: Decimal,
) -> CostModel {
    let mut effects = Vec::new();
    let overflowed = match tree {
        Some(root) => register(&explode(root, Decimal::ONE, operations), &mut effects).is_none(),
        None => {
            effects.push(Effect::new(
                CostCategory::MaterialCost,
                EffectKind::PerUnit {
                    coefficient: fallback_unit_cost,
                },
            ));
            false
        }
    };
    CostModel {
        effects,
        overflowed,
    }
}

/// Returns `None` when a coefficient of the tree does not fit in a `Decimal`.
fn register(exploded: &ExplodedNode<'_>, effects: &mut Vec<Effect>) -> Option<()> {
    let node = exploded.node;
    let quantity = exploded.effective_quantity?;

    if node.method_type.is_purchased() {
        if !node.unit_cost.is_zero() {
            effects.push(Effect::new(
                node.item_type.into(),
                EffectKind::PerUnit {
                    coefficient: node.unit_cost.checked_mul(quantity)?,
                },
            ));
        }
        return Some(());
    }

    for operation in &exploded.operations {
        register_operation(operation, quantity, effects)?;
    }
    for child in &exploded.children {
        register(child, effects)?;
    }
    Some(())
}

fn register_operation(
    operation: &OperationInput,
    quantity: Decimal,
    effects: &mut Vec<Effect>,
) -> Option<()> {
    if operation.setup_hours > Decimal::ZERO {
        let hours = operation.setup_hours;
        effects.push(Effect::new(
            CostCategory::SetupHours,
            EffectKind::Fixed { amount: hours },
        ));
        for (category, rate) in rate_split(operation) {
            effects.push(Effect::new(
                category,
                EffectKind::Fixed {
                    amount: hours.checked_mul(rate)?,
                },
            ));
        }
    }

    if operation.production_standard > Decimal::ZERO {
        let hours_per_unit = StandardFactor::from_str(&operation.standard_factor)
            .ok()
            .and_then(|factor| factor.hours_per_unit(operation.production_standard))
            .unwrap_or(Decimal::ZERO);
        if hours_per_unit > Decimal::ZERO {
            let hours = hours_per_unit.checked_mul(quantity)?;
            effects.push(Effect::new(
                CostCategory::ProductionHours,
                EffectKind::PerUnit { coefficient: hours },
            ));
            for (category, rate) in rate_split(operation) {
                effects.push(Effect::new(
                    category,
                    EffectKind::PerUnit {
                        coefficient: hours.checked_mul(rate)?,
                    },
                ));
            }
        }
    }

    if operation.operation_type == OperationType::Outside
        && (operation.operation_unit_cost > Decimal::ZERO
            || operation.operation_minimum_cost > Decimal::ZERO)
    {
        effects.push(Effect::new(
            CostCategory::OutsideCost,
            EffectKind::PerUnitWithMinimum {
                coefficient: operation.operation_unit_cost.checked_mul(quantity)?,
                minimum: operation.operation_minimum_cost,
            },
        ));
    }
    Some(())
}

/// Hourly rates an operation's time is charged at. Outside operations and
/// operations with a quoting rate are charged to overhead alone.
fn rate_split(operation: &OperationInput) -> Vec<(CostCategory, Decimal)> {
    match (operation.operation_type, operation.quoting_rate) {
        (_, Some(rate)) => vec![(CostCategory::OverheadCost, rate)],
        (OperationType::Outside, None) => {
            vec![(CostCategory::OverheadCost, operation.overhead_rate)]
        }
        (OperationType::Inside, None) => vec![
            (CostCategory::LaborCost, operation.labor_rate),
            (CostCategory::OverheadCost, operation.overhead_rate),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn leaf(
        method_type: MethodType,
        item_type: ItemType,
        quantity: Decimal,
        unit_cost: Decimal,
    ) -> MethodNode {
        MethodNode {
            id: Uuid::new_v4(),
            make_method_id: None,
            method_type,
            item_type,
            quantity,
            unit_cost,
            children: vec![],
        }
    }

    fn make(quantity: Decimal, children: Vec<MethodNode>) -> MethodNode {
        MethodNode {
            id: Uuid::new_v4(),
            make_method_id: Some(Uuid::new_v4()),
            method_type: MethodType::Make,
            item_type: ItemType::Part,
            quantity,
            unit_cost: Decimal::ZERO,
            children,
        }
    }

    fn inside(make_method_id: Uuid) -> OperationInput {
        OperationInput {
            make_method_id,
            operation_type: OperationType::Inside,
            setup_hours: Decimal::ZERO,
            production_standard: Decimal::ZERO,
            standard_factor: "Hours/Piece".to_string(),
            labor_rate: Decimal::ZERO,
            overhead_rate: Decimal::ZERO,
            quoting_rate: None,
            operation_minimum_cost: Decimal::ZERO,
            operation_unit_cost: Decimal::ZERO,
        }
    }

    #[rstest]
    #[case("Hours/Piece", dec!(2), dec!(2))]
    #[case("Hours/100 Pieces", dec!(50), dec!(0.5))]
    #[case("Hours/1000 Pieces", dec!(500), dec!(0.5))]
    #[case("Minutes/Piece", dec!(30), dec!(0.5))]
    #[case("Minutes/100 Pieces", dec!(3000), dec!(0.5))]
    #[case("Minutes/1000 Pieces", dec!(30000), dec!(0.5))]
    #[case("Pieces/Hour", dec!(4), dec!(0.25))]
    #[case("Pieces/Minute", dec!(0.5), dec!(0.033333))]
    #[case("Seconds/Piece", dec!(1800), dec!(0.5))]
    #[case("Total Hours", dec!(3), dec!(3))]
    #[case("Total Minutes", dec!(90), dec!(1.5))]
    fn standard_factor_normalizes_to_hours_per_unit(
        #[case] unit: &str,
        #[case] standard: Decimal,
        #[case] expected: Decimal,
    ) {
        let factor = StandardFactor::from_str(unit).unwrap();
        assert_eq!(factor.to_string(), unit);
        assert_eq!(
            factor.hours_per_unit(standard).map(|h| h.round_dp(6)),
            Some(expected)
        );
    }

    #[test]
    fn unknown_standard_factor_contributes_nothing() {
        assert!(StandardFactor::from_str("Furlongs/Fortnight").is_err());

        let root = make(Decimal::ONE, vec![]);
        let mut op = inside(root.make_method_id.unwrap());
        op.production_standard = dec!(5);
        op.standard_factor = "Furlongs/Fortnight".into();
        op.labor_rate = dec!(40);

        let model = compile_cost_effects(Some(&root), &[op], Decimal::ZERO);
        assert_eq!(model.costs(dec!(10)), Some(CostBreakdown::default()));
    }

    #[test]
    fn flat_line_is_a_single_material_effect() {
        let model = compile_cost_effects(None, &[], dec!(10));
        for q in [dec!(1), dec!(7), dec!(250)] {
            let costs = model.costs(q).unwrap();
            assert_eq!(costs.material_cost, dec!(10) * q);
            assert_eq!(costs.total_cost(), Some(dec!(10) * q));
            assert_eq!(costs.setup_hours, Decimal::ZERO);
            assert_eq!(costs.labor_cost, Decimal::ZERO);
        }
    }

    #[test]
    fn explode_multiplies_quantities_top_down() {
        let bolt = leaf(MethodType::Buy, ItemType::Part, dec!(4), dec!(0.25));
        let bracket = make(dec!(2), vec![bolt]);
        let root = make(Decimal::ONE, vec![bracket.clone()]);
        let snapshot = root.clone();

        let exploded = explode(&root, Decimal::ONE, &[]);
        assert_eq!(exploded.effective_quantity, Some(dec!(1)));
        assert_eq!(exploded.children[0].effective_quantity, Some(dec!(2)));
        assert_eq!(
            exploded.children[0].children[0].effective_quantity,
            Some(dec!(8))
        );
        assert_eq!(root, snapshot);
    }

    #[test]
    fn purchased_nodes_cost_by_item_type_and_hide_children() {
        let hidden = leaf(MethodType::Buy, ItemType::Material, dec!(100), dec!(100));
        let mut kit = leaf(MethodType::Pick, ItemType::Consumable, dec!(1), dec!(3));
        kit.children.push(hidden);
        let root = make(
            Decimal::ONE,
            vec![
                leaf(MethodType::Buy, ItemType::Material, dec!(2), dec!(5)),
                leaf(MethodType::Buy, ItemType::Tool, dec!(1), dec!(12)),
                kit,
            ],
        );

        let costs = compile_cost_effects(Some(&root), &[], Decimal::ZERO)
            .costs(dec!(10))
            .unwrap();
        assert_eq!(costs.material_cost, dec!(100));
        assert_eq!(costs.tool_cost, dec!(120));
        assert_eq!(costs.consumable_cost, dec!(30));
        assert_eq!(costs.total_cost(), Some(dec!(250)));
    }

    #[test]
    fn inside_operation_charges_labor_and_overhead() {
        let root = make(Decimal::ONE, vec![]);
        let mut op = inside(root.make_method_id.unwrap());
        op.setup_hours = dec!(2);
        op.production_standard = dec!(30);
        op.standard_factor = "Minutes/Piece".into();
        op.labor_rate = dec!(40);
        op.overhead_rate = dec!(10);

        let model = compile_cost_effects(Some(&root), &[op], Decimal::ZERO);
        let costs = model.costs(dec!(10)).unwrap();
        assert_eq!(costs.setup_hours, dec!(2));
        assert_eq!(costs.production_hours, dec!(5));
        assert_eq!(costs.labor_cost, dec!(80) + dec!(200));
        assert_eq!(costs.overhead_cost, dec!(20) + dec!(50));
    }

    #[test]
    fn quoting_rate_replaces_labor_and_overhead() {
        let root = make(Decimal::ONE, vec![]);
        let mut op = inside(root.make_method_id.unwrap());
        op.setup_hours = dec!(1);
        op.production_standard = dec!(1);
        op.labor_rate = dec!(40);
        op.overhead_rate = dec!(10);
        op.quoting_rate = Some(dec!(75));

        let costs = compile_cost_effects(Some(&root), &[op], Decimal::ZERO)
            .costs(dec!(2))
            .unwrap();
        assert_eq!(costs.labor_cost, Decimal::ZERO);
        assert_eq!(costs.overhead_cost, dec!(75) + dec!(150));
    }

    #[test]
    fn outside_operation_respects_minimum_cost() {
        let root = make(Decimal::ONE, vec![]);
        let mut op = inside(root.make_method_id.unwrap());
        op.operation_type = OperationType::Outside;
        op.operation_unit_cost = dec!(2);
        op.operation_minimum_cost = dec!(50);

        let model = compile_cost_effects(Some(&root), &[op], Decimal::ZERO);
        assert_eq!(model.costs(dec!(10)).unwrap().outside_cost, dec!(50));
        assert_eq!(model.costs(dec!(100)).unwrap().outside_cost, dec!(200));
    }

    #[test]
    fn outside_operation_time_is_charged_to_overhead_only() {
        let root = make(Decimal::ONE, vec![]);
        let mut op = inside(root.make_method_id.unwrap());
        op.operation_type = OperationType::Outside;
        op.setup_hours = dec!(1);
        op.labor_rate = dec!(40);
        op.overhead_rate = dec!(10);
        op.quoting_rate = Some(dec!(30));

        let costs = compile_cost_effects(Some(&root), &[op], Decimal::ZERO)
            .costs(dec!(5))
            .unwrap();
        assert_eq!(costs.setup_hours, dec!(1));
        assert_eq!(costs.labor_cost, Decimal::ZERO);
        assert_eq!(costs.overhead_cost, dec!(30));
        assert_eq!(costs.outside_cost, Decimal::ZERO);
    }

    #[test]
    fn operations_on_nested_make_methods_scale_by_effective_quantity() {
        let sub = make(dec!(3), vec![]);
        let sub_method = sub.make_method_id.unwrap();
        let root = make(Decimal::ONE, vec![sub]);
        let mut op = inside(sub_method);
        op.production_standard = dec!(1);
        op.labor_rate = dec!(10);

        let costs = compile_cost_effects(Some(&root), &[op], Decimal::ZERO)
            .costs(dec!(2))
            .unwrap();
        assert_eq!(costs.production_hours, dec!(6));
        assert_eq!(costs.labor_cost, dec!(60));
    }

    #[test]
    fn costs_that_overflow_are_none() {
        let model = compile_cost_effects(None, &[], dec!(10));
        assert_eq!(model.costs(Decimal::MAX), None);

        let root = make(
            Decimal::ONE,
            vec![
                leaf(MethodType::Buy, ItemType::Material, Decimal::ONE, Decimal::MAX),
                leaf(MethodType::Buy, ItemType::Tool, Decimal::ONE, Decimal::MAX),
            ],
        );
        let model = compile_cost_effects(Some(&root), &[], Decimal::ZERO);
        // each category fits, their sum does not
        assert_eq!(model.costs(Decimal::ONE), None);
        assert!(model.costs(Decimal::ZERO).is_some());

        let deep = make(
            Decimal::ONE,
            vec![make(
                Decimal::MAX,
                vec![leaf(MethodType::Buy, ItemType::Part, dec!(2), dec!(1))],
            )],
        );
        let model = compile_cost_effects(Some(&deep), &[], Decimal::ZERO);
        assert_eq!(model.costs(Decimal::ZERO), None);
    }

    #[test]
    fn setup_is_quantity_independent() {
        let root = make(Decimal::ONE, vec![]);
        let mut op = inside(root.make_method_id.unwrap());
        op.setup_hours = dec!(1.5);
        op.labor_rate = dec!(20);

        let model = compile_cost_effects(Some(&root), &[op], Decimal::ZERO);
        assert!(model.effects().iter().all(Effect::is_quantity_independent));
        assert_eq!(model.costs(dec!(1)), model.costs(dec!(1000)));
    }

    #[test]
    fn method_tree_deserializes_from_camel_case_json() {
        let json = serde_json::json!({
            "id": "6f1c1a0e-8a8f-4b0c-9a43-1f2b3c4d5e6f",
            "makeMethodId": "7a1c1a0e-8a8f-4b0c-9a43-1f2b3c4d5e6f",
            "methodType": "Make",
            "itemType": "Part",
            "quantity": 1,
            "children": [
                {
                    "id": "8b1c1a0e-8a8f-4b0c-9a43-1f2b3c4d5e6f",
                    "methodType": "Buy",
                    "itemType": "Material",
                    "quantity": 2,
                    "unitCost": 5
                }
            ]
        });
        let tree: MethodNode = serde_json::from_value(json).unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].unit_cost, dec!(5));

        let costs = compile_cost_effects(Some(&tree), &[], Decimal::ZERO)
            .costs(dec!(3))
            .unwrap();
        assert_eq!(costs.material_cost, dec!(30));
    }
}

use crate::{
    entities::{quote_line, quote_make_method, quote_material, quote_operation},
    errors::ServiceError,
    models::ItemType,
    services::cost_effects::{MethodNode, OperationInput},
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use std::collections::{HashMap, HashSet};
use tracing::instrument;
use uuid::Uuid;

/// Method tree of a quote line plus the operations of every make method in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodTree {
    /// `None` for lines without a make method.
    pub root: Option<MethodNode>,
    pub operations: Vec<OperationInput>,
}

/// Reads the make methods, materials and operations of `line`.
#[instrument(skip(conn, line), fields(quote_line_id = %line.id))]
pub async fn load_method_tree<C: ConnectionTrait>(
    conn: &C,
    line: &quote_line::Model,
) -> Result<MethodTree, ServiceError> {
    let make_methods = quote_make_method::Entity::find()
        .filter(quote_make_method::Column::QuoteLineId.eq(line.id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    if make_methods.is_empty() {
        return Ok(MethodTree::default());
    }

    let materials = quote_material::Entity::find()
        .filter(quote_material::Column::QuoteLineId.eq(line.id))
        .order_by_asc(quote_material::Column::SortOrder)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let operations = quote_operation::Entity::find()
        .filter(quote_operation::Column::QuoteLineId.eq(line.id))
        .order_by_asc(quote_operation::Column::SortOrder)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    assemble(line, &make_methods, &materials, &operations)
}

/// Builds the tree from its rows. Fails when the rows do not form a single
/// acyclic tree rooted at one make method.
pub fn assemble(
    line: &quote_line::Model,
    make_methods: &[quote_make_method::Model],
    materials: &[quote_material::Model],
    operations: &[quote_operation::Model],
) -> Result<MethodTree, ServiceError> {
    let mut roots = make_methods.iter().filter(|m| m.parent_material_id.is_none());
    let root = match (roots.next(), roots.next()) {
        (None, _) => return Ok(MethodTree::default()),
        (Some(root), None) => root,
        (Some(_), Some(_)) => {
            return Err(ServiceError::InvariantViolation(format!(
                "quote line {} has more than one root make method",
                line.id
            )))
        }
    };

    let mut materials_by_method: HashMap<Uuid, Vec<&quote_material::Model>> = HashMap::new();
    for material in materials {
        materials_by_method
            .entry(material.quote_make_method_id)
            .or_default()
            .push(material);
    }
    let method_by_material: HashMap<Uuid, &quote_make_method::Model> = make_methods
        .iter()
        .filter_map(|m| m.parent_material_id.map(|parent| (parent, m)))
        .collect();

    let builder = TreeBuilder {
        materials_by_method,
        method_by_material,
    };
    let mut visited = HashSet::new();
    let children = builder.children_of(root.id, &mut visited)?;

    Ok(MethodTree {
        root: Some(MethodNode {
            id: line.id,
            make_method_id: Some(root.id),
            method_type: line.method_type,
            item_type: ItemType::Part,
            quantity: rust_decimal::Decimal::ONE,
            unit_cost: line.unit_cost,
            children,
        }),
        operations: operations.iter().map(operation_input).collect(),
    })
}

struct TreeBuilder<'a> {
    materials_by_method: HashMap<Uuid, Vec<&'a quote_material::Model>>,
    method_by_material: HashMap<Uuid, &'a quote_make_method::Model>,
}

impl TreeBuilder<'_> {
    fn children_of(
        &self,
        make_method_id: Uuid,
        visited: &mut HashSet<Uuid>,
    ) -> Result<Vec<MethodNode>, ServiceError> {
        if !visited.insert(make_method_id) {
            return Err(ServiceError::InvariantViolation(format!(
                "make method {} appears twice in its own tree",
                make_method_id
            )));
        }

        let Some(materials) = self.materials_by_method.get(&make_method_id) else {
            return Ok(Vec::new());
        };

        materials
            .iter()
            .map(|material| {
                let sub_method = self.method_by_material.get(&material.id);
                let children = match sub_method {
                    Some(method) if !material.method_type.is_purchased() => {
                        self.children_of(method.id, visited)?
                    }
                    _ => Vec::new(),
                };
                Ok(MethodNode {
                    id: material.id,
                    make_method_id: sub_method.map(|m| m.id),
                    method_type: material.method_type,
                    item_type: material.item_type,
                    quantity: material.quantity,
                    unit_cost: material.unit_cost,
                    children,
                })
            })
            .collect()
    }
}

fn operation_input(operation: &quote_operation::Model) -> OperationInput {
    OperationInput {
        make_method_id: operation.quote_make_method_id,
        operation_type: operation.operation_type,
        setup_hours: operation.setup_hours,
        production_standard: operation.production_standard,
        standard_factor: operation.standard_factor.clone(),
        labor_rate: operation.labor_rate,
        overhead_rate: operation.overhead_rate,
        quoting_rate: operation.quoting_rate,
        operation_minimum_cost: operation.operation_minimum_cost,
        operation_unit_cost: operation.operation_unit_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MethodType;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn line() -> quote_line::Model {
        quote_line::Model {
            id: Uuid::new_v4(),
            quote_id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            item_id: Uuid::new_v4(),
            customer_part_id: None,
            customer_part_revision: None,
            description: None,
            quantity: serde_json::json!([1]),
            unit_of_measure_code: None,
            method_type: MethodType::Make,
            unit_cost: Decimal::ZERO,
            additional_charges: serde_json::json!({}),
            created_by: "tester".into(),
            created_at: Utc::now(),
        }
    }

    fn method(line: &quote_line::Model, parent_material_id: Option<Uuid>) -> quote_make_method::Model {
        quote_make_method::Model {
            id: Uuid::new_v4(),
            quote_id: line.quote_id,
            quote_line_id: line.id,
            parent_material_id,
            item_id: None,
            company_id: line.company_id,
        }
    }

    fn material(
        method: &quote_make_method::Model,
        method_type: MethodType,
        quantity: Decimal,
        unit_cost: Decimal,
    ) -> quote_material::Model {
        quote_material::Model {
            id: Uuid::new_v4(),
            quote_id: method.quote_id,
            quote_line_id: method.quote_line_id,
            quote_make_method_id: method.id,
            item_id: None,
            item_readable_id: None,
            description: "component".into(),
            method_type,
            item_type: ItemType::Material,
            quantity,
            unit_cost,
            sort_order: 0,
            company_id: method.company_id,
        }
    }

    #[test]
    fn line_without_make_method_has_no_tree() {
        let tree = assemble(&line(), &[], &[], &[]).unwrap();
        assert_eq!(tree, MethodTree::default());
    }

    #[test]
    fn make_materials_own_their_sub_methods() {
        let line = line();
        let root = method(&line, None);
        let sub_assembly = material(&root, MethodType::Make, dec!(2), Decimal::ZERO);
        let sub_method = method(&line, Some(sub_assembly.id));
        let sheet = material(&sub_method, MethodType::Buy, dec!(3), dec!(4));
        let screws = material(&root, MethodType::Buy, dec!(8), dec!(0.5));

        let tree = assemble(
            &line,
            &[root.clone(), sub_method.clone()],
            &[sub_assembly.clone(), sheet.clone(), screws],
            &[],
        )
        .unwrap();

        let root_node = tree.root.unwrap();
        assert_eq!(root_node.id, line.id);
        assert_eq!(root_node.make_method_id, Some(root.id));
        assert_eq!(root_node.children.len(), 2);

        let sub_node = root_node
            .children
            .iter()
            .find(|n| n.id == sub_assembly.id)
            .unwrap();
        assert_eq!(sub_node.make_method_id, Some(sub_method.id));
        assert_eq!(sub_node.children.len(), 1);
        assert_eq!(sub_node.children[0].id, sheet.id);
    }

    #[test]
    fn cyclic_rows_are_rejected() {
        let line = line();
        let root = method(&line, None);
        let loop_material = material(&root, MethodType::Make, dec!(1), Decimal::ZERO);
        // a second make method claiming the root as the owner of its own parent
        let mut looped = method(&line, Some(loop_material.id));
        looped.id = root.id;

        let result = assemble(&line, &[root, looped], &[loop_material], &[]);
        assert_matches!(result, Err(ServiceError::InvariantViolation(_)));
    }

    #[test]
    fn two_roots_are_rejected() {
        let line = line();
        let result = assemble(&line, &[method(&line, None), method(&line, None)], &[], &[]);
        assert_matches!(result, Err(ServiceError::InvariantViolation(_)));
    }
}

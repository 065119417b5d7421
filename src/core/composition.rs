//! Composition expansion, cycle detection, and repricing order
//!
//! The expander flattens a work's component tree into depth-annotated
//! rows for display. Sub-works expand only when the caller asks for them,
//! and a path-visited guard stops re-entry into a work already on the
//! current expansion path, so a cyclic file edited by hand terminates
//! instead of blowing the stack. Cycles are rejected at save time by
//! `would_create_cycle`; the guards here cover files written outside the
//! CLI.

use std::collections::{HashMap, HashSet};

use crate::core::catalog::{CatalogIndex, ResolvedKind};
use crate::entities::work::{Work, WorkComponent};

/// One row of a flattened composition tree
#[derive(Debug, Clone, serde::Serialize)]
pub struct CompositionRow {
    /// Referenced entity id
    pub id: String,

    /// What the reference resolved to
    pub kind: ResolvedKind,

    /// Resolved display name, "Inconnu" when dangling
    pub name: String,

    /// Resolved sale unit
    pub unit: String,

    /// Quantity on the component line
    pub quantity: f64,

    /// Unit price (sale price for sub-works)
    pub unit_price: f64,

    /// unit_price × quantity
    pub line_total: f64,

    /// Nesting depth, 0 for the work's own components
    pub depth: usize,
}

/// Flatten a work's component tree into display rows, depth-first pre-order
///
/// Every component emits one row at the current depth. A sub-work whose id
/// is in `expanded` additionally emits its own components at depth + 1,
/// immediately after its row. The expander holds no state; the caller owns
/// the expanded set and recomputes the view after every toggle.
pub fn expand_components(
    work: &Work,
    catalogs: &CatalogIndex,
    expanded: &HashSet<String>,
) -> Vec<CompositionRow> {
    let mut rows = Vec::new();
    let mut path = HashSet::new();
    path.insert(work.id.to_string());
    walk(&work.components, catalogs, expanded, 0, &mut path, &mut rows);
    rows
}

fn walk(
    components: &[WorkComponent],
    catalogs: &CatalogIndex,
    expanded: &HashSet<String>,
    depth: usize,
    path: &mut HashSet<String>,
    rows: &mut Vec<CompositionRow>,
) {
    for component in components {
        let resolved = catalogs.resolve(component);
        let unit_price = resolved.unit_price();
        rows.push(CompositionRow {
            id: component.id.clone(),
            kind: resolved.kind(),
            name: resolved.name().to_string(),
            unit: resolved.unit().to_string(),
            quantity: component.quantity,
            unit_price,
            line_total: unit_price * component.quantity,
            depth,
        });

        if let crate::core::catalog::Resolved::Work(sub) = resolved {
            if expanded.contains(&component.id) && !path.contains(&component.id) {
                path.insert(component.id.clone());
                walk(&sub.components, catalogs, expanded, depth + 1, path, rows);
                path.remove(&component.id);
            }
        }
    }
}

/// Whether adding `child_id` to `parent_id`'s components would close a cycle
///
/// True when the parent is reachable from the child through work-to-work
/// edges (self-reference included). Run before every component attach so
/// cyclic compositions never reach disk through the CLI.
pub fn would_create_cycle(parent_id: &str, child_id: &str, catalogs: &CatalogIndex) -> bool {
    if parent_id == child_id {
        return true;
    }

    let mut stack = vec![child_id.to_string()];
    let mut seen = HashSet::new();

    while let Some(current) = stack.pop() {
        if !seen.insert(current.clone()) {
            continue;
        }
        if let Some(work) = catalogs.work(&current) {
            for sub_id in work.sub_work_ids() {
                if sub_id == parent_id {
                    return true;
                }
                stack.push(sub_id.to_string());
            }
        }
    }

    false
}

/// Topological repricing order over the work catalog, leaves first
///
/// Returns `(order, cyclic)`: works in `order` can be repriced front to
/// back so every parent sees freshly repriced sub-works; works in `cyclic`
/// sit on a cycle or depend on one and are skipped with a warning by the
/// caller. Dangling sub-work references are ignored here, the resolver
/// already prices them at zero.
pub fn reprice_order(catalogs: &CatalogIndex) -> (Vec<String>, Vec<String>) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        InProgress,
        Done,
    }

    fn visit(
        id: &str,
        catalogs: &CatalogIndex,
        marks: &mut HashMap<String, Mark>,
        order: &mut Vec<String>,
        cyclic: &mut HashSet<String>,
    ) -> bool {
        match marks.get(id) {
            Some(Mark::Done) => return !cyclic.contains(id),
            Some(Mark::InProgress) => {
                cyclic.insert(id.to_string());
                return false;
            }
            None => {}
        }

        let Some(work) = catalogs.work(id) else {
            return true;
        };

        marks.insert(id.to_string(), Mark::InProgress);
        let mut on_cycle = false;
        for sub_id in work.sub_work_ids() {
            if !visit(sub_id, catalogs, marks, order, cyclic) {
                on_cycle = true;
            }
        }
        marks.insert(id.to_string(), Mark::Done);

        if on_cycle {
            cyclic.insert(id.to_string());
            false
        } else {
            order.push(id.to_string());
            true
        }
    }

    let mut ids: Vec<String> = catalogs.works().map(|w| w.id.to_string()).collect();
    ids.sort();

    let mut marks = HashMap::new();
    let mut order = Vec::new();
    let mut cyclic = HashSet::new();

    for id in &ids {
        visit(id, catalogs, &mut marks, &mut order, &mut cyclic);
    }

    let mut cyclic: Vec<String> = cyclic.into_iter().collect();
    cyclic.sort();
    (order, cyclic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::work::WorkCosts;
    use crate::entities::{ComponentKind, Labor, Material, Work};

    fn work(name: &str) -> Work {
        Work::new(name.to_string(), "u".to_string(), "t".to_string())
    }

    fn priced(mut w: Work, price: f64) -> Work {
        w.costs = Some(WorkCosts {
            material_cost: 0.0,
            labor_cost: 0.0,
            sub_works_cost: 0.0,
            total_cost: price / 1.2,
            recommended_price: price,
        });
        w
    }

    #[test]
    fn test_expand_collapsed_emits_single_row() {
        let mut sub = priced(work("Fondation"), 500.0);
        let lab = Labor::new("Coffreur".to_string(), 40.0, "t".to_string());
        sub.add_component(ComponentKind::Labor, lab.id.to_string(), 3.0);
        let sub_id = sub.id.to_string();

        let mut parent = work("Mur de clôture");
        parent.add_component(ComponentKind::Work, sub_id.clone(), 2.0);

        let index = CatalogIndex::from_entities([], [lab], [sub]);
        let rows = expand_components(&parent, &index, &HashSet::new());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, sub_id);
        assert_eq!(rows[0].kind, ResolvedKind::Work);
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[0].line_total, 1000.0);
    }

    #[test]
    fn test_expand_inserts_children_after_parent_row() {
        let mat = Material::new("Béton".to_string(), "m³".to_string(), 110.0, "t".to_string());
        let mat_id = mat.id.to_string();

        let mut sub = priced(work("Fondation"), 500.0);
        sub.add_component(ComponentKind::Material, mat_id.clone(), 0.5);
        let sub_id = sub.id.to_string();

        let mut parent = work("Mur de clôture");
        parent.add_component(ComponentKind::Work, sub_id.clone(), 2.0);
        parent.add_component(ComponentKind::Material, mat_id.clone(), 1.0);

        let index = CatalogIndex::from_entities([mat], [], [sub]);
        let expanded: HashSet<String> = [sub_id.clone()].into_iter().collect();
        let rows = expand_components(&parent, &index, &expanded);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id, sub_id);
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[1].id, mat_id);
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[2].id, mat_id);
        assert_eq!(rows[2].depth, 0);
    }

    #[test]
    fn test_expand_dangling_reference_row() {
        let mut parent = work("Rénovation");
        parent.add_component(ComponentKind::Material, "MAT-GONE".to_string(), 4.0);

        let rows = expand_components(&parent, &CatalogIndex::default(), &HashSet::new());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, ResolvedKind::Unknown);
        assert_eq!(rows[0].name, "Inconnu");
        assert_eq!(rows[0].line_total, 0.0);
    }

    #[test]
    fn test_expand_terminates_on_hand_edited_cycle() {
        let mut a = work("A");
        let mut b = work("B");
        let a_id = a.id.to_string();
        let b_id = b.id.to_string();
        a.add_component(ComponentKind::Work, b_id.clone(), 1.0);
        b.add_component(ComponentKind::Work, a_id.clone(), 1.0);
        let parent = a.clone();

        let index = CatalogIndex::from_entities([], [], [a, b]);
        let expanded: HashSet<String> = [a_id, b_id].into_iter().collect();

        // Must not recurse forever; B's row appears, its back-edge to A
        // appears once, then expansion stops.
        let rows = expand_components(&parent, &index, &expanded);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].depth, 1);
    }

    #[test]
    fn test_would_create_cycle() {
        let mut a = work("A");
        let mut b = work("B");
        let c = work("C");
        let a_id = a.id.to_string();
        let b_id = b.id.to_string();
        let c_id = c.id.to_string();
        a.add_component(ComponentKind::Work, b_id.clone(), 1.0);
        b.add_component(ComponentKind::Work, c_id.clone(), 1.0);

        let index = CatalogIndex::from_entities([], [], [a, b, c]);

        // C -> A would close A -> B -> C -> A
        assert!(would_create_cycle(&c_id, &a_id, &index));
        // Self-reference
        assert!(would_create_cycle(&a_id, &a_id, &index));
        // A -> C is a plain diamond edge, no cycle
        assert!(!would_create_cycle(&a_id, &c_id, &index));
    }

    #[test]
    fn test_reprice_order_leaves_first() {
        let mut a = work("A");
        let mut b = work("B");
        let c = work("C");
        let a_id = a.id.to_string();
        let b_id = b.id.to_string();
        let c_id = c.id.to_string();
        a.add_component(ComponentKind::Work, b_id.clone(), 1.0);
        b.add_component(ComponentKind::Work, c_id.clone(), 2.0);

        let index = CatalogIndex::from_entities([], [], [a, b, c]);
        let (order, cyclic) = reprice_order(&index);

        assert!(cyclic.is_empty());
        assert_eq!(order.len(), 3);
        let pos = |id: &str| order.iter().position(|o| o == id).unwrap();
        assert!(pos(&c_id) < pos(&b_id));
        assert!(pos(&b_id) < pos(&a_id));
    }

    #[test]
    fn test_reprice_order_reports_cycles() {
        let mut a = work("A");
        let mut b = work("B");
        let solo = work("Solo");
        let a_id = a.id.to_string();
        let b_id = b.id.to_string();
        let solo_id = solo.id.to_string();
        a.add_component(ComponentKind::Work, b_id.clone(), 1.0);
        b.add_component(ComponentKind::Work, a_id.clone(), 1.0);

        let index = CatalogIndex::from_entities([], [], [a, b, solo]);
        let (order, cyclic) = reprice_order(&index);

        assert_eq!(order, vec![solo_id]);
        assert_eq!(cyclic.len(), 2);
        assert!(cyclic.contains(&a_id));
        assert!(cyclic.contains(&b_id));
    }

    #[test]
    fn test_reprice_order_ignores_dangling_sub_works() {
        let mut a = work("A");
        let a_id = a.id.to_string();
        a.add_component(ComponentKind::Work, "WRK-GONE".to_string(), 1.0);

        let index = CatalogIndex::from_entities([], [], [a]);
        let (order, cyclic) = reprice_order(&index);

        assert_eq!(order, vec![a_id]);
        assert!(cyclic.is_empty());
    }
}

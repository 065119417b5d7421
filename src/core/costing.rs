//! Cost aggregation and margin derivation
//!
//! Pure functions over a work and a catalog snapshot. Bad data (dangling
//! references, unpriced sub-works) degrades to zero-valued contributions
//! rather than failing, so pricing always produces a number; the validate
//! command is where data-quality issues get reported.

use serde::Serialize;

use crate::core::catalog::CatalogIndex;
use crate::entities::work::{Work, WorkCosts};

/// Margin percentage applied to works without an explicit margin
pub const DEFAULT_MARGIN: f64 = 20.0;

/// Full cost breakdown for one work against a catalog snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSummary {
    /// Sum of material unit prices × quantities
    pub material_cost: f64,

    /// Sum of labor rates × quantities
    pub labor_cost: f64,

    /// Sum of sub-work sale prices × quantities
    pub sub_works_cost: f64,

    /// Déboursé sec: the three buckets summed
    pub total_cost: f64,

    /// Margin percentage used
    pub margin: f64,

    /// total_cost × margin / 100
    pub margin_amount: f64,

    /// total_cost + margin_amount
    pub recommended_price: f64,

    /// Material share of total cost, in percent (0 when total is 0)
    pub material_share: f64,

    /// Labor share of total cost, in percent
    pub labor_share: f64,

    /// Sub-works share of total cost, in percent
    pub sub_works_share: f64,
}

impl CostSummary {
    /// The subset persisted on the work entity as a cache
    pub fn to_costs(&self) -> WorkCosts {
        WorkCosts {
            material_cost: self.material_cost,
            labor_cost: self.labor_cost,
            sub_works_cost: self.sub_works_cost,
            total_cost: self.total_cost,
            recommended_price: self.recommended_price,
        }
    }
}

/// Compute the cost breakdown of a work against the current catalogs
///
/// Each component contributes to exactly one bucket. A sub-work
/// contributes its cached sale price as an opaque unit; its own
/// components are not walked, its cost was settled when it was itself
/// repriced. Full-precision floats throughout, formatting happens at
/// display time only.
pub fn cost_summary(work: &Work, catalogs: &CatalogIndex) -> CostSummary {
    let mut material_cost = 0.0;
    let mut labor_cost = 0.0;
    let mut sub_works_cost = 0.0;

    for component in &work.components {
        let resolved = catalogs.resolve(component);
        let contribution = resolved.unit_price() * component.quantity;
        match resolved {
            crate::core::catalog::Resolved::Material(_) => material_cost += contribution,
            crate::core::catalog::Resolved::Labor(_) => labor_cost += contribution,
            crate::core::catalog::Resolved::Work(_) => sub_works_cost += contribution,
            crate::core::catalog::Resolved::Unknown => {}
        }
    }

    let total_cost = material_cost + labor_cost + sub_works_cost;
    let margin = work.effective_margin();
    let margin_amount = total_cost * margin / 100.0;
    let recommended_price = total_cost + margin_amount;

    CostSummary {
        material_cost,
        labor_cost,
        sub_works_cost,
        total_cost,
        margin,
        margin_amount,
        recommended_price,
        material_share: share(material_cost, total_cost),
        labor_share: share(labor_cost, total_cost),
        sub_works_share: share(sub_works_cost, total_cost),
    }
}

/// Percentage of `part` in `total`, 0 when the total is 0
fn share(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::work::WorkCosts;
    use crate::entities::{ComponentKind, Labor, Material, Work};

    const EPS: f64 = 1e-9;

    fn material(name: &str, unit_price: f64) -> Material {
        Material::new(name.to_string(), "u".to_string(), unit_price, "t".to_string())
    }

    fn work(name: &str) -> Work {
        Work::new(name.to_string(), "u".to_string(), "t".to_string())
    }

    #[test]
    fn test_empty_work_is_all_zero() {
        let w = work("Vide");
        let summary = cost_summary(&w, &CatalogIndex::default());

        assert_eq!(summary.total_cost, 0.0);
        assert_eq!(summary.recommended_price, 0.0);
        assert_eq!(summary.material_share, 0.0);
        assert_eq!(summary.labor_share, 0.0);
        assert_eq!(summary.sub_works_share, 0.0);
        assert!(summary.material_share.is_finite());
    }

    #[test]
    fn test_two_materials_default_margin() {
        let m1 = material("Tuile", 100.0);
        let m2 = material("Liteau", 50.0);
        let mut w = work("Couverture");
        w.add_component(ComponentKind::Material, m1.id.to_string(), 3.0);
        w.add_component(ComponentKind::Material, m2.id.to_string(), 2.0);

        let index = CatalogIndex::from_entities([m1, m2], [], []);
        let summary = cost_summary(&w, &index);

        assert!((summary.material_cost - 400.0).abs() < EPS);
        assert_eq!(summary.labor_cost, 0.0);
        assert_eq!(summary.sub_works_cost, 0.0);
        assert!((summary.total_cost - 400.0).abs() < EPS);
        assert!((summary.margin_amount - 80.0).abs() < EPS);
        assert!((summary.recommended_price - 480.0).abs() < EPS);
        assert!((summary.material_share - 100.0).abs() < EPS);
    }

    #[test]
    fn test_labor_only_zero_margin() {
        let lab = Labor::new("Électricien".to_string(), 200.0, "t".to_string());
        let mut w = work("Tirage de câbles");
        w.margin = Some(0.0);
        w.add_component(ComponentKind::Labor, lab.id.to_string(), 5.0);

        let index = CatalogIndex::from_entities([], [lab], []);
        let summary = cost_summary(&w, &index);

        assert!((summary.labor_cost - 1000.0).abs() < EPS);
        assert!((summary.total_cost - 1000.0).abs() < EPS);
        assert_eq!(summary.margin_amount, 0.0);
        assert!((summary.recommended_price - 1000.0).abs() < EPS);
    }

    #[test]
    fn test_sub_work_contributes_sale_price() {
        let mat = material("Gravier", 10.0);
        let mut sub = work("Hérisson");
        sub.costs = Some(WorkCosts {
            material_cost: 300.0,
            labor_cost: 116.66,
            sub_works_cost: 0.0,
            total_cost: 416.66,
            recommended_price: 500.0,
        });

        let mut parent = work("Dallage");
        parent.add_component(ComponentKind::Work, sub.id.to_string(), 2.0);
        parent.add_component(ComponentKind::Material, mat.id.to_string(), 10.0);

        let index = CatalogIndex::from_entities([mat], [], [sub]);
        let summary = cost_summary(&parent, &index);

        // 2 × the sub-work's 500.0 sale price, not 2 × its 416.66 cost
        assert!((summary.sub_works_cost - 1000.0).abs() < EPS);
        assert!((summary.material_cost - 100.0).abs() < EPS);
        assert!((summary.total_cost - 1100.0).abs() < EPS);
        assert!((summary.recommended_price - 1320.0).abs() < EPS);
    }

    #[test]
    fn test_dangling_reference_contributes_nothing() {
        let mat = material("Plaque", 20.0);
        let mut w = work("Doublage");
        w.add_component(ComponentKind::Material, mat.id.to_string(), 2.0);
        w.add_component(ComponentKind::Material, "MAT-GONE".to_string(), 5.0);
        w.add_component(ComponentKind::Work, "WRK-GONE".to_string(), 3.0);

        let index = CatalogIndex::from_entities([mat], [], []);
        let summary = cost_summary(&w, &index);

        assert!((summary.material_cost - 40.0).abs() < EPS);
        assert_eq!(summary.sub_works_cost, 0.0);
        assert!((summary.total_cost - 40.0).abs() < EPS);
    }

    #[test]
    fn test_buckets_sum_to_total() {
        let mat = material("Brique", 1.2);
        let lab = Labor::new("Maçon".to_string(), 45.0, "t".to_string());
        let mut sub = work("Linteau");
        sub.costs = Some(WorkCosts {
            material_cost: 0.0,
            labor_cost: 0.0,
            sub_works_cost: 0.0,
            total_cost: 60.0,
            recommended_price: 72.0,
        });

        let mut w = work("Mur");
        w.add_component(ComponentKind::Material, mat.id.to_string(), 60.0);
        w.add_component(ComponentKind::Labor, lab.id.to_string(), 1.5);
        w.add_component(ComponentKind::Work, sub.id.to_string(), 1.0);

        let index = CatalogIndex::from_entities([mat], [lab], [sub]);
        let summary = cost_summary(&w, &index);

        let bucket_sum = summary.material_cost + summary.labor_cost + summary.sub_works_cost;
        assert!((summary.total_cost - bucket_sum).abs() < EPS);

        let share_sum = summary.material_share + summary.labor_share + summary.sub_works_share;
        assert!((share_sum - 100.0).abs() < EPS);
    }

    #[test]
    fn test_margin_formula_across_range() {
        let mat = material("Enduit", 7.5);
        let mat_id = mat.id.to_string();
        let index = CatalogIndex::from_entities([mat], [], []);

        for margin in [0.0, 1.0, 20.0, 33.3, 100.0, 250.0, 500.0] {
            let mut w = work("Ragréage");
            w.margin = Some(margin);
            w.add_component(ComponentKind::Material, mat_id.clone(), 4.0);

            let summary = cost_summary(&w, &index);
            let expected = summary.total_cost * (1.0 + margin / 100.0);
            assert!(
                (summary.recommended_price - expected).abs() < EPS,
                "margin {}",
                margin
            );
        }
    }

    #[test]
    fn test_deterministic() {
        let mat = material("Parquet", 55.0);
        let mut w = work("Pose parquet");
        w.add_component(ComponentKind::Material, mat.id.to_string(), 12.0);
        let index = CatalogIndex::from_entities([mat], [], []);

        let first = cost_summary(&w, &index);
        let second = cost_summary(&w, &index);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sub_work_repricing_changes_parent_only_on_recompute() {
        let mut sub = work("Tranchée");
        sub.costs = Some(WorkCosts {
            material_cost: 0.0,
            labor_cost: 100.0,
            sub_works_cost: 0.0,
            total_cost: 100.0,
            recommended_price: 120.0,
        });
        let sub_id = sub.id.to_string();

        let mut parent = work("Réseau enterré");
        parent.add_component(ComponentKind::Work, sub_id.clone(), 1.0);

        let before = cost_summary(&parent, &CatalogIndex::from_entities([], [], [sub.clone()]));
        assert!((before.sub_works_cost - 120.0).abs() < EPS);

        // Reprice the sub-work, rebuild the snapshot: the parent follows
        if let Some(costs) = sub.costs.as_mut() {
            costs.recommended_price = 180.0;
        }
        let after = cost_summary(&parent, &CatalogIndex::from_entities([], [], [sub]));
        assert!((after.sub_works_cost - 180.0).abs() < EPS);
    }
}

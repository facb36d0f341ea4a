//! Criteria tag rows

use akredo_core::{CriteriaId, CycleId, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One link between an entity version and a (cycle, criterion) pair.
///
/// A tag call with N criteria expands into N rows, all carrying the same
/// version and cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaTag {
    pub entity_id: EntityId,
    pub version_no: u32,
    pub criteria_id: CriteriaId,
    pub cycle_id: CycleId,
    pub tagged_at: DateTime<Utc>,
}

impl CriteriaTag {
    /// Expand a tag set into individual rows, one per criterion.
    ///
    /// Criteria come in as a `BTreeSet`, so the expansion order is
    /// deterministic.
    pub fn expand(
        entity_id: &EntityId,
        version_no: u32,
        criteria: &BTreeSet<CriteriaId>,
        cycle_id: &CycleId,
    ) -> Vec<Self> {
        let tagged_at = Utc::now();
        criteria
            .iter()
            .map(|criteria_id| Self {
                entity_id: entity_id.clone(),
                version_no,
                criteria_id: criteria_id.clone(),
                cycle_id: cycle_id.clone(),
                tagged_at,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_one_row_per_criterion() {
        let criteria: BTreeSet<_> = [CriteriaId::from("K3"), CriteriaId::from("K1")]
            .into_iter()
            .collect();

        let rows = CriteriaTag::expand(
            &EntityId::from("DOC-1"),
            1,
            &criteria,
            &CycleId::from("C1"),
        );

        assert_eq!(rows.len(), 2);
        // BTreeSet iteration gives deterministic (sorted) order
        assert_eq!(rows[0].criteria_id, CriteriaId::from("K1"));
        assert_eq!(rows[1].criteria_id, CriteriaId::from("K3"));
        assert!(rows.iter().all(|r| r.version_no == 1));
        assert!(rows.iter().all(|r| r.cycle_id == CycleId::from("C1")));
    }
}

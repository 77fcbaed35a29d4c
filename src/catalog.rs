//! Lecture du catalogue de kits, toujours scopée par organisation.

use crate::model::{Kit, KitType, OrgId};
use crate::planner::PlanError;

/// Kits actifs de `org`, éventuellement restreints à une gamme, triés par id.
pub fn active_kits<'a>(kits: &'a [Kit], org: &OrgId, kit_type: Option<KitType>) -> Vec<&'a Kit> {
    let mut out: Vec<&Kit> = kits
        .iter()
        .filter(|k| k.active && &k.org == org)
        .filter(|k| kit_type.map_or(true, |t| k.kit_type == t))
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

/// Contrôles de champs appliqués à la création ou à l'import d'un kit.
///
/// Les délais sont non signés : `>= 0` tient par construction.
pub fn validate_kit(kit: &Kit) -> Result<(), PlanError> {
    if kit.name.trim().is_empty() {
        return Err(PlanError::InvalidKit("kit name cannot be empty"));
    }
    if kit.home_base.trim().is_empty() {
        return Err(PlanError::InvalidKit("home base cannot be empty"));
    }
    if kit.contents.iter().any(|item| item.name.trim().is_empty()) {
        return Err(PlanError::InvalidKit("packing item name cannot be empty"));
    }
    if kit.contents.iter().any(|item| item.quantity == 0) {
        return Err(PlanError::InvalidKit("packing item quantity must be > 0"));
    }
    if kit.replacement_value.is_some_and(|v| !(v >= 0.0)) {
        return Err(PlanError::InvalidKit("replacement value must be >= 0"));
    }
    if let Some(dim) = &kit.dimensions {
        let sizes = [dim.length_cm, dim.width_cm, dim.height_cm];
        if sizes.iter().any(|v| !(*v > 0.0)) || dim.weight_kg.is_some_and(|w| !(w >= 0.0)) {
            return Err(PlanError::InvalidKit("dimensions must be positive"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KitId, PackingItem};

    #[test]
    fn filters_by_org_type_and_active_flag() {
        let acme = OrgId::new("acme");
        let other = OrgId::new("other");
        let mut retired = Kit::new(acme.clone(), "Old", KitType::Standard, "Lyon", 1, 1)
            .with_id(KitId::new("k0"));
        retired.active = false;
        let kits = vec![
            Kit::new(acme.clone(), "B", KitType::Standard, "Lyon", 1, 1).with_id(KitId::new("k2")),
            Kit::new(acme.clone(), "A", KitType::Compact, "Lyon", 1, 1).with_id(KitId::new("k1")),
            Kit::new(other, "C", KitType::Standard, "Lille", 1, 1).with_id(KitId::new("k3")),
            retired,
        ];

        let all: Vec<&str> = active_kits(&kits, &acme, None).iter().map(|k| k.id.as_str()).collect();
        assert_eq!(all, vec!["k1", "k2"]);

        let std_only = active_kits(&kits, &acme, Some(KitType::Standard));
        assert_eq!(std_only.len(), 1);
        assert_eq!(std_only[0].id.as_str(), "k2");
    }

    #[test]
    fn rejects_zero_quantity_items() {
        let mut kit = Kit::new(OrgId::default(), "K", KitType::Tabletop, "Lyon", 0, 0);
        assert!(validate_kit(&kit).is_ok());
        kit.contents.push(PackingItem {
            name: "banner".into(),
            quantity: 0,
        });
        assert!(matches!(validate_kit(&kit), Err(PlanError::InvalidKit(_))));
    }
}

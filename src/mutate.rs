//! In-memory edits applied to a fetched offer before it is PUT back.

use crate::error::{CliError, Result};
use crate::model::{Offer, OfferKind, Plan, VirtualMachineImage};

/// Insert `plan` into `offer`.
///
/// An id collision fails with `PlanExists` and leaves the offer untouched
/// unless `force` is set, in which case the plan is replaced at its index.
pub fn upsert_plan(offer: &mut Offer, plan: Plan, force: bool) -> Result<()> {
    let offer_id = offer.id.clone();
    match offer.find_plan_mut(&plan.id) {
        Some(_) if !force => Err(CliError::PlanExists {
            plan_id: plan.id,
            offer_id,
        }),
        Some(existing) => {
            tracing::debug!(plan = %plan.id, offer = %offer_id, "replacing plan");
            *existing = plan;
            Ok(())
        }
        None => {
            tracing::debug!(plan = %plan.id, offer = %offer_id, "adding plan");
            offer.definition.plans.push(plan);
            Ok(())
        }
    }
}

/// Set `version` in the image map of plan `plan_id`. An existing entry for
/// the same version is overwritten.
pub fn upsert_image(
    offer: &mut Offer,
    plan_id: &str,
    version: &str,
    image: VirtualMachineImage,
    variant: OfferKind,
) -> Result<()> {
    let offer_id = offer.id.clone();
    let plan = offer
        .find_plan_mut(plan_id)
        .ok_or_else(|| CliError::PlanNotFound {
            plan_id: plan_id.to_string(),
            offer_id,
        })?;

    if plan.kind() != variant {
        return Err(CliError::ImageVariantMismatch {
            plan_id: plan_id.to_string(),
            requested: variant.name(),
            found: plan.kind().name(),
        });
    }

    plan.image_map_mut().insert(version.to_string(), image);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlanDetail;
    use serde_json::json;

    const VM_OFFER: &str = include_str!("../tests/fixtures/vm_offer.json");
    const CORE_VM_OFFER: &str = include_str!("../tests/fixtures/corevm_offer.json");

    fn vm_plan(id: &str, title: &str) -> Plan {
        Plan::from_value(
            json!({"planId": id, "microsoft-azure-virtualmachines.skuTitle": title}),
            Some(OfferKind::VirtualMachine),
        )
        .unwrap()
    }

    fn image(url: &str) -> VirtualMachineImage {
        VirtualMachineImage {
            os_vhd_url: Some(url.to_string()),
            ..Default::default()
        }
    }

    fn sku_title(plan: &Plan) -> Option<&str> {
        match &plan.detail {
            PlanDetail::VirtualMachine(vm) => vm.sku_title.as_deref(),
            PlanDetail::CoreVm(core) => core.sku_title.as_deref(),
        }
    }

    #[test]
    fn test_upsert_plan_rejects_duplicate_without_force() {
        let mut offer: Offer = serde_json::from_str(VM_OFFER).unwrap();
        let before = offer.clone();

        let err = upsert_plan(&mut offer, vm_plan("planId_one", "new"), false).unwrap_err();
        assert!(matches!(err, CliError::PlanExists { ref plan_id, .. } if plan_id == "planId_one"));
        assert_eq!(offer, before);
    }

    #[test]
    fn test_upsert_plan_force_replaces_in_place() {
        let mut offer: Offer = serde_json::from_str(VM_OFFER).unwrap();
        upsert_plan(&mut offer, vm_plan("second", "second"), false).unwrap();
        upsert_plan(&mut offer, vm_plan("planId_one", "replaced"), true).unwrap();

        let plans = &offer.definition.plans;
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].id, "planId_one");
        assert_eq!(sku_title(&plans[0]), Some("replaced"));
        // replaced wholesale, regions came from the old plan only
        assert!(plans[0].regions.is_none());
        assert_eq!(plans[1].id, "second");
    }

    #[test]
    fn test_upsert_plan_appends_new_id() {
        let mut offer: Offer = serde_json::from_str(VM_OFFER).unwrap();
        upsert_plan(&mut offer, vm_plan("planId_two", "two"), false).unwrap();
        assert_eq!(offer.definition.plans.len(), 2);
        assert_eq!(offer.definition.plans[1].id, "planId_two");
    }

    #[test]
    fn test_upsert_image_last_write_wins() {
        let mut offer: Offer = serde_json::from_str(VM_OFFER).unwrap();
        let variant = OfferKind::VirtualMachine;
        upsert_image(&mut offer, "planId_one", "2020.1.1", image("first"), variant).unwrap();
        upsert_image(&mut offer, "planId_one", "2020.1.1", image("second"), variant).unwrap();

        let images = offer.find_plan("planId_one").unwrap().image_map();
        assert_eq!(images.len(), 3);
        assert_eq!(images["2020.1.1"].os_vhd_url.as_deref(), Some("second"));
        assert_eq!(images["2018.1.1"].os_vhd_url.as_deref(), Some("osVhdUrl_one"));
    }

    #[test]
    fn test_upsert_image_core_vm() {
        let mut offer: Offer = serde_json::from_str(CORE_VM_OFFER).unwrap();
        let core_image = VirtualMachineImage {
            media_name: Some("media".into()),
            label: Some("label".into()),
            show_in_gui: Some(true),
            ..image("https://blob/vhd")
        };
        upsert_image(&mut offer, "planId_one", "2021.2.2", core_image.clone(), OfferKind::CoreVm)
            .unwrap();

        let plan = offer.find_plan("planId_one").unwrap();
        assert_eq!(plan.image_map()["2021.2.2"], core_image);

        let encoded = serde_json::to_value(&offer).unwrap();
        let images = &encoded["definition"]["plans"][0]["microsoft-azure-corevm.vmImagesPublicAzure"];
        assert_eq!(images["2021.2.2"]["mediaName"], "media");
        assert_eq!(images["2018.1.1"]["mediaName"], "mediaName_one");
    }

    #[test]
    fn test_upsert_image_creates_missing_map() {
        let mut offer = Offer::default();
        upsert_plan(&mut offer, vm_plan("p", "t"), false).unwrap();
        upsert_image(&mut offer, "p", "1.0.0", image("u"), OfferKind::VirtualMachine).unwrap();
        assert_eq!(offer.find_plan("p").unwrap().image_map().len(), 1);
    }

    #[test]
    fn test_upsert_image_missing_plan() {
        let mut offer: Offer = serde_json::from_str(VM_OFFER).unwrap();
        let err = upsert_image(&mut offer, "nope", "1", image("u"), OfferKind::VirtualMachine)
            .unwrap_err();
        assert!(matches!(err, CliError::PlanNotFound { ref plan_id, .. } if plan_id == "nope"));
    }

    #[test]
    fn test_upsert_image_variant_mismatch() {
        let mut offer: Offer = serde_json::from_str(VM_OFFER).unwrap();
        let before = offer.clone();
        let err = upsert_image(&mut offer, "planId_one", "1", image("u"), OfferKind::CoreVm)
            .unwrap_err();
        assert!(matches!(err, CliError::ImageVariantMismatch { .. }));
        assert_eq!(offer, before);
    }

    #[test]
    fn test_patched_fixture_keeps_plan() {
        let overrides = vec!["definition.displayText=foo".to_string()];
        let merged = crate::patch::merge(VM_OFFER.as_bytes(), &overrides).unwrap();
        let offer: Offer = serde_json::from_slice(&merged).unwrap();
        assert_eq!(offer.definition.display_text.as_deref(), Some("foo"));
        assert_eq!(offer.definition.plans.len(), 1);
        assert_eq!(offer.definition.plans[0].id, "planId_one");
    }
}

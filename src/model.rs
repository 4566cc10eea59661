//! Typed Cloud Partner Portal resources.
//!
//! Every leaf field is optional so partial documents from the API (or from an
//! offer file) decode without loss. Members this crate does not model are kept
//! in each struct's `extra` map and written back unchanged, so fields the
//! server adds survive a fetch, mutate, PUT cycle.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const VIRTUAL_MACHINE_OFFER_TYPE: &str = "microsoft-azure-virtualmachines";
pub const CORE_VM_OFFER_TYPE: &str = "microsoft-azure-corevm";

const CORE_VM_KEY_PREFIX: &str = "microsoft-azure-corevm.";

static NO_IMAGES: BTreeMap<String, VirtualMachineImage> = BTreeMap::new();

/// Which plan layout an offer uses, taken from its `offerTypeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferKind {
    VirtualMachine,
    CoreVm,
}

impl OfferKind {
    pub fn from_type_id(type_id: &str) -> Option<Self> {
        match type_id {
            VIRTUAL_MACHINE_OFFER_TYPE => Some(OfferKind::VirtualMachine),
            CORE_VM_OFFER_TYPE => Some(OfferKind::CoreVm),
            _ => None,
        }
    }

    /// Guess from the member names of a single plan when the offer type is
    /// missing or unknown.
    fn infer(plan: &Map<String, Value>) -> Self {
        if plan.keys().any(|k| k.starts_with(CORE_VM_KEY_PREFIX)) {
            OfferKind::CoreVm
        } else {
            OfferKind::VirtualMachine
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OfferKind::VirtualMachine => "virtual machine",
            OfferKind::CoreVm => "core VM",
        }
    }
}

// ── Publishers ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublisherDefinition {
    #[serde(rename = "displayText", skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    #[serde(rename = "offerTypeCategories", skip_serializing_if = "Option::is_none")]
    pub offer_type_categories: Option<Vec<String>>,
    #[serde(rename = "sellerId", skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default)]
    pub definition: PublisherDefinition,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Offer details ───────────────────────────────────────────

/// `microsoft-azure-virtualmachines.*` offer members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachineDetail {
    #[serde(rename = "microsoft-azure-virtualmachines.gtmMaterials", skip_serializing_if = "Option::is_none")]
    pub gtm_materials: Option<String>,
    #[serde(rename = "microsoft-azure-virtualmachines.managerContactName", skip_serializing_if = "Option::is_none")]
    pub manager_contact_name: Option<String>,
    #[serde(rename = "microsoft-azure-virtualmachines.managerContactEmail", skip_serializing_if = "Option::is_none")]
    pub manager_contact_email: Option<String>,
    #[serde(rename = "microsoft-azure-virtualmachines.managerContactPhone", skip_serializing_if = "Option::is_none")]
    pub manager_contact_phone: Option<String>,
}

/// The portal's "Test Drive" settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestDriveDetail {
    #[serde(rename = "microsoft-azure-marketplace-testdrive.enabled", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "microsoft-azure-marketplace-testdrive.videos", skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
}

/// Marketing and contact information of a marketplace listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceDetail {
    #[serde(rename = "microsoft-azure-marketplace.title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.summary", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.longSummary", skip_serializing_if = "Option::is_none")]
    pub long_summary: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.cspOfferOptIn", skip_serializing_if = "Option::is_none")]
    pub csp_offer_opt_in: Option<bool>,
    #[serde(rename = "microsoft-azure-marketplace.offerMarketingUrlIdentifier", skip_serializing_if = "Option::is_none")]
    pub offer_marketing_url_identifier: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.allowedSubscriptions", skip_serializing_if = "Option::is_none")]
    pub allowed_subscriptions: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-marketplace.usefulLinks", skip_serializing_if = "Option::is_none")]
    pub useful_links: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-marketplace.categories", skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-marketplace.categoryMap", skip_serializing_if = "Option::is_none")]
    pub category_map: Option<Vec<Map<String, Value>>>,
    #[serde(rename = "microsoft-azure-marketplace.smallLogo", skip_serializing_if = "Option::is_none")]
    pub small_logo: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.mediumLogo", skip_serializing_if = "Option::is_none")]
    pub medium_logo: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.wideLogo", skip_serializing_if = "Option::is_none")]
    pub wide_logo: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.screenshots", skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-marketplace.videos", skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-marketplace.leadDestination", skip_serializing_if = "Option::is_none")]
    pub lead_destination: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.privacyURL", skip_serializing_if = "Option::is_none")]
    pub privacy_url: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.useEnterpriseContract", skip_serializing_if = "Option::is_none")]
    pub use_enterprise_contract: Option<bool>,
    #[serde(rename = "microsoft-azure-marketplace.termsOfUse", skip_serializing_if = "Option::is_none")]
    pub terms_of_use: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.engineeringContactName", skip_serializing_if = "Option::is_none")]
    pub engineering_contact_name: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.engineeringContactEmail", skip_serializing_if = "Option::is_none")]
    pub engineering_contact_email: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.engineeringContactPhone", skip_serializing_if = "Option::is_none")]
    pub engineering_contact_phone: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.supportContactName", skip_serializing_if = "Option::is_none")]
    pub support_contact_name: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.supportContactEmail", skip_serializing_if = "Option::is_none")]
    pub support_contact_email: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.supportContactPhone", skip_serializing_if = "Option::is_none")]
    pub support_contact_phone: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.publicAzureSupportUrl", skip_serializing_if = "Option::is_none")]
    pub public_azure_support_url: Option<String>,
    #[serde(rename = "microsoft-azure-marketplace.fairfaxSupportUrl", skip_serializing_if = "Option::is_none")]
    pub fairfax_support_url: Option<String>,
}

/// `microsoft-azure-corevm.*` offer members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreVmOfferDetail {
    #[serde(rename = "microsoft-azure-corevm.legacyOfferId", skip_serializing_if = "Option::is_none")]
    pub legacy_offer_id: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.legacyPublisherId", skip_serializing_if = "Option::is_none")]
    pub legacy_publisher_id: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.summary", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.allowedSubscriptions", skip_serializing_if = "Option::is_none")]
    pub allowed_subscriptions: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-corevm.leadDestination", skip_serializing_if = "Option::is_none")]
    pub lead_destination: Option<String>,
}

/// Offer-level metadata. Which of the field sets is populated depends on the
/// offer type; all of them share one flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferDetail {
    #[serde(flatten)]
    pub virtual_machine: VirtualMachineDetail,
    #[serde(flatten)]
    pub marketplace: MarketplaceDetail,
    #[serde(flatten)]
    pub test_drive: TestDriveDetail,
    #[serde(flatten)]
    pub core_vm: CoreVmOfferDetail,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Plans ───────────────────────────────────────────────────

/// A published image version. VM plans usually only carry `osVhdUrl`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachineImage {
    #[serde(rename = "mediaName", skip_serializing_if = "Option::is_none")]
    pub media_name: Option<String>,
    #[serde(rename = "showInGui", skip_serializing_if = "Option::is_none")]
    pub show_in_gui: Option<bool>,
    /// Kept as text: the API sometimes returns an empty string here.
    #[serde(rename = "publishedDate", skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "osVhdUrl", skip_serializing_if = "Option::is_none")]
    pub os_vhd_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreMultiplier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachinePricing {
    #[serde(rename = "isByol", skip_serializing_if = "Option::is_none")]
    pub is_bring_your_own_license: Option<bool>,
    #[serde(rename = "freeTrialDurationInMonths", skip_serializing_if = "Option::is_none")]
    pub free_trial_duration_in_months: Option<i64>,
    #[serde(rename = "coreMultiplier", skip_serializing_if = "Option::is_none")]
    pub core_multiplier: Option<CoreMultiplier>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Plan members of a `microsoft-azure-virtualmachines` offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmPlanDetail {
    #[serde(rename = "microsoft-azure-virtualmachines.skuTitle", skip_serializing_if = "Option::is_none")]
    pub sku_title: Option<String>,
    #[serde(rename = "microsoft-azure-virtualmachines.skuSummary", skip_serializing_if = "Option::is_none")]
    pub sku_summary: Option<String>,
    #[serde(rename = "microsoft-azure-virtualmachines.skuDescription", skip_serializing_if = "Option::is_none")]
    pub sku_description: Option<String>,
    #[serde(rename = "microsoft-azure-virtualmachines.hideSKUForSolutionTemplate", skip_serializing_if = "Option::is_none")]
    pub hide_sku_for_solution_template: Option<bool>,
    #[serde(rename = "microsoft-azure-virtualmachines.cloudAvailability", skip_serializing_if = "Option::is_none")]
    pub cloud_availability: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-virtualmachines.supportsAcceleratedNetworking", skip_serializing_if = "Option::is_none")]
    pub supports_accelerated_networking: Option<bool>,
    #[serde(rename = "virtualMachinePricing", skip_serializing_if = "Option::is_none")]
    pub pricing: Option<VirtualMachinePricing>,
    #[serde(rename = "virtualMachinePricingV2", skip_serializing_if = "Option::is_none")]
    pub pricing_v2: Option<VirtualMachinePricing>,
    #[serde(rename = "microsoft-azure-virtualmachines.operatingSystemFamily", skip_serializing_if = "Option::is_none")]
    pub operating_system_family: Option<String>,
    #[serde(rename = "microsoft-azure-virtualmachines.osType", skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    #[serde(rename = "microsoft-azure-virtualmachines.operatingSystem", skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    /// The portal really does spell it this way on some offers.
    #[serde(rename = "microsoft-azure-virtualmachines.operationSystem", skip_serializing_if = "Option::is_none")]
    pub operation_system: Option<String>,
    #[serde(rename = "microsoft-azure-virtualmachines.recommendedVMSizes", skip_serializing_if = "Option::is_none")]
    pub recommended_vm_sizes: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-virtualmachines.vmImages", skip_serializing_if = "Option::is_none")]
    pub vm_images: Option<BTreeMap<String, VirtualMachineImage>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsefulLink {
    #[serde(rename = "linkTitle", skip_serializing_if = "Option::is_none")]
    pub link_title: Option<String>,
    #[serde(rename = "linkUrl", skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
}

/// Plan members of a `microsoft-azure-corevm` offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreVmPlanDetail {
    #[serde(rename = "microsoft-azure-corevm.skuTitle", skip_serializing_if = "Option::is_none")]
    pub sku_title: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.skuSummary", skip_serializing_if = "Option::is_none")]
    pub sku_summary: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.skuLongSummary", skip_serializing_if = "Option::is_none")]
    pub sku_long_summary: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.hideSKUForSolutionTemplate", skip_serializing_if = "Option::is_none")]
    pub hide_sku_for_solution_template: Option<bool>,
    #[serde(rename = "microsoft-azure-corevm.hardened", skip_serializing_if = "Option::is_none")]
    pub hardened: Option<bool>,
    /// `ARM` or `RDFE`.
    #[serde(rename = "microsoft-azure-corevm.deploymentModels", skip_serializing_if = "Option::is_none")]
    pub deployment_models: Option<Vec<String>>,
    /// `PublicAzure`, `Mooncake`, `Fairfax` or `Blackforest`.
    #[serde(rename = "microsoft-azure-corevm.cloudAvailability", skip_serializing_if = "Option::is_none")]
    pub cloud_availability: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-corevm.pricingDetailsUrl", skip_serializing_if = "Option::is_none")]
    pub pricing_details_url: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.imageType", skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.imageVisibility", skip_serializing_if = "Option::is_none")]
    pub image_visibility: Option<bool>,
    #[serde(rename = "microsoft-azure-corevm.generation", skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.operatingSystemFamily", skip_serializing_if = "Option::is_none")]
    pub operating_system_family: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.osType", skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.osFriendlyName", skip_serializing_if = "Option::is_none")]
    pub os_friendly_name: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.recommendedVMSizes", skip_serializing_if = "Option::is_none")]
    pub recommended_vm_sizes: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-corevm.supportsHubOnOffSwitch", skip_serializing_if = "Option::is_none")]
    pub supports_hub_on_off_switch: Option<bool>,
    #[serde(rename = "microsoft-azure-corevm.supportsClientHub", skip_serializing_if = "Option::is_none")]
    pub supports_client_hub: Option<bool>,
    #[serde(rename = "microsoft-azure-corevm.isPremiumThirdParty", skip_serializing_if = "Option::is_none")]
    pub is_premium_third_party: Option<bool>,
    #[serde(rename = "microsoft-azure-corevm.supportsHub", skip_serializing_if = "Option::is_none")]
    pub supports_hub: Option<bool>,
    #[serde(rename = "microsoft-azure-corevm.supportsBackup", skip_serializing_if = "Option::is_none")]
    pub supports_backup: Option<bool>,
    #[serde(rename = "microsoft-azure-corevm.freeTierEligible", skip_serializing_if = "Option::is_none")]
    pub free_tier_eligible: Option<bool>,
    #[serde(rename = "microsoft-azure-corevm.supportsSriov", skip_serializing_if = "Option::is_none")]
    pub supports_sriov: Option<bool>,
    #[serde(rename = "microsoft-azure-corevm.supportsAADLogin", skip_serializing_if = "Option::is_none")]
    pub supports_aad_login: Option<bool>,
    #[serde(rename = "microsoft-azure-corevm.defaultImageSizeGB", skip_serializing_if = "Option::is_none")]
    pub default_image_size_gb: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.vmImagesPublicAzure", skip_serializing_if = "Option::is_none")]
    pub vm_images: Option<BTreeMap<String, VirtualMachineImage>>,
    #[serde(rename = "microsoft-azure-corevm.skuDescriptionPublicAzure", skip_serializing_if = "Option::is_none")]
    pub sku_description_public_azure: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.skuDescriptionFairfax", skip_serializing_if = "Option::is_none")]
    pub sku_description_fairfax: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.skuDescriptionMooncake", skip_serializing_if = "Option::is_none")]
    pub sku_description_mooncake: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.skuDescriptionBlackforest", skip_serializing_if = "Option::is_none")]
    pub sku_description_blackforest: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.usefulLinksPublicAzure", skip_serializing_if = "Option::is_none")]
    pub useful_links_public_azure: Option<Vec<UsefulLink>>,
    #[serde(rename = "microsoft-azure-corevm.usefulLinksFairfax", skip_serializing_if = "Option::is_none")]
    pub useful_links_fairfax: Option<Vec<UsefulLink>>,
    #[serde(rename = "microsoft-azure-corevm.usefulLinksMooncake", skip_serializing_if = "Option::is_none")]
    pub useful_links_mooncake: Option<Vec<UsefulLink>>,
    #[serde(rename = "microsoft-azure-corevm.usefulLinksBlackforest", skip_serializing_if = "Option::is_none")]
    pub useful_links_blackforest: Option<Vec<UsefulLink>>,
    #[serde(rename = "microsoft-azure-corevm.categories", skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-corevm.categoryMap", skip_serializing_if = "Option::is_none")]
    pub category_map: Option<Vec<Map<String, Value>>>,
    #[serde(rename = "microsoft-azure-corevm.smallLogo", skip_serializing_if = "Option::is_none")]
    pub small_logo: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.mediumLogo", skip_serializing_if = "Option::is_none")]
    pub medium_logo: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.largeLogo", skip_serializing_if = "Option::is_none")]
    pub large_logo: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.wideLogo", skip_serializing_if = "Option::is_none")]
    pub wide_logo: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.screenshots", skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-corevm.videos", skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
    #[serde(rename = "microsoft-azure-corevm.leadGenerationId", skip_serializing_if = "Option::is_none")]
    pub lead_generation_id: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.privacyURL", skip_serializing_if = "Option::is_none")]
    pub privacy_url: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.termsOfUseURL", skip_serializing_if = "Option::is_none")]
    pub terms_of_use_url: Option<String>,
    #[serde(rename = "microsoft-azure-corevm.migratedOffer", skip_serializing_if = "Option::is_none")]
    pub migrated_offer: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The variant-specific half of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlanDetail {
    VirtualMachine(VmPlanDetail),
    CoreVm(CoreVmPlanDetail),
}

impl PlanDetail {
    pub fn kind(&self) -> OfferKind {
        match self {
            PlanDetail::VirtualMachine(_) => OfferKind::VirtualMachine,
            PlanDetail::CoreVm(_) => OfferKind::CoreVm,
        }
    }
}

/// A SKU of an offer. The API calls these plans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    #[serde(rename = "planId", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(flatten)]
    pub detail: PlanDetail,
}

#[derive(Deserialize)]
struct PlanWire {
    #[serde(rename = "planId", default)]
    id: String,
    #[serde(default)]
    regions: Option<Vec<String>>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl Plan {
    /// Decode a plan. `kind` comes from the owning offer; without one the
    /// layout is inferred from the plan's own members.
    pub fn from_value(value: Value, kind: Option<OfferKind>) -> serde_json::Result<Self> {
        let wire: PlanWire = serde_json::from_value(value)?;
        let kind = kind.unwrap_or_else(|| OfferKind::infer(&wire.rest));
        let rest = Value::Object(wire.rest);
        let detail = match kind {
            OfferKind::VirtualMachine => PlanDetail::VirtualMachine(serde_json::from_value(rest)?),
            OfferKind::CoreVm => PlanDetail::CoreVm(serde_json::from_value(rest)?),
        };
        Ok(Plan {
            id: wire.id,
            regions: wire.regions,
            detail,
        })
    }

    pub fn kind(&self) -> OfferKind {
        self.detail.kind()
    }

    /// Image versions of the plan, keyed by version string.
    pub fn image_map(&self) -> &BTreeMap<String, VirtualMachineImage> {
        let images = match &self.detail {
            PlanDetail::VirtualMachine(vm) => vm.vm_images.as_ref(),
            PlanDetail::CoreVm(core) => core.vm_images.as_ref(),
        };
        images.unwrap_or(&NO_IMAGES)
    }

    /// Image map of the plan's variant, created empty when absent.
    pub fn image_map_mut(&mut self) -> &mut BTreeMap<String, VirtualMachineImage> {
        match &mut self.detail {
            PlanDetail::VirtualMachine(vm) => vm.vm_images.get_or_insert_with(BTreeMap::new),
            PlanDetail::CoreVm(core) => core.vm_images.get_or_insert_with(BTreeMap::new),
        }
    }
}

// ── Offers ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Definition {
    #[serde(rename = "displayText", skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    #[serde(rename = "offer", skip_serializing_if = "Option::is_none")]
    pub offer_detail: Option<OfferDetail>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plans: Vec<Plan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A marketplace offer.
///
/// Decoding picks each plan's variant from `offerTypeId`, so a core VM offer
/// never yields virtual machine plans and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OfferWire")]
pub struct Offer {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(rename = "offerTypeId", skip_serializing_if = "String::is_empty")]
    pub type_id: String,
    #[serde(rename = "publisherId", skip_serializing_if = "String::is_empty")]
    pub publisher_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "pcMigrationStatus", skip_serializing_if = "Option::is_none")]
    pub pc_migration_status: Option<String>,
    #[serde(rename = "isvUpgradeRequest", skip_serializing_if = "Option::is_none")]
    pub is_version_upgrade_request: Option<bool>,
    pub definition: Definition,
    #[serde(rename = "changedTime", skip_serializing_if = "Option::is_none")]
    pub changed_time: Option<String>,
    /// Entity tag used for `If-Match` on PUT.
    #[serde(rename = "Etag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct DefinitionWire {
    #[serde(rename = "displayText")]
    display_text: Option<String>,
    #[serde(rename = "offer")]
    offer_detail: Option<OfferDetail>,
    #[serde(default)]
    plans: Option<Vec<Value>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct OfferWire {
    #[serde(default)]
    id: String,
    version: Option<i64>,
    #[serde(rename = "offerTypeId", default)]
    type_id: String,
    #[serde(rename = "publisherId", default)]
    publisher_id: String,
    status: Option<String>,
    #[serde(rename = "pcMigrationStatus")]
    pc_migration_status: Option<String>,
    #[serde(rename = "isvUpgradeRequest")]
    is_version_upgrade_request: Option<bool>,
    definition: Option<DefinitionWire>,
    #[serde(rename = "changedTime")]
    changed_time: Option<String>,
    #[serde(rename = "Etag")]
    etag: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<OfferWire> for Offer {
    type Error = serde_json::Error;

    fn try_from(wire: OfferWire) -> Result<Self, Self::Error> {
        let kind = OfferKind::from_type_id(&wire.type_id);
        let definition = match wire.definition {
            Some(def) => Definition {
                display_text: def.display_text,
                offer_detail: def.offer_detail,
                plans: def
                    .plans
                    .unwrap_or_default()
                    .into_iter()
                    .map(|plan| Plan::from_value(plan, kind))
                    .collect::<Result<_, _>>()?,
                extra: def.extra,
            },
            None => Definition::default(),
        };

        Ok(Offer {
            id: wire.id,
            version: wire.version,
            type_id: wire.type_id,
            publisher_id: wire.publisher_id,
            status: wire.status,
            pc_migration_status: wire.pc_migration_status,
            is_version_upgrade_request: wire.is_version_upgrade_request,
            definition,
            changed_time: wire.changed_time,
            etag: wire.etag,
            extra: wire.extra,
        })
    }
}

impl Offer {
    /// Plan layout of this offer, if `offerTypeId` names a known type.
    pub fn kind(&self) -> Option<OfferKind> {
        OfferKind::from_type_id(&self.type_id)
    }

    pub fn find_plan(&self, plan_id: &str) -> Option<&Plan> {
        self.definition.plans.iter().find(|p| p.id == plan_id)
    }

    pub fn find_plan_mut(&mut self, plan_id: &str) -> Option<&mut Plan> {
        self.definition.plans.iter_mut().find(|p| p.id == plan_id)
    }
}

// ── Status and operations ───────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(rename = "messageHtml", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A step in the publication process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time_frame: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<StatusMessage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percentage: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "displayText", alias = "DisplayText", skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    #[serde(rename = "uri", alias = "URI", skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Publication status of an offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<StatusMessage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StatusStep>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_links: Option<Vec<Link>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_links: Option<Vec<Link>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_emails: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of publish, go-live and cancel requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub metadata: PublishMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishMetadata {
    #[serde(rename = "notification-emails", skip_serializing_if = "Option::is_none")]
    pub notification_emails: Option<String>,
}

impl PublishRequest {
    pub fn new(notification_emails: Option<String>) -> Self {
        Self {
            metadata: PublishMetadata {
                notification_emails,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// An entry of the submissions list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishing_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<OperationDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_time: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single long-running operation with its step progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishing_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_request_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<StatusMessage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StatusStep>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_links: Option<Vec<Link>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_links: Option<Vec<Link>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_emails: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

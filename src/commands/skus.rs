use crate::client::PartnerService;
use crate::commands::{load_document, OfferRef, PlanRef};
use crate::error::{CliError, Result};
use crate::middleware::Precondition;
use crate::model::Plan;
use crate::mutate::upsert_plan;
use crate::output::{emit, Printer};
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum SkusCommand {
    /// List the SKUs (plans) of an offer
    #[command(long_about = "List every plan of an offer.\n\n\
        Example:\n\
        pub skus list -p contoso -o contoso-vm")]
    List {
        #[command(flatten)]
        target: OfferRef,
    },
    /// Show a single SKU
    #[command(long_about = "Show one plan of an offer.\n\n\
        Example:\n\
        pub skus show -p contoso -o contoso-vm -s contoso-vm-gen2")]
    Show {
        #[command(flatten)]
        target: PlanRef,
    },
    /// Add a SKU to an offer, or replace one with --force
    #[command(long_about = "Read a plan from a JSON file and add it to an existing offer.\n\n\
        The plan layout (virtual machine or core VM) follows the offer's type.\n\
        Without --force an existing plan with the same planId is left alone.\n\n\
        Examples:\n\
        pub skus put -p contoso -o contoso-vm -f plan.json\n\
        pub skus put -p contoso -o contoso-vm -f plan.json --set planId=gen2 --force")]
    Put {
        #[command(flatten)]
        target: OfferRef,
        /// File path to the JSON file containing the SKU
        #[arg(short = 'f', long)]
        sku_file: PathBuf,
        /// Override a field: key.keypart=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Overwrite an existing SKU with the same ID
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle(cmd: SkusCommand, client: &dyn PartnerService, printer: &dyn Printer) -> Result<()> {
    match cmd {
        SkusCommand::List { target } => {
            let offer = client.get_offer(&target.publisher, &target.offer).await?;
            emit(printer, &offer.definition.plans)
        }
        SkusCommand::Show { target } => {
            let offer = client
                .get_offer(&target.offer.publisher, &target.offer.offer)
                .await?;
            let plan = offer.find_plan(&target.sku).ok_or_else(|| CliError::PlanNotFound {
                plan_id: target.sku.clone(),
                offer_id: target.offer.offer.clone(),
            })?;
            emit(printer, plan)
        }
        SkusCommand::Put {
            target,
            sku_file,
            set,
            force,
        } => {
            let bits = load_document(&sku_file, &set)?;
            let value: serde_json::Value = serde_json::from_slice(&bits)?;

            let mut offer = client.get_offer(&target.publisher, &target.offer).await?;
            let plan = Plan::from_value(value, offer.kind())?;
            if plan.id.is_empty() {
                return Err(CliError::InvalidInput(format!(
                    "{} has no planId",
                    sku_file.display()
                )));
            }

            match upsert_plan(&mut offer, plan, force) {
                Err(err @ CliError::PlanExists { .. }) => {
                    printer.warn(&format!("{err}; use --force to replace it"));
                    return Ok(());
                }
                other => other?,
            }

            let precondition = offer.etag.clone().map(Precondition::Etag);
            let saved = client.put_offer(&offer, precondition).await?;
            emit(printer, &saved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{FakeService, CORE_VM_OFFER, VM_OFFER};
    use crate::model::{OfferKind, PlanDetail};
    use crate::output::testing::CapturePrinter;
    use serde_json::json;

    fn target() -> OfferRef {
        OfferRef {
            publisher: "publisherId".into(),
            offer: "test".into(),
        }
    }

    fn sku_file(dir: &tempfile::TempDir, body: serde_json::Value) -> PathBuf {
        let path = dir.path().join("sku.json");
        std::fs::write(&path, body.to_string()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_show_missing_plan_fails() {
        let svc = FakeService::with_offer(VM_OFFER);
        let printer = CapturePrinter::default();
        let cmd = SkusCommand::Show {
            target: PlanRef {
                offer: target(),
                sku: "nope".into(),
            },
        };
        let err = handle(cmd, &svc, &printer).await.unwrap_err();
        assert!(matches!(err, CliError::PlanNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_prints_plans() {
        let svc = FakeService::with_offer(VM_OFFER);
        let printer = CapturePrinter::default();
        handle(SkusCommand::List { target: target() }, &svc, &printer)
            .await
            .unwrap();
        assert_eq!(printer.printed()[0][0]["planId"], "planId_one");
    }

    #[tokio::test]
    async fn test_put_adds_plan_with_offer_etag() {
        let dir = tempfile::tempdir().unwrap();
        let path = sku_file(
            &dir,
            json!({"planId": "planId_two", "microsoft-azure-virtualmachines.skuTitle": "Two"}),
        );

        let svc = FakeService::with_offer(VM_OFFER);
        let printer = CapturePrinter::default();
        let cmd = SkusCommand::Put {
            target: target(),
            sku_file: path,
            set: vec![],
            force: false,
        };
        handle(cmd, &svc, &printer).await.unwrap();

        let puts = svc.puts();
        let (offer, precondition) = &puts[0];
        assert_eq!(offer.definition.plans.len(), 2);
        assert_eq!(offer.definition.plans[1].kind(), OfferKind::VirtualMachine);
        assert_eq!(
            precondition,
            &Some(Precondition::Etag(
                "W/\"datetime'2019-10-30T22%3A03%3A51.6562051Z'\"".into()
            ))
        );
    }

    #[tokio::test]
    async fn test_put_existing_plan_without_force_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = sku_file(&dir, json!({"planId": "planId_one"}));

        let svc = FakeService::with_offer(VM_OFFER);
        let printer = CapturePrinter::default();
        let cmd = SkusCommand::Put {
            target: target(),
            sku_file: path,
            set: vec![],
            force: false,
        };
        handle(cmd, &svc, &printer).await.unwrap();

        assert!(svc.puts().is_empty());
        assert!(printer.printed().is_empty());
        assert!(printer.warnings()[0].contains("planId_one"));
    }

    #[tokio::test]
    async fn test_put_force_replaces_core_vm_plan() {
        let dir = tempfile::tempdir().unwrap();
        let path = sku_file(&dir, json!({"planId": "planId_one"}));

        let svc = FakeService::with_offer(CORE_VM_OFFER);
        let printer = CapturePrinter::default();
        let cmd = SkusCommand::Put {
            target: target(),
            sku_file: path,
            set: vec!["microsoft-azure-corevm\\.skuTitle=Replaced".into()],
            force: true,
        };
        handle(cmd, &svc, &printer).await.unwrap();

        let puts = svc.puts();
        let plans = &puts[0].0.definition.plans;
        assert_eq!(plans.len(), 1);
        match &plans[0].detail {
            PlanDetail::CoreVm(core) => assert_eq!(core.sku_title.as_deref(), Some("Replaced")),
            other => panic!("expected a core VM plan, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_put_requires_plan_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = sku_file(&dir, json!({"microsoft-azure-virtualmachines.skuTitle": "x"}));

        let svc = FakeService::with_offer(VM_OFFER);
        let printer = CapturePrinter::default();
        let cmd = SkusCommand::Put {
            target: target(),
            sku_file: path,
            set: vec![],
            force: false,
        };
        let err = handle(cmd, &svc, &printer).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }
}

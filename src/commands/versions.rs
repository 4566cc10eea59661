use crate::client::PartnerService;
use crate::commands::PlanRef;
use crate::error::{CliError, Result};
use crate::middleware::Precondition;
use crate::model::{Offer, OfferKind, Plan, VirtualMachineImage};
use crate::mutate::upsert_image;
use crate::output::{emit, Printer};
use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum VersionsCommand {
    /// List the image versions of a SKU
    #[command(long_about = "List the image versions of a plan, keyed by version.\n\n\
        Example:\n\
        pub versions list -p contoso -o contoso-vm -s contoso-vm-gen2")]
    List {
        #[command(flatten)]
        target: PlanRef,
    },
    /// Show a single image version of a SKU
    #[command(long_about = "Show one image version of a plan.\n\n\
        Example:\n\
        pub versions show -p contoso -o contoso-vm -s contoso-vm-gen2 --version 2019.10.11")]
    Show {
        #[command(flatten)]
        target: PlanRef,
        /// Version to show; for example, 2019.10.11
        #[arg(long)]
        version: String,
    },
    /// Add or replace an image version of a SKU
    Put {
        #[command(subcommand)]
        cmd: PutVersionCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PutVersionCommand {
    /// Put a VM image version on a virtual machine offer's plan
    #[command(long_about = "Set an image version on a plan of a microsoft-azure-virtualmachines offer.\n\
        An existing entry for the same version is replaced.\n\n\
        Example:\n\
        pub versions put image -p contoso -o contoso-vm -s gen2 --version 2020.1.1 \\\n\
          --vhd-uri 'https://contoso.blob.core.windows.net/vhds/os.vhd?sv=...'")]
    Image {
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Put a VM image version on a core VM offer's plan
    #[command(long_about = "Set an image version on a plan of a microsoft-azure-corevm offer.\n\
        An existing entry for the same version is replaced.\n\n\
        Example:\n\
        pub versions put corevm -p contoso -o contoso-vm -s gen2 --version 2020.1.1 \\\n\
          --vhd-uri 'https://contoso.blob.core.windows.net/vhds/os.vhd?sv=...' \\\n\
          --media-name contoso-gen2-2020 --label 'Contoso Gen2' --show")]
    Corevm {
        #[command(flatten)]
        image: ImageArgs,
        /// Name of the VM image
        #[arg(long)]
        media_name: Option<String>,
        /// Label of the VM image
        #[arg(long)]
        label: Option<String>,
        /// Description of the VM image
        #[arg(long)]
        desc: Option<String>,
        /// Show the image in the portal GUI
        #[arg(long)]
        show: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ImageArgs {
    #[command(flatten)]
    pub target: PlanRef,
    /// String that uniquely identifies the version; for example, 2020.1.1
    #[arg(long)]
    pub version: String,
    /// Signed Azure storage blob URI of the captured OS VHD
    #[arg(long)]
    pub vhd_uri: String,
}

fn plan<'a>(offer: &'a Offer, target: &PlanRef) -> Result<&'a Plan> {
    offer.find_plan(&target.sku).ok_or_else(|| CliError::PlanNotFound {
        plan_id: target.sku.clone(),
        offer_id: target.offer.offer.clone(),
    })
}

pub async fn handle(
    cmd: VersionsCommand,
    client: &dyn PartnerService,
    printer: &dyn Printer,
) -> Result<()> {
    match cmd {
        VersionsCommand::List { target } => {
            let offer = client
                .get_offer(&target.offer.publisher, &target.offer.offer)
                .await?;
            emit(printer, plan(&offer, &target)?.image_map())
        }
        VersionsCommand::Show { target, version } => {
            let offer = client
                .get_offer(&target.offer.publisher, &target.offer.offer)
                .await?;
            let image = plan(&offer, &target)?
                .image_map()
                .get(&version)
                .ok_or_else(|| CliError::VersionNotFound {
                    plan_id: target.sku.clone(),
                    version: version.clone(),
                })?;
            emit(printer, image)
        }
        VersionsCommand::Put { cmd } => {
            let (args, image, variant) = match cmd {
                PutVersionCommand::Image { image: args } => {
                    let image = VirtualMachineImage {
                        os_vhd_url: Some(args.vhd_uri.clone()),
                        ..Default::default()
                    };
                    (args, image, OfferKind::VirtualMachine)
                }
                PutVersionCommand::Corevm {
                    image: args,
                    media_name,
                    label,
                    desc,
                    show,
                } => {
                    let image = VirtualMachineImage {
                        os_vhd_url: Some(args.vhd_uri.clone()),
                        media_name,
                        label,
                        description: desc,
                        show_in_gui: Some(show),
                        ..Default::default()
                    };
                    (args, image, OfferKind::CoreVm)
                }
            };
            put_image(client, printer, args, image, variant).await
        }
    }
}

/// Fetch the offer, set the image on the plan, PUT it back and print the
/// plan's resulting versions.
async fn put_image(
    client: &dyn PartnerService,
    printer: &dyn Printer,
    args: ImageArgs,
    image: VirtualMachineImage,
    variant: OfferKind,
) -> Result<()> {
    let target = &args.target;
    let mut offer = client
        .get_offer(&target.offer.publisher, &target.offer.offer)
        .await?;
    upsert_image(&mut offer, &target.sku, &args.version, image, variant)?;

    let precondition = offer.etag.clone().map(Precondition::Etag);
    let saved = client.put_offer(&offer, precondition).await?;
    emit(printer, plan(&saved, target)?.image_map())
}

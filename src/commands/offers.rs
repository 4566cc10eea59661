use crate::client::PartnerService;
use crate::commands::{load_document, OfferRef};
use crate::error::Result;
use crate::middleware::Precondition;
use crate::model::Offer;
use crate::output::{emit, Printer};
use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum OffersCommand {
    /// List all offers of a publisher
    #[command(long_about = "List every offer owned by a publisher.\n\n\
        Example:\n\
        pub offers list -p contoso")]
    List {
        /// Publisher ID; for example, Contoso
        #[arg(short, long)]
        publisher: String,
    },
    /// Show an offer
    #[command(long_about = "Fetch a single offer. By default the latest version is returned.\n\n\
        Examples:\n\
        pub offers show -p contoso -o contoso-vm\n\
        pub offers show -p contoso -o contoso-vm --version 4\n\
        pub offers show -p contoso -o contoso-vm --slot preview")]
    Show {
        #[command(flatten)]
        target: OfferRef,
        /// Version of the offer to retrieve
        #[arg(long, conflicts_with = "slot")]
        version: Option<i64>,
        /// Slot to retrieve the offer from: draft, preview or production
        #[arg(long)]
        slot: Option<String>,
    },
    /// Show the publication status of an offer
    #[command(long_about = "Show the status of the latest publication of an offer, including\n\
        each step and any preview or live links.\n\n\
        Example:\n\
        pub offers status -p contoso -o contoso-vm")]
    Status {
        #[command(flatten)]
        target: OfferRef,
    },
    /// Publish an offer
    #[command(long_about = "Start publishing an offer. Prints the operation location, which can be\n\
        followed with `pub operations get -u LOCATION`.\n\n\
        Example:\n\
        pub offers publish -p contoso -o contoso-vm -e ops@contoso.com")]
    Publish {
        #[command(flatten)]
        target: OfferRef,
        /// Comma separated list of emails to notify when publication completes
        #[arg(short = 'e', long)]
        notification_emails: Option<String>,
    },
    /// Take an offer that finished preview live
    #[command(long_about = "Push a previewed offer to production.\n\n\
        Example:\n\
        pub offers live -p contoso -o contoso-vm -e ops@contoso.com")]
    Live {
        #[command(flatten)]
        target: OfferRef,
        /// Comma separated list of emails to notify when the offer is live
        #[arg(short = 'e', long)]
        notification_emails: Option<String>,
    },
    /// Create or update an offer from a JSON file
    #[command(long_about = "PUT an offer read from a JSON file. The publisher and offer are taken\n\
        from the file's `publisherId` and `id`.\n\n\
        --set overrides fields before the offer is sent. Paths are dot separated;\n\
        escape a literal dot with a backslash. Values that parse as JSON are used\n\
        as JSON, anything else as a string.\n\n\
        Examples:\n\
        pub offers put -f offer.json\n\
        pub offers put -f offer.json --set definition.displayText=\"Contoso VM\"\n\
        pub offers put -f offer.json --set 'definition.offer.microsoft-azure-marketplace\\.title=Contoso'\n\
        pub offers put -f offer.json --if-match '*'")]
    Put {
        /// File path to the JSON file containing the offer
        #[arg(short = 'f', long)]
        offer_file: PathBuf,
        /// Override a field: key.keypart=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Only save if the stored offer matches this entity tag (`*` for any)
        #[arg(long)]
        if_match: Option<String>,
    },
}

pub async fn handle(cmd: OffersCommand, client: &dyn PartnerService, printer: &dyn Printer) -> Result<()> {
    match cmd {
        OffersCommand::List { publisher } => {
            let offers = client.list_offers(&publisher).await?;
            emit(printer, &offers)
        }
        OffersCommand::Show {
            target,
            version,
            slot,
        } => {
            let offer = match (slot, version) {
                (Some(slot), _) => {
                    client
                        .get_offer_by_slot(&target.publisher, &target.offer, &slot)
                        .await?
                }
                (None, Some(version)) => {
                    client
                        .get_offer_by_version(&target.publisher, &target.offer, version)
                        .await?
                }
                (None, None) => client.get_offer(&target.publisher, &target.offer).await?,
            };
            emit(printer, &offer)
        }
        OffersCommand::Status { target } => {
            let status = client
                .get_offer_status(&target.publisher, &target.offer)
                .await?;
            emit(printer, &status)
        }
        OffersCommand::Publish {
            target,
            notification_emails,
        } => {
            let location = client
                .publish_offer(&target.publisher, &target.offer, notification_emails.as_deref())
                .await?;
            printer.print(&json!({ "operationLocation": location }))
        }
        OffersCommand::Live {
            target,
            notification_emails,
        } => {
            let location = client
                .go_live(&target.publisher, &target.offer, notification_emails.as_deref())
                .await?;
            printer.print(&json!({ "operationLocation": location }))
        }
        OffersCommand::Put {
            offer_file,
            set,
            if_match,
        } => {
            let bits = load_document(&offer_file, &set)?;
            let offer: Offer = serde_json::from_slice(&bits)?;
            let saved = client
                .put_offer(&offer, if_match.as_deref().map(Precondition::parse))
                .await?;
            emit(printer, &saved)
        }
    }
}

use crate::client::PartnerService;
use crate::commands::OfferRef;
use crate::error::Result;
use crate::output::{emit, Printer};
use clap::Subcommand;
use serde_json::json;

#[derive(Subcommand, Debug)]
pub enum OperationsCommand {
    /// List operations of an offer, optionally filtered by status
    #[command(long_about = "List the submissions of an offer.\n\n\
        Examples:\n\
        pub operations list -p contoso -o contoso-vm\n\
        pub operations list -p contoso -o contoso-vm -f running")]
    List {
        #[command(flatten)]
        target: OfferRef,
        /// Only show operations with this status; for example, running
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show a single operation of an offer
    #[command(long_about = "Show the steps and progress of one operation.\n\n\
        Example:\n\
        pub operations show -p contoso -o contoso-vm --op 5d8a0c6f-...")]
    Show {
        #[command(flatten)]
        target: OfferRef,
        /// Operation ID
        #[arg(long = "op", value_name = "OPERATION_ID")]
        operation_id: String,
    },
    /// Get an operation by the URI a long running call returned
    #[command(long_about = "Follow an operation location, like the one printed by\n\
        `pub offers publish` or `pub offers live`.\n\n\
        Example:\n\
        pub operations get -u /api/publishers/contoso/offers/contoso-vm/operations/5d8a0c6f-...")]
    Get {
        /// Operation URI, absolute or relative to the host
        #[arg(short = 'u', long)]
        operation_uri: String,
    },
    /// Cancel the active operation of an offer
    #[command(long_about = "Cancel whatever operation is currently running for an offer.\n\n\
        Example:\n\
        pub operations cancel -p contoso -o contoso-vm -e ops@contoso.com")]
    Cancel {
        #[command(flatten)]
        target: OfferRef,
        /// Comma separated list of emails to notify
        #[arg(short = 'e', long)]
        notification_emails: Option<String>,
    },
}

pub async fn handle(
    cmd: OperationsCommand,
    client: &dyn PartnerService,
    printer: &dyn Printer,
) -> Result<()> {
    match cmd {
        OperationsCommand::List { target, filter } => {
            let ops = client
                .list_operations(&target.publisher, &target.offer, filter.as_deref())
                .await?;
            emit(printer, &ops)
        }
        OperationsCommand::Show {
            target,
            operation_id,
        } => {
            let op = client
                .get_operation(&target.publisher, &target.offer, &operation_id)
                .await?;
            emit(printer, &op)
        }
        OperationsCommand::Get { operation_uri } => {
            let op = client.get_operation_by_uri(&operation_uri).await?;
            emit(printer, &op)
        }
        OperationsCommand::Cancel {
            target,
            notification_emails,
        } => {
            let location = client
                .cancel_operation(&target.publisher, &target.offer, notification_emails.as_deref())
                .await?;
            printer.print(&json!({ "operationLocation": location }))
        }
    }
}

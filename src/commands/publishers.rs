use crate::client::PartnerService;
use crate::error::Result;
use crate::output::{emit, Printer};
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum PublishersCommand {
    /// List the publishers the caller has access to
    #[command(long_about = "List every publisher visible to the authenticated identity.\n\n\
        Example:\n\
        pub publishers list")]
    List,
}

pub async fn handle(
    cmd: PublishersCommand,
    client: &dyn PartnerService,
    printer: &dyn Printer,
) -> Result<()> {
    match cmd {
        PublishersCommand::List => {
            let publishers = client.list_publishers().await?;
            emit(printer, &publishers)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::FakeService;
    use crate::output::testing::CapturePrinter;

    #[tokio::test]
    async fn test_list() {
        let svc = FakeService::default();
        let printer = CapturePrinter::default();
        handle(PublishersCommand::List, &svc, &printer).await.unwrap();
        assert_eq!(printer.printed()[0][0]["id"], "contoso");
    }
}

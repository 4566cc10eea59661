pub mod config_cmd;
pub mod offers;
pub mod operations;
pub mod publishers;
pub mod skus;
pub mod versions;

use crate::error::{CliError, Result};
use crate::patch;
use clap::Args;
use std::path::Path;

/// `-p PUBLISHER -o OFFER`
#[derive(Args, Debug, Clone)]
pub struct OfferRef {
    /// Publisher ID; for example, Contoso
    #[arg(short, long)]
    pub publisher: String,
    /// String that uniquely identifies the offer
    #[arg(short, long)]
    pub offer: String,
}

/// `-p PUBLISHER -o OFFER -s SKU`
#[derive(Args, Debug, Clone)]
pub struct PlanRef {
    #[command(flatten)]
    pub offer: OfferRef,
    /// String that uniquely identifies the SKU (plan ID)
    #[arg(short, long)]
    pub sku: String,
}

/// Read a JSON document from disk and apply `--set` overrides to it.
pub fn load_document(path: &Path, overrides: &[String]) -> Result<Vec<u8>> {
    let bits = std::fs::read(path).map_err(|e| {
        CliError::InvalidInput(format!("Failed to read file {}: {e}", path.display()))
    })?;
    patch::merge(&bits, overrides)
}

#[cfg(test)]
pub mod testing {
    use crate::client::PartnerService;
    use crate::error::{CliError, Result};
    use crate::middleware::Precondition;
    use crate::model::{Offer, OfferStatus, Operation, OperationDetail, Publisher};
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub const VM_OFFER: &str = include_str!("../../tests/fixtures/vm_offer.json");
    pub const CORE_VM_OFFER: &str = include_str!("../../tests/fixtures/corevm_offer.json");

    /// In-memory portal holding a single offer.
    #[derive(Default)]
    pub struct FakeService {
        pub offer: Mutex<Option<Offer>>,
        pub puts: Mutex<Vec<(Offer, Option<Precondition>)>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeService {
        pub fn with_offer(json: &str) -> Self {
            let svc = Self::default();
            *svc.offer.lock().unwrap() = Some(serde_json::from_str(json).unwrap());
            svc
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn puts(&self) -> Vec<(Offer, Option<Precondition>)> {
            self.puts.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn current(&self, publisher_id: &str, offer_id: &str) -> Result<Offer> {
            self.offer
                .lock()
                .unwrap()
                .clone()
                .filter(|o| o.publisher_id == publisher_id && o.id == offer_id)
                .ok_or_else(|| CliError::Remote {
                    uri: format!("api/publishers/{publisher_id}/offers/{offer_id}"),
                    status: 404,
                    body: "not found".into(),
                })
        }
    }

    #[async_trait]
    impl PartnerService for FakeService {
        async fn list_offers(&self, publisher_id: &str) -> Result<Vec<Offer>> {
            self.record(format!("list_offers {publisher_id}"));
            Ok(self.offer.lock().unwrap().clone().into_iter().collect())
        }

        async fn get_offer(&self, publisher_id: &str, offer_id: &str) -> Result<Offer> {
            self.record(format!("get_offer {publisher_id} {offer_id}"));
            self.current(publisher_id, offer_id)
        }

        async fn get_offer_by_version(
            &self,
            publisher_id: &str,
            offer_id: &str,
            version: i64,
        ) -> Result<Offer> {
            self.record(format!("get_offer_by_version {publisher_id} {offer_id} {version}"));
            self.current(publisher_id, offer_id)
        }

        async fn get_offer_by_slot(
            &self,
            publisher_id: &str,
            offer_id: &str,
            slot: &str,
        ) -> Result<Offer> {
            self.record(format!("get_offer_by_slot {publisher_id} {offer_id} {slot}"));
            self.current(publisher_id, offer_id)
        }

        async fn get_offer_status(&self, publisher_id: &str, offer_id: &str) -> Result<OfferStatus> {
            self.record(format!("get_offer_status {publisher_id} {offer_id}"));
            Ok(OfferStatus {
                status: Some("running".into()),
                ..Default::default()
            })
        }

        async fn put_offer(&self, offer: &Offer, precondition: Option<Precondition>) -> Result<Offer> {
            self.record(format!("put_offer {} {}", offer.publisher_id, offer.id));
            self.puts.lock().unwrap().push((offer.clone(), precondition));
            *self.offer.lock().unwrap() = Some(offer.clone());
            Ok(offer.clone())
        }

        async fn publish_offer(
            &self,
            publisher_id: &str,
            offer_id: &str,
            notification_emails: Option<&str>,
        ) -> Result<Option<String>> {
            self.record(format!(
                "publish_offer {publisher_id} {offer_id} {}",
                notification_emails.unwrap_or("-")
            ));
            Ok(Some(format!("/api/publishers/{publisher_id}/offers/{offer_id}/operations/publish-1")))
        }

        async fn go_live(
            &self,
            publisher_id: &str,
            offer_id: &str,
            notification_emails: Option<&str>,
        ) -> Result<Option<String>> {
            self.record(format!(
                "go_live {publisher_id} {offer_id} {}",
                notification_emails.unwrap_or("-")
            ));
            Ok(Some(format!("/api/publishers/{publisher_id}/offers/{offer_id}/operations/live-1")))
        }

        async fn cancel_operation(
            &self,
            publisher_id: &str,
            offer_id: &str,
            notification_emails: Option<&str>,
        ) -> Result<Option<String>> {
            self.record(format!(
                "cancel_operation {publisher_id} {offer_id} {}",
                notification_emails.unwrap_or("-")
            ));
            Ok(None)
        }

        async fn list_operations(
            &self,
            publisher_id: &str,
            offer_id: &str,
            filtered_status: Option<&str>,
        ) -> Result<Vec<Operation>> {
            self.record(format!(
                "list_operations {publisher_id} {offer_id} {}",
                filtered_status.unwrap_or("-")
            ));
            Ok(vec![Operation {
                id: "op-1".into(),
                submission_state: Some("running".into()),
                ..Default::default()
            }])
        }

        async fn get_operation(
            &self,
            publisher_id: &str,
            offer_id: &str,
            operation_id: &str,
        ) -> Result<OperationDetail> {
            self.record(format!("get_operation {publisher_id} {offer_id} {operation_id}"));
            Ok(OperationDetail {
                status: Some("running".into()),
                ..Default::default()
            })
        }

        async fn get_operation_by_uri(&self, uri: &str) -> Result<OperationDetail> {
            self.record(format!("get_operation_by_uri {uri}"));
            Ok(OperationDetail {
                status: Some("succeeded".into()),
                ..Default::default()
            })
        }

        async fn list_publishers(&self) -> Result<Vec<Publisher>> {
            self.record("list_publishers".into());
            Ok(vec![Publisher {
                id: "contoso".into(),
                ..Default::default()
            }])
        }
    }
}

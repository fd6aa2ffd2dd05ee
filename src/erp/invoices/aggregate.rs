use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::erp::invoices::model::{Client, ClientMap, Invoice};

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Rows rejected for bad or missing critical data.
    pub rejected_rows: usize,
    /// Rows dropped because their (client, invoice) pair was already registered.
    pub duplicate_skips: usize,
    pub invoices_registered: usize,
    pub clients_registered: usize,
}

/// What [`InvoiceAggregator::ingest`] did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    NewClient,
    NewInvoice,
    Duplicate,
}

/// Folds accepted invoices into a client-keyed map, keeping first-seen order
/// and dropping repeated invoice identifiers within a client.
#[derive(Debug, Default)]
pub struct InvoiceAggregator {
    clients: ClientMap,
    seen: HashSet<(String, String)>,
    stats: RunStats,
}

impl InvoiceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `invoice` under `client_id`. The display name is only used
    /// when the client is new. Duplicates are compared by invoice id alone and
    /// never replace the stored invoice.
    pub fn ingest(&mut self, client_id: &str, display_name: &str, invoice: Invoice) -> IngestOutcome {
        let key = (client_id.to_string(), invoice.id().to_string());
        if self.seen.contains(&key) {
            debug!(
                client_id,
                invoice_id = invoice.id(),
                "invoice already registered for client, skipping"
            );
            self.stats.duplicate_skips += 1;
            return IngestOutcome::Duplicate;
        }

        let outcome = match self.clients.get_mut(client_id) {
            Some(client) => {
                client.push_invoice(invoice);
                IngestOutcome::NewInvoice
            }
            None => {
                let mut client = Client::new(client_id, display_name);
                client.push_invoice(invoice);
                self.clients.insert(client);
                self.stats.clients_registered += 1;
                IngestOutcome::NewClient
            }
        };
        self.seen.insert(key);
        self.stats.invoices_registered += 1;
        outcome
    }

    /// Counts a row that never reached the aggregate.
    pub fn record_rejection(&mut self) {
        self.stats.rejected_rows += 1;
    }

    pub fn clients(&self) -> &ClientMap {
        &self.clients
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn finish(self) -> (ClientMap, RunStats) {
        (self.clients, self.stats)
    }
}

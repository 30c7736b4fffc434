//! One full reconciliation pass over the order book contract.
//!
//! The pass computes `[from_block, head]` once and sweeps it three times, one
//! sweep per known log encoding. Each sweep is chunked; every decoded event
//! is normalized and submitted to the order store gateway.

use crate::gateway::OrderGateway;
use crate::provider::{select_endpoint, ChainReader, EndpointProbe};
use crate::scanner::{BlockRange, ChunkedScanner};
use alloy_primitives::Address;
use market_core::types::EventCategory;
use market_core::wire::OrderSubmission;
use market_core::{Result, SyncConfig};
use market_processor::{normalize_log, SchemaVariant};
use std::fmt;
use tracing::{info, warn};

/// Where a reconciliation pass currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    SelectingEndpoint,
    DeterminingRange,
    Scanning(SchemaVariant),
    Done,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectingEndpoint => f.write_str("selecting-endpoint"),
            Self::DeterminingRange => f.write_str("determining-range"),
            Self::Scanning(variant) => write!(f, "scanning {}", variant.name()),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Accepted submissions per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncTotals {
    pub fulfilled: u64,
    pub cancelled: u64,
}

/// Summary of a finished pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Swept range, `None` when the start block is past the head
    pub range: Option<BlockRange>,
    pub totals: SyncTotals,
    /// Submissions the gateway did not accept
    pub rejected: u64,
    /// Logs that matched a filter but failed to decode
    pub undecodable: u64,
    /// Chunks whose log query failed
    pub skipped_chunks: Vec<(SchemaVariant, BlockRange)>,
}

#[derive(Debug, Default, Clone, Copy)]
struct ChunkTally {
    accepted: u64,
    rejected: u64,
    undecodable: u64,
}

/// Drives a reconciliation pass against one chain endpoint
pub struct Reconciler<R, G> {
    reader: R,
    gateway: G,
    seaport_contract: Address,
    nft_contract: String,
    marketplace_contract: String,
    from_block: u64,
    scanner: ChunkedScanner,
    endpoint: Option<String>,
    phase: SyncPhase,
}

impl<R: ChainReader, G: OrderGateway> Reconciler<R, G> {
    /// Select the first live RPC endpoint from the configured candidates and
    /// build a reconciler reading from it. Failing to find one is fatal.
    pub async fn connect<P>(config: &SyncConfig, probe: &P, gateway: G) -> Result<Self>
    where
        P: EndpointProbe<Client = R>,
    {
        info!(phase = %SyncPhase::SelectingEndpoint, "Sync phase");
        let selected = select_endpoint(probe, &config.rpc_candidates()).await?;

        let mut reconciler = Self::new(config, selected.client, gateway);
        reconciler.endpoint = Some(selected.url);
        Ok(reconciler)
    }

    /// Build from a reader that is already connected to a live endpoint
    pub fn new(config: &SyncConfig, reader: R, gateway: G) -> Self {
        Self {
            reader,
            gateway,
            seaport_contract: config.seaport_contract,
            nft_contract: format!("{:#x}", config.nft_contract),
            marketplace_contract: format!("{:#x}", config.seaport_contract),
            from_block: config.from_block,
            scanner: ChunkedScanner::new(config.chunk_size),
            endpoint: None,
            phase: SyncPhase::SelectingEndpoint,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// URL of the endpoint chosen by [`Reconciler::connect`]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn enter(&mut self, phase: SyncPhase) {
        info!(phase = %phase, "Sync phase");
        self.phase = phase;
    }

    /// Run the pass. Only a failure to read the head block is an error;
    /// failed chunks and rejected submissions are counted in the report.
    pub async fn run(&mut self) -> Result<SyncReport> {
        self.enter(SyncPhase::DeterminingRange);
        let head = self.reader.latest_block().await?;

        let mut report = SyncReport::default();
        if self.from_block > head {
            warn!(from = self.from_block, head = head, "Start block is past the chain head, nothing to scan");
            self.enter(SyncPhase::Done);
            return Ok(report);
        }

        let range = BlockRange::new(self.from_block, head);
        report.range = Some(range);
        info!(
            from = range.from,
            to = range.to,
            chunk_size = self.scanner.width(),
            "Scanning order events"
        );

        for variant in SchemaVariant::ALL {
            self.enter(SyncPhase::Scanning(variant));

            let scanner = self.scanner;
            let this = &*self;
            let scan = scanner
                .scan(range.from, range.to, |chunk| this.process_chunk(variant, chunk))
                .await;

            for tally in scan.fetched() {
                match category_of(variant) {
                    EventCategory::Fulfilled => report.totals.fulfilled += tally.accepted,
                    EventCategory::Cancelled => report.totals.cancelled += tally.accepted,
                }
                report.rejected += tally.rejected;
                report.undecodable += tally.undecodable;
            }
            report
                .skipped_chunks
                .extend(scan.skipped().into_iter().map(|chunk| (variant, chunk)));

            info!(
                event = variant.name(),
                chunks = scan.chunk_count(),
                skipped = scan.skipped().len(),
                "Event sweep finished"
            );
        }

        self.enter(SyncPhase::Done);
        info!(
            fulfilled = report.totals.fulfilled,
            cancelled = report.totals.cancelled,
            rejected = report.rejected,
            undecodable = report.undecodable,
            skipped_chunks = report.skipped_chunks.len(),
            "Reconciliation complete"
        );
        Ok(report)
    }

    async fn process_chunk(&self, variant: SchemaVariant, chunk: BlockRange) -> Result<ChunkTally> {
        let logs = self
            .reader
            .logs(self.seaport_contract, variant.signature_hash(), chunk)
            .await?;

        let mut tally = ChunkTally::default();
        for log in &logs {
            let event = match normalize_log(log) {
                Ok(event) => event,
                Err(e) => {
                    warn!(event = variant.name(), block = ?log.block_number, error = %e, "Skipping undecodable log");
                    tally.undecodable += 1;
                    continue;
                }
            };

            let submission =
                OrderSubmission::from_event(&event, &self.nft_contract, &self.marketplace_contract);
            if self.gateway.submit(&submission).await {
                tally.accepted += 1;
            } else {
                tally.rejected += 1;
            }
        }

        Ok(tally)
    }
}

fn category_of(variant: SchemaVariant) -> EventCategory {
    match variant {
        SchemaVariant::FulfilledPrimary | SchemaVariant::FulfilledAlt => EventCategory::Fulfilled,
        SchemaVariant::Cancelled => EventCategory::Cancelled,
    }
}

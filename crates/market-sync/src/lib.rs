mod gateway;
mod provider;
mod reconcile;
mod scanner;

pub use gateway::{HttpOrderGateway, OrderGateway};
pub use provider::{
    select_endpoint, BoxedProvider, ChainReader, EndpointProbe, HttpProbe, ProviderManager,
    SelectedEndpoint,
};
pub use reconcile::{Reconciler, SyncPhase, SyncReport, SyncTotals};
pub use scanner::{BlockRange, ChunkOutcome, ChunkRanges, ChunkedScanner, ScanReport};

mod orders;

pub use orders::MemoryOrderStore;

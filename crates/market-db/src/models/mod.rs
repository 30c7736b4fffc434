mod order;

pub use order::DbOrder;

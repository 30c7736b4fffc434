//! Seaport marketplace events.
//!
//! The marketplace contract has emitted `OrderFulfilled` under two different
//! encodings over its lifetime. Each encoding hashes to a different topic0, so
//! they are declared in separate modules and queried separately.

use alloy_sol_types::sol;

pub mod primary {
    use super::sol;

    sol! {
        /// Fulfillment with the consideration details packed into opaque bytes
        #[derive(Debug)]
        event OrderFulfilled(
            bytes32 indexed orderHash,
            address indexed offerer,
            address indexed fulfiller,
            bytes orderDetails
        );
    }
}

pub mod alt {
    use super::sol;

    sol! {
        /// Fulfillment exposing the payment amount and the traded token ids
        #[derive(Debug)]
        event OrderFulfilled(
            bytes32 indexed orderHash,
            address indexed offerer,
            address indexed fulfiller,
            address recipient,
            address paymentToken,
            uint256 amount,
            uint256[] tokenIds
        );
    }
}

sol! {
    /// Emitted when an offerer cancels an order
    #[derive(Debug)]
    event OrderCancelled(
        bytes32 indexed orderHash,
        address indexed offerer
    );
}

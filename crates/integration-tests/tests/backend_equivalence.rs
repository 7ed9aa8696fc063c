//! Runs the shared storage scenarios against every backend.

use bazaar_integration_tests::{Backend, scenarios};

macro_rules! on_every_backend {
    ($($scenario:ident),* $(,)?) => {
        $(
            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn $scenario() {
                for backend in Backend::ALL {
                    let storage = backend.storage().await;
                    scenarios::$scenario(&storage).await;
                }
            }
        )*
    };
}

on_every_backend!(
    id_assignment,
    not_found_conditions,
    email_uniqueness,
    cart_aggregation,
    cart_subtotal,
    empty_checkout,
    concurrent_checkout_conserves_items,
    quantity_overflow,
);

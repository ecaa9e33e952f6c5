//! `nestegg-store` — durable, append-only transaction storage.
//!
//! The [`LedgerStore`] trait is the persistence seam: a Postgres-backed
//! implementation for production and an in-memory one for dev mode and
//! tests. Appends are atomic per call; reads only ever observe committed
//! rows. Nothing here mutates or deletes a transaction.

pub mod error;
pub mod memory;
pub mod postgres;
mod store;

pub use error::StoreError;
pub use memory::MemLedgerStore;
pub use postgres::PgLedgerStore;
pub use store::LedgerStore;

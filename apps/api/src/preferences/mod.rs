// Dashboard preferences: which cards a user sees on a machine, and where they
// arranged them. Persistence only; layout computation lives in `layout`.

pub mod handlers;
pub mod store;

pub use store::{PgPreferenceStore, PreferenceStore, PreferenceUpdate, StoreError};

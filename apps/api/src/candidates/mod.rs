// Candidate records: the persisted model, the flat-file store and its CRUD routes.
// The query pipeline reads this store once at startup; writes never touch the live index.

pub mod handlers;
pub mod models;
pub mod store;

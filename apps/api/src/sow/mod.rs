// Statement of Work endpoints. A SOW here is an ephemeral identifier plus the
// echoed selection; nothing is persisted.

pub mod handlers;

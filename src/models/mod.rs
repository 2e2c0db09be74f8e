// Models module
// Response shapes for the REST API

pub mod envelope;
pub mod row;

pub use envelope::Envelope;
pub use row::Row;

// Job lookup: title search, display-only title listing, salary averages,
// and appending edited copies of postings.

pub mod handlers;
pub mod lookup;
pub mod salary;

mod conversation;
mod query;
mod response;
mod retrieval;

pub use conversation::*;
pub use query::*;
pub use response::*;
pub use retrieval::*;

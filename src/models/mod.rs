pub mod clinical_record;
pub mod enums;
pub mod link_request;
pub mod user;

pub use clinical_record::*;
pub use enums::*;
pub use link_request::*;
pub use user::*;

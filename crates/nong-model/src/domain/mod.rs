mod id;
pub use id::{PartnerId, RegistrantId};

mod constants;
pub use constants::MAX_SLOTS;

mod domain;
pub use domain::{MAX_SLOTS, PartnerId, RegistrantId};

mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::{Preference, Quota};

mod registrant;
pub use registrant::{Registrant, SlotCounts};

mod snapshot;
pub use snapshot::QuotaSnapshot;

mod preference;
pub use preference::Preference;

mod quota;
pub use quota::Quota;

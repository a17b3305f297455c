use std::sync::atomic::{AtomicU64, Ordering};

static TASK_SEQ: AtomicU64 = AtomicU64::new(1);

/// Task id for queue logs and events: `{kind}-{subject}-{seq:x}`.
///
/// `seq` is a process-wide hex counter, so ids never repeat within one
/// process even for the same registrant.
pub fn make_task_id(kind: &str, subject: &str) -> String {
    let seq = TASK_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{kind}-{subject}-{seq:x}")
}

#[cfg(test)]
mod tests {
    use super::make_task_id;

    #[test]
    fn ids_are_unique_and_prefixed() {
        let a = make_task_id("quota", "s-1");
        let b = make_task_id("quota", "s-1");

        assert_ne!(a, b);
        assert!(a.starts_with("quota-s-1-"));
        let seq = a.rsplit('-').next().unwrap();
        assert!(u64::from_str_radix(seq, 16).is_ok());
    }
}

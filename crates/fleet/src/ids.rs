//! Random backend id generation.

use rand::distr::Alphanumeric;
use rand::Rng;

use ringcore::BackendId;

/// Generate a fresh random `BackendId` with enough entropy (8 alphanumeric
/// characters, ~47 bits) that name collisions against the live fleet are
/// negligible.
pub fn random_backend_id() -> BackendId {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    BackendId::new(format!("Server_{suffix}")).expect("generated id is never empty")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_distinct_ids() {
        let a = random_backend_id();
        let b = random_backend_id();
        assert_ne!(a, b);
    }

    #[test]
    fn has_expected_prefix_and_length() {
        let id = random_backend_id();
        let s = id.as_str();
        assert!(s.starts_with("Server_"));
        assert_eq!(s.len(), "Server_".len() + 8);
    }
}

use uuid::Uuid;

/// Time-ordered ids keep insertion order roughly equal to sort order.
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_parseable() {
        let a = new_uuid_v7();
        let b = new_uuid_v7();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn ids_sort_by_creation() {
        let a = new_uuid_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_uuid_v7();
        assert!(a < b);
    }
}

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC
///   - 12 bits: random
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF;
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000);
    (ts << 12) | rand_bits
}

/// Order identifiers are UUID v4 strings; customers see the first 8 chars.
pub fn new_order_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Short customer-facing reference for an order id (`"3f2a9c1b"` → `"3F2A9C1B"`).
pub fn order_reference(order_id: &str) -> String {
    order_id.chars().take(8).collect::<String>().to_uppercase()
}

/// Normalise a promo code as it is stored and compared.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_ids_are_positive_and_ordered() {
        let a = snowflake_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = snowflake_id();
        assert!(a > 0);
        assert!(b > a);
    }

    #[test]
    fn order_reference_is_upper_prefix() {
        assert_eq!(order_reference("3f2a9c1b-aaaa-bbbb"), "3F2A9C1B");
        assert_eq!(order_reference("abc"), "ABC");
    }

    #[test]
    fn promo_codes_are_trimmed_and_uppercased() {
        assert_eq!(normalize_code("  bienvenue10 "), "BIENVENUE10");
    }
}

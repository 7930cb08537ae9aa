/*!
 * Utility functions for xmindctl
 */

use chrono::Utc;
use uuid::Uuid;

/// Length of generated element ids, matching what XMind itself emits
const ID_LEN: usize = 26;

/// Generate a fresh element id for sheets and topics
pub fn new_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// Current time in milliseconds since the epoch, as written in package entries
pub fn timestamp_millis() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Two spaces per nesting level
pub fn indent(level: usize) -> String {
    "  ".repeat(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_shape() {
        let a = new_id();
        let b = new_id();
        assert_eq!(a.len(), ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(3), "      ");
    }
}

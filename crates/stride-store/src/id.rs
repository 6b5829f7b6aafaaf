use uuid::Uuid;

/// Hex characters kept from a v4 UUID
const ID_HEX_LEN: usize = 12;

fn prefixed(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &hex[..ID_HEX_LEN])
}

/// `conv_` followed by 12 hex characters
pub fn new_conversation_id() -> String {
    prefixed("conv")
}

/// `msg_` followed by 12 hex characters
pub fn new_message_id() -> String {
    prefixed("msg")
}

/// Nonce attached to every RPC command so its response can be matched.
pub fn new_nonce() -> String {
    uuid::Uuid::new_v4().to_string()
}

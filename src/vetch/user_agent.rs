/// Fixed identifier at the start of every user-agent.
pub const SDK_IDENTIFIER: &str = concat!("vonage-server-sdk-rust/", env!("CARGO_PKG_VERSION"));

/// Version of the compiler the crate was built with.
pub const RUNTIME_VERSION: &str = env!("VETCH_RUSTC_VERSION");

/// Composes `<sdk> rust/<version>[ <suffix>]`.
pub fn user_agent(append: Option<&str>) -> String {
    let mut agent = format!("{} rust/{}", SDK_IDENTIFIER, RUNTIME_VERSION);
    if let Some(suffix) = append.filter(|s| !s.is_empty()) {
        agent.push(' ');
        agent.push_str(suffix);
    }
    agent
}

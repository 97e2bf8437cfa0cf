/// Review window
///
/// - Panel widgets and key translation (viewer.rs)
/// - The channel bridge between the window and the review loop (bridge.rs)

pub mod bridge;
pub mod viewer;

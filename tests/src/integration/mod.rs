//! Integration scenarios spanning session, realtime and view crates.

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod live_views;
#[cfg(test)]
mod session_lifecycle;

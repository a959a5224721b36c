// ── Reactive fetch state ──
//
// Latest-value storage with push-based change notification. Each feed is a
// `watch` channel plus a request sequencer so late responses can't clobber
// newer data.

mod feed;
mod fetch_state;

pub use feed::Feed;
pub use fetch_state::FetchState;

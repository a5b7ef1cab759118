// ── User commands ─────────────────────────────────────────────────────────────
//
// Host-side commands that turn a user action into a request against the
// document directory.  No widgets here; the host collects the inputs.

pub mod new_document;

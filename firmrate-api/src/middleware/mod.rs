/// HTTP middleware
///
/// - `headers`: security and no-store cache headers on every response

pub mod headers;

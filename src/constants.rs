// -
// Annotation protocol
//
// These keys are the contract with object authors. Changing them breaks
// every annotated object already in the upstream store.

/// Expiration date annotation, value format `YYYY-MM-DD`.
pub const ANNOTATION_EXPIRES_AT: &str = "vigil.dev/expires-at";

/// Optional warning lead time annotation, value format `<int>d` or any
/// duration the humantime grammar accepts (e.g. `24h30m`).
pub const ANNOTATION_WARN_BEFORE: &str = "vigil.dev/warn-before";

/// Lead time applied when `vigil.dev/warn-before` is absent or unparsable.
pub(crate) const DEFAULT_WARN_DAYS: i64 = 7;

/// Date format accepted by the expires-at annotation.
pub(crate) const EXPIRES_AT_FORMAT: &str = "%Y-%m-%d";

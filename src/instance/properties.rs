//! Descriptive, informational-only instance properties.

/// Release information reported for an endpoint at registration time.
///
/// A value copy: the engine never mutates it, and changing the source after
/// construction does not affect an existing instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    /// Machine-readable release identifier (e.g. `"ubuntu"`).
    pub release_id: String,
    /// Release version (e.g. `"24.04"`).
    pub version_id: String,
    /// Human-readable release name.
    pub pretty_name: String,
    /// Whether the endpoint already holds an active Pro subscription.
    pub pro_attached: bool,
}

/// Marker left in the stock page markup until a real form backend is wired up.
pub const PLACEHOLDER_MARKER: &str = "your-id";

/// Where a form's submissions go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Nothing real is configured; submissions are kept locally.
    Demo,
    Remote(String),
}

impl Endpoint {
    /// The form's data endpoint wins over its native action. Blank values and
    /// placeholder URLs fall back to demo storage.
    pub fn resolve(data_endpoint: Option<&str>, action: Option<&str>) -> Self {
        let target = [data_endpoint, action]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|target| !target.is_empty());

        match target {
            Some(target) if !target.contains(PLACEHOLDER_MARKER) => Self::Remote(target.to_owned()),
            _ => Self::Demo,
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Demo)
    }
}

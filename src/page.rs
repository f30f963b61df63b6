use reqwest::Url;

/// What the handler needs to know about the page the form lives on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageContext {
    debug: bool,
}

impl PageContext {
    /// Debug mode is on only when the first `debug` query value is exactly `1`.
    pub fn from_url(url: &str) -> Self {
        let debug = Url::parse(url)
            .ok()
            .and_then(|url| {
                url.query_pairs()
                    .find(|(name, _)| name == "debug")
                    .map(|(_, value)| value == "1")
            })
            .unwrap_or(false);

        Self { debug }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}

//! Static table of retrieval backends.

/// Variant family a backend belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Renders the page headlessly and dumps the resulting DOM.
    HeadlessBrowser,
    /// Dumps a rendered plain-text view of the page.
    TextBrowser,
    /// Issues the request directly and returns the body as served.
    DirectProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub display_name: &'static str,
    pub kind: BackendKind,
    /// Candidate executables, probed in order. Empty for the built-in client.
    pub executables: &'static [&'static str],
    /// Fixed flags placed before the URL.
    pub args: &'static [&'static str],
    /// Flag prefix that receives the script budget in milliseconds.
    pub script_budget_flag: Option<&'static str>,
    pub renders_js: bool,
}

impl BackendDescriptor {
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    }

    /// True when the backend needs no executable on the search path.
    pub fn is_builtin(&self) -> bool {
        self.executables.is_empty()
    }
}

pub const DESCRIPTORS: &[BackendDescriptor] = &[
    BackendDescriptor {
        name: "chrome",
        aliases: &["chromium"],
        display_name: "Chrome/Chromium",
        kind: BackendKind::HeadlessBrowser,
        executables: &["google-chrome", "chromium", "chromium-browser"],
        args: &[
            "--headless",
            "--disable-gpu",
            "--no-sandbox",
            "--enable-automation",
        ],
        script_budget_flag: Some("--virtual-time-budget="),
        renders_js: true,
    },
    BackendDescriptor {
        name: "firefox",
        aliases: &[],
        display_name: "Firefox",
        kind: BackendKind::HeadlessBrowser,
        executables: &["firefox"],
        args: &["--headless", "--enable-automation", "--wait-for-browser"],
        script_budget_flag: None,
        renders_js: true,
    },
    BackendDescriptor {
        name: "links",
        aliases: &[],
        display_name: "Links",
        kind: BackendKind::TextBrowser,
        executables: &["links"],
        args: &["-dump"],
        script_budget_flag: None,
        renders_js: false,
    },
    BackendDescriptor {
        name: "lynx",
        aliases: &[],
        display_name: "Lynx",
        kind: BackendKind::TextBrowser,
        executables: &["lynx"],
        args: &["-dump", "-nolist"],
        script_budget_flag: None,
        renders_js: false,
    },
    BackendDescriptor {
        name: "w3m",
        aliases: &[],
        display_name: "W3m",
        kind: BackendKind::TextBrowser,
        executables: &["w3m"],
        args: &["-dump"],
        script_budget_flag: None,
        renders_js: false,
    },
    BackendDescriptor {
        name: "curl",
        aliases: &[],
        display_name: "Curl",
        kind: BackendKind::DirectProtocol,
        executables: &["curl"],
        args: &["-L", "-s"],
        script_budget_flag: None,
        renders_js: false,
    },
    BackendDescriptor {
        name: "http",
        aliases: &["native"],
        display_name: "HTTP",
        kind: BackendKind::DirectProtocol,
        executables: &[],
        args: &[],
        script_budget_flag: None,
        renders_js: false,
    },
];

/// Default resolution order: script-rendering browsers first, curl last.
pub const DEFAULT_PRIORITY: &[&str] = &["chrome", "firefox", "curl"];

/// Flag that makes headless browsers print the rendered DOM.
pub(crate) const DUMP_DOM_FLAG: &str = "--dump-dom";

pub fn lookup(name: &str) -> Option<&'static BackendDescriptor> {
    let name = name.trim();
    DESCRIPTORS.iter().find(|descriptor| descriptor.matches(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_same_descriptor() {
        assert_eq!(lookup("chromium").map(|d| d.name), Some("chrome"));
        assert_eq!(lookup("Chrome").map(|d| d.name), Some("chrome"));
        assert_eq!(lookup(" curl ").map(|d| d.name), Some("curl"));
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(lookup("netscape").is_none());
    }

    #[test]
    fn default_priority_names_exist() {
        for name in DEFAULT_PRIORITY {
            assert!(lookup(name).is_some(), "{name} missing from registry");
        }
        assert!(lookup(DEFAULT_PRIORITY[0]).unwrap().renders_js);
        assert_eq!(
            lookup(DEFAULT_PRIORITY[DEFAULT_PRIORITY.len() - 1]).unwrap().kind,
            BackendKind::DirectProtocol
        );
    }

    #[test]
    fn only_native_client_is_builtin() {
        let builtin: Vec<_> = DESCRIPTORS
            .iter()
            .filter(|d| d.is_builtin())
            .map(|d| d.name)
            .collect();
        assert_eq!(builtin, vec!["http"]);
    }
}

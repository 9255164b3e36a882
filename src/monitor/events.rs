use serde::{Deserialize, Serialize};

/// One conceptual stream of browser-level change signals, as forwarded
/// by the page-side shim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigationEvent {
    InitialLoad {
        url: String,
    },
    RouteChange {
        url: String,
    },
    HistoryPush {
        url: String,
    },
    HistoryReplace {
        url: String,
    },
    PopState {
        url: String,
    },
    LinkClick {
        href: String,
        #[serde(default)]
        page_url: Option<String>,
    },
    FormSubmit {
        #[serde(default)]
        fields: Vec<FormField>,
    },
    LiveInput {
        value: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    pub value: String,
}

/// Replies to the shim. `Cancel` suppresses the default action of the
/// event being answered; `Redirect` is a standalone replace-navigation
/// (debounced checks answer out of band).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Cancel { redirect: String },
    Redirect { url: String },
    Warn { keyword: String },
}

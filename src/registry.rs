//! Static table of the KLS operations and the HTTP method/path each one uses.

use crate::error::{KlsError, KlsResult};
use reqwest::Method;
use std::fmt;
use std::str::FromStr;

/// HTTP method and path an operation is sent to by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub method: Method,
    pub path: &'static str,
}

impl ActionSpec {
    /// Whether user parameters travel in the query string rather than the body.
    pub fn params_in_query(&self) -> bool {
        self.method == Method::GET
    }
}

macro_rules! registry {
    ($($action:ident => $method:ident $path:literal,)+) => {
        /// Operations exposed by the KLS API.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Action {
            $($action,)+
        }

        const ACTION_COUNT: usize = [$(stringify!($action)),+].len();

        /// Wire name and default route, indexed by `Action` discriminant.
        static REGISTRY: [(&str, ActionSpec); ACTION_COUNT] = [
            $((stringify!($action), ActionSpec { method: Method::$method, path: $path }),)+
        ];

        impl Action {
            pub const ALL: [Action; ACTION_COUNT] = [$(Action::$action),+];
        }
    };
}

registry! {
    ListRealtimeStreamsInfo => POST "/api/ListRealtimeStreamsInfo/2017-01-01",
    ListRealtimePubStreamsInfo => GET "/",
    ListHistoryPubStreamsInfo => GET "/",
    ListHistoryPubStreamsErrInfo => GET "/",
    GetBlacklist => GET "/",
    ListStreamDurations => GET "/",
    CheckBlacklist => GET "/",
    ListRecordingTasks => GET "/",
    ListHistoryRecordTasks => GET "/",
    GetRecordTask => GET "/",
    ForbidStream => POST "/",
    ResumeStream => POST "/api/ResumeStream/2017-01-01",
    CreateRecordTask => POST "/",
    CancelRecordTask => POST "/",
    StartStreamRecord => POST "/",
    StopStreamRecord => POST "/",
}

impl Action {
    /// Wire name sent as the `Action` query parameter.
    pub fn as_str(&self) -> &'static str {
        REGISTRY[*self as usize].0
    }

    /// Default method and path for this operation.
    pub fn spec(&self) -> ActionSpec {
        REGISTRY[*self as usize].1.clone()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Action {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for Action {
    type Err = KlsError;

    fn from_str(name: &str) -> KlsResult<Self> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == name)
            .ok_or_else(|| KlsError::InvalidAction(format!("unregistered action \"{}\"", name)))
    }
}

/// Resolve an operation name to its default method and path.
pub fn lookup(action: &str) -> KlsResult<ActionSpec> {
    action.parse::<Action>().map(|action| action.spec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_action_resolves() {
        for action in Action::ALL {
            let spec = lookup(action.as_str()).expect("registered action");
            assert_eq!(spec, action.spec());
            assert!(spec.path.starts_with('/'));
        }
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<&str> = Action::ALL.iter().map(Action::as_str).collect();
        assert_eq!(names.len(), Action::ALL.len());
    }

    #[test]
    fn unknown_action_is_rejected() {
        match lookup("DeleteEverything") {
            Err(KlsError::InvalidAction(msg)) => assert!(msg.contains("DeleteEverything")),
            other => panic!("expected InvalidAction, got {:?}", other),
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(lookup("getblacklist").is_err());
        assert!(lookup("").is_err());
    }

    #[test]
    fn legacy_api_paths() {
        assert_eq!(
            lookup("ListRealtimeStreamsInfo").unwrap(),
            ActionSpec {
                method: Method::POST,
                path: "/api/ListRealtimeStreamsInfo/2017-01-01"
            }
        );
        assert_eq!(
            lookup("ResumeStream").unwrap().path,
            "/api/ResumeStream/2017-01-01"
        );
        assert_eq!(
            lookup("ForbidStream").unwrap(),
            ActionSpec {
                method: Method::POST,
                path: "/"
            }
        );
    }

    #[test]
    fn table_is_indexed_by_discriminant() {
        for (index, action) in Action::ALL.iter().enumerate() {
            assert_eq!(*action as usize, index);
            assert_eq!(action.as_str(), format!("{:?}", action));
        }
        assert_eq!(Action::ALL.len(), 16);
    }

    #[test]
    fn query_style_actions_use_get() {
        let spec = lookup("GetRecordTask").unwrap();
        assert_eq!(spec.method, Method::GET);
        assert_eq!(spec.path, "/");
        assert!(spec.params_in_query());
        assert!(!lookup("CreateRecordTask").unwrap().params_in_query());
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(Action::StopStreamRecord.to_string(), "StopStreamRecord");
        assert_eq!(Action::CheckBlacklist.as_ref(), "CheckBlacklist");
    }
}

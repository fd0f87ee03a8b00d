//! RxJS name tables
//!
//! The closed set of operator and constructor names the classifier matches.

use lazy_static::lazy_static;
use std::collections::HashSet;

/// Module prefix an import must come from to count as the real operator
pub const RXJS_MODULE_PREFIX: &str = "rxjs";

lazy_static! {
    /// Creation operators (single stream from non-stream inputs)
    pub static ref CREATION_OPERATORS: HashSet<&'static str> = {
        let mut set = HashSet::new();
        set.insert("ajax");
        set.insert("bindCallback");
        set.insert("bindNodeCallback");
        set.insert("defer");
        set.insert("empty");
        set.insert("from");
        set.insert("fromEvent");
        set.insert("fromEventPattern");
        set.insert("generate");
        set.insert("interval");
        set.insert("of");
        set.insert("range");
        set.insert("throwError");
        set.insert("timer");
        set.insert("iif");
        set
    };

    /// Join creation operators (one stream from several streams)
    pub static ref JOIN_CREATION_OPERATORS: HashSet<&'static str> = {
        let mut set = HashSet::new();
        set.insert("combineLatest");
        set.insert("concat");
        set.insert("forkJoin");
        set.insert("merge");
        set.insert("race");
        set.insert("zip");
        set
    };

    pub static ref OBSERVABLE_TYPES: HashSet<&'static str> = {
        let mut set = HashSet::new();
        set.insert("Observable");
        set
    };

    pub static ref SUBJECT_TYPES: HashSet<&'static str> = {
        let mut set = HashSet::new();
        set.insert("Subject");
        set.insert("BehaviorSubject");
        set.insert("ReplaySubject");
        set.insert("AsyncSubject");
        set
    };
}

pub fn is_creation_operator(name: &str) -> bool {
    CREATION_OPERATORS.contains(name)
}

pub fn is_join_creation_operator(name: &str) -> bool {
    JOIN_CREATION_OPERATORS.contains(name)
}

/// Observable or Subject type name
pub fn is_stream_type(name: &str) -> bool {
    OBSERVABLE_TYPES.contains(name) || SUBJECT_TYPES.contains(name)
}

pub fn is_rxjs_module(module: &str) -> bool {
    module.starts_with(RXJS_MODULE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_disjoint() {
        assert!(CREATION_OPERATORS.is_disjoint(&JOIN_CREATION_OPERATORS));
        assert!(OBSERVABLE_TYPES.is_disjoint(&SUBJECT_TYPES));
    }

    #[test]
    fn test_lookups() {
        assert!(is_creation_operator("interval"));
        assert!(!is_creation_operator("merge"));
        assert!(is_join_creation_operator("merge"));
        assert!(is_stream_type("BehaviorSubject"));
        assert!(is_stream_type("Observable"));
        assert!(!is_stream_type("Promise"));
        assert!(is_rxjs_module("rxjs"));
        assert!(is_rxjs_module("rxjs/operators"));
        assert!(!is_rxjs_module("./rxjs-helpers"));
    }
}

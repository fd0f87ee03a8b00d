//! Common test utilities for rxtrace-ir
//!
//! Fixture loading, single-file instrumentation and an identity-wrapper
//! "runtime" that strips instrumentation back out of rewritten text.

#![allow(dead_code)]

use std::path::Path;

use rxtrace_ir::config::DEFAULT_WRAPPER_LOCATION;
use rxtrace_ir::{ConstructKind, ConstructMetadata, InstrumentationService, InstrumentedFile, ValidatedConfig};

pub const WRAPPERS: &[&str] = &[
    "wrapCreationOperator",
    "wrapJoinCreationOperator",
    "wrapPipe",
    "wrapPipeableOperator",
    "wrapSubscribe",
    "wrapObservableSubjectConstructor",
    "wrapPropertyDeclaration",
];

/// Instrument `source` as `file` with the default configuration
pub fn instrument(source: &str, file: &str) -> InstrumentedFile {
    InstrumentationService::new(ValidatedConfig::default())
        .instrument_source(source, Path::new(file))
        .expect("instrumentation succeeds")
}

pub fn kinds(file: &InstrumentedFile) -> Vec<ConstructKind> {
    file.constructs.iter().map(|c| c.kind).collect()
}

pub fn metadata_of(file: &InstrumentedFile, kind: ConstructKind) -> Vec<&ConstructMetadata> {
    file.constructs
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| &c.metadata)
        .collect()
}

/// Metadata of the construct bound to `identifier`
pub fn bound(file: &InstrumentedFile, kind: ConstructKind, identifier: &str) -> ConstructMetadata {
    metadata_of(file, kind)
        .into_iter()
        .find(|m| m.identifier() == Some(identifier))
        .cloned()
        .unwrap_or_else(|| panic!("no {kind} bound to {identifier}"))
}

/// Wrappers whose wrapped value is a receiver: `wrapPipe(meta)(src)(args)`
/// stands for `src.pipe(args)`
const RECEIVER_WRAPPERS: &[(&str, &str)] = &[("wrapPipe", "pipe"), ("wrapSubscribe", "subscribe")];

/// Evaluate every wrapper the way a telemetry-free runtime would: drop the
/// wrapper imports, replace `wrapX(meta)(inner)` with `inner`, and rebuild
/// the member call for receiver wrappers
pub fn strip_instrumentation(output: &str) -> String {
    let import_suffix = format!("from '{DEFAULT_WRAPPER_LOCATION}';");
    let mut text: String = output
        .split_inclusive('\n')
        .filter(|line| !line.contains(&import_suffix))
        .collect();

    while let Some((start, name)) = next_wrapper(&text) {
        let meta_open = start + name.len();
        let meta_close = matching_paren(&text, meta_open);
        let inner_open = meta_close + 1;
        assert_eq!(&text[inner_open..inner_open + 1], "(", "wrapper is curried");
        let inner_close = matching_paren(&text, inner_open);
        let inner = text[inner_open + 1..inner_close].to_string();

        match RECEIVER_WRAPPERS.iter().find(|(wrapper, _)| *wrapper == name) {
            Some((_, method)) => {
                let args_open = inner_close + 1;
                assert_eq!(&text[args_open..args_open + 1], "(", "receiver wrapper takes arguments");
                let args_close = matching_paren(&text, args_open);
                let args = text[args_open..=args_close].to_string();
                text.replace_range(start..=args_close, &format!("{inner}.{method}{args}"));
            }
            None => text.replace_range(start..=inner_close, &inner),
        }
    }
    text
}

fn next_wrapper(text: &str) -> Option<(usize, &'static str)> {
    WRAPPERS
        .iter()
        .filter_map(|name| {
            let needle = format!("{name}(");
            text.find(&needle).map(|pos| (pos, *name))
        })
        .min_by_key(|(pos, _)| *pos)
}

/// Index of the `)` closing the `(` at `open`, skipping string literals
fn matching_paren(text: &str, open: usize) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return i;
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    panic!("unbalanced parentheses after byte {open}");
}

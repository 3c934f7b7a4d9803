//! RustyXMap - nested data ↔ XML trees through path expressions
//!
//! Layers:
//! - dom: arena tree, names, XML text output
//! - query: location-path engine used to validate, match and read paths
//! - path: fragment parsing, resolution, path writes and reads
//! - data: flatten / reconstruct and the encode / decode pipeline
//! - strategy: parallel batched reads

use rustler::{Encoder, Env, NifResult, ResourceArc, Term};
use tracing::debug;

mod config;
mod core;
mod data;
mod dom;
mod error;
mod path;
mod query;
mod resource;
mod strategy;
mod term;

use config::WriteOptions;
use data::Value;
use resource::{Session, TreeRef, TreeResource};
use rustler::types::atom::ok;
use term::{
    badarg_tuple, decode_write_options, decode_xml_options, error_tuple, option_to_term,
    pairs_to_term, session_error, str_to_binary, term_to_value, value_to_term,
};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Documents
// ============================================================================

/// Create an empty document
#[rustler::nif]
fn new_document() -> TreeRef {
    ResourceArc::new(TreeResource::default())
}

/// Build a document from nested data
#[rustler::nif]
fn encode<'a>(env: Env<'a>, data: Term<'a>, opts: Term<'a>) -> NifResult<Term<'a>> {
    let value = term_to_value(data)?;
    let options = decode_write_options(opts)?;

    Ok(match data::encode(&value, &options) {
        Ok(tree) => {
            debug!(
                nodes = tree.node_count(),
                empty = tree.is_empty(),
                names = tree.strings.len(),
                "encoded document"
            );
            (ok(), ResourceArc::new(TreeResource::new(Session::from_tree(tree)))).encode(env)
        }
        Err(e) => error_tuple(env, &e),
    })
}

/// Write nested data into an existing document
#[rustler::nif]
fn encode_into<'a>(
    env: Env<'a>,
    doc: TreeRef,
    data: Term<'a>,
    opts: Term<'a>,
) -> NifResult<Term<'a>> {
    let value = term_to_value(data)?;
    let options = decode_write_options(opts)?;

    Ok(
        match doc.with_session(|s| data::encode_into(&mut s.tree, &mut s.queries, &value, &options)) {
            Ok(Ok(())) => ok().encode(env),
            Ok(Err(e)) => error_tuple(env, &e),
            Err(reason) => session_error(env, reason),
        },
    )
}

/// Rebuild nested data from a document
#[rustler::nif]
fn decode<'a>(env: Env<'a>, doc: TreeRef) -> NifResult<Term<'a>> {
    match doc.with_session(|s| data::decode(&s.tree)) {
        Ok(Ok(value)) => Ok((ok(), value_to_term(env, &value)?).encode(env)),
        Ok(Err(e)) => Ok(error_tuple(env, &e)),
        Err(reason) => Ok(session_error(env, reason)),
    }
}

/// Serialize a document to XML text
#[rustler::nif]
fn to_xml<'a>(env: Env<'a>, doc: TreeRef, opts: Term<'a>) -> NifResult<Term<'a>> {
    let options = decode_xml_options(opts)?;
    Ok(match doc.with_session(|s| dom::to_xml(&s.tree, &options)) {
        Ok(xml) => str_to_binary(env, &xml),
        Err(reason) => session_error(env, reason),
    })
}

// ============================================================================
// Path Writes and Reads
// ============================================================================

/// Write a scalar (binary, number, atom or nil) at a path
#[rustler::nif]
fn write_path<'a>(
    env: Env<'a>,
    doc: TreeRef,
    path: &str,
    value: Term<'a>,
    opts: Term<'a>,
) -> NifResult<Term<'a>> {
    let text = match term_to_value(value)? {
        Value::Null => None,
        Value::Text(text) => Some(text),
        _ => return Ok(badarg_tuple(env, "write_path expects a scalar value")),
    };
    let options: WriteOptions = decode_write_options(opts)?;

    Ok(
        match doc.with_session(|s| {
            path::write_path_cached(&mut s.tree, &mut s.queries, path, text.as_deref(), &options)
        }) {
            Ok(Ok(_)) => ok().encode(env),
            Ok(Err(e)) => error_tuple(env, &e),
            Err(reason) => session_error(env, reason),
        },
    )
}

/// Read the value at a path: binary, nil, or `{:error, reason}`
#[rustler::nif]
fn read_path<'a>(env: Env<'a>, doc: TreeRef, path: &str) -> NifResult<Term<'a>> {
    Ok(
        match doc.with_session(|s| path::read_path_cached(&s.tree, &mut s.queries, path)) {
            Ok(Ok(value)) => option_to_term(env, value.as_deref()),
            Ok(Err(e)) => error_tuple(env, &e),
            Err(reason) => session_error(env, reason),
        },
    )
}

/// Read many paths in parallel
#[rustler::nif(schedule = "DirtyCpu")]
fn read_paths<'a>(env: Env<'a>, doc: TreeRef, paths: Vec<&str>) -> NifResult<Term<'a>> {
    let results = match doc.with_session(|s| strategy::read_paths_parallel(&s.tree, &paths)) {
        Ok(results) => results,
        Err(reason) => return Ok(session_error(env, reason)),
    };

    let mut list = Term::list_new_empty(env);
    for result in results.into_iter().rev() {
        let term = match result {
            Ok(value) => option_to_term(env, value.as_deref()),
            Err(e) => error_tuple(env, &e),
        };
        list = list.list_prepend(term);
    }
    Ok(list)
}

/// Read `{key, path}` pairs in parallel into `{:ok, [{key, value}]}`
#[rustler::nif(schedule = "DirtyCpu")]
fn read_map<'a>(env: Env<'a>, doc: TreeRef, queries: Vec<(&str, &str)>) -> NifResult<Term<'a>> {
    Ok(match doc.with_session(|s| strategy::read_map(&s.tree, &queries)) {
        Ok(Ok(pairs)) => (ok(), pairs_to_term(env, &pairs)).encode(env),
        Ok(Err(e)) => error_tuple(env, &e),
        Err(reason) => session_error(env, reason),
    })
}

/// Every leaf element and attribute as `{path, value}` in document order
#[rustler::nif]
fn collect<'a>(env: Env<'a>, doc: TreeRef) -> NifResult<Term<'a>> {
    Ok(match doc.with_session(|s| path::collect(&s.tree)) {
        Ok(pairs) => pairs_to_term(env, &pairs),
        Err(reason) => session_error(env, reason),
    })
}

// ============================================================================
// Pair Conversion
// ============================================================================

/// Flatten nested data into `{path, value}` pairs
#[rustler::nif]
fn flatten<'a>(env: Env<'a>, data: Term<'a>) -> NifResult<Term<'a>> {
    let value = term_to_value(data)?;
    Ok(match data::flatten(&value) {
        Ok(pairs) => (ok(), pairs_to_term(env, &pairs)).encode(env),
        Err(e) => error_tuple(env, &e),
    })
}

/// Rebuild nested data from `{path, value}` pairs
#[rustler::nif]
fn reconstruct<'a>(env: Env<'a>, pairs: Vec<(String, Option<String>)>) -> NifResult<Term<'a>> {
    Ok(match data::reconstruct(&pairs) {
        Ok(value) => (ok(), value_to_term(env, &value)?).encode(env),
        Err(e) => error_tuple(env, &e),
    })
}

// ============================================================================
// NIF Initialization
// ============================================================================

fn load(_env: Env, _info: Term) -> bool {
    debug!("rustyxmap NIF loaded");
    true
}

rustler::init!("Elixir.RustyXMap.Native", load = load);

//! Elixir Term Conversion Utilities
//!
//! Converts between Elixir terms and the nested `Value` model, and encodes
//! path pairs and errors for the NIF layer.

use crate::config::WriteOptions;
use crate::data::{Key, Value};
use crate::dom::XmlOptions;
use crate::error::ConvertError;
use crate::path::PathPair;
use indexmap::IndexMap;
use rustler::types::atom::{error, nil};
use rustler::types::tuple::get_tuple;
use rustler::{Encoder, Env, Error, ListIterator, MapIterator, NewBinary, NifResult, Term, TermType};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    invalid_path_syntax,
    invalid_tag_name,
    structural_conflict,
    hierarchy,
    mutex_poisoned,
    badarg,
    use_marked_literal,
    format_output,
}

/// Decode an Elixir term into nested data
pub fn term_to_value(term: Term) -> NifResult<Value> {
    match term.get_type() {
        TermType::Atom => {
            if term == nil().to_term(term.get_env()) {
                Ok(Value::Null)
            } else {
                Ok(Value::Text(term.atom_to_string()?))
            }
        }
        TermType::Binary => Ok(Value::Text(term.decode::<String>()?)),
        TermType::Integer => Ok(Value::Text(integer_to_string(term)?)),
        TermType::Float => Ok(Value::Text(format!("{:?}", term.decode::<f64>()?))),
        TermType::List => list_to_value(term),
        TermType::Map => map_to_value(term),
        _ => Err(Error::BadArg),
    }
}

fn integer_to_string(term: Term) -> NifResult<String> {
    if let Ok(i) = term.decode::<i64>() {
        return Ok(i.to_string());
    }
    Ok(term.decode::<u64>()?.to_string())
}

/// A non-empty list of `{key, value}` 2-tuples is an ordered map; any
/// other list is a list
fn list_to_value(term: Term) -> NifResult<Value> {
    let items: Vec<Term> = term.decode::<ListIterator>()?.collect();

    let pairs: Option<Vec<(Key, Term)>> = if items.is_empty() {
        None
    } else {
        items.iter().map(|&item| keyed_tuple(item)).collect()
    };

    match pairs {
        Some(pairs) => {
            let entries = pairs
                .into_iter()
                .map(|(key, value)| Ok((key, term_to_value(value)?)))
                .collect::<NifResult<Vec<_>>>()?;
            Ok(Value::map(entries))
        }
        None => Ok(Value::List(
            items
                .into_iter()
                .map(term_to_value)
                .collect::<NifResult<Vec<_>>>()?,
        )),
    }
}

fn keyed_tuple(term: Term) -> Option<(Key, Term)> {
    if term.get_type() != TermType::Tuple {
        return None;
    }
    match get_tuple(term).ok()?.as_slice() {
        [key, value] => Some((term_to_key(*key).ok()?, *value)),
        _ => None,
    }
}

fn map_to_value(term: Term) -> NifResult<Value> {
    let mut entries = IndexMap::new();
    for (key, value) in MapIterator::new(term).ok_or(Error::BadArg)? {
        entries.insert(term_to_key(key)?, term_to_value(value)?);
    }
    // Large maps iterate in hash order; positions still have to line up
    if entries.keys().all(|k| matches!(k, Key::Index(_))) {
        entries.sort_by(|a, _, b, _| match (a, b) {
            (Key::Index(x), Key::Index(y)) => x.cmp(y),
            _ => std::cmp::Ordering::Equal,
        });
    }
    Ok(Value::Map(entries))
}

/// Binaries and atoms are names, non-negative integers are positions
fn term_to_key(term: Term) -> NifResult<Key> {
    match term.get_type() {
        TermType::Binary => Ok(Key::Name(term.decode::<String>()?)),
        TermType::Atom => Ok(Key::Name(term.atom_to_string()?)),
        TermType::Integer => Ok(Key::Index(term.decode::<usize>()?)),
        _ => Err(Error::BadArg),
    }
}

/// Encode nested data as an Elixir term
pub fn value_to_term<'a>(env: Env<'a>, value: &Value) -> NifResult<Term<'a>> {
    match value {
        Value::Null => Ok(nil().encode(env)),
        Value::Text(text) => Ok(str_to_binary(env, text)),
        Value::List(items) => {
            let mut list = Term::list_new_empty(env);
            for item in items.iter().rev() {
                list = list.list_prepend(value_to_term(env, item)?);
            }
            Ok(list)
        }
        Value::Map(entries) => {
            let mut pairs = Vec::with_capacity(entries.len());
            for (key, item) in entries {
                let key_term = match key {
                    Key::Name(name) => str_to_binary(env, name),
                    Key::Index(i) => i.encode(env),
                };
                pairs.push((key_term, value_to_term(env, item)?));
            }
            Term::map_from_pairs(env, &pairs)
        }
    }
}

/// Encode `(path, value)` pairs as a list of `{path, value}` tuples
pub fn pairs_to_term<'a>(env: Env<'a>, pairs: &[PathPair]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for (path, value) in pairs.iter().rev() {
        let value_term = match value {
            Some(v) => str_to_binary(env, v),
            None => nil().encode(env),
        };
        list = list.list_prepend((str_to_binary(env, path), value_term).encode(env));
    }
    list
}

/// Encode an optional string as a binary or `nil`
pub fn option_to_term<'a>(env: Env<'a>, value: Option<&str>) -> Term<'a> {
    match value {
        Some(v) => str_to_binary(env, v),
        None => nil().encode(env),
    }
}

/// Error reason term for a conversion error
pub fn error_reason<'a>(env: Env<'a>, err: &ConvertError) -> Term<'a> {
    match err {
        ConvertError::InvalidPathSyntax { path } => {
            (invalid_path_syntax(), str_to_binary(env, path)).encode(env)
        }
        ConvertError::InvalidTagName { name } => {
            (invalid_tag_name(), str_to_binary(env, name)).encode(env)
        }
        ConvertError::StructuralConflict { path } => {
            (structural_conflict(), str_to_binary(env, path)).encode(env)
        }
        ConvertError::Tree(tree_err) => {
            (hierarchy(), str_to_binary(env, &tree_err.to_string())).encode(env)
        }
    }
}

/// `{:error, reason}` for a conversion error
pub fn error_tuple<'a>(env: Env<'a>, err: &ConvertError) -> Term<'a> {
    (error(), error_reason(env, err)).encode(env)
}

/// `{:error, reason}` for a session error such as a poisoned mutex
pub fn session_error<'a>(env: Env<'a>, reason: &'static str) -> Term<'a> {
    let reason = match reason {
        "mutex_poisoned" => mutex_poisoned().encode(env),
        other => (badarg(), str_to_binary(env, other)).encode(env),
    };
    (error(), reason).encode(env)
}

/// `{:error, {:badarg, message}}`
pub fn badarg_tuple<'a>(env: Env<'a>, message: &str) -> Term<'a> {
    (error(), (badarg(), str_to_binary(env, message))).encode(env)
}

/// Decode write options from a map or keyword list
pub fn decode_write_options(opts: Term) -> NifResult<WriteOptions> {
    Ok(WriteOptions {
        use_marked_literal: option_flag(opts, use_marked_literal())?,
    })
}

/// Decode XML output options from a map or keyword list
pub fn decode_xml_options(opts: Term) -> NifResult<XmlOptions> {
    Ok(XmlOptions {
        format_output: option_flag(opts, format_output())?,
    })
}

/// Look up a boolean option; missing means false
fn option_flag(opts: Term, key: rustler::Atom) -> NifResult<bool> {
    let env = opts.get_env();
    let key_term = key.encode(env);
    match opts.get_type() {
        TermType::Map => match opts.map_get(key_term) {
            Ok(value) => value.decode::<bool>(),
            Err(_) => Ok(false),
        },
        TermType::List => {
            for item in opts.decode::<ListIterator>()? {
                let (k, v): (Term, Term) = item.decode()?;
                if k == key_term {
                    return v.decode::<bool>();
                }
            }
            Ok(false)
        }
        _ => Err(Error::BadArg),
    }
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
